//! In-memory mocks driving the Submission Engine and Retry Controller tests
//! in [`crate::tests`] without any network I/O.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use alloy_primitives::{Address, B256, Bytes, U256, keccak256};
use async_trait::async_trait;
use rescue_types::gateway::{BlockHeader, CallParams, ChainGateway, NonceTag, PrivateGateway, Receipt};
use rescue_types::signer::{SigningAuthority, TxTemplate};
use rescue_types::types::{Gas, RawSignedTx, Value};
use tokio::sync::Mutex;

/// Errors the mock gateway can be configured to return.
#[derive(Debug, thiserror::Error)]
pub enum MockError {
    /// `submit_raw` was asked to refuse this hash.
    #[error("mock: submission refused")]
    Refused,
    /// `await_receipt` was asked to never produce a receipt for this hash.
    #[error("mock: receipt never arrived")]
    Timeout,
}

#[derive(Default)]
struct MockState {
    base_fee: u128,
    chain_id: u64,
    pending_nonces: HashMap<Address, u64>,
    balances: HashMap<Address, U256>,
    codes: HashMap<Address, Bytes>,
    statuses: HashMap<B256, u8>,
    refuse: HashSet<B256>,
    drop_receipt: HashSet<B256>,
    submissions: Vec<Bytes>,
}

/// An in-memory stand-in for the primary [`ChainGateway`], fully
/// controllable from test setup.
#[derive(Clone, Default)]
pub struct MockGateway(Arc<Mutex<MockState>>);

impl MockGateway {
    /// Builds a mock with the given base fee (wei) and chain ID.
    pub async fn new(base_fee: u128, chain_id: u64) -> Self {
        let gw = Self::default();
        {
            let mut state = gw.0.lock().await;
            state.base_fee = base_fee;
            state.chain_id = chain_id;
        }
        gw
    }

    /// Sets `address`'s pending nonce.
    pub async fn set_pending_nonce(&self, address: Address, nonce: u64) {
        self.0.lock().await.pending_nonces.insert(address, nonce);
    }

    /// Sets `address`'s native balance.
    pub async fn set_balance(&self, address: Address, balance: U256) {
        self.0.lock().await.balances.insert(address, balance);
    }

    /// Sets `address`'s account code (non-empty marks it as delegated).
    pub async fn set_code(&self, address: Address, code: Bytes) {
        self.0.lock().await.codes.insert(address, code);
    }

    /// Marks `hash` to be refused by `submit_raw`.
    pub async fn refuse(&self, hash: B256) {
        self.0.lock().await.refuse.insert(hash);
    }

    /// Marks `hash`'s receipt wait to time out.
    pub async fn drop_receipt(&self, hash: B256) {
        self.0.lock().await.drop_receipt.insert(hash);
    }

    /// Sets the receipt status (`1` success, `0` revert) for `hash`.
    /// Unregistered hashes default to success.
    pub async fn set_status(&self, hash: B256, status: u8) {
        self.0.lock().await.statuses.insert(hash, status);
    }

    /// Returns every raw tx submitted to this gateway, in call order.
    pub async fn submissions(&self) -> Vec<Bytes> {
        self.0.lock().await.submissions.clone()
    }
}

#[async_trait]
impl ChainGateway for MockGateway {
    type Error = MockError;

    async fn latest_block(&self) -> Result<BlockHeader, Self::Error> {
        let state = self.0.lock().await;
        Ok(BlockHeader { number: 1, base_fee_per_gas: state.base_fee })
    }

    async fn chain_id(&self) -> Result<u64, Self::Error> {
        Ok(self.0.lock().await.chain_id)
    }

    async fn nonce_at(&self, address: Address, _tag: NonceTag) -> Result<u64, Self::Error> {
        Ok(self.0.lock().await.pending_nonces.get(&address).copied().unwrap_or_default())
    }

    async fn balance(&self, address: Address) -> Result<Value, Self::Error> {
        Ok(self.0.lock().await.balances.get(&address).copied().unwrap_or_default())
    }

    async fn code(&self, address: Address) -> Result<Bytes, Self::Error> {
        Ok(self.0.lock().await.codes.get(&address).cloned().unwrap_or_default())
    }

    async fn estimate_gas(&self, _call: CallParams) -> Result<Gas, Self::Error> {
        Ok(21_000)
    }

    async fn submit_raw(&self, raw: &Bytes) -> Result<B256, Self::Error> {
        let hash = keccak256(raw);
        let mut state = self.0.lock().await;
        state.submissions.push(raw.clone());
        if state.refuse.contains(&hash) {
            return Err(MockError::Refused);
        }
        Ok(hash)
    }

    async fn await_receipt(&self, hash: B256, _confirmations: u64) -> Result<Receipt, Self::Error> {
        let state = self.0.lock().await;
        if state.drop_receipt.contains(&hash) {
            return Err(MockError::Timeout);
        }
        let status = state.statuses.get(&hash).copied().unwrap_or(1);
        Ok(Receipt { block_number: 1, gas_used: 21_000, status })
    }
}

/// An in-memory stand-in for a private (MEV-protected) broadcast target.
#[derive(Clone, Default)]
pub struct MockPrivateGateway(Arc<Mutex<Vec<Bytes>>>);

impl MockPrivateGateway {
    /// Returns every raw tx broadcast to this gateway, in call order.
    pub async fn broadcasts(&self) -> Vec<Bytes> {
        self.0.lock().await.clone()
    }
}

#[async_trait]
impl PrivateGateway for MockPrivateGateway {
    async fn broadcast(&self, raw: &Bytes) {
        self.0.lock().await.push(raw.clone());
    }
}

/// A pure, deterministic stand-in [`SigningAuthority`] keyed by address
/// rather than a real secp256k1 key — the orchestrator never inspects key
/// material, so tests don't need real cryptography to exercise nonce and
/// fee bookkeeping.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockSigner;

impl SigningAuthority for MockSigner {
    type Key = Address;
    type Error = std::convert::Infallible;

    fn sign(&self, key: &Self::Key, template: &TxTemplate) -> Result<RawSignedTx, Self::Error> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&template.chain_id.to_be_bytes());
        buf.extend_from_slice(&template.nonce.to_be_bytes());
        buf.extend_from_slice(template.to.as_slice());
        buf.extend_from_slice(&template.value.to_be_bytes::<32>());
        buf.extend_from_slice(&template.data);
        buf.extend_from_slice(&template.gas_limit.to_be_bytes());
        buf.extend_from_slice(&template.max_fee_per_gas.to_be_bytes());
        buf.extend_from_slice(&template.max_priority_fee_per_gas.to_be_bytes());
        buf.extend_from_slice(key.as_slice());

        let raw = Bytes::from(buf);
        let hash = keccak256(&raw);
        Ok(RawSignedTx { raw, hash, nonce: template.nonce })
    }
}
