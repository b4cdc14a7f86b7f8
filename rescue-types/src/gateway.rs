//! The `ChainGateway` and `PrivateGateway` traits.
//!
//! Corresponds to spec.md §4.1. A `ChainGateway` is a thin client
//! abstraction over one JSON-RPC endpoint; the orchestrator is generic over
//! it so it can be driven against an in-memory mock in tests and against a
//! live `alloy-provider`-backed implementation (see `rescue-evm`) in
//! production.

use alloy_primitives::{Address, Bytes, B256};
use async_trait::async_trait;

use crate::types::{Gas, Value};

/// The block-tag a nonce query is taken against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonceTag {
    /// The nonce after the last included block.
    Latest,
    /// The nonce including transactions already accepted into the node's
    /// mempool — this must reflect a sweeper's in-flight transaction.
    Pending,
}

/// The latest block header fields the Bundle Planner needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    /// Block number.
    pub number: u64,
    /// EIP-1559 base fee per gas of this block.
    pub base_fee_per_gas: u128,
}

/// Parameters for an `eth_estimateGas`-style call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallParams {
    /// The caller (executor) address.
    pub from: Address,
    /// The call target.
    pub to: Address,
    /// Calldata.
    pub data: Bytes,
}

/// A confirmed transaction receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Receipt {
    /// Block the transaction was included in.
    pub block_number: u64,
    /// Gas actually consumed.
    pub gas_used: Gas,
    /// `1` on success, `0` on revert.
    pub status: u8,
}

impl Receipt {
    /// Whether this receipt reports a successful execution (`status == 1`).
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        self.status == 1
    }
}

/// Uniform view over one RPC endpoint, used both as the primary gateway
/// (whose outcomes the Submission Engine observes) and, via
/// [`PrivateGateway`], as a fire-and-forget broadcast target.
#[async_trait]
pub trait ChainGateway: Send + Sync {
    /// The error type surfaced by this gateway's transport.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetches the latest block's number and base fee.
    async fn latest_block(&self) -> Result<BlockHeader, Self::Error>;

    /// Fetches the chain ID reported by this endpoint.
    async fn chain_id(&self) -> Result<u64, Self::Error>;

    /// Fetches `address`'s transaction count at the given tag.
    async fn nonce_at(&self, address: Address, tag: NonceTag) -> Result<u64, Self::Error>;

    /// Fetches `address`'s native balance.
    async fn balance(&self, address: Address) -> Result<Value, Self::Error>;

    /// Fetches the code deployed at `address`. Empty bytes means a
    /// non-delegated EOA.
    async fn code(&self, address: Address) -> Result<Bytes, Self::Error>;

    /// Estimates the gas a call would consume. Callers must tolerate
    /// failure and fall back to [`crate::constants::DEFAULT_TRANSFER_GAS`].
    async fn estimate_gas(&self, call: CallParams) -> Result<Gas, Self::Error>;

    /// Submits a raw signed transaction, returning once the pool has
    /// accepted or rejected it (not once it is included).
    async fn submit_raw(&self, raw: &Bytes) -> Result<B256, Self::Error>;

    /// Awaits a transaction's receipt with the given confirmation depth.
    async fn await_receipt(&self, hash: B256, confirmations: u64) -> Result<Receipt, Self::Error>;
}

/// A private (MEV-protected) broadcast target used in fire-and-forget mode.
///
/// Its `submit_raw` errors are logged and swallowed by the implementation;
/// it never participates in `await_receipt` because its receipts are not
/// observable through this interface (spec.md §4.1, §4.4).
#[async_trait]
pub trait PrivateGateway: Send + Sync {
    /// Broadcasts `raw` best-effort. Implementations must never propagate an
    /// error to the caller — failures are logged internally.
    async fn broadcast(&self, raw: &Bytes);
}
