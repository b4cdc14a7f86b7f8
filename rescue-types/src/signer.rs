//! The `SigningAuthority` trait: a pure function from a key and a fully
//! parametrized transaction template to a signed, RLP-encoded raw
//! transaction.
//!
//! Corresponds to spec.md §4.2. Keeping this free of I/O (see spec.md §9
//! "Signing is pure") makes it straightforward to test: identical inputs
//! must yield bytewise-identical output across runs.

use alloy_primitives::{Address, Bytes};

use crate::types::{Gas, RawSignedTx, Value, Wei};

/// A fully parametrized EIP-1559 (type-2) transaction, prior to signing.
///
/// No defaults and no implicit type selection: every field the signature
/// covers is supplied explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxTemplate {
    /// Chain ID this transaction is valid on.
    pub chain_id: u64,
    /// Sender's nonce.
    pub nonce: u64,
    /// Call target.
    pub to: Address,
    /// Native value transferred.
    pub value: Value,
    /// Calldata.
    pub data: Bytes,
    /// Gas limit.
    pub gas_limit: Gas,
    /// `max_fee_per_gas`.
    pub max_fee_per_gas: Wei,
    /// `max_priority_fee_per_gas`.
    pub max_priority_fee_per_gas: Wei,
}

/// Produces signed, RLP-encoded raw transactions from a private key and a
/// [`TxTemplate`]. Implementations must not perform network I/O and must be
/// deterministic: the same `(key, template)` pair always yields the same
/// [`RawSignedTx`].
pub trait SigningAuthority {
    /// The key type this authority signs with (e.g. a 32-byte secp256k1
    /// private key wrapper).
    type Key;
    /// The error type returned on malformed input.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Signs `template` with `key`, producing a raw EIP-1559 transaction.
    fn sign(&self, key: &Self::Key, template: &TxTemplate) -> Result<RawSignedTx, Self::Error>;
}
