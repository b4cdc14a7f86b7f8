//! Data model for the rescue orchestrator.
//!
//! Corresponds to spec.md §3.

use alloy_primitives::{Address, Bytes, B256, U256};

/// A gas quantity (gas units, not wei).
pub type Gas = u64;

/// A wei-per-gas price quantity, e.g. `max_fee_per_gas`.
pub type Wei = u128;

/// A native-currency value (tx `value`, account balance).
pub type Value = U256;

/// One token transfer the compromised executor must emit.
///
/// Immutable input to the core; construction of `calldata` is a collaborator
/// concern (spec.md §1 Non-goals).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferCall {
    /// The token contract (or other call target) the executor invokes.
    pub to: Address,
    /// ABI-encoded calldata for the call.
    pub calldata: Bytes,
    /// Gas limit to assign this transfer in the bundle.
    pub gas_limit: Gas,
}

/// A fee quote derived for a single planning/re-planning pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeQuote {
    /// The chain's current base fee per gas.
    pub base_fee: Wei,
    /// The priority fee (tip) offered per gas.
    pub priority_fee: Wei,
    /// The max fee per gas every signed tx in the bundle uses.
    pub max_fee: Wei,
}

impl FeeQuote {
    /// Checks the invariant spec.md §3 requires of every fee quote in use:
    /// `max_fee >= base_fee * 2 + priority_fee`.
    #[must_use]
    pub const fn satisfies_headroom_invariant(&self) -> bool {
        self.max_fee >= self.base_fee.saturating_mul(2).saturating_add(self.priority_fee)
    }
}

/// A fully signed, RLP-encoded raw transaction ready for
/// `eth_sendRawTransaction`, together with the bookkeeping the Submission
/// Engine needs without re-parsing the raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSignedTx {
    /// The RLP-encoded, EIP-1559 (type-2) transaction bytes.
    pub raw: Bytes,
    /// The transaction's hash, precomputed by the Signing Authority.
    pub hash: B256,
    /// The nonce this transaction was signed against.
    pub nonce: u64,
}

/// An atomically-planned, fully signed bundle: one funding transaction plus
/// an ordered list of transfer transactions.
///
/// See spec.md §3 for the five bundle invariants; this type only stores the
/// data, it does not itself enforce them — the Bundle Planner is responsible
/// for constructing a bundle that upholds them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRescueBundle {
    /// Sponsor → executor funding transaction.
    pub funding_tx: RawSignedTx,
    /// Executor-signed transfer transactions, in the same order as the
    /// input `TransferCall`s, with nonces `executor_nonce..executor_nonce+N`.
    pub transfer_txs: Vec<RawSignedTx>,
    /// The fee quote every tx in this bundle was signed against.
    pub fee_quote: FeeQuote,
    /// Executor nonce observed at signing time.
    pub executor_nonce: u64,
    /// Sponsor nonce observed at signing time.
    pub sponsor_nonce: u64,
    /// `funding_tx.value`, retained for the funded-enough check.
    pub total_executor_gas_cost: Value,
    /// Chain ID every signed tx in this bundle shares.
    pub chain_id: u64,
}

/// The outcome of a single Submission Engine attempt.
///
/// Corresponds to spec.md §3 `AttemptOutcome` and the design note that models
/// outcomes as a sum type rather than as strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Funding confirmed and every transfer confirmed with `status == 1`.
    Success,
    /// The funding transaction never confirmed within the attempt window.
    FundingFailed(String),
    /// Funding confirmed, but one or more transfers reverted or dropped.
    FundingLandedTransfersFailed {
        /// Hash of the confirmed funding transaction.
        funding_hash: B256,
        /// Indexes (into the original `TransferCall` list) that failed.
        failing_indexes: Vec<usize>,
        /// Human-readable diagnosis.
        reason: String,
    },
    /// The primary gateway refused every transaction in the bundle outright.
    SubmissionRefused(String),
    /// A receipt wait exceeded the provider's limits.
    Timeout(String),
}

/// The final, user-visible result of a rescue invocation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RescueResult {
    /// Hash of the funding transaction, if one was ever submitted.
    pub funding_hash: Option<B256>,
    /// Hashes of every transfer transaction that was submitted, in order.
    pub transfer_hashes: Vec<B256>,
    /// Whether every transfer ultimately confirmed successfully.
    pub success: bool,
    /// Number of Retry Controller attempts consumed.
    pub attempts: u32,
    /// The most recent failure reason, if the rescue did not succeed.
    pub last_error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fee_quote_headroom_invariant() {
        let ok = FeeQuote {
            base_fee: 20_000_000,
            priority_fee: 1_000_000_000,
            max_fee: 2 * 20_000_000 + 1_000_000_000,
        };
        assert!(ok.satisfies_headroom_invariant());

        let under = FeeQuote {
            base_fee: 20_000_000,
            priority_fee: 1_000_000_000,
            max_fee: 2 * 20_000_000 + 1_000_000_000 - 1,
        };
        assert!(!under.satisfies_headroom_invariant());
    }
}
