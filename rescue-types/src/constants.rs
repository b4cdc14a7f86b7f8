//! Calibration constants for the rescue orchestrator.
//!
//! Corresponds to spec.md §6 "Constants exposed for calibration".

use crate::types::{Gas, Wei};

/// Maximum number of Retry Controller attempts (spec.md §4.5).
pub const MAX_RETRY_ATTEMPTS: u32 = 3;

/// Percent-per-attempt gas escalation factor, applied as integer percent
/// arithmetic (see [`escalate_gas_factor`]) rather than floating point.
pub const GAS_ESCALATION_FACTOR_PERCENT: u64 = 130;

/// Starting gas factor (100%) for the first attempt.
pub const INITIAL_GAS_FACTOR_PERCENT: u64 = 100;

/// Ceiling on `max_fee_per_gas`, denominated in gwei, regardless of how much
/// the escalation ladder would otherwise scale it to.
pub const MAX_FEE_CAP_GWEI: u64 = 10;

/// `funding_tx.gas_limit` when the executor is a plain EOA.
pub const FUNDING_GAS_LIMIT_EOA: Gas = 21_000;

/// `funding_tx.gas_limit` when the executor has delegated code (EIP-7702).
pub const FUNDING_GAS_LIMIT_DELEGATED: Gas = 100_000;

/// Conservative default transfer gas limit used by collaborators when gas
/// estimation fails (e.g. the executor holds no native balance yet).
pub const DEFAULT_TRANSFER_GAS: Gas = 65_000;

/// Number of wei in one gwei.
pub const WEI_PER_GWEI: Wei = 1_000_000_000;

/// Applies one step of the gas escalation ladder to a percent-denominated
/// gas factor, rounding to the nearest integer percent.
///
/// `escalate_gas_factor(100) == 130`, `escalate_gas_factor(130) == 169`,
/// matching spec.md §8 invariant 5 (`gas_factor_k = round(gas_factor_{k-1} *
/// 1.30)`).
#[must_use]
pub const fn escalate_gas_factor(previous_percent: u64) -> u64 {
    (previous_percent * GAS_ESCALATION_FACTOR_PERCENT * 10 + 500) / 1000
}
