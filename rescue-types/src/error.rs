//! Error taxonomy shared across the workspace.
//!
//! Corresponds to spec.md §7. Concrete chain implementations (`rescue-evm`)
//! define their own transport-facing error enums and convert into
//! [`RescueError`] at the `ChainGateway` boundary; the orchestrator never
//! constructs a chain-specific error directly.

/// A kind of failure the Retry Controller knows how to reason about.
///
/// `FundsInsufficient` is never constructed by the orchestrator itself — it
/// is raised by the CLI collaborator's pre-flight check and reported back
/// before the orchestrator runs (spec.md §7).
#[derive(Debug, thiserror::Error)]
pub enum RescueError {
    /// Transport failure talking to a gateway. Retryable at the attempt level.
    #[error("network error: {0}")]
    Network(String),

    /// A dependent gateway call failed while constructing a bundle. Retryable.
    #[error("planning failed: {0}")]
    PlanningFailed(String),

    /// The primary gateway rejected a signed transaction outright.
    #[error("submission refused: {0}")]
    SubmissionRefused(String),

    /// A transaction's receipt reported `status == 0`.
    #[error("transaction reverted: {0}")]
    Reverted(String),

    /// A receipt did not arrive within the provider's limits.
    #[error("timed out waiting for receipt: {0}")]
    Timeout(String),

    /// The sponsor's balance cannot cover funding plus funding-tx gas.
    #[error("insufficient sponsor funds: {0}")]
    FundsInsufficient(String),
}
