//! The Retry Controller: wraps the Submission Engine in a bounded loop with
//! gas escalation and a partial-progress fast path (spec.md §4.5).

use alloy_primitives::{Address, B256};
use rescue_types::constants::{INITIAL_GAS_FACTOR_PERCENT, MAX_RETRY_ATTEMPTS, escalate_gas_factor};
use rescue_types::gateway::{ChainGateway, NonceTag, PrivateGateway};
use rescue_types::signer::SigningAuthority;
use rescue_types::types::{AttemptOutcome, FeeQuote, RescueResult, TransferCall};

use crate::engine::{run_attempt, submit_and_confirm_transfers};
use crate::planner::{PlannerInputs, effective_max_fee, plan_bundle, sign_transfers};

/// Everything [`rescue`] needs across every attempt: the accounts, the
/// transfer list, and the fee inputs. Constant for the lifetime of one
/// invocation (spec.md §9 "no shared mutable global" — every tunable is a
/// parameter here rather than read from the environment inside the core).
#[derive(Debug, Clone, Copy)]
pub struct RescueInputs<'a, S: SigningAuthority> {
    /// The sponsor's address.
    pub sponsor_addr: Address,
    /// The executor's address.
    pub executor_addr: Address,
    /// The sponsor's signing key.
    pub sponsor_key: &'a S::Key,
    /// The executor's signing key.
    pub executor_key: &'a S::Key,
    /// Whether the executor carries delegated code (EIP-7702).
    pub executor_is_contract: bool,
    /// The transfers the executor must emit, in stable order.
    pub transfer_calls: &'a [TransferCall],
    /// Tip offered per unit gas, in gwei.
    pub priority_fee_gwei: u64,
    /// Nominal (unescalated) max fee per unit gas, in gwei.
    pub max_fee_gwei: u64,
}

/// Runs the Retry Controller to completion: up to
/// [`MAX_RETRY_ATTEMPTS`] Submission Engine attempts, escalating gas by
/// [`rescue_types::constants::GAS_ESCALATION_FACTOR_PERCENT`] between them,
/// with a partial-progress fast path when funding lands but a transfer does
/// not (spec.md §4.5 step 4).
///
/// This never returns an `Err`: every failure mode is folded into
/// [`RescueResult::last_error`], matching spec.md §7's propagation policy
/// (`FundsInsufficient` is the sole exception, and it is raised by the CLI
/// collaborator before this function is ever called).
pub async fn rescue<G, S>(
    primary: &G,
    private_gateways: &[&dyn PrivateGateway],
    signer: &S,
    inputs: RescueInputs<'_, S>,
) -> RescueResult
where
    G: ChainGateway,
    S: SigningAuthority,
{
    let mut gas_factor_percent = INITIAL_GAS_FACTOR_PERCENT;
    let mut last_error: Option<String> = None;
    let mut last_funding_hash: Option<B256> = None;
    let mut last_transfer_hashes: Vec<Option<B256>> = Vec::new();

    let mut attempt = 1;
    while attempt <= MAX_RETRY_ATTEMPTS {
        if attempt > 1 {
            gas_factor_percent = escalate_gas_factor(gas_factor_percent);
            tracing::info!(tag = "RETRY", attempt, gas_factor_percent, "retrying with escalated gas");
        }

        let planner_inputs = PlannerInputs {
            sponsor_addr: inputs.sponsor_addr,
            executor_addr: inputs.executor_addr,
            executor_is_contract: inputs.executor_is_contract,
            priority_fee_gwei: inputs.priority_fee_gwei,
            max_fee_gwei: inputs.max_fee_gwei,
            gas_factor_percent,
            transfer_calls: inputs.transfer_calls,
        };

        let bundle = match plan_bundle(primary, signer, inputs.sponsor_key, inputs.executor_key, planner_inputs).await
        {
            Ok(bundle) => bundle,
            Err(e) => {
                last_error = Some(e.to_string());
                attempt += 1;
                continue;
            }
        };

        let report = match run_attempt(
            &bundle,
            primary,
            private_gateways,
            signer,
            inputs.executor_key,
            inputs.executor_addr,
            inputs.transfer_calls,
        )
        .await
        {
            Ok(report) => report,
            Err(e) => {
                last_error = Some(e.to_string());
                attempt += 1;
                continue;
            }
        };

        last_funding_hash = report.funding_hash.or(last_funding_hash);
        if !report.transfer_hashes.is_empty() {
            last_transfer_hashes = report.transfer_hashes.clone();
        }

        match report.outcome {
            AttemptOutcome::Success => {
                tracing::info!(tag = "SUCCESS", attempts = attempt, "rescue complete");
                return RescueResult {
                    funding_hash: last_funding_hash,
                    transfer_hashes: last_transfer_hashes.into_iter().flatten().collect(),
                    success: true,
                    attempts: attempt,
                    last_error: None,
                };
            }
            AttemptOutcome::FundingLandedTransfersFailed { reason, .. } if attempt < MAX_RETRY_ATTEMPTS => {
                last_error = Some(reason);
                if let Some(result) = try_partial_progress(
                    primary,
                    private_gateways,
                    signer,
                    &inputs,
                    &bundle.fee_quote,
                    bundle.chain_id,
                    gas_factor_percent,
                    attempt,
                    last_funding_hash,
                )
                .await
                {
                    return result;
                }
                // Sub-attempt also failed; fall through to a full replan on
                // the next outer iteration. The funding already paid simply
                // sits as executor balance (spec.md §4.5 step 4).
                attempt += 1;
            }
            AttemptOutcome::FundingLandedTransfersFailed { reason, .. } => {
                last_error = Some(reason);
                attempt += 1;
            }
            AttemptOutcome::FundingFailed(reason)
            | AttemptOutcome::SubmissionRefused(reason)
            | AttemptOutcome::Timeout(reason) => {
                last_error = Some(reason);
                attempt += 1;
            }
        }
    }

    tracing::warn!(tag = "FAILED", attempts = MAX_RETRY_ATTEMPTS, "rescue exhausted all retry attempts");
    RescueResult {
        funding_hash: last_funding_hash,
        transfer_hashes: last_transfer_hashes.into_iter().flatten().collect(),
        success: false,
        attempts: MAX_RETRY_ATTEMPTS,
        last_error,
    }
}

/// The partial-progress fast path: re-sign and resubmit only the transfers,
/// at one escalation step beyond the attempt that just landed funding. On
/// success returns `Some` with `attempts = attempt + 1`; on failure returns
/// `None` so the caller falls through to a full replan.
#[allow(clippy::too_many_arguments)]
async fn try_partial_progress<G, S>(
    primary: &G,
    private_gateways: &[&dyn PrivateGateway],
    signer: &S,
    inputs: &RescueInputs<'_, S>,
    fee_quote: &FeeQuote,
    chain_id: u64,
    gas_factor_percent: u64,
    attempt: u32,
    funding_hash: Option<B256>,
) -> Option<RescueResult>
where
    G: ChainGateway,
    S: SigningAuthority,
{
    let escalated_factor = escalate_gas_factor(gas_factor_percent);
    let fresh_nonce = primary
        .nonce_at(inputs.executor_addr, NonceTag::Pending)
        .await
        .ok()?;
    let new_max_fee = effective_max_fee(
        fee_quote.base_fee,
        fee_quote.priority_fee,
        inputs.max_fee_gwei,
        escalated_factor,
    );

    let retried_transfers = sign_transfers(
        signer,
        inputs.executor_key,
        chain_id,
        fresh_nonce,
        inputs.transfer_calls,
        new_max_fee,
        fee_quote.priority_fee,
    )
    .ok()?;

    let (transfer_hashes, failing_indexes) =
        submit_and_confirm_transfers(primary, private_gateways, &retried_transfers).await;

    if failing_indexes.is_empty() && !transfer_hashes.is_empty() {
        tracing::info!(tag = "SUCCESS", attempts = attempt + 1, "rescue complete via partial-progress path");
        Some(RescueResult {
            funding_hash,
            transfer_hashes: transfer_hashes.into_iter().flatten().collect(),
            success: true,
            attempts: attempt + 1,
            last_error: None,
        })
    } else {
        None
    }
}
