//! The Submission Engine: drives a single burst-submission attempt against
//! an already-planned bundle (spec.md §4.4).

use alloy_primitives::{Address, B256, Bytes, U256};
use futures_util::future::join_all;
use rescue_types::error::RescueError;
use rescue_types::gateway::{ChainGateway, NonceTag, PrivateGateway};
use rescue_types::signer::SigningAuthority;
use rescue_types::types::{AttemptOutcome, RawSignedTx, SignedRescueBundle, TransferCall};

use crate::planner::sign_transfers;

/// Everything one [`run_attempt`] call observed, beyond the classified
/// [`AttemptOutcome`] itself — the Retry Controller needs the hashes to
/// assemble the final [`rescue_types::types::RescueResult`].
#[derive(Debug, Clone)]
pub struct AttemptReport {
    /// The outcome this attempt was classified as.
    pub outcome: AttemptOutcome,
    /// Hash of the funding transaction, if the primary accepted it.
    pub funding_hash: Option<B256>,
    /// Hash of each transfer the primary accepted, `None` where refused.
    pub transfer_hashes: Vec<Option<B256>>,
}

/// Broadcasts `raw` to every private gateway, fire-and-forget. Never fails:
/// each gateway swallows its own errors (spec.md §4.1).
async fn broadcast_private(private_gateways: &[&dyn PrivateGateway], raw: &Bytes) {
    join_all(private_gateways.iter().map(|pg| pg.broadcast(raw))).await;
}

/// Submits `transfer_txs` to the primary, with each one's private broadcast
/// running concurrently rather than sequentially awaited (spec.md §4.4 step
/// 2, §5: "the engine never awaits a transfer submission before issuing the
/// next one").
async fn submit_transfers<G>(
    primary: &G,
    private_gateways: &[&dyn PrivateGateway],
    transfer_txs: &[RawSignedTx],
) -> Vec<Option<B256>>
where
    G: ChainGateway,
{
    let transfer_results: Vec<_> = join_all(transfer_txs.iter().map(|tx| async move {
        let ((), result) = tokio::join!(
            broadcast_private(private_gateways, &tx.raw),
            primary.submit_raw(&tx.raw),
        );
        result
    }))
    .await;

    for (i, result) in transfer_results.iter().enumerate() {
        match result {
            Ok(hash) => tracing::info!(tag = "SENT", index = i, hash = %hash, "transfer tx submitted to primary"),
            Err(e) => {
                let reason = RescueError::SubmissionRefused(e.to_string());
                tracing::warn!(tag = "FAILED", index = i, %reason, "primary refused transfer tx");
            }
        }
    }

    transfer_results.iter().map(|r| r.as_ref().ok().copied()).collect()
}

/// Awaits a receipt for each accepted transfer hash, returning the indexes
/// that reverted, dropped, or never confirmed.
async fn confirm_transfers<G>(primary: &G, transfer_hashes: &[Option<B256>]) -> Vec<usize>
where
    G: ChainGateway,
{
    let receipts = join_all(transfer_hashes.iter().map(|hash| async move {
        match hash {
            Some(hash) => Some(primary.await_receipt(*hash, 1).await),
            None => None,
        }
    }))
    .await;

    let mut failing_indexes = Vec::new();
    for (i, receipt) in receipts.iter().enumerate() {
        match receipt {
            Some(Ok(r)) if r.succeeded() => {
                tracing::info!(tag = "CONFIRMED", index = i, "transfer tx confirmed");
            }
            Some(Ok(_)) => {
                let reason = RescueError::Reverted(format!("transfer {i} reverted"));
                tracing::warn!(tag = "FAILED", index = i, %reason, "transfer tx reverted");
                failing_indexes.push(i);
            }
            Some(Err(e)) => {
                let reason = RescueError::Timeout(e.to_string());
                tracing::warn!(tag = "FAILED", index = i, %reason, "transfer receipt wait failed, treating as revert");
                failing_indexes.push(i);
            }
            None => failing_indexes.push(i),
        }
    }
    failing_indexes
}

/// Submits `transfer_txs` and awaits a receipt for each accepted one.
///
/// Used by the Retry Controller's partial-progress fast path (spec.md §4.5
/// step 4), which resubmits only the transfers without touching the funding
/// tx, so there is no separate funding-confirmation step to interleave with.
pub async fn submit_and_confirm_transfers<G>(
    primary: &G,
    private_gateways: &[&dyn PrivateGateway],
    transfer_txs: &[RawSignedTx],
) -> (Vec<Option<B256>>, Vec<usize>)
where
    G: ChainGateway,
{
    let transfer_hashes = submit_transfers(primary, private_gateways, transfer_txs).await;
    let failing_indexes = confirm_transfers(primary, &transfer_hashes).await;
    (transfer_hashes, failing_indexes)
}

/// Runs one Submission Engine attempt over an already-signed `bundle`.
///
/// # Errors
/// Returns [`RescueError::Network`] only for transport failures the engine
/// cannot classify into an [`AttemptOutcome`] (e.g. the nonce-staleness
/// re-query itself failing); ordinary submission/confirmation failures are
/// reported as `Ok` with a non-`Success` outcome, per spec.md §7.
#[allow(clippy::too_many_arguments)]
pub async fn run_attempt<G, S>(
    bundle: &SignedRescueBundle,
    primary: &G,
    private_gateways: &[&dyn PrivateGateway],
    signer: &S,
    executor_key: &S::Key,
    executor_addr: Address,
    transfer_calls: &[TransferCall],
) -> Result<AttemptReport, RescueError>
where
    G: ChainGateway,
    S: SigningAuthority,
{
    // Step 1: nonce-staleness guard.
    let current_executor_nonce = primary
        .nonce_at(executor_addr, NonceTag::Pending)
        .await
        .map_err(|e| RescueError::Network(e.to_string()))?;

    let transfer_txs = if current_executor_nonce == bundle.executor_nonce {
        bundle.transfer_txs.clone()
    } else {
        tracing::info!(
            tag = "NONCE GUARD",
            expected = bundle.executor_nonce,
            observed = current_executor_nonce,
            "executor nonce advanced since planning, re-signing transfers",
        );
        sign_transfers(
            signer,
            executor_key,
            bundle.chain_id,
            current_executor_nonce,
            transfer_calls,
            bundle.fee_quote.max_fee,
            bundle.fee_quote.priority_fee,
        )
        .map_err(|e| RescueError::PlanningFailed(e.to_string()))?
    };

    // Step 2: burst submission. Funding first, with private broadcast and
    // primary submission running concurrently rather than sequentially.
    let ((), funding_result) = tokio::join!(
        broadcast_private(private_gateways, &bundle.funding_tx.raw),
        primary.submit_raw(&bundle.funding_tx.raw),
    );

    let Ok(funding_hash) = funding_result else {
        let reason = RescueError::SubmissionRefused(funding_result.unwrap_err().to_string()).to_string();
        tracing::warn!(tag = "FAILED", reason = %reason, "primary refused funding tx");
        return Ok(AttemptReport {
            outcome: AttemptOutcome::SubmissionRefused(reason),
            funding_hash: None,
            transfer_hashes: vec![None; transfer_txs.len()],
        });
    };
    tracing::info!(tag = "SENT", hash = %funding_hash, "funding tx submitted to primary");

    // Transfer submissions (not confirmations) happen right after, still
    // before funding confirmation is awaited.
    let transfer_hashes = submit_transfers(primary, private_gateways, &transfer_txs).await;

    if transfer_hashes.iter().all(Option::is_none) && !transfer_txs.is_empty() {
        let reason = RescueError::SubmissionRefused("primary refused every transfer".to_string()).to_string();
        return Ok(AttemptReport {
            outcome: AttemptOutcome::SubmissionRefused(reason),
            funding_hash: Some(funding_hash),
            transfer_hashes,
        });
    }

    // Step 4: funding confirmation.
    let funding_receipt = primary.await_receipt(funding_hash, 1).await;
    let Ok(funding_receipt) = funding_receipt else {
        let reason = RescueError::Timeout(funding_receipt.unwrap_err().to_string()).to_string();
        return Ok(AttemptReport {
            outcome: AttemptOutcome::FundingFailed(reason),
            funding_hash: Some(funding_hash),
            transfer_hashes,
        });
    };
    if !funding_receipt.succeeded() {
        let reason = RescueError::Reverted("funding tx reverted".to_string()).to_string();
        return Ok(AttemptReport {
            outcome: AttemptOutcome::FundingFailed(reason),
            funding_hash: Some(funding_hash),
            transfer_hashes,
        });
    }
    tracing::info!(tag = "CONFIRMED", hash = %funding_hash, "funding tx confirmed");

    // Step 5: balance sanity check.
    if let Ok(balance) = primary.balance(executor_addr).await {
        if balance < bundle.total_executor_gas_cost / U256::from(2) {
            tracing::warn!(
                tag = "WARNING",
                balance = %balance,
                "executor balance below half of funded amount; sweeper likely intercepted",
            );
        }
    }

    // Step 6: transfer confirmation.
    let failing_indexes = confirm_transfers(primary, &transfer_hashes).await;

    // Step 7: outcome classification.
    let outcome = if failing_indexes.is_empty() {
        tracing::info!(tag = "SUCCESS", "all transfers confirmed");
        AttemptOutcome::Success
    } else {
        tracing::warn!(tag = "FAILED", hash = %funding_hash, "funding landed but some transfers failed");
        AttemptOutcome::FundingLandedTransfersFailed {
            funding_hash,
            failing_indexes,
            reason: RescueError::Reverted("one or more transfers reverted or dropped".to_string()).to_string(),
        }
    };

    Ok(AttemptReport {
        outcome,
        funding_hash: Some(funding_hash),
        transfer_hashes,
    })
}
