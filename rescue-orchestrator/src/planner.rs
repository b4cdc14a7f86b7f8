//! The Bundle Planner: computes gas prices, funding amount, per-transfer gas
//! limits, and nonce assignments, then signs a [`SignedRescueBundle`].

use alloy_primitives::{Address, Bytes, U256};
use rescue_types::constants::{
    FUNDING_GAS_LIMIT_DELEGATED, FUNDING_GAS_LIMIT_EOA, MAX_FEE_CAP_GWEI, WEI_PER_GWEI,
};
use rescue_types::error::RescueError;
use rescue_types::gateway::{ChainGateway, NonceTag};
use rescue_types::signer::{SigningAuthority, TxTemplate};
use rescue_types::types::{FeeQuote, RawSignedTx, SignedRescueBundle, TransferCall, Wei};

/// Everything the Bundle Planner needs, in one place so callers (the Retry
/// Controller's full-replan path) construct it once per attempt.
#[derive(Debug, Clone, Copy)]
pub struct PlannerInputs<'a> {
    /// The sponsor's address (funding source).
    pub sponsor_addr: Address,
    /// The executor's address (compromised account, token source).
    pub executor_addr: Address,
    /// Whether the executor account carries delegated code (EIP-7702).
    pub executor_is_contract: bool,
    /// Tip offered per unit gas, in gwei.
    pub priority_fee_gwei: u64,
    /// Nominal (unescalated) max fee per unit gas, in gwei.
    pub max_fee_gwei: u64,
    /// Current escalation step, as an integer percent (100 on the first
    /// attempt; see [`rescue_types::constants::escalate_gas_factor`]).
    pub gas_factor_percent: u64,
    /// The transfer calls the executor must emit, in stable order.
    pub transfer_calls: &'a [TransferCall],
}

/// Computes `effective_max_fee` (spec.md §4.3 steps 2–3): scale the nominal
/// max fee by the current escalation factor, cap it, then raise it to at
/// least `base_fee * 2 + priority_fee` so a single base-fee doubling before
/// inclusion cannot price the bundle out.
#[must_use]
pub fn effective_max_fee(base_fee: Wei, priority_fee_wei: Wei, max_fee_gwei: u64, gas_factor_percent: u64) -> Wei {
    let scaled_max_fee_gwei = u128::from(max_fee_gwei) * u128::from(gas_factor_percent) / 100;
    let capped_max_fee_gwei = scaled_max_fee_gwei.min(u128::from(MAX_FEE_CAP_GWEI));
    let capped_max_fee_wei = capped_max_fee_gwei * WEI_PER_GWEI;
    let headroom = base_fee.saturating_mul(2).saturating_add(priority_fee_wei);
    capped_max_fee_wei.max(headroom)
}

/// Signs `transfer_calls` against sequential nonces starting at
/// `executor_nonce`, at the given fee quote.
///
/// # Errors
/// Propagates the signing authority's error for the first call that fails.
pub fn sign_transfers<S: SigningAuthority>(
    signer: &S,
    executor_key: &S::Key,
    chain_id: u64,
    executor_nonce: u64,
    transfer_calls: &[TransferCall],
    max_fee_per_gas: Wei,
    max_priority_fee_per_gas: Wei,
) -> Result<Vec<RawSignedTx>, S::Error> {
    transfer_calls
        .iter()
        .enumerate()
        .map(|(i, call)| {
            let template = TxTemplate {
                chain_id,
                nonce: executor_nonce + i as u64,
                to: call.to,
                value: U256::ZERO,
                data: call.calldata.clone(),
                gas_limit: call.gas_limit,
                max_fee_per_gas,
                max_priority_fee_per_gas,
            };
            signer.sign(executor_key, &template)
        })
        .collect()
}

/// Runs the Bundle Planner: spec.md §4.3.
///
/// # Errors
/// Returns [`RescueError::PlanningFailed`] if any gateway call or signing
/// operation fails.
pub async fn plan_bundle<G, S>(
    primary: &G,
    signer: &S,
    sponsor_key: &S::Key,
    executor_key: &S::Key,
    inputs: PlannerInputs<'_>,
) -> Result<SignedRescueBundle, RescueError>
where
    G: ChainGateway,
    S: SigningAuthority,
{
    let block = primary
        .latest_block()
        .await
        .map_err(|e| RescueError::PlanningFailed(e.to_string()))?;
    let chain_id = primary
        .chain_id()
        .await
        .map_err(|e| RescueError::PlanningFailed(e.to_string()))?;

    let priority_fee_wei = u128::from(inputs.priority_fee_gwei) * WEI_PER_GWEI;
    let max_fee = effective_max_fee(
        block.base_fee_per_gas,
        priority_fee_wei,
        inputs.max_fee_gwei,
        inputs.gas_factor_percent,
    );

    let (sponsor_nonce, executor_nonce) = tokio::try_join!(
        primary.nonce_at(inputs.sponsor_addr, NonceTag::Pending),
        primary.nonce_at(inputs.executor_addr, NonceTag::Pending),
    )
    .map_err(|e| RescueError::PlanningFailed(e.to_string()))?;

    let total_executor_gas: u64 = inputs.transfer_calls.iter().map(|c| c.gas_limit).sum();
    let funding_value = U256::from(total_executor_gas) * U256::from(max_fee);

    let funding_gas_limit = if inputs.executor_is_contract {
        FUNDING_GAS_LIMIT_DELEGATED
    } else {
        FUNDING_GAS_LIMIT_EOA
    };

    let funding_template = TxTemplate {
        chain_id,
        nonce: sponsor_nonce,
        to: inputs.executor_addr,
        value: funding_value,
        data: Bytes::new(),
        gas_limit: funding_gas_limit,
        max_fee_per_gas: max_fee,
        max_priority_fee_per_gas: priority_fee_wei,
    };
    let funding_tx = signer
        .sign(sponsor_key, &funding_template)
        .map_err(|e| RescueError::PlanningFailed(e.to_string()))?;

    let transfer_txs = sign_transfers(
        signer,
        executor_key,
        chain_id,
        executor_nonce,
        inputs.transfer_calls,
        max_fee,
        priority_fee_wei,
    )
    .map_err(|e| RescueError::PlanningFailed(e.to_string()))?;

    tracing::info!(
        tag = "PLAN",
        sponsor_nonce,
        executor_nonce,
        max_fee_per_gas = max_fee,
        transfers = transfer_txs.len(),
        "bundle planned",
    );

    Ok(SignedRescueBundle {
        funding_tx,
        transfer_txs,
        fee_quote: FeeQuote {
            base_fee: block.base_fee_per_gas,
            priority_fee: priority_fee_wei,
            max_fee,
        },
        executor_nonce,
        sponsor_nonce,
        total_executor_gas_cost: funding_value,
        chain_id,
    })
}

#[cfg(test)]
mod tests {
    use rescue_types::constants::{INITIAL_GAS_FACTOR_PERCENT, escalate_gas_factor};

    use super::*;

    #[test]
    fn effective_max_fee_respects_cap() {
        // max_fee_gwei=100 at 100% would be 100 gwei, but the cap is 10.
        let fee = effective_max_fee(1, 0, 100, INITIAL_GAS_FACTOR_PERCENT);
        assert_eq!(fee, MAX_FEE_CAP_GWEI * WEI_PER_GWEI);
    }

    #[test]
    fn effective_max_fee_respects_headroom() {
        // base_fee is huge relative to max_fee_gwei's cap, so headroom wins.
        let base_fee = 50 * WEI_PER_GWEI;
        let priority_fee = WEI_PER_GWEI;
        let fee = effective_max_fee(base_fee, priority_fee, 1, INITIAL_GAS_FACTOR_PERCENT);
        assert_eq!(fee, base_fee * 2 + priority_fee);
    }

    #[test]
    fn escalation_increases_effective_fee_until_capped() {
        let low_cap_base_fee = 1;
        let f1 = effective_max_fee(low_cap_base_fee, 0, 1, INITIAL_GAS_FACTOR_PERCENT);
        let factor2 = escalate_gas_factor(INITIAL_GAS_FACTOR_PERCENT);
        let f2 = effective_max_fee(low_cap_base_fee, 0, 1, factor2);
        assert!(f2 >= f1);
    }
}
