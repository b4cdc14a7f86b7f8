//! `rescue`: the command-line collaborator that wires a live EVM chain into
//! the orchestrator core.
//!
//! Environment: reads `.env` via `dotenvy` before parsing flags, so every
//! setting in spec.md §6 can be supplied as an environment variable in a
//! deployment rather than typed on the command line each time.

mod config;

use std::process::ExitCode;

use alloy_primitives::U256;
use rescue_evm::{Eip1559SigningAuthority, HttpChainGateway, erc20_transfer_calldata};
use rescue_orchestrator::{PlannerInputs, RescueInputs, plan_bundle, rescue};
use rescue_types::constants::{DEFAULT_TRANSFER_GAS, MAX_FEE_CAP_GWEI, WEI_PER_GWEI};
use rescue_types::error::RescueError;
use rescue_types::gateway::{CallParams, ChainGateway, PrivateGateway};
use rescue_types::types::TransferCall;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::CliArgs;

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    init_tracing();

    let args = <CliArgs as clap::Parser>::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            tracing::error!(tag = "FAILED", error = %message, "rescue did not complete");
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

#[allow(clippy::print_stdout)]
async fn run(args: CliArgs) -> Result<(), String> {
    let keys = args.keys().map_err(|e| e.to_string())?;

    let primary = HttpChainGateway::new(args.primary_rpc_url.clone());
    let private_endpoints: Vec<HttpChainGateway> =
        args.private_rpc_urls.iter().cloned().map(HttpChainGateway::new).collect();
    let private_gateways: Vec<&dyn PrivateGateway> =
        private_endpoints.iter().map(|g| g as &dyn PrivateGateway).collect();

    let signer = Eip1559SigningAuthority;
    let sponsor_addr = keys.sponsor.address();
    let executor_addr = keys.executor.address();

    let code = primary.code(executor_addr).await.map_err(|e| e.to_string())?;
    let executor_is_contract = !code.is_empty();
    if executor_is_contract {
        tracing::info!(tag = "WARNING", executor = %executor_addr, "executor carries delegated code, using EIP-7702 funding gas limit");
    }

    let calldata = erc20_transfer_calldata(args.token, args.amount);
    let estimated_gas = primary
        .estimate_gas(CallParams { from: executor_addr, to: args.token, data: calldata.clone() })
        .await
        .unwrap_or(DEFAULT_TRANSFER_GAS);
    let transfer_calls = vec![TransferCall { to: args.token, calldata, gas_limit: estimated_gas }];

    check_funds_sufficient(&primary, sponsor_addr, &transfer_calls, args.max_fee_gwei)
        .await
        .map_err(|e| e.to_string())?;

    if args.dry_run {
        let planner_inputs = PlannerInputs {
            sponsor_addr,
            executor_addr,
            executor_is_contract,
            priority_fee_gwei: args.priority_fee_gwei,
            max_fee_gwei: args.max_fee_gwei,
            gas_factor_percent: 100,
            transfer_calls: &transfer_calls,
        };
        let bundle = plan_bundle(&primary, &signer, &keys.sponsor, &keys.executor, planner_inputs)
            .await
            .map_err(|e| e.to_string())?;
        println!("dry run: would submit funding tx {} and {} transfer(s)", bundle.funding_tx.hash, bundle.transfer_txs.len());
        for tx in &bundle.transfer_txs {
            println!("  transfer tx {} (nonce {})", tx.hash, tx.nonce);
        }
        return Ok(());
    }

    let inputs = RescueInputs {
        sponsor_addr,
        executor_addr,
        sponsor_key: &keys.sponsor,
        executor_key: &keys.executor,
        executor_is_contract,
        transfer_calls: &transfer_calls,
        priority_fee_gwei: args.priority_fee_gwei,
        max_fee_gwei: args.max_fee_gwei,
    };

    let result = rescue(&primary, &private_gateways, &signer, inputs).await;

    if let Some(hash) = result.funding_hash {
        println!("funding tx:   {hash}");
    }
    for hash in &result.transfer_hashes {
        println!("transfer tx:  {hash}");
    }
    println!("attempts:     {}", result.attempts);
    println!("outcome:      {}", if result.success { "success" } else { "failed" });

    if result.success {
        Ok(())
    } else {
        Err(result.last_error.unwrap_or_else(|| "rescue failed for an unknown reason".to_string()))
    }
}

/// Pre-flight balance check (spec.md §7 `FundsInsufficient`): the sponsor
/// must be able to cover the worst-case funding value plus the funding tx's
/// own gas, at the escalation ladder's ceiling, before the orchestrator ever
/// signs anything.
///
/// # Errors
/// Returns [`RescueError::FundsInsufficient`] if the sponsor's balance falls
/// short, or [`RescueError::Network`] if the balance query itself fails.
async fn check_funds_sufficient(
    primary: &HttpChainGateway,
    sponsor_addr: alloy_primitives::Address,
    transfer_calls: &[TransferCall],
    max_fee_gwei: u64,
) -> Result<(), RescueError> {
    let worst_case_fee_wei = u128::from(max_fee_gwei.max(MAX_FEE_CAP_GWEI)) * WEI_PER_GWEI;
    let total_transfer_gas: u64 = transfer_calls.iter().map(|c| c.gas_limit).sum();
    let funding_value = U256::from(total_transfer_gas) * U256::from(worst_case_fee_wei);
    let funding_tx_cost = U256::from(21_000u64) * U256::from(worst_case_fee_wei);
    let required = funding_value + funding_tx_cost;

    let balance = primary
        .balance(sponsor_addr)
        .await
        .map_err(|e| RescueError::Network(e.to_string()))?;
    if balance < required {
        return Err(RescueError::FundsInsufficient(format!(
            "have {balance}, need at least {required} wei to cover worst-case funding and gas"
        )));
    }
    Ok(())
}
