//! Command-line and environment configuration.
//!
//! Recognized flags/variables (spec.md §6): `EXECUTOR_KEY`, `SPONSOR_KEY`,
//! `RECIPIENT`, `TOKEN`, `AMOUNT`, `PRIMARY_RPC_URL`, `PRIVATE_RPC_URLS`
//! (comma-separated, may be empty), `PRIORITY_FEE_GWEI`, `MAX_FEE_GWEI`.
//! Every flag falls back to the identically-named environment variable, so
//! a deployment can be driven entirely from a `.env` file.

use alloy_primitives::{Address, U256};
use alloy_signer_local::PrivateKeySigner;
use clap::Parser;
use url::Url;

/// Command-line arguments for the `rescue` binary.
#[derive(Debug, Parser)]
#[command(version, about = "Rescue fungible tokens from a compromised EVM account", long_about = None)]
pub struct CliArgs {
    /// The compromised account's private key (hex, with or without `0x`).
    #[arg(long, env = "EXECUTOR_KEY")]
    pub executor_key: String,

    /// The gas-paying account's private key (hex, with or without `0x`).
    #[arg(long, env = "SPONSOR_KEY")]
    pub sponsor_key: String,

    /// Safe destination address for the rescued tokens.
    #[arg(long, env = "RECIPIENT")]
    pub recipient: Address,

    /// ERC-20 token contract to transfer out of the executor.
    #[arg(long, env = "TOKEN")]
    pub token: Address,

    /// Raw token amount to transfer (in the token's smallest unit).
    #[arg(long, env = "AMOUNT")]
    pub amount: U256,

    /// Primary JSON-RPC endpoint, used for all chain reads and as the
    /// observed outcome source.
    #[arg(long, env = "PRIMARY_RPC_URL")]
    pub primary_rpc_url: Url,

    /// Comma-separated list of private (MEV-protected) RPC endpoints.
    /// May be empty.
    #[arg(long, env = "PRIVATE_RPC_URLS", default_value = "", value_delimiter = ',')]
    pub private_rpc_urls: Vec<Url>,

    /// Tip offered per unit gas, in gwei.
    #[arg(long, env = "PRIORITY_FEE_GWEI", default_value_t = 1)]
    pub priority_fee_gwei: u64,

    /// Nominal (unescalated) max fee per unit gas, in gwei.
    #[arg(long, env = "MAX_FEE_GWEI", default_value_t = 5)]
    pub max_fee_gwei: u64,

    /// Plan the bundle and print it without submitting anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Errors raised while resolving [`CliArgs`] into runtime values.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A private key string failed to parse.
    #[error("invalid private key: {0}")]
    InvalidKey(#[from] alloy_signer_local::LocalSignerError),
}

/// The two signing keys a rescue invocation needs, parsed once at startup.
#[derive(Debug, Clone)]
pub struct Keys {
    /// The sponsor's signer.
    pub sponsor: PrivateKeySigner,
    /// The executor's signer.
    pub executor: PrivateKeySigner,
}

impl CliArgs {
    /// Parses `executor_key` and `sponsor_key` into signers.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidKey`] if either string is not a valid
    /// secp256k1 private key.
    pub fn keys(&self) -> Result<Keys, ConfigError> {
        Ok(Keys { sponsor: self.sponsor_key.parse()?, executor: self.executor_key.parse()? })
    }
}
