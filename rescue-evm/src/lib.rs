//! Concrete EVM bindings for the rescue orchestrator: an
//! `alloy-provider`-backed [`rescue_types::ChainGateway`] /
//! [`rescue_types::PrivateGateway`], an `alloy-signer-local`-backed
//! [`rescue_types::SigningAuthority`], and an ERC-20 calldata helper.
//!
//! This crate owns every `alloy-*` dependency in the workspace; neither
//! `rescue-types` nor `rescue-orchestrator` link against `alloy-provider` or
//! `alloy-signer-local` directly.

mod calldata;
mod gateway;
mod signer;

pub use calldata::erc20_transfer_calldata;
pub use gateway::{GatewayError, HttpChainGateway};
pub use signer::{Eip1559SigningAuthority, SignerError};
