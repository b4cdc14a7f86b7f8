#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Core types and traits for the rescue orchestrator.
//!
//! This crate is blockchain-agnostic in the sense that it does not depend on
//! `alloy-provider` or `alloy-signer`: it only fixes the shapes a concrete
//! chain implementation (see `rescue-evm`) and the orchestrator (see
//! `rescue-orchestrator`) program against.
//!
//! # Modules
//!
//! - [`constants`] — calibration constants exposed for external tuning
//! - [`error`] — the error taxonomy shared across the workspace
//! - [`gateway`] — the `ChainGateway` / `PrivateGateway` traits and their
//!   supporting types
//! - [`signer`] — the pure `SigningAuthority` trait and transaction template
//! - [`types`] — the bundle/outcome/result data model

pub mod constants;
pub mod error;
pub mod gateway;
pub mod signer;
pub mod types;

pub use error::RescueError;
pub use gateway::{CallParams, ChainGateway, NonceTag, PrivateGateway, Receipt};
pub use signer::{SigningAuthority, TxTemplate};
pub use types::{
    AttemptOutcome, FeeQuote, RawSignedTx, RescueResult, SignedRescueBundle, TransferCall,
};
