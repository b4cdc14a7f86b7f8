#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! The rescue orchestrator's core: Bundle Planner, Submission Engine, and
//! Retry Controller, generic over [`rescue_types::ChainGateway`],
//! [`rescue_types::PrivateGateway`], and [`rescue_types::SigningAuthority`]
//! so it can be driven against an in-memory mock in tests and against
//! `rescue-evm`'s `alloy-provider`-backed implementation in production.
//!
//! # Modules
//!
//! - [`planner`] — the Bundle Planner (spec.md §4.3)
//! - [`engine`] — the Submission Engine, one attempt at a time (spec.md §4.4)
//! - [`retry`] — the Retry Controller (spec.md §4.5), exposing [`rescue`] as
//!   the single entry point external callers use

pub mod engine;
pub mod planner;
pub mod retry;

#[cfg(test)]
mod mock;

pub use engine::{AttemptReport, run_attempt};
pub use planner::{PlannerInputs, plan_bundle};
pub use retry::{RescueInputs, rescue};
