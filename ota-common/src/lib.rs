//! # OT Assurance Twin Common Library
//!
//! Shared code for the OT Assurance Twin service:
//! - Asset data model (records, match candidates, reconciliation results)
//! - CSV ingest and record normalization
//! - Multi-strategy record reconciliation
//! - Security-tier classification and industry profiles
//! - Coverage and risk metrics
//! - Configuration loading

pub mod classify;
pub mod config;
pub mod dedup;
pub mod error;
pub mod industry;
pub mod ingest;
pub mod metrics;
pub mod model;
pub mod normalize;
pub mod reconcile;

pub use error::{Error, Result};
pub use model::{AssetRecord, MatchCandidate, MatchType, ReconciliationResult};
pub use reconcile::{reconcile, Reconciler};
