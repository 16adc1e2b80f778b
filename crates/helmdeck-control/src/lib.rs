//! Helmdeck console service
//!
//! This crate provides the operator console for Helm-managed cluster
//! deployments. It serves the editable values document (with templates
//! derived by [`helmdeck_values`]) and drives deployments through a cluster
//! backend.
//!
//! # Reconciliation
//!
//! A submitted deployment runs one pass of a fixed sequence:
//!
//! ```text
//! CheckNamespace ──▶ (CreateNamespace) ──▶ CheckRelease ──▶ PersistValues
//!                                                               │
//!                                        release absent ──▶ Install
//!                                        release exists ──▶ ReleaseExists
//! ```
//!
//! An existing release is never mutated in the pass that discovered it: the
//! console reports `ReleaseExists` and the operator confirms the upgrade as a
//! separate call, which applies the values persisted by the first pass.
//!
//! Existence queries fail open (a query error reads as "absent") and
//! namespace creation is best effort; only infrastructure failures such as an
//! unwritable working file abort a reconciliation.

#![forbid(unsafe_code)]

pub mod api;
pub mod cluster;
pub mod config;
pub mod error;
pub mod reconcile;
pub mod service;
pub mod workfile;

// Re-export commonly used types at the crate root
pub use cluster::{ClusterBackend, CommandOutput, HelmBackend, MockCluster, ReleaseSpec};
pub use config::{BackendType, ConsoleConfig, HelmConfig};
pub use error::{ConsoleError, ConsoleResult};
pub use reconcile::{
    assume_absent_on_error, DeployOutcome, DeployRequest, Reconciler, UpgradeRequest,
};
pub use service::ConsoleService;
pub use workfile::{ValuesFile, ValuesWorkdir};
