//! # flagsync-sync
//!
//! Reconciliation engine and sync orchestration.
//!
//! Build a [`Pipeline`] over the document store, remote service, and tracker
//! collaborators, then run one of the workflows: [`Pipeline::anchor_keys`],
//! [`Pipeline::sync_environment`], [`Pipeline::collect_garbage`], or
//! [`Pipeline::set_parameter`]. Dry-run mode executes the full scan /
//! derive / reconcile stages against real data and reports what would
//! change without mutating anything.

pub mod error;
pub mod pipeline;
pub mod reconcile;
pub mod report;
pub mod tracker;
pub mod writer;

pub use error::SyncError;
pub use pipeline::Pipeline;
pub use reconcile::{reconcile, ReconcilePlan};
pub use report::{AnchorSummary, GcEnvironmentResult, GcSummary, SetSummary, SyncSummary};
pub use tracker::{GhTracker, Tracker, TrackerError};
pub use writer::{atomic_write, WriteResult};
