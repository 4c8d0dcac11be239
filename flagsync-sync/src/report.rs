//! Run summaries. Pure output of the orchestrator, consumed by the CLI's
//! human report and the `--json` CI step summary; never mutated after
//! creation.

use std::path::PathBuf;

use serde::Serialize;

/// Outcome of the anchoring workflow.
#[derive(Debug, Clone, Serialize)]
pub struct AnchorSummary {
    pub documents_scanned: usize,
    pub documents_skipped: usize,
    pub keys_anchored: usize,
    /// Documents whose text changed (or would change in dry-run).
    pub documents_rewritten: Vec<PathBuf>,
    /// Review branch name, when one was (or would be) pushed.
    pub branch: Option<String>,
    pub dry_run: bool,
}

/// Outcome of syncing one environment.
#[derive(Debug, Clone, Serialize)]
pub struct SyncSummary {
    pub environment: String,
    pub documents_scanned: usize,
    pub documents_skipped: usize,
    pub active_keys: usize,
    pub added: Vec<String>,
    pub updated: Vec<String>,
    pub removed: Vec<String>,
    /// False when the plan was empty or the run was a dry-run.
    pub published: bool,
    pub dry_run: bool,
}

/// Per-environment removals of the garbage-collect workflow.
#[derive(Debug, Clone, Serialize)]
pub struct GcEnvironmentResult {
    pub environment: String,
    pub removed: Vec<String>,
    pub published: bool,
}

/// Outcome of the garbage-collect workflow.
#[derive(Debug, Clone, Serialize)]
pub struct GcSummary {
    pub documents_scanned: usize,
    pub documents_skipped: usize,
    pub environments: Vec<GcEnvironmentResult>,
    /// Tracker issues closed (or that would be closed in dry-run).
    pub issues_closed: Vec<String>,
    /// Orphaned keys with no matching tracker issue; skipped, not fatal.
    pub issues_missing: Vec<String>,
    pub dry_run: bool,
}

/// Outcome of a single-parameter update.
#[derive(Debug, Clone, Serialize)]
pub struct SetSummary {
    pub environment: String,
    pub key: String,
    pub value: String,
    pub published: bool,
    pub dry_run: bool,
}
