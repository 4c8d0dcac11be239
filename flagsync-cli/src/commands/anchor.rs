//! `flagsync anchor` — derive flag keys and write them into documents.

use anyhow::{Context, Result};
use clap::Args;

use flagsync_docs::FsStore;
use flagsync_sync::Pipeline;

/// Arguments for `flagsync anchor`.
#[derive(Args, Debug)]
pub struct AnchorArgs {
    /// Show what would be rewritten without touching any files.
    #[arg(long)]
    pub dry_run: bool,

    /// Emit the run summary as JSON (CI step summaries).
    #[arg(long)]
    pub json: bool,
}

impl AnchorArgs {
    pub fn run(self) -> Result<()> {
        let (config, remote, tracker) = super::setup()?;
        let pipeline = Pipeline::new(&config, &FsStore, &remote, &tracker, self.dry_run);
        let summary = pipeline.anchor_keys().context("anchor workflow failed")?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
            return Ok(());
        }

        let prefix = if summary.dry_run { "[dry-run] " } else { "" };
        if summary.keys_anchored == 0 {
            println!("{prefix}✓ all flag rows already anchored — nothing to do");
            return Ok(());
        }
        println!(
            "{prefix}✓ anchored {} keys across {} documents ({} scanned, {} skipped)",
            summary.keys_anchored,
            summary.documents_rewritten.len(),
            summary.documents_scanned,
            summary.documents_skipped,
        );
        for path in &summary.documents_rewritten {
            println!("  ✎  {}", path.display());
        }
        if let Some(branch) = &summary.branch {
            println!("{prefix}review branch: {branch}");
        }
        Ok(())
    }
}
