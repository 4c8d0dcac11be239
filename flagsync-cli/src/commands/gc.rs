//! `flagsync gc` — remove orphaned flags and close their tracker issues.

use anyhow::{Context, Result};
use clap::Args;

use flagsync_docs::FsStore;
use flagsync_sync::Pipeline;

/// Arguments for `flagsync gc`.
#[derive(Args, Debug)]
pub struct GcArgs {
    /// Compute removals against real data without publishing or closing.
    #[arg(long)]
    pub dry_run: bool,

    /// Emit the run summary as JSON (CI step summaries).
    #[arg(long)]
    pub json: bool,
}

impl GcArgs {
    pub fn run(self) -> Result<()> {
        let (config, remote, tracker) = super::setup()?;
        let pipeline = Pipeline::new(&config, &FsStore, &remote, &tracker, self.dry_run);
        let summary = pipeline
            .collect_garbage()
            .context("garbage-collect workflow failed")?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
            return Ok(());
        }

        let prefix = if summary.dry_run { "[dry-run] " } else { "" };
        let total: usize = summary.environments.iter().map(|e| e.removed.len()).sum();
        if total == 0 {
            println!("{prefix}✓ no orphaned flags — nothing to do");
            return Ok(());
        }
        for env in &summary.environments {
            if env.removed.is_empty() {
                continue;
            }
            println!("{prefix}✓ '{}' — removed {} orphaned keys", env.environment, env.removed.len());
            for key in &env.removed {
                println!("  -  {key}");
            }
        }
        for title in &summary.issues_closed {
            println!("{prefix}closed issue '{title}'");
        }
        for key in &summary.issues_missing {
            println!("{prefix}no tracker issue for '{key}' (skipped)");
        }
        Ok(())
    }
}
