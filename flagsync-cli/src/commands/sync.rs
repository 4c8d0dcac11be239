//! `flagsync sync` — converge a target environment onto the documents.

use anyhow::{Context, Result};
use clap::Args;

use flagsync_core::types::EnvironmentId;
use flagsync_docs::FsStore;
use flagsync_sync::Pipeline;

/// Arguments for `flagsync sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Target environment id (declared in flagsync.yaml).
    #[arg(long)]
    pub env: String,

    /// Compute the full plan against real data without publishing.
    #[arg(long)]
    pub dry_run: bool,

    /// Emit the run summary as JSON (CI step summaries).
    #[arg(long)]
    pub json: bool,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let (config, remote, tracker) = super::setup()?;
        let env_id = EnvironmentId::from(self.env.as_str());
        let pipeline = Pipeline::new(&config, &FsStore, &remote, &tracker, self.dry_run);
        let summary = pipeline
            .sync_environment(&env_id)
            .with_context(|| format!("sync workflow failed for '{env_id}'"))?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
            return Ok(());
        }

        let prefix = if summary.dry_run { "[dry-run] " } else { "" };
        println!(
            "{prefix}✓ '{}' — {} active keys, +{} ~{} -{} ({})",
            summary.environment,
            summary.active_keys,
            summary.added.len(),
            summary.updated.len(),
            summary.removed.len(),
            if summary.published {
                "published"
            } else {
                "nothing published"
            },
        );
        for key in &summary.added {
            println!("  +  {key}");
        }
        for key in &summary.updated {
            println!("  ~  {key}");
        }
        for key in &summary.removed {
            println!("  -  {key}");
        }
        Ok(())
    }
}
