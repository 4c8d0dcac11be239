//! `flagsync set` — point update of one parameter's default value.

use anyhow::{Context, Result};
use clap::Args;

use flagsync_core::types::EnvironmentId;
use flagsync_docs::FsStore;
use flagsync_sync::Pipeline;

/// Arguments for `flagsync set`.
#[derive(Args, Debug)]
pub struct SetArgs {
    /// Parameter key to update (must already exist).
    pub key: String,

    /// New default value.
    pub value: String,

    /// Target environment id (declared in flagsync.yaml).
    #[arg(long)]
    pub env: String,

    /// Report the update without publishing it.
    #[arg(long)]
    pub dry_run: bool,

    /// Emit the run summary as JSON (CI step summaries).
    #[arg(long)]
    pub json: bool,
}

impl SetArgs {
    pub fn run(self) -> Result<()> {
        let (config, remote, tracker) = super::setup()?;
        let env_id = EnvironmentId::from(self.env.as_str());
        let pipeline = Pipeline::new(&config, &FsStore, &remote, &tracker, self.dry_run);
        let summary = pipeline
            .set_parameter(&env_id, &self.key, &self.value)
            .with_context(|| format!("set failed for '{}' in '{env_id}'", self.key))?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
            return Ok(());
        }

        let prefix = if summary.dry_run { "[dry-run] " } else { "" };
        println!(
            "{prefix}✓ '{}' = '{}' in '{}' ({})",
            summary.key,
            summary.value,
            summary.environment,
            if summary.published {
                "published"
            } else {
                "not published"
            },
        );
        Ok(())
    }
}
