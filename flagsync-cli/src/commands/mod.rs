pub mod anchor;
pub mod gc;
pub mod set;
pub mod sync;

use anyhow::{Context, Result};

use flagsync_core::config::{self, Config};
use flagsync_remote::HttpRemoteConfig;
use flagsync_sync::GhTracker;

/// Load the workspace config and build the production collaborators.
pub(crate) fn setup() -> Result<(Config, HttpRemoteConfig, GhTracker)> {
    let config = config::load().context("failed to load flagsync.yaml")?;
    let remote = HttpRemoteConfig::from_config(&config);
    let tracker = GhTracker::new(config.tracker_repo.clone());
    Ok((config, remote, tracker))
}
