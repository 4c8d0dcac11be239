//! In-memory [`RemoteConfigService`] with real version-token semantics.
//!
//! Used by the pipeline test suites; behaves like the HTTP backend minus the
//! network: fetch hands out the current version, publish succeeds only when
//! the expected token still matches, and every successful publish bumps the
//! version.

use std::sync::Mutex;

use flagsync_core::config::Environment;

use crate::client::{AccessToken, RemoteConfigService, VersionToken};
use crate::error::RemoteError;
use crate::template::Template;

#[derive(Debug)]
struct State {
    template: Template,
    version: u64,
    publishes: u32,
}

/// Thread-safe fake remote.
#[derive(Debug)]
pub struct InMemoryRemote {
    state: Mutex<State>,
}

impl InMemoryRemote {
    pub fn new(template: Template) -> Self {
        Self {
            state: Mutex::new(State {
                template,
                version: 1,
                publishes: 0,
            }),
        }
    }

    /// Current template contents (what a fresh fetch would return).
    pub fn current_template(&self) -> Template {
        self.state.lock().expect("remote state").template.clone()
    }

    /// Current version token.
    pub fn current_version(&self) -> VersionToken {
        let state = self.state.lock().expect("remote state");
        VersionToken(format!("v{}", state.version))
    }

    /// Number of successful publishes so far.
    pub fn publish_count(&self) -> u32 {
        self.state.lock().expect("remote state").publishes
    }

    /// Simulate a concurrent writer: replace the template and bump the
    /// version so previously fetched tokens become stale.
    pub fn replace_template(&self, template: Template) {
        let mut state = self.state.lock().expect("remote state");
        state.template = template;
        state.version += 1;
    }
}

impl RemoteConfigService for InMemoryRemote {
    fn get_access_token(&self) -> Result<AccessToken, RemoteError> {
        Ok(AccessToken("in-memory".to_owned()))
    }

    fn fetch(
        &self,
        _env: &Environment,
        _token: &AccessToken,
    ) -> Result<(Template, VersionToken), RemoteError> {
        let state = self.state.lock().expect("remote state");
        Ok((
            state.template.clone(),
            VersionToken(format!("v{}", state.version)),
        ))
    }

    fn publish(
        &self,
        _env: &Environment,
        _token: &AccessToken,
        template: &Template,
        expected: &VersionToken,
    ) -> Result<(), RemoteError> {
        let mut state = self.state.lock().expect("remote state");
        let live = format!("v{}", state.version);
        if expected.0 != live {
            return Err(RemoteError::VersionConflict {
                expected: expected.0.clone(),
                actual: live,
            });
        }
        state.template = template.clone();
        state.version += 1;
        state.publishes += 1;
        Ok(())
    }
}
