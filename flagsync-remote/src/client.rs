//! Versioned remote-config service.
//!
//! The remote template is an opaque versioned resource: `fetch` returns the
//! template plus a version token (the HTTP ETag), `publish` is conditioned
//! on that token via `If-Match`, and a stale token surfaces as
//! [`RemoteError::VersionConflict`]. No retries happen here; retry policy
//! belongs to the invoking CI layer.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use serde_json::json;

use flagsync_core::config::{Config, Environment};

use crate::error::RemoteError;
use crate::template::Template;

const SERVICE_KEY_VAR: &str = "FLAGSYNC_SERVICE_KEY";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A short-lived bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken(pub String);

/// Opaque version token for optimistic concurrency (HTTP ETag).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionToken(pub String);

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Capability seam for the remote-config backend.
pub trait RemoteConfigService {
    fn get_access_token(&self) -> Result<AccessToken, RemoteError>;

    fn fetch(
        &self,
        env: &Environment,
        token: &AccessToken,
    ) -> Result<(Template, VersionToken), RemoteError>;

    /// Publish `template` iff the live version still matches `expected`.
    fn publish(
        &self,
        env: &Environment,
        token: &AccessToken,
        template: &Template,
        expected: &VersionToken,
    ) -> Result<(), RemoteError>;
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

/// Production client speaking the remote-config REST surface.
pub struct HttpRemoteConfig {
    agent: ureq::Agent,
    token_url: String,
    project_id: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl HttpRemoteConfig {
    /// Build a client from the workspace config. The service key is read
    /// from the `FLAGSYNC_SERVICE_KEY` environment variable at token time,
    /// so workflows that never touch the remote do not need it set.
    pub fn from_config(config: &Config) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build(),
            token_url: config.token_url.clone(),
            project_id: config.project_id.clone(),
        }
    }

    fn template_url(&self, env: &Environment) -> String {
        format!(
            "{}/v1/projects/{}/remoteConfig",
            env.api_url.trim_end_matches('/'),
            self.project_id
        )
    }
}

impl RemoteConfigService for HttpRemoteConfig {
    fn get_access_token(&self) -> Result<AccessToken, RemoteError> {
        let service_key = std::env::var(SERVICE_KEY_VAR).map_err(|_| RemoteError::Auth {
            reason: format!("{SERVICE_KEY_VAR} is not set"),
        })?;
        let response = self
            .agent
            .post(&self.token_url)
            .send_json(json!({
                "project_id": self.project_id,
                "key": service_key,
            }))
            .map_err(|e| RemoteError::Auth {
                reason: e.to_string(),
            })?;
        let token: TokenResponse = response.into_json().map_err(|e| RemoteError::Auth {
            reason: format!("malformed token response: {e}"),
        })?;
        Ok(AccessToken(token.access_token))
    }

    fn fetch(
        &self,
        env: &Environment,
        token: &AccessToken,
    ) -> Result<(Template, VersionToken), RemoteError> {
        let url = self.template_url(env);
        let response = self
            .agent
            .get(&url)
            .set("Authorization", &format!("Bearer {}", token.0))
            .call()
            .map_err(|e| RemoteError::Fetch {
                reason: e.to_string(),
            })?;
        let etag = response
            .header("ETag")
            .map(str::to_owned)
            .ok_or_else(|| RemoteError::Fetch {
                reason: format!("{url} returned no ETag header"),
            })?;
        let template: Template = response.into_json().map_err(|e| RemoteError::Fetch {
            reason: format!("malformed template payload: {e}"),
        })?;
        log::debug!("fetched template for '{}' at version {etag}", env.id);
        Ok((template, VersionToken(etag)))
    }

    fn publish(
        &self,
        env: &Environment,
        token: &AccessToken,
        template: &Template,
        expected: &VersionToken,
    ) -> Result<(), RemoteError> {
        let url = self.template_url(env);
        let result = self
            .agent
            .put(&url)
            .set("Authorization", &format!("Bearer {}", token.0))
            .set("If-Match", &expected.0)
            .send_json(template);
        match result {
            Ok(response) => {
                log::info!(
                    "published template for '{}' (new version {})",
                    env.id,
                    response.header("ETag").unwrap_or("unknown")
                );
                Ok(())
            }
            Err(ureq::Error::Status(409 | 412, response)) => Err(RemoteError::VersionConflict {
                expected: expected.0.clone(),
                actual: response.header("ETag").unwrap_or("unknown").to_owned(),
            }),
            Err(e) => Err(RemoteError::Publish {
                reason: e.to_string(),
            }),
        }
    }
}
