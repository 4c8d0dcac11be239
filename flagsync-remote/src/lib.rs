//! # flagsync-remote
//!
//! Remote-config template model and the versioned remote service.
//!
//! [`Template`] operations are pure; [`RemoteConfigService`] is the
//! capability seam the pipeline talks through, with [`HttpRemoteConfig`]
//! for production and [`memory::InMemoryRemote`] for tests.

pub mod client;
pub mod error;
pub mod memory;
pub mod template;

pub use client::{AccessToken, HttpRemoteConfig, RemoteConfigService, VersionToken};
pub use error::RemoteError;
pub use template::{Condition, ParameterDefinition, Template};
