//! Flagsync core library — domain types, key derivation, config, errors.
//!
//! Public API surface:
//! - [`types`] — newtypes and domain structs
//! - [`keys`] — canonical flag-key derivation and parsing
//! - [`config`] — `flagsync.yaml` load / save
//! - [`error`] — [`ConfigError`]

pub mod config;
pub mod error;
pub mod keys;
pub mod types;

pub use config::{Config, Environment};
pub use error::ConfigError;
pub use keys::{derive_flag_key, is_valid_flag_key, parse_flag_key, sanitize_context};
pub use types::{
    EnvironmentId, FeatureIds, FlagBlock, FlagKey, FlagRow, Frontmatter, FrontmatterValue,
    ValueType,
};
