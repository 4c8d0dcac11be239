//! Canonical flag-key derivation and parsing.
//!
//! Key format: `feature_fe_<featureNumber>_fl_<flagNumber>_<context>_enabled`
//! where `<context>` is the sanitized free-text context. Derivation and
//! parsing are exact inverses modulo sanitization:
//! `parse_flag_key(derive_flag_key(f, l, c)) == (f, l, sanitize_context(c))`.

use std::sync::OnceLock;

use regex::Regex;

use crate::types::FlagKey;

/// Result of a successful [`parse_flag_key`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFlagKey {
    pub feature_number: u32,
    pub flag_number: u32,
    pub context: String,
}

fn key_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^feature_fe_(\d+)_fl_(\d+)_([a-z0-9_]*)_enabled$")
            .expect("flag key pattern is valid")
    })
}

/// Lowercase, collapse every run of non-alphanumeric characters into a single
/// underscore, trim leading/trailing underscores.
///
/// Total (empty input yields empty output) and idempotent.
pub fn sanitize_context(context: &str) -> String {
    let mut out = String::with_capacity(context.len());
    let mut pending_sep = false;
    for ch in context.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(ch);
        } else {
            pending_sep = true;
        }
    }
    out
}

/// Derive the canonical key for a `(featureNumber, flagNumber, context)`
/// triple. The context is sanitized; an empty sanitized context yields an
/// empty segment (`feature_fe_5_fl_2__enabled`).
pub fn derive_flag_key(feature_number: u32, flag_number: u32, context: &str) -> FlagKey {
    FlagKey(format!(
        "feature_fe_{feature_number}_fl_{flag_number}_{}_enabled",
        sanitize_context(context)
    ))
}

/// Predicate-like parse: `Some` iff `key` matches the canonical format with
/// numeric groups. Never fails — a non-matching key is simply `None`.
pub fn parse_flag_key(key: &str) -> Option<ParsedFlagKey> {
    let caps = key_pattern().captures(key)?;
    // Numeric groups larger than u32 are treated as non-matching.
    let feature_number = caps[1].parse().ok()?;
    let flag_number = caps[2].parse().ok()?;
    Some(ParsedFlagKey {
        feature_number,
        flag_number,
        context: caps[3].to_owned(),
    })
}

/// True iff `key` conforms to the managed key format. Only keys passing this
/// predicate are ever eligible for automatic removal.
pub fn is_valid_flag_key(key: &str) -> bool {
    parse_flag_key(key).is_some()
}
