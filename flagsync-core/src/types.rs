//! Domain types for flagsync.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.
//! All types are serializable/deserializable via serde.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A canonical derived configuration key, e.g.
/// `feature_fe_12_fl_3_checkout_enabled`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FlagKey(pub String);

impl fmt::Display for FlagKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for FlagKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for FlagKey {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A strongly-typed identifier for a target environment (e.g. `staging`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnvironmentId(pub String);

impl fmt::Display for EnvironmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for EnvironmentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EnvironmentId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Value type of a flag parameter, as declared in the flag block's `Type`
/// column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    #[default]
    Boolean,
    String,
    Number,
    Json,
}

impl ValueType {
    /// Parse a `Type` cell. Returns `None` for anything unrecognized so the
    /// caller can report the offending row.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "boolean" | "bool" => Some(ValueType::Boolean),
            "string" => Some(ValueType::String),
            "number" => Some(ValueType::Number),
            "json" => Some(ValueType::Json),
            _ => None,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Boolean => write!(f, "boolean"),
            ValueType::String => write!(f, "string"),
            ValueType::Number => write!(f, "number"),
            ValueType::Json => write!(f, "json"),
        }
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// One row of a document's flag block.
///
/// Only `key` is ever mutated by the anchoring workflow; every other cell
/// passes through parse→rebuild unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagRow {
    pub context: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<FlagKey>,
    pub value_type: ValueType,
    pub default_value: String,
    pub description: String,
}

impl FlagRow {
    /// Record update setting the derived key. Row order and all other cells
    /// are untouched.
    pub fn with_key(mut self, key: FlagKey) -> Self {
        self.key = Some(key);
        self
    }
}

/// The ordered rows of a document's flag block.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FlagBlock {
    pub rows: Vec<FlagRow>,
}

/// The numeric identifiers a document's frontmatter must carry before keys
/// can be derived for its rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureIds {
    pub feature_number: u32,
    pub flag_number: u32,
}

// ---------------------------------------------------------------------------
// Frontmatter
// ---------------------------------------------------------------------------

/// A frontmatter value — scalar string or string list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FrontmatterValue {
    Scalar(String),
    List(Vec<String>),
}

impl FrontmatterValue {
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            FrontmatterValue::Scalar(s) => Some(s),
            FrontmatterValue::List(_) => None,
        }
    }
}

/// Decoded frontmatter: an order-preserving list of key/value entries.
///
/// Entry order matters because [`update`](Frontmatter::update) re-serializes
/// the block keeping unmodified keys where they were.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Frontmatter {
    pub entries: Vec<(String, FrontmatterValue)>,
}

impl Frontmatter {
    pub fn get(&self, key: &str) -> Option<&FrontmatterValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn scalar(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(FrontmatterValue::as_scalar)
    }

    /// Set a key in place, preserving its position if it already exists and
    /// appending at the end otherwise.
    pub fn set(&mut self, key: &str, value: FrontmatterValue) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value,
            None => self.entries.push((key.to_owned(), value)),
        }
    }

    /// Extract the `featureNumber` / `flagNumber` pair, validated as
    /// non-negative integers. Returns `None` when either field is missing
    /// or non-numeric.
    pub fn feature_ids(&self) -> Option<FeatureIds> {
        let feature_number = self.scalar("featureNumber")?.trim().parse().ok()?;
        let flag_number = self.scalar("flagNumber")?.trim().parse().ok()?;
        Some(FeatureIds {
            feature_number,
            flag_number,
        })
    }

    /// Optional `issue_url` field linking the document to its tracker issue.
    pub fn issue_url(&self) -> Option<&str> {
        self.scalar("issue_url")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
