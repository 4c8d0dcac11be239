//! In-memory remote-config template and its pure operations.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use flagsync_core::keys::is_valid_flag_key;
use flagsync_core::types::{FlagKey, ValueType};

use crate::error::RemoteError;

/// One parameter definition in the remote template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterDefinition {
    pub default_value: String,
    #[serde(default)]
    pub value_type: ValueType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A named targeting condition. Order matters to the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub name: String,
    pub expression: String,
}

/// The remote configuration template. Owned by the remote service; a local
/// copy lives only for the duration of one reconciliation cycle.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Template {
    #[serde(default)]
    pub parameters: BTreeMap<String, ParameterDefinition>,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl Template {
    /// `{ parameters: {}, conditions: [] }`.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A template containing exactly the desired parameters, no conditions.
    pub fn fragment(desired: impl IntoIterator<Item = (FlagKey, ParameterDefinition)>) -> Self {
        Self {
            parameters: desired.into_iter().map(|(k, p)| (k.0, p)).collect(),
            conditions: Vec::new(),
        }
    }

    /// Union of both templates; the fragment wins on key collision.
    ///
    /// Conditions are concatenated base-first without deduplication — this
    /// matches the upstream service's documented behavior; conflict
    /// resolution is the caller's responsibility.
    pub fn merge(base: &Template, fragment: &Template) -> Template {
        let mut parameters = base.parameters.clone();
        for (key, def) in &fragment.parameters {
            parameters.insert(key.clone(), def.clone());
        }
        let mut conditions = base.conditions.clone();
        conditions.extend(fragment.conditions.iter().cloned());
        Template {
            parameters,
            conditions,
        }
    }

    /// The set of parameter keys matching the managed FlagKey format.
    /// Manually curated keys are excluded.
    pub fn extract_flag_keys(&self) -> BTreeSet<FlagKey> {
        self.parameters
            .keys()
            .filter(|key| is_valid_flag_key(key))
            .map(|key| FlagKey::from(key.as_str()))
            .collect()
    }

    pub fn find_parameter(&self, key: &str) -> Option<&ParameterDefinition> {
        self.parameters.get(key)
    }

    /// Point update of an existing parameter's default value. Absent keys
    /// are a [`RemoteError::NotFound`]; creation only happens through
    /// fragment merge.
    pub fn update_parameter_value(&mut self, key: &str, value: &str) -> Result<(), RemoteError> {
        match self.parameters.get_mut(key) {
            Some(def) => {
                def.default_value = value.to_owned();
                Ok(())
            }
            None => Err(RemoteError::NotFound {
                key: key.to_owned(),
            }),
        }
    }

    pub fn remove_parameter(&mut self, key: &str) -> bool {
        self.parameters.remove(key).is_some()
    }
}
