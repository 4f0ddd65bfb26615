//! Process environment snapshot.

use std::collections::BTreeMap;

/// Environment variables plus the active environment name.
///
/// Passed into the loader explicitly; nothing below the binary reads the
/// process environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    name: Option<String>,
    vars: BTreeMap<String, String>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from variables, taking the environment name from `variable`.
    pub fn from_vars<I, K, V>(variable: &str, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: BTreeMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        let name = vars.get(variable).cloned();
        Self { name, vars }
    }

    /// Snapshot of the current process environment.
    pub fn from_process(variable: &str) -> Self {
        Self::from_vars(variable, std::env::vars())
    }

    /// Override the active environment name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn vars(&self) -> &BTreeMap<String, String> {
        &self.vars
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Variables as a JSON object.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.vars
                .iter()
                .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
                .collect(),
        )
    }
}
