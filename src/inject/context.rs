//! Injection contexts.
//!
//! # Responsibilities
//! - Hold the values a route node's modules can see
//! - Merge ancestor injections, index exports and environment flags
//!
//! # Design Decisions
//! - Right-biased union: later sources override earlier ones
//! - `env` always holds the whole variable map
//! - The active environment adds `<sigil><lowercased name> = true`, so
//!   modules test a flag instead of comparing strings
//! - Contexts are immutable once built and shared by `Arc`

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::config::EnvironmentConfig;
use crate::http::Handler;
use crate::inject::environment::Environment;
use crate::modules::Value;

/// Key under which the environment variable map is injected.
pub const ENV_KEY: &str = "env";

/// Values visible to one route node.
#[derive(Clone, Default)]
pub struct InjectionContext {
    values: Arc<BTreeMap<String, Value>>,
}

impl InjectionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`InjectionContext::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        Arc::make_mut(&mut self.values).insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn data(&self, key: &str) -> Option<&serde_json::Value> {
        self.get(key).and_then(Value::as_data)
    }

    pub fn handler(&self, key: &str) -> Option<&Handler> {
        self.get(key).and_then(Value::as_handler)
    }

    pub fn shared<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        self.get(key).and_then(Value::downcast::<T>)
    }

    /// True only for a boolean `true` under `key`.
    pub fn flag(&self, key: &str) -> bool {
        matches!(self.data(key), Some(serde_json::Value::Bool(true)))
    }

    /// A variable from the injected environment map.
    pub fn env(&self, name: &str) -> Option<&str> {
        self.data(ENV_KEY)?.get(name)?.as_str()
    }

    /// Copy with `entries` laid over this context.
    pub fn merged<I>(&self, entries: I) -> Self
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        let mut values = (*self.values).clone();
        values.extend(entries);
        Self {
            values: Arc::new(values),
        }
    }
}

impl FromIterator<(String, Value)> for InjectionContext {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            values: Arc::new(iter.into_iter().collect()),
        }
    }
}

impl fmt::Debug for InjectionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.values.keys()).finish()
    }
}

/// Assembles per-node contexts.
#[derive(Debug, Clone)]
pub struct ContextBuilder {
    sigil: String,
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::from_config(&EnvironmentConfig::default())
    }
}

impl ContextBuilder {
    pub fn new(sigil: impl Into<String>) -> Self {
        Self { sigil: sigil.into() }
    }

    pub fn from_config(config: &EnvironmentConfig) -> Self {
        Self::new(config.flag_sigil.clone())
    }

    /// Key of the flag for an environment name, if it yields one.
    pub fn flag_key(&self, name: &str) -> Option<String> {
        let name = name.trim().to_lowercase();
        if name.is_empty() {
            None
        } else {
            Some(format!("{}{}", self.sigil, name))
        }
    }

    /// `env` plus the active environment flag.
    pub fn environment_flags(&self, environment: &Environment) -> Vec<(String, Value)> {
        let mut flags = vec![(ENV_KEY.to_string(), Value::Data(environment.to_json()))];
        if let Some(key) = environment.name().and_then(|n| self.flag_key(n)) {
            flags.push((key, Value::from(true)));
        }
        flags
    }

    /// ancestor ⊕ index exports ⊕ environment flags.
    pub fn build(
        &self,
        ancestor: &InjectionContext,
        index_exports: &BTreeMap<String, Value>,
        environment: &Environment,
    ) -> InjectionContext {
        ancestor.merged(
            index_exports
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .chain(self.environment_flags(environment)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn staging() -> Environment {
        Environment::from_vars("NODE_ENV", [("NODE_ENV", "Staging"), ("PORT", "8080")])
    }

    #[test]
    fn test_environment_flags() {
        let ctx = ContextBuilder::default().build(&InjectionContext::new(), &BTreeMap::new(), &staging());

        assert_eq!(ctx.env("NODE_ENV"), Some("Staging"));
        assert_eq!(ctx.env("PORT"), Some("8080"));
        assert!(ctx.flag("$staging"));
        assert!(!ctx.flag("$production"));
        assert_eq!(ctx.len(), 2);
    }

    #[test]
    fn test_no_flag_without_name() {
        let builder = ContextBuilder::new("@");
        let flags = builder.environment_flags(&Environment::new());
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].0, ENV_KEY);

        assert_eq!(builder.flag_key(" QA "), Some("@qa".to_string()));
        assert_eq!(builder.flag_key("  "), None);
    }

    #[test]
    fn test_right_biased_merge() {
        let ancestor = InjectionContext::new()
            .with("db", "primary")
            .with("env", "shadowed")
            .with("keep", true);
        let mut exports = BTreeMap::new();
        exports.insert("db".to_string(), Value::from("replica"));

        let ctx = ContextBuilder::default().build(&ancestor, &exports, &staging());

        assert_eq!(ctx.data("db"), Some(&serde_json::json!("replica")));
        assert!(ctx.flag("keep"));
        assert!(ctx.data("env").unwrap().is_object());
        // The ancestor is not modified.
        assert_eq!(ancestor.data("db"), Some(&serde_json::json!("primary")));
    }

    #[test]
    fn test_shared_values() {
        struct Clock(u64);
        let ctx = InjectionContext::new().with("clock", Value::shared(Clock(7)));
        assert_eq!(ctx.shared::<Clock>("clock").unwrap().0, 7);
        assert!(ctx.handler("clock").is_none());
    }
}
