//! Request lifecycle hooks.
//!
//! # Responsibilities
//! - Represent cross-cutting callbacks (auth, validation) run before a handler
//! - Group them by lifecycle slot in a `HookSet`
//! - Merge per-route hooks with the loader-wide set
//!
//! # Design Decisions
//! - A hook either passes the (possibly modified) request on or answers it
//! - Merging appends: the route's own hooks first, configured hooks after
//! - Slots run in lifecycle order; names outside the lifecycle are kept
//!   but never run by the axum host

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use futures_util::future::BoxFuture;

pub const ON_REQUEST: &str = "on_request";
pub const PRE_PARSING: &str = "pre_parsing";
pub const PRE_VALIDATION: &str = "pre_validation";
pub const PRE_HANDLER: &str = "pre_handler";

/// Slots in the order they run.
pub const LIFECYCLE: [&str; 4] = [ON_REQUEST, PRE_PARSING, PRE_VALIDATION, PRE_HANDLER];

/// Continue with the request, or answer it early.
pub type HookOutcome = Result<Request<Body>, Response>;

type HookFn = dyn Fn(Request<Body>) -> BoxFuture<'static, HookOutcome> + Send + Sync;

/// A single lifecycle callback.
#[derive(Clone)]
pub struct Hook {
    name: Option<Arc<str>>,
    inner: Arc<HookFn>,
}

impl Hook {
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(Request<Body>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HookOutcome> + Send + 'static,
    {
        Self {
            name: None,
            inner: Arc::new(move |req| Box::pin(f(req))),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(Arc::from(name.into()));
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn run(&self, req: Request<Body>) -> BoxFuture<'static, HookOutcome> {
        (self.inner)(req)
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook")
            .field("name", &self.name.as_deref().unwrap_or("<anonymous>"))
            .finish()
    }
}

/// One hook or an ordered sequence of hooks.
#[derive(Debug, Clone, Default)]
pub struct HookList(Vec<Hook>);

impl From<Hook> for HookList {
    fn from(hook: Hook) -> Self {
        Self(vec![hook])
    }
}

impl From<Vec<Hook>> for HookList {
    fn from(hooks: Vec<Hook>) -> Self {
        Self(hooks)
    }
}

impl<const N: usize> From<[Hook; N]> for HookList {
    fn from(hooks: [Hook; N]) -> Self {
        Self(hooks.into())
    }
}

/// Hooks by lifecycle slot name.
#[derive(Clone, Default)]
pub struct HookSet {
    hooks: BTreeMap<String, Vec<Hook>>,
}

impl HookSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`HookSet::add`].
    pub fn with(mut self, name: impl Into<String>, hooks: impl Into<HookList>) -> Self {
        self.add(name, hooks);
        self
    }

    /// Append hooks to a slot.
    pub fn add(&mut self, name: impl Into<String>, hooks: impl Into<HookList>) {
        let HookList(hooks) = hooks.into();
        if hooks.is_empty() {
            return;
        }
        self.hooks.entry(name.into()).or_default().extend(hooks);
    }

    /// Hooks in a slot, empty if none.
    pub fn get(&self, name: &str) -> &[Hook] {
        self.hooks.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.hooks.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Total number of hooks across slots.
    pub fn len(&self) -> usize {
        self.hooks.values().map(Vec::len).sum()
    }

    /// Own hooks first, then `configured`, slot by slot.
    pub fn merged(&self, configured: &HookSet) -> HookSet {
        let mut merged = self.clone();
        for (name, hooks) in &configured.hooks {
            merged.add(name.clone(), hooks.clone());
        }
        merged
    }

    /// Every lifecycle hook, flattened in run order.
    pub fn lifecycle(&self) -> Vec<Hook> {
        LIFECYCLE
            .iter()
            .flat_map(|slot| self.get(slot).iter().cloned())
            .collect()
    }

    /// Slot names the lifecycle does not know.
    pub fn unknown_names(&self) -> Vec<&str> {
        self.names().filter(|name| !LIFECYCLE.contains(name)).collect()
    }
}

impl fmt::Debug for HookSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.hooks.iter().map(|(name, hooks)| (name, hooks.len())))
            .finish()
    }
}
