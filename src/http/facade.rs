//! Hook-merging registration facade.
//!
//! # Responsibilities
//! - Define the host framework's registration surface (`Framework`)
//! - Wrap it so every route registered from a route module picks up the
//!   loader-wide hook set
//! - Pass everything else through to the host unchanged
//!
//! # Design Decisions
//! - Per-route hooks come first, configured hooks are appended
//! - The facade is cheap to clone; every node initializer gets its own copy
//! - `Deref` to the host exposes its full surface

use std::ops::Deref;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::http::Method;

use crate::http::handler::Handler;
use crate::http::hooks::{HookList, HookSet};
use crate::observability::metrics;

/// A route as handed to the host framework.
#[derive(Debug, Clone)]
pub struct RouteDefinition {
    pub method: Method,
    pub path: String,
    pub handler: Handler,
    pub hooks: HookSet,
}

impl RouteDefinition {
    pub fn new(method: Method, path: impl Into<String>, handler: Handler) -> Self {
        Self {
            method,
            path: path.into(),
            handler,
            hooks: HookSet::new(),
        }
    }

    /// Add route-specific hooks to a slot.
    pub fn hook(mut self, name: impl Into<String>, hooks: impl Into<HookList>) -> Self {
        self.hooks.add(name, hooks);
        self
    }
}

/// Registration surface of the host web framework.
pub trait Framework: Send + Sync {
    /// Register a route.
    fn route(&self, route: RouteDefinition);

    /// Whether a route is already registered.
    fn has_route(&self, method: &Method, path: &str) -> bool;
}

/// Registration facade handed to route initializers.
#[derive(Clone)]
pub struct Routes {
    framework: Arc<dyn Framework>,
    hooks: Arc<HookSet>,
    registered: Arc<AtomicUsize>,
}

impl Routes {
    pub fn new(framework: Arc<dyn Framework>, hooks: HookSet) -> Self {
        Self {
            framework,
            hooks: Arc::new(hooks),
            registered: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Register a route with the configured hooks merged in.
    pub fn route(&self, mut route: RouteDefinition) {
        route.hooks = route.hooks.merged(&self.hooks);

        tracing::debug!(
            method = %route.method,
            path = %route.path,
            handler = route.handler.name().unwrap_or("<anonymous>"),
            hooks = route.hooks.len(),
            "Registering route"
        );
        metrics::record_route_registered(route.method.as_str());
        self.registered.fetch_add(1, Ordering::Relaxed);

        self.framework.route(route);
    }

    pub fn get(&self, path: impl Into<String>, handler: Handler) {
        self.route(RouteDefinition::new(Method::GET, path, handler));
    }

    pub fn post(&self, path: impl Into<String>, handler: Handler) {
        self.route(RouteDefinition::new(Method::POST, path, handler));
    }

    pub fn put(&self, path: impl Into<String>, handler: Handler) {
        self.route(RouteDefinition::new(Method::PUT, path, handler));
    }

    pub fn delete(&self, path: impl Into<String>, handler: Handler) {
        self.route(RouteDefinition::new(Method::DELETE, path, handler));
    }

    pub fn patch(&self, path: impl Into<String>, handler: Handler) {
        self.route(RouteDefinition::new(Method::PATCH, path, handler));
    }

    pub fn head(&self, path: impl Into<String>, handler: Handler) {
        self.route(RouteDefinition::new(Method::HEAD, path, handler));
    }

    pub fn options(&self, path: impl Into<String>, handler: Handler) {
        self.route(RouteDefinition::new(Method::OPTIONS, path, handler));
    }

    /// The wrapped host.
    pub fn framework(&self) -> &Arc<dyn Framework> {
        &self.framework
    }

    /// Hooks merged into every registration.
    pub fn hooks(&self) -> &HookSet {
        &self.hooks
    }

    /// Routes registered through this facade and its clones.
    pub fn registered(&self) -> usize {
        self.registered.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for Routes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Routes")
            .field("hooks", &self.hooks)
            .field("registered", &self.registered())
            .finish()
    }
}

impl Deref for Routes {
    type Target = dyn Framework;

    fn deref(&self) -> &Self::Target {
        self.framework.as_ref()
    }
}
