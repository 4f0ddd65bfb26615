//! Axum-backed host framework.
//!
//! # Responsibilities
//! - Collect route registrations coming from route modules
//! - Compile them into an axum `Router`
//! - Run lifecycle hooks before each handler
//!
//! # Design Decisions
//! - Registrations are buffered; the router is built after loading completes
//! - Conflicting or malformed registrations are logged and dropped instead
//!   of panicking inside axum
//! - Paths use axum syntax (`/users/{id}`)

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::routing::{MethodFilter, MethodRouter};
use axum::Router;

use crate::http::facade::{Framework, RouteDefinition};
use crate::http::handler::Handler;
use crate::http::hooks::Hook;

/// Host framework that builds an axum router.
#[derive(Debug, Default)]
pub struct AxumHost {
    routes: Mutex<Vec<RouteDefinition>>,
}

impl AxumHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every accepted registration, in arrival order.
    pub fn definitions(&self) -> Vec<RouteDefinition> {
        self.lock().clone()
    }

    /// Accepted `(method, path)` pairs, in arrival order.
    pub fn registered(&self) -> Vec<(Method, String)> {
        self.lock()
            .iter()
            .map(|r| (r.method.clone(), r.path.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Build an axum router from the registrations so far.
    pub fn router(&self) -> Router {
        let mut by_path: BTreeMap<String, MethodRouter> = BTreeMap::new();

        for route in self.definitions() {
            let filter = match MethodFilter::try_from(route.method.clone()) {
                Ok(filter) => filter,
                Err(_) => {
                    tracing::warn!(method = %route.method, path = %route.path, "Unsupported method, route dropped");
                    continue;
                }
            };
            for name in route.hooks.unknown_names() {
                tracing::warn!(hook = name, path = %route.path, "Hook slot has no lifecycle stage, not run");
            }

            let compiled = Arc::new(CompiledRoute {
                handler: route.handler,
                hooks: route.hooks.lifecycle(),
            });
            let endpoint = move |req: Request<Body>| {
                let compiled = compiled.clone();
                async move { compiled.dispatch(req).await }
            };

            let method_router = by_path.remove(&route.path).unwrap_or_else(MethodRouter::new);
            by_path.insert(route.path, method_router.on(filter, endpoint));
        }

        by_path
            .into_iter()
            .fold(Router::new(), |router, (path, method_router)| router.route(&path, method_router))
    }

    fn lock(&self) -> MutexGuard<'_, Vec<RouteDefinition>> {
        self.routes.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Checks axum would panic on.
fn path_problem(path: &str) -> Option<&'static str> {
    if !path.starts_with('/') {
        return Some("path must start with '/'");
    }
    if path.split('/').any(|s| s.starts_with(':') || s.starts_with('*')) {
        return Some("use {param} and {*rest} captures");
    }
    None
}

impl Framework for AxumHost {
    fn route(&self, route: RouteDefinition) {
        if let Some(problem) = path_problem(&route.path) {
            tracing::warn!(method = %route.method, path = %route.path, problem, "Invalid route path, dropped");
            return;
        }

        let mut routes = self.lock();
        if routes.iter().any(|r| r.method == route.method && r.path == route.path) {
            tracing::warn!(method = %route.method, path = %route.path, "Route already registered, dropped");
            return;
        }

        tracing::info!(
            method = %route.method,
            path = %route.path,
            handler = route.handler.name().unwrap_or("<anonymous>"),
            "Route registered"
        );
        routes.push(route);
    }

    fn has_route(&self, method: &Method, path: &str) -> bool {
        self.lock().iter().any(|r| &r.method == method && r.path == path)
    }
}

struct CompiledRoute {
    handler: Handler,
    hooks: Vec<Hook>,
}

impl CompiledRoute {
    async fn dispatch(&self, mut req: Request<Body>) -> Response {
        for hook in &self.hooks {
            match hook.run(req).await {
                Ok(next) => req = next,
                Err(response) => return response,
            }
        }
        self.handler.call(req).await
    }
}
