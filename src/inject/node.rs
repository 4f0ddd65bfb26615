//! Argument handed to a route node's initializer.

use crate::http::{Handler, Routes};
use crate::inject::context::InjectionContext;
use crate::inject::self_ref::SelfRef;
use crate::modules::Value;

/// Everything an index module's initializer can use.
#[derive(Clone, Debug)]
pub struct NodeContext {
    injections: InjectionContext,
    routes: Routes,
    self_ref: SelfRef,
}

impl NodeContext {
    pub fn new(injections: InjectionContext, routes: Routes, self_ref: SelfRef) -> Self {
        Self {
            injections,
            routes,
            self_ref,
        }
    }

    /// Dotted name of the node being initialized.
    pub fn node(&self) -> &str {
        self.self_ref.node()
    }

    pub fn injections(&self) -> &InjectionContext {
        &self.injections
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.injections.get(key)
    }

    /// Environment variable from the injected `env` map.
    pub fn env(&self, name: &str) -> Option<&str> {
        self.injections.env(name)
    }

    pub fn flag(&self, key: &str) -> bool {
        self.injections.flag(key)
    }

    /// Hook-merging registration facade.
    pub fn routes(&self) -> &Routes {
        &self.routes
    }

    /// Sibling method resolver.
    pub fn self_ref(&self) -> &SelfRef {
        &self.self_ref
    }

    /// Give an anonymous handler a name for logs.
    pub fn bind(&self, handler: Handler, name: impl Into<String>) -> Handler {
        handler.named(name)
    }
}
