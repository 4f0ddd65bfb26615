//! Lazy view over a node's sibling methods.
//!
//! # Responsibilities
//! - Resolve a sibling method by name on first use
//! - Bind injectable methods to the node's context
//! - Report unknown names instead of failing
//!
//! # Design Decisions
//! - Each method slot is a `OnceCell`: loaded and bound at most once
//! - Unknown names yield `None` plus one `MissingMember` diagnostic;
//!   callers must tolerate absent handlers
//! - Load and bind failures are diagnostics too, the slot stays empty
//! - Child namespaces are reachable through `child`, so a directory
//!   without an index still exposes its methods

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::config::MethodBinding;
use crate::http::Handler;
use crate::inject::context::InjectionContext;
use crate::modules::{Export, ModuleLoader, Value};
use crate::observability::{Diagnostic, Diagnostics};
use crate::routing::{RelativePath, RouteNode};

struct MethodSlot {
    path: RelativePath,
    dotted: String,
    value: OnceCell<Option<Value>>,
}

struct Inner {
    node: String,
    context: InjectionContext,
    base: InjectionContext,
    binding: MethodBinding,
    methods: BTreeMap<String, MethodSlot>,
    loader: Arc<dyn ModuleLoader>,
    diagnostics: Diagnostics,
}

/// Sibling method resolver for one route node.
#[derive(Clone)]
pub struct SelfRef {
    inner: Arc<Inner>,
    children: Arc<BTreeMap<String, SelfRef>>,
}

impl SelfRef {
    /// `context` is the node's full context; `base` is what the caller
    /// handed down, used by `MethodBinding::PassThrough`.
    pub fn new(
        node: &RouteNode,
        binding: MethodBinding,
        context: InjectionContext,
        base: InjectionContext,
        loader: Arc<dyn ModuleLoader>,
        diagnostics: Diagnostics,
    ) -> Self {
        let methods = node
            .methods
            .iter()
            .map(|(name, path)| {
                let slot = MethodSlot {
                    path: path.clone(),
                    dotted: node.method_path(name),
                    value: OnceCell::new(),
                };
                (name.clone(), slot)
            })
            .collect();

        Self {
            inner: Arc::new(Inner {
                node: node.label().to_string(),
                context,
                base,
                binding,
                methods,
                loader,
                diagnostics,
            }),
            children: Arc::new(BTreeMap::new()),
        }
    }

    /// Attach the resolvers of child directories.
    pub fn with_children(mut self, children: BTreeMap<String, SelfRef>) -> Self {
        self.children = Arc::new(children);
        self
    }

    /// Dotted node name (`root` for the base directory).
    pub fn node(&self) -> &str {
        &self.inner.node
    }

    pub fn context(&self) -> &InjectionContext {
        &self.inner.context
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.methods.contains_key(name)
    }

    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.inner.methods.keys().map(String::as_str)
    }

    /// Whether a method has been materialized already.
    pub fn is_resolved(&self, name: &str) -> bool {
        self.inner
            .methods
            .get(name)
            .is_some_and(|slot| slot.value.initialized())
    }

    /// Resolver of a child directory.
    pub fn child(&self, name: &str) -> Option<SelfRef> {
        let child = self.children.get(name).cloned();
        if child.is_none() {
            self.missing(name);
        }
        child
    }

    /// Resolve a sibling method.
    ///
    /// Plain handlers come back as they are. Injectables are invoked once
    /// with the node's context and their result comes back instead.
    pub async fn resolve(&self, name: &str) -> Option<Value> {
        let Some(slot) = self.inner.methods.get(name) else {
            self.missing(name);
            return None;
        };
        slot.value.get_or_init(|| self.materialize(slot)).await.clone()
    }

    /// Resolve a sibling method that must be a handler.
    pub async fn handler(&self, name: &str) -> Option<Handler> {
        match self.resolve(name).await? {
            Value::Handler(handler) => Some(handler),
            other => {
                tracing::debug!(node = %self.inner.node, method = name, kind = other.kind(), "Method is not a handler");
                None
            }
        }
    }

    fn missing(&self, name: &str) {
        self.inner.diagnostics.record(Diagnostic::MissingMember {
            node: self.inner.node.clone(),
            member: name.to_string(),
        });
    }

    async fn materialize(&self, slot: &MethodSlot) -> Option<Value> {
        let inner = &self.inner;
        let export = match inner.loader.load_default(&slot.path).await {
            Ok(Some(export)) => export,
            Ok(None) => {
                inner.diagnostics.record(Diagnostic::NotCallable {
                    path: slot.path.to_string(),
                    kind: "none",
                });
                return None;
            }
            Err(e) => {
                inner.diagnostics.record(Diagnostic::LoadFailed {
                    path: slot.path.to_string(),
                    reason: e.to_string(),
                });
                return None;
            }
        };

        match export {
            Export::Handler(handler) => Some(Value::Handler(handler.or_named(slot.dotted.as_str()))),
            Export::Injectable(inject) => {
                let context = match inner.binding {
                    MethodBinding::ContextAware => inner.context.clone(),
                    MethodBinding::PassThrough => inner.base.clone(),
                };
                match inject(context).await {
                    Ok(Value::Handler(handler)) => {
                        Some(Value::Handler(handler.or_named(slot.dotted.as_str())))
                    }
                    Ok(Value::Null) => None,
                    Ok(value) => Some(value),
                    Err(e) => {
                        inner.diagnostics.record(Diagnostic::LoadFailed {
                            path: slot.path.to_string(),
                            reason: e.to_string(),
                        });
                        None
                    }
                }
            }
            other => {
                inner.diagnostics.record(Diagnostic::NotCallable {
                    path: slot.path.to_string(),
                    kind: other.kind(),
                });
                None
            }
        }
    }
}

impl fmt::Debug for SelfRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelfRef")
            .field("node", &self.inner.node)
            .field("methods", &self.inner.methods.keys().collect::<Vec<_>>())
            .field("children", &self.children.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::{Module, ModuleRegistry};
    use crate::routing::{ConventionShape, TreeBuilder};
    use crate::BoxError;
    use std::collections::BTreeSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn users_node() -> RouteNode {
        let paths: BTreeSet<RelativePath> = [
            "users/get_user.rs",
            "users/list_users.rs",
            "users/broken.rs",
            "users/settings.rs",
        ]
        .iter()
        .map(|p| RelativePath::new(p))
        .collect();
        let shape = ConventionShape::default();
        TreeBuilder::new(&shape).build(&paths).root.children["users"].clone()
    }

    fn registry(calls: Arc<AtomicUsize>) -> ModuleRegistry {
        ModuleRegistry::new()
            .module(
                "users/get_user.rs",
                Module::new().with_default(Export::injectable(move |ctx: InjectionContext| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async move {
                        let greeting = ctx.data("greeting").cloned().unwrap_or_default();
                        Ok::<_, BoxError>(greeting)
                    }
                })),
            )
            .module(
                "users/list_users.rs",
                Module::new().with_default(Export::handler(|_req| async { "[]" })),
            )
            .factory("users/broken.rs", || Err("syntax error".into()))
            .module(
                "users/settings.rs",
                Module::new().with_default(Export::Value(Value::from("not a method"))),
            )
    }

    fn self_ref(binding: MethodBinding, calls: Arc<AtomicUsize>, diagnostics: Diagnostics) -> SelfRef {
        let base = InjectionContext::new().with("greeting", "hello from caller");
        let context = base.clone().with("greeting", "hello from node");
        SelfRef::new(
            &users_node(),
            binding,
            context,
            base,
            Arc::new(registry(calls)),
            diagnostics,
        )
    }

    #[tokio::test]
    async fn test_injectable_invoked_with_context_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let proxy = self_ref(MethodBinding::ContextAware, calls.clone(), Diagnostics::new());

        assert!(!proxy.is_resolved("get_user"));
        let first = proxy.resolve("get_user").await.unwrap();
        let second = proxy.resolve("get_user").await.unwrap();

        assert_eq!(first.as_data(), Some(&serde_json::json!("hello from node")));
        assert_eq!(second.as_data(), first.as_data());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(proxy.is_resolved("get_user"));
    }

    #[tokio::test]
    async fn test_pass_through_uses_caller_injections() {
        let calls = Arc::new(AtomicUsize::new(0));
        let proxy = self_ref(MethodBinding::PassThrough, calls, Diagnostics::new());

        let value = proxy.resolve("get_user").await.unwrap();
        assert_eq!(value.as_data(), Some(&serde_json::json!("hello from caller")));
    }

    #[tokio::test]
    async fn test_plain_handler_returned_named() {
        let proxy = self_ref(MethodBinding::ContextAware, Arc::default(), Diagnostics::new());

        let handler = proxy.handler("list_users").await.unwrap();
        assert_eq!(handler.name(), Some("users.list_users"));
        assert!(proxy.handler("get_user").await.is_none());
    }

    #[tokio::test]
    async fn test_missing_member_reported_once() {
        let diagnostics = Diagnostics::new();
        let proxy = self_ref(MethodBinding::ContextAware, Arc::default(), diagnostics.clone());

        assert!(proxy.resolve("remove_user").await.is_none());
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics.snapshot()[0],
            Diagnostic::MissingMember {
                node: "users".into(),
                member: "remove_user".into()
            }
        );
    }

    #[tokio::test]
    async fn test_broken_and_non_callable_slots() {
        let diagnostics = Diagnostics::new();
        let proxy = self_ref(MethodBinding::ContextAware, Arc::default(), diagnostics.clone());

        assert!(proxy.resolve("broken").await.is_none());
        assert!(proxy.resolve("broken").await.is_none());
        assert!(proxy.resolve("settings").await.is_none());

        assert_eq!(diagnostics.count("load_failed"), 1);
        assert_eq!(diagnostics.count("not_callable"), 1);
        assert_eq!(diagnostics.count("missing_member"), 0);
    }

    #[tokio::test]
    async fn test_child_lookup() {
        let diagnostics = Diagnostics::new();
        let parent = self_ref(MethodBinding::ContextAware, Arc::default(), diagnostics.clone());
        let child = self_ref(MethodBinding::ContextAware, Arc::default(), diagnostics.clone());
        let parent = parent.with_children(BTreeMap::from([("admin".to_string(), child)]));

        assert!(parent.child("admin").is_some());
        assert!(parent.child("billing").is_none());
        assert_eq!(diagnostics.count("missing_member"), 1);
    }
}
