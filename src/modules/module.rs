//! Route module contents.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::response::IntoResponse;
use futures_util::future::BoxFuture;

use crate::http::Handler;
use crate::inject::{InjectionContext, NodeContext};
use crate::modules::value::Value;
use crate::BoxError;

/// Runs a directory's route registrations.
pub type Initializer = Arc<dyn Fn(NodeContext) -> BoxFuture<'static, Result<(), BoxError>> + Send + Sync>;

/// A sibling method that must see its node's injection context first.
pub type Injectable = Arc<dyn Fn(InjectionContext) -> BoxFuture<'static, Result<Value, BoxError>> + Send + Sync>;

/// Default export of a module.
#[derive(Clone)]
pub enum Export {
    /// Index modules: registers the directory's routes.
    Initializer(Initializer),
    /// Sibling method used as is.
    Handler(Handler),
    /// Sibling method invoked once with the node context; its result is the method.
    Injectable(Injectable),
    /// Anything else. Never usable as a method.
    Value(Value),
}

impl Export {
    pub fn initializer<F, Fut>(f: F) -> Self
    where
        F: Fn(NodeContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        Export::Initializer(Arc::new(move |ctx| Box::pin(f(ctx))))
    }

    pub fn handler<F, Fut, R>(f: F) -> Self
    where
        F: Fn(Request<Body>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        Export::Handler(Handler::new(f))
    }

    pub fn injectable<F, Fut, V>(f: F) -> Self
    where
        F: Fn(InjectionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<V, BoxError>> + Send + 'static,
        V: Into<Value>,
    {
        Export::Injectable(Arc::new(move |ctx| {
            let fut = f(ctx);
            Box::pin(async move { fut.await.map(Into::into) })
        }))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Export::Initializer(_) => "initializer",
            Export::Handler(_) => "handler",
            Export::Injectable(_) => "injectable",
            Export::Value(value) => value.kind(),
        }
    }
}

impl From<Handler> for Export {
    fn from(handler: Handler) -> Self {
        Export::Handler(handler)
    }
}

impl fmt::Debug for Export {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Export::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Export::Handler(handler) => f.debug_tuple("Handler").field(handler).finish(),
            other => write!(f, "Export({})", other.kind()),
        }
    }
}

/// A loaded module: optional default export plus named exports.
#[derive(Debug, Clone, Default)]
pub struct Module {
    default: Option<Export>,
    named: BTreeMap<String, Value>,
}

impl Module {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default(mut self, export: Export) -> Self {
        self.default = Some(export);
        self
    }

    pub fn with_named(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.named.insert(name.into(), value.into());
        self
    }

    pub fn default_export(&self) -> Option<&Export> {
        self.default.as_ref()
    }

    pub fn named(&self) -> &BTreeMap<String, Value> {
        &self.named
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_builder() {
        let module = Module::new()
            .with_default(Export::handler(|_req| async { "ok" }))
            .with_named("version", "v1")
            .with_named("strict", true);

        assert_eq!(module.default_export().unwrap().kind(), "handler");
        assert_eq!(module.named().len(), 2);
        assert_eq!(
            module.named()["version"].as_data(),
            Some(&serde_json::json!("v1"))
        );
    }

    #[tokio::test]
    async fn test_injectable_converts_result() {
        let export = Export::injectable(|ctx: InjectionContext| async move {
            Ok::<_, BoxError>(ctx.len() as i64)
        });
        let Export::Injectable(f) = export else {
            panic!("expected injectable");
        };
        let value = f(InjectionContext::new().with("a", true)).await.unwrap();
        assert_eq!(value.as_data(), Some(&serde_json::json!(1)));
    }

    #[test]
    fn test_kinds() {
        let init = Export::initializer(|_ctx| async { Ok(()) });
        assert_eq!(init.kind(), "initializer");
        assert_eq!(Export::Value(Value::from(3_i64)).kind(), "data");
    }
}
