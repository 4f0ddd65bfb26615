//! Route handlers.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::response::{IntoResponse, Response};
use futures_util::future::BoxFuture;

type HandlerFn = dyn Fn(Request<Body>) -> BoxFuture<'static, Response> + Send + Sync;

/// A cloneable async request handler.
///
/// The optional name is the handler's dotted origin (`users.get_user`).
/// It shows up in logs only; dispatch never looks at it.
#[derive(Clone)]
pub struct Handler {
    name: Option<Arc<str>>,
    inner: Arc<HandlerFn>,
}

impl Handler {
    pub fn new<F, Fut, R>(f: F) -> Self
    where
        F: Fn(Request<Body>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse,
    {
        Self {
            name: None,
            inner: Arc::new(move |req| {
                let fut = f(req);
                Box::pin(async move { fut.await.into_response() })
            }),
        }
    }

    /// Same handler under a new name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(Arc::from(name.into()));
        self
    }

    /// Name the handler only if it has none yet.
    pub fn or_named(self, name: impl Into<String>) -> Self {
        if self.name.is_some() {
            self
        } else {
            self.named(name)
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn call(&self, req: Request<Body>) -> BoxFuture<'static, Response> {
        (self.inner)(req)
    }

    /// True if both wrap the same function.
    pub fn ptr_eq(&self, other: &Handler) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("name", &self.name.as_deref().unwrap_or("<anonymous>"))
            .finish()
    }
}
