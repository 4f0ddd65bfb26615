//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use route_tree_loader::{BoxError, Export, Handler, Module, ModuleRegistry};

/// Index module whose initializer only counts its invocations.
pub fn counting_index(counter: Arc<AtomicUsize>) -> Module {
    Module::new().with_default(Export::initializer(move |_ctx| {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<(), BoxError>(())
        }
    }))
}

/// Sibling method that is a plain handler returning `body`.
pub fn text_method(body: &'static str) -> Module {
    Module::new().with_default(Export::handler(move |_req| async move { body }))
}

/// `users/index.rs` registering `GET /users` from its `list` sibling.
pub fn users_registry() -> ModuleRegistry {
    ModuleRegistry::new()
        .module(
            "users/index.rs",
            Module::new().with_default(Export::initializer(|ctx| async move {
                let list = ctx
                    .self_ref()
                    .handler("list")
                    .await
                    .ok_or("users.list missing")?;
                ctx.routes().get("/users", list);
                Ok::<(), BoxError>(())
            })),
        )
        .module(
            "users/list.rs",
            Module::new().with_default(Export::injectable(|_ctx| async move {
                Ok(Handler::new(|_req| async { "all users" }))
            })),
        )
}

/// Drive a compiled router with one request.
pub async fn send(router: Router, method: Method, path: &str) -> (StatusCode, String) {
    let request = Request::builder()
        .method(method)
        .uri(path)
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}
