//! End-to-end registration tests against the axum host.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::http::{Method, StatusCode};

use route_tree_loader::http::hooks::PRE_HANDLER;
use route_tree_loader::{
    AxumHost, BoxError, Environment, Export, Handler, Hook, LoaderError, LoaderOptions, Module,
    ModuleRegistry, RouteDefinition, RouteLoader, Value,
};

mod common;

fn loader(registry: ModuleRegistry, options: LoaderOptions) -> RouteLoader {
    RouteLoader::embedded(options, Arc::new(registry)).unwrap()
}

fn options() -> LoaderOptions {
    LoaderOptions::new("routes")
}

#[tokio::test]
async fn test_all_index_modules_invoked() {
    let counter = Arc::new(AtomicUsize::new(0));
    let mut registry = ModuleRegistry::new();
    for path in [
        "index.rs",
        "a/index.rs",
        "a/b/index.rs",
        "a/b/c/index.rs",
        "d/index.rs",
    ] {
        registry.insert(path, {
            let module = common::counting_index(counter.clone());
            move || Ok(module.clone())
        });
    }
    registry.insert("a/b/helper.rs", || Ok(common::text_method("helper")));

    let report = loader(registry, options())
        .register(Arc::new(AxumHost::new()))
        .await
        .unwrap();

    assert_eq!(counter.load(Ordering::SeqCst), 5);
    assert_eq!(report.loaders_run(), 5);
    assert_eq!(report.initialized.len(), 5);
    assert!(report.is_clean());
}

#[tokio::test]
async fn test_injectable_receives_node_context() {
    let seen: Arc<Mutex<Vec<Vec<String>>>> = Arc::new(Mutex::new(Vec::new()));

    let from_index = seen.clone();
    let from_method = seen.clone();
    let registry = ModuleRegistry::new()
        .module(
            "users/index.rs",
            Module::new()
                .with_named("db", "postgres")
                .with_default(Export::initializer(move |ctx| {
                    let seen = from_index.clone();
                    async move {
                        let keys = ctx.injections().keys().map(String::from).collect();
                        seen.lock().unwrap().push(keys);
                        let value = ctx.self_ref().resolve("get_user").await;
                        assert!(matches!(value, Some(Value::Data(ref v)) if v == "resolved"));
                        Ok::<(), BoxError>(())
                    }
                })),
        )
        .module(
            "users/get_user.rs",
            Module::new().with_default(Export::injectable(move |ctx| {
                let seen = from_method.clone();
                async move {
                    let keys = ctx.keys().map(String::from).collect();
                    seen.lock().unwrap().push(keys);
                    Ok("resolved")
                }
            })),
        );

    let report = loader(registry, options().with_injection("logger", "stdout"))
        .register(Arc::new(AxumHost::new()))
        .await
        .unwrap();
    assert!(report.failed.is_empty());

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0], seen[1]);
    assert!(seen[0].contains(&"db".to_string()));
    assert!(seen[0].contains(&"logger".to_string()));
}

#[tokio::test]
async fn test_plain_handler_returned_uninvoked() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counted = calls.clone();

    let registry = ModuleRegistry::new()
        .module(
            "index.rs",
            Module::new().with_default(Export::initializer(|ctx| async move {
                let handler = ctx.self_ref().handler("ping").await.ok_or("ping missing")?;
                ctx.routes().get("/ping", handler);
                Ok::<(), BoxError>(())
            })),
        )
        .module(
            "ping.rs",
            Module::new().with_default(Export::handler(move |_req| {
                counted.fetch_add(1, Ordering::SeqCst);
                async { "pong" }
            })),
        );

    let host = Arc::new(AxumHost::new());
    loader(registry, options()).register(host.clone()).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let (status, body) = common::send(host.router(), Method::GET, "/ping").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "pong");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_missing_sibling_reported_once() {
    let registry = ModuleRegistry::new().module(
        "users/index.rs",
        Module::new().with_default(Export::initializer(|ctx| async move {
            assert!(ctx.self_ref().resolve("nope").await.is_none());
            Ok::<(), BoxError>(())
        })),
    );

    let report = loader(registry, options())
        .register(Arc::new(AxumHost::new()))
        .await
        .unwrap();

    let missing: Vec<String> = report
        .diagnostics_of("missing_member")
        .map(ToString::to_string)
        .collect();
    assert_eq!(missing, vec!["nope is missing in users namespace."]);
}

#[tokio::test]
async fn test_hooks_existing_then_configured() {
    let h1 = Hook::new(|req| async move { Ok(req) }).named("h1");
    let h2 = Hook::new(|req| async move { Ok(req) }).named("h2");

    let registry = ModuleRegistry::new().module(
        "index.rs",
        Module::new().with_default(Export::initializer(move |ctx| {
            let h2 = h2.clone();
            async move {
                ctx.routes().route(
                    RouteDefinition::new(Method::GET, "/hooked", Handler::new(|_req| async { "ok" }))
                        .hook(PRE_HANDLER, h2),
                );
                Ok::<(), BoxError>(())
            }
        })),
    );

    let host = Arc::new(AxumHost::new());
    loader(registry, options().with_hook(PRE_HANDLER, vec![h1]))
        .register(host.clone())
        .await
        .unwrap();

    let definitions = host.definitions();
    assert_eq!(definitions.len(), 1);
    let names: Vec<&str> = definitions[0]
        .hooks
        .get(PRE_HANDLER)
        .iter()
        .filter_map(Hook::name)
        .collect();
    assert_eq!(names, vec!["h2", "h1"]);
}

#[tokio::test]
async fn test_environment_injected() {
    let seen = Arc::new(Mutex::new(None));
    let observed = seen.clone();

    let registry = ModuleRegistry::new().module(
        "index.rs",
        Module::new().with_default(Export::initializer(move |ctx| {
            let observed = observed.clone();
            async move {
                let node_env = ctx.env("NODE_ENV").map(String::from);
                *observed.lock().unwrap() = Some((node_env, ctx.flag("$staging")));
                Ok::<(), BoxError>(())
            }
        })),
    );

    let environment = Environment::from_vars("NODE_ENV", [("NODE_ENV", "staging")]);
    loader(registry, options().with_environment(environment))
        .register(Arc::new(AxumHost::new()))
        .await
        .unwrap();

    assert_eq!(
        seen.lock().unwrap().clone(),
        Some((Some("staging".to_string()), true))
    );
}

#[tokio::test]
async fn test_users_scenario_registers_one_route() {
    let host = Arc::new(AxumHost::new());
    let report = loader(common::users_registry(), options())
        .register(host.clone())
        .await
        .unwrap();

    assert_eq!(report.routes_registered, 1);
    assert_eq!(host.registered(), vec![(Method::GET, "/users".to_string())]);

    let (status, body) = common::send(host.router(), Method::GET, "/users").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "all users");
}

#[tokio::test]
async fn test_missing_base_dir() {
    let result = RouteLoader::new(LoaderOptions::default(), Arc::new(ModuleRegistry::new()));
    assert!(matches!(result, Err(LoaderError::MissingBaseDir)));
}

#[tokio::test]
async fn test_broken_module_does_not_stop_siblings() {
    let registry = common::users_registry()
        .factory("orders/index.rs", || Err("does not compile".into()))
        .module(
            "billing/index.rs",
            Module::new().with_default(Export::initializer(|_ctx| async {
                Err::<(), BoxError>("database unreachable".into())
            })),
        );

    let host = Arc::new(AxumHost::new());
    let report = loader(registry, options()).register(host.clone()).await.unwrap();

    assert_eq!(report.initialized, vec!["users"]);
    assert_eq!(report.failed, vec!["billing"]);
    assert_eq!(report.diagnostics_of("load_failed").count(), 1);
    assert_eq!(host.registered(), vec![(Method::GET, "/users".to_string())]);
}

#[tokio::test]
async fn test_directory_without_index_reachable_from_parent() {
    let registry = ModuleRegistry::new()
        .module(
            "index.rs",
            Module::new().with_default(Export::initializer(|ctx| async move {
                let shared = ctx.self_ref().child("shared").ok_or("shared missing")?;
                let format = shared.handler("fmt").await.ok_or("shared.fmt missing")?;
                ctx.routes().get("/fmt", format);
                Ok::<(), BoxError>(())
            })),
        )
        .module("shared/fmt.rs", common::text_method("formatted"));

    let host = Arc::new(AxumHost::new());
    let report = loader(registry, options()).register(host.clone()).await.unwrap();

    assert!(report.failed.is_empty());
    assert_eq!(report.initialized, vec!["root"]);
    assert!(report.skipped.iter().any(|s| s.node == "shared"));
    assert_eq!(host.registered(), vec![(Method::GET, "/fmt".to_string())]);

    let (status, body) = common::send(host.router(), Method::GET, "/fmt").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "formatted");
}
