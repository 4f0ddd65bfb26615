//! Route tree loader demo server.
//!
//! Registers a small compiled-in route tree on an axum host and serves it.
//!
//! ```text
//! index.rs            GET /            (+ GET /staging-only when $staging)
//! staging_only.rs
//! users/index.rs      GET /users, GET /users/{id}
//! users/list.rs       injectable, reads `some_root_helper`
//! users/show.rs       plain handler
//! ```
//!
//! Configuration is read from the TOML file named by `ROUTE_LOADER_CONFIG`,
//! falling back to defaults with `base_dir = "routes"`.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::http::Request;
use axum::body::Body;
use axum::Json;
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use route_tree_loader::config::{load_config, LoaderConfig};
use route_tree_loader::observability::{logging, metrics};
use route_tree_loader::{
    AxumHost, BoxError, Environment, Export, Handler, LoaderOptions, Module, ModuleRegistry,
    RouteLoader,
};

const CONFIG_ENV: &str = "ROUTE_LOADER_CONFIG";

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = match std::env::var(CONFIG_ENV) {
        Ok(path) => load_config(Path::new(&path))?,
        Err(_) => LoaderConfig::with_base_dir("routes"),
    };

    logging::init_logging(&config.observability);
    tracing::info!("route-tree-loader v0.1.0 starting");

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let environment = Environment::from_process(&config.environment.variable);
    tracing::info!(
        variable = %config.environment.variable,
        environment = environment.name().unwrap_or("<unset>"),
        "Environment resolved"
    );

    let bind_address = config.server.bind_address.clone();
    let request_timeout = Duration::from_secs(config.server.request_timeout_secs);

    let options = LoaderOptions::from_config(config)
        .with_environment(environment)
        .with_injection("some_root_helper", json!({ "source": "root" }));
    let loader = RouteLoader::embedded(options, Arc::new(demo_routes()))?;

    let host = Arc::new(AxumHost::new());
    let report = loader.register(host.clone()).await?;
    for diagnostic in &report.diagnostics {
        tracing::warn!(kind = diagnostic.kind(), "{diagnostic}");
    }

    #[allow(deprecated)]
    let app = host
        .router()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(request_timeout));

    let listener = TcpListener::bind(&bind_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        routes = report.routes_registered,
        "Listening for connections"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}

fn demo_routes() -> ModuleRegistry {
    ModuleRegistry::new()
        .module(
            "index.rs",
            Module::new()
                .with_named("service", "route-tree-loader")
                .with_default(Export::initializer(|ctx| async move {
                    let service = ctx.injections().data("service").cloned();
                    ctx.routes().get(
                        "/",
                        Handler::new(move |_req| {
                            let service = service.clone();
                            async move { Json(json!({ "service": service })) }
                        }),
                    );

                    if ctx.flag("$staging") {
                        if let Some(handler) = ctx.self_ref().handler("staging_only").await {
                            ctx.routes().get("/staging-only", handler);
                        }
                    }
                    Ok(())
                })),
        )
        .module(
            "staging_only.rs",
            Module::new().with_default(Export::handler(|_req| async { "staging" })),
        )
        .module(
            "users/index.rs",
            Module::new().with_default(Export::initializer(|ctx| async move {
                let users = ctx.self_ref();
                if let Some(list) = users.handler("list").await {
                    ctx.routes().get("/users", list);
                }
                if let Some(show) = users.handler("show").await {
                    ctx.routes().get("/users/{id}", show);
                }
                Ok(())
            })),
        )
        .module(
            "users/list.rs",
            Module::new().with_default(Export::injectable(|ctx| async move {
                let helper = ctx.data("some_root_helper").cloned();
                Ok(Handler::new(move |_req| {
                    let helper = helper.clone();
                    async move { Json(json!({ "users": [], "helper": helper })) }
                }))
            })),
        )
        .module(
            "users/show.rs",
            Module::new().with_default(Export::handler(|req: Request<Body>| async move {
                let id = req.uri().path().rsplit('/').next().unwrap_or_default().to_string();
                Json(json!({ "id": id }))
            })),
        )
}
