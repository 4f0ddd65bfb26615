//! Convention-based route tree loader for axum services.

pub mod config;
pub mod http;
pub mod inject;
pub mod modules;
pub mod observability;
pub mod registration;
pub mod routing;

pub use config::schema::LoaderConfig;
pub use http::{AxumHost, Framework, Handler, Hook, HookSet, RouteDefinition, Routes};
pub use inject::{Environment, InjectionContext, NodeContext, SelfRef};
pub use modules::{Export, Module, ModuleLoader, ModuleRegistry, Value};
pub use registration::{LoaderError, LoaderOptions, RegistrationReport, RouteLoader};

/// Boxed error used at module and initializer boundaries.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;
