//! HTTP registration subsystem.
//!
//! # Data Flow
//! ```text
//! Route initializer
//!     → facade.rs (Routes: merge configured hooks into the definition)
//!     → host.rs (AxumHost: validate, buffer)
//!     → AxumHost::router() after registration completes
//!     → per request: hooks.rs lifecycle → handler.rs
//! ```

pub mod facade;
pub mod handler;
pub mod hooks;
pub mod host;

pub use facade::{Framework, RouteDefinition, Routes};
pub use handler::Handler;
pub use hooks::{Hook, HookList, HookOutcome, HookSet};
pub use host::AxumHost;
