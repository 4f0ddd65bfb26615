//! Route module subsystem.
//!
//! # Data Flow
//! ```text
//! RelativePath (from the route tree)
//!     → registry.rs (ModuleLoader: run factory once, memoize)
//!     → module.rs (Module: default Export + named Values)
//!     → index modules: Export::Initializer + named exports for the context
//!     → sibling modules: Export::Handler / Export::Injectable
//! ```
//!
//! # Design Decisions
//! - "Needs context" is an explicit `Export::Injectable`, never inferred
//! - Non-callable defaults are kept as `Export::Value` and rejected where a
//!   method is expected

pub mod module;
pub mod registry;
pub mod value;

pub use module::{Export, Initializer, Injectable, Module};
pub use registry::{LoadError, ModuleLoader, ModuleRegistry};
pub use value::Value;
