//! Dependency injection subsystem.
//!
//! # Data Flow
//! ```text
//! Caller injections ─┐
//! Index named exports┼→ context.rs (ContextBuilder, right-biased merge)
//! environment.rs ────┘        → InjectionContext (per node)
//!                                  → self_ref.rs (SelfRef: lazy sibling methods)
//!                                  → node.rs (NodeContext handed to the initializer)
//! ```
//!
//! # Design Decisions
//! - Contexts flow downward: a child's ancestor context is its parent's
//!   merged context
//! - Injectable methods are bound on first access, not at load time

pub mod context;
pub mod environment;
pub mod node;
pub mod self_ref;

pub use context::{ContextBuilder, InjectionContext, ENV_KEY};
pub use environment::Environment;
pub use node::NodeContext;
pub use self_ref::SelfRef;
