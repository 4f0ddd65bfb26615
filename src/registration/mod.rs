//! Route registration.
//!
//! # Data Flow
//! ```text
//! LoaderOptions → RouteLoader::new (fail fast on missing base_dir)
//!     → register: scan → TreeBuilder → index loads + contexts + SelfRefs
//!     → join_all(initializers) against the Routes facade
//!     → RegistrationReport
//! ```

pub mod driver;
pub mod error;
pub mod report;

pub use driver::{LoaderOptions, RouteLoader};
pub use error::LoaderError;
pub use report::{RegistrationReport, SkipReason, SkippedNode};
