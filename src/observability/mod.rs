//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Loader subsystems produce:
//!     → diagnostics.rs (recoverable problems, collected per registration)
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters)
//!
//! Consumers:
//!     → RegistrationReport (diagnostic snapshot)
//!     → Log output (stdout)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Every diagnostic is also a log event and a counter increment
//! - Diagnostics never abort registration; they are reported

pub mod diagnostics;
pub mod logging;
pub mod metrics;

pub use diagnostics::{Diagnostic, Diagnostics};
