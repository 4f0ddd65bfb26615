//! Recoverable loader problems.
//!
//! # Responsibilities
//! - Describe every problem the loader tolerates instead of aborting
//! - Emit each one as a log event and a counter increment
//! - Keep them for the registration report
//!
//! # Design Decisions
//! - One sink per `register` call, shared by clone
//! - Missing members and load failures log at error level, structural
//!   oddities at warn, silent downgrades at debug

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::observability::metrics;

/// A problem recovered from during registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Scanned path that cannot be placed in the route tree.
    Unrepresentable { path: String },
    /// Second file mapping onto an already bound index or method name.
    DuplicateMember { node: String, member: String, ignored: String },
    /// Module failed to load or its injectable failed to run.
    LoadFailed { path: String, reason: String },
    /// Sibling default export that cannot serve as a method.
    NotCallable { path: String, kind: &'static str },
    /// Self-reference lookup of an unknown sibling.
    MissingMember { node: String, member: String },
    /// Index module without an initializer default export.
    InvalidIndex { node: String, path: String, kind: &'static str },
    /// Initializer returned an error.
    InitializerFailed { node: String, reason: String },
}

impl Diagnostic {
    /// Stable label used for metrics and filtering.
    pub fn kind(&self) -> &'static str {
        match self {
            Diagnostic::Unrepresentable { .. } => "unrepresentable",
            Diagnostic::DuplicateMember { .. } => "duplicate_member",
            Diagnostic::LoadFailed { .. } => "load_failed",
            Diagnostic::NotCallable { .. } => "not_callable",
            Diagnostic::MissingMember { .. } => "missing_member",
            Diagnostic::InvalidIndex { .. } => "invalid_index",
            Diagnostic::InitializerFailed { .. } => "initializer_failed",
        }
    }

    fn emit(&self) {
        match self {
            Diagnostic::Unrepresentable { path } => {
                tracing::warn!(path = %path, "Path cannot be mapped onto the route tree")
            }
            Diagnostic::DuplicateMember { node, member, ignored } => tracing::warn!(
                node = %node,
                member = %member,
                ignored = %ignored,
                "Duplicate route member, keeping first"
            ),
            Diagnostic::LoadFailed { path, reason } => {
                tracing::error!(path = %path, reason = %reason, "Error importing module")
            }
            Diagnostic::NotCallable { path, kind } => {
                tracing::debug!(path = %path, kind = %kind, "Discarding non-callable method export")
            }
            Diagnostic::MissingMember { .. } => tracing::error!("{}", self),
            Diagnostic::InvalidIndex { node, path, kind } => tracing::warn!(
                node = %node,
                path = %path,
                kind = %kind,
                "Index module has no initializer, skipping"
            ),
            Diagnostic::InitializerFailed { node, reason } => {
                tracing::error!(node = %node, reason = %reason, "Route initializer failed")
            }
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::Unrepresentable { path } => write!(f, "{} is not a valid route path", path),
            Diagnostic::DuplicateMember { node, member, ignored } => {
                write!(f, "{} is defined twice in {} namespace, ignoring {}", member, node, ignored)
            }
            Diagnostic::LoadFailed { path, reason } => write!(f, "Error importing {}: {}", path, reason),
            Diagnostic::NotCallable { path, kind } => write!(f, "{} exports a {}, not a method", path, kind),
            Diagnostic::MissingMember { node, member } => {
                write!(f, "{} is missing in {} namespace.", member, node)
            }
            Diagnostic::InvalidIndex { node, path, kind } => {
                write!(f, "{} index {} exports a {}, not an initializer", node, path, kind)
            }
            Diagnostic::InitializerFailed { node, reason } => {
                write!(f, "{} initializer failed: {}", node, reason)
            }
        }
    }
}

/// Shared diagnostic sink.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Arc<Mutex<Vec<Diagnostic>>>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log, count and keep a diagnostic.
    pub fn record(&self, diagnostic: Diagnostic) {
        diagnostic.emit();
        metrics::record_diagnostic(diagnostic.kind());
        self.lock().push(diagnostic);
    }

    /// Copy of everything recorded so far.
    pub fn snapshot(&self) -> Vec<Diagnostic> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Number of diagnostics of the given kind.
    pub fn count(&self, kind: &str) -> usize {
        self.lock().iter().filter(|d| d.kind() == kind).count()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Diagnostic>> {
        // A panic while pushing cannot leave the Vec inconsistent.
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
