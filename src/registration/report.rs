//! Outcome of a registration pass.

use crate::observability::Diagnostic;
use crate::routing::RelativePath;

/// Why a node queued no initializer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Directory has no index module.
    NoIndex,
    /// Index module failed to load.
    LoadFailed,
    /// Index module loaded but exports no initializer.
    NoInitializer,
}

/// A node that did not take part in registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedNode {
    pub node: String,
    pub reason: SkipReason,
}

/// Summary returned by `RouteLoader::register`.
#[derive(Debug, Clone, Default)]
pub struct RegistrationReport {
    /// Nodes whose initializer completed.
    pub initialized: Vec<String>,
    /// Nodes whose initializer returned an error.
    pub failed: Vec<String>,
    /// Nodes without a usable initializer.
    pub skipped: Vec<SkippedNode>,
    /// Scanned paths left out of the tree.
    pub unrepresentable: Vec<RelativePath>,
    /// Routes handed to the host through the facade.
    pub routes_registered: usize,
    /// Every recoverable problem, in the order recorded.
    pub diagnostics: Vec<Diagnostic>,
}

impl RegistrationReport {
    /// Initializers that were run, successful or not.
    pub fn loaders_run(&self) -> usize {
        self.initialized.len() + self.failed.len()
    }

    /// Diagnostics of one kind.
    pub fn diagnostics_of<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a Diagnostic> + 'a {
        self.diagnostics.iter().filter(move |d| d.kind() == kind)
    }

    /// No failures and nothing to report.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.diagnostics.is_empty()
    }
}
