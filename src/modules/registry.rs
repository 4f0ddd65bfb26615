//! Module loading.
//!
//! # Responsibilities
//! - Resolve a relative path to a loaded `Module`
//! - Run each module's factory at most once, on first load
//! - Report missing and failing modules as `LoadError`s
//!
//! # Design Decisions
//! - Modules are compiled in and registered under the path they occupy in
//!   the route directory; loading runs the registered factory
//! - Results are memoized, failures included: a broken module is not retried
//! - The registry doubles as a `DirectoryScanner` for binaries that embed
//!   their whole route tree

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;

use dashmap::DashMap;
use futures_util::future::BoxFuture;
use thiserror::Error;
use tokio::sync::OnceCell;

use crate::modules::module::{Export, Module};
use crate::modules::value::Value;
use crate::routing::{DirectoryScanner, RelativePath, ScanError};
use crate::BoxError;

/// Errors resolving a single module.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("no module registered for {0}")]
    NotFound(RelativePath),

    #[error("{path}: {reason}")]
    Failed { path: RelativePath, reason: String },
}

/// Resolves module paths to their exports.
pub trait ModuleLoader: Send + Sync {
    fn load<'a>(&'a self, path: &'a RelativePath) -> BoxFuture<'a, Result<Arc<Module>, LoadError>>;

    /// Default export only.
    fn load_default<'a>(&'a self, path: &'a RelativePath) -> BoxFuture<'a, Result<Option<Export>, LoadError>> {
        Box::pin(async move { Ok(self.load(path).await?.default_export().cloned()) })
    }

    /// Named exports only.
    fn load_named<'a>(
        &'a self,
        path: &'a RelativePath,
    ) -> BoxFuture<'a, Result<BTreeMap<String, Value>, LoadError>> {
        Box::pin(async move { Ok(self.load(path).await?.named().clone()) })
    }
}

type ModuleFactory = Arc<dyn Fn() -> Result<Module, BoxError> + Send + Sync>;

/// In-process module registry.
#[derive(Default)]
pub struct ModuleRegistry {
    factories: BTreeMap<RelativePath, ModuleFactory>,
    loaded: DashMap<RelativePath, Arc<OnceCell<Result<Arc<Module>, LoadError>>>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a ready-made module.
    pub fn module(self, path: impl Into<RelativePath>, module: Module) -> Self {
        self.factory(path, move || Ok(module.clone()))
    }

    /// Register a module whose body runs on first load.
    pub fn factory<F>(mut self, path: impl Into<RelativePath>, factory: F) -> Self
    where
        F: Fn() -> Result<Module, BoxError> + Send + Sync + 'static,
    {
        self.insert(path, factory);
        self
    }

    pub fn insert<F>(&mut self, path: impl Into<RelativePath>, factory: F)
    where
        F: Fn() -> Result<Module, BoxError> + Send + Sync + 'static,
    {
        let path = path.into();
        self.loaded.remove(&path);
        if self.factories.insert(path.clone(), Arc::new(factory)).is_some() {
            tracing::warn!(path = %path, "Module registered twice, keeping the last one");
        }
    }

    /// Every registered path, sorted.
    pub fn paths(&self) -> BTreeSet<RelativePath> {
        self.factories.keys().cloned().collect()
    }

    pub fn contains(&self, path: &RelativePath) -> bool {
        self.factories.contains_key(path)
    }

    /// Whether the module's factory has already run.
    pub fn is_loaded(&self, path: &RelativePath) -> bool {
        self.loaded.get(path).is_some_and(|cell| cell.initialized())
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl std::fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("modules", &self.factories.keys().collect::<Vec<_>>())
            .field("loaded", &self.loaded.len())
            .finish()
    }
}

impl ModuleLoader for ModuleRegistry {
    fn load<'a>(&'a self, path: &'a RelativePath) -> BoxFuture<'a, Result<Arc<Module>, LoadError>> {
        Box::pin(async move {
            let Some(factory) = self.factories.get(path) else {
                return Err(LoadError::NotFound(path.clone()));
            };
            let cell = self.loaded.entry(path.clone()).or_default().value().clone();

            cell.get_or_init(|| async {
                let result = factory().map(Arc::new).map_err(|e| LoadError::Failed {
                    path: path.clone(),
                    reason: e.to_string(),
                });
                tracing::debug!(path = %path, ok = result.is_ok(), "Module evaluated");
                result
            })
            .await
            .clone()
        })
    }
}

impl DirectoryScanner for ModuleRegistry {
    fn list<'a>(&'a self, _root: &'a Path) -> BoxFuture<'a, Result<BTreeSet<RelativePath>, ScanError>> {
        Box::pin(async move { Ok(self.paths()) })
    }
}
