//! Registration driver.
//!
//! # Responsibilities
//! - Scan the route directory and build the route tree
//! - Load each node's index module and build its injection context
//! - Give every node a self-reference over its sibling methods
//! - Run all node initializers against the hook-merging facade
//!
//! # Design Decisions
//! - Structural loading is sequential and top-down so each child sees its
//!   parent's merged context
//! - Initializers run concurrently on the caller's task via `join_all`
//! - Only a missing base directory, bad layout settings and scan failures
//!   are fatal; everything else ends up in the report

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures_util::future::join_all;

use crate::config::{validate_config, LoaderConfig};
use crate::http::{Framework, HookList, HookSet, Routes};
use crate::inject::{ContextBuilder, Environment, InjectionContext, NodeContext, SelfRef};
use crate::modules::{Export, Initializer, ModuleLoader, ModuleRegistry, Value};
use crate::observability::{metrics, Diagnostic, Diagnostics};
use crate::registration::error::LoaderError;
use crate::registration::report::{RegistrationReport, SkipReason, SkippedNode};
use crate::routing::{ConventionShape, DirectoryScanner, FsScanner, NodeShape, RouteNode, TreeBuilder};
use crate::BoxError;

/// Inputs of a loader.
#[derive(Debug, Clone, Default)]
pub struct LoaderOptions {
    pub config: LoaderConfig,
    /// Caller-supplied injections, visible to every node.
    pub injections: InjectionContext,
    /// Hooks appended to every registered route.
    pub hooks: HookSet,
    pub environment: Environment,
}

impl LoaderOptions {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self::from_config(LoaderConfig::with_base_dir(base_dir))
    }

    pub fn from_config(config: LoaderConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn with_injection(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.injections.insert(key, value);
        self
    }

    pub fn with_hook(mut self, name: impl Into<String>, hooks: impl Into<HookList>) -> Self {
        self.hooks.add(name, hooks);
        self
    }

    pub fn with_hooks(mut self, hooks: HookSet) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }
}

/// Loads a route directory and registers it on a host framework.
pub struct RouteLoader {
    base_dir: PathBuf,
    shape: Arc<dyn NodeShape>,
    scanner: Arc<dyn DirectoryScanner>,
    modules: Arc<dyn ModuleLoader>,
    contexts: ContextBuilder,
    injections: InjectionContext,
    hooks: HookSet,
    environment: Environment,
}

impl RouteLoader {
    /// Fails before any I/O when no base directory is configured.
    pub fn new(options: LoaderOptions, modules: Arc<dyn ModuleLoader>) -> Result<Self, LoaderError> {
        let LoaderOptions {
            config,
            injections,
            hooks,
            environment,
        } = options;

        let base_dir = config.base_dir.clone().ok_or(LoaderError::MissingBaseDir)?;
        validate_config(&config).map_err(LoaderError::Config)?;

        for name in hooks.unknown_names() {
            tracing::warn!(hook = %name, "Hook slot is not part of the request lifecycle");
        }

        Ok(Self {
            base_dir,
            shape: Arc::new(ConventionShape::from(&config.layout)),
            scanner: Arc::new(FsScanner::from_config(&config.layout, &config.scan)),
            modules,
            contexts: ContextBuilder::from_config(&config.environment),
            injections,
            hooks,
            environment,
        })
    }

    /// Loader whose directory listing and modules both come from a
    /// registry compiled into the binary.
    pub fn embedded(options: LoaderOptions, registry: Arc<ModuleRegistry>) -> Result<Self, LoaderError> {
        let loader = Self::new(options, registry.clone())?;
        Ok(loader.with_scanner(registry))
    }

    pub fn with_scanner(mut self, scanner: Arc<dyn DirectoryScanner>) -> Self {
        self.scanner = scanner;
        self
    }

    pub fn with_shape(mut self, shape: Arc<dyn NodeShape>) -> Self {
        self.shape = shape;
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Scan, load and register every route node.
    pub async fn register<F>(&self, framework: Arc<F>) -> Result<RegistrationReport, LoaderError>
    where
        F: Framework + 'static,
    {
        let diagnostics = Diagnostics::new();

        let paths = self.scanner.list(&self.base_dir).await?;
        tracing::info!(
            base_dir = %self.base_dir.display(),
            files = paths.len(),
            "Route directory scanned"
        );

        let build = TreeBuilder::new(self.shape.as_ref()).build(&paths);
        for path in &build.unrepresentable {
            diagnostics.record(Diagnostic::Unrepresentable {
                path: path.to_string(),
            });
        }
        for duplicate in &build.duplicates {
            diagnostics.record(Diagnostic::DuplicateMember {
                node: duplicate.node.clone(),
                member: duplicate.member.clone(),
                ignored: duplicate.ignored.to_string(),
            });
        }

        let mut report = RegistrationReport::default();
        let pending = self.load_tree(&build.root, &diagnostics, &mut report).await;
        tracing::info!(
            indexes = build.root.index_count(),
            initializers = pending.len(),
            "Route tree loaded"
        );

        let routes = Routes::new(framework, self.hooks.clone());
        let results = join_all(pending.into_iter().map(|node| node.run(routes.clone()))).await;

        for (node, result) in results {
            match result {
                Ok(()) => {
                    metrics::record_node_initialized(true);
                    report.initialized.push(node);
                }
                Err(e) => {
                    metrics::record_node_initialized(false);
                    diagnostics.record(Diagnostic::InitializerFailed {
                        node: node.clone(),
                        reason: e.to_string(),
                    });
                    report.failed.push(node);
                }
            }
        }

        report.unrepresentable = build.unrepresentable;
        report.routes_registered = routes.registered();
        report.diagnostics = diagnostics.snapshot();

        tracing::info!(
            initialized = report.initialized.len(),
            failed = report.failed.len(),
            skipped = report.skipped.len(),
            routes = report.routes_registered,
            diagnostics = report.diagnostics.len(),
            "Route registration complete"
        );
        Ok(report)
    }

    /// Load indexes top-down, then wire self-references bottom-up.
    /// Returned initializers are in pre-order.
    async fn load_tree<'t>(
        &self,
        root: &'t RouteNode,
        diagnostics: &Diagnostics,
        report: &mut RegistrationReport,
    ) -> Vec<PendingNode> {
        let mut loaded: Vec<LoadedNode<'t>> = Vec::new();
        let mut stack = vec![(root, self.injections.clone())];

        while let Some((node, base)) = stack.pop() {
            let (initializer, exports) = self.load_index(node, diagnostics, report).await;
            let context = self.contexts.build(&base, &exports, &self.environment);

            for child in node.children.values().rev() {
                stack.push((child, context.clone()));
            }
            loaded.push(LoadedNode {
                node,
                base,
                context,
                initializer,
            });
        }

        let mut refs: HashMap<&str, SelfRef> = HashMap::new();
        let mut pending = Vec::new();

        for LoadedNode {
            node,
            base,
            context,
            initializer,
        } in loaded.into_iter().rev()
        {
            let children: BTreeMap<String, SelfRef> = node
                .children
                .values()
                .filter_map(|child| {
                    refs.get(child.dotted.as_str())
                        .map(|r| (child.name.clone(), r.clone()))
                })
                .collect();

            let self_ref = SelfRef::new(
                node,
                self.shape.binding(),
                context.clone(),
                base,
                self.modules.clone(),
                diagnostics.clone(),
            )
            .with_children(children);
            refs.insert(node.dotted.as_str(), self_ref.clone());

            if let Some(initializer) = initializer {
                pending.push(PendingNode {
                    node: node.label().to_string(),
                    initializer,
                    injections: context,
                    self_ref,
                });
            }
        }

        pending.reverse();
        pending
    }

    async fn load_index(
        &self,
        node: &RouteNode,
        diagnostics: &Diagnostics,
        report: &mut RegistrationReport,
    ) -> (Option<Initializer>, BTreeMap<String, Value>) {
        let label = node.label().to_string();

        let Some(path) = &node.index else {
            tracing::debug!(node = %label, "No index module");
            report.skipped.push(SkippedNode {
                node: label,
                reason: SkipReason::NoIndex,
            });
            return (None, BTreeMap::new());
        };

        let module = match self.modules.load(path).await {
            Ok(module) => module,
            Err(e) => {
                diagnostics.record(Diagnostic::LoadFailed {
                    path: path.to_string(),
                    reason: e.to_string(),
                });
                report.skipped.push(SkippedNode {
                    node: label,
                    reason: SkipReason::LoadFailed,
                });
                return (None, BTreeMap::new());
            }
        };

        let initializer = match module.default_export() {
            Some(Export::Initializer(initializer)) => Some(initializer.clone()),
            other => {
                diagnostics.record(Diagnostic::InvalidIndex {
                    node: label.clone(),
                    path: path.to_string(),
                    kind: other.map_or("none", Export::kind),
                });
                report.skipped.push(SkippedNode {
                    node: label,
                    reason: SkipReason::NoInitializer,
                });
                None
            }
        };

        (initializer, module.named().clone())
    }
}

impl std::fmt::Debug for RouteLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteLoader")
            .field("base_dir", &self.base_dir)
            .field("injections", &self.injections)
            .field("hooks", &self.hooks)
            .field("environment", &self.environment)
            .finish_non_exhaustive()
    }
}

struct LoadedNode<'t> {
    node: &'t RouteNode,
    base: InjectionContext,
    context: InjectionContext,
    initializer: Option<Initializer>,
}

/// A node whose initializer is queued.
struct PendingNode {
    node: String,
    initializer: Initializer,
    injections: InjectionContext,
    self_ref: SelfRef,
}

impl PendingNode {
    async fn run(self, routes: Routes) -> (String, Result<(), BoxError>) {
        tracing::debug!(node = %self.node, "Running route initializer");
        let context = NodeContext::new(self.injections, routes, self.self_ref);
        let result = (self.initializer)(context).await;
        (self.node, result)
    }
}
