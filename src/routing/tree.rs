//! Route tree construction.
//!
//! # Responsibilities
//! - Group scanned paths into one `RouteNode` per directory
//! - Identify each directory's index module and sibling methods
//! - Report paths that cannot be placed in the tree
//!
//! # Design Decisions
//! - Input is sorted; the first file claiming a name wins, later ones are
//!   reported as duplicates
//! - Only plain identifiers (no dot, no slash) become directory nodes or
//!   method names
//! - The route directory itself is the root node, with an empty name
//! - How a file name is classified is delegated to a `NodeShape`

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

use crate::config::{LayoutConfig, MethodBinding};
use crate::routing::path::RelativePath;

/// True for non-empty segments with no dot and no slash.
pub fn is_plain_identifier(segment: &str) -> bool {
    !segment.is_empty() && !segment.contains('.') && !segment.contains('/')
}

/// Role of a file inside its directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeafKind {
    Index,
    Method(String),
    Unrepresentable,
}

/// Naming convention of a route directory.
pub trait NodeShape: Send + Sync {
    /// Classify a file name found directly inside a directory.
    fn classify(&self, file_name: &str) -> LeafKind;

    /// How injectable sibling methods are bound.
    fn binding(&self) -> MethodBinding;
}

/// `<index_stem>.<ext>` initializes, any other `<name>.<ext>` is a method.
#[derive(Debug, Clone)]
pub struct ConventionShape {
    index_stem: String,
    extensions: Vec<String>,
    binding: MethodBinding,
}

impl ConventionShape {
    pub fn new(index_stem: impl Into<String>, extensions: Vec<String>, binding: MethodBinding) -> Self {
        Self {
            index_stem: index_stem.into(),
            extensions,
            binding,
        }
    }
}

impl Default for ConventionShape {
    fn default() -> Self {
        Self::from(&LayoutConfig::default())
    }
}

impl From<&LayoutConfig> for ConventionShape {
    fn from(layout: &LayoutConfig) -> Self {
        Self::new(layout.index_stem.clone(), layout.extensions.clone(), layout.binding)
    }
}

impl NodeShape for ConventionShape {
    fn classify(&self, file_name: &str) -> LeafKind {
        let Some((stem, ext)) = file_name.rsplit_once('.') else {
            return LeafKind::Unrepresentable;
        };
        if !self.extensions.iter().any(|e| e == ext) {
            return LeafKind::Unrepresentable;
        }
        if stem == self.index_stem {
            LeafKind::Index
        } else if is_plain_identifier(stem) {
            LeafKind::Method(stem.to_string())
        } else {
            LeafKind::Unrepresentable
        }
    }

    fn binding(&self) -> MethodBinding {
        self.binding
    }
}

/// One directory level of the route tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteNode {
    /// Directory segment; empty for the root.
    pub name: String,
    /// Segments from the root joined by `.`; empty for the root.
    pub dotted: String,
    /// Index module, if the directory has one.
    pub index: Option<RelativePath>,
    /// Sibling methods by name.
    pub methods: BTreeMap<String, RelativePath>,
    /// Child directories by segment.
    pub children: BTreeMap<String, RouteNode>,
}

impl RouteNode {
    fn new(name: &str, parent_dotted: &str) -> Self {
        let dotted = if parent_dotted.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", parent_dotted, name)
        };
        Self {
            name: name.to_string(),
            dotted,
            ..Default::default()
        }
    }

    /// Name used in diagnostics.
    pub fn label(&self) -> &str {
        if self.dotted.is_empty() {
            "root"
        } else {
            &self.dotted
        }
    }

    /// Dotted path of a method of this node.
    pub fn method_path(&self, method: &str) -> String {
        if self.dotted.is_empty() {
            method.to_string()
        } else {
            format!("{}.{}", self.dotted, method)
        }
    }

    /// All nodes, depth first, parents before children.
    pub fn walk(&self) -> Vec<&RouteNode> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(node.children.values().rev());
        }
        out
    }

    /// Node at a dotted path, the root for `""`.
    pub fn find(&self, dotted: &str) -> Option<&RouteNode> {
        if dotted.is_empty() {
            return Some(self);
        }
        dotted
            .split('.')
            .try_fold(self, |node, segment| node.children.get(segment))
    }

    /// Number of nodes with an index module.
    pub fn index_count(&self) -> usize {
        self.walk().iter().filter(|n| n.index.is_some()).count()
    }
}

/// A file ignored because its name was already taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Duplicate {
    pub node: String,
    pub member: String,
    pub kept: RelativePath,
    pub ignored: RelativePath,
}

/// Result of building a tree.
#[derive(Debug, Clone, Default)]
pub struct TreeBuild {
    pub root: RouteNode,
    pub unrepresentable: Vec<RelativePath>,
    pub duplicates: Vec<Duplicate>,
}

/// Builds route trees under a naming convention.
pub struct TreeBuilder<'a> {
    shape: &'a dyn NodeShape,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(shape: &'a dyn NodeShape) -> Self {
        Self { shape }
    }

    pub fn build(&self, paths: &BTreeSet<RelativePath>) -> TreeBuild {
        let mut build = TreeBuild::default();
        let entries: Vec<(&str, &RelativePath)> = paths.iter().map(|p| (p.as_str(), p)).collect();
        let root = self.build_level("", "", entries, &mut build);
        build.root = root;
        build
    }

    fn build_level(
        &self,
        name: &str,
        parent_dotted: &str,
        entries: Vec<(&str, &RelativePath)>,
        build: &mut TreeBuild,
    ) -> RouteNode {
        let mut node = if name.is_empty() {
            RouteNode::default()
        } else {
            RouteNode::new(name, parent_dotted)
        };
        let label = node.label().to_string();
        let mut groups: BTreeMap<&str, Vec<(&str, &RelativePath)>> = BTreeMap::new();

        for (rest, full) in entries {
            if let Some((segment, remainder)) = rest.split_once('/') {
                if is_plain_identifier(segment) && !remainder.is_empty() {
                    groups.entry(segment).or_default().push((remainder, full));
                } else {
                    build.unrepresentable.push(full.clone());
                }
                continue;
            }

            match self.shape.classify(rest) {
                LeafKind::Index => match node.index.clone() {
                    None => node.index = Some(full.clone()),
                    Some(kept) => build.duplicates.push(Duplicate {
                        node: label.clone(),
                        member: rest.to_string(),
                        kept,
                        ignored: full.clone(),
                    }),
                },
                LeafKind::Method(method) => match node.methods.entry(method) {
                    Entry::Vacant(slot) => {
                        slot.insert(full.clone());
                    }
                    Entry::Occupied(slot) => build.duplicates.push(Duplicate {
                        node: label.clone(),
                        member: slot.key().clone(),
                        kept: slot.get().clone(),
                        ignored: full.clone(),
                    }),
                },
                LeafKind::Unrepresentable => build.unrepresentable.push(full.clone()),
            }
        }

        for (segment, children) in groups {
            let child = self.build_level(segment, &node.dotted, children, build);
            node.children.insert(segment.to_string(), child);
        }
        node
    }
}
