//! Route directory subsystem.
//!
//! # Data Flow
//! ```text
//! Route tree construction (at startup):
//!     base_dir
//!     → scanner.rs (walk, filter extensions, skip dependency dirs)
//!     → BTreeSet<RelativePath> (sorted)
//!     → tree.rs (group by directory segment, classify files)
//!     → RouteNode tree + unrepresentable paths + duplicates
//! ```
//!
//! # Design Decisions
//! - Tree built once, immutable afterwards
//! - Deterministic: sorted input, first match wins
//! - Malformed paths are reported, never silently dropped

pub mod path;
pub mod scanner;
pub mod tree;

pub use path::RelativePath;
pub use scanner::{DirectoryScanner, FsScanner, ScanError};
pub use tree::{ConventionShape, LeafKind, NodeShape, RouteNode, TreeBuild, TreeBuilder};
