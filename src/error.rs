//! # Error Types for the 2-4 Tree
//!
//! Ordinary outcomes never produce an error: a duplicate insert is reported
//! through the `inserted` flag, a missing key through an end cursor or a
//! zero count.
//!
//! The errors here describe **structural corruption**, which only the
//! diagnostic walk in [`TwoFourTree::check`](crate::TwoFourTree::check) looks
//! for. A tree mutated solely through its public API never reports one; seeing
//! one means a bug in the engine.
//!
//! Misuse of the API, such as dereferencing a sentinel cursor or stepping past
//! the end, is a contract violation and panics instead.

use crate::node::NodeId;
use thiserror::Error;

/// Invariant violations found by the diagnostic walk, plus fixture loading
/// failures when the `test-utils` feature is enabled.
#[derive(Error, Debug)]
pub enum Error {
	/// A node holds more than three keys, or a node other than an empty root
	/// leaf holds none.
	#[error("node {node:?} holds {keys} keys")]
	KeyCount {
		node: NodeId,
		keys: usize,
	},

	/// Keys within a node are not strictly increasing.
	#[error("keys of node {node:?} are not strictly increasing at index {index}")]
	Unsorted {
		node: NodeId,
		index: usize,
	},

	/// A key lies outside the range implied by the separators above it.
	#[error("key {index} of node {node:?} lies outside the range of its subtree")]
	OutOfRange {
		node: NodeId,
		index: usize,
	},

	/// An internal node does not have exactly one more child than keys.
	#[error("node {node:?} has {children} children for {keys} keys")]
	ChildCount {
		node: NodeId,
		keys: usize,
		children: usize,
	},

	/// A child's back-link does not point at the node listing it.
	#[error("child {child:?} of {parent:?} links back to {found:?}")]
	ParentLink {
		parent: NodeId,
		child: NodeId,
		found: Option<NodeId>,
	},

	/// The root carries a parent link.
	#[error("root {node:?} links to parent {parent:?}")]
	RootHasParent {
		node: NodeId,
		parent: NodeId,
	},

	/// A child slot refers to a node that no longer exists.
	#[error("node {node:?} is referenced but not allocated")]
	Dangling {
		node: NodeId,
	},

	/// Leaves are not all at the same depth.
	#[error("leaf {node:?} sits at depth {depth}, expected {height}")]
	UnevenLeaves {
		node: NodeId,
		depth: usize,
		height: usize,
	},

	/// The size counter disagrees with the keys actually stored.
	#[error("tree reports {reported} keys but holds {counted}")]
	SizeMismatch {
		reported: usize,
		counted: usize,
	},

	/// Some allocated nodes cannot be reached from the root.
	#[error("{live} nodes allocated but only {reachable} reachable from the root")]
	Leaked {
		live: usize,
		reachable: usize,
	},

	/// A cached boundary position no longer matches the tree.
	#[error("cached {which} position is stale")]
	StaleBounds {
		which: &'static str,
	},

	/// A fixture file could not be read.
	#[cfg(feature = "test-utils")]
	#[error("failed to read fixture: {0}")]
	Io(#[from] std::io::Error),

	/// A fixture file is not valid JSON for a tree shape.
	#[cfg(feature = "test-utils")]
	#[error("malformed fixture: {0}")]
	Fixture(#[from] serde_json::Error),
}

/// A Result type alias using our custom Error type.
pub type Result<T> = std::result::Result<T, Error>;
