//! # Tree Nodes
//!
//! A node is the storage unit of the 2-4 tree: up to [`MAX_KEYS`] ordered keys,
//! up to [`MAX_CHILDREN`] child links and a non-owning link back to its parent.
//!
//! ```text
//!            keys:      [ k0 ,  k1 ,  k2 ]
//!                      /     |     |     \
//!            children: c0    c1    c2    c3
//!
//!   every key under c0 < k0 < every key under c1 < k1 < ... < k2 < every key under c3
//! ```
//!
//! Links are [`NodeId`]s into the tree's [`Arena`](crate::arena::Arena). A node
//! owns the children it lists; the `parent` field is navigation only and is
//! rewritten by the engines whenever a child moves between nodes.

use smallvec::SmallVec;
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;

// ---------------------------------------------------------------------------
// Configuration Constants
// ---------------------------------------------------------------------------

/// Maximum number of keys a node can hold. A node holding this many is full.
pub const MAX_KEYS: usize = 3;

/// Maximum number of children an internal node can hold.
pub const MAX_CHILDREN: usize = MAX_KEYS + 1;

/// Minimum number of keys held by any node other than an empty root leaf.
pub const MIN_KEYS: usize = 1;

/// Handle to a node stored in the tree's arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
	#[inline]
	pub(crate) fn index(self) -> usize {
		self.0 as usize
	}
}

impl fmt::Debug for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// Outcome of a single search step inside one node.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub(crate) enum Step {
	/// The key sits in this node at the given index.
	Found(usize),
	/// The key can only be under this child.
	Descend(NodeId),
	/// This node is a leaf and the key is absent; the index is where it would go.
	Absent(usize),
}

/// A node of the 2-4 tree.
///
/// A node is a **leaf** when `children` is empty, and **internal** when it
/// holds exactly `keys.len() + 1` children.
#[derive(Clone)]
pub(crate) struct Node<K> {
	/// Strictly increasing keys.
	pub(crate) keys: SmallVec<[K; MAX_KEYS]>,
	/// Owned child links, empty for a leaf.
	pub(crate) children: SmallVec<[NodeId; MAX_CHILDREN]>,
	/// Back-link to the node owning this one, `None` for the root.
	pub(crate) parent: Option<NodeId>,
}

impl<K: fmt::Debug> fmt::Debug for Node<K> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Node")
			.field("keys", &self.keys)
			.field("children", &self.children)
			.field("parent", &self.parent)
			.finish()
	}
}

impl<K> Node<K> {
	/// Creates an empty leaf with the given parent.
	pub(crate) fn new(parent: Option<NodeId>) -> Node<K> {
		Node {
			keys: SmallVec::new(),
			children: SmallVec::new(),
			parent,
		}
	}

	/// Number of keys in this node.
	#[inline]
	pub(crate) fn len(&self) -> usize {
		self.keys.len()
	}

	#[inline]
	pub(crate) fn is_leaf(&self) -> bool {
		self.children.is_empty()
	}

	#[inline]
	pub(crate) fn is_full(&self) -> bool {
		self.keys.len() == MAX_KEYS
	}

	/// Returns `true` if removing a key here would leave the node empty.
	#[inline]
	pub(crate) fn is_minimal(&self) -> bool {
		self.keys.len() <= MIN_KEYS
	}

	/// Returns the slot index under which `child` is stored.
	///
	/// Panics if `child` is not a child of this node, which means the
	/// back-links are corrupted.
	pub(crate) fn child_index(&self, child: NodeId) -> usize {
		self.children
			.iter()
			.position(|&c| c == child)
			.unwrap_or_else(|| panic!("{child:?} is not a child of this node"))
	}

	/// Scans the keys left to right.
	///
	/// # Returns
	///
	/// - `Ok(index)` if `keys[index] == key`
	/// - `Err(index)` with the index of the first key greater than `key`,
	///   which is also the child slot that would contain it
	#[inline]
	pub(crate) fn search<Q>(&self, key: &Q) -> Result<usize, usize>
	where
		K: Borrow<Q>,
		Q: ?Sized + Ord,
	{
		for (n, k) in self.keys.iter().enumerate() {
			match k.borrow().cmp(key) {
				Ordering::Greater => return Err(n),
				Ordering::Equal => return Ok(n),
				Ordering::Less => (),
			}
		}
		Err(self.keys.len())
	}

	/// One step of a root-to-leaf search.
	pub(crate) fn traverse_step<Q>(&self, key: &Q) -> Step
	where
		K: Borrow<Q>,
		Q: ?Sized + Ord,
	{
		match self.search(key) {
			Ok(index) => Step::Found(index),
			Err(index) if self.is_leaf() => Step::Absent(index),
			Err(index) => Step::Descend(self.children[index]),
		}
	}

	// -----------------------------------------------------------------------
	// Leaf Primitives
	// -----------------------------------------------------------------------

	/// Inserts `key` into a non-full leaf and returns the index it landed at.
	///
	/// The caller guarantees the key is not already present.
	pub(crate) fn add_value(&mut self, key: K) -> usize
	where
		K: Ord,
	{
		debug_assert!(self.is_leaf(), "add_value called on an internal node");
		debug_assert!(!self.is_full(), "add_value called on a full node");

		let index = match self.search(&key) {
			Ok(_) => unreachable!("add_value called with a key already in the node"),
			Err(index) => index,
		};
		self.keys.insert(index, key);
		index
	}

	/// Removes and returns the key at `index` of a leaf.
	pub(crate) fn extract_value(&mut self, index: usize) -> K {
		debug_assert!(self.is_leaf(), "extract_value called on an internal node");
		self.keys.remove(index)
	}

	// -----------------------------------------------------------------------
	// Internal Primitives
	// -----------------------------------------------------------------------

	/// Inserts a separator key and the child to its right into a non-full node.
	///
	/// `child` becomes `children[index + 1]` where `index` is the slot the key
	/// is inserted at. The caller is responsible for reparenting `child`.
	pub(crate) fn insert_separator(&mut self, key: K, child: NodeId) -> usize
	where
		K: Ord,
	{
		debug_assert!(!self.is_full(), "insert_separator called on a full node");

		let index = match self.search(&key) {
			Ok(_) => unreachable!("separator key already present in parent"),
			Err(index) => index,
		};
		self.keys.insert(index, key);
		self.children.insert(index + 1, child);
		index
	}
}
