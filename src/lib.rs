//! # TwoFour: An Ordered Set on a 2-4 Tree
//!
//! This crate provides [`TwoFourTree`], a sorted set backed by a balanced
//! multi-way search tree in which every node holds one to three keys and every
//! internal node has exactly one more child than it has keys.
//!
//! ## Design Overview
//!
//! ```text
//!                         ┌──────────────┐
//!                         │ [ 30   40 ]  │  <- root, no parent link
//!                         └──┬───┬───┬───┘
//!              ┌─────────────┘   │   └─────────────┐
//!              ▼                 ▼                 ▼
//!       ┌────────────┐    ┌────────────┐    ┌────────────┐
//!       │ [13 15 17] │    │ [33 35 37] │    │ [43 45 47] │  <- leaves, all at
//!       └────────────┘    └────────────┘    └────────────┘     the same depth
//! ```
//!
//! **Storage**: nodes live in an arena and refer to each other by id. A node
//! owns the children listed in its child slots; its `parent` id is only a
//! navigation aid, used for the upward walks of iteration and rebalancing.
//!
//! **Insertion** ([`insert`](TwoFourTree::insert)) always lands in a leaf. A
//! full leaf is split and its middle key promoted, possibly cascading up to a
//! new root.
//!
//! **Removal** ([`erase`](TwoFourTree::erase)) repairs every single-key node
//! on the way down using rotation, fusion or root shrink, so the final
//! extraction from a leaf never needs further repair.
//!
//! **Iteration** is driven by [`Position`]s, `(node, index)` pairs that walk
//! the tree through child and parent links. Two sentinels exist: the *end*
//! position one past the largest key, and the *before-begin* position one
//! before the smallest.
//!
//! ## Basic Usage
//!
//! ```
//! use twofour::TwoFourTree;
//!
//! let mut tree = TwoFourTree::new();
//!
//! assert!(tree.insert(30).1);
//! assert!(tree.insert(10).1);
//! assert!(tree.insert(20).1);
//! assert!(!tree.insert(20).1); // duplicates are rejected
//!
//! assert!(tree.contains(&10));
//! assert_eq!(tree.erase(&10), 1);
//!
//! let keys: Vec<_> = tree.iter().copied().collect();
//! assert_eq!(keys, vec![20, 30]);
//! assert!(tree.validate());
//! ```
//!
//! ## Thread Safety
//!
//! The tree performs no internal synchronization. It is `Send`/`Sync` when `K`
//! is, and mutation requires `&mut self` as usual.

use std::borrow::Borrow;
use std::fmt;

mod arena;
pub mod error;
mod insert;
pub mod iter;
mod node;
mod remove;
#[cfg(feature = "test-utils")]
pub mod util;

use arena::Arena;
use node::{Node, Step};

pub use iter::{Cursor, IntoIter, Iter, Position, RevCursor};
pub use node::{NodeId, MAX_CHILDREN, MAX_KEYS, MIN_KEYS};

// ---------------------------------------------------------------------------
// Core Tree Structure
// ---------------------------------------------------------------------------

/// An ordered set of unique keys stored in a 2-4 tree.
///
/// Keys are ordered by [`Ord`]. To use a different ordering wrap the keys, for
/// example in [`std::cmp::Reverse`].
///
/// # Internal Structure
///
/// - `nodes`: arena owning every node of the tree
/// - `root`: id of the root node. An empty tree still has a root: an empty
///   leaf, so `begin()` and `end()` coincide without special cases
/// - `height`: number of levels, 1 for a lone leaf root
/// - `begin` / `end`: cached boundary positions, refreshed after every
///   structural change
#[derive(Clone)]
pub struct TwoFourTree<K> {
	pub(crate) nodes: Arena<K>,
	pub(crate) root: NodeId,
	pub(crate) len: usize,
	pub(crate) height: usize,
	pub(crate) begin: Position,
	pub(crate) end: Position,
}

impl<K> Default for TwoFourTree<K> {
	fn default() -> Self {
		Self::new()
	}
}

impl<K> TwoFourTree<K> {
	// -----------------------------------------------------------------------
	// Construction
	// -----------------------------------------------------------------------

	/// Creates an empty tree.
	///
	/// The tree starts with a single empty leaf as its root.
	///
	/// # Example
	///
	/// ```
	/// use twofour::TwoFourTree;
	///
	/// let tree: TwoFourTree<String> = TwoFourTree::new();
	/// assert!(tree.is_empty());
	/// assert_eq!(tree.height(), 1);
	/// assert!(tree.begin() == tree.end());
	/// ```
	pub fn new() -> Self {
		let mut nodes = Arena::new();
		let root = nodes.alloc(Node::new(None));
		TwoFourTree {
			nodes,
			root,
			len: 0,
			height: 1,
			begin: Position::new(root, 0),
			end: Position::new(root, 0),
		}
	}

	/// Removes every key, releasing the whole node graph.
	pub fn clear(&mut self) {
		*self = Self::new();
	}

	/// Exchanges the contents of two trees.
	pub fn swap(&mut self, other: &mut Self) {
		std::mem::swap(self, other);
	}

	// -----------------------------------------------------------------------
	// Tree Metadata
	// -----------------------------------------------------------------------

	/// Returns the number of keys in the tree.
	#[inline]
	pub fn len(&self) -> usize {
		self.len
	}

	/// Alias of [`len`](Self::len).
	#[inline]
	pub fn size(&self) -> usize {
		self.len
	}

	/// Returns `true` if the tree holds no keys.
	#[inline]
	pub fn is_empty(&self) -> bool {
		self.len == 0
	}

	/// Alias of [`is_empty`](Self::is_empty).
	#[inline]
	pub fn empty(&self) -> bool {
		self.len == 0
	}

	/// Returns the number of levels in the tree.
	///
	/// - Height 1: the root is a leaf
	/// - Height N: N-1 levels of internal nodes above the leaves
	#[inline]
	pub fn height(&self) -> usize {
		self.height
	}

	// -----------------------------------------------------------------------
	// Cursors
	// -----------------------------------------------------------------------

	/// Cursor at the smallest key, or at the end sentinel if the tree is empty.
	pub fn begin(&self) -> Cursor<'_, K> {
		Cursor::new(self, self.begin)
	}

	/// Cursor one past the largest key.
	pub fn end(&self) -> Cursor<'_, K> {
		Cursor::new(self, self.end)
	}

	/// Reverse cursor at the largest key.
	pub fn rbegin(&self) -> RevCursor<'_, K> {
		RevCursor::new(Cursor::new(self, self.predecessor(self.end)))
	}

	/// Reverse cursor one before the smallest key.
	pub fn rend(&self) -> RevCursor<'_, K> {
		RevCursor::new(Cursor::new(self, Position::before_begin(self.begin.node)))
	}

	/// Turns a [`Position`] returned by a mutating call back into a cursor.
	///
	/// The position must come from this tree and must not have been
	/// invalidated by a later mutation.
	pub fn cursor_at(&self, position: Position) -> Cursor<'_, K> {
		Cursor::new(self, position)
	}

	/// Iterates over the keys in ascending order.
	pub fn iter(&self) -> Iter<'_, K> {
		Iter::new(self)
	}

	/// Returns the smallest key.
	pub fn first(&self) -> Option<&K> {
		self.begin().get()
	}

	/// Returns the largest key.
	pub fn last(&self) -> Option<&K> {
		self.rbegin().get()
	}

	/// Returns the key at `position`.
	///
	/// Panics if `position` is a sentinel or stale.
	pub(crate) fn key_at(&self, position: Position) -> &K {
		self.nodes[position.node]
			.keys
			.get(position.index)
			.unwrap_or_else(|| panic!("dereferenced sentinel position {position:?}"))
	}

	/// Recomputes the cached begin and end positions.
	pub(crate) fn refresh_bounds(&mut self) {
		let first = self.leftmost_leaf(self.root);
		let last = self.rightmost_leaf(self.root);
		self.begin = Position::new(first, 0);
		self.end = Position::new(last, self.nodes[last].len());
	}
}

impl<K: Ord> TwoFourTree<K> {
	// -----------------------------------------------------------------------
	// Lookup
	// -----------------------------------------------------------------------

	/// Descends from the root to the node holding `key`.
	///
	/// # Returns
	///
	/// - `(node, Ok(index))` if the key is stored at `index` of `node`
	/// - `(leaf, Err(index))` with the leaf and slot where it would be inserted
	pub(crate) fn find_key<Q>(&self, key: &Q) -> (NodeId, Result<usize, usize>)
	where
		K: Borrow<Q>,
		Q: ?Sized + Ord,
	{
		let mut node = self.root;
		loop {
			match self.nodes[node].traverse_step(key) {
				Step::Found(index) => return (node, Ok(index)),
				Step::Absent(index) => return (node, Err(index)),
				Step::Descend(child) => node = child,
			}
		}
	}

	/// Returns a cursor at `key`, or the end cursor if it is absent.
	///
	/// # Example
	///
	/// ```
	/// use twofour::TwoFourTree;
	///
	/// let tree: TwoFourTree<i32> = (0..100).collect();
	/// assert_eq!(tree.find(&42).get(), Some(&42));
	/// assert!(tree.find(&420) == tree.end());
	/// ```
	pub fn find<Q>(&self, key: &Q) -> Cursor<'_, K>
	where
		K: Borrow<Q>,
		Q: ?Sized + Ord,
	{
		match self.find_key(key) {
			(node, Ok(index)) => Cursor::new(self, Position::new(node, index)),
			(_, Err(_)) => self.end(),
		}
	}

	/// Returns `true` if the tree contains `key`.
	pub fn contains<Q>(&self, key: &Q) -> bool
	where
		K: Borrow<Q>,
		Q: ?Sized + Ord,
	{
		self.find_key(key).1.is_ok()
	}

	/// Returns the number of stored keys equal to `key`, either 0 or 1.
	pub fn count<Q>(&self, key: &Q) -> usize
	where
		K: Borrow<Q>,
		Q: ?Sized + Ord,
	{
		usize::from(self.contains(key))
	}

	/// Returns the stored key equal to `key`.
	///
	/// # Example
	///
	/// ```
	/// use twofour::TwoFourTree;
	///
	/// let mut tree = TwoFourTree::new();
	/// tree.insert("apple".to_string());
	///
	/// assert_eq!(tree.get("apple").map(String::as_str), Some("apple"));
	/// assert_eq!(tree.get("pear"), None);
	/// ```
	pub fn get<Q>(&self, key: &Q) -> Option<&K>
	where
		K: Borrow<Q>,
		Q: ?Sized + Ord,
	{
		match self.find_key(key) {
			(node, Ok(index)) => Some(&self.nodes[node].keys[index]),
			(_, Err(_)) => None,
		}
	}

	/// Cursor at the first key not less than `key`.
	pub fn lower_bound<Q>(&self, key: &Q) -> Cursor<'_, K>
	where
		K: Borrow<Q>,
		Q: ?Sized + Ord,
	{
		let mut best = self.end;
		let mut node = self.root;
		loop {
			let n = &self.nodes[node];
			match n.search(key) {
				Ok(index) => return Cursor::new(self, Position::new(node, index)),
				Err(index) => {
					if index < n.len() {
						best = Position::new(node, index);
					}
					if n.is_leaf() {
						return Cursor::new(self, best);
					}
					node = n.children[index];
				}
			}
		}
	}

	/// Cursor at the first key greater than `key`.
	///
	/// # Example
	///
	/// ```
	/// use twofour::TwoFourTree;
	///
	/// let tree: TwoFourTree<i32> = (0..10).map(|k| k * 10).collect();
	/// assert_eq!(tree.lower_bound(&40).get(), Some(&40));
	/// assert_eq!(tree.upper_bound(&40).get(), Some(&50));
	/// assert_eq!(tree.lower_bound(&41).get(), Some(&50));
	/// assert!(tree.upper_bound(&90) == tree.end());
	/// ```
	pub fn upper_bound<Q>(&self, key: &Q) -> Cursor<'_, K>
	where
		K: Borrow<Q>,
		Q: ?Sized + Ord,
	{
		let cursor = self.lower_bound(key);
		match cursor.get() {
			Some(found) if Borrow::<Q>::borrow(found) == key => cursor.next_cursor(),
			_ => cursor,
		}
	}
}

// ---------------------------------------------------------------------------
// Invariant Checking
// ---------------------------------------------------------------------------

/// Tallies gathered while walking the tree.
#[derive(Default)]
struct Census {
	keys: usize,
	nodes: usize,
}

impl<K: Ord> TwoFourTree<K> {
	/// Walks the whole tree and reports the first structural violation.
	///
	/// # Invariants Checked
	///
	/// 1. Key count: every node other than an empty root leaf holds 1..=3 keys
	/// 2. Key ordering: keys strictly increase within each node
	/// 3. Search order: every key lies between the separators above it
	/// 4. Shape: a node has either no children or exactly `keys + 1`
	/// 5. Back-links: each child's parent is the node listing it
	/// 6. Balance: every leaf sits at depth `height`
	/// 7. Bookkeeping: `len`, arena occupancy and cached bounds agree with the
	///    nodes actually reachable from the root
	///
	/// This is a diagnostic walk over every node; it is not meant for hot paths.
	pub fn check(&self) -> error::Result<()> {
		let root = self.nodes.get(self.root).ok_or(error::Error::Dangling {
			node: self.root,
		})?;
		if let Some(parent) = root.parent {
			return Err(error::Error::RootHasParent {
				node: self.root,
				parent,
			});
		}

		let mut census = Census::default();
		self.check_node(self.root, 1, None, None, &mut census)?;

		if census.keys != self.len {
			return Err(error::Error::SizeMismatch {
				reported: self.len,
				counted: census.keys,
			});
		}
		if census.nodes != self.nodes.live() {
			return Err(error::Error::Leaked {
				live: self.nodes.live(),
				reachable: census.nodes,
			});
		}

		let first = self.leftmost_leaf(self.root);
		if self.begin != Position::new(first, 0) {
			return Err(error::Error::StaleBounds {
				which: "begin",
			});
		}
		let last = self.rightmost_leaf(self.root);
		if self.end != Position::new(last, self.nodes[last].len()) {
			return Err(error::Error::StaleBounds {
				which: "end",
			});
		}

		Ok(())
	}

	/// Returns `true` if [`check`](Self::check) finds no violation.
	pub fn validate(&self) -> bool {
		self.check().is_ok()
	}

	/// Panics with a description of the first violated invariant.
	///
	/// Intended to be sprinkled through tests after every mutation.
	#[track_caller]
	pub fn assert_invariants(&self) {
		if let Err(err) = self.check() {
			panic!("tree invariant violated: {err}");
		}
	}

	/// Recursively validates a node and its subtree.
	///
	/// `lower` and `upper` are the exclusive bounds inherited from the
	/// separators above, `None` on the outer edges of the tree.
	fn check_node(
		&self,
		id: NodeId,
		depth: usize,
		lower: Option<&K>,
		upper: Option<&K>,
		census: &mut Census,
	) -> error::Result<()> {
		let node = self.nodes.get(id).ok_or(error::Error::Dangling {
			node: id,
		})?;
		census.nodes += 1;
		census.keys += node.len();

		// Invariant 1: key count
		let empty_root = id == self.root && node.is_leaf();
		if node.len() > MAX_KEYS || (node.len() < MIN_KEYS && !empty_root) {
			return Err(error::Error::KeyCount {
				node: id,
				keys: node.len(),
			});
		}

		// Invariant 2: key ordering
		for i in 1..node.len() {
			if node.keys[i - 1] >= node.keys[i] {
				return Err(error::Error::Unsorted {
					node: id,
					index: i,
				});
			}
		}

		// Invariant 3: search order
		for (index, key) in node.keys.iter().enumerate() {
			let above = lower.map_or(true, |lo| key > lo);
			let below = upper.map_or(true, |hi| key < hi);
			if !(above && below) {
				return Err(error::Error::OutOfRange {
					node: id,
					index,
				});
			}
		}

		if node.is_leaf() {
			// Invariant 6: balance
			if depth != self.height {
				return Err(error::Error::UnevenLeaves {
					node: id,
					depth,
					height: self.height,
				});
			}
			return Ok(());
		}

		// Invariant 4: shape
		if node.children.len() != node.len() + 1 {
			return Err(error::Error::ChildCount {
				node: id,
				keys: node.len(),
				children: node.children.len(),
			});
		}

		for (i, &child) in node.children.iter().enumerate() {
			// Invariant 5: back-links
			let found = self.nodes.get(child).ok_or(error::Error::Dangling {
				node: child,
			})?;
			if found.parent != Some(id) {
				return Err(error::Error::ParentLink {
					parent: id,
					child,
					found: found.parent,
				});
			}

			let child_lower = if i == 0 {
				lower
			} else {
				Some(&node.keys[i - 1])
			};
			let child_upper = node.keys.get(i).or(upper);
			self.check_node(child, depth + 1, child_lower, child_upper, census)?;
		}

		Ok(())
	}
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

impl<K: fmt::Display> TwoFourTree<K> {
	/// Renders the node graph level by level, one line per level.
	///
	/// Each node shows its keys inside brackets with `_` marking an unused
	/// slot, and nodes are separated by spaces:
	///
	/// ```text
	/// [30 40 _]
	/// [13 15 17] [33 35 37] [43 45 47]
	/// ```
	///
	/// The format is meant for debugging and may change.
	pub fn render(&self) -> String {
		self.to_string()
	}
}

impl<K: fmt::Display> fmt::Display for TwoFourTree<K> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut level = vec![self.root];
		while !level.is_empty() {
			let mut next = Vec::new();
			for (n, &id) in level.iter().enumerate() {
				if n > 0 {
					f.write_str(" ")?;
				}
				let node = &self.nodes[id];
				f.write_str("[")?;
				for slot in 0..MAX_KEYS {
					if slot > 0 {
						f.write_str(" ")?;
					}
					match node.keys.get(slot) {
						Some(key) => write!(f, "{key}")?,
						None => f.write_str("_")?,
					}
				}
				f.write_str("]")?;
				next.extend(node.children.iter().copied());
			}
			writeln!(f)?;
			level = next;
		}
		Ok(())
	}
}

impl<K: fmt::Debug> fmt::Debug for TwoFourTree<K> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_set().entries(self.iter()).finish()
	}
}

// ---------------------------------------------------------------------------
// Standard Trait Implementations
// ---------------------------------------------------------------------------

impl<K: PartialEq> PartialEq for TwoFourTree<K> {
	fn eq(&self, other: &Self) -> bool {
		self.len == other.len && self.iter().eq(other.iter())
	}
}

impl<K: Eq> Eq for TwoFourTree<K> {}

impl<K: Ord> FromIterator<K> for TwoFourTree<K> {
	fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
		let mut tree = TwoFourTree::new();
		tree.extend(iter);
		tree
	}
}

impl<K: Ord> Extend<K> for TwoFourTree<K> {
	fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
		for key in iter {
			self.insert(key);
		}
	}
}

impl<'a, K: Ord + Copy + 'a> Extend<&'a K> for TwoFourTree<K> {
	fn extend<I: IntoIterator<Item = &'a K>>(&mut self, iter: I) {
		self.extend(iter.into_iter().copied());
	}
}

impl<K: Ord, const N: usize> From<[K; N]> for TwoFourTree<K> {
	fn from(keys: [K; N]) -> Self {
		keys.into_iter().collect()
	}
}
