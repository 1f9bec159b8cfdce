//! Cursors and iterators for the `TwoFourTree` data structure
//!
//! A [`Position`] is a `(node, index)` pair. Stepping forward or backward
//! walks the tree directly: down through child links when the current key has
//! a subtree on the relevant side, sideways within a leaf, and up through
//! parent links when a leaf is exhausted.
//!
//! ```text
//!            [ 2 ]                 begin  = (leaf A, 0)        -> 1
//!           /     \                (A, 0) ++ = (root, 0)       -> 2
//!      A [1]       B [3 4]         (root, 0) ++ = (B, 0)       -> 3
//!                                  (B, 1) ++ = (B, 2)          -> end
//! ```
//!
//! The end sentinel is `(rightmost leaf, its key count)` and the before-begin
//! sentinel is `(leftmost leaf, BEFORE_BEGIN)`, so stepping back from end and
//! forward from before-begin are both well defined.

use crate::node::NodeId;
use crate::TwoFourTree;
use std::fmt;
use std::iter::FusedIterator;

/// Index value reserved for the before-begin sentinel.
pub(crate) const BEFORE_BEGIN: usize = usize::MAX;

/// A location in the tree, detached from any borrow of it.
///
/// Positions are what mutating calls hand back, since a [`Cursor`] cannot
/// outlive a `&mut` borrow. A mutation that frees the node a position points
/// at, or moves the key it points at, makes the position stale; using a stale
/// position either panics or yields an unrelated key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
	pub(crate) node: NodeId,
	pub(crate) index: usize,
}

impl Position {
	#[inline]
	pub(crate) fn new(node: NodeId, index: usize) -> Position {
		Position {
			node,
			index,
		}
	}

	#[inline]
	pub(crate) fn before_begin(node: NodeId) -> Position {
		Position::new(node, BEFORE_BEGIN)
	}

	/// Returns `true` for the before-begin sentinel.
	#[inline]
	pub fn is_before_begin(&self) -> bool {
		self.index == BEFORE_BEGIN
	}
}

impl fmt::Debug for Position {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.is_before_begin() {
			write!(f, "Position({:?}, before-begin)", self.node)
		} else {
			write!(f, "Position({:?}, {})", self.node, self.index)
		}
	}
}

// ---------------------------------------------------------------------------
// Tree Walking
// ---------------------------------------------------------------------------

impl<K> TwoFourTree<K> {
	/// Descends through first children down to a leaf.
	pub(crate) fn leftmost_leaf(&self, node: NodeId) -> NodeId {
		let mut node = node;
		while let Some(&first) = self.nodes[node].children.first() {
			node = first;
		}
		node
	}

	/// Descends through last children down to a leaf.
	pub(crate) fn rightmost_leaf(&self, node: NodeId) -> NodeId {
		let mut node = node;
		while let Some(&last) = self.nodes[node].children.last() {
			node = last;
		}
		node
	}

	/// Returns the position following `pos`.
	///
	/// The successor of the last key is the end sentinel, and the successor of
	/// before-begin is the first key. Panics when called on end.
	pub(crate) fn successor(&self, pos: Position) -> Position {
		if pos.is_before_begin() {
			return self.begin;
		}

		let node = &self.nodes[pos.node];
		assert!(pos.index < node.len(), "cannot advance past the end of the tree");

		if !node.is_leaf() {
			let leaf = self.leftmost_leaf(node.children[pos.index + 1]);
			return Position::new(leaf, 0);
		}

		if pos.index + 1 < node.len() {
			return Position::new(pos.node, pos.index + 1);
		}

		// Climb until we arrive from some key's left side
		let mut child = pos.node;
		while let Some(parent) = self.nodes[child].parent {
			let slot = self.nodes[parent].child_index(child);
			if slot < self.nodes[parent].len() {
				return Position::new(parent, slot);
			}
			child = parent;
		}

		Position::new(pos.node, node.len())
	}

	/// Returns the position preceding `pos`.
	///
	/// The predecessor of the first key is the before-begin sentinel, and the
	/// predecessor of end is the last key. Panics when called on before-begin.
	pub(crate) fn predecessor(&self, pos: Position) -> Position {
		assert!(!pos.is_before_begin(), "cannot step back before the beginning of the tree");

		let node = &self.nodes[pos.node];

		if !node.is_leaf() {
			let leaf = self.rightmost_leaf(node.children[pos.index]);
			return Position::new(leaf, self.nodes[leaf].len() - 1);
		}

		if pos.index > 0 {
			return Position::new(pos.node, pos.index - 1);
		}

		// Climb until we arrive from some key's right side
		let mut child = pos.node;
		while let Some(parent) = self.nodes[child].parent {
			let slot = self.nodes[parent].child_index(child);
			if slot > 0 {
				return Position::new(parent, slot - 1);
			}
			child = parent;
		}

		Position::before_begin(pos.node)
	}
}

// ---------------------------------------------------------------------------
// Cursor
// ---------------------------------------------------------------------------

/// A bidirectional cursor over the keys of a tree.
///
/// Two cursors are equal when they sit at the same [`Position`].
pub struct Cursor<'t, K> {
	tree: &'t TwoFourTree<K>,
	pos: Position,
}

impl<K> Clone for Cursor<'_, K> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<K> Copy for Cursor<'_, K> {}

impl<K> PartialEq for Cursor<'_, K> {
	fn eq(&self, other: &Self) -> bool {
		self.pos == other.pos
	}
}

impl<K> Eq for Cursor<'_, K> {}

impl<K: fmt::Debug> fmt::Debug for Cursor<'_, K> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Cursor").field("pos", &self.pos).field("key", &self.get()).finish()
	}
}

impl<'t, K> Cursor<'t, K> {
	pub(crate) fn new(tree: &'t TwoFourTree<K>, pos: Position) -> Cursor<'t, K> {
		Cursor {
			tree,
			pos,
		}
	}

	/// The position this cursor sits at.
	#[inline]
	pub fn position(&self) -> Position {
		self.pos
	}

	/// Returns the key under the cursor, or `None` on a sentinel.
	pub fn get(&self) -> Option<&'t K> {
		if self.pos.is_before_begin() {
			return None;
		}
		self.tree.nodes[self.pos.node].keys.get(self.pos.index)
	}

	/// Returns the key under the cursor.
	///
	/// Panics on a sentinel.
	#[track_caller]
	pub fn key(&self) -> &'t K {
		self.get().expect("dereferenced a sentinel cursor")
	}

	/// Returns `true` if the cursor is one past the largest key.
	pub fn is_end(&self) -> bool {
		self.pos == self.tree.end
	}

	/// Returns `true` if the cursor is one before the smallest key.
	pub fn is_before_begin(&self) -> bool {
		self.pos.is_before_begin()
	}

	/// Steps to the next key. Panics if the cursor is at end.
	pub fn move_next(&mut self) {
		self.pos = self.tree.successor(self.pos);
	}

	/// Steps to the previous key. Panics if the cursor is at before-begin.
	pub fn move_prev(&mut self) {
		self.pos = self.tree.predecessor(self.pos);
	}

	/// Steps forward `n` times.
	pub fn advance(&mut self, n: usize) {
		for _ in 0..n {
			self.move_next();
		}
	}

	/// Steps backward `n` times.
	pub fn retreat(&mut self, n: usize) {
		for _ in 0..n {
			self.move_prev();
		}
	}

	/// A copy of this cursor moved one step forward.
	pub fn next_cursor(&self) -> Cursor<'t, K> {
		let mut c = *self;
		c.move_next();
		c
	}

	/// A copy of this cursor moved one step backward.
	pub fn prev_cursor(&self) -> Cursor<'t, K> {
		let mut c = *self;
		c.move_prev();
		c
	}
}

/// A cursor walking the keys from largest to smallest.
///
/// Moving it forward moves the underlying [`Cursor`] backward. It starts at
/// [`rbegin`](TwoFourTree::rbegin), the largest key, and finishes at
/// [`rend`](TwoFourTree::rend), the before-begin sentinel.
pub struct RevCursor<'t, K> {
	inner: Cursor<'t, K>,
}

impl<K> Clone for RevCursor<'_, K> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<K> Copy for RevCursor<'_, K> {}

impl<K> PartialEq for RevCursor<'_, K> {
	fn eq(&self, other: &Self) -> bool {
		self.inner == other.inner
	}
}

impl<K> Eq for RevCursor<'_, K> {}

impl<K: fmt::Debug> fmt::Debug for RevCursor<'_, K> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("RevCursor").field(&self.inner).finish()
	}
}

impl<'t, K> RevCursor<'t, K> {
	pub(crate) fn new(inner: Cursor<'t, K>) -> RevCursor<'t, K> {
		RevCursor {
			inner,
		}
	}

	/// The forward cursor at the same position.
	pub fn base(&self) -> Cursor<'t, K> {
		self.inner
	}

	pub fn get(&self) -> Option<&'t K> {
		self.inner.get()
	}

	#[track_caller]
	pub fn key(&self) -> &'t K {
		self.inner.key()
	}

	/// Steps towards smaller keys.
	pub fn move_next(&mut self) {
		self.inner.move_prev();
	}

	/// Steps towards larger keys.
	pub fn move_prev(&mut self) {
		self.inner.move_next();
	}

	pub fn advance(&mut self, n: usize) {
		self.inner.retreat(n);
	}

	pub fn retreat(&mut self, n: usize) {
		self.inner.advance(n);
	}
}

// ---------------------------------------------------------------------------
// Borrowing Iterator
// ---------------------------------------------------------------------------

/// Iterator over the keys of a tree in ascending order.
///
/// Created by [`TwoFourTree::iter`]. It is double-ended: the back half walks
/// down from the end sentinel, and the two halves stop once they have
/// yielded `len()` keys between them.
pub struct Iter<'t, K> {
	tree: &'t TwoFourTree<K>,
	front: Position,
	back: Position,
	remaining: usize,
}

impl<K> Clone for Iter<'_, K> {
	fn clone(&self) -> Self {
		Iter {
			tree: self.tree,
			front: self.front,
			back: self.back,
			remaining: self.remaining,
		}
	}
}

impl<K: fmt::Debug> fmt::Debug for Iter<'_, K> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_list().entries(self.clone()).finish()
	}
}

impl<'t, K> Iter<'t, K> {
	pub(crate) fn new(tree: &'t TwoFourTree<K>) -> Iter<'t, K> {
		Iter {
			tree,
			front: tree.begin,
			back: tree.end,
			remaining: tree.len,
		}
	}
}

impl<'t, K> Iterator for Iter<'t, K> {
	type Item = &'t K;

	fn next(&mut self) -> Option<&'t K> {
		if self.remaining == 0 {
			return None;
		}
		let key = self.tree.key_at(self.front);
		self.remaining -= 1;
		if self.remaining > 0 {
			self.front = self.tree.successor(self.front);
		}
		Some(key)
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		(self.remaining, Some(self.remaining))
	}
}

impl<'t, K> DoubleEndedIterator for Iter<'t, K> {
	fn next_back(&mut self) -> Option<&'t K> {
		if self.remaining == 0 {
			return None;
		}
		self.back = self.tree.predecessor(self.back);
		self.remaining -= 1;
		Some(self.tree.key_at(self.back))
	}
}

impl<K> ExactSizeIterator for Iter<'_, K> {}

impl<K> FusedIterator for Iter<'_, K> {}

impl<'t, K> IntoIterator for &'t TwoFourTree<K> {
	type Item = &'t K;
	type IntoIter = Iter<'t, K>;

	fn into_iter(self) -> Iter<'t, K> {
		self.iter()
	}
}

// ---------------------------------------------------------------------------
// Owning Iterator
// ---------------------------------------------------------------------------

/// Owning iterator over the keys of a tree in ascending order.
pub struct IntoIter<K> {
	keys: std::vec::IntoIter<K>,
}

impl<K: fmt::Debug> fmt::Debug for IntoIter<K> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("IntoIter").field(&self.keys.as_slice()).finish()
	}
}

impl<K> Iterator for IntoIter<K> {
	type Item = K;

	fn next(&mut self) -> Option<K> {
		self.keys.next()
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		self.keys.size_hint()
	}
}

impl<K> DoubleEndedIterator for IntoIter<K> {
	fn next_back(&mut self) -> Option<K> {
		self.keys.next_back()
	}
}

impl<K> ExactSizeIterator for IntoIter<K> {}

impl<K> FusedIterator for IntoIter<K> {}

impl<K> IntoIterator for TwoFourTree<K> {
	type Item = K;
	type IntoIter = IntoIter<K>;

	fn into_iter(mut self) -> IntoIter<K> {
		let mut keys = Vec::with_capacity(self.len);
		let root = self.root;
		drain_in_order(&mut self, root, &mut keys);
		IntoIter {
			keys: keys.into_iter(),
		}
	}
}

/// Moves every key below `node` into `out`, freeing the nodes on the way.
fn drain_in_order<K>(tree: &mut TwoFourTree<K>, node: NodeId, out: &mut Vec<K>) {
	let node = tree.nodes.free(node);
	let mut keys = node.keys.into_iter();
	if node.children.is_empty() {
		out.extend(keys);
		return;
	}
	for child in node.children {
		drain_in_order(tree, child, out);
		out.extend(keys.next());
	}
}
