//! # Removal and Underflow Handling
//!
//! Keys are only ever extracted from leaves. To make that always safe, the
//! descent from the root fixes every single-key node it is about to step
//! into, so by the time the target leaf is reached it holds at least two keys
//! (or is the root) and can give one up without further repair.
//!
//! A single-key node is fixed with the first applicable transform:
//!
//! 1. **Transfer from left**: the left sibling spares its largest key, which
//!    moves up into the parent while the separator moves down (clockwise).
//! 2. **Transfer from right**: the mirror image (counterclockwise).
//! 3. **Fusion**: the node, a sibling and their separator merge into one
//!    three-key node. The parent gives up one key.
//! 4. **Shrink**: the parent is a single-key root, so its key and both of its
//!    children collapse into a new root one level lower.
//!
//! ```text
//!   fusion, removing from [20]             shrink, removing from [0]
//!
//!      [ 30   60 ]         [ 60 ]              [ 1 ]
//!     /    |     \   ->   /      \            /     \    ->   [ 0 1 2 ]
//!  [20]  [40]   [..]  [20 30 40] [..]       [0]    [2]
//! ```
//!
//! Fusion and shrink free a node. Every transform therefore returns the id of
//! the node now holding the keys of the node it was asked to fix, and callers
//! always continue from that id.
//!
//! A key found in an internal node is swapped with its in-order predecessor,
//! the largest key of the leaf reached by walking right from its left child,
//! and then extracted from that leaf.

use crate::node::{NodeId, MIN_KEYS};
use crate::{Position, TwoFourTree};
use std::borrow::Borrow;
use std::mem;

/// What a removing descent is looking for.
pub(crate) enum Target<'q, Q: ?Sized> {
	Key(&'q Q),
	First,
	Last,
}

impl<Q: ?Sized> Clone for Target<'_, Q> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<Q: ?Sized> Copy for Target<'_, Q> {}

impl<K: Ord> TwoFourTree<K> {
	/// Removes `key` from the tree, returning the number of keys removed.
	///
	/// # Example
	///
	/// ```
	/// use twofour::TwoFourTree;
	///
	/// let mut tree: TwoFourTree<i32> = (0..10).collect();
	/// assert_eq!(tree.erase(&3), 1);
	/// assert_eq!(tree.erase(&3), 0);
	/// assert!(!tree.contains(&3));
	/// ```
	pub fn erase<Q>(&mut self, key: &Q) -> usize
	where
		K: Borrow<Q>,
		Q: ?Sized + Ord,
	{
		usize::from(self.remove_value(Target::Key(key)).is_some())
	}

	/// Removes `key`, returning `true` if it was present.
	pub fn remove<Q>(&mut self, key: &Q) -> bool
	where
		K: Borrow<Q>,
		Q: ?Sized + Ord,
	{
		self.remove_value(Target::Key(key)).is_some()
	}

	/// Removes `key` and returns the stored key equal to it, if any.
	pub fn take<Q>(&mut self, key: &Q) -> Option<K>
	where
		K: Borrow<Q>,
		Q: ?Sized + Ord,
	{
		self.remove_value(Target::Key(key))
	}

	/// Removes and returns the smallest key.
	pub fn pop_first(&mut self) -> Option<K> {
		self.remove_value(Target::<K>::First)
	}

	/// Removes and returns the largest key.
	pub fn pop_last(&mut self) -> Option<K> {
		self.remove_value(Target::<K>::Last)
	}

	/// Removes the key at `position` and returns the position of the key that
	/// followed it, or [`end`](Self::end) if it was the largest.
	///
	/// `position` must point at a key; passing a sentinel panics. Every other
	/// position obtained before this call should be considered stale.
	///
	/// # Example
	///
	/// ```
	/// use twofour::TwoFourTree;
	///
	/// let mut tree: TwoFourTree<i32> = (0..8).collect();
	/// let pos = tree.find(&3).position();
	/// let next = tree.erase_at(pos);
	/// assert_eq!(tree.cursor_at(next).get(), Some(&4));
	/// ```
	pub fn erase_at(&mut self, position: Position) -> Position
	where
		K: Clone,
	{
		let key = self.key_at(position).clone();
		let next = self.successor(position);
		let next_key = if next == self.end {
			None
		} else {
			Some(self.key_at(next).clone())
		};

		let removed = self.remove_value(Target::Key(&key));
		debug_assert!(removed.is_some(), "position pointed at a key that could not be found");

		match next_key {
			Some(k) => self.find(&k).position(),
			None => self.end,
		}
	}

	/// Tree-level removal: locate, fix up, extract.
	pub(crate) fn remove_value<Q>(&mut self, target: Target<'_, Q>) -> Option<K>
	where
		K: Borrow<Q>,
		Q: ?Sized + Ord,
	{
		if self.len == 0 {
			return None;
		}

		// The descent may have restructured the tree even when the key is absent
		let Some((leaf, index)) = self.find_with_remove(target) else {
			self.refresh_bounds();
			return None;
		};
		let key = self.nodes[leaf].extract_value(index);

		self.len -= 1;
		self.refresh_bounds();
		Some(key)
	}

	/// Descends from the root towards `target`, resolving underflow before
	/// stepping into every non-root node.
	///
	/// # Returns
	///
	/// The leaf and index now holding the key to extract, or `None` if the key
	/// is absent. The tree may have been restructured in either case.
	pub(crate) fn find_with_remove<Q>(&mut self, target: Target<'_, Q>) -> Option<(NodeId, usize)>
	where
		K: Borrow<Q>,
		Q: ?Sized + Ord,
	{
		let mut node = self.root;

		loop {
			let n = &self.nodes[node];
			let found = match target {
				Target::Key(key) => n.search(key),
				Target::First if n.is_leaf() => Ok(0),
				Target::First => Err(0),
				Target::Last if n.is_leaf() => Ok(n.len() - 1),
				Target::Last => Err(n.len()),
			};

			match found {
				Ok(index) if n.is_leaf() => return Some((node, index)),
				Err(_) if n.is_leaf() => return None,
				Err(index) => {
					let child = n.children[index];
					node = self.resolve_underflow(child);
				}
				Ok(index) => {
					let left = n.children[index];
					let left = self.resolve_underflow(left);

					// The fix-up may have pulled the key down into `left`, or
					// freed `node` altogether if it was the root
					let index = match target {
						Target::Key(key) => match self.nodes.get(node).map(|n| n.search(key)) {
							Some(Ok(index)) => index,
							_ => {
								node = left;
								continue;
							}
						},
						Target::First | Target::Last => {
							unreachable!("extreme keys always live in leaves")
						}
					};

					let leaf = self.descend_rightmost(left);
					let last = self.nodes[leaf].len() - 1;
					let (holder, leaf_node) = self.nodes.pair_mut(node, leaf);
					mem::swap(&mut holder.keys[index], &mut leaf_node.keys[last]);
					return Some((leaf, last));
				}
			}
		}
	}

	/// Walks the rightmost path below `node` down to a leaf, resolving
	/// underflow on the way.
	fn descend_rightmost(&mut self, node: NodeId) -> NodeId {
		let mut node = node;
		while let Some(&last) = self.nodes[node].children.last() {
			node = self.resolve_underflow(last);
		}
		node
	}

	/// Ensures `node` holds more than [`MIN_KEYS`] keys.
	///
	/// `node` must not be the root. Returns the node now holding the keys
	/// that were in `node`.
	pub(crate) fn resolve_underflow(&mut self, node: NodeId) -> NodeId {
		if !self.nodes[node].is_minimal() {
			return node;
		}

		let parent = self.nodes[node].parent.expect("resolve_underflow called on the root");
		let (pos, left_spares, right_spares, parent_len) = {
			let p = &self.nodes[parent];
			let pos = p.child_index(node);
			let spares = |sibling: NodeId| self.nodes[sibling].len() > MIN_KEYS;
			let left = pos > 0 && spares(p.children[pos - 1]);
			let right = pos < p.len() && spares(p.children[pos + 1]);
			(pos, left, right, p.len())
		};

		if left_spares {
			self.transfer_from_left(parent, pos);
			node
		} else if right_spares {
			self.transfer_from_right(parent, pos);
			node
		} else if parent_len > MIN_KEYS {
			self.fusion(parent, pos)
		} else {
			self.shrink(parent)
		}
	}

	/// Clockwise rotation into `children[pos]` of `parent`.
	///
	/// The separator `keys[pos - 1]` moves down to the front of the node, the
	/// left sibling's largest key replaces it, and the sibling's last child (if
	/// any) becomes the node's first child.
	pub(crate) fn transfer_from_left(&mut self, parent: NodeId, pos: usize) {
		let node = self.nodes[parent].children[pos];
		let sibling = self.nodes[parent].children[pos - 1];

		let (lifted, moved_child) = {
			let s = &mut self.nodes[sibling];
			let k = s.keys.pop().expect("left sibling has spare keys");
			(k, s.children.pop())
		};

		let separator = mem::replace(&mut self.nodes[parent].keys[pos - 1], lifted);

		let n = &mut self.nodes[node];
		n.keys.insert(0, separator);
		if let Some(child) = moved_child {
			n.children.insert(0, child);
			self.nodes[child].parent = Some(node);
		}
	}

	/// Counterclockwise rotation into `children[pos]` of `parent`.
	pub(crate) fn transfer_from_right(&mut self, parent: NodeId, pos: usize) {
		let node = self.nodes[parent].children[pos];
		let sibling = self.nodes[parent].children[pos + 1];

		let (lifted, moved_child) = {
			let s = &mut self.nodes[sibling];
			let k = s.keys.remove(0);
			let c = if s.is_leaf() {
				None
			} else {
				Some(s.children.remove(0))
			};
			(k, c)
		};

		let separator = mem::replace(&mut self.nodes[parent].keys[pos], lifted);

		let n = &mut self.nodes[node];
		n.keys.push(separator);
		if let Some(child) = moved_child {
			n.children.push(child);
			self.nodes[child].parent = Some(node);
		}
	}

	/// Merges `children[pos]` of `parent` with a single-key sibling and their
	/// separator. The left sibling is preferred.
	///
	/// `parent` must hold more than one key. Returns the merged node.
	pub(crate) fn fusion(&mut self, parent: NodeId, pos: usize) -> NodeId {
		debug_assert!(self.nodes[parent].len() > MIN_KEYS);

		let left = if pos > 0 {
			pos - 1
		} else {
			pos
		};
		self.merge_children(parent, left)
	}

	/// Collapses a single-key root and its two children into one node that
	/// becomes the new root. Returns the new root.
	pub(crate) fn shrink(&mut self, root: NodeId) -> NodeId {
		debug_assert_eq!(root, self.root);
		debug_assert_eq!(self.nodes[root].len(), MIN_KEYS);

		let merged = self.merge_children(root, 0);
		let old = self.nodes.free(root);
		debug_assert!(old.keys.is_empty());
		debug_assert_eq!(&old.children[..], &[merged]);

		self.nodes[merged].parent = None;
		self.root = merged;
		self.height -= 1;
		merged
	}

	/// Folds `children[left + 1]` and `keys[left]` of `parent` into
	/// `children[left]`, freeing the right node.
	fn merge_children(&mut self, parent: NodeId, left: usize) -> NodeId {
		let (separator, right) = {
			let p = &mut self.nodes[parent];
			(p.keys.remove(left), p.children.remove(left + 1))
		};
		let merged = self.nodes[parent].children[left];

		let right = self.nodes.free(right);
		for &child in &right.children {
			self.nodes[child].parent = Some(merged);
		}

		let m = &mut self.nodes[merged];
		m.keys.push(separator);
		m.keys.extend(right.keys);
		m.children.extend(right.children);
		merged
	}
}
