//! # Insertion and Overflow Handling
//!
//! New keys always go into a leaf. When the leaf already holds [`MAX_KEYS`]
//! keys it overflows: it is split in two and the middle key is promoted to the
//! parent, which may overflow in turn.
//!
//! ```text
//!   insert 14 into a full leaf          after the split
//!
//!        [ 30 ]                            [ 15   30 ]
//!       /      \                          /    |     \
//!  [13 15 17]  [..]                [13 14]   [17]    [..]
//! ```
//!
//! A promotion that reaches a full root synthesizes a new root above it, which
//! is the only way the tree grows taller.

use crate::node::{Node, NodeId, MAX_KEYS};
use crate::{Position, TwoFourTree};

impl<K: Ord> TwoFourTree<K> {
	/// Adds a key to the tree.
	///
	/// # Returns
	///
	/// The position of the key and whether it was inserted. If an equal key is
	/// already present the tree is left untouched and `(position_of_existing,
	/// false)` is returned.
	///
	/// # Example
	///
	/// ```
	/// use twofour::TwoFourTree;
	///
	/// let mut tree = TwoFourTree::new();
	/// let (pos, inserted) = tree.insert(7);
	/// assert!(inserted);
	/// assert_eq!(tree.cursor_at(pos).get(), Some(&7));
	///
	/// let (_, inserted) = tree.insert(7);
	/// assert!(!inserted);
	/// assert_eq!(tree.len(), 1);
	/// ```
	pub fn insert(&mut self, key: K) -> (Position, bool) {
		let (leaf, found) = self.find_key(&key);
		if let Ok(index) = found {
			return (Position::new(leaf, index), false);
		}

		let position = if self.nodes[leaf].is_full() {
			self.add_value_overflow(leaf, key)
		} else {
			let index = self.nodes[leaf].add_value(key);
			Position::new(leaf, index)
		};

		self.len += 1;
		self.refresh_bounds();
		(position, true)
	}

	/// Inserts into a full leaf by splitting it.
	///
	/// The largest key moves into a new right sibling, the middle key is
	/// promoted, and the incoming key joins whichever half it belongs to. The
	/// leaf keeps its id, so the returned position stays valid while the
	/// promotion is absorbed further up.
	pub(crate) fn add_value_overflow(&mut self, leaf: NodeId, key: K) -> Position {
		debug_assert!(self.nodes[leaf].is_leaf());
		debug_assert!(self.nodes[leaf].is_full());

		let parent = self.ensure_parent(leaf);

		let (middle, upper) = {
			let node = &mut self.nodes[leaf];
			let upper = node.keys.pop().expect("full leaf has a last key");
			let middle = node.keys.pop().expect("full leaf has a middle key");
			(middle, upper)
		};

		let mut sibling = Node::new(Some(parent));
		sibling.keys.push(upper);
		let sibling = self.nodes.alloc(sibling);

		let position = if key < middle {
			let index = self.nodes[leaf].add_value(key);
			Position::new(leaf, index)
		} else {
			let index = self.nodes[sibling].add_value(key);
			Position::new(sibling, index)
		};

		self.overflow_recursive(parent, middle, sibling);
		position
	}

	/// Absorbs a promoted key and its new right-hand child into `node`.
	///
	/// When `node` is full it is split the same way a leaf is: its largest key
	/// and the two rightmost children move into a new sibling, its middle key
	/// is promoted, and the incoming separator lands in whichever half covers
	/// its gap. The loop then continues one level up with the promoted key.
	///
	/// The four gaps an incoming separator can fall into:
	///
	/// ```text
	///        k0      k1      k2
	///   gap0    gap1    gap2    gap3
	///
	///   gap0, gap1 -> lower half [k0] keeps c0 c1 and receives the separator
	///   gap2, gap3 -> upper half [k2] takes c2 c3 and receives the separator
	/// ```
	pub(crate) fn overflow_recursive(&mut self, node: NodeId, key: K, child: NodeId) {
		let mut node = node;
		let mut key = key;
		let mut child = child;

		loop {
			if !self.nodes[node].is_full() {
				self.nodes[node].insert_separator(key, child);
				self.nodes[child].parent = Some(node);
				return;
			}

			debug_assert_eq!(self.nodes[node].len(), MAX_KEYS);
			debug_assert_eq!(self.nodes[node].children.len(), MAX_KEYS + 1);

			let parent = self.ensure_parent(node);

			// Detach k1, k2 and the children to the right of k1
			let (middle, upper_key, upper_children) = {
				let n = &mut self.nodes[node];
				let upper_key = n.keys.pop().expect("full node has k2");
				let middle = n.keys.pop().expect("full node has k1");
				let c3 = n.children.pop().expect("full node has c3");
				let c2 = n.children.pop().expect("full node has c2");
				(middle, upper_key, [c2, c3])
			};

			let mut upper = Node::new(Some(parent));
			upper.keys.push(upper_key);
			upper.children.extend(upper_children);
			let upper = self.nodes.alloc(upper);
			for moved in upper_children {
				self.nodes[moved].parent = Some(upper);
			}

			let target = if key < middle {
				node
			} else {
				upper
			};
			self.nodes[target].insert_separator(key, child);
			self.nodes[child].parent = Some(target);

			node = parent;
			key = middle;
			child = upper;
		}
	}

	/// Returns the parent of `node`, first growing a new empty root above it
	/// when `node` is the root.
	fn ensure_parent(&mut self, node: NodeId) -> NodeId {
		if let Some(parent) = self.nodes[node].parent {
			return parent;
		}

		debug_assert_eq!(node, self.root);
		let mut root = Node::new(None);
		root.children.push(node);
		let root = self.nodes.alloc(root);

		self.nodes[node].parent = Some(root);
		self.root = root;
		self.height += 1;
		root
	}
}

#[cfg(test)]
mod tests {
	use crate::TwoFourTree;

	fn root_keys(tree: &TwoFourTree<i32>) -> Vec<i32> {
		tree.nodes[tree.root].keys.to_vec()
	}

	fn child_keys(tree: &TwoFourTree<i32>) -> Vec<Vec<i32>> {
		tree.nodes[tree.root].children.iter().map(|&c| tree.nodes[c].keys.to_vec()).collect()
	}

	#[test]
	fn first_split_promotes_middle() {
		let mut tree = TwoFourTree::new();
		for k in [20, 52, 76, 33] {
			assert!(tree.insert(k).1);
		}

		tree.assert_invariants();
		assert_eq!(tree.height(), 2);
		assert_eq!(root_keys(&tree), vec![52]);
		assert_eq!(child_keys(&tree), vec![vec![20, 33], vec![76]]);
	}

	#[test]
	fn leaf_split_goes_right_of_middle() {
		let mut tree = TwoFourTree::new();
		for k in [1, 2, 3, 4] {
			tree.insert(k);
		}

		assert_eq!(root_keys(&tree), vec![2]);
		assert_eq!(child_keys(&tree), vec![vec![1], vec![3, 4]]);
	}

	#[test]
	fn single_overflow_shape() {
		let mut tree = TwoFourTree::new();
		for k in [13, 30, 40, 47, 35, 33, 15, 17, 37, 43, 45] {
			assert!(tree.insert(k).1);
		}

		tree.assert_invariants();
		assert_eq!(root_keys(&tree), vec![30, 40]);
		assert_eq!(child_keys(&tree), vec![vec![13, 15, 17], vec![33, 35, 37], vec![43, 45, 47]]);

		let (pos, inserted) = tree.insert(14);
		assert!(inserted);
		assert_eq!(tree.cursor_at(pos).get(), Some(&14));
		tree.assert_invariants();
		assert_eq!(root_keys(&tree), vec![15, 30, 40]);
	}

	#[test]
	fn cascaded_overflow_grows_root() {
		let mut tree = TwoFourTree::new();
		for k in [13, 30, 40, 47, 35, 33, 15, 17, 37, 50, 55, 43, 45, 53, 57] {
			assert!(tree.insert(k).1);
		}

		tree.assert_invariants();
		assert_eq!(tree.height(), 2);
		assert_eq!(root_keys(&tree), vec![30, 40, 50]);

		for (query, gap) in [(14, 0), (34, 1), (44, 2), (54, 3)] {
			let mut tree = tree.clone();
			let (pos, inserted) = tree.insert(query);
			assert!(inserted, "gap {gap}");
			assert_eq!(tree.cursor_at(pos).get(), Some(&query), "gap {gap}");
			assert_eq!(tree.height(), 3, "gap {gap}");
			assert_eq!(root_keys(&tree), vec![40], "gap {gap}");
			tree.assert_invariants();
			assert!(!tree.insert(query).1, "gap {gap}");
		}
	}
}
