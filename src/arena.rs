//! Slot storage for tree nodes.
//!
//! Nodes live in a single `Vec` and refer to each other by [`NodeId`]. Freed
//! slots go on a free list and are reused by the next allocation, so a tree
//! that shrinks and grows again does not keep growing its storage.

use crate::node::{Node, NodeId};
use std::ops::{Index, IndexMut};

#[derive(Clone)]
pub(crate) struct Arena<K> {
	slots: Vec<Option<Node<K>>>,
	free: Vec<NodeId>,
	live: usize,
}

impl<K> Arena<K> {
	pub(crate) fn new() -> Arena<K> {
		Arena {
			slots: Vec::new(),
			free: Vec::new(),
			live: 0,
		}
	}

	/// Stores `node` and returns its handle.
	pub(crate) fn alloc(&mut self, node: Node<K>) -> NodeId {
		self.live += 1;
		match self.free.pop() {
			Some(id) => {
				debug_assert!(self.slots[id.index()].is_none());
				self.slots[id.index()] = Some(node);
				id
			}
			None => {
				let id = NodeId(
					u32::try_from(self.slots.len()).expect("node arena exhausted the u32 id space"),
				);
				self.slots.push(Some(node));
				id
			}
		}
	}

	/// Removes the node from the arena and hands it back to the caller.
	///
	/// Any [`NodeId`] still pointing at the slot is stale from here on.
	pub(crate) fn free(&mut self, id: NodeId) -> Node<K> {
		let node = self.slots[id.index()].take().unwrap_or_else(|| panic!("double free of {id:?}"));
		self.free.push(id);
		self.live -= 1;
		node
	}

	pub(crate) fn get(&self, id: NodeId) -> Option<&Node<K>> {
		self.slots.get(id.index()).and_then(Option::as_ref)
	}

	/// Borrows two distinct nodes mutably at once.
	pub(crate) fn pair_mut(&mut self, a: NodeId, b: NodeId) -> (&mut Node<K>, &mut Node<K>) {
		assert_ne!(a, b, "pair_mut called with the same node twice");
		let (lo, hi, swapped) = if a < b {
			(a, b, false)
		} else {
			(b, a, true)
		};
		let (left, right) = self.slots.split_at_mut(hi.index());
		let lo_node = left[lo.index()].as_mut().unwrap_or_else(|| panic!("stale node id {lo:?}"));
		let hi_node = right[0].as_mut().unwrap_or_else(|| panic!("stale node id {hi:?}"));
		if swapped {
			(hi_node, lo_node)
		} else {
			(lo_node, hi_node)
		}
	}

	/// Number of nodes currently allocated.
	pub(crate) fn live(&self) -> usize {
		self.live
	}
}

impl<K> Index<NodeId> for Arena<K> {
	type Output = Node<K>;

	#[inline]
	fn index(&self, id: NodeId) -> &Node<K> {
		self.slots[id.index()].as_ref().unwrap_or_else(|| panic!("stale node id {id:?}"))
	}
}

impl<K> IndexMut<NodeId> for Arena<K> {
	#[inline]
	fn index_mut(&mut self, id: NodeId) -> &mut Node<K> {
		self.slots[id.index()].as_mut().unwrap_or_else(|| panic!("stale node id {id:?}"))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn freed_slots_are_reused() {
		let mut arena: Arena<i32> = Arena::new();
		let a = arena.alloc(Node::new(None));
		let b = arena.alloc(Node::new(Some(a)));
		assert_eq!(arena.live(), 2);

		arena.free(a);
		assert!(arena.get(a).is_none());
		assert_eq!(arena.live(), 1);

		let c = arena.alloc(Node::new(None));
		assert_eq!(c, a);
		assert_eq!(arena[b].parent, Some(a));
		assert_eq!(arena.live(), 2);
	}

	#[test]
	fn pair_mut_keeps_argument_order() {
		let mut arena: Arena<i32> = Arena::new();
		let a = arena.alloc(Node::new(None));
		let b = arena.alloc(Node::new(None));

		let (nb, na) = arena.pair_mut(b, a);
		nb.keys.push(2);
		na.keys.push(1);

		assert_eq!(&arena[a].keys[..], &[1]);
		assert_eq!(&arena[b].keys[..], &[2]);
	}

	#[test]
	#[should_panic(expected = "stale node id")]
	fn stale_id_panics() {
		let mut arena: Arena<i32> = Arena::new();
		let a = arena.alloc(Node::new(None));
		arena.free(a);
		let _ = &arena[a];
	}
}
