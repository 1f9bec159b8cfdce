//! Test utilities for building trees of an exact shape from JSON fixtures
//!
//! A fixture describes the root node; each node lists its keys and, for an
//! internal node, its children:
//!
//! ```json
//! {
//!   "keys": [30, 40],
//!   "children": [
//!     { "keys": [13, 15, 17] },
//!     { "keys": [33, 35, 37] },
//!     { "keys": [43, 45, 47] }
//!   ]
//! }
//! ```
//!
//! The loaded tree is passed through [`TwoFourTree::check`], so a fixture that
//! violates an invariant is rejected instead of producing a corrupt tree.

use crate::arena::Arena;
use crate::error::Result;
use crate::node::{Node, NodeId};
use crate::TwoFourTree;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::Path;

#[derive(Deserialize, Debug)]
struct FixtureNode<K> {
	keys: Vec<K>,
	#[serde(default = "Vec::new")]
	children: Vec<FixtureNode<K>>,
}

fn translate_node<K>(
	arena: &mut Arena<K>,
	fixture: FixtureNode<K>,
	parent: Option<NodeId>,
	len: &mut usize,
) -> NodeId {
	*len += fixture.keys.len();
	let mut node = Node::new(parent);
	node.keys.extend(fixture.keys);
	let id = arena.alloc(node);

	for child in fixture.children {
		let child = translate_node(arena, child, Some(id), len);
		arena[id].children.push(child);
	}
	id
}

fn assemble<K: Ord>(root: FixtureNode<K>) -> Result<TwoFourTree<K>> {
	let mut nodes = Arena::new();
	let mut len = 0;
	let root = translate_node(&mut nodes, root, None, &mut len);

	let mut tree = TwoFourTree {
		nodes,
		root,
		len,
		height: 1,
		begin: crate::Position::new(root, 0),
		end: crate::Position::new(root, 0),
	};

	let mut node = root;
	while let Some(&first) = tree.nodes[node].children.first() {
		tree.height += 1;
		node = first;
	}
	tree.refresh_bounds();

	tree.check()?;
	Ok(tree)
}

/// Builds a tree from a JSON fixture string.
pub fn tree_from_json<K: DeserializeOwned + Ord>(json: &str) -> Result<TwoFourTree<K>> {
	assemble(serde_json::from_str(json)?)
}

/// Loads an integer tree from a JSON fixture file.
pub fn sample_tree<P: AsRef<Path>>(path: P) -> Result<TwoFourTree<i64>> {
	let file = std::fs::File::open(path)?;
	let root: FixtureNode<i64> = serde_json::from_reader(std::io::BufReader::new(file))?;
	assemble(root)
}
