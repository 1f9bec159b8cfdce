//! # Integration Tests for the 2-4 Tree
//!
//! End-to-end tests that drive the tree through its public API with
//! realistic workloads and compare it against `std::collections::BTreeSet`.

use rand::prelude::*;
use std::collections::BTreeSet;
use twofour::TwoFourTree;

// ===========================================================================
// Large Scale Operation Tests
// ===========================================================================

#[test]
fn large_scale_insert_and_lookup() {
	let mut tree = TwoFourTree::new();

	for i in 0..10_000 {
		assert!(tree.insert(i).1);
	}

	tree.assert_invariants();
	assert_eq!(tree.len(), 10_000);

	for i in 0..10_000 {
		assert_eq!(tree.get(&i), Some(&i), "Failed to find key {}", i);
	}
	assert!(!tree.contains(&10_000));
}

#[test]
fn stress_sequential_forward() {
	let mut tree = TwoFourTree::new();

	for i in 0..50_000 {
		assert!(tree.insert(i).1);
	}
	assert!(tree.validate());

	for i in 0..50_000 {
		assert_eq!(tree.erase(&i), 1, "Failed to erase key {}", i);
	}
	assert!(tree.validate());
	assert!(tree.is_empty());
}

#[test]
fn stress_sequential_reverse() {
	let mut tree = TwoFourTree::new();

	for i in (0..50_000).rev() {
		assert!(tree.insert(i).1);
	}
	assert!(tree.validate());

	for i in (0..50_000).rev() {
		assert_eq!(tree.erase(&i), 1, "Failed to erase key {}", i);
	}
	assert!(tree.validate());
	assert!(tree.is_empty());
}

#[test]
fn large_scale_random_operations() {
	let mut tree = TwoFourTree::new();
	let mut expected = BTreeSet::new();
	let mut rng = rand::rng();

	for _ in 0..10_000 {
		let key: i32 = rng.random_range(0..1000);
		match rng.random_range(0..3) {
			0 => assert_eq!(tree.insert(key).1, expected.insert(key)),
			1 => assert_eq!(tree.remove(&key), expected.remove(&key)),
			_ => assert_eq!(tree.contains(&key), expected.contains(&key)),
		}
	}

	tree.assert_invariants();
	assert_eq!(tree.len(), expected.len());
	assert!(tree.iter().eq(expected.iter()));
}

// ===========================================================================
// Sequential and Random Key Pattern Tests
// ===========================================================================

#[test]
fn random_keys() {
	let mut rng = StdRng::seed_from_u64(0x24);
	let mut keys: Vec<u64> = (0..5_000).collect();
	keys.shuffle(&mut rng);

	let tree: TwoFourTree<u64> = keys.iter().copied().collect();
	tree.assert_invariants();
	assert_eq!(tree.len(), 5_000);
	assert!(tree.iter().copied().eq(0..5_000));
}

#[test]
fn sparse_keys() {
	let keys: Vec<i64> = (0..1_000).map(|i| i * 1_000_003).collect();
	let tree: TwoFourTree<i64> = keys.iter().copied().collect();

	for pair in keys.windows(2) {
		let gap = pair[0] + 1;
		assert!(!tree.contains(&gap));
		assert_eq!(tree.lower_bound(&gap).get(), Some(&pair[1]));
	}
}

// ===========================================================================
// Full Tree Deletion Tests
// ===========================================================================

#[test]
fn delete_all_random() {
	let mut rng = StdRng::seed_from_u64(7);
	let mut keys: Vec<i32> = (0..3_000).collect();
	let mut tree: TwoFourTree<i32> = keys.iter().copied().collect();

	keys.shuffle(&mut rng);
	for (n, key) in keys.iter().enumerate() {
		assert!(tree.remove(key));
		if n % 100 == 0 {
			tree.assert_invariants();
		}
	}

	tree.assert_invariants();
	assert!(tree.is_empty());
	assert_eq!(tree.height(), 1);
	assert!(tree.begin() == tree.end());
}

#[test]
fn delete_every_other() {
	let mut tree: TwoFourTree<i32> = (0..2_000).collect();

	for i in (0..2_000).step_by(2) {
		assert_eq!(tree.erase(&i), 1);
	}

	tree.assert_invariants();
	assert_eq!(tree.len(), 1_000);
	assert!(tree.iter().copied().eq((1..2_000).step_by(2)));
}

#[test]
fn pop_drains_in_order() {
	let mut tree: TwoFourTree<i32> = (0..500).rev().collect();

	for expected in 0..250 {
		assert_eq!(tree.pop_first(), Some(expected));
	}
	for expected in (250..500).rev() {
		assert_eq!(tree.pop_last(), Some(expected));
	}
	assert_eq!(tree.pop_first(), None);
	assert_eq!(tree.pop_last(), None);
	tree.assert_invariants();
}

// ===========================================================================
// Cursor Scan Tests
// ===========================================================================

#[test]
fn full_forward_scan() {
	let tree: TwoFourTree<i32> = (0..1_000).collect();

	let mut cursor = tree.begin();
	let mut expected = 0;
	while cursor != tree.end() {
		assert_eq!(cursor.key(), &expected);
		expected += 1;
		cursor.move_next();
	}
	assert_eq!(expected, 1_000);
}

#[test]
fn full_reverse_scan() {
	let tree: TwoFourTree<i32> = (0..1_000).collect();

	let mut cursor = tree.rbegin();
	let mut expected = 999;
	while cursor != tree.rend() {
		assert_eq!(cursor.key(), &expected);
		expected -= 1;
		cursor.move_next();
	}
	assert_eq!(expected, -1);
}

#[test]
fn backwards_from_end() {
	let tree: TwoFourTree<i32> = (0..1_000).collect();

	let mut cursor = tree.end();
	for expected in (0..1_000).rev() {
		cursor.move_prev();
		assert_eq!(cursor.key(), &expected);
	}
	assert!(cursor == tree.begin());
}

#[test]
fn erase_while_scanning() {
	let mut tree: TwoFourTree<i32> = (0..1_000).collect();

	// drop multiples of three, continuing from the returned successor
	let mut pos = tree.begin().position();
	loop {
		let cursor = tree.cursor_at(pos);
		let Some(&key) = cursor.get() else {
			break;
		};
		pos = if key % 3 == 0 {
			tree.erase_at(pos)
		} else {
			cursor.next_cursor().position()
		};
	}

	tree.assert_invariants();
	assert!(tree.iter().copied().eq((0..1_000).filter(|k| k % 3 != 0)));
}

#[test]
fn range_between_bounds() {
	let tree: TwoFourTree<i32> = (0..100).map(|i| i * 10).collect();

	let mut cursor = tree.lower_bound(&250);
	let stop = tree.upper_bound(&500);
	let mut seen = Vec::new();
	while cursor != stop {
		seen.push(*cursor.key());
		cursor.move_next();
	}
	assert_eq!(seen, (25..=50).map(|i| i * 10).collect::<Vec<_>>());
}

// ===========================================================================
// Edge Case Tests
// ===========================================================================

#[test]
fn single_element_operations() {
	let mut tree = TwoFourTree::new();
	tree.insert(42);

	assert_eq!(tree.first(), Some(&42));
	assert_eq!(tree.last(), Some(&42));
	assert_eq!(tree.rbegin().get(), Some(&42));
	assert!(tree.begin().next_cursor() == tree.end());

	assert_eq!(tree.take(&42), Some(42));
	assert!(tree.is_empty());
	tree.assert_invariants();
}

#[test]
fn boundary_keys_i32() {
	let mut tree = TwoFourTree::new();
	for key in [i32::MIN, -1, 0, 1, i32::MAX] {
		tree.insert(key);
	}

	assert_eq!(tree.first(), Some(&i32::MIN));
	assert_eq!(tree.last(), Some(&i32::MAX));
	assert!(tree.upper_bound(&i32::MAX) == tree.end());
	assert_eq!(tree.lower_bound(&i32::MIN).get(), Some(&i32::MIN));
}

#[test]
fn string_keys_various_lengths() {
	let mut tree = TwoFourTree::new();
	let words = ["", "a", "ab", "abc", "b", "ba", "zzzzzzzzzzzzzzzzzzzzzzzz"];
	for w in words.iter().rev() {
		tree.insert(w.to_string());
	}

	assert!(tree.iter().map(String::as_str).eq(words.iter().copied()));
	assert!(tree.remove("ab"));
	assert!(!tree.contains("ab"));
	assert!(tree.contains(""));
	tree.assert_invariants();
}

#[test]
fn reverse_ordering_through_wrapper() {
	use std::cmp::Reverse;

	let tree: TwoFourTree<Reverse<i32>> = (0..10).map(Reverse).collect();
	assert_eq!(tree.first(), Some(&Reverse(9)));
	assert_eq!(tree.last(), Some(&Reverse(0)));
}

#[test]
fn clone_is_independent() {
	let original: TwoFourTree<i32> = (0..300).collect();
	let mut copy = original.clone();

	for i in 0..150 {
		copy.erase(&i);
	}

	original.assert_invariants();
	copy.assert_invariants();
	assert_eq!(original.len(), 300);
	assert_eq!(copy.len(), 150);
	assert_eq!(copy.first(), Some(&150));
}

#[test]
fn owned_and_borrowed_iteration() {
	let tree: TwoFourTree<String> = (0..50).map(|i| format!("{i:03}")).collect();

	let mut count = 0;
	for key in &tree {
		assert_eq!(key.len(), 3);
		count += 1;
	}
	assert_eq!(count, 50);

	let owned: Vec<String> = tree.into_iter().rev().take(2).collect();
	assert_eq!(owned, vec!["049".to_string(), "048".to_string()]);
}

// ===========================================================================
// Tree Height Tests
// ===========================================================================

#[test]
fn height_grows_logarithmically() {
	let mut tree = TwoFourTree::new();
	assert_eq!(tree.height(), 1);

	tree.extend(0..3);
	assert_eq!(tree.height(), 1);

	tree.insert(3);
	assert_eq!(tree.height(), 2);

	tree.extend(4..100_000);
	tree.assert_invariants();
	// every node holds at least one key, so height <= log2(n + 1)
	assert!(tree.height() <= 17, "height {}", tree.height());
	// and at most three, so height >= log4(n + 1)
	assert!(tree.height() >= 9, "height {}", tree.height());
}
