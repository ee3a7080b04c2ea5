use std::ops::Range;

use proptest::prelude::*;

use crate::model;

use super::*;

fn insert_find_all(keys: &[u32]) {
    let mut tree: AvlTree<u32> = AvlTree::new();

    for &key in keys {
        tree.insert(key);
        tree.assert_invariants();
    }

    for key in keys {
        let node = tree.find(key).expect("item not found");
        assert_eq!(node.value(), key);
    }
}

#[test]
fn zero_elems_find() {
    insert_find_all(&[]);
}

#[test]
fn single_elem_find() {
    insert_find_all(&[0]);
}

#[test]
fn two_elems_find() {
    insert_find_all(&[0, 1]);
    insert_find_all(&[1, 0]);
}

#[test]
fn three_elems_find() {
    insert_find_all(&[0, 1, 2]);
    insert_find_all(&[0, 2, 1]);
    insert_find_all(&[1, 0, 2]);
    insert_find_all(&[1, 2, 0]);
    insert_find_all(&[2, 0, 1]);
    insert_find_all(&[2, 1, 0]);
}

#[test]
fn four_elems_find() {
    insert_find_all(&[0, 1, 2, 3]);
    insert_find_all(&[0, 1, 3, 2]);
    insert_find_all(&[0, 2, 1, 3]);
    insert_find_all(&[0, 2, 3, 1]);
    insert_find_all(&[0, 3, 1, 2]);
    insert_find_all(&[0, 3, 2, 1]);

    insert_find_all(&[1, 0, 2, 3]);
    insert_find_all(&[1, 0, 3, 2]);
    insert_find_all(&[1, 2, 0, 3]);
    insert_find_all(&[1, 2, 3, 0]);
    insert_find_all(&[1, 3, 0, 2]);
    insert_find_all(&[1, 3, 2, 0]);

    insert_find_all(&[2, 0, 1, 3]);
    insert_find_all(&[2, 0, 3, 1]);
    insert_find_all(&[2, 1, 0, 3]);
    insert_find_all(&[2, 1, 3, 0]);
    insert_find_all(&[2, 3, 0, 1]);
    insert_find_all(&[2, 3, 1, 0]);

    insert_find_all(&[3, 0, 1, 2]);
    insert_find_all(&[3, 0, 2, 1]);
    insert_find_all(&[3, 1, 0, 2]);
    insert_find_all(&[3, 1, 2, 0]);
    insert_find_all(&[3, 2, 0, 1]);
    insert_find_all(&[3, 2, 1, 0]);
}

fn insert_remove_all(keys: &[u32]) {
    let mut tree: AvlTree<u32> = AvlTree::new();

    for &key in keys {
        tree.insert(key);
        tree.assert_invariants();
    }

    for key in keys {
        assert!(tree.remove(key));
        tree.assert_invariants();
    }

    assert!(tree.is_empty());

    for &key in keys {
        tree.insert(key);
        tree.assert_invariants();
    }

    for key in keys.iter().rev() {
        assert!(tree.remove(key));
        tree.assert_invariants();
    }

    assert!(tree.is_empty());
}

#[test]
fn remove_one() {
    insert_remove_all(&[0]);
}

#[test]
fn remove_two() {
    insert_remove_all(&[0, 1]);
    insert_remove_all(&[1, 0]);
}

#[test]
fn remove_three() {
    insert_remove_all(&[0, 1, 2]);
    insert_remove_all(&[0, 2, 1]);
    insert_remove_all(&[1, 0, 2]);
    insert_remove_all(&[1, 2, 0]);
    insert_remove_all(&[2, 0, 1]);
    insert_remove_all(&[2, 1, 0]);
}

#[test]
fn remove_four() {
    insert_remove_all(&[0, 1, 2, 3]);
    insert_remove_all(&[0, 1, 3, 2]);
    insert_remove_all(&[0, 2, 1, 3]);
    insert_remove_all(&[0, 2, 3, 1]);
    insert_remove_all(&[0, 3, 1, 2]);
    insert_remove_all(&[0, 3, 2, 1]);

    insert_remove_all(&[1, 0, 2, 3]);
    insert_remove_all(&[1, 0, 3, 2]);
    insert_remove_all(&[1, 2, 0, 3]);
    insert_remove_all(&[1, 2, 3, 0]);
    insert_remove_all(&[1, 3, 0, 2]);
    insert_remove_all(&[1, 3, 2, 0]);

    insert_remove_all(&[2, 0, 1, 3]);
    insert_remove_all(&[2, 0, 3, 1]);
    insert_remove_all(&[2, 1, 0, 3]);
    insert_remove_all(&[2, 1, 3, 0]);
    insert_remove_all(&[2, 3, 0, 1]);
    insert_remove_all(&[2, 3, 1, 0]);

    insert_remove_all(&[3, 0, 1, 2]);
    insert_remove_all(&[3, 0, 2, 1]);
    insert_remove_all(&[3, 1, 0, 2]);
    insert_remove_all(&[3, 1, 2, 0]);
    insert_remove_all(&[3, 2, 0, 1]);
    insert_remove_all(&[3, 2, 1, 0]);
}

#[test]
fn ascending_and_descending_inserts_stay_balanced() {
    let mut tree: AvlTree<u32> = AvlTree::new();

    for key in 0..64 {
        tree.insert(key);
        tree.assert_invariants();
    }

    let mut tree: AvlTree<u32> = AvlTree::new();

    for key in (0..64).rev() {
        tree.insert(key);
        tree.assert_invariants();
    }
}

#[test]
fn int_tree_reparents_after_removal() {
    let mut tree: AvlTree<i32> = AvlTree::new();

    for value in [5, 3, 7, 2, 10, 30, 70, 20] {
        tree.insert(value);
        tree.assert_invariants();
    }

    assert!(tree.remove(&7));
    tree.assert_invariants();

    let seventy = tree.find(&70).expect("70 must still be present");
    assert_eq!(seventy.parent().map(|p| *p.value()), Some(30));
}

#[test]
fn char_tree_reparents_after_removal() {
    let mut tree: AvlTree<char> = AvlTree::new();

    for value in ['a', 'g', 'p', 'b', 'q', 'A', 'M', '6'] {
        tree.insert(value);
        tree.assert_invariants();
    }

    assert!(tree.remove(&'p'));
    tree.assert_invariants();

    let q = tree.find(&'q').expect("'q' must still be present");
    assert_eq!(q.parent().map(|p| *p.value()), Some('g'));
}

#[test]
fn string_tree_reparents_after_removal() {
    let mut tree: AvlTree<String> = AvlTree::new();

    for value in ["abc", "Def", "ijn", "ija", "ABC", "xYz", "1247", "kghgkg"] {
        tree.insert(value.to_owned());
        tree.assert_invariants();
    }

    assert!(tree.remove("abc"));
    tree.assert_invariants();

    let node = tree.find("kghgkg").expect("\"kghgkg\" must still be present");
    assert_eq!(node.parent().map(|p| p.value().as_str()), Some("xYz"));
}

#[test]
fn contains_after_removal() {
    let mut tree: AvlTree<i32> = AvlTree::new();

    for value in [5, 3, 7, 2, 10, 30, 70, 20] {
        tree.insert(value);
    }

    assert!(tree.remove(&7));

    assert!(!tree.contains(&7));
    assert!(tree.contains(&70));
    assert_eq!(tree.len(), 7);
}

#[test]
fn traversal_orders() {
    let mut tree: AvlTree<u32> = AvlTree::new();

    for value in [5, 3, 7, 2, 10, 30, 70, 20] {
        tree.insert(value);
    }

    let in_order: Vec<u32> = tree.in_order().copied().collect();
    let pre_order: Vec<u32> = tree.pre_order().copied().collect();
    let post_order: Vec<u32> = tree.post_order().copied().collect();

    assert_eq!(in_order, [2, 3, 5, 7, 10, 20, 30, 70]);
    assert_eq!(pre_order, [5, 3, 2, 10, 7, 30, 20, 70]);
    assert_eq!(post_order, [2, 3, 7, 20, 70, 30, 10, 5]);
}

#[test]
fn default_traversal_order_is_configurable() {
    let mut tree: AvlTree<u32> = AvlTree::new();

    for value in [2, 1, 3] {
        tree.insert(value);
    }

    assert_eq!(tree.traversal_order(), TraversalOrder::InOrder);
    assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [1, 2, 3]);

    tree.set_traversal_order(TraversalOrder::PreOrder);
    assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [2, 1, 3]);
    assert_eq!((&tree).into_iter().copied().collect::<Vec<_>>(), [2, 1, 3]);

    tree.set_traversal_order(TraversalOrder::PostOrder);
    assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [1, 3, 2]);
}

#[test]
fn iteration_restarts_from_scratch() {
    let mut tree: AvlTree<u32> = AvlTree::new();

    for value in [2, 1, 3] {
        tree.insert(value);
    }

    let first: Vec<u32> = tree.iter().copied().collect();
    let second: Vec<u32> = tree.iter().copied().collect();

    assert_eq!(first, [1, 2, 3]);
    assert_eq!(first, second);
}

#[test]
fn empty_tree_iterates_nothing() {
    let tree: AvlTree<u32> = AvlTree::new();

    assert_eq!(tree.in_order().next(), None);
    assert_eq!(tree.pre_order().next(), None);
    assert_eq!(tree.post_order().next(), None);
    assert_eq!(tree.iter().len(), 0);
}

#[test]
fn height_of_empty_and_single() {
    let mut tree: AvlTree<u32> = AvlTree::new();

    assert_eq!(tree.height(), 0);

    tree.insert(42);
    assert_eq!(tree.height(), 1);
}

#[test]
fn height_and_depth_by_value() {
    let mut tree: AvlTree<u32> = AvlTree::new();

    for value in [5, 3, 7, 2, 10, 30, 70, 20] {
        tree.insert(value);
    }

    // Shape: 5 -> (3 -> (2, _), 10 -> (7, 30 -> (20, 70)))
    assert_eq!(tree.height(), 4);
    assert_eq!(tree.height_of(&10), 3);
    assert_eq!(tree.height_of(&2), 1);
    assert_eq!(tree.depth_of(&5), 0);
    assert_eq!(tree.depth_of(&10), 1);
    assert_eq!(tree.depth_of(&20), 3);

    assert_eq!(tree.height_of(&999), 0);
    assert_eq!(tree.depth_of(&999), 0);
}

#[test]
fn base_tree_does_not_rebalance() {
    let mut tree: BinaryTree<u32> = BinaryTree::new();

    for value in [1, 2, 3, 4] {
        tree.insert(value);
        tree.assert_invariants();
    }

    assert_eq!(tree.height(), 4);
    assert_eq!(tree.root().unwrap().value(), &1);
    assert_eq!(tree.pre_order().copied().collect::<Vec<_>>(), [1, 2, 3, 4]);
}

#[test]
fn base_tree_routes_duplicates_left() {
    let mut tree: BinaryTree<u32> = BinaryTree::new();

    tree.insert(5);
    tree.insert(5);

    let root = tree.root().unwrap();
    assert!(root.left().is_some());
    assert!(root.right().is_none());
    assert_eq!(root.left().unwrap().value(), &5);
}

#[test]
fn two_child_removal_transfers_predecessor_value() {
    let mut tree: BinaryTree<u32> = BinaryTree::new();

    let root_id = tree.insert(10);
    tree.insert(5);
    tree.insert(15);
    tree.insert(7);

    // The in-order predecessor's slot is the one that leaves the tree; the
    // removed node keeps its slot and takes over the predecessor's value.
    assert!(tree.remove_at(root_id));
    tree.assert_invariants();

    assert_eq!(tree.len(), 3);
    assert_eq!(tree.root().unwrap().value(), &7);
    assert_eq!(tree.get(root_id).unwrap().value(), &7);
    assert_eq!(tree.in_order().copied().collect::<Vec<_>>(), [5, 7, 15]);
}

#[test]
fn foreign_and_stale_handles_fail() {
    let mut a: AvlTree<u32> = AvlTree::new();
    let mut b: AvlTree<u32> = AvlTree::new();

    let id = a.insert(1);
    b.insert(1);

    // A handle from one tree never removes from another, even for an equal
    // value.
    assert!(!b.remove_at(id));
    assert_eq!(b.len(), 1);
    assert!(b.get(id).is_none());

    assert!(a.remove_at(id));
    assert!(a.is_empty());

    // The slot died with its generation.
    assert!(!a.remove_at(id));
    assert!(a.get(id).is_none());
}

#[test]
fn remove_absent_is_a_noop() {
    let mut tree: AvlTree<u32> = AvlTree::new();

    for value in [5, 3, 7] {
        tree.insert(value);
    }

    let before: Vec<u32> = tree.pre_order().copied().collect();

    assert!(!tree.remove(&999));

    assert_eq!(tree.len(), 3);
    assert_eq!(tree.pre_order().copied().collect::<Vec<_>>(), before);
}

#[test]
fn duplicates_are_kept_and_removed_one_at_a_time() {
    let mut tree: AvlTree<u32> = AvlTree::new();

    for value in [5, 5, 5, 3, 7] {
        tree.insert(value);
        tree.assert_invariants();
    }

    assert_eq!(tree.len(), 5);
    assert_eq!(tree.in_order().copied().collect::<Vec<_>>(), [3, 5, 5, 5, 7]);

    assert!(tree.remove(&5));
    assert_eq!(tree.len(), 4);
    assert!(tree.contains(&5));

    assert!(tree.remove(&5));
    assert!(tree.remove(&5));
    assert!(!tree.contains(&5));
    assert!(!tree.remove(&5));

    tree.assert_invariants();
}

#[test]
fn clear_empties_and_allows_reuse() {
    let mut tree: AvlTree<u32> = AvlTree::new();

    for value in [5, 3, 7, 2, 10] {
        tree.insert(value);
    }

    tree.clear();

    assert!(tree.is_empty());
    assert_eq!(tree.len(), 0);
    assert_eq!(tree.in_order().next(), None);

    tree.insert(1);
    tree.insert(2);
    tree.assert_invariants();
    assert_eq!(tree.in_order().copied().collect::<Vec<_>>(), [1, 2]);
}

#[test]
fn copy_to_respects_start_and_bounds() {
    let mut tree: AvlTree<u32> = AvlTree::new();

    for value in [2, 1, 3] {
        tree.insert(value);
    }

    let mut buffer = [0u32; 5];
    assert_eq!(tree.copy_to(&mut buffer, 1), 3);
    assert_eq!(buffer, [0, 1, 2, 3, 0]);

    let mut short = [0u32; 2];
    assert_eq!(tree.copy_to(&mut short, 0), 2);
    assert_eq!(short, [1, 2]);

    let mut buffer = [0u32; 3];
    assert_eq!(tree.copy_to(&mut buffer, 10), 0);
    assert_eq!(buffer, [0, 0, 0]);
}

#[test]
fn node_predicates() {
    let mut tree: AvlTree<u32> = AvlTree::new();

    for value in [5, 3, 7, 2, 10, 30, 70, 20] {
        tree.insert(value);
    }

    let root = tree.root().unwrap();
    assert!(!root.is_left_child());
    assert!(!root.is_right_child());
    assert!(root.parent().is_none());

    let three = tree.find(&3).unwrap();
    assert!(three.is_left_child());
    assert!(three.is_internal());
    assert_eq!(three.child_count(), 1);

    let two = tree.find(&2).unwrap();
    assert!(two.is_leaf());
    assert_eq!(two.child_count(), 0);

    let ten = tree.find(&10).unwrap();
    assert!(ten.is_right_child());
    assert_eq!(ten.child_count(), 2);
}

#[test]
fn dotgraph_output() {
    let empty: AvlTree<u32> = AvlTree::new();
    let mut out = String::new();
    empty.dotgraph("empty", &mut out).unwrap();
    assert_eq!(out, "digraph \"graph-empty\" {}");

    let mut tree: AvlTree<u32> = AvlTree::new();
    for value in [2, 1, 3] {
        tree.insert(value);
    }

    let mut out = String::new();
    tree.dotgraph("t", &mut out).unwrap();

    assert!(out.starts_with("digraph \"graph-t\""));
    assert!(out.contains("label=\"2\""));
    assert!(out.contains("label=\"1\""));
    assert!(out.contains("label=\"3\""));
    assert!(out.contains("\"grapht-0\" -> \"grapht-1\";"));
}

#[cfg(miri)]
const FUZZ_RANGE: Range<usize> = 0..10;

#[cfg(not(miri))]
const FUZZ_RANGE: Range<usize> = 0..1000;

proptest::proptest! {
    #![proptest_config(ProptestConfig {
        max_shrink_iters: 65536,
        .. ProptestConfig::default()
    })]

    #[test]
    fn model_equivalence(ops in proptest::collection::vec(model::op_strategy(), FUZZ_RANGE)) {
        model::run_model_equivalence(ops);
    }

    #[test]
    fn in_order_is_sorted(values in proptest::collection::vec(0u32..100, 0..200)) {
        let mut tree: AvlTree<u32> = AvlTree::new();

        for &value in &values {
            tree.insert(value);
            tree.assert_invariants();
        }

        let mut expected = values;
        expected.sort_unstable();

        let in_order: Vec<u32> = tree.in_order().copied().collect();
        prop_assert_eq!(expected, in_order);
    }
}
