//! Randomized-op equivalence testing against a sorted multiset reference.
//!
//! Exposed behind the `model` feature so the fuzz targets can drive the same
//! runner the proptest suite uses.

use arbitrary::Arbitrary;
use proptest::strategy::Strategy;

use crate::AvlTree;

/// A value to operate on: either a fresh random value or an index into the
/// values currently stored, which biases ops toward hitting present values.
#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum ItemValue {
    Index(usize),
    Random(u32),
}

proptest::prop_compose! {
    fn index_strategy()(
        index in 0usize..1000,
    ) -> ItemValue {
        ItemValue::Index(index)
    }
}

proptest::prop_compose! {
    fn random_strategy()(
        random in 0u32..1000,
    ) -> ItemValue {
        ItemValue::Random(random)
    }
}

fn value_strategy() -> impl Strategy<Value = ItemValue> {
    proptest::prop_oneof![index_strategy(), random_strategy()]
}

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum Op {
    Insert(ItemValue),
    Contains(ItemValue),
    Remove(ItemValue),
    RemoveAt(ItemValue),
    Height(ItemValue),
    Depth(ItemValue),
}

impl Op {
    fn finalize(self, sorted: &[u32]) -> FinalOp {
        fn get_value(v: &[u32], i: ItemValue) -> u32 {
            match i {
                ItemValue::Index(idx) => {
                    if v.is_empty() {
                        idx as u32
                    } else {
                        v[idx % v.len().max(1)]
                    }
                }
                ItemValue::Random(v) => v,
            }
        }

        match self {
            Op::Insert(item) => FinalOp::Insert(get_value(sorted, item)),
            Op::Contains(item) => FinalOp::Contains(get_value(sorted, item)),
            Op::Remove(item) => FinalOp::Remove(get_value(sorted, item)),
            Op::RemoveAt(item) => FinalOp::RemoveAt(get_value(sorted, item)),
            Op::Height(item) => FinalOp::Height(get_value(sorted, item)),
            Op::Depth(item) => FinalOp::Depth(get_value(sorted, item)),
        }
    }
}

#[derive(Copy, Clone, Debug)]
enum FinalOp {
    Insert(u32),
    Contains(u32),
    Remove(u32),
    RemoveAt(u32),
    Height(u32),
    Depth(u32),
}

pub fn op_strategy() -> impl Strategy<Value = Op> {
    proptest::prop_oneof![
        value_strategy().prop_map(Op::Insert),
        value_strategy().prop_map(Op::Contains),
        value_strategy().prop_map(Op::Remove),
        value_strategy().prop_map(Op::RemoveAt),
        value_strategy().prop_map(Op::Height),
        value_strategy().prop_map(Op::Depth),
    ]
}

/// Runs `ops` against an [`AvlTree`] and a sorted `Vec` multiset, checking
/// agreement and the tree invariants after every step.
pub fn run_model_equivalence(ops: Vec<Op>) {
    let mut sorted_values: Vec<u32> = Vec::with_capacity(ops.len());
    let mut avl: AvlTree<u32> = AvlTree::new();

    // Duplicates are legal, so the reference is a multiset kept sorted.
    fn insert_sorted(v: &mut Vec<u32>, value: u32) {
        let at = match v.binary_search(&value) {
            Ok(at) | Err(at) => at,
        };
        v.insert(at, value);
    }

    fn remove_sorted(v: &mut Vec<u32>, value: u32) -> bool {
        match v.binary_search(&value) {
            Ok(at) => {
                v.remove(at);
                true
            }
            Err(_) => false,
        }
    }

    for (op_id, op) in ops.into_iter().enumerate() {
        let final_op = op.finalize(&sorted_values);

        match final_op {
            FinalOp::Insert(value) => {
                insert_sorted(&mut sorted_values, value);
                avl.insert(value);
            }

            FinalOp::Contains(value) => {
                let expected = sorted_values.binary_search(&value).is_ok();

                assert_eq!(expected, avl.contains(&value), "FinalOp #{op_id}: {op:?}");
            }

            FinalOp::Remove(value) => {
                let expected = remove_sorted(&mut sorted_values, value);

                assert_eq!(expected, avl.remove(&value), "FinalOp #{op_id}: {op:?}");
            }

            FinalOp::RemoveAt(value) => {
                let expected = remove_sorted(&mut sorted_values, value);
                let removed = match avl.find(&value).map(|node| node.id()) {
                    Some(id) => avl.remove_at(id),
                    None => false,
                };

                assert_eq!(expected, removed, "FinalOp #{op_id}: {op:?}");
            }

            FinalOp::Height(value) => {
                let height = avl.height_of(&value);

                if sorted_values.binary_search(&value).is_ok() {
                    assert!(
                        (1..=avl.height()).contains(&height),
                        "FinalOp #{op_id}: {op:?}"
                    );
                } else {
                    assert_eq!(height, 0, "FinalOp #{op_id}: {op:?}");
                }
            }

            FinalOp::Depth(value) => {
                let depth = avl.depth_of(&value);

                if sorted_values.binary_search(&value).is_ok() {
                    assert!(depth < avl.height(), "FinalOp #{op_id}: {op:?}");
                } else {
                    assert_eq!(depth, 0, "FinalOp #{op_id}: {op:?}");
                }
            }
        }

        avl.assert_invariants();
        assert_eq!(sorted_values.len(), avl.len());
        assert!(sorted_values.iter().zip(avl.in_order()).all(|(&a, &b)| a == b));

        // The AVL shape guarantee: h < 1.4405 * log2(n + 2).
        if !avl.is_empty() {
            let bound = 1.4405 * ((avl.len() + 2) as f64).log2();
            assert!(
                (avl.height() as f64) < bound,
                "height {} exceeds AVL bound {bound} at len {}",
                avl.height(),
                avl.len()
            );
        }
    }
}
