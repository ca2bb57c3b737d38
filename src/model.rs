//! Equivalence checking against [`BTreeMap`], shared by the property tests and the fuzz targets.

use std::collections::BTreeMap;

use arbitrary::Arbitrary;
use proptest::strategy::{Just, Strategy};

use crate::{Error, Key, WavlTree};

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum ItemValue {
    /// Picks an existing key, by position in sorted order.
    Index(usize),
    Random(i32),
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
        random in -500i32..500,
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
    Search(ItemValue),
    Delete(ItemValue),
    Remove(ItemValue),
    First,
    PopFirst,
    Last,
    PopLast,
}

impl Op {
    fn finalize(self, model: &BTreeMap<Key, usize>) -> FinalOp {
        fn get_key(model: &BTreeMap<Key, usize>, i: ItemValue) -> Key {
            match i {
                ItemValue::Index(idx) => model
                    .keys()
                    .nth(idx % model.len().max(1))
                    .copied()
                    .unwrap_or(Key::try_from(idx).unwrap_or(Key::MAX)),
                ItemValue::Random(v) => Key::from(v),
            }
        }

        match self {
            Op::Insert(item) => FinalOp::Insert(get_key(model, item)),
            Op::Search(item) => FinalOp::Search(get_key(model, item)),
            Op::Delete(item) => FinalOp::Delete(get_key(model, item)),
            Op::Remove(item) => FinalOp::Remove(get_key(model, item)),
            Op::First => FinalOp::First,
            Op::PopFirst => FinalOp::PopFirst,
            Op::Last => FinalOp::Last,
            Op::PopLast => FinalOp::PopLast,
        }
    }
}

#[derive(Copy, Clone, Debug)]
enum FinalOp {
    Insert(Key),
    Search(Key),
    Delete(Key),
    Remove(Key),
    First,
    PopFirst,
    Last,
    PopLast,
}

pub fn op_strategy() -> impl Strategy<Value = Op> {
    proptest::prop_oneof![
        value_strategy().prop_map(Op::Insert),
        value_strategy().prop_map(Op::Search),
        value_strategy().prop_map(Op::Delete),
        value_strategy().prop_map(Op::Remove),
        Just(Op::First),
        Just(Op::PopFirst),
        Just(Op::Last),
        Just(Op::PopLast),
    ]
}

/// Applies `ops` to both a [`WavlTree`] and a [`BTreeMap`], asserting identical results and a
/// valid tree after every step.
///
/// Each inserted value is the index of the op that inserted it.
pub fn run_btree_equivalence(ops: Vec<Op>) {
    let mut btree: BTreeMap<Key, usize> = BTreeMap::new();
    let mut wavl: WavlTree<usize> = WavlTree::new();

    for (op_id, op) in ops.into_iter().enumerate() {
        let final_op = op.finalize(&btree);

        match final_op {
            FinalOp::Insert(key) => {
                let from_btree = if btree.contains_key(&key) {
                    Err(Error::DuplicateKey(key))
                } else {
                    btree.insert(key, op_id);
                    Ok(())
                };
                let from_wavl = wavl.insert(key, op_id).map(drop);

                assert_eq!(from_btree, from_wavl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Search(key) => {
                let from_btree = btree.get(&key);
                let from_wavl = wavl.search(key);

                assert_eq!(from_btree, from_wavl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Delete(key) => {
                let from_btree = btree.remove(&key).map(drop).ok_or(Error::KeyNotFound(key));
                let from_wavl = wavl.delete(key).map(drop);

                assert_eq!(from_btree, from_wavl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Remove(key) => {
                let from_btree = btree.remove(&key);
                let from_wavl = wavl.remove(key);

                assert_eq!(from_btree, from_wavl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::First => {
                let from_btree = btree.first_key_value().map(|(&k, v)| (k, v));
                let from_wavl = wavl.first_key_value();

                assert_eq!(from_btree, from_wavl, "FinalOp #{op_id}: {final_op:?}");
                assert_eq!(from_btree.map(|(_, v)| v), wavl.min());
            }

            FinalOp::PopFirst => {
                let from_btree = btree.pop_first();
                let from_wavl = wavl.pop_first();

                assert_eq!(from_btree, from_wavl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Last => {
                let from_btree = btree.last_key_value().map(|(&k, v)| (k, v));
                let from_wavl = wavl.last_key_value();

                assert_eq!(from_btree, from_wavl, "FinalOp #{op_id}: {final_op:?}");
                assert_eq!(from_btree.map(|(_, v)| v), wavl.max());
            }

            FinalOp::PopLast => {
                let from_btree = btree.pop_last();
                let from_wavl = wavl.pop_last();

                assert_eq!(from_btree, from_wavl, "FinalOp #{op_id}: {final_op:?}");
            }
        }

        wavl.assert_invariants();
        assert_eq!(btree.len(), wavl.len());
        assert_eq!(wavl.keys_to_vec().len(), wavl.len());
        assert!(btree.iter().map(|(&k, v)| (k, v)).eq(wavl.iter()));
    }
}
