use tracing::trace;

use crate::{arena::NodeId, node::Dir, WavlTree};

/// What the insert rebalancer must do at a node.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum InsertCase {
    /// The node has no 0-child.
    Balanced,
    /// The node is 0,1. Promoting it may leave its parent 0,1 or 0,2 in turn.
    Promote,
    /// The node is 0,2 and the 0-child's inner child is a 2-child.
    Rotate { child: NodeId },
    /// The node is 0,2 and the 0-child's inner child `grandchild` is a 1-child.
    DoubleRotate { child: NodeId, grandchild: NodeId },
}

impl<V> WavlTree<V> {
    pub(crate) fn classify_insert(&self, node: NodeId) -> InsertCase {
        let n = self.node(node);

        let Some(dir) = Dir::BOTH
            .into_iter()
            .find(|&dir| self.rank_diff(node, n.child(dir)) == 0)
        else {
            return InsertCase::Balanced;
        };

        if self.rank_diff(node, n.child(!dir)) == 1 {
            return InsertCase::Promote;
        }
        debug_assert_eq!(self.rank_diff(node, n.child(!dir)), 2);

        // The sentinel's rank is below every real rank, so it is never a 0-child.
        let child = n.child(dir).expect("0-child must be a real node");

        // The 0-child was just promoted and is 1,2. If its 1-child is on the outer side a single
        // rotation restores the rank rule; otherwise the inner child has to come up.
        let inner = self.node(child).child(!dir);
        match inner {
            Some(grandchild) if self.rank_diff(child, inner) == 1 => {
                InsertCase::DoubleRotate { child, grandchild }
            }
            _ => InsertCase::Rotate { child },
        }
    }

    // Performs a bottom-up rebalance of the tree after a leaf was attached below `node`.
    //
    // Invariants:
    // - `node` was a leaf before the attach, so it is rank 0 and 0,1.
    // - Everything outside the path from `node` to the root satisfies the rank rule.
    //
    // Returns the number of operations performed.
    pub(crate) fn rebalance_after_insert(&mut self, node: NodeId) -> usize {
        let mut x = node;
        let mut ops = 0;

        loop {
            let case = self.classify_insert(x);
            trace!(key = self.node(x).key, ?case, "rebalance after insert");

            match case {
                InsertCase::Balanced => break,

                InsertCase::Promote => {
                    self.promote(x);
                    ops += 1;

                    // Ascend one level. If this reaches the root, stop.
                    match self.node(x).parent() {
                        Some(parent) => x = parent,
                        None => break,
                    }
                }

                InsertCase::Rotate { child } => {
                    self.demote(x);
                    self.rotate(x, child);
                    ops += 2;
                    break;
                }

                InsertCase::DoubleRotate { child, grandchild } => {
                    self.demote(x);
                    self.demote(child);
                    self.promote(grandchild);
                    self.double_rotate(x, child, grandchild);
                    ops += 3 + 2;
                    break;
                }
            }
        }

        ops
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{build_raw, id};

    #[test]
    fn classify_balanced() {
        let tree = build_raw(&[(2, 1), (1, 0), (3, 0)]);
        assert_eq!(tree.classify_insert(id(&tree, 2)), InsertCase::Balanced);
    }

    #[test]
    fn classify_promote() {
        let tree = build_raw(&[(2, 0), (1, 0)]);
        assert_eq!(tree.classify_insert(id(&tree, 2)), InsertCase::Promote);
    }

    #[test]
    fn classify_rotate() {
        // 3 is 0,2: its left child 2 has its 1-child on the outer (left) side.
        let tree = build_raw(&[(3, 1), (2, 1), (1, 0)]);
        assert_eq!(
            tree.classify_insert(id(&tree, 3)),
            InsertCase::Rotate {
                child: id(&tree, 2)
            }
        );
    }

    #[test]
    fn classify_double_rotate() {
        let tree = build_raw(&[(3, 1), (1, 1), (2, 0)]);
        assert_eq!(
            tree.classify_insert(id(&tree, 3)),
            InsertCase::DoubleRotate {
                child: id(&tree, 1),
                grandchild: id(&tree, 2)
            }
        );
    }

    #[test]
    fn rotate_repairs_chain() {
        let mut tree = build_raw(&[(3, 1), (2, 1), (1, 0)]);
        let ops = tree.rebalance_after_insert(id(&tree, 3));

        assert_eq!(ops, 2);
        tree.assert_invariants();
        assert_eq!(tree.root, Some(id(&tree, 2)));
        assert_eq!(tree.node(id(&tree, 2)).rank, 1);
    }

    #[test]
    fn double_rotate_repairs_zig_zag() {
        let mut tree = build_raw(&[(3, 1), (1, 1), (2, 0)]);
        let ops = tree.rebalance_after_insert(id(&tree, 3));

        assert_eq!(ops, 5);
        tree.assert_invariants();
        assert_eq!(tree.root, Some(id(&tree, 2)));
        assert_eq!(tree.node(id(&tree, 2)).rank, 1);
    }

    #[test]
    fn promotions_cascade_to_root() {
        let mut tree = WavlTree::new();
        for key in [2, 1, 3] {
            tree.insert(key, ()).unwrap();
        }

        // 4 lands below the leaf 3; both 3 and the root 2 are promoted.
        assert_eq!(tree.insert(4, ()), Ok(2));
        assert_eq!(tree.node(id(&tree, 2)).rank, 2);
        tree.assert_invariants();
    }

    #[test]
    fn unary_parent_needs_no_repair() {
        let mut tree = WavlTree::new();
        tree.insert(2, ()).unwrap();
        tree.insert(1, ()).unwrap();

        assert_eq!(tree.insert(3, ()), Ok(0));
        tree.assert_invariants();
    }
}
