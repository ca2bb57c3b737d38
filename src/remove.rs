use tracing::trace;

use crate::{arena::NodeId, node::Dir, WavlTree};

/// What the delete rebalancer must do at a node.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum RemoveCase {
    /// The node has no 3-child and is not a 2,2 leaf.
    Balanced,
    /// The node is 3,2, or a 2,2 leaf.
    Demote,
    /// The node is 3,1 and its 1-child `sibling` is 2,2.
    DoubleDemote { sibling: NodeId },
    /// The node is 3,1 and the outer child of its 1-child `sibling` is a 1-child.
    Rotate { sibling: NodeId },
    /// The node is 3,1 and the outer child of its 1-child `sibling` is a 2-child, which makes the
    /// inner child `nephew` a 1-child.
    DoubleRotate { sibling: NodeId, nephew: NodeId },
}

impl<V> WavlTree<V> {
    pub(crate) fn classify_remove(&self, node: NodeId) -> RemoveCase {
        let n = self.node(node);

        if n.is_leaf() {
            return if self.rank_diff(node, None) == 2 {
                RemoveCase::Demote
            } else {
                RemoveCase::Balanced
            };
        }

        let Some(dir) = Dir::BOTH
            .into_iter()
            .find(|&dir| self.rank_diff(node, n.child(dir)) == 3)
        else {
            return RemoveCase::Balanced;
        };

        // `node` has rank at least 2, so its other child is a real node.
        let sibling = n.child(!dir).expect("sibling of a 3-child must be a real node");

        if self.rank_diff(node, Some(sibling)) == 2 {
            return RemoveCase::Demote;
        }

        if self.is_2_2(sibling) {
            return RemoveCase::DoubleDemote { sibling };
        }

        let outer = self.node(sibling).child(!dir);
        if self.rank_diff(sibling, outer) == 1 {
            RemoveCase::Rotate { sibling }
        } else {
            let nephew = self
                .node(sibling)
                .child(dir)
                .expect("inner child of a 1,2 sibling must be a real node");
            RemoveCase::DoubleRotate { sibling, nephew }
        }
    }

    // Performs a bottom-up rebalance of the tree after a node was spliced out from below `node`.
    //
    // After the splice, exactly one of the following is true:
    //
    // 1. The rank rule holds.
    // 2. `node` has a 3-child.
    // 3. `node` is a 2,2 leaf.
    //
    // Returns the number of operations performed.
    pub(crate) fn rebalance_after_remove(&mut self, node: NodeId) -> usize {
        let mut z = node;
        let mut ops = 0;

        loop {
            let case = self.classify_remove(z);
            trace!(key = self.node(z).key, ?case, "rebalance after remove");

            match case {
                RemoveCase::Balanced => break,

                RemoveCase::Demote => {
                    self.demote(z);
                    ops += 1;
                }

                RemoveCase::DoubleDemote { sibling } => {
                    self.demote(sibling);
                    self.demote(z);
                    ops += 2;
                }

                // Here we give up on descriptive names entirely and just use the names from the
                // paper: `y` is the sibling, `v` and `w` its inner and outer children.
                RemoveCase::Rotate { sibling: y } => {
                    self.rotate(z, y);
                    self.promote(y);
                    self.demote(z);
                    ops += 3;

                    if self.node(z).is_leaf() {
                        self.demote(z);
                        ops += 1;
                    }
                    break;
                }

                RemoveCase::DoubleRotate {
                    sibling: y,
                    nephew: v,
                } => {
                    self.double_rotate(z, y, v);
                    self.promote(v);
                    self.promote(v);
                    self.demote(y);
                    self.demote(z);
                    self.demote(z);
                    ops += 2 + 5;
                    break;
                }
            }

            // Ascend one level. If this reaches the root, stop.
            match self.node(z).parent() {
                Some(parent) => z = parent,
                None => break,
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
        assert_eq!(tree.classify_remove(id(&tree, 2)), RemoveCase::Balanced);
    }

    #[test]
    fn classify_2_2_leaf() {
        let tree = build_raw(&[(1, 1)]);
        assert_eq!(tree.classify_remove(id(&tree, 1)), RemoveCase::Demote);
    }

    #[test]
    fn classify_demote() {
        let tree = build_raw(&[(4, 3), (2, 0), (6, 1), (7, 0)]);
        assert_eq!(tree.classify_remove(id(&tree, 4)), RemoveCase::Demote);
    }

    #[test]
    fn classify_double_demote() {
        let tree = build_raw(&[(4, 3), (2, 0), (6, 2), (5, 0), (7, 0)]);
        assert_eq!(
            tree.classify_remove(id(&tree, 4)),
            RemoveCase::DoubleDemote {
                sibling: id(&tree, 6)
            }
        );
    }

    #[test]
    fn classify_rotate() {
        let tree = build_raw(&[(2, 2), (3, 1), (4, 0)]);
        assert_eq!(
            tree.classify_remove(id(&tree, 2)),
            RemoveCase::Rotate {
                sibling: id(&tree, 3)
            }
        );
    }

    #[test]
    fn classify_double_rotate() {
        let tree = build_raw(&[(2, 2), (4, 1), (3, 0)]);
        assert_eq!(
            tree.classify_remove(id(&tree, 2)),
            RemoveCase::DoubleRotate {
                sibling: id(&tree, 4),
                nephew: id(&tree, 3)
            }
        );
    }

    #[test]
    fn demote_fixes_2_2_leaf() {
        let mut tree = build_raw(&[(1, 1)]);
        assert_eq!(tree.rebalance_after_remove(id(&tree, 1)), 1);
        tree.assert_invariants();
    }

    #[test]
    fn double_demote_climbs() {
        let mut tree = build_raw(&[(4, 3), (2, 0), (6, 2), (5, 0), (7, 0)]);
        assert_eq!(tree.rebalance_after_remove(id(&tree, 4)), 2);
        tree.assert_invariants();
        assert_eq!(tree.node(id(&tree, 4)).rank, 2);
        assert_eq!(tree.node(id(&tree, 6)).rank, 1);
    }

    #[test]
    fn rotate_demotes_leaf_twice() {
        let mut tree = build_raw(&[(2, 2), (3, 1), (4, 0)]);
        assert_eq!(tree.rebalance_after_remove(id(&tree, 2)), 4);
        tree.assert_invariants();

        assert_eq!(tree.root, Some(id(&tree, 3)));
        assert_eq!(tree.node(id(&tree, 3)).rank, 2);
        assert_eq!(tree.node(id(&tree, 2)).rank, 0);
    }

    #[test]
    fn double_rotate_lifts_nephew() {
        let mut tree = build_raw(&[(2, 2), (4, 1), (3, 0)]);
        assert_eq!(tree.rebalance_after_remove(id(&tree, 2)), 7);
        tree.assert_invariants();

        assert_eq!(tree.root, Some(id(&tree, 3)));
        assert_eq!(tree.node(id(&tree, 3)).rank, 2);
        assert_eq!(tree.node(id(&tree, 2)).rank, 0);
        assert_eq!(tree.node(id(&tree, 4)).rank, 0);
    }
}
