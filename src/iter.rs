use core::iter::FusedIterator;

use crate::{
    node::{Dir, Link},
    Key, WavlTree,
};

enum CameFrom {
    Parent,
    LeftChild,
    Here,
    RightChild,
}

/// An in-order iterator over the entries of a [`WavlTree`].
///
/// Walks parent links instead of keeping a stack.
pub struct Iter<'tree, V> {
    tree: &'tree WavlTree<V>,

    front_cur: Link,
    front_from: CameFrom,

    len: usize,
}

impl<'tree, V> Iter<'tree, V> {
    pub(crate) fn new(tree: &'tree WavlTree<V>) -> Self {
        Iter {
            tree,

            front_cur: tree.root,
            front_from: CameFrom::Parent,
            len: tree.len(),
        }
    }
}

impl<'tree, V> Iterator for Iter<'tree, V> {
    type Item = (Key, &'tree V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }

        let tree = self.tree;
        let mut cur = self.front_cur?;

        loop {
            match self.front_from {
                CameFrom::Parent => {
                    // Upon entering a new subtree, find the minimum element.
                    cur = tree.min_in_subtree(cur);

                    // Once the minimum is found, its (empty) left subtree has been exhausted.
                    self.front_from = CameFrom::LeftChild;
                }

                CameFrom::LeftChild => {
                    // The left subtree has been exhausted, so this node is up next. Save off the
                    // iterator state and return it.
                    self.front_cur = Some(cur);
                    self.front_from = CameFrom::Here;
                    self.len -= 1;

                    return Some(tree.entry(cur));
                }

                CameFrom::Here => {
                    // The current node was just yielded.
                    if let Some(right) = tree.node(cur).right() {
                        // If the right subtree is not empty, go there.
                        self.front_from = CameFrom::Parent;
                        cur = right;
                    } else {
                        // Otherwise, its whole subtree is done.
                        self.front_from = CameFrom::RightChild;
                    }
                }

                CameFrom::RightChild => {
                    // The subtree at `cur` is exhausted. Ascend until it hangs to the left of its
                    // parent; that parent is the successor.
                    let parent = tree
                        .node(cur)
                        .parent()
                        .expect("ran out of ancestors with elements left");

                    self.front_from = match tree.which_child(parent, cur) {
                        Dir::Left => CameFrom::LeftChild,
                        Dir::Right => CameFrom::RightChild,
                    };
                    cur = parent;
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

impl<V> FusedIterator for Iter<'_, V> {}
