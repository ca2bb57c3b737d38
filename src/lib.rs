//! A weak AVL tree, or WAVL tree, mapping distinct integer keys to values.
//!
//! Nodes live in an arena and refer to each other by handle, so the parent links needed by the
//! bottom-up rebalancing walks cost no ownership gymnastics. Every mutating operation reports how
//! many rebalancing steps it took.
//!
//! ```
//! use wavl_tree::WavlTree;
//!
//! let mut tree = WavlTree::new();
//! assert_eq!(tree.insert(2, "two"), Ok(0));
//! assert_eq!(tree.insert(1, "one"), Ok(1));
//! assert_eq!(tree.search(1), Some(&"one"));
//! assert_eq!(tree.keys_to_vec(), [1, 2]);
//! ```

// Conventions used in comments are from Haeupler, Sen and Tarjan:
// - The rank of a node `x` is denoted `r(x)`.
// - The parent of a node `x` is denoted `p(x)`.
// - The rank difference of a node `x` is given by `r(p(x)) - r(x)`.
// - A node `x` is an `i`-child if its rank difference is `i`.
// - A node is `i,j` if one of its children is an `i`-child and the other is a `j`-child.
//
// Missing children are the sentinel, a `None` link of rank -1.
//
// The fundamental invariants of a WAVL tree are:
// 1. All rank differences are either 1 or 2.
// 2. All leaves have rank 0.
//
// Corollaries:
// 3. All unary nodes are 1,2 with rank 1: the missing child has rank -1, so `r(n) ∈ {0, 1}`, and
//    the present child has rank at least 0.
// 4. Internal nodes may be 2,2. Only deletion creates them; a tree built by insertions alone is an
//    AVL tree.

mod arena;
mod debug;
mod error;
mod insert;
mod iter;
#[cfg(any(test, feature = "model"))]
pub mod model;
mod node;
mod remove;

use core::{cmp::Ordering, fmt};

use tracing::{debug, trace};

use crate::{
    arena::{Arena, NodeId},
    node::{Dir, Link, Node, SENTINEL_RANK},
};

pub use debug::Pretty;
pub use error::Error;
pub use iter::Iter;

/// The key type of a [`WavlTree`].
pub type Key = i64;

/// A weak AVL tree, or WAVL tree, keyed by [`Key`].
///
/// Implementation based on the paper [Rank-Balanced Trees] by Haeupler, Sen and Tarjan.
///
/// [Rank-Balanced Trees]: http://arks.princeton.edu/ark:/88435/pr1nz5z
pub struct WavlTree<V> {
    nodes: Arena<Node<V>>,
    root: Link,
    first: Link,
    last: Link,
    len: usize,
}

impl<V> WavlTree<V> {
    /// Returns a new empty tree.
    pub const fn new() -> WavlTree<V> {
        WavlTree {
            nodes: Arena::new(),
            root: None,
            first: None,
            last: None,
            len: 0,
        }
    }

    /// Returns `true` if the tree contains no elements.
    pub fn is_empty(&self) -> bool {
        let empty = self.len() == 0;
        debug_assert_eq!(empty, self.root.is_none());
        empty
    }

    /// Returns the number of elements in the tree.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns the height of the tree; 0 when empty, 1 for a lone root.
    pub fn height(&self) -> usize {
        self.height_at(self.root)
    }

    fn height_at(&self, link: Link) -> usize {
        match link {
            None => 0,
            Some(node) => {
                let node = self.node(node);
                1 + self.height_at(node.left()).max(self.height_at(node.right()))
            }
        }
    }

    #[doc(hidden)]
    pub fn assert_invariants(&self) {
        assert_eq!(self.len, self.nodes.len(), "`len` disagrees with the arena");

        let Some(root) = self.root else {
            assert_eq!(self.len, 0, "empty tree with nonzero `len`");
            assert!(self.first.is_none(), "empty tree caches a minimum");
            assert!(self.last.is_none(), "empty tree caches a maximum");
            return;
        };

        assert_eq!(self.node(root).parent(), None, "root has a parent");
        assert_eq!(self.assert_invariants_at(root, None, None), self.len);
        assert_eq!(self.first, Some(self.min_in_subtree(root)), "stale cached minimum");
        assert_eq!(self.last, Some(self.max_in_subtree(root)), "stale cached maximum");
    }

    // Checks the subtree at `node`, whose keys must lie strictly between `lower` and `upper`, and
    // returns its size.
    fn assert_invariants_at(&self, node: NodeId, lower: Option<Key>, upper: Option<Key>) -> usize {
        let n = self.node(node);

        if let Some(lower) = lower {
            assert!(n.key > lower, "key {} is out of order", n.key);
        }
        if let Some(upper) = upper {
            assert!(n.key < upper, "key {} is out of order", n.key);
        }

        // Ensure all leaves have rank 0.
        if n.is_leaf() {
            assert_eq!(n.rank, 0, "leaf {} has rank {}", n.key, n.rank);
        }

        let mut size = 1;
        for dir in Dir::BOTH {
            let child = n.child(dir);

            // Ensure all rank differences are 1 or 2.
            let rank_diff = self.rank_diff(node, child);
            assert!(
                [1, 2].contains(&rank_diff),
                "node {} has rank difference {rank_diff} to its {dir:?} child",
                n.key,
            );

            if let Some(child) = child {
                // Ensure child's parent link points to this node.
                assert_eq!(
                    self.node(child).parent(),
                    Some(node),
                    "{dir:?} child of {} has a stale parent link",
                    n.key,
                );

                let (lower, upper) = match dir {
                    Dir::Left => (lower, Some(n.key)),
                    Dir::Right => (Some(n.key), upper),
                };
                size += self.assert_invariants_at(child, lower, upper);
            }
        }

        size
    }

    /// Returns a reference to the value stored under `key`.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn search(&self, key: Key) -> Option<&V> {
        self.find(key).map(|node| &self.node(node).value)
    }

    /// Returns a mutable reference to the value stored under `key`.
    pub fn get_mut(&mut self, key: Key) -> Option<&mut V> {
        let node = self.find(key)?;
        Some(&mut self.node_mut(node).value)
    }

    /// Returns `true` if the tree holds `key`.
    pub fn contains_key(&self, key: Key) -> bool {
        self.find(key).is_some()
    }

    fn find(&self, key: Key) -> Link {
        let (node, ordering) = self.locate(self.root?, key);
        (ordering == Ordering::Equal).then_some(node)
    }

    // Descends from `from` towards `key`.
    //
    // Returns the node holding `key` together with `Ordering::Equal`, or else the last node visited
    // together with the side of it that `key` would hang from.
    fn locate(&self, from: NodeId, key: Key) -> (NodeId, Ordering) {
        let mut cur = from;

        loop {
            let node = self.node(cur);
            let ordering = key.cmp(&node.key);

            let next = match ordering {
                Ordering::Less => node.left(),
                Ordering::Equal => None,
                Ordering::Greater => node.right(),
            };

            match next {
                Some(next) => cur = next,
                None => return (cur, ordering),
            }
        }
    }

    /// Returns the value with the smallest key.
    pub fn min(&self) -> Option<&V> {
        self.first.map(|first| &self.node(first).value)
    }

    /// Returns the value with the largest key.
    pub fn max(&self) -> Option<&V> {
        self.last.map(|last| &self.node(last).value)
    }

    /// Returns the entry with the smallest key.
    pub fn first_key_value(&self) -> Option<(Key, &V)> {
        self.first.map(|first| self.entry(first))
    }

    /// Returns the entry with the largest key.
    pub fn last_key_value(&self) -> Option<(Key, &V)> {
        self.last.map(|last| self.entry(last))
    }

    /// Returns an iterator over the entries of the tree, in ascending key order.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter::new(self)
    }

    /// Returns all keys in ascending order.
    pub fn keys_to_vec(&self) -> Vec<Key> {
        let mut keys = Vec::with_capacity(self.len());
        keys.extend(self.iter().map(|(key, _)| key));
        keys
    }

    /// Returns all values, ordered by their keys.
    pub fn values_to_vec(&self) -> Vec<&V> {
        let mut values = Vec::with_capacity(self.len());
        values.extend(self.iter().map(|(_, value)| value));
        values
    }

    /// Inserts `value` under `key`.
    ///
    /// Returns the number of rebalancing operations performed, counting a promotion, a demotion or
    /// a single rotation as one and a double rotation as two.
    ///
    /// This operation completes in _O(log(n))_ time.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateKey`] without modifying the tree if `key` is already present.
    pub fn insert(&mut self, key: Key, value: V) -> Result<usize, Error> {
        let Some(root) = self.root else {
            // Tree is empty. Set the new node as the root and return.
            let node = self.nodes.alloc(Node::leaf(key, value, None));
            self.root = Some(node);
            self.first = Some(node);
            self.last = Some(node);
            self.len += 1;

            debug!(key, ops = 0, "insert");
            return Ok(0);
        };

        let (parent, ordering) = self.locate(root, key);
        let dir = match ordering {
            Ordering::Less => Dir::Left,
            Ordering::Equal => return Err(Error::DuplicateKey(key)),
            Ordering::Greater => Dir::Right,
        };

        let parent_was_leaf = self.node(parent).is_leaf();
        let node = self.nodes.alloc(Node::leaf(key, value, Some(parent)));
        self.node_mut(parent).set_child(dir, Some(node));
        self.len += 1;

        // Anything smaller than the minimum descends all the way to it.
        match dir {
            Dir::Left if self.first == Some(parent) => self.first = Some(node),
            Dir::Right if self.last == Some(parent) => self.last = Some(node),
            _ => {}
        }

        // A unary parent is 1,2 with rank 1, so the new leaf is a 1-child. A leaf parent has rank
        // 0, which makes the new leaf a 0-child.
        let ops = if parent_was_leaf {
            self.rebalance_after_insert(parent)
        } else {
            0
        };

        debug!(key, ops, "insert");
        Ok(ops)
    }

    /// Deletes the entry stored under `key`.
    ///
    /// Returns the number of rebalancing operations performed, counted as for
    /// [`insert`](Self::insert).
    ///
    /// This operation completes in _O(log(n))_ time.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyNotFound`] if `key` is not present.
    pub fn delete(&mut self, key: Key) -> Result<usize, Error> {
        let node = self.find(key).ok_or(Error::KeyNotFound(key))?;
        let (_, ops) = self.remove_node(node);

        debug!(key, ops, "delete");
        Ok(ops)
    }

    /// Removes the entry stored under `key`, returning its value.
    pub fn remove(&mut self, key: Key) -> Option<V> {
        let node = self.find(key)?;
        let (removed, ops) = self.remove_node(node);

        debug!(key, ops, "delete");
        Some(removed.value)
    }

    /// Removes and returns the entry with the smallest key.
    pub fn pop_first(&mut self) -> Option<(Key, V)> {
        let (removed, ops) = self.remove_node(self.first?);

        debug!(key = removed.key, ops, "pop_first");
        Some((removed.key, removed.value))
    }

    /// Removes and returns the entry with the largest key.
    pub fn pop_last(&mut self) -> Option<(Key, V)> {
        let (removed, ops) = self.remove_node(self.last?);

        debug!(key = removed.key, ops, "pop_last");
        Some((removed.key, removed.value))
    }

    /// Clears the tree, removing all elements.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.first = None;
        self.last = None;
        self.len = 0;
    }

    // Unlinks `node` and returns its contents along with the rebalancing operation count.
    //
    // There are three possible cases:
    //
    // 1. `node` has two children.
    //
    //    Its key and value are swapped with those of its predecessor[^1], and the predecessor is
    //    removed instead. The predecessor has no right child, so this continues as case 2 or 3.
    //
    // 2. `node` has one child.
    //
    //    `node` was unary and thus 1,2 with rank 1; its child has rank 0. If `node` was a 2-child,
    //    its elevated child becomes a 3-child.
    //
    // 3. `node` is a leaf.
    //
    //    If `node` was a 2-child its sibling is fine. If its parent was unary, the parent becomes a
    //    2,2 leaf.
    //
    // [^1]: The predecessor of a node `a` is the greatest node in `a`'s left subtree.
    fn remove_node(&mut self, node: NodeId) -> (Node<V>, usize) {
        let target = match (self.node(node).left(), self.node(node).right()) {
            (Some(left), Some(_)) => {
                let predecessor = self.max_in_subtree(left);
                let (doomed, replacement) = self.nodes.get_pair_mut(node, predecessor);
                doomed.swap_payload(replacement);
                predecessor
            }
            _ => node,
        };

        let parent = self.node(target).parent();
        let left = self.node(target).left();
        let right = self.node(target).right();
        debug_assert!(left.is_none() || right.is_none());
        let child = left.or(right);

        // Elevate the child (which may be the sentinel).
        self.replace_child_or_set_root(parent, target, child);
        self.maybe_set_parent(child, parent);

        // The minimum has no left child, so its successor is the minimum of its right subtree if
        // there is one and its parent otherwise. Symmetrically for the maximum.
        if self.first == Some(target) {
            self.first = child.map(|c| self.min_in_subtree(c)).or(parent);
        }
        if self.last == Some(target) {
            self.last = child.map(|c| self.max_in_subtree(c)).or(parent);
        }

        let removed = self.nodes.take(target);
        self.len -= 1;

        let ops = match parent {
            Some(parent) => self.rebalance_after_remove(parent),
            None => 0,
        };

        (removed, ops)
    }

    // Support methods ========================================================

    #[inline]
    fn node(&self, node: NodeId) -> &Node<V> {
        self.nodes.get(node)
    }

    #[inline]
    fn node_mut(&mut self, node: NodeId) -> &mut Node<V> {
        self.nodes.get_mut(node)
    }

    #[inline]
    fn entry(&self, node: NodeId) -> (Key, &V) {
        let node = self.node(node);
        (node.key, &node.value)
    }

    /// Returns the rank of the linked node, or that of the sentinel.
    #[inline]
    fn rank(&self, link: Link) -> i8 {
        link.map_or(SENTINEL_RANK, |node| self.node(node).rank)
    }

    #[inline]
    fn rank_diff(&self, parent: NodeId, child: Link) -> i8 {
        self.node(parent).rank - self.rank(child)
    }

    fn is_2_2(&self, node: NodeId) -> bool {
        let n = self.node(node);
        self.rank_diff(node, n.left()) == 2 && self.rank_diff(node, n.right()) == 2
    }

    fn which_child(&self, parent: NodeId, child: NodeId) -> Dir {
        let parent = self.node(parent);

        if parent.left() == Some(child) {
            Dir::Left
        } else {
            debug_assert_eq!(parent.right(), Some(child), "not a child of `parent`");
            Dir::Right
        }
    }

    #[inline]
    fn maybe_set_parent(&mut self, link: Link, parent: Link) {
        // The sentinel is shared and never written.
        if let Some(node) = link {
            self.node_mut(node).set_parent(parent);
        }
    }

    // Points whichever child slot of `parent` holds `old_child` at `new_child`, or makes
    // `new_child` the root when `parent` is `None`.
    //
    // `new_child`'s parent link is not updated.
    fn replace_child_or_set_root(&mut self, parent: Link, old_child: NodeId, new_child: Link) {
        match parent {
            Some(parent) => {
                let dir = self.which_child(parent, old_child);
                self.node_mut(parent).set_child(dir, new_child);
            }
            None => self.root = new_child,
        }
    }

    // Performs a rotation, moving `child` up into the place of its parent `parent`.
    //
    // The ranks of affected nodes are not updated.
    fn rotate(&mut self, parent: NodeId, child: NodeId) {
        // - `child` is the `dir` child of `parent`, and `parent` becomes the `!dir` child of `child`.
        // - `across` goes from the `!dir` child of `child` to the `dir` child of `parent`.
        let dir = self.which_child(parent, child);

        let across = self.node(child).child(!dir);
        self.node_mut(parent).set_child(dir, across);
        self.maybe_set_parent(across, Some(parent));

        self.node_mut(child).set_child(!dir, Some(parent));
        let grandparent = self.node_mut(parent).set_parent(Some(child));
        self.node_mut(child).set_parent(grandparent);

        self.replace_child_or_set_root(grandparent, parent, Some(child));

        trace!(
            up = self.node(child).key,
            down = self.node(parent).key,
            "rotate"
        );
    }

    // Moves `bottom`, a grandchild of `top` through `middle`, up into the place of `top`.
    //
    // The ranks of affected nodes are not updated.
    fn double_rotate(&mut self, top: NodeId, middle: NodeId, bottom: NodeId) {
        self.rotate(middle, bottom);
        self.rotate(top, bottom);
    }

    #[inline]
    fn promote(&mut self, node: NodeId) {
        let node = self.node_mut(node);
        node.rank = node.rank.checked_add(1).expect("rank overflow");
        trace!(key = node.key, rank = node.rank, "promote");
    }

    #[inline]
    fn demote(&mut self, node: NodeId) {
        let node = self.node_mut(node);
        node.rank = node.rank.checked_sub(1).expect("rank underflow");
        debug_assert!(node.rank >= 0, "real nodes never sink to the sentinel's rank");
        trace!(key = node.key, rank = node.rank, "demote");
    }

    fn min_in_subtree(&self, root: NodeId) -> NodeId {
        let mut cur = root;
        while let Some(left) = self.node(cur).left() {
            cur = left;
        }
        cur
    }

    fn max_in_subtree(&self, root: NodeId) -> NodeId {
        let mut cur = root;
        while let Some(right) = self.node(cur).right() {
            cur = right;
        }
        cur
    }
}

impl<V> Default for WavlTree<V> {
    fn default() -> Self {
        WavlTree::new()
    }
}

impl<V: fmt::Debug> fmt::Debug for WavlTree<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'tree, V> IntoIterator for &'tree WavlTree<V> {
    type Item = (Key, &'tree V);
    type IntoIter = Iter<'tree, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
