use core::{mem, ops::Not};

use crate::{arena::NodeId, Key};

/// Rank of the external leaf that fills every vacant child slot.
pub(crate) const SENTINEL_RANK: i8 = -1;

/// A parent or child link.
///
/// `None` in a child slot is the sentinel: the single, shared, never-mutated external leaf of rank
/// -1. `None` in a parent slot marks the root.
pub(crate) type Link = Option<NodeId>;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Dir {
    Left = 0,
    Right = 1,
}

impl Dir {
    pub(crate) const BOTH: [Dir; 2] = [Dir::Left, Dir::Right];
}

impl Not for Dir {
    type Output = Dir;

    fn not(self) -> Self::Output {
        match self {
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }
}

pub(crate) struct Node<V> {
    pub(crate) key: Key,
    pub(crate) value: V,
    pub(crate) rank: i8,
    parent: Link,
    children: [Link; 2],
}

impl<V> Node<V> {
    /// A fresh rank-0 leaf hanging from `parent`.
    pub(crate) fn leaf(key: Key, value: V, parent: Link) -> Self {
        Node {
            key,
            value,
            rank: 0,
            parent,
            children: [None; 2],
        }
    }

    #[inline]
    pub(crate) fn is_leaf(&self) -> bool {
        self.left().is_none() && self.right().is_none()
    }

    #[inline]
    pub(crate) fn parent(&self) -> Link {
        self.parent
    }

    #[inline]
    pub(crate) fn child(&self, dir: Dir) -> Link {
        self.children[dir as usize]
    }

    #[inline]
    pub(crate) fn left(&self) -> Link {
        self.child(Dir::Left)
    }

    #[inline]
    pub(crate) fn right(&self) -> Link {
        self.child(Dir::Right)
    }

    #[inline]
    pub(crate) fn set_parent(&mut self, parent: Link) -> Link {
        mem::replace(&mut self.parent, parent)
    }

    #[inline]
    pub(crate) fn set_child(&mut self, dir: Dir, child: Link) -> Link {
        mem::replace(&mut self.children[dir as usize], child)
    }

    /// Exchanges keys and values, leaving links and ranks in place.
    pub(crate) fn swap_payload(&mut self, other: &mut Node<V>) {
        mem::swap(&mut self.key, &mut other.key);
        mem::swap(&mut self.value, &mut other.value);
    }
}
