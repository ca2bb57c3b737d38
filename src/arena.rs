use core::num::NonZeroU32;

/// Handle to a node slot in an [`Arena`].
///
/// Stored off-by-one so that `Option<NodeId>` costs nothing over `NodeId`; the `None` niche is what
/// the tree uses as its sentinel.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub(crate) struct NodeId(NonZeroU32);

impl NodeId {
    pub(crate) const MAX: usize = (u32::MAX - 1) as usize;

    #[inline]
    fn from_index(index: usize) -> Self {
        assert!(index <= Self::MAX, "node index {index} out of range");
        let raw = u32::try_from(index + 1).expect("checked against `NodeId::MAX`");
        NodeId(NonZeroU32::new(raw).expect("`index + 1` is never zero"))
    }

    #[inline]
    fn index(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

/// A slab of `T`s addressed by [`NodeId`], with freed slots recycled.
pub(crate) struct Arena<T> {
    slots: Vec<Option<T>>,
    free: Vec<NodeId>,
}

impl<T> Arena<T> {
    pub(crate) const fn new() -> Self {
        Arena {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Number of live elements.
    pub(crate) fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub(crate) fn alloc(&mut self, element: T) -> NodeId {
        if let Some(id) = self.free.pop() {
            let slot = &mut self.slots[id.index()];
            debug_assert!(slot.is_none(), "free list handed out a live slot");
            *slot = Some(element);
            return id;
        }

        let id = NodeId::from_index(self.slots.len());
        self.slots.push(Some(element));
        id
    }

    #[inline]
    pub(crate) fn get(&self, id: NodeId) -> &T {
        self.slots[id.index()]
            .as_ref()
            .expect("stale node handle")
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: NodeId) -> &mut T {
        self.slots[id.index()]
            .as_mut()
            .expect("stale node handle")
    }

    /// Borrows two distinct elements mutably at once.
    pub(crate) fn get_pair_mut(&mut self, a: NodeId, b: NodeId) -> (&mut T, &mut T) {
        assert_ne!(a, b, "`get_pair_mut` needs two distinct handles");

        let (lo, hi, swapped) = if a.index() < b.index() {
            (a, b, false)
        } else {
            (b, a, true)
        };

        let (head, tail) = self.slots.split_at_mut(hi.index());
        let lo = head[lo.index()].as_mut().expect("stale node handle");
        let hi = tail[0].as_mut().expect("stale node handle");

        if swapped {
            (hi, lo)
        } else {
            (lo, hi)
        }
    }

    /// Removes the element behind `id` and recycles its slot.
    pub(crate) fn take(&mut self, id: NodeId) -> T {
        let element = self.slots[id.index()].take().expect("stale node handle");
        self.free.push(id);
        element
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }
}

#[cfg(test)]
mod tests {
    use core::mem::size_of;

    use proptest::prelude::*;

    use super::*;

    #[test]
    fn node_id_niche() {
        assert_eq!(size_of::<Option<NodeId>>(), size_of::<NodeId>());
    }

    #[test]
    fn freed_slots_are_reused() {
        let mut arena = Arena::new();
        let a = arena.alloc(1);
        let b = arena.alloc(2);
        assert_eq!(arena.take(a), 1);
        assert_eq!(arena.len(), 1);

        let c = arena.alloc(3);
        assert_eq!(c, a);
        assert_eq!(*arena.get(b), 2);
        assert_eq!(*arena.get(c), 3);
    }

    #[test]
    fn pair_mut_preserves_argument_order() {
        let mut arena = Arena::new();
        let a = arena.alloc('a');
        let b = arena.alloc('b');

        let (x, y) = arena.get_pair_mut(b, a);
        assert_eq!((*x, *y), ('b', 'a'));
        core::mem::swap(x, y);

        assert_eq!(*arena.get(a), 'b');
        assert_eq!(*arena.get(b), 'a');
    }

    #[test]
    #[should_panic(expected = "stale node handle")]
    fn stale_handle_panics() {
        let mut arena = Arena::new();
        let a = arena.alloc(0u8);
        arena.take(a);
        arena.get(a);
    }

    #[derive(Clone, Debug)]
    enum Operation {
        Alloc(u32),
        Get(usize),
        Take(usize),
        Clear,
    }

    fn strategy() -> impl Strategy<Value = Operation> {
        prop_oneof![
            20 => any::<u32>().prop_map(Operation::Alloc),
            5 => any::<usize>().prop_map(Operation::Get),
            5 => any::<usize>().prop_map(Operation::Take),
            1 => Just(Operation::Clear),
        ]
    }

    proptest! {
        #[test]
        fn arena_behaves_like_vec(operations in prop::collection::vec(strategy(), 0..256)) {
            let mut model: Vec<(NodeId, u32)> = Vec::new();
            let mut arena: Arena<u32> = Arena::new();

            for operation in operations {
                match operation {
                    Operation::Alloc(value) => {
                        let id = arena.alloc(value);
                        model.push((id, value));
                    }
                    Operation::Get(which) if !model.is_empty() => {
                        let (id, value) = model[which % model.len()];
                        prop_assert_eq!(*arena.get(id), value);
                    }
                    Operation::Take(which) if !model.is_empty() => {
                        let (id, value) = model.swap_remove(which % model.len());
                        prop_assert_eq!(arena.take(id), value);
                    }
                    Operation::Get(_) | Operation::Take(_) => {}
                    Operation::Clear => {
                        arena.clear();
                        model.clear();
                    }
                }

                prop_assert_eq!(arena.len(), model.len());
            }
        }
    }
}
