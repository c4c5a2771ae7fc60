//! Read/write role tracking for the two particle buffer sets

use std::ops::{Index, IndexMut};

/// Names one of the two particle buffer sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetIndex {
    A,
    B,
}

impl SetIndex {
    /// The complementary set. This is the only place the pairing is computed.
    pub fn other(self) -> Self {
        match self {
            SetIndex::A => SetIndex::B,
            SetIndex::B => SetIndex::A,
        }
    }

    pub fn index(self) -> usize {
        match self {
            SetIndex::A => 0,
            SetIndex::B => 1,
        }
    }
}

impl std::fmt::Display for SetIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SetIndex::A => f.write_str("A"),
            SetIndex::B => f.write_str("B"),
        }
    }
}

/// A two-element array addressed by [`SetIndex`]
#[derive(Debug, Clone, PartialEq)]
pub struct SetPair<T> {
    items: [T; 2],
}

impl<T> SetPair<T> {
    pub fn new(a: T, b: T) -> Self {
        Self { items: [a, b] }
    }

    pub fn from_fn(mut f: impl FnMut(SetIndex) -> T) -> Self {
        Self::new(f(SetIndex::A), f(SetIndex::B))
    }

    pub fn iter(&self) -> impl Iterator<Item = (SetIndex, &T)> {
        [SetIndex::A, SetIndex::B]
            .into_iter()
            .zip(self.items.iter())
    }

    /// Borrow the read set immutably and the write set mutably at once
    pub fn split(&mut self, read: SetIndex) -> (&T, &mut T) {
        let [a, b] = &mut self.items;
        match read {
            SetIndex::A => (&*a, b),
            SetIndex::B => (&*b, a),
        }
    }
}

impl<T> Index<SetIndex> for SetPair<T> {
    type Output = T;
    fn index(&self, index: SetIndex) -> &T {
        &self.items[index.index()]
    }
}

impl<T> IndexMut<SetIndex> for SetPair<T> {
    fn index_mut(&mut self, index: SetIndex) -> &mut T {
        &mut self.items[index.index()]
    }
}

/// Which set is this frame's simulation input; the write target is always the other one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferRoles {
    read: SetIndex,
}

impl Default for BufferRoles {
    /// Set A holds the seeded data, so the first frame reads A and writes B
    fn default() -> Self {
        Self { read: SetIndex::A }
    }
}

impl BufferRoles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(&self) -> SetIndex {
        self.read
    }

    pub fn write(&self) -> SetIndex {
        self.read.other()
    }

    /// Swap roles after a completed frame
    pub fn flip(&mut self) {
        self.read = self.read.other();
    }

    /// Back to the initial roles, used after set A is reseeded
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn other_is_an_involution() {
        for idx in [SetIndex::A, SetIndex::B] {
            assert_ne!(idx, idx.other());
            assert_eq!(idx, idx.other().other());
        }
    }

    #[test]
    fn roles_start_reading_a() {
        let roles = BufferRoles::new();
        assert_eq!(roles.read(), SetIndex::A);
        assert_eq!(roles.write(), SetIndex::B);
    }

    #[test]
    fn roles_alternate_and_never_alias() {
        let mut roles = BufferRoles::new();
        let mut previous = roles.read();
        for _ in 0..100 {
            roles.flip();
            assert_eq!(roles.read(), previous.other());
            assert_ne!(roles.read(), roles.write());
            assert_eq!(roles.read().index() + roles.write().index(), 1);
            previous = roles.read();
        }
        roles.reset();
        assert_eq!(roles.read(), SetIndex::A);
    }

    #[test]
    fn pair_indexing_and_split() {
        let mut pair = SetPair::from_fn(|idx| idx.index() * 10);
        assert_eq!(pair[SetIndex::A], 0);
        assert_eq!(pair[SetIndex::B], 10);

        let (read, write) = pair.split(SetIndex::B);
        assert_eq!(*read, 10);
        *write = 7;
        assert_eq!(pair[SetIndex::A], 7);

        let labels: Vec<_> = pair.iter().map(|(idx, v)| (idx.to_string(), *v)).collect();
        assert_eq!(labels, vec![("A".to_string(), 7), ("B".to_string(), 10)]);
    }
}
