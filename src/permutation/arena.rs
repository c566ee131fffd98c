//! Append-only storage for the permutations shared inside one BSGS.
//!
//! Strong generators and Schreier-tree edge labels refer to the same
//! permutation many times; they hold a [`PermId`] instead of a copy.

use super::Permutation;
use crate::define_indexed_vec;

define_indexed_vec!(
    /// Handle of a permutation stored in a [`PermArena`].
    pub struct PermId;

    pub struct PermVec;
);

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "bincode", derive(bincode::Encode, bincode::Decode))]
pub struct PermArena {
    degree: usize,
    perms: PermVec<Permutation>,
}

impl PermArena {
    pub fn new(degree: usize) -> Self {
        PermArena {
            degree,
            perms: PermVec::new(),
        }
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn len(&self) -> usize {
        self.perms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.perms.is_empty()
    }

    /// Stores `p` and returns its handle. Stored permutations are never
    /// modified afterwards, except by [`PermArena::conjugate`].
    pub fn alloc(&mut self, p: Permutation) -> PermId {
        assert_eq!(p.len(), self.degree, "arena holds permutations of degree {}", self.degree);
        self.perms.push(p)
    }

    /// Frees the slot of `id` if it is the most recent allocation. Any other
    /// handle is left alone, since later handles would be shifted.
    pub fn release_last(&mut self, id: PermId) -> bool {
        if id.0 + 1 != self.perms.len() {
            return false;
        }
        self.perms.pop();
        true
    }

    pub fn get(&self, id: PermId) -> Option<&Permutation> {
        self.perms.get(id)
    }

    /// Replaces every stored `p` by `g⁻¹ p g`; all handles stay valid.
    pub fn conjugate(&mut self, g: &Permutation) {
        self.perms = self.perms.map_values(|p| p.conjugate_by(g));
    }
}

impl std::ops::Index<PermId> for PermArena {
    type Output = Permutation;

    fn index(&self, id: PermId) -> &Permutation {
        &self.perms[id]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conjugation_keeps_handles() {
        let mut arena = PermArena::new(3);
        let a = arena.alloc(Permutation::parse_cycles(3, "(0 1)").unwrap());
        let b = arena.alloc(Permutation::id(3));
        assert_eq!(a, PermId(0));
        assert_eq!(b.to_string(), "#1");

        let g = Permutation::parse_cycles(3, "(1 2)").unwrap();
        arena.conjugate(&g);
        assert_eq!(arena[a], Permutation::parse_cycles(3, "(0 2)").unwrap());
        assert!(arena[b].is_identity());
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.get(PermId(2)), None);
    }

    #[test]
    fn only_the_last_slot_is_released() {
        let mut arena = PermArena::new(3);
        let a = arena.alloc(Permutation::parse_cycles(3, "(0 1)").unwrap());
        let b = arena.alloc(Permutation::parse_cycles(3, "(1 2)").unwrap());
        assert!(!arena.release_last(a));
        assert!(arena.release_last(b));
        assert_eq!(arena.len(), 1);
        assert_eq!(arena.alloc(Permutation::id(3)), b);
    }

    #[test]
    #[should_panic]
    fn rejects_wrong_degree() {
        PermArena::new(3).alloc(Permutation::id(4));
    }
}
