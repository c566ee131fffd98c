//! # Base and strong generating set
//!
//! A [`Bsgs`] describes a permutation group `G` on `0..n` by
//!
//! - a **base** `B = (β₀, …, β_{k-1})` whose pointwise stabilizer in `G` is
//!   trivial,
//! - a **strong generating set** `S` such that `S ∩ G^(i)` generates
//!   `G^(i) = G_{β₀,…,β_{i-1}}` for every level `i`,
//! - one [`Transversal`] per base point: the orbit `U_i = β_i^{G^(i)}` with
//!   coset representatives.
//!
//! Then `|G| = ∏ |U_i|` and every element factors uniquely as
//! `u_{k-1} ⋯ u_1 u_0` (in application order), which [`Bsgs::sift`] computes.
//!
//! Strong generators and tree edges are handles into one [`PermArena`] owned
//! by the BSGS; cloning a `Bsgs` gives a fully independent copy.

use std::fmt::{self, Write};

use indenter::indented;
use itertools::Itertools;
use num::{BigUint, One, ToPrimitive};
use rand::Rng;

use crate::{
    config::TransversalKind,
    permutation::{PermArena, PermId, Permutation},
    transversal::Transversal,
};

mod elements;

pub use elements::Elements;

#[derive(Debug, Clone)]
pub struct Bsgs {
    degree: usize,
    kind: TransversalKind,
    arena: PermArena,
    base: Vec<usize>,
    transversals: Vec<Transversal>,
    generators: Vec<PermId>,
}

impl Bsgs {
    // --------------------------------------------------------------------------------------------
    // Construction and Accessors
    // --------------------------------------------------------------------------------------------

    /// The trivial group on `0..degree` with an empty base.
    pub fn new(degree: usize, kind: TransversalKind) -> Self {
        Bsgs {
            degree,
            kind,
            arena: PermArena::new(degree),
            base: Vec::new(),
            transversals: Vec::new(),
            generators: Vec::new(),
        }
    }

    /// The trivial group with the given (redundant) base.
    pub fn trivial_with_base(degree: usize, kind: TransversalKind, base: &[usize]) -> Self {
        let mut bsgs = Self::new(degree, kind);
        for &beta in base {
            bsgs.base.push(beta);
            bsgs.transversals.push(Transversal::trivial(degree, kind, beta));
        }
        bsgs
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn transversal_kind(&self) -> TransversalKind {
        self.kind
    }

    pub fn base(&self) -> &[usize] {
        &self.base
    }

    pub fn transversal(&self, level: usize) -> &Transversal {
        &self.transversals[level]
    }

    pub fn transversals(&self) -> &[Transversal] {
        &self.transversals
    }

    pub fn arena(&self) -> &PermArena {
        &self.arena
    }

    pub fn generator_ids(&self) -> &[PermId] {
        &self.generators
    }

    pub fn generators(&self) -> impl Iterator<Item = &Permutation> + '_ {
        self.generators.iter().map(|&id| &self.arena[id])
    }

    /// Owned copies of the strong generators.
    pub fn strong_generators(&self) -> Vec<Permutation> {
        self.generators().cloned().collect()
    }

    /// Orbit sizes `|U_i|`, one per base point.
    pub fn orbit_sizes(&self) -> Vec<usize> {
        self.transversals.iter().map(Transversal::size).collect()
    }

    /// Coset representative `u` at `level` with `u(β_level) = val`.
    pub fn representative(&self, level: usize, val: usize) -> Option<Permutation> {
        self.transversals[level].at(&self.arena, val)
    }

    pub fn order(&self) -> BigUint {
        self.transversals
            .iter()
            .fold(BigUint::one(), |acc, u| acc * BigUint::from(u.size()))
    }

    /// [`Bsgs::order`] if it fits into a `u64`.
    pub fn order_u64(&self) -> Option<u64> {
        self.order().to_u64()
    }

    pub fn is_trivial(&self) -> bool {
        self.transversals.iter().all(|u| u.size() == 1)
    }

    /// Whether this is the full symmetric group on `0..n`.
    pub fn is_symmetric_group(&self) -> bool {
        let factorial = (1..=self.degree).fold(BigUint::one(), |acc, k| acc * BigUint::from(k));
        self.order() == factorial
    }

    /// Strong generators fixing `B[0..level)` pointwise.
    pub fn stabilizer_generators(&self, level: usize) -> Vec<PermId> {
        let prefix = &self.base[..level];
        self.generators
            .iter()
            .copied()
            .filter(|&id| {
                let g = &self.arena[id];
                prefix.iter().all(|&b| g.apply(b) == b)
            })
            .collect()
    }

    /// Number of leading base points fixed by `g`.
    pub fn level_of(&self, g: &Permutation) -> usize {
        self.base
            .iter()
            .position(|&b| g.apply(b) != b)
            .unwrap_or(self.base.len())
    }

    // --------------------------------------------------------------------------------------------
    // Sifting
    // --------------------------------------------------------------------------------------------

    /// Strips `g` through the levels `from..to`. Returns the first level at
    /// which `g` could not be divided further (or `to`) and the residue.
    pub fn sift_range(&self, g: &Permutation, from: usize, to: usize) -> (usize, Permutation) {
        let mut h = g.clone();
        for level in from..to {
            let image = h.apply(self.base[level]);
            match self.transversals[level].at(&self.arena, image) {
                Some(u) => h.then_assign(&u.inverse()),
                None => return (level, h),
            }
        }
        (to, h)
    }

    /// Strips `g` through all levels starting at `from`.
    pub fn sift(&self, g: &Permutation, from: usize) -> (usize, Permutation) {
        self.sift_range(g, from, self.base.len())
    }

    /// Membership test.
    ///
    /// ```
    /// # use stabchain::{permutation::Permutation, api::schreier_sims_construct};
    /// let rotation = Permutation::parse_cycles(4, "(0 1 2 3)").unwrap();
    /// let c4 = schreier_sims_construct(4, &[rotation], &[]).unwrap();
    /// assert!(c4.sifts(&Permutation::parse_cycles(4, "(0 2)(1 3)").unwrap()));
    /// assert!(!c4.sifts(&Permutation::parse_cycles(4, "(0 1)").unwrap()));
    /// ```
    pub fn sifts(&self, g: &Permutation) -> bool {
        if g.len() != self.degree {
            return false;
        }
        let (level, residue) = self.sift(g, 0);
        level == self.base.len() && residue.is_identity()
    }

    // --------------------------------------------------------------------------------------------
    // Generators and Base Points
    // --------------------------------------------------------------------------------------------

    /// Smallest point moved by `g` that is not already a base point.
    pub fn choose_base_element(&self, g: &Permutation) -> Option<usize> {
        (0..self.degree).find(|&x| g.apply(x) != x && !self.base.contains(&x))
    }

    /// Adds `g` to the strong generating set.
    ///
    /// `g` is attached to the first base point it moves; if it fixes the whole
    /// base a new base point is appended. With `update_orbit` the transversals
    /// of all levels up to that one are extended, and if none of them grows the
    /// insertion is rolled back. Returns the level of `g`, or `None` when it was
    /// not kept.
    pub fn insert_generator(&mut self, g: Permutation, update_orbit: bool) -> Option<usize> {
        if g.is_identity() {
            return None;
        }
        let pos = match self.base.iter().position(|&b| g.apply(b) != b) {
            Some(pos) => pos,
            None => {
                let beta = self.choose_base_element(&g)?;
                self.push_base_point(beta);
                self.base.len() - 1
            }
        };
        let id = self.arena.alloc(g);
        self.generators.push(id);
        if !update_orbit {
            return Some(pos);
        }

        let mut grew = false;
        for level in (0..=pos).rev() {
            let gens = self.stabilizer_generators(level);
            grew |= self.transversals[level].orbit_update(&self.arena, self.base[level], &gens, id);
        }
        if grew {
            Some(pos)
        } else {
            self.pop_generator();
            None
        }
    }

    /// Recomputes the transversals of levels `0..=pos` from the current strong
    /// generators.
    pub fn update_orbits(&mut self, pos: usize) {
        if self.base.is_empty() {
            return;
        }
        for level in (0..=pos.min(self.base.len() - 1)).rev() {
            self.recompute_level(level);
        }
    }

    pub(crate) fn recompute_level(&mut self, level: usize) {
        let gens = self.stabilizer_generators(level);
        self.transversals[level].orbit(&self.arena, self.base[level], &gens);
    }

    pub(crate) fn push_base_point(&mut self, beta: usize) {
        self.base.push(beta);
        self.transversals.push(Transversal::trivial(self.degree, self.kind, beta));
    }

    /// Stores `g` as a strong generator without touching any transversal.
    pub(crate) fn push_generator(&mut self, g: Permutation) -> PermId {
        let id = self.arena.alloc(g);
        self.generators.push(id);
        id
    }

    /// Drops the most recently added strong generator and its arena slot.
    /// No transversal may refer to it.
    pub(crate) fn pop_generator(&mut self) {
        if let Some(id) = self.generators.pop() {
            self.arena.release_last(id);
        }
    }

    pub(crate) fn transversal_mut(&mut self, level: usize) -> (&mut Transversal, &PermArena) {
        (&mut self.transversals[level], &self.arena)
    }

    pub(crate) fn swap_base_points(&mut self, level: usize) {
        self.base.swap(level, level + 1);
    }

    /// Makes `beta` a base point at a position `>= min_pos` where the chain is
    /// already trivial, so that the represented group does not change. Returns
    /// the position; if `beta` already is a base point its current position is
    /// returned instead.
    pub fn insert_redundant_base_point(&mut self, beta: usize, min_pos: usize) -> usize {
        if let Some(pos) = self.base.iter().position(|&b| b == beta) {
            return pos;
        }
        let last_nontrivial = self
            .transversals
            .iter()
            .rposition(|u| u.size() > 1)
            .map_or(0, |p| p + 1);
        let pos = last_nontrivial.max(min_pos).min(self.base.len());
        self.base.insert(pos, beta);
        self.transversals
            .insert(pos, Transversal::trivial(self.degree, self.kind, beta));
        self.recompute_level(pos);
        pos
    }

    /// Removes every base point at position `>= min_pos` whose orbit is trivial.
    pub fn strip_redundant_base_points(&mut self, min_pos: usize) {
        for level in (min_pos..self.base.len()).rev() {
            if self.transversals[level].size() <= 1 {
                self.base.remove(level);
                self.transversals.remove(level);
            }
        }
    }

    /// Drops strong generators that are not needed to generate the
    /// stabilizer chain. Transversals are left as they are.
    pub fn strip_redundant_strong_generators(&mut self) {
        let mut candidates: Vec<(usize, PermId)> = self
            .generators
            .iter()
            .filter(|&&id| !self.arena[id].is_identity())
            .map(|&id| (self.level_of(&self.arena[id]), id))
            .collect();
        candidates.sort_by(|a, b| b.0.cmp(&a.0));

        let mut kept: Vec<PermId> = Vec::new();
        for (level, group) in &candidates.iter().chunk_by(|(level, _)| *level) {
            let mut pending: Vec<PermId> = group.map(|&(_, id)| id).collect();
            let target = self.transversals[level].size();
            let mut i = 0;
            while i < pending.len() {
                let without: Vec<PermId> = kept
                    .iter()
                    .chain(pending.iter().enumerate().filter(|&(j, _)| j != i).map(|(_, id)| id))
                    .copied()
                    .collect();
                let mut t = Transversal::new(self.degree, self.kind);
                t.orbit(&self.arena, self.base[level], &without);
                if t.size() == target {
                    pending.remove(i);
                } else {
                    i += 1;
                }
            }
            kept.extend(pending);
        }
        log::trace!(
            "stripped strong generators {} -> {}",
            self.generators.len(),
            kept.len()
        );
        self.generators = kept;
    }

    // --------------------------------------------------------------------------------------------
    // Group Operations
    // --------------------------------------------------------------------------------------------

    /// Uniformly random element of `G^(level)`.
    pub fn random<R: Rng + ?Sized>(&self, level: usize, rng: &mut R) -> Permutation {
        let mut g = Permutation::id(self.degree);
        for i in (level..self.base.len()).rev() {
            let u = &self.transversals[i];
            let point = u.nth_point(rng.gen_range(0..u.size()));
            if let Some(rep) = u.at(&self.arena, point) {
                g.then_assign(&rep);
            }
        }
        g
    }

    /// Replaces the group by `g⁻¹ G g`. Base points are mapped to their images.
    pub fn conjugate(&mut self, g: &Permutation) {
        self.arena.conjugate(g);
        for b in self.base.iter_mut() {
            *b = g.apply(*b);
        }
        for u in self.transversals.iter_mut() {
            u.permute(g);
        }
    }

    /// Iterates over all group elements.
    pub fn elements(&self) -> Elements<'_> {
        Elements::new(self)
    }
}

impl fmt::Display for Bsgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "BSGS of order {} on {} points", self.order(), self.degree)?;
        writeln!(f, "base: [{}]", self.base.iter().join(", "))?;
        writeln!(f, "orbit sizes: [{}]", self.orbit_sizes().iter().join(", "))?;
        write!(f, "strong generators:")?;
        for g in self.generators() {
            write!(indented(f), "\n{g}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
