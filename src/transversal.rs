//! Coset representatives for one level of a stabilizer chain.
//!
//! A transversal of `β` under a group `H` stores the orbit `β^H` together
//! with, for every orbit point `γ`, a way to produce some `u_γ ∈ H` with
//! `β^{u_γ} = γ`. Schreier trees store arena handles of the tree edges;
//! explicit transversals own their representatives, so recomputing a level
//! never allocates in the arena.

use std::cell::Cell;

use crate::{
    config::TransversalKind,
    orbit::{self, OrbitSet, PointAction},
    permutation::{PermArena, PermId, Permutation},
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Entry {
    Root,
    /// Generator `g` with `g(pred) = point`.
    Edge(PermId),
    Representative(Permutation),
}

#[derive(Debug, Clone)]
pub struct Transversal {
    kind: TransversalKind,
    points: OrbitSet<usize>,
    entries: Vec<Option<Entry>>,
    max_depth: Cell<usize>,
}

impl Transversal {
    /// An empty transversal; it has no root until [`Transversal::orbit`] is called.
    pub fn new(degree: usize, kind: TransversalKind) -> Self {
        Transversal {
            kind,
            points: OrbitSet::default(),
            entries: vec![None; degree],
            max_depth: Cell::new(0),
        }
    }

    /// The transversal of `beta` under the trivial group.
    pub fn trivial(degree: usize, kind: TransversalKind, beta: usize) -> Self {
        let mut t = Self::new(degree, kind);
        t.points.insert(beta);
        t.entries[beta] = Some(Entry::Root);
        t
    }

    pub fn kind(&self) -> TransversalKind {
        self.kind
    }

    pub fn degree(&self) -> usize {
        self.entries.len()
    }

    pub fn size(&self) -> usize {
        self.points.len()
    }

    pub fn root(&self) -> Option<usize> {
        self.points.first().copied()
    }

    #[inline]
    pub fn contains(&self, val: usize) -> bool {
        self.entries[val].is_some()
    }

    /// Orbit points in discovery order, starting with the root.
    pub fn points(&self) -> impl Iterator<Item = usize> + '_ {
        self.points.iter().copied()
    }

    /// The `i`-th orbit point in discovery order.
    pub fn nth_point(&self, i: usize) -> usize {
        self.points[i]
    }

    /// Longest root path walked by [`Transversal::at`] so far.
    pub fn max_depth(&self) -> usize {
        self.max_depth.get()
    }

    /// Recomputes the transversal from scratch as the orbit of `beta`.
    pub fn orbit(&mut self, arena: &PermArena, beta: usize, generators: &[PermId]) {
        self.points.clear();
        self.entries.iter_mut().for_each(|e| *e = None);
        self.points.insert(beta);
        self.entries[beta] = Some(Entry::Root);

        let keyed: Vec<(PermId, &Permutation)> = generators.iter().map(|&id| (id, &arena[id])).collect();
        let mut found = Vec::new();
        orbit::closure(&mut self.points, 0, &keyed, &PointAction, |&from, id, &to| {
            found.push((from, id, to))
        });
        self.record(arena, found);
    }

    /// Extends the orbit of `beta` after `new_generator` was added to a
    /// generating set that already contains it. Existing entries are kept.
    /// Returns `true` if the orbit grew.
    pub fn orbit_update(
        &mut self,
        arena: &PermArena,
        beta: usize,
        generators: &[PermId],
        new_generator: PermId,
    ) -> bool {
        if self.points.is_empty() {
            self.orbit(arena, beta, generators);
            return self.size() > 1;
        }
        debug_assert_eq!(self.root(), Some(beta));

        let keyed: Vec<(PermId, &Permutation)> = generators.iter().map(|&id| (id, &arena[id])).collect();
        let mut found = Vec::new();
        let grew = orbit::orbit_update(
            &mut self.points,
            &keyed,
            (new_generator, &arena[new_generator]),
            &PointAction,
            |&from, id, &to| found.push((from, id, to)),
        );
        self.record(arena, found);
        grew
    }

    fn record(&mut self, arena: &PermArena, found: Vec<(usize, PermId, usize)>) {
        for (from, id, to) in found {
            let entry = match self.kind {
                TransversalKind::SchreierTree => Entry::Edge(id),
                TransversalKind::Explicit => Entry::Representative(match &self.entries[from] {
                    Some(Entry::Representative(r)) => r.then(&arena[id]),
                    _ => arena[id].clone(),
                }),
            };
            self.entries[to] = Some(entry);
        }
    }

    /// A coset representative `u` with `u(root) = val`, or `None` if `val` is
    /// not in the orbit.
    pub fn at(&self, arena: &PermArena, val: usize) -> Option<Permutation> {
        match self.entries[val].as_ref()? {
            Entry::Root => Some(Permutation::id(self.degree())),
            Entry::Representative(rep) => Some(rep.clone()),
            Entry::Edge(_) => {
                let mut rep = Permutation::id(self.degree());
                let mut point = val;
                let mut depth = 0;
                while let Some(Entry::Edge(id)) = &self.entries[point] {
                    let g = &arena[*id];
                    rep = g.then(&rep);
                    point = g.apply_inverse(point);
                    depth += 1;
                }
                if depth > self.max_depth.get() {
                    self.max_depth.set(depth);
                }
                Some(rep)
            }
        }
    }

    /// Relabels the transversal after the arena was conjugated by `g`, so that
    /// it becomes the transversal of `g(root)`. Explicit representatives are
    /// conjugated here.
    pub fn permute(&mut self, g: &Permutation) {
        let mut entries = vec![None; self.degree()];
        for (x, e) in self.entries.drain(..).enumerate() {
            entries[g.apply(x)] = e.map(|e| match e {
                Entry::Representative(rep) => Entry::Representative(rep.conjugate_by(g)),
                other => other,
            });
        }
        self.entries = entries;
        self.points = self.points.iter().map(|&x| g.apply(x)).collect();
    }
}
