//! Partition refinements.
//!
//! Each refinement is created while building the R-base, where it is applied
//! to the R-base partition and records which intersections actually split a
//! cell. During the search the same intersections are repeated on the image
//! partition, mapped by the current element, so that comparing the result
//! with the R-base partition decides whether the node can lead to a solution.

use crate::{bsgs::Bsgs, orbit, permutation::Permutation, search::partition::Partition};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Refinement {
    /// Branching step: `alpha` was split off cell `cell`. In the search every
    /// point of the image cell is tried in its place.
    Backtrack { alpha: usize, cell: usize },
    /// Orbits of the stabilizer of all fixed points in the primary group, or
    /// in the secondary group of an intersection search.
    Group {
        secondary: bool,
        orbits: Vec<Vec<usize>>,
        splits: Vec<(usize, usize)>,
    },
    /// Fixed point classes, given as they must look in the image partition.
    Classes {
        classes: Vec<Vec<usize>>,
        splits: Vec<(usize, usize)>,
    },
}

impl Refinement {
    /// Splits `alpha` off its cell in `pi`.
    pub fn backtrack(pi: &mut Partition, alpha: usize) -> Self {
        let cell = pi.cell_of(alpha);
        let split = pi.intersect(&[alpha], cell);
        debug_assert!(split, "{alpha} is already fixed in {pi}");
        Refinement::Backtrack { alpha, cell }
    }

    /// Intersects every cell of `pi` with the orbits of `G^(level)`.
    pub fn group(pi: &mut Partition, group: &Bsgs, level: usize, secondary: bool) -> Option<Self> {
        let generators: Vec<&Permutation> = group
            .stabilizer_generators(level)
            .into_iter()
            .map(|id| &group.arena()[id])
            .collect();
        let mut orbits = orbit::orbits(group.degree(), &generators);
        orbits.retain(|o| o.len() < group.degree());
        for o in orbits.iter_mut() {
            o.sort_unstable();
        }
        let splits = split_cells(pi, &orbits);
        (!splits.is_empty()).then_some(Refinement::Group {
            secondary,
            orbits,
            splits,
        })
    }

    /// Intersects every cell of `pi` with `r_base_classes`; the search will
    /// use `search_classes` in their place.
    pub fn classes(
        pi: &mut Partition,
        r_base_classes: &[Vec<usize>],
        search_classes: &[Vec<usize>],
    ) -> Option<Self> {
        let r_base: Vec<Vec<usize>> = r_base_classes.iter().map(|c| sorted(c)).collect();
        let splits = split_cells(pi, &r_base);
        (!splits.is_empty()).then(|| Refinement::Classes {
            classes: search_classes.iter().map(|c| sorted(c)).collect(),
            splits,
        })
    }

    pub fn is_backtrack(&self) -> bool {
        matches!(self, Refinement::Backtrack { .. })
    }

    /// Repeats the recorded intersections on `pi`, with group orbits mapped
    /// by `t`. Returns the number of intersections that split a cell.
    ///
    /// Backtrack steps have no fixed image; use [`Partition::intersect`]
    /// with the chosen point instead.
    pub fn apply_mapped(&self, pi: &mut Partition, t: &Permutation) -> usize {
        match self {
            Refinement::Backtrack { .. } => 0,
            Refinement::Group { orbits, splits, .. } => splits
                .iter()
                .filter(|&&(k, c)| pi.intersect(&t.apply_set(&orbits[k]), c))
                .count(),
            Refinement::Classes { classes, splits } => splits
                .iter()
                .filter(|&&(k, c)| pi.intersect(&classes[k], c))
                .count(),
        }
    }

    /// Reverts `count` intersections.
    pub fn undo(pi: &mut Partition, count: usize) {
        for _ in 0..count {
            pi.undo_intersection();
        }
    }
}

fn sorted(set: &[usize]) -> Vec<usize> {
    let mut set = set.to_vec();
    set.sort_unstable();
    set.dedup();
    set
}

/// Intersects each cell, including cells created on the way, with each set.
fn split_cells(pi: &mut Partition, sets: &[Vec<usize>]) -> Vec<(usize, usize)> {
    let mut splits = Vec::new();
    for (k, set) in sets.iter().enumerate() {
        let mut c = 0;
        while c < pi.cells() {
            if pi.intersect(set, c) {
                splits.push((k, c));
            }
            c += 1;
        }
    }
    splits
}
