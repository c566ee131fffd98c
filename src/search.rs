//! # Backtrack search
//!
//! Both search flavours walk a tree whose nodes at depth `l` correspond to
//! the possible images of the first `l` base points, and collect the elements
//! satisfying a [`SubgroupPredicate`]:
//!
//! - [`classic::BacktrackSearch`]: the tree of the stabilizer chain itself,
//!   pruned by [`SubgroupPredicate::child_restriction`].
//! - [`partition::r_base::RBaseSearch`]: partition backtracking over an
//!   R-base, where refinements prune far more aggressively.
//!
//! In subgroup mode two groups are grown while searching: `K`, the part of
//! the result found so far, and `L`, a copy whose base is changed to test
//! double coset minimality. In representative mode the search stops at the
//! first element found.
//!
//! [`lex_min`] finds the smallest image of a set, which is not a backtrack
//! search over a predicate but shares the base change machinery.

use bitvec::vec::BitVec;
use derive_more::Display;

use crate::{
    bsgs::Bsgs,
    change::ConjugatingBaseChange,
    config::{SearchConfig, TransversalKind},
    construct::schreier_sims,
    permutation::Permutation,
    predicate::SubgroupPredicate,
    sorter::BaseSorter,
};

pub mod classic;
pub mod lex_min;
pub mod partition;

/// Counters collected during one search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display)]
#[display(
    fmt = "{} nodes, {} leaves, pruned: {} by restriction, {} by orbit size, {} by double coset",
    nodes,
    leaves,
    pruned_restriction,
    pruned_orbit,
    pruned_double_coset
)]
pub struct SearchStats {
    pub nodes: usize,
    pub leaves: usize,
    pub pruned_restriction: usize,
    pub pruned_orbit: usize,
    pub pruned_double_coset: usize,
}

/// Result of [`crate::api::backtrack_search`].
#[derive(Debug, Clone)]
pub enum SearchOutcome {
    Subgroup(Bsgs),
    Representative(Option<Permutation>),
}

/// Level from which on whole stabilizers satisfy the predicate.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LeafLimit {
    pub(crate) level: usize,
    pub(crate) base: usize,
}

/// State shared by both search flavours.
pub(crate) struct SearchCore<'p> {
    pub(crate) group: Bsgs,
    pub(crate) predicate: &'p dyn SubgroupPredicate,
    pub(crate) config: SearchConfig,
    pub(crate) sorter: BaseSorter,
    pub(crate) base_change: ConjugatingBaseChange,
    pub(crate) limit: Option<LeafLimit>,
    pub(crate) subgroup_base: Vec<usize>,
    /// `K`
    pub(crate) subgroup: Bsgs,
    /// `L`
    pub(crate) aux: Bsgs,
    pub(crate) found: Option<Permutation>,
    pub(crate) stats: SearchStats,
}

impl<'p> SearchCore<'p> {
    pub(crate) fn new(group: Bsgs, predicate: &'p dyn SubgroupPredicate, config: SearchConfig) -> Self {
        let degree = group.degree();
        SearchCore {
            sorter: BaseSorter::new(degree, group.base()),
            subgroup: Bsgs::new(degree, TransversalKind::SchreierTree),
            aux: Bsgs::new(degree, TransversalKind::SchreierTree),
            base_change: ConjugatingBaseChange::new(config.base_transpose),
            group,
            predicate,
            config,
            limit: None,
            subgroup_base: Vec::new(),
            found: None,
            stats: SearchStats::default(),
        }
    }

    /// Resets `K` and `L` to the trivial group with base `subgroup_base`.
    pub(crate) fn setup_empty_subgroup(&mut self, subgroup_base: Vec<usize>) {
        let degree = self.group.degree();
        self.subgroup = Bsgs::trivial_with_base(degree, TransversalKind::SchreierTree, &subgroup_base);
        self.aux = self.subgroup.clone();
        self.subgroup_base = subgroup_base;
        self.found = None;
    }

    pub(crate) fn is_limit_leaf(&self, level: usize) -> bool {
        self.limit.is_some_and(|limit| level >= limit.level)
    }

    /// Handles a complete element `t`. Returns the level to unwind to: `0`
    /// stops a representative search, `level` continues with the next
    /// sibling.
    pub(crate) fn process_leaf(&mut self, t: &Permutation, level: usize, completed: usize) -> usize {
        self.stats.leaves += 1;
        if !self.predicate.test(t) {
            return level;
        }
        if self.config.stop_after_first {
            self.found = Some(t.clone());
            return 0;
        }

        let is_identity = t.is_identity();
        match self.limit {
            Some(limit) if level == limit.level && is_identity => {
                let generators: Vec<Permutation> = self
                    .group
                    .stabilizer_generators(limit.base)
                    .into_iter()
                    .map(|id| self.group.arena()[id].clone())
                    .collect();
                for g in &generators {
                    debug_assert!(self.predicate.test(g), "{g} below the limit fails the predicate");
                    log::trace!("limit generator {g}");
                    self.subgroup.insert_generator(g.clone(), true);
                }
                self.extend_aux(generators);
            }
            _ if !is_identity => {
                log::trace!("new subgroup element {t}");
                self.subgroup.insert_generator(t.clone(), true);
                self.extend_aux([t.clone()]);
            }
            _ => {}
        }
        completed
    }

    /// Adds `generators` to `L` and completes its chain again on the current
    /// base of `L`. Base changes move that base away from the one of `K`, so
    /// inserting the generators level by level would not give a valid chain.
    fn extend_aux(&mut self, generators: impl IntoIterator<Item = Permutation>) {
        let mut all = self.aux.strong_generators();
        all.extend(generators);
        self.aux = schreier_sims(self.group.degree(), TransversalKind::SchreierTree, &all, self.aux.base());
        log::trace!("auxiliary group now has order {}", self.aux.order());
    }

    /// Whether `beta_i` is the smallest point in the orbit of `alpha` under
    /// the stabilizer of the first `i` base points of `L`.
    pub(crate) fn min_orbit(&self, alpha: usize, i: usize, beta_i: usize) -> bool {
        let generators: Vec<&Permutation> = self
            .aux
            .stabilizer_generators(i)
            .into_iter()
            .map(|id| &self.aux.arena()[id])
            .collect();
        if generators.is_empty() {
            return alpha == beta_i || self.sorter.less(beta_i, alpha);
        }

        let mut seen: BitVec = BitVec::repeat(false, self.group.degree());
        seen.set(alpha, true);
        let mut orbit = vec![alpha];
        let mut next = 0;
        while next < orbit.len() {
            let beta = orbit[next];
            next += 1;
            for g in &generators {
                let image = g.apply(beta);
                if !seen[image] {
                    seen.set(image, true);
                    orbit.push(image);
                    if self.sorter.less(image, beta_i) {
                        return false;
                    }
                }
            }
        }
        true
    }

    /// Double coset minimality test for the node reached by `t` at
    /// `backtrack_level`. Returns `true` if the node can be skipped.
    pub(crate) fn prune_double_coset(&mut self, t: &Permutation, backtrack_level: usize) -> bool {
        if backtrack_level < self.config.pruning_level_dcm {
            let images: Vec<usize> = self.subgroup_base[..=backtrack_level]
                .iter()
                .map(|&b| t.apply(b))
                .collect();
            self.base_change.change(&mut self.aux, &images, false);
        }

        let alpha = self.subgroup_base[backtrack_level];
        for i in 0..=backtrack_level {
            let beta_i = t.apply(self.subgroup_base[i]);
            if (i == backtrack_level || self.subgroup.transversal(i).contains(alpha))
                && !self.min_orbit(t.apply(alpha), i, beta_i)
            {
                return true;
            }
            if self.aux.base().get(i) != Some(&beta_i) {
                return false;
            }
        }
        false
    }

    pub(crate) fn finish_subgroup(&mut self) -> Bsgs {
        let mut subgroup = std::mem::replace(
            &mut self.subgroup,
            Bsgs::new(self.group.degree(), TransversalKind::SchreierTree),
        );
        subgroup.strip_redundant_base_points(0);
        log::debug!(
            "search finished with subgroup of order {} ({})",
            subgroup.order(),
            self.stats
        );
        subgroup
    }
}

#[cfg(test)]
mod tests;
