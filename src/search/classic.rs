use crate::{
    bsgs::Bsgs,
    config::SearchConfig,
    permutation::Permutation,
    predicate::SubgroupPredicate,
    search::{LeafLimit, SearchCore, SearchStats},
    sorter::BaseSorter,
};

/// Backtrack search over the stabilizer chain of a group.
///
/// The tree has one level per base point; the children of a node `t` at
/// level `l` are the elements `u·t` for the coset representatives `u` of
/// level `l`, visited in the order of their images of `β_l`.
///
/// ```
/// # use stabchain::{api::schreier_sims_construct, config::SearchConfig, permutation::Permutation};
/// # use stabchain::{predicate::SetwiseStabilizer, search::classic::BacktrackSearch};
/// let gens = [
///     Permutation::parse_cycles(5, "(0 1 2 3 4)").unwrap(),
///     Permutation::parse_cycles(5, "(0 1)").unwrap(),
/// ];
/// let s5 = schreier_sims_construct(5, &gens, &[]).unwrap();
/// let predicate = SetwiseStabilizer::new(5, &[0, 1]);
/// let (stabilizer, _) = BacktrackSearch::new(&s5, &predicate, SearchConfig::default()).search();
/// assert_eq!(stabilizer.order_u64(), Some(12));
/// ```
pub struct BacktrackSearch<'p> {
    core: SearchCore<'p>,
}

impl<'p> BacktrackSearch<'p> {
    /// Prepares a search in a copy of `group`. The copy's base is changed to
    /// start with [`SubgroupPredicate::base_prefix`].
    pub fn new(group: &Bsgs, predicate: &'p dyn SubgroupPredicate, config: SearchConfig) -> Self {
        let mut core = SearchCore::new(group.clone(), predicate, config);
        if let Some(prefix) = predicate.base_prefix() {
            let placed = core.base_change.change(&mut core.group, &prefix, false);
            let limit = predicate.limit();
            if limit < core.group.base().len() {
                core.limit = Some(LeafLimit {
                    level: limit,
                    base: placed,
                });
            }
        }
        core.sorter = BaseSorter::new(group.degree(), core.group.base());
        log::debug!(
            "backtrack search in group of order {} with base {:?}",
            core.group.order(),
            core.group.base()
        );
        BacktrackSearch { core }
    }

    /// All group elements satisfying the predicate, which must describe a
    /// subgroup.
    pub fn search(mut self) -> (Bsgs, SearchStats) {
        self.core.config.stop_after_first = false;
        self.run();
        let subgroup = self.core.finish_subgroup();
        (subgroup, self.core.stats)
    }

    /// Some group element satisfying the predicate, which may describe a
    /// coset.
    pub fn search_coset_representative(mut self) -> (Option<Permutation>, SearchStats) {
        self.core.config.stop_after_first = true;
        self.run();
        log::debug!("representative search finished ({})", self.core.stats);
        (self.core.found.take(), self.core.stats)
    }

    fn run(&mut self) {
        let base = self.core.group.base().to_vec();
        let mut completed = base.len();
        self.core.setup_empty_subgroup(base);
        let identity = Permutation::id(self.core.group.degree());
        self.search_node(&identity, 0, &mut completed);
    }

    /// Returns the level to continue at; `0` after a representative was
    /// found.
    fn search_node(&mut self, t: &Permutation, level: usize, completed: &mut usize) -> usize {
        let core = &mut self.core;
        core.stats.nodes += 1;
        if level == core.group.base().len() || core.is_limit_leaf(level) {
            return core.process_leaf(t, level, *completed);
        }

        let base_point = core.group.base()[level];
        let mut images: Vec<usize> = core
            .group
            .transversal(level)
            .points()
            .map(|gamma| t.apply(gamma))
            .collect();
        core.sorter.sort(&mut images);

        let mut remaining = images.len();
        for image in images {
            let core = &mut self.core;
            if remaining < core.subgroup.transversal(level).size() {
                core.stats.pruned_orbit += remaining;
                break;
            }
            remaining -= 1;

            let Some(u) = core.group.representative(level, t.apply_inverse(image)) else {
                unreachable!("{image} is the image of an orbit point");
            };
            let child = u.then(t);
            if !core.predicate.child_restriction(&child, level, base_point) {
                core.stats.pruned_restriction += 1;
                if core.config.break_after_child_restriction {
                    break;
                }
                continue;
            }
            if core.config.pruning_level_dcm > 0 && core.prune_double_coset(&child, level) {
                core.stats.pruned_double_coset += 1;
                continue;
            }

            let ret = self.search_node(&child, level + 1, completed);
            if self.core.config.stop_after_first && ret == 0 {
                return 0;
            }
            if ret < level {
                return ret;
            }
        }

        *completed = (*completed).min(level);
        level
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::TransversalKind,
        construct::schreier_sims,
        predicate::{PointwiseStabilizer, SetImage, SetwiseStabilizer},
    };

    fn cyc(n: usize, s: &str) -> Permutation {
        Permutation::parse_cycles(n, s).unwrap()
    }

    fn symmetric(n: usize) -> Bsgs {
        let cycle = format!("({})", (0..n).map(|i| i.to_string()).collect::<Vec<_>>().join(" "));
        schreier_sims(
            n,
            TransversalKind::SchreierTree,
            &[cyc(n, &cycle), cyc(n, "(0 1)")],
            &[],
        )
    }

    #[test]
    fn set_stabilizer_in_s6() {
        let g = symmetric(6);
        let predicate = SetwiseStabilizer::new(6, &[1, 4, 5]);
        let config = SearchConfig {
            break_after_child_restriction: true,
            ..SearchConfig::default()
        };
        let (k, stats) = BacktrackSearch::new(&g, &predicate, config).search();
        assert_eq!(k.order_u64(), Some(36));
        assert!(k.generators().all(|g| predicate.test(g)));
        assert!(stats.nodes > 0);
    }

    #[test]
    fn pointwise_stabilizer_uses_the_limit() {
        let g = symmetric(5);
        let predicate = PointwiseStabilizer::new(5, &[2, 0]);
        let (k, stats) = BacktrackSearch::new(&g, &predicate, SearchConfig::default()).search();
        assert_eq!(k.order_u64(), Some(6));
        assert!(stats.leaves <= 3);
    }

    #[test]
    fn dcm_pruning_does_not_change_the_result() {
        let g = schreier_sims(
            8,
            TransversalKind::SchreierTree,
            &[cyc(8, "(0 1 2 3)(4 5 6 7)"), cyc(8, "(0 4)(1 5)"), cyc(8, "(1 3)")],
            &[],
        );
        let predicate = SetwiseStabilizer::new(8, &[0, 2, 5]);
        let orders: Vec<_> = [0, 1, 3, 100]
            .into_iter()
            .map(|level| {
                let config = SearchConfig::with_pruning_level(level);
                BacktrackSearch::new(&g, &predicate, config).search().0.order()
            })
            .collect();
        assert!(orders.windows(2).all(|w| w[0] == w[1]), "{orders:?}");
    }

    #[test]
    fn representatives() {
        let g = symmetric(4);
        let predicate = SetImage::new(4, &[0, 1], &[2, 3]);
        let (found, _) = BacktrackSearch::new(&g, &predicate, SearchConfig::default().representative()).search_coset_representative();
        let t = found.unwrap();
        assert_eq!(t.apply_set(&[0, 1]), vec![2, 3]);

        let c4 = schreier_sims(4, TransversalKind::SchreierTree, &[cyc(4, "(0 1 2 3)")], &[]);
        let predicate = SetImage::new(4, &[0, 1], &[0, 2]);
        let (found, _) = BacktrackSearch::new(&c4, &predicate, SearchConfig::default().representative()).search_coset_representative();
        assert_eq!(found, None);
    }
}
