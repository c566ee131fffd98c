use crate::{
    bsgs::Bsgs,
    config::SearchConfig,
    permutation::Permutation,
    predicate::SubgroupPredicate,
    search::{
        partition::{refinement::Refinement, Partition},
        SearchCore, SearchStats,
    },
    sorter::BaseSorter,
};

/// Where the refinements of the R-base come from.
enum Family {
    Group,
    SecondaryGroup,
    Classes {
        r_base: Vec<Vec<usize>>,
        search: Vec<Vec<usize>>,
    },
}

/// One refinement of the R-base together with the shape of the partition
/// after it.
struct Step {
    refinement: Refinement,
    cells: usize,
    fix_count: usize,
}

struct RBase {
    steps: Vec<Step>,
    /// Fixed points of the final, discrete R-base partition.
    fix_sequence: Vec<usize>,
    /// The points split off by backtrack steps.
    subgroup_base: Vec<usize>,
}

/// Partition backtrack search.
///
/// First a sequence of refinements, the R-base, is computed that turns the
/// unit partition into a discrete one. The search then applies the same
/// refinements to an image partition, branching only at backtrack steps,
/// and keeps a group element `t` that maps the R-base partition's fixed
/// points onto the image's.
pub struct RBaseSearch<'p> {
    core: SearchCore<'p>,
    secondary: Option<Bsgs>,
    classes: Option<(Vec<Vec<usize>>, Vec<Vec<usize>>)>,
    group_level: usize,
    secondary_level: usize,
    image: Partition,
    completed: usize,
}

impl<'p> RBaseSearch<'p> {
    pub fn new(group: &Bsgs, predicate: &'p dyn SubgroupPredicate, config: SearchConfig) -> Self {
        RBaseSearch {
            core: SearchCore::new(group.clone(), predicate, config),
            secondary: None,
            classes: None,
            group_level: 0,
            secondary_level: 0,
            image: Partition::new(group.degree()),
            completed: 0,
        }
    }

    /// Refines by point classes that the sought elements map onto
    /// `search_classes`, class by class. For a stabilizer both lists are the
    /// same.
    pub fn with_classes(mut self, r_base_classes: Vec<Vec<usize>>, search_classes: Vec<Vec<usize>>) -> Self {
        debug_assert_eq!(r_base_classes.len(), search_classes.len());
        self.classes = Some((r_base_classes, search_classes));
        self
    }

    /// Also refines by the orbits of a second group on the same points, for
    /// intersection searches. The predicate should test membership in it.
    pub fn with_secondary_group(mut self, group: &Bsgs) -> Self {
        self.secondary = Some(group.clone());
        self
    }

    pub fn search(mut self) -> (Bsgs, SearchStats) {
        self.core.config.stop_after_first = false;
        self.run();
        let subgroup = self.core.finish_subgroup();
        (subgroup, self.core.stats)
    }

    pub fn search_coset_representative(mut self) -> (Option<Permutation>, SearchStats) {
        self.core.config.stop_after_first = true;
        self.run();
        log::debug!("representative search finished ({})", self.core.stats);
        (self.core.found.take(), self.core.stats)
    }

    fn run(&mut self) {
        let r_base = self.construct();
        let degree = self.core.group.degree();
        self.core.sorter = BaseSorter::new(degree, &r_base.fix_sequence);
        self.core.setup_empty_subgroup(r_base.subgroup_base.clone());
        self.image = Partition::new(degree);
        self.completed = r_base.steps.len();

        let identity = Permutation::id(degree);
        self.search_node(&r_base, 0, &identity, &identity, 0);
    }

    fn construct(&mut self) -> RBase {
        let degree = self.core.group.degree();
        let mut families = Vec::new();
        if !self.core.group.is_symmetric_group() {
            families.push(Family::Group);
        }
        if self.secondary.is_some() {
            families.push(Family::SecondaryGroup);
        }
        if let Some((r_base, search)) = self.classes.take() {
            families.push(Family::Classes { r_base, search });
        }

        let mut pi = Partition::new(degree);
        let mut steps = Vec::new();
        let mut subgroup_base = Vec::new();
        while !pi.is_discrete() {
            let mut refined = true;
            while refined {
                refined = false;
                for family in &families {
                    let fixed = pi.fix_points().len();
                    let refinement = match family {
                        Family::Group => Refinement::group(&mut pi, &self.core.group, self.group_level, false),
                        Family::SecondaryGroup => self
                            .secondary
                            .as_ref()
                            .and_then(|h| Refinement::group(&mut pi, h, self.secondary_level, true)),
                        Family::Classes { r_base, search } => Refinement::classes(&mut pi, r_base, search),
                    };
                    if let Some(refinement) = refinement {
                        if pi.fix_points().len() > fixed {
                            self.process_new_fix_points(&pi);
                        }
                        log::trace!("R-base refinement to {pi}");
                        steps.push(Step {
                            refinement,
                            cells: pi.cells(),
                            fix_count: pi.fix_points().len(),
                        });
                        refined = true;
                    }
                }
            }
            let Some(alpha) = self.choose_backtrack_point(&pi) else {
                break;
            };
            let refinement = Refinement::backtrack(&mut pi, alpha);
            log::trace!("R-base backtrack on {alpha} to {pi}");
            self.process_new_fix_points(&pi);
            steps.push(Step {
                refinement,
                cells: pi.cells(),
                fix_count: pi.fix_points().len(),
            });
            subgroup_base.push(alpha);
        }

        log::debug!(
            "R-base with {} steps, {} of them backtrack steps on {subgroup_base:?}",
            steps.len(),
            subgroup_base.len()
        );
        RBase {
            steps,
            fix_sequence: pi.fix_points().to_vec(),
            subgroup_base,
        }
    }

    fn process_new_fix_points(&mut self, pi: &Partition) {
        let core = &mut self.core;
        self.group_level = core.base_change.change(&mut core.group, pi.fix_points(), true);
        if let Some(h) = self.secondary.as_mut() {
            self.secondary_level = core.base_change.change(h, pi.fix_points(), true);
        }
    }

    /// The first base point after the fixed ones that is not fixed yet, or
    /// else the smallest point that is not fixed. `None` once `pi` is
    /// discrete.
    fn choose_backtrack_point(&self, pi: &Partition) -> Option<usize> {
        let unfixed = |x: &usize| pi.cell(pi.cell_of(*x)).len() > 1;
        let base = self.core.group.base();
        base[self.group_level.min(base.len())..]
            .iter()
            .copied()
            .find(unfixed)
            .or_else(|| (0..pi.degree()).find(unfixed))
    }

    /// Returns the step to continue at; `0` after a representative was
    /// found.
    fn search_node(
        &mut self,
        r_base: &RBase,
        step: usize,
        t: &Permutation,
        t2: &Permutation,
        backtrack_level: usize,
    ) -> usize {
        self.core.stats.nodes += 1;
        let Some(Step {
            refinement,
            cells,
            fix_count,
        }) = r_base.steps.get(step)
        else {
            return self.core.process_leaf(t, step, self.completed);
        };
        let sigma_fix = &r_base.fix_sequence[..*fix_count];

        let is_backtrack = refinement.is_backtrack();
        let alternatives: Vec<Option<usize>> = match refinement {
            Refinement::Backtrack { cell, .. } => {
                let mut points = self.image.cell(*cell).to_vec();
                self.core.sorter.sort(&mut points);
                points.into_iter().map(Some).collect()
            }
            _ => vec![None],
        };

        let mut remaining = alternatives.len();
        for gamma in alternatives {
            if is_backtrack && remaining < self.core.subgroup.transversal(backtrack_level).size() {
                self.core.stats.pruned_orbit += remaining;
                break;
            }
            remaining -= 1;

            let pi = &mut self.image;
            let old_fix = pi.fix_points().len();
            let count = match (refinement, gamma) {
                (Refinement::Backtrack { cell, .. }, Some(gamma)) => usize::from(pi.intersect(&[gamma], *cell)),
                (Refinement::Group { secondary: true, .. }, _) => refinement.apply_mapped(pi, t2),
                _ => refinement.apply_mapped(pi, t),
            };
            if count == 0 {
                self.core.stats.pruned_restriction += 1;
                continue;
            }
            if pi.cells() != *cells || pi.fix_points().len() != *fix_count {
                Refinement::undo(pi, count);
                self.core.stats.pruned_restriction += 1;
                continue;
            }

            let mut t_child = t.clone();
            let mut t2_child = t2.clone();
            if pi.fix_points().len() != old_fix {
                let mapped = update_mapping(&self.core.group, sigma_fix, pi.fix_points(), &mut t_child)
                    && self
                        .secondary
                        .as_ref()
                        .map_or(true, |h| update_mapping(h, sigma_fix, pi.fix_points(), &mut t2_child));
                if !mapped {
                    Refinement::undo(pi, count);
                    self.core.stats.pruned_restriction += 1;
                    continue;
                }
            }
            if is_backtrack
                && self.core.config.pruning_level_dcm > 0
                && self.core.prune_double_coset(&t_child, backtrack_level)
            {
                Refinement::undo(&mut self.image, count);
                self.core.stats.pruned_double_coset += 1;
                continue;
            }

            let next_backtrack_level = backtrack_level + usize::from(is_backtrack);
            let ret = self.search_node(r_base, step + 1, &t_child, &t2_child, next_backtrack_level);
            Refinement::undo(&mut self.image, count);
            if self.core.config.stop_after_first && ret == 0 {
                return 0;
            }
            if ret < step {
                return ret;
            }
        }

        self.completed = self.completed.min(step);
        step
    }
}

/// Adjusts `t` by elements of `group` so that it maps the fixed points
/// `sigma_fix` of the R-base onto the fixed points `pi_fix` of the image,
/// base point by base point. Returns `false` if no element of the current
/// coset does.
fn update_mapping(group: &Bsgs, sigma_fix: &[usize], pi_fix: &[usize], t: &mut Permutation) -> bool {
    let mut j = 0;
    for (level, &beta) in group.base().iter().enumerate() {
        while j < sigma_fix.len() && sigma_fix[j] != beta {
            j += 1;
        }
        if j == sigma_fix.len() {
            return true;
        }
        let (alpha, image) = (sigma_fix[j], pi_fix[j]);
        if t.apply(alpha) != image {
            match group.representative(level, t.apply_inverse(image)) {
                Some(u) => *t = u.then(t),
                None => return false,
            }
        }
        j += 1;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::TransversalKind,
        construct::schreier_sims,
        predicate::{SetImage, SetwiseStabilizer},
    };

    fn cyc(n: usize, s: &str) -> Permutation {
        Permutation::parse_cycles(n, s).unwrap()
    }

    #[test]
    fn mapping_follows_the_base() {
        let g = schreier_sims(
            4,
            TransversalKind::SchreierTree,
            &[cyc(4, "(0 1 2 3)"), cyc(4, "(0 1)")],
            &[0, 1, 2],
        );
        let mut t = Permutation::id(4);
        assert!(update_mapping(&g, &[0, 1], &[2, 0], &mut t));
        assert_eq!((t.apply(0), t.apply(1)), (2, 0));

        let c4 = schreier_sims(4, TransversalKind::SchreierTree, &[cyc(4, "(0 1 2 3)")], &[0]);
        let mut t = Permutation::id(4);
        assert!(update_mapping(&c4, &[0, 1], &[3, 0], &mut t));
        assert_eq!(t.apply(0), 3);

        let c2 = schreier_sims(4, TransversalKind::SchreierTree, &[cyc(4, "(0 1)")], &[]);
        assert!(!update_mapping(&c2, &[0], &[2], &mut Permutation::id(4)));
    }

    #[test]
    fn backtrack_point_only_while_not_discrete() {
        let g = schreier_sims(3, TransversalKind::SchreierTree, &[cyc(3, "(0 1 2)"), cyc(3, "(1 2)")], &[]);
        let predicate = SetwiseStabilizer::new(3, &[0]);
        let search = RBaseSearch::new(&g, &predicate, SearchConfig::default());

        let mut pi = Partition::new(3);
        assert_eq!(search.choose_backtrack_point(&pi), Some(g.base()[0]));
        assert!(pi.intersect(&[2], 0));
        assert_eq!(search.choose_backtrack_point(&pi), Some(0));
        assert!(pi.intersect(&[1], 1));
        assert!(pi.is_discrete());
        assert_eq!(search.choose_backtrack_point(&pi), None);
    }

    #[test]
    fn set_stabilizer_by_partitions() {
        let g = schreier_sims(
            7,
            TransversalKind::SchreierTree,
            &[cyc(7, "(0 1 2 3 4 5 6)"), cyc(7, "(1 2 4)(3 6 5)")],
            &[],
        );
        assert_eq!(g.order_u64(), Some(21));
        let set = vec![0, 1, 3];
        let predicate = SetwiseStabilizer::new(7, &set);
        let (k, _) = RBaseSearch::new(&g, &predicate, SearchConfig::default())
            .with_classes(vec![set.clone()], vec![set])
            .search();
        for g in g.elements() {
            assert_eq!(predicate.test(&g), k.sifts(&g), "{g}");
        }
    }

    #[test]
    fn set_image_by_partitions() {
        let s4 = schreier_sims(4, TransversalKind::SchreierTree, &[cyc(4, "(0 1 2 3)"), cyc(4, "(0 1)")], &[]);
        let predicate = SetImage::new(4, &[0, 1], &[1, 3]);
        let (found, _) = RBaseSearch::new(&s4, &predicate, SearchConfig::default())
            .with_classes(vec![vec![0, 1]], vec![vec![1, 3]])
            .search_coset_representative();
        assert_eq!(found.unwrap().apply_set(&[0, 1]), vec![1, 3]);
    }
}
