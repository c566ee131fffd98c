//! Base change.
//!
//! [`ConjugatingBaseChange`] rewrites the base of a [`Bsgs`] so that it
//! starts with a requested sequence of points, without recomputing the chain
//! from scratch. Wherever a wanted point already lies in the orbit of the
//! current level the change is absorbed into a conjugating element; only the
//! remaining points are moved into place by base transpositions.

use num::BigUint;
use rand::{rngs::SmallRng, SeedableRng};

use crate::{bsgs::Bsgs, config::BaseTranspose, permutation::Permutation};

mod transpose;

#[derive(Debug, Clone)]
pub struct ConjugatingBaseChange {
    rng: Option<SmallRng>,
    transpositions: usize,
}

impl ConjugatingBaseChange {
    pub fn new(strategy: BaseTranspose) -> Self {
        let rng = match strategy {
            BaseTranspose::Random { seed } => Some(SmallRng::seed_from_u64(seed)),
            BaseTranspose::Deterministic => None,
        };
        ConjugatingBaseChange {
            rng,
            transpositions: 0,
        }
    }

    /// Number of base transpositions performed so far.
    pub fn transpositions(&self) -> usize {
        self.transpositions
    }

    /// Changes the base of `bsgs` so that it begins with `prefix` (duplicates
    /// ignored). With `skip_redundant`, points fixed by the stabilizer of the
    /// points placed before them are left out instead of being inserted as
    /// redundant base points. Returns the number of leading base points that
    /// now come from `prefix`.
    ///
    /// Panics if the group order changed, which would mean the chain was not
    /// a valid BSGS.
    pub fn change(&mut self, bsgs: &mut Bsgs, prefix: &[usize], skip_redundant: bool) -> usize {
        let order_before = bsgs.order();
        let mut c = Permutation::id(bsgs.degree());
        let mut c_inv = Permutation::id(bsgs.degree());
        let mut conjugated = false;
        let mut seen = vec![false; bsgs.degree()];

        let mut pos = 0;
        for &target in prefix {
            if std::mem::replace(&mut seen[target], true) {
                continue;
            }
            let alpha = c_inv.apply(target);
            if skip_redundant && is_redundant(bsgs, pos, alpha) {
                continue;
            }
            if pos < bsgs.base().len() && bsgs.base()[pos] == alpha {
                pos += 1;
                continue;
            }

            if let Some(r) = (pos < bsgs.base().len())
                .then(|| bsgs.representative(pos, alpha))
                .flatten()
            {
                c = r.then(&c);
                c_inv = c.inverse();
                conjugated = true;
            } else {
                let inserted = bsgs.insert_redundant_base_point(alpha, pos);
                for level in (pos..inserted).rev() {
                    self.transpose(bsgs, level);
                }
            }
            pos += 1;
        }

        if conjugated {
            bsgs.conjugate(&c);
        }
        check_order(&order_before, bsgs);
        log::trace!("base change to {prefix:?}: base {:?}, {pos} placed", bsgs.base());
        pos
    }

    /// Exchanges the base points at `level` and `level + 1`.
    pub fn transpose(&mut self, bsgs: &mut Bsgs, level: usize) {
        self.transpositions += 1;
        transpose::transpose(bsgs, level, self.rng.as_mut());
    }
}

fn check_order(before: &BigUint, bsgs: &Bsgs) {
    let after = bsgs.order();
    assert_eq!(
        *before, after,
        "base change altered the group order from {before} to {after}"
    );
}

/// Whether `alpha` is fixed by `G^(level)`.
pub(crate) fn is_redundant(bsgs: &Bsgs, level: usize, alpha: usize) -> bool {
    bsgs.stabilizer_generators(level.min(bsgs.base().len()))
        .into_iter()
        .all(|id| bsgs.arena()[id].apply(alpha) == alpha)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::{config::TransversalKind, construct::schreier_sims};

    fn cyc(n: usize, s: &str) -> Permutation {
        Permutation::parse_cycles(n, s).unwrap()
    }

    fn s5() -> Bsgs {
        schreier_sims(
            5,
            TransversalKind::SchreierTree,
            &[cyc(5, "(0 1 2 3 4)"), cyc(5, "(0 1)")],
            &[],
        )
    }

    fn assert_same_group(a: &Bsgs, b: &Bsgs) {
        assert_eq!(a.order(), b.order());
        for g in b.generators() {
            assert!(a.sifts(g), "{g} lost by base change");
        }
    }

    #[test]
    fn prefix_via_conjugation() {
        let original = s5();
        let mut bsgs = original.clone();
        let mut change = ConjugatingBaseChange::new(BaseTranspose::Deterministic);
        let placed = change.change(&mut bsgs, &[4, 2], true);
        assert_eq!(placed, 2);
        assert_eq!(&bsgs.base()[..2], &[4, 2]);
        assert_eq!(change.transpositions(), 0);
        assert_same_group(&bsgs, &original);
    }

    #[test]
    fn prefix_via_transposition() {
        // Dihedral group of the square: the stabilizer of 0 is generated by (1 3).
        let original = schreier_sims(
            4,
            TransversalKind::SchreierTree,
            &[cyc(4, "(0 1 2 3)"), cyc(4, "(1 3)")],
            &[0, 1],
        );
        for strategy in [BaseTranspose::Deterministic, BaseTranspose::Random { seed: 3 }] {
            let mut bsgs = original.clone();
            let mut change = ConjugatingBaseChange::new(strategy);
            // 2 is not in the orbit of 1 under the stabilizer of 0
            let placed = change.change(&mut bsgs, &[0, 2], false);
            assert_eq!(placed, 2);
            assert_eq!(&bsgs.base()[..2], &[0, 2]);
            assert!(change.transpositions() > 0);
            assert_same_group(&bsgs, &original);
        }
    }

    #[test]
    fn redundant_points() {
        let original = schreier_sims(5, TransversalKind::SchreierTree, &[cyc(5, "(0 1 2)")], &[]);
        let mut bsgs = original.clone();
        let mut change = ConjugatingBaseChange::new(BaseTranspose::default());
        assert_eq!(change.change(&mut bsgs, &[1, 3, 4], true), 1);
        assert_eq!(bsgs.base(), &[1]);

        let mut bsgs = original.clone();
        assert_eq!(change.change(&mut bsgs, &[1, 3, 4, 3], false), 3);
        assert_eq!(bsgs.base(), &[1, 3, 4]);
        bsgs.strip_redundant_base_points(0);
        assert_eq!(bsgs.base(), &[1]);
        assert_same_group(&bsgs, &original);
    }

    #[test]
    fn repeated_changes_do_not_grow_the_arena() {
        let original = schreier_sims(
            4,
            TransversalKind::Explicit,
            &[cyc(4, "(0 1 2 3)"), cyc(4, "(1 3)")],
            &[0, 1],
        );
        let mut bsgs = original.clone();
        let mut change = ConjugatingBaseChange::new(BaseTranspose::Deterministic);
        for round in 0..200 {
            let prefix = if round % 2 == 0 { [0, 2] } else { [0, 1] };
            assert_eq!(change.change(&mut bsgs, &prefix, false), 2);
            assert_eq!(bsgs.arena().len(), bsgs.generator_ids().len());
        }
        assert_eq!(bsgs.arena().len(), original.arena().len());
        assert_same_group(&bsgs, &original);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]
        #[test]
        fn base_change_preserves_group(
            prefix in Just((0usize..6).collect::<Vec<_>>()).prop_shuffle(),
            len in 1usize..6,
            deterministic in any::<bool>(),
        ) {
            let gens = [cyc(6, "(0 1 2 3 4 5)"), cyc(6, "(0 1)(2 4)")];
            let original = schreier_sims(6, TransversalKind::SchreierTree, &gens, &[]);
            let mut bsgs = original.clone();
            let strategy = if deterministic { BaseTranspose::Deterministic } else { BaseTranspose::Random { seed: 11 } };
            let mut change = ConjugatingBaseChange::new(strategy);
            let placed = change.change(&mut bsgs, &prefix[..len], false);
            prop_assert_eq!(placed, len);
            prop_assert_eq!(&bsgs.base()[..len], &prefix[..len]);
            prop_assert_eq!(bsgs.order(), original.order());
            for g in &gens {
                prop_assert!(bsgs.sifts(g));
            }
        }
    }
}
