//! Entry points that validate caller input.
//!
//! Everything here is a thin wrapper around the algorithm modules: inputs are
//! checked and reported as [`GroupError`], then the work is delegated.
//!
//! ```
//! use stabchain::{api, permutation::Permutation};
//!
//! let gens = [
//!     Permutation::parse_cycles(5, "(0 1)").unwrap(),
//!     Permutation::parse_cycles(5, "(0 1 2 3 4)").unwrap(),
//! ];
//! let s5 = api::schreier_sims_construct(5, &gens, &[]).unwrap();
//! assert_eq!(s5.order_u64(), Some(120));
//!
//! let stabilizer = api::set_stabilizer_search(&s5, &[0, 1], 100).unwrap();
//! assert_eq!(stabilizer.order_u64(), Some(12));
//! ```

use num::BigUint;

use crate::{
    bsgs::Bsgs,
    change::ConjugatingBaseChange,
    config::{BaseTranspose, RandomSchreierSimsConfig, SearchConfig, TransversalKind},
    construct::{random_schreier_sims, schreier_sims},
    error::{check_generators, check_points, GroupError},
    permutation::Permutation,
    predicate::{GroupMembership, SetImage, SetwiseStabilizer, SubgroupPredicate, VectorStabilizer},
    search::{
        classic::BacktrackSearch, lex_min::OrbitLexMinSearch, partition::r_base::RBaseSearch,
        SearchOutcome,
    },
};

pub type Result<T> = std::result::Result<T, GroupError>;

/// Deterministic construction of a BSGS whose base starts with
/// `prescribed_base`.
pub fn schreier_sims_construct(
    degree: usize,
    generators: &[Permutation],
    prescribed_base: &[usize],
) -> Result<Bsgs> {
    check_generators(degree, generators)?;
    check_points(prescribed_base, degree)?;
    let bsgs = schreier_sims(degree, TransversalKind::default(), generators, prescribed_base);
    log::debug!(
        "constructed group of order {} with base {:?}",
        bsgs.order(),
        bsgs.base()
    );
    Ok(bsgs)
}

/// Randomized construction. The flag is `true` when the result is known to
/// describe the whole group, which requires `known_order`.
pub fn random_schreier_sims_construct(
    degree: usize,
    generators: &[Permutation],
    known_order: Option<&BigUint>,
    prescribed_base: &[usize],
    config: &RandomSchreierSimsConfig,
) -> Result<(Bsgs, bool)> {
    check_generators(degree, generators)?;
    check_points(prescribed_base, degree)?;
    let (bsgs, guaranteed) = random_schreier_sims(degree, generators, known_order, prescribed_base, config);
    log::debug!(
        "randomized construction reached order {} (guaranteed: {guaranteed})",
        bsgs.order()
    );
    Ok((bsgs, guaranteed))
}

/// Classic backtrack search for an arbitrary predicate. With
/// `config.stop_after_first` a single element is returned, otherwise the
/// subgroup of all elements satisfying the predicate.
pub fn backtrack_search(bsgs: &Bsgs, predicate: &dyn SubgroupPredicate, config: SearchConfig) -> SearchOutcome {
    let search = BacktrackSearch::new(bsgs, predicate, config);
    if config.stop_after_first {
        SearchOutcome::Representative(search.search_coset_representative().0)
    } else {
        SearchOutcome::Subgroup(search.search().0)
    }
}

/// Stabilizer of `set` by classic backtracking.
pub fn set_stabilizer_search(bsgs: &Bsgs, set: &[usize], pruning_level: usize) -> Result<Bsgs> {
    check_points(set, bsgs.degree())?;
    let predicate = SetwiseStabilizer::new(bsgs.degree(), set);
    let config = SearchConfig {
        break_after_child_restriction: true,
        ..SearchConfig::with_pruning_level(pruning_level)
    };
    Ok(BacktrackSearch::new(bsgs, &predicate, config).search().0)
}

/// Some element mapping `from` onto `to`, by classic backtracking. `None`
/// if there is none, in particular if the sets differ in size.
pub fn set_image_search(
    bsgs: &Bsgs,
    from: &[usize],
    to: &[usize],
    pruning_level: usize,
) -> Result<Option<Permutation>> {
    check_points(from, bsgs.degree())?;
    check_points(to, bsgs.degree())?;
    if from.len() != to.len() {
        return Ok(None);
    }
    let predicate = SetImage::new(bsgs.degree(), from, to);
    let config = SearchConfig::with_pruning_level(pruning_level).representative();
    Ok(BacktrackSearch::new(bsgs, &predicate, config)
        .search_coset_representative()
        .0)
}

/// Stabilizer of `set` by partition backtracking.
pub fn partition_set_stabilizer_search(bsgs: &Bsgs, set: &[usize], pruning_level: usize) -> Result<Bsgs> {
    check_points(set, bsgs.degree())?;
    let predicate = SetwiseStabilizer::new(bsgs.degree(), set);
    let config = SearchConfig::with_pruning_level(pruning_level);
    Ok(RBaseSearch::new(bsgs, &predicate, config)
        .with_classes(vec![set.to_vec()], vec![set.to_vec()])
        .search()
        .0)
}

/// Some element mapping `from` onto `to`, by partition backtracking.
pub fn partition_set_image_search(
    bsgs: &Bsgs,
    from: &[usize],
    to: &[usize],
    pruning_level: usize,
) -> Result<Option<Permutation>> {
    check_points(from, bsgs.degree())?;
    check_points(to, bsgs.degree())?;
    if from.len() != to.len() {
        return Ok(None);
    }
    let predicate = SetImage::new(bsgs.degree(), from, to);
    let config = SearchConfig::with_pruning_level(pruning_level).representative();
    Ok(RBaseSearch::new(bsgs, &predicate, config)
        .with_classes(vec![from.to_vec()], vec![to.to_vec()])
        .search_coset_representative()
        .0)
}

/// Elements preserving the colouring `colours[x]` of each point `x`.
pub fn vector_stabilizer_search(bsgs: &Bsgs, colours: &[usize], pruning_level: usize) -> Result<Bsgs> {
    if colours.len() != bsgs.degree() {
        return Err(GroupError::SetSizeMismatch {
            expected: bsgs.degree(),
            found: colours.len(),
        });
    }
    let predicate = VectorStabilizer::new(colours);
    let classes = predicate.classes();
    let config = SearchConfig::with_pruning_level(pruning_level);
    Ok(RBaseSearch::new(bsgs, &predicate, config)
        .with_classes(classes.clone(), classes)
        .search()
        .0)
}

/// The intersection of two groups on the same points.
pub fn group_intersection_search(g: &Bsgs, h: &Bsgs, pruning_level: usize) -> Result<Bsgs> {
    if g.degree() != h.degree() {
        return Err(GroupError::DegreeMismatch {
            expected: g.degree(),
            found: h.degree(),
        });
    }
    let predicate = GroupMembership::new(h);
    let config = SearchConfig::with_pruning_level(pruning_level);
    Ok(RBaseSearch::new(g, &predicate, config)
        .with_secondary_group(h)
        .search()
        .0)
}

/// Changes the base of `bsgs` to start with `prefix` (see
/// [`ConjugatingBaseChange::change`]) and returns the number of leading
/// base points taken from it.
pub fn conjugating_base_change(bsgs: &mut Bsgs, prefix: &[usize]) -> Result<usize> {
    check_points(prefix, bsgs.degree())?;
    let mut change = ConjugatingBaseChange::new(BaseTranspose::default());
    Ok(change.change(bsgs, prefix, false))
}

/// The lexicographically smallest image of `set`.
pub fn lex_min_set_image(bsgs: &Bsgs, set: &[usize]) -> Result<Vec<usize>> {
    check_points(set, bsgs.degree())?;
    Ok(OrbitLexMinSearch::new(bsgs, BaseTranspose::default()).lex_min(set))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permutation::PermutationError;

    fn cyc(n: usize, s: &str) -> Permutation {
        Permutation::parse_cycles(n, s).unwrap()
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(schreier_sims_construct(0, &[], &[]).unwrap_err(), GroupError::EmptyDomain);
        assert_eq!(schreier_sims_construct(3, &[], &[]).unwrap_err(), GroupError::EmptyGenerators);
        assert_eq!(
            schreier_sims_construct(4, &[cyc(3, "(0 1)")], &[]).unwrap_err(),
            GroupError::DegreeMismatch { expected: 4, found: 3 }
        );
        assert_eq!(
            schreier_sims_construct(3, &[cyc(3, "(0 1)")], &[1, 1]).unwrap_err(),
            GroupError::DuplicatePoint(1)
        );

        let g = schreier_sims_construct(3, &[cyc(3, "(0 1 2)")], &[]).unwrap();
        assert_eq!(
            set_stabilizer_search(&g, &[0, 3], 100).unwrap_err(),
            GroupError::PointOutOfDomain { point: 3, degree: 3 }
        );
        assert_eq!(
            vector_stabilizer_search(&g, &[0, 1], 100).unwrap_err(),
            GroupError::SetSizeMismatch { expected: 3, found: 2 }
        );
        let other = schreier_sims_construct(4, &[cyc(4, "(0 1)")], &[]).unwrap();
        assert!(matches!(
            group_intersection_search(&g, &other, 100),
            Err(GroupError::DegreeMismatch { .. })
        ));
    }

    #[test]
    fn wraps_permutation_errors() {
        let err: GroupError = Permutation::parse_cycles(3, "(0 1").unwrap_err().into();
        assert!(matches!(err, GroupError::Permutation(PermutationError::Parse(_))));
        insta::assert_snapshot!(GroupError::SetSizeMismatch { expected: 4, found: 2 }.to_string(), @"expected one entry per point (4), found 2");
    }

    #[test]
    fn outcome_follows_the_config() {
        let g = schreier_sims_construct(4, &[cyc(4, "(0 1 2 3)"), cyc(4, "(0 1)")], &[]).unwrap();
        let predicate = SetwiseStabilizer::new(4, &[0]);
        match backtrack_search(&g, &predicate, SearchConfig::default()) {
            SearchOutcome::Subgroup(k) => assert_eq!(k.order_u64(), Some(6)),
            other => panic!("unexpected {other:?}"),
        }
        match backtrack_search(&g, &predicate, SearchConfig::default().representative()) {
            SearchOutcome::Representative(Some(t)) => assert!(predicate.test(&t)),
            other => panic!("unexpected {other:?}"),
        }
    }
}
