use ahash::AHashSet;
use num::BigUint;
use proptest::prelude::*;
use similar_asserts::assert_eq;

use crate::{
    api::{
        conjugating_base_change, group_intersection_search, lex_min_set_image, partition_set_image_search,
        partition_set_stabilizer_search, random_schreier_sims_construct, schreier_sims_construct,
        set_image_search, set_stabilizer_search, vector_stabilizer_search,
    },
    bsgs::Bsgs,
    config::{RandomSchreierSimsConfig, SearchConfig},
    permutation::Permutation,
    predicate::{SetSystemStabilizer, SubgroupPredicate},
};

use super::{classic::BacktrackSearch, partition::r_base::RBaseSearch};

fn cyc(n: usize, s: &str) -> Permutation {
    Permutation::parse_cycles(n, s).unwrap()
}

fn s5() -> Vec<Permutation> {
    vec![cyc(5, "(0 1)"), cyc(5, "(0 1 2 3 4)")]
}

fn s4() -> Bsgs {
    schreier_sims_construct(4, &[cyc(4, "(0 1)"), cyc(4, "(0 1 2 3)")], &[]).unwrap()
}

/// A 2-group of order 128 on eight points.
fn octal_group() -> Vec<Permutation> {
    vec![
        cyc(8, "(0 1)"),
        cyc(8, "(0 2)(1 3)"),
        cyc(8, "(0 4)(1 5)(2 6)(3 7)"),
        cyc(8, "(4 5)"),
    ]
}

fn brute_force_count(group: &Bsgs, test: impl Fn(&Permutation) -> bool) -> u64 {
    group.elements().filter(|g| test(g)).count() as u64
}

fn stabilizes(g: &Permutation, set: &[usize]) -> bool {
    let mut sorted = set.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    g.apply_set(&sorted) == sorted
}

#[test]
fn construction_scenarios() {
    let c4 = schreier_sims_construct(4, &[cyc(4, "(0 1 2 3)")], &[]).unwrap();
    assert_eq!(c4.order_u64(), Some(4));
    assert_eq!(c4.base().len(), 1);

    let s5_group = schreier_sims_construct(5, &s5(), &[]).unwrap();
    assert_eq!(s5_group.order_u64(), Some(120));

    let prescribed = schreier_sims_construct(5, &s5(), &[4, 2]).unwrap();
    assert_eq!(&prescribed.base()[..2], &[4, 2]);
    assert_eq!(prescribed.order_u64(), Some(120));
}

#[test]
fn randomized_construction_with_known_order() {
    let order = BigUint::from(120u32);
    let (bsgs, guaranteed) = random_schreier_sims_construct(
        5,
        &s5(),
        Some(&order),
        &[],
        &RandomSchreierSimsConfig::default(),
    )
    .unwrap();
    assert!(guaranteed);
    assert_eq!(bsgs.order(), order);

    let (bsgs, guaranteed) =
        random_schreier_sims_construct(5, &s5(), None, &[], &RandomSchreierSimsConfig::default()).unwrap();
    assert!(!guaranteed);
    assert!(s5().iter().all(|g| bsgs.sifts(g)));
    assert_eq!(BigUint::from(120u32) % bsgs.order(), BigUint::from(0u32));
}

#[test]
fn set_stabilizer_in_s5() {
    let s5_group = schreier_sims_construct(5, &s5(), &[]).unwrap();
    let classic = set_stabilizer_search(&s5_group, &[0, 1], 100).unwrap();
    let partition = partition_set_stabilizer_search(&s5_group, &[0, 1], 100).unwrap();
    assert_eq!(classic.order_u64(), Some(12));
    assert_eq!(partition.order_u64(), Some(12));
    for g in s5_group.elements().filter(|g| stabilizes(g, &[0, 1])) {
        assert!(classic.sifts(&g), "{g}");
        assert!(partition.sifts(&g), "{g}");
    }
}

#[test]
fn double_coset_pruning_after_auxiliary_base_changes() {
    let group = schreier_sims_construct(6, &[cyc(6, "(0 2 4)"), cyc(6, "(0 3)")], &[]).unwrap();
    for set in [vec![1, 5], vec![0, 1], vec![2, 3], vec![0, 2, 5]] {
        let expected = brute_force_count(&group, |g| stabilizes(g, &set));
        let classic = set_stabilizer_search(&group, &set, 100).unwrap();
        let partition = partition_set_stabilizer_search(&group, &set, 100).unwrap();
        assert_eq!(classic.order_u64(), Some(expected), "{set:?}");
        assert_eq!(partition.order_u64(), Some(expected), "{set:?}");
    }
}

#[test]
fn set_images_in_s4() {
    let s4 = s4();
    for search in [set_image_search, partition_set_image_search] {
        let t = search(&s4, &[0, 1], &[2, 3], 100).unwrap().unwrap();
        assert_eq!(t.apply_set(&[0, 1]), vec![2, 3]);
        assert!(s4.sifts(&t));
        assert_eq!(search(&s4, &[0, 1], &[2], 100).unwrap(), None);
    }

    let c4 = schreier_sims_construct(4, &[cyc(4, "(0 1 2 3)")], &[]).unwrap();
    assert_eq!(set_image_search(&c4, &[0, 1], &[0, 2], 100).unwrap(), None);
    assert_eq!(partition_set_image_search(&c4, &[0, 1], &[0, 2], 100).unwrap(), None);
}

#[test]
fn vector_stabilizer_matches_enumeration() {
    let group = schreier_sims_construct(8, &octal_group(), &[]).unwrap();
    let colours = [0, 1, 0, 1, 2, 2, 0, 1];
    let stabilizer = vector_stabilizer_search(&group, &colours, 100).unwrap();
    let expected = brute_force_count(&group, |g| (0..8).all(|x| colours[g.apply(x)] == colours[x]));
    assert_eq!(stabilizer.order_u64(), Some(expected));
    assert!(stabilizer
        .generators()
        .all(|g| (0..8).all(|x| colours[g.apply(x)] == colours[x])));
}

#[test]
fn group_intersection_matches_enumeration() {
    let g = schreier_sims_construct(6, &[cyc(6, "(0 1 2 3 4 5)"), cyc(6, "(1 5)(2 4)")], &[]).unwrap();
    let h = schreier_sims_construct(6, &[cyc(6, "(0 2 4)"), cyc(6, "(0 3)"), cyc(6, "(1 4)")], &[]).unwrap();
    let intersection = group_intersection_search(&g, &h, 100).unwrap();
    let expected = brute_force_count(&g, |p| h.sifts(p));
    assert_eq!(intersection.order_u64(), Some(expected));
    for p in intersection.elements() {
        assert!(g.sifts(&p) && h.sifts(&p), "{p}");
    }

    let swapped = group_intersection_search(&h, &g, 100).unwrap();
    assert_eq!(swapped.order(), intersection.order());
}

#[test]
fn set_system_stabilizer_by_both_searches() {
    let group = schreier_sims_construct(8, &octal_group(), &[]).unwrap();
    let predicate = SetSystemStabilizer::new(8, &[vec![0, 1], vec![2, 3], vec![4, 5], vec![6, 7]]);
    let expected = brute_force_count(&group, |g| predicate.test(g));

    let (classic, _) = BacktrackSearch::new(&group, &predicate, SearchConfig::default()).search();
    let (partition, _) = RBaseSearch::new(&group, &predicate, SearchConfig::default()).search();
    assert_eq!(classic.order_u64(), Some(expected));
    assert_eq!(partition.order_u64(), Some(expected));
}

#[test]
fn conjugating_base_change_keeps_the_group() {
    let mut group = schreier_sims_construct(8, &octal_group(), &[]).unwrap();
    let elements: AHashSet<Permutation> = group.elements().collect();
    let placed = conjugating_base_change(&mut group, &[5, 2]).unwrap();
    assert_eq!(placed, 2);
    assert_eq!(&group.base()[..2], &[5, 2]);
    assert_eq!(group.order_u64(), Some(elements.len() as u64));
    assert!(elements.iter().all(|g| group.sifts(g)));
}

#[test]
fn lex_min_matches_enumeration() {
    let group = schreier_sims_construct(8, &octal_group(), &[]).unwrap();
    for set in [vec![3, 5, 6], vec![7], vec![1, 2, 6, 7], vec![4, 5, 6, 7]] {
        let expected = group.elements().map(|g| g.apply_set(&set)).min().unwrap();
        assert_eq!(lex_min_set_image(&group, &set).unwrap(), expected, "{set:?}");
    }
}

fn permutation_on(n: usize) -> impl Strategy<Value = Permutation> {
    Just((0..n).collect::<Vec<_>>())
        .prop_shuffle()
        .prop_map(Permutation::from_map)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]
    #[test]
    fn stabilizers_of_random_groups_agree_with_enumeration(
        generators in proptest::collection::vec(permutation_on(6), 1..4),
        set in proptest::sample::subsequence((0usize..6).collect::<Vec<_>>(), 0..6),
        pruning_level in proptest::sample::select(vec![0usize, 1, 100]),
    ) {
        let group = schreier_sims_construct(6, &generators, &[]).unwrap();
        let expected = brute_force_count(&group, |g| stabilizes(g, &set));
        let classic = set_stabilizer_search(&group, &set, pruning_level).unwrap();
        let partition = partition_set_stabilizer_search(&group, &set, pruning_level).unwrap();
        prop_assert_eq!(classic.order_u64(), Some(expected));
        prop_assert_eq!(partition.order_u64(), Some(expected));
        prop_assert!(classic.generators().all(|g| stabilizes(g, &set)));
        prop_assert!(partition.generators().all(|g| stabilizes(g, &set)));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]
    #[test]
    fn searches_agree_with_enumeration(
        set in proptest::sample::subsequence((0usize..8).collect::<Vec<_>>(), 0..8),
        pruning_level in 0usize..4,
    ) {
        let group = schreier_sims_construct(8, &octal_group(), &[]).unwrap();
        let expected = brute_force_count(&group, |g| stabilizes(g, &set));
        let classic = set_stabilizer_search(&group, &set, pruning_level).unwrap();
        let partition = partition_set_stabilizer_search(&group, &set, pruning_level).unwrap();
        prop_assert_eq!(classic.order_u64(), Some(expected));
        prop_assert_eq!(partition.order_u64(), Some(expected));
        prop_assert!(partition.generators().all(|g| stabilizes(g, &set)));
    }
}
