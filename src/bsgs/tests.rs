use ahash::AHashSet;
use num::BigUint;
use proptest::prelude::*;
use rand::{rngs::SmallRng, SeedableRng};
use similar_asserts::assert_eq;

use super::*;
use crate::construct::schreier_sims;

fn cyc(n: usize, s: &str) -> Permutation {
    Permutation::parse_cycles(n, s).unwrap()
}

fn build(n: usize, gens: &[Permutation], kind: TransversalKind) -> Bsgs {
    schreier_sims(n, kind, gens, &[])
}

fn cube_rotations() -> Vec<Permutation> {
    // rotations of a cube acting on its eight vertices
    vec![cyc(8, "(0 1 2 3)(4 5 6 7)"), cyc(8, "(0 4 5 1)(3 7 6 2)")]
}

#[test]
fn order_matches_enumeration() {
    let groups: Vec<(usize, Vec<Permutation>)> = vec![
        (4, vec![cyc(4, "(0 1 2 3)")]),
        (5, vec![cyc(5, "(0 1 2)"), cyc(5, "(2 3 4)")]),
        (6, vec![cyc(6, "(0 1 2 3 4 5)"), cyc(6, "(1 5)(2 4)")]),
        (8, cube_rotations()),
    ];
    for (n, gens) in groups {
        let all = Permutation::generate_all(&gens).unwrap();
        for kind in [TransversalKind::SchreierTree, TransversalKind::Explicit] {
            let bsgs = build(n, &gens, kind);
            assert_eq!(bsgs.order(), BigUint::from(all.len()));
            assert!(all.iter().all(|g| bsgs.sifts(g)));
        }
    }
}

#[test]
fn sifting_rejects_non_members() {
    let bsgs = build(8, &cube_rotations(), TransversalKind::SchreierTree);
    assert_eq!(bsgs.order_u64(), Some(24));
    let all: AHashSet<Permutation> = Permutation::generate_all(&cube_rotations()).unwrap().into_iter().collect();
    for g in Permutation::generate_all(&[cyc(8, "(0 1 2 3 4 5 6 7)"), cyc(8, "(0 1)")]).unwrap().iter().take(2000) {
        assert_eq!(bsgs.sifts(g), all.contains(g), "{g}");
    }
    assert!(!bsgs.sifts(&Permutation::id(7)));
}

#[test]
fn elements_enumerate_the_group_once() {
    let bsgs = build(6, &[cyc(6, "(0 1 2 3 4 5)"), cyc(6, "(1 5)(2 4)")], TransversalKind::SchreierTree);
    let elements: AHashSet<Permutation> = bsgs.elements().collect();
    assert_eq!(elements.len(), 12);
    assert!(elements.iter().all(|g| bsgs.sifts(g)));
    assert_eq!(Bsgs::new(3, TransversalKind::SchreierTree).elements().count(), 1);
}

#[test]
fn random_elements_stay_in_the_group() {
    let bsgs = build(8, &cube_rotations(), TransversalKind::SchreierTree);
    let mut rng = SmallRng::seed_from_u64(7);
    for level in 0..=bsgs.base().len() {
        for _ in 0..20 {
            let g = bsgs.random(level, &mut rng);
            assert!(bsgs.sifts(&g));
            assert!(bsgs.level_of(&g) >= level);
        }
    }
}

#[test]
fn conjugation_moves_the_base() {
    let mut bsgs = build(5, &[cyc(5, "(0 1 2 3 4)")], TransversalKind::SchreierTree);
    let g = cyc(5, "(0 3)(1 2)");
    let members: Vec<Permutation> = bsgs.elements().map(|p| p.conjugate_by(&g)).collect();
    bsgs.conjugate(&g);
    assert_eq!(bsgs.base(), &[3]);
    assert!(members.iter().all(|p| bsgs.sifts(p)));
    assert_eq!(bsgs.order_u64(), Some(5));
}

#[test]
fn redundant_base_points() {
    let mut bsgs = build(5, &[cyc(5, "(0 1 2)")], TransversalKind::SchreierTree);
    assert_eq!(bsgs.base(), &[0]);
    assert_eq!(bsgs.insert_redundant_base_point(4, 0), 1);
    assert_eq!(bsgs.insert_redundant_base_point(0, 0), 0);
    assert_eq!(bsgs.orbit_sizes(), vec![3, 1]);
    assert_eq!(bsgs.order_u64(), Some(3));

    bsgs.strip_redundant_base_points(0);
    assert_eq!(bsgs.base(), &[0]);
    let stripped = bsgs.clone();
    bsgs.strip_redundant_base_points(0);
    assert_eq!(bsgs.base(), stripped.base());
}

#[test]
fn stripping_strong_generators_keeps_the_group() {
    let gens = vec![
        cyc(5, "(0 1)"),
        cyc(5, "(0 1 2 3 4)"),
        cyc(5, "(1 2)"),
        cyc(5, "(3 4)"),
        cyc(5, "(0 2)(3 4)"),
    ];
    let mut bsgs = build(5, &gens, TransversalKind::SchreierTree);
    let before = bsgs.generator_ids().len();
    bsgs.strip_redundant_strong_generators();
    assert!(bsgs.generator_ids().len() <= before);

    let rebuilt = schreier_sims(5, TransversalKind::SchreierTree, &bsgs.strong_generators(), bsgs.base());
    assert_eq!(rebuilt.order_u64(), Some(120));
    assert_eq!(rebuilt.base(), bsgs.base());
}

#[test]
fn insert_generator_rolls_back_useless_elements() {
    let mut bsgs = build(4, &[cyc(4, "(0 1 2 3)")], TransversalKind::SchreierTree);
    assert_eq!(bsgs.insert_generator(cyc(4, "(0 2)(1 3)"), true), None);
    assert_eq!(bsgs.generator_ids().len(), 1);
    assert_eq!(bsgs.arena().len(), 1);
    assert_eq!(bsgs.insert_generator(cyc(4, "(1 3)"), true), Some(1));
    assert_eq!(bsgs.base(), &[0, 1]);
    assert_eq!(bsgs.order_u64(), Some(8));
}

#[test]
fn display_lists_base_and_generators() {
    let bsgs = build(4, &[cyc(4, "(0 1 2 3)")], TransversalKind::SchreierTree);
    insta::assert_snapshot!(bsgs.to_string(), @r"
    BSGS of order 4 on 4 points
    base: [0]
    orbit sizes: [4]
    strong generators:
        (0 1 2 3)
    ");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]
    #[test]
    fn explicit_and_tree_agree(
        images in Just((0usize..7).collect::<Vec<_>>()).prop_shuffle(),
        explicit in any::<bool>(),
    ) {
        let kind = if explicit { TransversalKind::Explicit } else { TransversalKind::SchreierTree };
        let gens = [Permutation::from_map(images), cyc(7, "(0 1 2)")];
        let bsgs = build(7, &gens, kind);
        let all = Permutation::generate_all(&gens).unwrap();
        prop_assert_eq!(bsgs.order(), BigUint::from(all.len()));
        for g in all.iter().take(200) {
            prop_assert!(bsgs.sifts(g));
        }
        for (level, u) in bsgs.transversals().iter().enumerate() {
            for p in u.points() {
                let rep = bsgs.representative(level, p).unwrap();
                prop_assert_eq!(rep.apply(bsgs.base()[level]), p);
            }
        }
    }
}
