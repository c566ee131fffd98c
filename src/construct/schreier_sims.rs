use ahash::AHashSet;

use crate::{
    bsgs::Bsgs,
    config::TransversalKind,
    permutation::{PermId, Permutation},
};

/// Deterministic Schreier–Sims.
///
/// The base starts with `prescribed_base` (kept even where redundant) and is
/// extended as needed. Levels are checked from the deepest upwards: every
/// Schreier generator of a level must sift through the levels below it. A
/// residue that does not is added as a new strong generator and checking
/// resumes at the level where it stopped.
pub fn schreier_sims(
    degree: usize,
    kind: TransversalKind,
    generators: &[Permutation],
    prescribed_base: &[usize],
) -> Bsgs {
    let mut bsgs = super::initial_bsgs(degree, kind, generators, prescribed_base);
    for g in generators.iter().filter(|g| !g.is_identity()) {
        bsgs.push_generator(g.clone());
    }
    bsgs.update_orbits(bsgs.base().len().saturating_sub(1));

    // Schreier generators (orbit point, strong generator) already known to sift.
    let mut verified: Vec<AHashSet<(usize, PermId)>> = vec![AHashSet::new(); bsgs.base().len()];
    let mut level = bsgs.base().len();
    while level > 0 {
        let j = level - 1;
        match failing_schreier_generator(&bsgs, j, &mut verified[j]) {
            Some((stopped_at, residue)) => {
                log::trace!("level {j}: adding residue {residue} at level {stopped_at}");
                if stopped_at == bsgs.base().len() {
                    let Some(beta) = bsgs.choose_base_element(&residue) else {
                        unreachable!("non-trivial residue fixes every point");
                    };
                    bsgs.push_base_point(beta);
                    verified.push(AHashSet::new());
                }
                let id = bsgs.push_generator(residue);
                for l in j + 1..=stopped_at {
                    let gens = bsgs.stabilizer_generators(l);
                    let beta = bsgs.base()[l];
                    let (transversal, arena) = bsgs.transversal_mut(l);
                    transversal.orbit_update(arena, beta, &gens, id);
                }
                level = stopped_at + 1;
            }
            None => level -= 1,
        }
    }

    log::debug!(
        "schreier-sims: degree {degree}, base {:?}, orbit sizes {:?}, order {}",
        bsgs.base(),
        bsgs.orbit_sizes(),
        bsgs.order()
    );
    bsgs
}

/// First Schreier generator of level `j` that does not sift through levels
/// `j+1..`, as `(level where sifting stopped, residue)`.
fn failing_schreier_generator(
    bsgs: &Bsgs,
    j: usize,
    verified: &mut AHashSet<(usize, PermId)>,
) -> Option<(usize, Permutation)> {
    let gens = bsgs.stabilizer_generators(j);
    let points: Vec<usize> = bsgs.transversal(j).points().collect();
    for gamma in points {
        let Some(u) = bsgs.representative(j, gamma) else {
            continue;
        };
        for &s in &gens {
            if verified.contains(&(gamma, s)) {
                continue;
            }
            let g = &bsgs.arena()[s];
            let Some(u_image) = bsgs.representative(j, g.apply(gamma)) else {
                unreachable!("orbit of level {j} is not closed");
            };
            let schreier_generator = u.then(g).then(&u_image.inverse());
            let (stopped_at, residue) = bsgs.sift(&schreier_generator, j + 1);
            if stopped_at < bsgs.base().len() || !residue.is_identity() {
                return Some((stopped_at, residue));
            }
            verified.insert((gamma, s));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use num::BigUint;

    use super::*;

    fn cyc(n: usize, s: &str) -> Permutation {
        Permutation::parse_cycles(n, s).unwrap()
    }

    #[test]
    fn symmetric_group_order() {
        let gens = [cyc(6, "(0 1 2 3 4 5)"), cyc(6, "(0 1)")];
        let bsgs = schreier_sims(6, TransversalKind::SchreierTree, &gens, &[]);
        assert_eq!(bsgs.order(), BigUint::from(720u32));
        assert!(bsgs.is_symmetric_group());
        assert_eq!(bsgs.base().len(), 5);
    }

    #[test]
    fn prescribed_base_is_kept() {
        let gens = [cyc(5, "(0 1 2 3 4)"), cyc(5, "(1 4)(2 3)")];
        let bsgs = schreier_sims(5, TransversalKind::Explicit, &gens, &[3, 0]);
        assert_eq!(&bsgs.base()[..2], &[3, 0]);
        assert_eq!(bsgs.order_u64(), Some(10));
    }

    #[test]
    fn identity_generators_only() {
        let bsgs = schreier_sims(3, TransversalKind::SchreierTree, &[Permutation::id(3)], &[]);
        assert!(bsgs.base().is_empty());
        assert_eq!(bsgs.order_u64(), Some(1));
        assert!(bsgs.sifts(&Permutation::id(3)));
    }
}
