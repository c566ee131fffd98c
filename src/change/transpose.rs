use rand::Rng;

use crate::{bsgs::Bsgs, permutation::Permutation, transversal::Transversal};

/// Exchanges the base points at `level` and `level + 1`.
///
/// The orbit of the new `β_level` is recomputed directly. The new level
/// `level + 1` must have size `|U_level| |U_{level+1}| / |U'_level|`; it is
/// grown by adding elements of `G^(level)` that fix the new `β_level`, drawn
/// either at random or from the Schreier generators of the new level.
pub(crate) fn transpose<R: Rng + ?Sized>(bsgs: &mut Bsgs, level: usize, rng: Option<&mut R>) {
    let old_upper = bsgs.transversal(level).clone();
    let old_lower = bsgs.transversal(level + 1).clone();
    let product = old_upper.size() * old_lower.size();

    bsgs.swap_base_points(level);
    bsgs.recompute_level(level);
    let target = product / bsgs.transversal(level).size();
    bsgs.recompute_level(level + 1);

    match rng {
        Some(rng) => {
            while bsgs.transversal(level + 1).size() < target {
                let g = random_stabilizer_element(bsgs, level, &old_upper, &old_lower, rng);
                try_extend(bsgs, level + 1, g);
            }
        }
        None => {
            let gens = bsgs.stabilizer_generators(level);
            let points: Vec<usize> = bsgs.transversal(level).points().collect();
            'outer: for gamma in points {
                for &s in &gens {
                    if bsgs.transversal(level + 1).size() >= target {
                        break 'outer;
                    }
                    if let Some(g) = schreier_generator(bsgs, level, gamma, &bsgs.arena()[s]) {
                        try_extend(bsgs, level + 1, g);
                    }
                }
            }
        }
    }
    assert_eq!(
        bsgs.transversal(level + 1).size(),
        target,
        "base transposition at level {level} did not reach the expected orbit size"
    );
    log::trace!(
        "transposed level {level}: base {:?}, orbit sizes {:?}",
        bsgs.base(),
        bsgs.orbit_sizes()
    );
}

/// Random element of `G^(level)` built from the transversals before the
/// exchange, divided by the new representative so that it fixes the new
/// `β_level`.
fn random_stabilizer_element<R: Rng + ?Sized>(
    bsgs: &Bsgs,
    level: usize,
    old_upper: &Transversal,
    old_lower: &Transversal,
    rng: &mut R,
) -> Permutation {
    let mut g = bsgs.random(level + 2, rng);
    for u in [old_lower, old_upper] {
        let point = u.nth_point(rng.gen_range(0..u.size()));
        if let Some(rep) = u.at(bsgs.arena(), point) {
            g.then_assign(&rep);
        }
    }
    let beta = bsgs.base()[level];
    match bsgs.representative(level, g.apply(beta)) {
        Some(u) => g.then(&u.inverse()),
        None => unreachable!("orbit of level {level} is not closed"),
    }
}

fn schreier_generator(bsgs: &Bsgs, level: usize, gamma: usize, s: &Permutation) -> Option<Permutation> {
    let u = bsgs.representative(level, gamma)?;
    let u_image = bsgs.representative(level, s.apply(gamma))?;
    Some(u.then(s).then(&u_image.inverse()))
}

/// Adds `g` as a strong generator if it enlarges the orbit at `level`.
fn try_extend(bsgs: &mut Bsgs, level: usize, g: Permutation) {
    if g.is_identity() {
        return;
    }
    let beta = bsgs.base()[level];
    if (0..level).any(|l| g.apply(bsgs.base()[l]) != bsgs.base()[l]) {
        return;
    }
    let id = bsgs.push_generator(g);
    let gens = bsgs.stabilizer_generators(level);
    let (transversal, arena) = bsgs.transversal_mut(level);
    if !transversal.orbit_update(arena, beta, &gens, id) {
        bsgs.pop_generator();
    }
}
