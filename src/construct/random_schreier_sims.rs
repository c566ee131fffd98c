use num::BigUint;

use crate::{bsgs::Bsgs, config::RandomSchreierSimsConfig, permutation::Permutation};

use super::ProductReplacement;

/// Randomized Schreier–Sims.
///
/// Random elements from product replacement are sifted; a non-trivial residue
/// becomes a new strong generator. With `known_order` the construction stops
/// as soon as that order is reached and the result is guaranteed. Without it,
/// it stops after `config.consecutive_sifts` trivial sifts in a row and the
/// result may describe a proper subgroup.
///
/// Returns the BSGS and whether it is guaranteed to be complete.
pub fn random_schreier_sims(
    degree: usize,
    generators: &[Permutation],
    known_order: Option<&BigUint>,
    prescribed_base: &[usize],
    config: &RandomSchreierSimsConfig,
) -> (Bsgs, bool) {
    let mut bsgs = super::initial_bsgs(degree, config.transversal, generators, prescribed_base);
    for g in generators {
        let (stopped_at, residue) = bsgs.sift(g, 0);
        if stopped_at < bsgs.base().len() || !residue.is_identity() {
            bsgs.insert_generator(residue, true);
        }
    }

    let non_trivial: Vec<Permutation> = generators.iter().filter(|g| !g.is_identity()).cloned().collect();
    if non_trivial.is_empty() {
        let guaranteed = known_order.map_or(true, |order| bsgs.order() == *order);
        return (bsgs, guaranteed);
    }

    let mut random = ProductReplacement::new(&non_trivial, config.seed);
    let mut consecutive = 0;
    let mut rounds = 0;
    let guaranteed = loop {
        if let Some(order) = known_order {
            if bsgs.order() >= *order {
                break true;
            }
        } else if consecutive >= config.consecutive_sifts {
            break false;
        }
        if rounds >= config.max_rounds {
            log::warn!(
                "random schreier-sims stopped after {rounds} samples at order {}",
                bsgs.order()
            );
            break false;
        }
        rounds += 1;

        let Some(g) = random.next() else {
            break false;
        };
        let (stopped_at, residue) = bsgs.sift(&g, 0);
        if stopped_at < bsgs.base().len() || !residue.is_identity() {
            bsgs.insert_generator(residue, true);
            consecutive = 0;
        } else {
            consecutive += 1;
        }
    };

    log::debug!(
        "random schreier-sims: {rounds} samples, base {:?}, order {}, guaranteed {guaranteed}",
        bsgs.base(),
        bsgs.order()
    );
    (bsgs, guaranteed)
}
