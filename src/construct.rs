//! Building a [`Bsgs`] from generators.
//!
//! - [`schreier_sims`]: deterministic Schreier–Sims, always correct.
//! - [`random_schreier_sims`]: sifts random elements; correct when the group
//!   order is known in advance, Monte-Carlo otherwise.

use crate::{bsgs::Bsgs, config::TransversalKind, permutation::Permutation};

pub mod product_replacement;
pub mod random_schreier_sims;
pub mod schreier_sims;

pub use product_replacement::ProductReplacement;
pub use random_schreier_sims::random_schreier_sims;
pub use schreier_sims::schreier_sims;

/// A BSGS whose base starts with `prescribed_base`, extended so that no
/// non-identity generator fixes the whole base. No transversal is computed.
fn initial_bsgs(
    degree: usize,
    kind: TransversalKind,
    generators: &[Permutation],
    prescribed_base: &[usize],
) -> Bsgs {
    let mut bsgs = Bsgs::new(degree, kind);
    for &beta in prescribed_base {
        bsgs.push_base_point(beta);
    }
    for g in generators {
        if g.is_identity() {
            continue;
        }
        if bsgs.level_of(g) == bsgs.base().len() {
            if let Some(beta) = bsgs.choose_base_element(g) {
                bsgs.push_base_point(beta);
            }
        }
    }
    bsgs
}
