use bitvec::vec::BitVec;
use itertools::Itertools;

use crate::{
    bsgs::Bsgs,
    change::ConjugatingBaseChange,
    config::BaseTranspose,
    permutation::Permutation,
};

/// Lexicographically smallest image of a point set under a group (Linton's
/// algorithm).
///
/// The smallest image is built one point at a time. After `i` points the
/// candidates are the images of the set that contain those points; the next
/// point is the least orbit minimum, under the stabilizer of the chosen
/// points, of any remaining candidate point. The base of an internal copy of
/// the group is changed to follow the chosen points.
///
/// ```
/// # use stabchain::{api::schreier_sims_construct, config::BaseTranspose, permutation::Permutation};
/// # use stabchain::search::lex_min::OrbitLexMinSearch;
/// let c6 = schreier_sims_construct(6, &[Permutation::parse_cycles(6, "(0 1 2 3 4 5)").unwrap()], &[]).unwrap();
/// let mut search = OrbitLexMinSearch::new(&c6, BaseTranspose::default());
/// assert_eq!(search.lex_min(&[2, 4, 5]), vec![0, 1, 4]);
/// ```
pub struct OrbitLexMinSearch {
    group: Bsgs,
    base_change: ConjugatingBaseChange,
}

impl OrbitLexMinSearch {
    pub fn new(group: &Bsgs, strategy: BaseTranspose) -> Self {
        OrbitLexMinSearch {
            group: group.clone(),
            base_change: ConjugatingBaseChange::new(strategy),
        }
    }

    /// The smallest image of `set`, sorted.
    pub fn lex_min(&mut self, set: &[usize]) -> Vec<usize> {
        let degree = self.group.degree();
        let mut start: BitVec = BitVec::repeat(false, degree);
        for &x in set {
            start.set(x, true);
        }
        let k = start.count_ones();
        if k == 0 || k == degree {
            return start.iter_ones().collect();
        }

        let mut candidates = vec![start];
        let mut chosen: BitVec = BitVec::repeat(false, degree);
        let mut base = Vec::with_capacity(k);
        for i in 0..k {
            if (i..self.group.base().len()).all(|l| self.group.transversal(l).size() <= 1) {
                log::trace!("stabilizer trivial after {i} points, {} candidates", candidates.len());
                return candidates
                    .iter()
                    .min_by(|a, b| a.iter_ones().cmp(b.iter_ones()))
                    .map(|d| d.iter_ones().collect())
                    .unwrap_or_default();
            }

            let generators: Vec<&Permutation> = self
                .group
                .stabilizer_generators(i)
                .into_iter()
                .map(|id| &self.group.arena()[id])
                .collect();
            let mut orbit_min: Vec<Option<usize>> = vec![None; degree];
            let mut m = usize::MAX;
            let mut pass: Vec<&BitVec> = Vec::new();
            for d in &candidates {
                let m_d = d
                    .iter_ones()
                    .filter(|&j| !chosen[j])
                    .map(|j| *orbit_min[j].get_or_insert_with(|| orb_min(j, &generators)))
                    .min()
                    .unwrap_or(usize::MAX);
                if m_d < m {
                    m = m_d;
                    pass.clear();
                }
                if m_d == m {
                    pass.push(d);
                }
            }
            chosen.set(m, true);
            if i == k - 1 {
                break;
            }

            base.push(m);
            self.base_change.change(&mut self.group, &base, false);
            let mut inverse_rep: Vec<Option<Option<Permutation>>> = vec![None; degree];
            let mut next = Vec::new();
            for d in pass {
                for j in d.iter_ones() {
                    let group = &self.group;
                    let rep = inverse_rep[j].get_or_insert_with(|| group.representative(i, j).map(|u| u.inverse()));
                    let Some(u_inv) = rep else {
                        continue;
                    };
                    let mut image: BitVec = BitVec::repeat(false, degree);
                    for x in d.iter_ones() {
                        image.set(u_inv.apply(x), true);
                    }
                    next.push(image);
                }
            }
            candidates = next.into_iter().unique().collect();
        }
        chosen.iter_ones().collect()
    }
}

/// Smallest point in the orbit of `alpha`.
fn orb_min(alpha: usize, generators: &[&Permutation]) -> usize {
    if alpha == 0 {
        return 0;
    }
    let degree = generators.first().map_or(0, |g| g.len());
    let mut seen: BitVec = BitVec::repeat(false, degree.max(alpha + 1));
    seen.set(alpha, true);
    let mut orbit = vec![alpha];
    let mut min = alpha;
    let mut next = 0;
    while next < orbit.len() {
        let beta = orbit[next];
        next += 1;
        for g in generators {
            let image = g.apply(beta);
            if image == 0 {
                return 0;
            }
            if !seen[image] {
                seen.set(image, true);
                orbit.push(image);
                min = min.min(image);
            }
        }
    }
    min
}
