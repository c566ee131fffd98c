use crate::permutation::Permutation;

use super::Bsgs;

/// Iterator over all elements of a group, produced as products of one coset
/// representative per level.
pub struct Elements<'a> {
    bsgs: &'a Bsgs,
    representatives: Vec<Vec<Permutation>>,
    counters: Vec<usize>,
    done: bool,
}

impl<'a> Elements<'a> {
    pub(super) fn new(bsgs: &'a Bsgs) -> Self {
        let representatives: Vec<Vec<Permutation>> = bsgs
            .transversals()
            .iter()
            .map(|u| {
                u.points()
                    .filter_map(|p| u.at(bsgs.arena(), p))
                    .collect()
            })
            .collect();
        Elements {
            counters: vec![0; representatives.len()],
            bsgs,
            representatives,
            done: false,
        }
    }
}

impl Iterator for Elements<'_> {
    type Item = Permutation;

    fn next(&mut self) -> Option<Permutation> {
        if self.done {
            return None;
        }
        // u_{k-1} then ... then u_0
        let mut g = Permutation::id(self.bsgs.degree());
        for (level, reps) in self.representatives.iter().enumerate().rev() {
            g.then_assign(&reps[self.counters[level]]);
        }

        self.done = true;
        for (level, counter) in self.counters.iter_mut().enumerate() {
            *counter += 1;
            if *counter < self.representatives[level].len() {
                self.done = false;
                break;
            }
            *counter = 0;
        }
        Some(g)
    }
}
