use rand::{rngs::SmallRng, Rng, SeedableRng};

use crate::permutation::Permutation;

const MIN_SLOTS: usize = 10;
const WARM_UP: usize = 50;

/// Product replacement generator of (nearly uniform) random group elements.
///
/// Keeps a pool of group elements and repeatedly replaces one of them by its
/// product with another one or its inverse.
#[derive(Debug, Clone)]
pub struct ProductReplacement {
    slots: Vec<Permutation>,
    rng: SmallRng,
}

impl ProductReplacement {
    /// `generators` must be non-empty.
    pub fn new(generators: &[Permutation], seed: u64) -> Self {
        assert!(!generators.is_empty(), "product replacement needs a generator");
        let len = MIN_SLOTS.max(2 * generators.len());
        let slots = generators.iter().cycle().take(len).cloned().collect();
        let mut pr = ProductReplacement {
            slots,
            rng: SmallRng::seed_from_u64(seed),
        };
        for _ in 0..WARM_UP {
            pr.step();
        }
        pr
    }

    fn step(&mut self) -> usize {
        let n = self.slots.len();
        let i = self.rng.gen_range(0..n);
        let mut j = self.rng.gen_range(0..n - 1);
        if j >= i {
            j += 1;
        }
        let factor = if self.rng.gen_bool(0.5) {
            self.slots[j].clone()
        } else {
            self.slots[j].inverse()
        };
        if self.rng.gen_bool(0.5) {
            self.slots[i].then_assign(&factor);
        } else {
            self.slots[i] = factor.then(&self.slots[i]);
        }
        i
    }
}

impl Iterator for ProductReplacement {
    type Item = Permutation;

    fn next(&mut self) -> Option<Permutation> {
        let i = self.step();
        Some(self.slots[i].clone())
    }
}
