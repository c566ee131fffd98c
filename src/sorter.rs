/// Total order on points induced by a reference sequence (usually a base):
/// points of the sequence come first, in sequence order, and all other
/// points follow ordered by value.
#[derive(Debug, Clone)]
pub struct BaseSorter {
    rank: Vec<usize>,
}

impl BaseSorter {
    pub fn new(degree: usize, reference: &[usize]) -> Self {
        let mut rank: Vec<usize> = (0..degree).map(|x| reference.len() + x).collect();
        for (i, &b) in reference.iter().enumerate() {
            rank[b] = i;
        }
        BaseSorter { rank }
    }

    #[inline]
    pub fn rank(&self, x: usize) -> usize {
        self.rank[x]
    }

    #[inline]
    pub fn less(&self, a: usize, b: usize) -> bool {
        self.rank[a] < self.rank[b]
    }

    pub fn sort(&self, points: &mut [usize]) {
        points.sort_unstable_by_key(|&x| self.rank[x]);
    }
}
