//! Ordered partitions of the domain for partition backtracking.
//!
//! Cells are stored contiguously in one array and every cell is kept sorted
//! by point. Splitting a cell always appends the split-off part as the last
//! cell, so intersections can be undone in reverse order by merging the last
//! cell back into the one it came from.

use std::fmt;

use itertools::Itertools;

pub mod r_base;
pub mod refinement;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    elements: Vec<usize>,
    cell_start: Vec<usize>,
    cell_len: Vec<usize>,
    cell_of: Vec<usize>,
    fix: Vec<usize>,
}

impl Partition {
    /// The partition with a single cell.
    pub fn new(degree: usize) -> Self {
        let (cell_start, cell_len) = if degree == 0 {
            (vec![], vec![])
        } else {
            (vec![0], vec![degree])
        };
        Partition {
            elements: (0..degree).collect(),
            cell_start,
            cell_len,
            cell_of: vec![0; degree],
            fix: Vec::new(),
        }
    }

    pub fn degree(&self) -> usize {
        self.elements.len()
    }

    pub fn cells(&self) -> usize {
        self.cell_start.len()
    }

    pub fn cell(&self, c: usize) -> &[usize] {
        let start = self.cell_start[c];
        &self.elements[start..start + self.cell_len[c]]
    }

    pub fn cell_of(&self, x: usize) -> usize {
        self.cell_of[x]
    }

    /// Points in singleton cells, in the order they became singletons.
    pub fn fix_points(&self) -> &[usize] {
        &self.fix
    }

    pub fn is_discrete(&self) -> bool {
        self.cells() == self.degree()
    }

    /// Whether some point of `set` lies in cell `c`.
    pub fn intersects(&self, set: &[usize], c: usize) -> bool {
        set.iter().any(|&x| self.cell_of[x] == c)
    }

    /// Splits cell `c` into its intersection with the sorted `set`, which
    /// keeps index `c`, and the rest, which becomes the new last cell.
    /// Returns `false` and leaves the partition untouched if this does not
    /// split the cell.
    pub fn intersect(&mut self, set: &[usize], c: usize) -> bool {
        debug_assert!(set.windows(2).all(|w| w[0] < w[1]), "{set:?} is not sorted");
        if c >= self.cells() || self.cell_len[c] <= 1 || !self.intersects(set, c) {
            return false;
        }

        let (inside, outside): (Vec<usize>, Vec<usize>) = self
            .cell(c)
            .iter()
            .copied()
            .partition(|x| set.binary_search(x).is_ok());
        if outside.is_empty() {
            return false;
        }

        let start = self.cell_start[c];
        let split = start + inside.len();
        self.elements[start..split].copy_from_slice(&inside);
        self.elements[split..split + outside.len()].copy_from_slice(&outside);

        if inside.len() == 1 {
            self.fix.push(inside[0]);
        }
        if outside.len() == 1 {
            self.fix.push(outside[0]);
        }

        let new_cell = self.cells();
        self.cell_len[c] = inside.len();
        self.cell_start.push(split);
        self.cell_len.push(outside.len());
        for &x in &outside {
            self.cell_of[x] = new_cell;
        }
        true
    }

    /// Reverts the most recent successful [`Partition::intersect`].
    pub fn undo_intersection(&mut self) -> bool {
        let Some(&start) = self.cell_start.last() else {
            return false;
        };
        if start == 0 {
            return false;
        }
        let len = self.cell_len[self.cells() - 1];
        self.cell_start.pop();
        self.cell_len.pop();

        let origin = self.cell_of[self.elements[start - 1]];
        for i in start..start + len {
            self.cell_of[self.elements[i]] = origin;
        }
        let origin_start = self.cell_start[origin];
        self.elements[origin_start..start + len].sort_unstable();

        if len == 1 {
            self.fix.pop();
        }
        if self.cell_len[origin] == 1 {
            self.fix.pop();
        }
        self.cell_len[origin] += len;
        true
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells = (0..self.cells()).map(|c| self.cell(c).iter().join(" "));
        write!(f, "[{}]", cells.format(" | "))
    }
}
