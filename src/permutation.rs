//! # Permutations
//!
//! This module provides the `Permutation` struct used throughout the crate
//! to represent elements of a permutation group acting on `0..n`.
//!
//! ## Key Features:
//!
//! - **Representation**: A `Permutation` is stored by its direct mapping (`map[i]` is
//!   the image of `i`) and its inverse mapping, so both `apply` and
//!   `apply_inverse` are O(1).
//! - **Construction**:
//!   - Identity permutation: `Permutation::id(n)`.
//!   - From a mapping vector: `Permutation::try_from_map(vec![...])` (checked) or
//!     `Permutation::from_map(vec![...])` (debug-checked).
//!   - From disjoint cycles: `Permutation::from_disjoint_cycles(n, &[vec![...]])`.
//!   - From cycle notation: `Permutation::parse_cycles(n, "(0 1 2)(3 4)")`.
//! - **Group Operations**:
//!   - `p.then(&q)`: apply `p`, then `q`. This is the product used by the
//!     stabilizer chain code, where group elements act from the right.
//!   - `p.compose(&q)`: apply `q`, then `p`.
//!   - Inverse: `p.inverse()`, `p.invert_in_place()`.
//!   - Conjugation: `p.conjugate_by(&g)` is `g⁻¹ p g`.
//! - **Cycle Utilities**:
//!   - `p.find_cycles()`, `p.cycles(include_trivial)` (minimal element and length
//!     of every cycle), `p.order()` (as a `BigUint`, so it cannot overflow).
//! - **Brute force**: `Permutation::generate_all(generators)` enumerates the whole
//!   group; only sensible for small groups and used as a test oracle.

use std::{fmt, ops::Index};

use ahash::AHashSet;
use itertools::Itertools;
use num::{BigUint, One};
use thiserror::Error;

pub mod arena;

pub use arena::{PermArena, PermId};

/// Largest supported domain size.
pub const MAX_DEGREE: usize = u32::MAX as usize;

/// A permutation of `0..n`.
///
/// # Examples
///
/// ```
/// use stabchain::permutation::Permutation;
///
/// // 0->2, 1->0, 2->1, 3->3
/// let p = Permutation::try_from_map(vec![2, 0, 1, 3]).unwrap();
/// assert_eq!(p.apply(0), 2);
/// assert_eq!(p.apply_inverse(0), 1);
/// assert_eq!(p.to_string(), "(0 2 1)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "bincode", derive(bincode::Encode, bincode::Decode))]
pub struct Permutation {
    map: Vec<usize>,
    inv: Vec<usize>,
}

/// Ordering on permutations is the lexicographic ordering of their image arrays.
impl PartialOrd for Permutation {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Permutation {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.map.cmp(&other.map)
    }
}

impl Permutation {
    // --------------------------------------------------------------------------------------------
    // Basic Constructors and Accessors
    // --------------------------------------------------------------------------------------------

    /// Creates the identity permutation of length `n`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use stabchain::permutation::Permutation;
    /// let p = Permutation::id(4);
    /// assert!(p.is_identity());
    /// assert_eq!(p.len(), 4);
    /// ```
    pub fn id(n: usize) -> Self {
        Permutation {
            map: (0..n).collect(),
            inv: (0..n).collect(),
        }
    }

    /// Creates a permutation from a mapping vector without validating it.
    /// `map[i]` is the image of `i`.
    ///
    /// Bijectivity is only checked in debug builds; use [`Permutation::try_from_map`]
    /// for input that did not originate in this crate.
    pub fn from_map(map: Vec<usize>) -> Self {
        debug_assert!(
            is_bijection(&map),
            "image array {map:?} is not a bijection"
        );
        let mut inv = vec![0; map.len()];
        for (i, &j) in map.iter().enumerate() {
            inv[j] = i;
        }
        Permutation { map, inv }
    }

    /// Creates a permutation from a mapping vector, rejecting anything that is
    /// not a bijection on `0..map.len()`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use stabchain::permutation::{Permutation, PermutationError};
    /// assert!(Permutation::try_from_map(vec![1, 2, 0]).is_ok());
    /// assert_eq!(
    ///     Permutation::try_from_map(vec![1, 1, 0]),
    ///     Err(PermutationError::NotBijective)
    /// );
    /// ```
    pub fn try_from_map(map: Vec<usize>) -> Result<Self, PermutationError> {
        let degree = map.len();
        if degree > MAX_DEGREE {
            return Err(PermutationError::DegreeOverflow { degree });
        }
        if let Some(&point) = map.iter().find(|&&x| x >= degree) {
            return Err(PermutationError::PointOutOfDomain { point, degree });
        }
        if !is_bijection(&map) {
            return Err(PermutationError::NotBijective);
        }
        Ok(Self::from_map(map))
    }

    /// The transposition swapping `a` and `b` on `0..n`.
    pub fn transposition(n: usize, a: usize, b: usize) -> Self {
        assert!(a < n && b < n, "transposition ({a} {b}) outside 0..{n}");
        let mut map: Vec<usize> = (0..n).collect();
        map.swap(a, b);
        Self::from_map(map)
    }

    /// Returns the mapping as a slice.
    pub fn map(&self) -> &[usize] {
        &self.map
    }

    /// Returns the inverse mapping as a slice.
    pub fn inv(&self) -> &[usize] {
        &self.inv
    }

    /// Number of points this permutation acts on.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Image of `x`.
    #[inline]
    pub fn apply(&self, x: usize) -> usize {
        self.map[x]
    }

    /// The point mapped onto `x`.
    #[inline]
    pub fn apply_inverse(&self, x: usize) -> usize {
        self.inv[x]
    }

    /// Image of a point set, sorted.
    pub fn apply_set(&self, set: &[usize]) -> Vec<usize> {
        set.iter().map(|&x| self.map[x]).sorted_unstable().collect()
    }

    // --------------------------------------------------------------------------------------------
    // Group Operations
    // --------------------------------------------------------------------------------------------

    /// Returns the inverse of the permutation.
    ///
    /// # Examples
    ///
    /// ```
    /// # use stabchain::permutation::Permutation;
    /// let p = Permutation::try_from_map(vec![2, 0, 1]).unwrap();
    /// assert!(p.then(&p.inverse()).is_identity());
    /// ```
    pub fn inverse(&self) -> Self {
        Permutation {
            map: self.inv.clone(),
            inv: self.map.clone(),
        }
    }

    pub fn invert_in_place(&mut self) {
        std::mem::swap(&mut self.map, &mut self.inv);
    }

    /// Composes `self` with another permutation `other`, returning a new permutation:
    /// `(self ◦ other)(i) = self.map[other.map[i]]`.
    pub fn compose(&self, other: &Self) -> Self {
        assert_eq!(self.len(), other.len(), "degree mismatch in composition");
        let map = other.map.iter().map(|&i| self.map[i]).collect();
        Self::from_map(map)
    }

    /// Applies `self` first and `other` second: `x ↦ other(self(x))`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use stabchain::permutation::Permutation;
    /// let a = Permutation::transposition(3, 0, 1);
    /// let b = Permutation::transposition(3, 1, 2);
    /// // 0 -a-> 1 -b-> 2
    /// assert_eq!(a.then(&b).apply(0), 2);
    /// assert_eq!(a.then(&b), b.compose(&a));
    /// ```
    pub fn then(&self, other: &Self) -> Self {
        other.compose(self)
    }

    /// Replaces `self` by `self.then(other)`.
    pub fn then_assign(&mut self, other: &Self) {
        assert_eq!(self.len(), other.len(), "degree mismatch in composition");
        for x in self.map.iter_mut() {
            *x = other.map[*x];
        }
        for (i, &j) in self.map.iter().enumerate() {
            self.inv[j] = i;
        }
    }

    /// Returns `g⁻¹ self g`, which maps `g(x)` to `g(self(x))`.
    pub fn conjugate_by(&self, g: &Self) -> Self {
        assert_eq!(self.len(), g.len(), "degree mismatch in conjugation");
        let mut map = vec![0; self.len()];
        for (x, &y) in self.map.iter().enumerate() {
            map[g.map[x]] = g.map[y];
        }
        Self::from_map(map)
    }

    /// Checks if this permutation is the identity permutation (i.e., does nothing).
    pub fn is_identity(&self) -> bool {
        self.map.iter().enumerate().all(|(i, &m)| i == m)
    }

    /// `1` for even permutations, `-1` for odd ones.
    pub fn sign(&self) -> i8 {
        let transpositions: usize = self.cycles(false).iter().map(|&(_, len)| len - 1).sum();
        if transpositions % 2 == 0 {
            1
        } else {
            -1
        }
    }

    /// `self` applied `k` times, by repeated squaring.
    pub fn pow(&self, k: usize) -> Self {
        let mut acc = Permutation::id(self.len());
        let mut square = self.clone();
        let mut k = k;
        while k > 0 {
            if k & 1 == 1 {
                acc.then_assign(&square);
            }
            square = square.then(&square);
            k >>= 1;
        }
        acc
    }

    // --------------------------------------------------------------------------------------------
    // Cycles
    // --------------------------------------------------------------------------------------------

    /// Returns the cycle decomposition, each cycle starting at its smallest element.
    ///
    /// ```
    /// # use stabchain::permutation::Permutation;
    /// let p = Permutation::try_from_map(vec![2, 0, 1, 3]).unwrap();
    /// assert_eq!(p.find_cycles(), vec![vec![0, 2, 1], vec![3]]);
    /// ```
    pub fn find_cycles(&self) -> Vec<Vec<usize>> {
        let mut seen = vec![false; self.len()];
        (0..self.len())
            .filter_map(|start| {
                if seen[start] {
                    return None;
                }
                let mut cycle = vec![start];
                seen[start] = true;
                let mut x = self.map[start];
                while x != start {
                    seen[x] = true;
                    cycle.push(x);
                    x = self.map[x];
                }
                Some(cycle)
            })
            .collect()
    }

    /// Lists every cycle as `(minimal element, length)`.
    ///
    /// Fixed points are included only if `include_trivial` is set.
    ///
    /// ```
    /// # use stabchain::permutation::Permutation;
    /// let p = Permutation::parse_cycles(5, "(1 3)(0 4 2)").unwrap();
    /// assert_eq!(p.cycles(false), vec![(0, 3), (1, 2)]);
    /// assert_eq!(Permutation::id(2).cycles(true), vec![(0, 1), (1, 1)]);
    /// ```
    pub fn cycles(&self, include_trivial: bool) -> Vec<(usize, usize)> {
        self.find_cycles()
            .into_iter()
            .filter(|c| include_trivial || c.len() > 1)
            .map(|c| (c[0], c.len()))
            .collect()
    }

    /// Smallest `c > 0` with `self^c` the identity.
    ///
    /// ```
    /// # use stabchain::permutation::Permutation;
    /// let p = Permutation::parse_cycles(5, "(0 1)(2 3 4)").unwrap();
    /// assert_eq!(p.order(), 6u32.into());
    /// ```
    pub fn order(&self) -> BigUint {
        self.cycles(false)
            .into_iter()
            .fold(BigUint::one(), |acc, (_, len)| {
                num::integer::lcm(acc, BigUint::from(len))
            })
    }

    /// Restricts `self` to an invariant subset, renumbering the subset as `0..subset.len()`
    /// in the order given.
    ///
    /// Panics if the subset is not mapped onto itself.
    pub fn restrict_to(&self, subset: &[usize]) -> Self {
        let mut position = vec![usize::MAX; self.len()];
        for (i, &x) in subset.iter().enumerate() {
            position[x] = i;
        }
        let map = subset
            .iter()
            .map(|&x| {
                let image = position[self.map[x]];
                assert!(image != usize::MAX, "subset is not invariant under {self}");
                image
            })
            .collect();
        Self::from_map(map)
    }

    // --------------------------------------------------------------------------------------------
    // Cycle Notation
    // --------------------------------------------------------------------------------------------

    /// Creates a permutation of `0..n` from a set of disjoint cycles.
    ///
    /// # Examples
    ///
    /// ```
    /// # use stabchain::permutation::Permutation;
    /// let cycles = vec![vec![0, 1, 2], vec![3, 4]];
    /// let p = Permutation::from_disjoint_cycles(6, &cycles).unwrap();
    /// assert_eq!(p.map(), &[1, 2, 0, 4, 3, 5]);
    ///
    /// // Error if cycles are not disjoint
    /// let invalid = vec![vec![0, 1], vec![1, 2]];
    /// assert!(Permutation::from_disjoint_cycles(3, &invalid).is_err());
    /// ```
    pub fn from_disjoint_cycles(n: usize, cycles: &[Vec<usize>]) -> Result<Self, PermutationError> {
        if n > MAX_DEGREE {
            return Err(PermutationError::DegreeOverflow { degree: n });
        }
        let mut seen = vec![false; n];
        let mut map: Vec<usize> = (0..n).collect();
        for cycle in cycles {
            for &idx in cycle {
                if idx >= n {
                    return Err(PermutationError::PointOutOfDomain {
                        point: idx,
                        degree: n,
                    });
                }
                if seen[idx] {
                    return Err(PermutationError::CyclesNotDisjoint(idx));
                }
                seen[idx] = true;
            }
            for (&x, &y) in cycle.iter().zip(cycle.iter().cycle().skip(1)) {
                map[x] = y;
            }
        }
        Ok(Self::from_map(map))
    }

    /// Parses cycle notation such as `"(0 1 2)(3 4)"` (commas are accepted as
    /// separators too). `"()"` and the empty string denote the identity.
    ///
    /// ```
    /// # use stabchain::permutation::Permutation;
    /// let p = Permutation::parse_cycles(4, "(0,1,2,3)").unwrap();
    /// assert_eq!(p.map(), &[1, 2, 3, 0]);
    /// assert!(Permutation::parse_cycles(4, "(0 4)").is_err());
    /// ```
    pub fn parse_cycles(n: usize, text: &str) -> Result<Self, PermutationError> {
        let mut cycles = Vec::new();
        let mut rest = text.trim();
        while !rest.is_empty() {
            let body_start = rest
                .strip_prefix('(')
                .ok_or_else(|| PermutationError::Parse(format!("expected '(' at {rest:?}")))?;
            let close = body_start
                .find(')')
                .ok_or_else(|| PermutationError::Parse(format!("unclosed cycle in {text:?}")))?;
            let cycle = body_start[..close]
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|t| !t.is_empty())
                .map(|t| {
                    t.parse::<usize>()
                        .map_err(|e| PermutationError::Parse(format!("{t:?}: {e}")))
                })
                .collect::<Result<Vec<_>, _>>()?;
            cycles.push(cycle);
            rest = body_start[close + 1..].trim_start();
        }
        Self::from_disjoint_cycles(n, &cycles)
    }

    // --------------------------------------------------------------------------------------------
    // Brute Force
    // --------------------------------------------------------------------------------------------

    /// Enumerates every element of the group generated by `generators`,
    /// identity included.
    pub fn generate_all(generators: &[Permutation]) -> Result<Vec<Permutation>, PermutationError> {
        let degree = generators.first().ok_or(PermutationError::EmptyGenerators)?.len();
        if generators.iter().any(|g| g.len() != degree) {
            return Err(PermutationError::InvalidGeneratorLength);
        }
        let identity = Permutation::id(degree);
        let mut seen: AHashSet<Permutation> = AHashSet::from_iter([identity.clone()]);
        let mut queue = vec![identity];
        while let Some(g) = queue.pop() {
            queue.extend(generators.iter().map(|s| g.then(s)).filter(|h| seen.insert(h.clone())));
        }
        Ok(seen.into_iter().collect())
    }
}

fn is_bijection(map: &[usize]) -> bool {
    let mut seen = vec![false; map.len()];
    for &x in map {
        if x >= map.len() || seen[x] {
            return false;
        }
        seen[x] = true;
    }
    true
}

impl fmt::Display for Permutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cycles = self.find_cycles().into_iter().filter(|c| c.len() > 1).collect_vec();
        if cycles.is_empty() {
            return f.write_str("()");
        }
        cycles.iter().try_for_each(|c| write!(f, "({})", c.iter().join(" ")))
    }
}

impl Index<usize> for Permutation {
    type Output = usize;

    fn index(&self, index: usize) -> &Self::Output {
        &self.map[index]
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PermutationError {
    #[error("image array is not a bijection")]
    NotBijective,

    #[error("point {point} lies outside the domain 0..{degree}")]
    PointOutOfDomain { point: usize, degree: usize },

    #[error("domain size {degree} exceeds the supported maximum")]
    DegreeOverflow { degree: usize },

    #[error("point {0} occurs in more than one cycle")]
    CyclesNotDisjoint(usize),

    #[error("malformed cycle notation: {0}")]
    Parse(String),

    #[error("generators act on different numbers of points")]
    InvalidGeneratorLength,

    #[error("no generators given")]
    EmptyGenerators,
}
