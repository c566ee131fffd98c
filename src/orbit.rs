//! Orbits of points and point sets under a group given by generators.
//!
//! Orbits are stored in an insertion ordered set, so iteration follows the
//! breadth-first discovery order and membership is a hash lookup.

use std::hash::Hash;

use indexmap::IndexSet;

use crate::permutation::Permutation;

pub type OrbitSet<T> = IndexSet<T, ahash::RandomState>;

/// How a permutation moves an element of type `T`.
pub trait Action<T> {
    fn act(&self, g: &Permutation, x: &T) -> T;
}

/// The natural action on points.
#[derive(Debug, Clone, Copy, Default)]
pub struct PointAction;

impl Action<usize> for PointAction {
    #[inline]
    fn act(&self, g: &Permutation, x: &usize) -> usize {
        g.apply(*x)
    }
}

/// Action on sorted point sets.
#[derive(Debug, Clone, Copy, Default)]
pub struct SetAction;

impl Action<Vec<usize>> for SetAction {
    fn act(&self, g: &Permutation, x: &Vec<usize>) -> Vec<usize> {
        g.apply_set(x)
    }
}

/// Closes `orbit` under `generators`, starting the breadth-first scan at
/// position `from`. Every element seen for the first time is reported to
/// `on_new` as `(element it was reached from, generator key, new element)`.
pub fn closure<T, K, A>(
    orbit: &mut OrbitSet<T>,
    from: usize,
    generators: &[(K, &Permutation)],
    action: &A,
    mut on_new: impl FnMut(&T, K, &T),
) where
    T: Hash + Eq + Clone,
    K: Copy,
    A: Action<T>,
{
    let mut i = from;
    while i < orbit.len() {
        let x = orbit[i].clone();
        for &(key, g) in generators {
            let y = action.act(g, &x);
            if !orbit.contains(&y) {
                on_new(&x, key, &y);
                orbit.insert(y);
            }
        }
        i += 1;
    }
}

/// Orbit of `seed`, in discovery order.
///
/// ```
/// # use stabchain::permutation::Permutation;
/// # use stabchain::orbit::{orbit, PointAction};
/// let g = Permutation::parse_cycles(5, "(0 1 2)").unwrap();
/// let o = orbit(1, &[&g], &PointAction);
/// assert_eq!(o.iter().copied().collect::<Vec<_>>(), vec![1, 2, 0]);
/// ```
pub fn orbit<T, A>(seed: T, generators: &[&Permutation], action: &A) -> OrbitSet<T>
where
    T: Hash + Eq + Clone,
    A: Action<T>,
{
    let mut set = OrbitSet::default();
    set.insert(seed);
    let keyed: Vec<(usize, &Permutation)> = generators.iter().copied().enumerate().collect();
    closure(&mut set, 0, &keyed, action, |_, _, _| {});
    set
}

/// Grows an orbit that is already closed under all generators except
/// `new_generator`. `generators` must contain `new_generator` as well.
///
/// Only `new_generator` is applied to the points known before the call; the
/// points that it discovers are then closed under everything. Returns `true`
/// if the orbit grew.
pub fn orbit_update<T, K, A>(
    orbit: &mut OrbitSet<T>,
    generators: &[(K, &Permutation)],
    new_generator: (K, &Permutation),
    action: &A,
    mut on_new: impl FnMut(&T, K, &T),
) -> bool
where
    T: Hash + Eq + Clone,
    K: Copy,
    A: Action<T>,
{
    let old_len = orbit.len();
    let (key, g) = new_generator;
    for i in 0..old_len {
        let x = orbit[i].clone();
        let y = action.act(g, &x);
        if !orbit.contains(&y) {
            on_new(&x, key, &y);
            orbit.insert(y);
        }
    }
    if orbit.len() == old_len {
        return false;
    }
    closure(orbit, old_len, generators, action, on_new);
    true
}

/// All orbits of the group on `0..degree`, each listed in discovery order,
/// ordered by their smallest point.
pub fn orbits(degree: usize, generators: &[&Permutation]) -> Vec<Vec<usize>> {
    let mut seen = vec![false; degree];
    let mut result = Vec::new();
    for x in 0..degree {
        if seen[x] {
            continue;
        }
        let o = orbit(x, generators, &PointAction);
        for &y in &o {
            seen[y] = true;
        }
        result.push(o.into_iter().collect());
    }
    result
}
