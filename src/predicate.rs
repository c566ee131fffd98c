//! Properties that define the subgroup (or coset) a backtrack search looks for.
//!
//! A predicate `P` must describe a subgroup `G(P) = { g ∈ G : P(g) }` or a
//! coset of one. Besides the full test it offers a cheap necessary condition
//! on partial elements, which is what prunes the search tree.

use ahash::AHashSet;

use crate::{bsgs::Bsgs, permutation::Permutation};

pub trait SubgroupPredicate {
    /// Full test on a group element.
    fn test(&self, p: &Permutation) -> bool;

    /// Necessary condition on an element `h` that is only known to be
    /// correct on the base points up to `level`. `base_point` is `B[level]`.
    fn child_restriction(&self, h: &Permutation, level: usize, base_point: usize) -> bool;

    /// Backtrack depth after which every element passing the child
    /// restrictions satisfies the predicate, provided the base starts with
    /// [`SubgroupPredicate::base_prefix`]. `usize::MAX` if there is no such
    /// depth.
    fn limit(&self) -> usize;

    /// Points the search base should begin with.
    fn base_prefix(&self) -> Option<Vec<usize>> {
        None
    }
}

fn membership(degree: usize, set: &[usize]) -> Vec<bool> {
    let mut mask = vec![false; degree];
    for &x in set {
        mask[x] = true;
    }
    mask
}

/// Elements mapping `Δ` onto itself.
#[derive(Debug, Clone)]
pub struct SetwiseStabilizer {
    set: Vec<usize>,
    mask: Vec<bool>,
}

impl SetwiseStabilizer {
    pub fn new(degree: usize, set: &[usize]) -> Self {
        let mut set = set.to_vec();
        set.sort_unstable();
        set.dedup();
        SetwiseStabilizer {
            mask: membership(degree, &set),
            set,
        }
    }
}

impl SubgroupPredicate for SetwiseStabilizer {
    fn test(&self, p: &Permutation) -> bool {
        self.set.iter().all(|&x| self.mask[p.apply(x)])
    }

    fn child_restriction(&self, h: &Permutation, _level: usize, base_point: usize) -> bool {
        self.mask[base_point] == self.mask[h.apply(base_point)]
    }

    fn limit(&self) -> usize {
        self.set.len()
    }

    fn base_prefix(&self) -> Option<Vec<usize>> {
        Some(self.set.clone())
    }
}

/// Elements mapping `Δ` onto `Γ`; a coset of the stabilizer of `Δ`.
#[derive(Debug, Clone)]
pub struct SetImage {
    from: Vec<usize>,
    from_mask: Vec<bool>,
    to_mask: Vec<bool>,
}

impl SetImage {
    pub fn new(degree: usize, from: &[usize], to: &[usize]) -> Self {
        let mut from = from.to_vec();
        from.sort_unstable();
        from.dedup();
        SetImage {
            from_mask: membership(degree, &from),
            to_mask: membership(degree, to),
            from,
        }
    }
}

impl SubgroupPredicate for SetImage {
    fn test(&self, p: &Permutation) -> bool {
        self.from.iter().all(|&x| self.to_mask[p.apply(x)])
    }

    fn child_restriction(&self, h: &Permutation, _level: usize, base_point: usize) -> bool {
        self.from_mask[base_point] == self.to_mask[h.apply(base_point)]
    }

    fn limit(&self) -> usize {
        self.from.len()
    }

    fn base_prefix(&self) -> Option<Vec<usize>> {
        Some(self.from.clone())
    }
}

/// Elements fixing every given point.
#[derive(Debug, Clone)]
pub struct PointwiseStabilizer {
    points: Vec<usize>,
    mask: Vec<bool>,
}

impl PointwiseStabilizer {
    pub fn new(degree: usize, points: &[usize]) -> Self {
        PointwiseStabilizer {
            points: points.to_vec(),
            mask: membership(degree, points),
        }
    }
}

impl SubgroupPredicate for PointwiseStabilizer {
    fn test(&self, p: &Permutation) -> bool {
        self.points.iter().all(|&x| p.apply(x) == x)
    }

    fn child_restriction(&self, h: &Permutation, _level: usize, base_point: usize) -> bool {
        !self.mask[base_point] || h.apply(base_point) == base_point
    }

    fn limit(&self) -> usize {
        self.points.len()
    }

    fn base_prefix(&self) -> Option<Vec<usize>> {
        Some(self.points.clone())
    }
}

/// Elements permuting a family of point sets among themselves.
#[derive(Debug, Clone)]
pub struct SetSystemStabilizer {
    sets: AHashSet<Vec<usize>>,
    /// Sorted sizes of the sets containing each point.
    signature: Vec<Vec<usize>>,
}

impl SetSystemStabilizer {
    pub fn new(degree: usize, sets: &[Vec<usize>]) -> Self {
        let mut signature = vec![Vec::new(); degree];
        let mut family = AHashSet::new();
        for set in sets {
            let mut set = set.clone();
            set.sort_unstable();
            set.dedup();
            for &x in &set {
                signature[x].push(set.len());
            }
            family.insert(set);
        }
        for s in signature.iter_mut() {
            s.sort_unstable();
        }
        SetSystemStabilizer {
            sets: family,
            signature,
        }
    }
}

impl SubgroupPredicate for SetSystemStabilizer {
    fn test(&self, p: &Permutation) -> bool {
        self.sets.iter().all(|set| self.sets.contains(&p.apply_set(set)))
    }

    fn child_restriction(&self, h: &Permutation, _level: usize, base_point: usize) -> bool {
        self.signature[base_point] == self.signature[h.apply(base_point)]
    }

    fn limit(&self) -> usize {
        usize::MAX
    }
}

/// Elements preserving a colouring of the points.
#[derive(Debug, Clone)]
pub struct VectorStabilizer {
    colours: Vec<usize>,
}

impl VectorStabilizer {
    pub fn new(colours: &[usize]) -> Self {
        VectorStabilizer {
            colours: colours.to_vec(),
        }
    }

    /// Points grouped by colour, by increasing colour.
    pub fn classes(&self) -> Vec<Vec<usize>> {
        let mut colours: Vec<usize> = self.colours.clone();
        colours.sort_unstable();
        colours.dedup();
        colours
            .into_iter()
            .map(|c| (0..self.colours.len()).filter(|&x| self.colours[x] == c).collect())
            .collect()
    }
}

impl SubgroupPredicate for VectorStabilizer {
    fn test(&self, p: &Permutation) -> bool {
        (0..self.colours.len()).all(|x| self.colours[p.apply(x)] == self.colours[x])
    }

    fn child_restriction(&self, h: &Permutation, _level: usize, base_point: usize) -> bool {
        self.colours[h.apply(base_point)] == self.colours[base_point]
    }

    fn limit(&self) -> usize {
        usize::MAX
    }
}

/// Membership in a second group; used to intersect groups.
#[derive(Debug, Clone, Copy)]
pub struct GroupMembership<'a> {
    group: &'a Bsgs,
}

impl<'a> GroupMembership<'a> {
    pub fn new(group: &'a Bsgs) -> Self {
        GroupMembership { group }
    }
}

impl SubgroupPredicate for GroupMembership<'_> {
    fn test(&self, p: &Permutation) -> bool {
        self.group.sifts(p)
    }

    fn child_restriction(&self, _h: &Permutation, _level: usize, _base_point: usize) -> bool {
        true
    }

    fn limit(&self) -> usize {
        usize::MAX
    }
}

type TestFn<'a> = Box<dyn Fn(&Permutation) -> bool + 'a>;
type RestrictionFn<'a> = Box<dyn Fn(&Permutation, usize, usize) -> bool + 'a>;

/// A predicate given by closures.
///
/// ```
/// # use stabchain::predicate::{FnPredicate, SubgroupPredicate};
/// # use stabchain::permutation::Permutation;
/// let even = FnPredicate::new(|p: &Permutation| p.sign() == 1);
/// assert!(even.test(&Permutation::parse_cycles(3, "(0 1 2)").unwrap()));
/// assert!(!even.test(&Permutation::parse_cycles(3, "(0 1)").unwrap()));
/// ```
pub struct FnPredicate<'a> {
    test: TestFn<'a>,
    child_restriction: Option<RestrictionFn<'a>>,
    limit: usize,
}

impl<'a> FnPredicate<'a> {
    pub fn new(test: impl Fn(&Permutation) -> bool + 'a) -> Self {
        FnPredicate {
            test: Box::new(test),
            child_restriction: None,
            limit: usize::MAX,
        }
    }

    pub fn with_child_restriction(mut self, f: impl Fn(&Permutation, usize, usize) -> bool + 'a) -> Self {
        self.child_restriction = Some(Box::new(f));
        self
    }
}

impl SubgroupPredicate for FnPredicate<'_> {
    fn test(&self, p: &Permutation) -> bool {
        (self.test)(p)
    }

    fn child_restriction(&self, h: &Permutation, level: usize, base_point: usize) -> bool {
        self.child_restriction
            .as_ref()
            .map_or(true, |f| f(h, level, base_point))
    }

    fn limit(&self) -> usize {
        self.limit
    }
}
