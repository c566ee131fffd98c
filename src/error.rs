use thiserror::Error;

use crate::permutation::PermutationError;

/// Errors reported by the entry points that take caller-supplied groups,
/// generators or point sets.
///
/// Searches that find nothing are not errors: they return a trivial group or
/// `None`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GroupError {
    #[error("domain size must be at least 1")]
    EmptyDomain,

    #[error("at least one generator is required")]
    EmptyGenerators,

    #[error("generator acts on {found} points, expected {expected}")]
    DegreeMismatch { expected: usize, found: usize },

    #[error("point {point} lies outside the domain 0..{degree}")]
    PointOutOfDomain { point: usize, degree: usize },

    #[error("point {0} occurs twice in a base or point set")]
    DuplicatePoint(usize),

    #[error("expected one entry per point ({expected}), found {found}")]
    SetSizeMismatch { expected: usize, found: usize },

    #[error(transparent)]
    Permutation(#[from] PermutationError),
}

pub(crate) fn check_points(points: &[usize], degree: usize) -> Result<(), GroupError> {
    let mut seen = vec![false; degree];
    for &point in points {
        if point >= degree {
            return Err(GroupError::PointOutOfDomain { point, degree });
        }
        if seen[point] {
            return Err(GroupError::DuplicatePoint(point));
        }
        seen[point] = true;
    }
    Ok(())
}

pub(crate) fn check_generators(
    degree: usize,
    generators: &[crate::permutation::Permutation],
) -> Result<(), GroupError> {
    if degree == 0 {
        return Err(GroupError::EmptyDomain);
    }
    if generators.is_empty() {
        return Err(GroupError::EmptyGenerators);
    }
    for g in generators {
        if g.len() != degree {
            return Err(GroupError::DegreeMismatch {
                expected: degree,
                found: g.len(),
            });
        }
    }
    Ok(())
}
