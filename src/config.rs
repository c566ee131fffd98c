//! Option structs for construction and search.

/// How a transversal stores its coset representatives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "bincode", derive(bincode::Encode, bincode::Decode))]
pub enum TransversalKind {
    /// Schreier tree: each orbit point stores the generator it was reached by.
    /// Representatives are rebuilt by walking to the root.
    #[default]
    SchreierTree,
    /// Every orbit point stores its representative.
    Explicit,
}

/// Strategy used to exchange two adjacent base points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "bincode", derive(bincode::Encode, bincode::Decode))]
pub enum BaseTranspose {
    /// Random subgroup elements until the expected orbit size is reached.
    Random { seed: u64 },
    /// All Schreier generators of the new level, in a fixed order.
    Deterministic,
}

impl Default for BaseTranspose {
    fn default() -> Self {
        BaseTranspose::Random { seed: 0x5eed }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "bincode", derive(bincode::Encode, bincode::Decode))]
pub struct SearchConfig {
    /// Levels `< pruning_level_dcm` get the double coset minimality test with
    /// a base change of the auxiliary group. Deeper levels only use the cheap
    /// orbit test. `0` disables double coset pruning.
    pub pruning_level_dcm: usize,
    /// Return the first element satisfying the predicate instead of a group.
    pub stop_after_first: bool,
    /// Once a candidate fails the child restriction, skip the remaining
    /// candidates of that node.
    ///
    /// Only sound when candidates failing the restriction come last in the
    /// search order, as for set stabilizers.
    pub break_after_child_restriction: bool,
    pub base_transpose: BaseTranspose,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            pruning_level_dcm: 100,
            stop_after_first: false,
            break_after_child_restriction: false,
            base_transpose: BaseTranspose::default(),
        }
    }
}

impl SearchConfig {
    pub fn with_pruning_level(pruning_level_dcm: usize) -> Self {
        SearchConfig {
            pruning_level_dcm,
            ..Default::default()
        }
    }

    pub fn representative(mut self) -> Self {
        self.stop_after_first = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "bincode", derive(bincode::Encode, bincode::Decode))]
pub struct RandomSchreierSimsConfig {
    /// Number of consecutive trivial sifts after which a construction without
    /// known order stops.
    pub consecutive_sifts: usize,
    /// Upper bound on sampled elements when a known order is never reached.
    pub max_rounds: usize,
    pub seed: u64,
    pub transversal: TransversalKind,
}

impl Default for RandomSchreierSimsConfig {
    fn default() -> Self {
        RandomSchreierSimsConfig {
            consecutive_sifts: 20,
            max_rounds: 100_000,
            seed: 42,
            transversal: TransversalKind::default(),
        }
    }
}
