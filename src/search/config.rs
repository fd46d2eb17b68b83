use crate::dimred::Placement;
use crate::error::{Result, VizRankError};
use crate::relief::ReliefConfig;
use crate::scoring::DEFAULT_MIN_NEIGHBORS;

/// Parameters of a ranking run, handed to [`RankSearch::start`](super::RankSearch::start).
///
/// A paused search only continues when it is started again with an equal
/// configuration; anything else begins a fresh run.
#[derive(Debug, Clone, PartialEq)]
pub struct RankConfig {
    /// Number of variables per candidate projection (`k`).
    pub subset_size: usize,
    pub placement: Placement,
    /// Minimum usable instances per candidate, also the neighbour count.
    pub min_neighbors: usize,
    pub relief_iterations: usize,
    pub relief_neighbors: usize,
    pub seed: u64,
}

impl Default for RankConfig {
    fn default() -> Self {
        let relief = ReliefConfig::default();
        RankConfig {
            subset_size: 3,
            placement: Placement::Circular,
            min_neighbors: DEFAULT_MIN_NEIGHBORS,
            relief_iterations: relief.n_iterations,
            relief_neighbors: relief.k_nearest,
            seed: relief.seed,
        }
    }
}

impl RankConfig {
    pub fn new(subset_size: usize) -> Self {
        RankConfig {
            subset_size,
            ..Default::default()
        }
    }

    pub fn with_subset_size(mut self, subset_size: usize) -> Self {
        self.subset_size = subset_size;
        self
    }

    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    pub fn with_min_neighbors(mut self, min_neighbors: usize) -> Self {
        self.min_neighbors = min_neighbors;
        self
    }

    pub fn with_relief(mut self, iterations: usize, neighbors: usize) -> Self {
        self.relief_iterations = iterations;
        self.relief_neighbors = neighbors;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn relief(&self) -> ReliefConfig {
        ReliefConfig {
            n_iterations: self.relief_iterations,
            k_nearest: self.relief_neighbors,
            seed: self.seed,
        }
    }

    /// Checks the configuration against the number of rankable variables.
    pub fn validate(&self, n_variables: usize) -> Result<()> {
        if self.subset_size < 2 || self.subset_size > n_variables {
            return Err(VizRankError::InvalidConfiguration(format!(
                "subset size {} is outside [2, {}]",
                self.subset_size, n_variables
            )));
        }
        if self.min_neighbors == 0 {
            return Err(VizRankError::InvalidConfiguration(
                "neighbour threshold must be at least 1".into(),
            ));
        }
        if self.relief_iterations == 0 || self.relief_neighbors == 0 {
            return Err(VizRankError::InvalidConfiguration(
                "relief needs at least one iteration and one neighbour".into(),
            ));
        }
        Ok(())
    }
}
