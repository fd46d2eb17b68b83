//! Error types for the ranking engine.

use crate::search::SearchStatus;

pub type Result<T> = std::result::Result<T, VizRankError>;

/// Error type for every fallible public operation of the crate.
///
/// Per-candidate kinds ([`InsufficientSamples`](VizRankError::InsufficientSamples),
/// [`DegenerateProjection`](VizRankError::DegenerateProjection)) never abort a
/// search; the remaining kinds prevent a run from starting.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum VizRankError {
    /// The data cannot support a ranking run. The message is meant for the host
    /// to show next to a disabled start action.
    #[error("{0}")]
    PreconditionFailed(String),

    /// A candidate has fewer usable instances than the neighbour threshold.
    #[error("{found} usable instances, at least {required} required")]
    InsufficientSamples {
        /// Instances left after dropping rows with missing values.
        found: usize,
        /// The configured neighbour threshold.
        required: usize,
    },

    /// The projector could not produce an embedding for a candidate.
    #[error("degenerate projection: {0}")]
    DegenerateProjection(String),

    /// Rejected configuration, e.g. a subset size outside `[2, n]`.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The dataset handed over by the host is malformed.
    #[error("invalid dataset: {0}")]
    InvalidDataset(String),

    /// A state transition that the search does not allow from its current state.
    #[error("cannot {action} a search that is {state}")]
    InvalidState {
        state: SearchStatus,
        action: &'static str,
    },
}

impl VizRankError {
    /// Whether the error prevents a run from starting or continuing.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            VizRankError::InsufficientSamples { .. } | VizRankError::DegenerateProjection(_)
        )
    }
}
