pub mod data;
pub mod dimred;
pub mod enumerate;
pub mod error;
pub mod layout;
pub mod neighbors;
pub mod relief;
pub mod scoring;
pub mod search;
pub mod svd;
mod dense;
mod utils;

pub use data::{Dataset, Variable, VariableKind};
pub use dimred::{circular_placement, Placement};
pub use enumerate::{state_count, CandidateState, SubsetEnumerator};
pub use error::{Result, VizRankError};
pub use layout::{anchors, embedding, Anchor};
pub use relief::{rank_variables, ReliefConfig};
pub use scoring::ProjectionScorer;
pub use search::{RankConfig, RankSearch, ResultTable, ScoredResult, SearchStatus};
pub use utils::SpanNormalize;
