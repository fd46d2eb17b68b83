use std::sync::Arc;

use parking_lot::RwLock;

use crate::data::Variable;
use crate::enumerate::CandidateState;
use crate::scoring::bar_length;

/// A scored candidate: its ordering, the variables it resolves to and the score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredResult {
    pub score: f64,
    pub state: CandidateState,
    pub variables: Vec<Variable>,
    /// Discovery order within the run.
    pub sequence: u64,
}

impl ScoredResult {
    pub fn bar_length(&self) -> f64 {
        bar_length(self.score)
    }

    pub fn variable_names(&self) -> Vec<&str> {
        self.variables.iter().map(Variable::name).collect()
    }

    /// Row text for a ranking list, e.g. `"petal length, sepal width"`.
    pub fn label(&self) -> String {
        self.variable_names().join(", ")
    }
}

/// Score-ordered result list shared between the search and its readers.
///
/// Only the owning search writes; clones of the handle see every insertion
/// as a whole.
#[derive(Debug, Clone, Default)]
pub struct ResultTable {
    inner: Arc<RwLock<Vec<ScoredResult>>>,
}

impl ResultTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn get(&self, rank: usize) -> Option<ScoredResult> {
        self.inner.read().get(rank).cloned()
    }

    /// The best `n` results.
    pub fn top(&self, n: usize) -> Vec<ScoredResult> {
        self.inner.read().iter().take(n).cloned().collect()
    }

    pub fn snapshot(&self) -> Vec<ScoredResult> {
        self.inner.read().clone()
    }

    /// Inserts after every result with a lower or equal score and returns the
    /// rank it landed at.
    pub(crate) fn insert(&self, result: ScoredResult) -> usize {
        let mut rows = self.inner.write();
        let rank = rows.partition_point(|r| r.score <= result.score);
        rows.insert(rank, result);
        rank
    }

    pub(crate) fn replace(&self, results: Vec<ScoredResult>) {
        *self.inner.write() = results;
    }

    pub(crate) fn clear(&self) {
        self.inner.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(score: f64, sequence: u64) -> ScoredResult {
        ScoredResult {
            score,
            state: vec![0, 1],
            variables: vec![Variable::continuous("a"), Variable::continuous("b")],
            sequence,
        }
    }

    #[test]
    fn test_insert_keeps_ascending_scores() {
        let table = ResultTable::new();
        assert_eq!(table.insert(result(-0.5, 0)), 0);
        assert_eq!(table.insert(result(-0.9, 1)), 0);
        assert_eq!(table.insert(result(-0.1, 2)), 2);
        let scores: Vec<f64> = table.snapshot().iter().map(|r| r.score).collect();
        assert_eq!(scores, vec![-0.9, -0.5, -0.1]);
    }

    #[test]
    fn test_ties_keep_discovery_order() {
        let table = ResultTable::new();
        table.insert(result(-0.5, 0));
        table.insert(result(-0.5, 1));
        table.insert(result(-0.7, 2));
        assert_eq!(table.insert(result(-0.5, 3)), 3);
        let order: Vec<u64> = table.snapshot().iter().map(|r| r.sequence).collect();
        assert_eq!(order, vec![2, 0, 1, 3]);
    }

    #[test]
    fn test_clones_share_rows() {
        let table = ResultTable::new();
        let reader = table.clone();
        table.insert(result(-0.2, 0));
        assert_eq!(reader.len(), 1);
        assert_eq!(reader.top(5).len(), 1);
        table.clear();
        assert!(reader.is_empty());
    }

    #[test]
    fn test_label_and_bar() {
        let r = result(-0.25, 0);
        assert_eq!(r.label(), "a, b");
        assert_eq!(r.bar_length(), 0.25);
    }
}
