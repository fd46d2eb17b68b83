//! # Ranking search
//!
//! [`RankSearch`] drives the enumeration of candidate variable orderings, scores
//! each one and keeps the results sorted best first. It is stepped by the host
//! in small slices so that pausing, resuming and cancelling can happen between
//! steps:
//!
//! ```text
//! Idle ──start──▶ Running ──pause──▶ Paused ──start (same config)──▶ Running
//!                    │
//!                    ├── enumerator exhausted ──▶ Done
//!                    └── cancel ──▶ Cancelled        (cancel is allowed from any state)
//! ```
//!
//! Done and Cancelled only leave through [`RankSearch::reset`] or a start with a
//! different configuration, which discards all progress.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, info};
use rayon::prelude::*;

use crate::data::{Dataset, Variable};
use crate::dimred::Placement;
use crate::enumerate::{state_count, CandidateState, SubsetEnumerator};
use crate::error::{Result, VizRankError};
use crate::relief::{rank_variables, ReliefConfig};
use crate::scoring::ProjectionScorer;

mod config;
mod results;

pub use config::RankConfig;
pub use results::{ResultTable, ScoredResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchStatus {
    Idle,
    Running,
    Paused,
    Done,
    Cancelled,
}

impl fmt::Display for SearchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SearchStatus::Idle => "idle",
            SearchStatus::Running => "running",
            SearchStatus::Paused => "paused",
            SearchStatus::Done => "done",
            SearchStatus::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Cross-thread cancellation request, honoured between steps.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Saved progress of a run: enough to continue it later in a new [`RankSearch`].
#[derive(Debug, Clone, PartialEq)]
pub struct SearchState {
    pub subset_size: usize,
    /// Last candidate drawn, scored or not.
    pub last: Option<CandidateState>,
    pub processed: u128,
    pub results: Vec<ScoredResult>,
}

/// What a single step did.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// The candidate was scored and inserted at `rank`.
    Scored { rank: usize },
    /// The candidate has no score; the search goes on.
    Skipped(VizRankError),
    /// Nothing left to enumerate; the search is done.
    Finished,
    /// A cancellation request was honoured instead of stepping.
    Cancelled,
}

/// Totals over several steps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepSummary {
    pub scored: usize,
    pub skipped: usize,
}

impl StepSummary {
    fn add(&mut self, outcome: &StepOutcome) {
        match outcome {
            StepOutcome::Scored { .. } => self.scored += 1,
            StepOutcome::Skipped(_) => self.skipped += 1,
            _ => {}
        }
    }
}

pub struct RankSearch {
    dataset: Arc<Dataset>,
    status: SearchStatus,
    config: Option<RankConfig>,
    ranked: Option<(ReliefConfig, Vec<usize>)>,
    enumerator: Option<SubsetEnumerator>,
    last: Option<CandidateState>,
    processed: u128,
    next_sequence: u64,
    results: ResultTable,
    cancel: CancelHandle,
}

impl RankSearch {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        RankSearch {
            dataset,
            status: SearchStatus::Idle,
            config: None,
            ranked: None,
            enumerator: None,
            last: None,
            processed: 0,
            next_sequence: 0,
            results: ResultTable::new(),
            cancel: CancelHandle::default(),
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Current state. A cancellation requested through a [`CancelHandle`]
    /// shows as cancelled right away.
    pub fn status(&self) -> SearchStatus {
        if self.cancel.is_cancelled() {
            SearchStatus::Cancelled
        } else {
            self.status
        }
    }

    pub fn is_running(&self) -> bool {
        self.status() == SearchStatus::Running
    }

    pub fn is_paused(&self) -> bool {
        self.status() == SearchStatus::Paused
    }

    pub fn is_done(&self) -> bool {
        self.status() == SearchStatus::Done
    }

    /// Configuration of the current or last run.
    pub fn config(&self) -> Option<&RankConfig> {
        self.config.as_ref()
    }

    /// Handle on the ranked results; stays valid across runs.
    pub fn results(&self) -> ResultTable {
        self.results.clone()
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Largest allowed subset size: the number of rankable continuous variables.
    pub fn max_subset_size(&self) -> usize {
        self.dataset.continuous_columns().len()
    }

    /// Size of the search space of the current or last run.
    pub fn state_count(&self) -> u128 {
        self.config
            .as_ref()
            .map_or(0, |c| state_count(self.max_subset_size(), c.subset_size))
    }

    /// Candidates drawn so far in this run, scored or skipped.
    pub fn processed(&self) -> u128 {
        self.processed
    }

    /// Fraction of the search space drawn so far.
    pub fn progress(&self) -> f64 {
        match self.state_count() {
            0 => 0.0,
            total => (self.processed as f64 / total as f64).min(1.0),
        }
    }

    /// Variables in relevance order, once a run has computed it.
    pub fn ranked_variables(&self) -> Option<Vec<&Variable>> {
        self.ranked
            .as_ref()
            .map(|(_, columns)| columns.iter().map(|&c| self.dataset.variable(c)).collect())
    }

    /// Whether [`start`](Self::start) with `config` continues the paused run.
    pub fn can_resume(&self, config: &RankConfig) -> bool {
        self.is_paused() && self.config.as_ref() == Some(config)
    }

    /// Reasons the data cannot be ranked under `placement`, if any.
    pub fn check_preconditions(&self, placement: Placement) -> Result<()> {
        let data = &self.dataset;
        let fail = |msg: &str| Err(VizRankError::PreconditionFailed(msg.to_string()));

        if placement == Placement::Lda && data.target().is_continuous() {
            return fail(
                "Suggest Features does not work for Linear Discriminant Analysis Projection \
                 when continuous color variable is selected.",
            );
        }
        if self.max_subset_size() < 2 {
            return fail("Not enough available continuous variables");
        }
        if data.valid_rows().len() < 2 {
            return fail("Not enough valid data instances");
        }
        if data.y().iter().all(|v| v.is_nan()) {
            return fail("Target variable has no values");
        }
        if placement == Placement::Lda && data.distinct_targets() < 2 {
            return fail("Linear Discriminant Analysis needs at least two target classes");
        }
        Ok(())
    }

    /// Starts a fresh run, or continues the paused one when `config` is unchanged.
    pub fn start(&mut self, config: RankConfig) -> Result<()> {
        self.honour_pending_cancel("start")?;
        if self.status == SearchStatus::Running {
            return Err(VizRankError::InvalidState {
                state: self.status,
                action: "start",
            });
        }
        let terminal = matches!(self.status, SearchStatus::Done | SearchStatus::Cancelled);
        if terminal && self.config.as_ref() == Some(&config) {
            return Err(VizRankError::InvalidState {
                state: self.status,
                action: "start",
            });
        }

        self.check_preconditions(config.placement)?;
        config.validate(self.max_subset_size())?;

        let n = self.max_subset_size();
        if self.can_resume(&config) {
            self.enumerator = Some(match &self.last {
                Some(last) => SubsetEnumerator::resume_after(n, config.subset_size, last)?,
                None => SubsetEnumerator::new(n, config.subset_size)?,
            });
            info!(
                "Resuming ranking after {} of {} candidates",
                self.processed,
                state_count(n, config.subset_size)
            );
        } else {
            self.clear_progress();
            self.ensure_ranking(&config)?;
            self.enumerator = Some(SubsetEnumerator::new(n, config.subset_size)?);
            self.cancel.clear();
            info!(
                "Ranking {} candidates of {} variables ({} per subset, {})",
                state_count(n, config.subset_size),
                n,
                config.subset_size,
                config.placement
            );
            self.config = Some(config);
        }

        self.status = SearchStatus::Running;
        Ok(())
    }

    pub fn pause(&mut self) -> Result<()> {
        self.honour_pending_cancel("pause")?;
        if self.status != SearchStatus::Running {
            return Err(VizRankError::InvalidState {
                state: self.status,
                action: "pause",
            });
        }
        // Progress lives in `last`; the enumerator is rebuilt on resume.
        self.enumerator = None;
        self.status = SearchStatus::Paused;
        info!("Ranking paused after {} candidates", self.processed);
        Ok(())
    }

    pub fn cancel(&mut self) {
        self.cancel.cancel();
        self.enter_cancelled();
    }

    /// Back to idle: drops the run configuration, progress and results.
    /// The variable ranking stays cached.
    pub fn reset(&mut self) {
        self.clear_progress();
        self.config = None;
        self.cancel.clear();
        self.status = SearchStatus::Idle;
    }

    /// Draws, scores and records the next candidate.
    pub fn step(&mut self) -> Result<StepOutcome> {
        self.ensure_running("step")?;
        if self.cancel.is_cancelled() {
            self.enter_cancelled();
            return Ok(StepOutcome::Cancelled);
        }

        let Some(state) = self.enumerator.as_mut().and_then(Iterator::next) else {
            self.finish();
            return Ok(StepOutcome::Finished);
        };
        let scorer = self.scorer()?;
        let columns = self.columns_of(&state)?;
        let score = scorer.score(&self.dataset, &columns);
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        Ok(self.record(state, &columns, score, sequence))
    }

    /// Draws up to `batch` candidates, scores them in parallel and records them
    /// in draw order, giving the same results as stepping one at a time.
    pub fn step_batch(&mut self, batch: usize) -> Result<StepSummary> {
        self.ensure_running("step")?;
        let mut summary = StepSummary::default();
        if self.cancel.is_cancelled() {
            self.enter_cancelled();
            return Ok(summary);
        }

        let mut drawn = Vec::with_capacity(batch);
        if let Some(enumerator) = self.enumerator.as_mut() {
            drawn.extend(enumerator.take(batch));
        }
        let exhausted = drawn.len() < batch;

        let scorer = self.scorer()?;
        let mut jobs = Vec::with_capacity(drawn.len());
        for state in drawn {
            let columns = self.columns_of(&state)?;
            jobs.push((self.next_sequence, state, columns));
            self.next_sequence += 1;
        }

        let dataset = &self.dataset;
        let scored: Vec<_> = jobs
            .into_par_iter()
            .map(|(sequence, state, columns)| {
                let score = scorer.score(dataset, &columns);
                (sequence, state, columns, score)
            })
            .collect();

        for (sequence, state, columns, score) in scored {
            let outcome = self.record(state, &columns, score, sequence);
            summary.add(&outcome);
        }
        if exhausted {
            self.finish();
        }
        Ok(summary)
    }

    /// Steps until `max_steps` candidates were drawn or the run stops.
    pub fn run_steps(&mut self, max_steps: usize) -> Result<StepSummary> {
        let mut summary = StepSummary::default();
        for _ in 0..max_steps {
            let outcome = self.step()?;
            if matches!(outcome, StepOutcome::Finished | StepOutcome::Cancelled) {
                break;
            }
            summary.add(&outcome);
        }
        Ok(summary)
    }

    /// Steps until `budget` has elapsed or the run stops. At least one step is taken.
    pub fn run_for(&mut self, budget: Duration) -> Result<StepSummary> {
        let deadline = Instant::now() + budget;
        let mut summary = StepSummary::default();
        loop {
            let outcome = self.step()?;
            if matches!(outcome, StepOutcome::Finished | StepOutcome::Cancelled) {
                break;
            }
            summary.add(&outcome);
            if Instant::now() >= deadline {
                break;
            }
        }
        Ok(summary)
    }

    /// Runs to completion (or cancellation).
    pub fn run_to_end(&mut self) -> Result<StepSummary> {
        self.run_steps(usize::MAX)
    }

    /// Snapshot of the run's progress, for continuing it elsewhere.
    pub fn save_state(&self) -> Option<SearchState> {
        self.config.as_ref().map(|config| SearchState {
            subset_size: config.subset_size,
            last: self.last.clone(),
            processed: self.processed,
            results: self.results.snapshot(),
        })
    }

    /// Installs saved progress as a paused run of `config`; the next
    /// [`start`](Self::start) with the same configuration continues it.
    pub fn restore(&mut self, state: SearchState, config: RankConfig) -> Result<()> {
        self.honour_pending_cancel("restore")?;
        if self.status == SearchStatus::Running {
            return Err(VizRankError::InvalidState {
                state: self.status,
                action: "restore",
            });
        }
        if state.subset_size != config.subset_size {
            return Err(VizRankError::InvalidConfiguration(format!(
                "saved progress is for subsets of {}, not {}",
                state.subset_size, config.subset_size
            )));
        }
        config.validate(self.max_subset_size())?;
        if let Some(last) = &state.last {
            SubsetEnumerator::resume_after(self.max_subset_size(), config.subset_size, last)?;
        }
        self.ensure_ranking(&config)?;

        self.next_sequence = state
            .results
            .iter()
            .map(|r| r.sequence + 1)
            .max()
            .unwrap_or(0)
            .max(u64::try_from(state.processed).unwrap_or(u64::MAX));
        self.results.replace(state.results);
        self.last = state.last;
        self.processed = state.processed;
        self.enumerator = None;
        self.config = Some(config);
        self.cancel.clear();
        self.status = SearchStatus::Paused;
        Ok(())
    }

    /// Applies a cancellation requested through a handle since the last step,
    /// failing `action`.
    fn honour_pending_cancel(&mut self, action: &'static str) -> Result<()> {
        if self.cancel.is_cancelled() && self.status != SearchStatus::Cancelled {
            self.enter_cancelled();
            return Err(VizRankError::InvalidState {
                state: self.status,
                action,
            });
        }
        Ok(())
    }

    fn ensure_running(&self, action: &'static str) -> Result<()> {
        if self.status != SearchStatus::Running {
            return Err(VizRankError::InvalidState {
                state: self.status,
                action,
            });
        }
        Ok(())
    }

    /// Computes the variable order once per relief setting.
    fn ensure_ranking(&mut self, config: &RankConfig) -> Result<()> {
        let relief = config.relief();
        if matches!(&self.ranked, Some((cached, _)) if *cached == relief) {
            return Ok(());
        }
        let order = rank_variables(&self.dataset, &relief)
            .map_err(|e| VizRankError::PreconditionFailed(format!("{:#}", e)))?;
        self.ranked = Some((relief, order));
        Ok(())
    }

    fn scorer(&self) -> Result<ProjectionScorer> {
        let config = self.config.as_ref().ok_or(VizRankError::InvalidState {
            state: self.status,
            action: "score",
        })?;
        Ok(ProjectionScorer::new(config.placement, config.min_neighbors))
    }

    fn columns_of(&self, state: &[usize]) -> Result<Vec<usize>> {
        let (_, order) = self.ranked.as_ref().ok_or(VizRankError::InvalidState {
            state: self.status,
            action: "score",
        })?;
        Ok(state.iter().map(|&i| order[i]).collect())
    }

    /// Books a drawn candidate whose ranked indices resolved to `columns`.
    fn record(
        &mut self,
        state: CandidateState,
        columns: &[usize],
        score: Result<f64>,
        sequence: u64,
    ) -> StepOutcome {
        self.processed += 1;
        self.last = Some(state.clone());
        match score {
            Ok(score) => {
                let variables = columns
                    .iter()
                    .map(|&c| self.dataset.variable(c).clone())
                    .collect();
                let rank = self.results.insert(ScoredResult {
                    score,
                    state,
                    variables,
                    sequence,
                });
                StepOutcome::Scored { rank }
            }
            Err(e) => {
                debug!("Skipping candidate {:?}: {}", state, e);
                StepOutcome::Skipped(e)
            }
        }
    }

    fn finish(&mut self) {
        self.enumerator = None;
        self.status = SearchStatus::Done;
        info!(
            "Ranking finished: {} candidates, {} scored",
            self.processed,
            self.results.len()
        );
    }

    fn enter_cancelled(&mut self) {
        self.enumerator = None;
        if self.status != SearchStatus::Cancelled {
            info!("Ranking cancelled after {} candidates", self.processed);
        }
        self.status = SearchStatus::Cancelled;
    }

    fn clear_progress(&mut self) {
        self.enumerator = None;
        self.last = None;
        self.processed = 0;
        self.next_sequence = 0;
        self.results.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, Array2};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    /// `n_vars` continuous variables, the first two carrying the class.
    fn dataset(n_rows: usize, n_vars: usize) -> Arc<Dataset> {
        let mut rng = StdRng::seed_from_u64(11);
        let mut x = Array2::zeros((n_rows, n_vars));
        let mut y = Array1::zeros(n_rows);
        for i in 0..n_rows {
            let class = (i % 3) as f64;
            y[i] = class;
            for j in 0..n_vars {
                let signal = if j < 2 { class * 3.0 } else { 0.0 };
                x[[i, j]] = signal + rng.random_range(0.0..1.0);
            }
        }
        let variables = (0..n_vars).map(|j| Variable::continuous(format!("v{}", j))).collect();
        Arc::new(Dataset::new(variables, x, Variable::discrete("class", ["a", "b", "c"]), y).unwrap())
    }

    fn drawn_states(search: &RankSearch) -> Vec<CandidateState> {
        let mut rows = search.results().snapshot();
        rows.sort_by_key(|r| r.sequence);
        rows.into_iter().map(|r| r.state).collect()
    }

    #[test]
    fn test_runs_to_done_with_sorted_results() {
        init();
        let mut search = RankSearch::new(dataset(60, 5));
        search.start(RankConfig::new(3)).unwrap();
        assert!(search.is_running());
        assert_eq!(search.state_count(), 10);

        let summary = search.run_to_end().unwrap();
        assert!(search.is_done());
        assert_eq!(summary.scored, 10);
        assert_eq!(search.processed(), 10);
        assert_eq!(search.progress(), 1.0);

        let results = search.results().snapshot();
        assert_eq!(results.len(), 10);
        assert!(results.windows(2).all(|w| w[0].score <= w[1].score));
        let ranked = search.ranked_variables().unwrap();
        assert_eq!(ranked.len(), 5);
        for result in &results {
            let expected: Vec<&str> = result.state.iter().map(|&i| ranked[i].name()).collect();
            assert_eq!(result.variable_names(), expected);
        }
    }

    #[test]
    fn test_step_after_done_is_finished_state() {
        let mut search = RankSearch::new(dataset(30, 3));
        search.start(RankConfig::new(3)).unwrap();
        assert!(matches!(search.step().unwrap(), StepOutcome::Scored { rank: 0 }));
        assert_eq!(search.step().unwrap(), StepOutcome::Finished);
        assert!(matches!(
            search.step(),
            Err(VizRankError::InvalidState { state: SearchStatus::Done, .. })
        ));
        // Same configuration cannot restart a finished run.
        assert!(search.start(RankConfig::new(3)).is_err());
        search.reset();
        assert_eq!(search.status(), SearchStatus::Idle);
        assert!(search.results().is_empty());
        search.start(RankConfig::new(3)).unwrap();
    }

    #[test]
    fn test_pause_and_resume_is_deterministic() {
        let data = dataset(40, 6);
        let config = RankConfig::new(4);

        let mut full = RankSearch::new(data.clone());
        full.start(config.clone()).unwrap();
        full.run_to_end().unwrap();

        let mut paused = RankSearch::new(data);
        paused.start(config.clone()).unwrap();
        paused.run_steps(7).unwrap();
        paused.pause().unwrap();
        assert!(paused.is_paused());
        assert!(paused.step().is_err());
        assert!(paused.can_resume(&config));
        paused.start(config).unwrap();
        paused.run_to_end().unwrap();

        assert_eq!(drawn_states(&paused), drawn_states(&full));
        let scores = |s: &RankSearch| s.results().snapshot().iter().map(|r| r.score).collect::<Vec<_>>();
        assert_eq!(scores(&paused), scores(&full));
    }

    #[test]
    fn test_changing_subset_size_discards_progress() {
        let mut search = RankSearch::new(dataset(40, 5));
        search.start(RankConfig::new(3)).unwrap();
        search.run_steps(4).unwrap();
        search.pause().unwrap();
        assert_eq!(search.results().len(), 4);

        let other = RankConfig::new(4);
        assert!(!search.can_resume(&other));
        search.start(other).unwrap();
        assert_eq!(search.results().len(), 0);
        assert_eq!(search.processed(), 0);
        assert_eq!(search.state_count(), 15);
    }

    #[test]
    fn test_cancel_from_another_handle() {
        let mut search = RankSearch::new(dataset(40, 5));
        search.start(RankConfig::new(3)).unwrap();
        search.step().unwrap();
        let handle = search.cancel_handle();
        handle.cancel();
        assert_eq!(search.step().unwrap(), StepOutcome::Cancelled);
        assert_eq!(search.status(), SearchStatus::Cancelled);
        assert_eq!(search.results().len(), 1);

        // A different configuration starts over from a cancelled run.
        search.start(RankConfig::new(2)).unwrap();
        assert!(search.is_running());
        assert!(search.results().is_empty());
    }

    #[test]
    fn test_cancel_while_paused_is_not_lost() {
        let config = RankConfig::new(3);
        let mut search = RankSearch::new(dataset(40, 5));
        search.start(config.clone()).unwrap();
        search.run_steps(2).unwrap();
        search.pause().unwrap();

        search.cancel_handle().cancel();
        assert_eq!(search.status(), SearchStatus::Cancelled);
        assert!(!search.can_resume(&config));
        assert!(matches!(
            search.start(config.clone()),
            Err(VizRankError::InvalidState { state: SearchStatus::Cancelled, .. })
        ));
        assert!(!search.is_running());
        assert_eq!(search.results().len(), 2);
        // Still refused on a second attempt with the same configuration.
        assert!(search.start(config).is_err());

        // A different configuration starts over.
        search.start(RankConfig::new(2)).unwrap();
        assert!(search.is_running());
        assert_eq!(search.processed(), 0);
    }

    #[test]
    fn test_cancel_before_restore_is_honoured() {
        let config = RankConfig::new(3);
        let mut first = RankSearch::new(dataset(40, 5));
        first.start(config.clone()).unwrap();
        first.run_steps(2).unwrap();
        first.pause().unwrap();
        let saved = first.save_state().unwrap();

        let mut second = RankSearch::new(dataset(40, 5));
        second.cancel_handle().cancel();
        assert!(second.restore(saved.clone(), config.clone()).is_err());
        assert_eq!(second.status(), SearchStatus::Cancelled);
        second.restore(saved, config.clone()).unwrap();
        assert!(second.is_paused());
        second.start(config).unwrap();
        assert!(second.is_running());
    }

    #[test]
    fn test_large_subset_size_starts() {
        let mut search = RankSearch::new(dataset(24, 40));
        search.start(RankConfig::new(36)).unwrap();
        assert_eq!(search.state_count(), u128::MAX);
        let summary = search.run_steps(3).unwrap();
        assert_eq!(summary.scored + summary.skipped, 3);
        assert!(search.is_running());
        assert_eq!(search.processed(), 3);
        assert!(search.progress() < 1e-30);
    }

    #[test]
    fn test_cancel_from_idle() {
        let mut search = RankSearch::new(dataset(20, 3));
        search.cancel();
        assert_eq!(search.status(), SearchStatus::Cancelled);
    }

    #[test]
    fn test_batch_matches_sequential() {
        let data = dataset(50, 5);
        let config = RankConfig::new(3).with_placement(Placement::Pca);

        let mut sequential = RankSearch::new(data.clone());
        sequential.start(config.clone()).unwrap();
        sequential.run_to_end().unwrap();

        let mut batched = RankSearch::new(data);
        batched.start(config).unwrap();
        let first = batched.step_batch(4).unwrap();
        assert_eq!(first.scored, 4);
        assert!(batched.is_running());
        batched.step_batch(100).unwrap();
        assert!(batched.is_done());

        assert_eq!(batched.results().snapshot(), sequential.results().snapshot());
    }

    #[test]
    fn test_insufficient_samples_are_skipped() {
        let mut search = RankSearch::new(dataset(8, 3));
        search.start(RankConfig::new(2)).unwrap();
        let summary = search.run_to_end().unwrap();
        assert_eq!(summary.scored, 0);
        assert_eq!(summary.skipped, 3);
        assert!(search.is_done());
        assert!(search.results().is_empty());
    }

    #[test]
    fn test_preconditions() {
        let x = Array2::from_shape_fn((5, 2), |(i, j)| (i + j) as f64);
        let one_var = Arc::new(
            Dataset::new(
                vec![Variable::continuous("a"), Variable::discrete("d", ["p", "q"])],
                x.clone(),
                Variable::continuous("t"),
                Array1::from_elem(5, 1.0),
            )
            .unwrap(),
        );
        let search = RankSearch::new(one_var);
        assert_eq!(
            search.check_preconditions(Placement::Circular),
            Err(VizRankError::PreconditionFailed(
                "Not enough available continuous variables".into()
            ))
        );
        assert!(search.check_preconditions(Placement::Lda).is_err());

        let no_target = Arc::new(
            Dataset::new(
                vec![Variable::continuous("a"), Variable::continuous("b")],
                x,
                Variable::discrete("class", ["p"]),
                Array1::from_elem(5, f64::NAN),
            )
            .unwrap(),
        );
        let mut search = RankSearch::new(no_target);
        assert_eq!(
            search.check_preconditions(Placement::Circular),
            Err(VizRankError::PreconditionFailed(
                "Not enough valid data instances".into()
            ))
        );
        assert!(search.start(RankConfig::new(2)).is_err());
        assert_eq!(search.status(), SearchStatus::Idle);
    }

    #[test]
    fn test_invalid_subset_size_rejected() {
        let mut search = RankSearch::new(dataset(30, 3));
        assert!(matches!(
            search.start(RankConfig::new(4)),
            Err(VizRankError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            search.start(RankConfig::new(1)),
            Err(VizRankError::InvalidConfiguration(_))
        ));
        assert_eq!(search.max_subset_size(), 3);
    }

    #[test]
    fn test_save_and_restore_continues_run() {
        let data = dataset(40, 5);
        let config = RankConfig::new(3);

        let mut full = RankSearch::new(data.clone());
        full.start(config.clone()).unwrap();
        full.run_to_end().unwrap();

        let mut first = RankSearch::new(data.clone());
        first.start(config.clone()).unwrap();
        first.run_steps(3).unwrap();
        first.pause().unwrap();
        let saved = first.save_state().unwrap();
        assert_eq!(saved.processed, 3);

        let mut second = RankSearch::new(data);
        assert!(second.restore(saved.clone(), RankConfig::new(4)).is_err());
        second.restore(saved, config.clone()).unwrap();
        assert!(second.can_resume(&config));
        second.start(config).unwrap();
        second.run_to_end().unwrap();

        assert_eq!(second.results().snapshot(), full.results().snapshot());
    }
}
