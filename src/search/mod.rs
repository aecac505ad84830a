// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Search strategies.
//!
//! Every strategy follows the same loop: produce a candidate, evaluate it,
//! pass the merit through the filters and offer the survivor to a
//! [`BestCandidateObserver`]. That loop lives in [`SearchCore`]; the
//! strategies only differ in how candidates are produced.
//!
//! - [`RandomSearch`]: independent random candidates (nets or Korobov lattices)
//! - [`ColumnByColumnSearch`]: generating matrices built one column at a time
//! - [`LmsSearch`]: random linear scramblings of an existing net
//!
//! A search that accepts no candidate is not an error. It returns
//! [`SearchOutcome::Failed`] and calls every listener registered with
//! [`SearchStrategy::on_failed_search`].

pub mod column_by_column;
pub mod lms;
pub mod random;

pub use column_by_column::ColumnByColumnSearch;
pub use lms::LmsSearch;
pub use random::{CandidateGenerator, KorobovGenerator, RandomNetGenerator, RandomSearch};

use crate::error::{Error, Result};
use crate::merit::{Evaluation, MeritEvaluator, MeritValue};
use crate::net::PointSet;
use crate::observer::BestCandidateObserver;
use log::{debug, info, warn};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;
use std::fmt;

/// How a search ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SearchOutcome {
    /// A best candidate was retained.
    Found { merit: MeritValue },
    /// No candidate was accepted.
    Failed,
}

impl SearchOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, SearchOutcome::Found { .. })
    }
}

/// Called with the description of a search that accepted no candidate.
pub type FailedSearchListener = Box<dyn FnMut(&str) + Send>;

/// The operations shared by all strategies.
pub trait SearchStrategy {
    type Candidate;

    /// Run the search to completion.
    fn execute(&mut self) -> Result<SearchOutcome>;

    fn best_candidate(&self) -> Option<&Self::Candidate>;

    fn best_merit_value(&self) -> Option<MeritValue>;

    /// Human-readable description of the search and its figure of merit.
    fn format(&self) -> String;

    /// Forget the best candidate and counts.
    fn reset(&mut self);

    fn on_failed_search(&mut self, listener: FailedSearchListener);
}

/// Post-processing applied to a complete merit before it reaches the
/// observer. Returning `None` rejects the candidate.
pub trait MeritFilter: Send + Sync + fmt::Debug {
    fn apply(&self, merit: MeritValue) -> Option<MeritValue>;
}

/// Rejects candidates whose merit exceeds `max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdFilter {
    pub max: MeritValue,
}

impl MeritFilter for ThresholdFilter {
    fn apply(&self, merit: MeritValue) -> Option<MeritValue> {
        (merit <= self.max).then_some(merit)
    }
}

/// Multiplies merits by a constant, e.g. a normalization bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFilter {
    pub factor: MeritValue,
}

impl MeritFilter for ScaleFilter {
    fn apply(&self, merit: MeritValue) -> Option<MeritValue> {
        Some(merit * self.factor)
    }
}

/// Generator for `seed`, or from entropy when there is none.
pub fn make_rng(seed: Option<u64>) -> Xoshiro256Plus {
    match seed {
        Some(seed) => Xoshiro256Plus::seed_from_u64(seed),
        None => Xoshiro256Plus::from_entropy(),
    }
}

/// Evaluate-filter-observe scaffolding shared by the strategies.
pub struct SearchCore<C> {
    observer: BestCandidateObserver<C>,
    filters: Vec<Box<dyn MeritFilter>>,
    early_abortion: bool,
    listeners: Vec<FailedSearchListener>,
}

impl<C> fmt::Debug for SearchCore<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchCore")
            .field("filters", &self.filters)
            .field("early_abortion", &self.early_abortion)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl<C> SearchCore<C> {
    pub fn new(observer: BestCandidateObserver<C>, early_abortion: bool) -> Self {
        Self {
            observer,
            filters: Vec::new(),
            early_abortion,
            listeners: Vec::new(),
        }
    }

    pub fn observer(&self) -> &BestCandidateObserver<C> {
        &self.observer
    }

    pub fn add_filter(&mut self, filter: Box<dyn MeritFilter>) {
        self.filters.push(filter);
    }

    pub fn early_abortion(&self) -> bool {
        self.early_abortion
    }

    pub fn add_listener(&mut self, listener: FailedSearchListener) {
        self.listeners.push(listener);
    }

    /// Begin a search. Truncated sums are only enabled when no filter could
    /// change the merit after the fact.
    pub fn start(&mut self, description: &str) {
        info!("starting {description}");
        self.observer.start();
        self.observer
            .set_truncate_sum(self.early_abortion && self.filters.is_empty());
    }

    /// Evaluate `points`, aborting once the lower bound exceeds the best merit.
    pub fn evaluate(
        &self,
        evaluator: &dyn MeritEvaluator,
        points: &dyn PointSet,
    ) -> Result<Evaluation> {
        if !self.observer.truncate_sum() {
            return evaluator.evaluate(points, None);
        }
        let progress = |partial: MeritValue| self.observer.progress(partial);
        evaluator.evaluate(points, Some(&progress))
    }

    fn filter(&self, merit: MeritValue) -> Option<MeritValue> {
        self.filters
            .iter()
            .try_fold(merit, |merit, filter| filter.apply(merit))
    }

    /// Offer an evaluated candidate. Returns whether the search may go on.
    ///
    /// An aborted evaluation counts as visited but is neither rejected nor
    /// observed.
    pub fn offer(&mut self, candidate: C, evaluation: Evaluation) -> bool {
        let Evaluation::Complete(merit) = evaluation else {
            debug!("candidate aborted at {}", evaluation.value());
            return self.observer.visited(evaluation.value());
        };
        match self.filter(merit) {
            None => {
                debug!("candidate rejected with merit {merit}");
                self.observer.reject(&candidate);
                self.observer.visited(merit)
            }
            Some(filtered) => {
                let going_on = self.observer.visited(filtered);
                if self.observer.observe(candidate, filtered) {
                    debug!("new best merit {filtered}");
                } else {
                    debug!("candidate merit {filtered}");
                }
                going_on
            }
        }
    }

    /// End the search and report its outcome.
    pub fn finish(&mut self, description: &str) -> SearchOutcome {
        self.observer.stop();
        match self.observer.best_merit() {
            Some(merit) => {
                info!(
                    "{description}: best merit {merit} after {} candidates ({} rejected)",
                    self.observer.total_count(),
                    self.observer.rejected_count()
                );
                SearchOutcome::Found { merit }
            }
            None => {
                warn!(
                    "{description}: no candidate accepted out of {}",
                    self.observer.total_count()
                );
                self.observer.clear_best();
                for listener in &mut self.listeners {
                    listener(description);
                }
                SearchOutcome::Failed
            }
        }
    }

    pub fn best_candidate(&self) -> Option<&C> {
        self.observer.best_candidate()
    }

    pub fn best_merit(&self) -> Option<MeritValue> {
        self.observer.best_merit()
    }

    pub fn take_best(&mut self) -> Option<(C, MeritValue)> {
        self.observer.take_best()
    }

    pub fn reset(&mut self) {
        self.observer.start();
        self.observer.stop();
    }
}

pub(crate) fn require_tries(nb_tries: usize) -> Result<()> {
    if nb_tries == 0 {
        return Err(Error::invalid("the number of tries must be positive"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_filters_chain() {
        let mut core = SearchCore::new(BestCandidateObserver::new(), false);
        core.add_filter(Box::new(ScaleFilter { factor: 2.0 }));
        core.add_filter(Box::new(ThresholdFilter { max: 1.0 }));
        core.start("test");
        assert!(core.offer("a", Evaluation::Complete(0.75)));
        assert!(core.offer("b", Evaluation::Complete(0.25)));
        assert_eq!(core.best_candidate(), Some(&"b"));
        assert_eq!(core.best_merit(), Some(0.5));
        assert_eq!(core.observer().rejected_count(), 1);
        assert_eq!(core.observer().total_count(), 2);
    }

    #[test]
    fn test_filters_disable_truncation() {
        let mut core = SearchCore::<()>::new(BestCandidateObserver::new(), true);
        core.start("test");
        assert!(core.observer().truncate_sum());
        core.add_filter(Box::new(ThresholdFilter { max: 1.0 }));
        core.start("test");
        assert!(!core.observer().truncate_sum());
    }

    #[test]
    fn test_aborted_is_visited_not_rejected() {
        let mut core = SearchCore::new(BestCandidateObserver::new(), true);
        core.start("test");
        core.offer(1, Evaluation::Aborted(3.0));
        assert_eq!(core.observer().total_count(), 1);
        assert_eq!(core.observer().rejected_count(), 0);
        assert!(core.best_candidate().is_none());
    }

    #[test]
    fn test_failed_search_calls_listeners() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut core = SearchCore::<u8>::new(BestCandidateObserver::new(), false);
        let seen = Arc::clone(&calls);
        core.add_listener(Box::new(move |d| seen.lock().unwrap().push(d.to_string())));
        core.add_filter(Box::new(ThresholdFilter { max: 0.0 }));
        core.start("empty search");
        core.offer(1, Evaluation::Complete(0.5));
        assert_eq!(core.finish("empty search"), SearchOutcome::Failed);
        assert_eq!(*calls.lock().unwrap(), vec!["empty search".to_string()]);
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        use rand::Rng;
        let a: u64 = make_rng(Some(7)).gen();
        let b: u64 = make_rng(Some(7)).gen();
        assert_eq!(a, b);
    }
}
