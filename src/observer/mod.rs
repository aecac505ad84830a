// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Best-candidate tracking.
//!
//! The observer keeps the best candidate seen so far, counts what was visited
//! and rejected, and owns the low-pass threshold used for early abortion: once
//! a best merit is known, any evaluation whose lower bound exceeds it can stop.

use crate::merit::MeritValue;
use strum::EnumCount;
use strum_macros::EnumCount as EnumCountMacro;

#[derive(EnumCountMacro, Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum Counter {
    /// Candidates visited, accepted or not.
    Total,
    /// Candidates turned away by a merit filter.
    Rejected,
}

/// Upper threshold on partial merits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LowPass {
    threshold: MeritValue,
}

impl LowPass {
    pub fn new(threshold: MeritValue) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> MeritValue {
        self.threshold
    }

    pub fn set_threshold(&mut self, threshold: MeritValue) {
        self.threshold = threshold;
    }

    /// Whether `value` is still at or below the threshold.
    pub fn passes(&self, value: MeritValue) -> bool {
        value <= self.threshold
    }
}

impl Default for LowPass {
    fn default() -> Self {
        Self::new(MeritValue::INFINITY)
    }
}

/// Tracks the candidate with the smallest merit.
#[derive(Debug, Clone)]
pub struct BestCandidateObserver<C> {
    best: Option<(C, MeritValue)>,
    counts: [u64; Counter::COUNT],
    max_accepted: u64,
    max_total: u64,
    truncate_sum: bool,
    low_pass: LowPass,
}

impl<C> Default for BestCandidateObserver<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> BestCandidateObserver<C> {
    /// Observer without count limits.
    pub fn new() -> Self {
        Self::with_limits(u64::MAX, u64::MAX)
    }

    pub fn with_limits(max_accepted: u64, max_total: u64) -> Self {
        Self {
            best: None,
            counts: [0; Counter::COUNT],
            max_accepted,
            max_total,
            truncate_sum: false,
            low_pass: LowPass::default(),
        }
    }

    /// Reset counts, threshold and best candidate for a new search.
    pub fn start(&mut self) {
        self.counts = [0; Counter::COUNT];
        self.low_pass = LowPass::default();
        self.best = None;
    }

    /// End of the search: the threshold no longer applies.
    pub fn stop(&mut self) {
        self.low_pass = LowPass::default();
    }

    fn increment(&mut self, counter: Counter) {
        self.counts[counter as usize] += 1;
    }

    pub fn get(&self, counter: Counter) -> u64 {
        self.counts[counter as usize]
    }

    /// Count a visited candidate and report whether the search may go on.
    pub fn visited(&mut self, _merit: MeritValue) -> bool {
        self.increment(Counter::Total);
        self.should_continue()
    }

    pub fn reject<T: ?Sized>(&mut self, _candidate: &T) {
        self.increment(Counter::Rejected);
    }

    pub fn should_continue(&self) -> bool {
        self.accepted_count() < self.max_accepted && self.total_count() < self.max_total
    }

    pub fn min_updated(&mut self, best: MeritValue) {
        self.low_pass.set_threshold(best);
    }

    /// `false` iff truncation is on and `partial` exceeds the best merit so far.
    pub fn progress(&self, partial: MeritValue) -> bool {
        !self.truncate_sum || self.low_pass.passes(partial)
    }

    pub fn set_truncate_sum(&mut self, truncate: bool) {
        self.truncate_sum = truncate;
    }

    pub fn truncate_sum(&self) -> bool {
        self.truncate_sum
    }

    pub fn threshold(&self) -> MeritValue {
        self.low_pass.threshold()
    }

    /// Keep `candidate` if its merit is strictly smaller than the best so far.
    pub fn observe(&mut self, candidate: C, merit: MeritValue) -> bool {
        let better = match &self.best {
            Some((_, best)) => merit < *best,
            None => !merit.is_nan(),
        };
        if better {
            self.best = Some((candidate, merit));
            self.min_updated(merit);
        }
        better
    }

    pub fn best_candidate(&self) -> Option<&C> {
        self.best.as_ref().map(|(c, _)| c)
    }

    pub fn best_merit(&self) -> Option<MeritValue> {
        self.best.as_ref().map(|(_, m)| *m)
    }

    pub fn take_best(&mut self) -> Option<(C, MeritValue)> {
        self.best.take()
    }

    pub fn clear_best(&mut self) {
        self.best = None;
    }

    pub fn has_found(&self) -> bool {
        self.best.is_some()
    }

    pub fn total_count(&self) -> u64 {
        self.get(Counter::Total)
    }

    pub fn rejected_count(&self) -> u64 {
        self.get(Counter::Rejected)
    }

    pub fn accepted_count(&self) -> u64 {
        self.total_count().saturating_sub(self.rejected_count())
    }
}
