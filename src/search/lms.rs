// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Linear matrix scrambling of an existing net.
//!
//! Each try draws a random nonsingular lower-triangular `L_j` per coordinate
//! and evaluates the net with generating matrices `L_j * C_j`. Scrambling
//! preserves the invertibility of the leading blocks of the base net.

use super::{
    make_rng, require_tries, FailedSearchListener, MeritFilter, SearchCore, SearchOutcome,
    SearchStrategy,
};
use crate::error::Result;
use crate::merit::{FigureOfMerit, MeritValue};
use crate::net::{DigitalNet, DigitalNetLike, GeneratingMatrix, GeneratingMatrixLike, PointSet};
use crate::observer::BestCandidateObserver;
use log::debug;
use rand_xoshiro::Xoshiro256Plus;
use std::sync::Arc;

pub struct LmsSearch<'a, M: GeneratingMatrixLike + Sync = GeneratingMatrix> {
    base: &'a DigitalNet<M>,
    figure: Arc<dyn FigureOfMerit>,
    nb_tries: usize,
    seed: Option<u64>,
    rng: Xoshiro256Plus,
    core: SearchCore<DigitalNet<M>>,
}

impl<'a, M: GeneratingMatrixLike + Sync> LmsSearch<'a, M> {
    /// # Errors
    ///
    /// `InvalidConfiguration` when `nb_tries` is zero.
    pub fn new(
        base: &'a DigitalNet<M>,
        figure: Arc<dyn FigureOfMerit>,
        nb_tries: usize,
        seed: Option<u64>,
        early_abortion: bool,
    ) -> Result<Self> {
        require_tries(nb_tries)?;
        Ok(Self {
            base,
            figure,
            nb_tries,
            seed,
            rng: make_rng(seed),
            core: SearchCore::new(BestCandidateObserver::new(), early_abortion),
        })
    }

    pub fn add_filter(&mut self, filter: Box<dyn MeritFilter>) {
        self.core.add_filter(filter);
    }

    pub fn observer(&self) -> &BestCandidateObserver<DigitalNet<M>> {
        self.core.observer()
    }

    pub fn take_best(&mut self) -> Option<(DigitalNet<M>, MeritValue)> {
        self.core.take_best()
    }

    fn scramble(&mut self) -> Result<DigitalNet<M>> {
        let rows = self.base.num_rows();
        let matrices = self
            .base
            .matrices()
            .iter()
            .map(|c| c.left_multiply(&M::random_lower_triangular(rows, &mut self.rng)))
            .collect();
        DigitalNet::from_matrices(matrices)
    }
}

impl<M: GeneratingMatrixLike + Sync> SearchStrategy for LmsSearch<'_, M> {
    type Candidate = DigitalNet<M>;

    fn execute(&mut self) -> Result<SearchOutcome> {
        let description = self.format();
        self.core.start(&description);
        let evaluator = self.figure.create_evaluator();
        for attempt in 0..self.nb_tries {
            let candidate = self.scramble()?;
            let evaluation = self.core.evaluate(evaluator.as_ref(), &candidate)?;
            debug!("scrambling {attempt}: {evaluation:?}");
            if !self.core.offer(candidate, evaluation) {
                break;
            }
        }
        Ok(self.core.finish(&description))
    }

    fn best_candidate(&self) -> Option<&DigitalNet<M>> {
        self.core.best_candidate()
    }

    fn best_merit_value(&self) -> Option<MeritValue> {
        self.core.best_merit()
    }

    fn format(&self) -> String {
        format!(
            "LMS search over a net with s={}, {}x{} matrices ({} tries)\n{}",
            self.base.dimension(),
            self.base.num_rows(),
            self.base.num_columns(),
            self.nb_tries,
            self.figure.format()
        )
    }

    fn reset(&mut self) {
        self.core.reset();
        self.rng = make_rng(self.seed);
    }

    fn on_failed_search(&mut self, listener: FailedSearchListener) {
        self.core.add_listener(listener);
    }
}
