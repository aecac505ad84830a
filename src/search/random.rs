// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Random search: independent random candidates, keep the best.

use super::{
    make_rng, require_tries, FailedSearchListener, MeritFilter, SearchCore, SearchOutcome,
    SearchStrategy,
};
use crate::error::{Error, Result};
use crate::merit::{FigureOfMerit, MeritValue};
use crate::net::digital_net::MAX_COLUMNS;
use crate::net::{
    DigitalNet, GeneratingMatrix, GeneratingMatrixLike, KorobovLattice, PointSet, MAX_ROWS,
};
use crate::observer::BestCandidateObserver;
use log::debug;
use rand::Rng;
use rand_xoshiro::Xoshiro256Plus;
use std::marker::PhantomData;
use std::sync::Arc;

/// Produces random candidates.
pub trait CandidateGenerator {
    type Candidate: PointSet;

    fn generate(&self, rng: &mut Xoshiro256Plus) -> Result<Self::Candidate>;

    fn describe(&self) -> String;
}

/// Digital nets with uniformly random generating matrices.
#[derive(Debug, Clone)]
pub struct RandomNetGenerator<M = GeneratingMatrix> {
    dimension: usize,
    rows: usize,
    columns: usize,
    matrix: PhantomData<M>,
}

impl<M> RandomNetGenerator<M> {
    /// # Errors
    ///
    /// `InvalidConfiguration` when `dimension` is zero, `rows` is not in
    /// `1..=64` or `columns` exceeds the largest supported net.
    pub fn new(dimension: usize, rows: usize, columns: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(Error::invalid("dimension must be positive"));
        }
        if rows == 0 || rows > MAX_ROWS {
            return Err(Error::invalid(format!(
                "generating matrices need between 1 and {MAX_ROWS} rows, got {rows}"
            )));
        }
        if columns > MAX_COLUMNS {
            return Err(Error::invalid(format!(
                "at most {MAX_COLUMNS} columns, got {columns}"
            )));
        }
        Ok(Self {
            dimension,
            rows,
            columns,
            matrix: PhantomData,
        })
    }
}

impl<M: GeneratingMatrixLike + Sync> CandidateGenerator for RandomNetGenerator<M> {
    type Candidate = DigitalNet<M>;

    fn generate(&self, rng: &mut Xoshiro256Plus) -> Result<DigitalNet<M>> {
        let matrices = (0..self.dimension)
            .map(|_| M::random(self.rows, self.columns, rng))
            .collect();
        DigitalNet::new(matrices)
    }

    fn describe(&self) -> String {
        format!(
            "random digital nets (s={}, {}x{} matrices)",
            self.dimension, self.rows, self.columns
        )
    }
}

/// Korobov lattices with a random generator coprime with the point count.
#[derive(Debug, Clone)]
pub struct KorobovGenerator {
    num_points: u64,
    dimension: usize,
    precision: usize,
}

impl KorobovGenerator {
    /// # Errors
    ///
    /// `InvalidConfiguration` when there are fewer than two points or the
    /// lattice parameters are invalid.
    pub fn new(num_points: u64, dimension: usize, precision: usize) -> Result<Self> {
        if num_points < 2 {
            return Err(Error::invalid(format!(
                "a Korobov search needs at least 2 points, got {num_points}"
            )));
        }
        // validates dimension and precision
        KorobovLattice::new(num_points, 1, dimension, precision)?;
        Ok(Self {
            num_points,
            dimension,
            precision,
        })
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

impl CandidateGenerator for KorobovGenerator {
    type Candidate = KorobovLattice;

    fn generate(&self, rng: &mut Xoshiro256Plus) -> Result<KorobovLattice> {
        let generator = loop {
            let a = rng.gen_range(1..self.num_points);
            if gcd(a, self.num_points) == 1 {
                break a;
            }
        };
        KorobovLattice::new(self.num_points, generator, self.dimension, self.precision)
    }

    fn describe(&self) -> String {
        format!(
            "random Korobov lattices (n={}, s={})",
            self.num_points, self.dimension
        )
    }
}

/// Up to `nb_tries` independent random candidates.
pub struct RandomSearch<G: CandidateGenerator> {
    generator: G,
    figure: Arc<dyn FigureOfMerit>,
    nb_tries: usize,
    seed: Option<u64>,
    rng: Xoshiro256Plus,
    core: SearchCore<G::Candidate>,
}

impl<G: CandidateGenerator> RandomSearch<G> {
    /// # Errors
    ///
    /// `InvalidConfiguration` when `nb_tries` is zero.
    pub fn new(
        generator: G,
        figure: Arc<dyn FigureOfMerit>,
        nb_tries: usize,
        seed: Option<u64>,
        early_abortion: bool,
    ) -> Result<Self> {
        Self::with_observer(
            generator,
            figure,
            nb_tries,
            seed,
            early_abortion,
            BestCandidateObserver::new(),
        )
    }

    pub fn with_observer(
        generator: G,
        figure: Arc<dyn FigureOfMerit>,
        nb_tries: usize,
        seed: Option<u64>,
        early_abortion: bool,
        observer: BestCandidateObserver<G::Candidate>,
    ) -> Result<Self> {
        require_tries(nb_tries)?;
        Ok(Self {
            generator,
            figure,
            nb_tries,
            seed,
            rng: make_rng(seed),
            core: SearchCore::new(observer, early_abortion),
        })
    }

    pub fn add_filter(&mut self, filter: Box<dyn MeritFilter>) {
        self.core.add_filter(filter);
    }

    pub fn observer(&self) -> &BestCandidateObserver<G::Candidate> {
        self.core.observer()
    }

    pub fn take_best(&mut self) -> Option<(G::Candidate, MeritValue)> {
        self.core.take_best()
    }
}

impl<G: CandidateGenerator> SearchStrategy for RandomSearch<G> {
    type Candidate = G::Candidate;

    fn execute(&mut self) -> Result<SearchOutcome> {
        let description = self.format();
        self.core.start(&description);
        let evaluator = self.figure.create_evaluator();
        for attempt in 0..self.nb_tries {
            let candidate = self.generator.generate(&mut self.rng)?;
            let evaluation = self.core.evaluate(evaluator.as_ref(), &candidate)?;
            debug!("try {attempt}: {evaluation:?}");
            if !self.core.offer(candidate, evaluation) {
                break;
            }
        }
        Ok(self.core.finish(&description))
    }

    fn best_candidate(&self) -> Option<&G::Candidate> {
        self.core.best_candidate()
    }

    fn best_merit_value(&self) -> Option<MeritValue> {
        self.core.best_merit()
    }

    fn format(&self) -> String {
        format!(
            "Random search over {} ({} tries)\n{}",
            self.generator.describe(),
            self.nb_tries,
            self.figure.format()
        )
    }

    /// Also restarts the random sequence when the search is seeded.
    fn reset(&mut self) {
        self.core.reset();
        self.rng = make_rng(self.seed);
    }

    fn on_failed_search(&mut self, listener: FailedSearchListener) {
        self.core.add_listener(listener);
    }
}
