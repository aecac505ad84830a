// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! WAFOM evaluation and search for quasi-Monte Carlo point sets.
//!
//! The crate scores digital nets and lattice rules with the Walsh figure of
//! merit (WAFOM) and searches for point sets that minimize it, either by
//! random sampling or by building generating matrices one column at a time.
//!
//! # Architecture
//!
//! The implementation uses a two-tier memory model:
//!
//! ## Tier 1: Precomputed data (immutable)
//!
//! - [`SegmentLookupTable`]: the WAFOM factor of every value of every segment
//!   of a coordinate, built once and shared through `Arc`
//!
//! ## Tier 2: Search state (mutable, owned by one search)
//!
//! - [`observer::BestCandidateObserver`]: best candidate, counts and the
//!   low-pass threshold used to abort hopeless evaluations
//! - the random number generator and the partially built generating matrices
//!
//! # Search Algorithm
//!
//! Every strategy repeats the same steps:
//!
//! 1. **Generate**: a random net, a random Korobov lattice, one more column,
//!    or a random scrambling of an existing net
//! 2. **Evaluate**: the figure of merit, stopping early once the partial value
//!    is known to exceed the best merit
//! 3. **Select**: filters may reject the merit; the observer keeps the
//!    strictly smallest
//!
//! # Parallelization
//!
//! With the `parallel` feature (on by default) a single evaluation can split
//! its point range across the rayon pool; see
//! [`merit::WafomEvaluator::evaluate_parallel`]. Search loops themselves stay
//! sequential so that seeded searches are reproducible.
//!
//! # References
//!
//! - Matsumoto, M., Saito, M., Matoba, K. (2014). "A computable figure of merit
//!   for quasi-Monte Carlo point sets." Mathematics of Computation 83.
//! - Harase, S. (2015). "Quasi-Monte Carlo point sets with small t-values and
//!   WAFOM." Applied Mathematics and Computation 254.
//! - Harase, S. (2016). "A search for extensible low-WAFOM point sets." Monte
//!   Carlo Methods and Applications 22(4). The segment lookup table and the
//!   column-by-column search follow this paper.

pub mod config;
pub mod error;
pub mod merit;
pub mod net;
pub mod observer;
pub mod search;
pub mod table;

// Re-export commonly used types
pub use config::SearchConfig;
pub use error::{Error, Result};
pub use merit::{FigureOfMerit, MeritEvaluator, MeritValue};
pub use net::{DigitalNet, GeneratingMatrix, KorobovLattice, PointSet};
pub use search::{SearchOutcome, SearchStrategy};
pub use table::SegmentLookupTable;
