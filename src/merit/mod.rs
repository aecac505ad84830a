// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Figures of merit and their evaluators.
//!
//! # Architecture
//!
//! - [`kernel`]: the one-dimensional WAFOM factor of a coordinate, computed
//!   bit by bit ([`BitwiseKernel`]) or from the segment table ([`TableKernel`])
//! - [`wafom`]: [`WafomEvaluator`], the point-by-point summation shared by both
//!   kernels, with projection-restricted and parallel variants
//! - [`projection`]: coordinate subsets and their weights
//! - [`weighted`]: weighted combination of projection merits
//! - [`figure`]: the [`FigureOfMerit`] contract the searches are written against
//!
//! # Early abortion
//!
//! Every evaluator accepts an optional progress predicate. It is called with a
//! value that can only grow as the evaluation proceeds and never exceeds the
//! final merit; when it answers `false` the evaluator stops and returns
//! [`Evaluation::Aborted`]. Searches pass the low-pass filter of their observer
//! so that a candidate already known to lose is not evaluated to the end.

pub mod figure;
pub mod kernel;
pub mod projection;
pub mod wafom;
pub mod weighted;

pub use figure::{FastWafomFigure, FigureOfMerit, WafomFigure, WeightedWafomFigure};
pub use kernel::{BitwiseKernel, TableKernel, WafomKernel};
pub use projection::{OrderDependentWeights, ProductWeights, Projection, Weights};
pub use wafom::{FastWafomEvaluator, ReferenceWafomEvaluator, WafomEvaluator};
pub use weighted::{Norm, WeightedWafomEvaluator};

use crate::error::Result;
use crate::net::PointSet;

/// A figure-of-merit value. Lower is better.
pub type MeritValue = f64;

/// Optional should-continue predicate polled during an evaluation.
pub type Progress<'a> = Option<&'a dyn Fn(MeritValue) -> bool>;

/// Outcome of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Evaluation {
    /// The evaluation ran to the end.
    Complete(MeritValue),

    /// The progress predicate stopped the evaluation. The value is the lower
    /// bound of the merit that was last reported to the predicate.
    Aborted(MeritValue),
}

impl Evaluation {
    /// The merit, if the evaluation completed.
    pub fn merit(self) -> Option<MeritValue> {
        match self {
            Evaluation::Complete(merit) => Some(merit),
            Evaluation::Aborted(_) => None,
        }
    }

    pub fn is_aborted(self) -> bool {
        matches!(self, Evaluation::Aborted(_))
    }

    /// The merit or the partial value, whichever this is.
    pub fn value(self) -> MeritValue {
        match self {
            Evaluation::Complete(value) | Evaluation::Aborted(value) => value,
        }
    }
}

/// Scores a point set.
///
/// Implementations are pure: they read the point set and any shared table
/// and mutate nothing, so one evaluator may serve several threads.
pub trait MeritEvaluator: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Evaluate `points`, polling `progress` along the way.
    fn evaluate(&self, points: &dyn PointSet, progress: Progress<'_>) -> Result<Evaluation>;

    /// Evaluate `points` to completion.
    fn merit(&self, points: &dyn PointSet) -> Result<MeritValue> {
        Ok(self.evaluate(points, None)?.value())
    }
}
