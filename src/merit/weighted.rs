// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Weighted, projection-dependent WAFOM.
//!
//! ```text
//! merit(P) = (+)_{u, 1 <= |u| <= max_order} gamma_u * WAFOM(P_u)
//! ```
//!
//! where `P_u` is the projection of `P` onto the coordinates in `u`,
//! `gamma_u` its weight and `(+)` either a sum or a maximum.
//!
//! The progress predicate is polled after each projection with a lower bound
//! of the final merit. For the maximum that is the running maximum. For the sum
//! it is the running sum plus, for every projection still to come, the
//! smallest value `gamma_u * WAFOM(P_u)` can take: projection WAFOM lies
//! between `min_product^|u| - 1` and `max_product^|u| - 1`, and lattices do
//! reach the negative side.

use super::kernel::WafomKernel;
use super::projection::{Projection, Weights};
use super::wafom::WafomEvaluator;
use super::{Evaluation, MeritEvaluator, MeritValue, Progress};
use crate::error::Result;
use crate::net::PointSet;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strum_macros::{Display, EnumString};

/// How weighted projection merits are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Norm {
    /// 1-norm: sum of the weighted merits.
    #[default]
    Sum,
    /// Infinity norm: largest weighted merit.
    Max,
}

impl Norm {
    /// Start value of a fold.
    fn identity(self) -> MeritValue {
        match self {
            Norm::Sum => 0.0,
            Norm::Max => MeritValue::NEG_INFINITY,
        }
    }

    /// Fold `value` into `acc`.
    pub fn accumulate(self, acc: MeritValue, value: MeritValue) -> MeritValue {
        match self {
            Norm::Sum => acc + value,
            Norm::Max => acc.max(value),
        }
    }

    /// Combine a sequence of values, in order. An empty sequence combines to 0.
    pub fn combine(self, values: &[MeritValue]) -> MeritValue {
        if values.is_empty() {
            return 0.0;
        }
        values
            .iter()
            .fold(self.identity(), |acc, &v| self.accumulate(acc, v))
    }
}

/// Evaluator combining the WAFOM of every projection up to `max_order`.
#[derive(Debug, Clone)]
pub struct WeightedWafomEvaluator<K> {
    inner: WafomEvaluator<K>,
    weights: Arc<dyn Weights>,
    max_order: usize,
    norm: Norm,
}

impl<K: WafomKernel> WeightedWafomEvaluator<K> {
    pub fn new(kernel: K, weights: Arc<dyn Weights>, max_order: usize, norm: Norm) -> Self {
        Self {
            inner: WafomEvaluator::new(kernel),
            weights,
            max_order,
            norm,
        }
    }

    pub fn max_order(&self) -> usize {
        self.max_order
    }

    pub fn norm(&self) -> Norm {
        self.norm
    }

    /// Projections up to `max_order` with their weights, zero weights skipped.
    fn weighted_projections(&self, dimension: usize) -> Vec<(Projection, f64)> {
        Projection::all_up_to(dimension, self.max_order)
            .into_iter()
            .map(|projection| {
                let weight = self.weights.weight(&projection);
                (projection, weight)
            })
            .filter(|&(_, weight)| weight != 0.0)
            .collect()
    }

    /// Smallest value `weight * WAFOM(P_u)` can take when `|u| = order`.
    fn min_term(&self, weight: f64, order: usize) -> f64 {
        let order = i32::try_from(order).unwrap_or(i32::MAX);
        let kernel = self.inner.kernel();
        let lowest = kernel.min_coordinate_product().powi(order) - 1.0;
        let highest = kernel.max_coordinate_product().powi(order) - 1.0;
        (weight * lowest).min(weight * highest)
    }

    /// Weighted merit of every projection with a non-zero weight, in
    /// enumeration order.
    pub fn projection_merits(
        &self,
        points: &dyn PointSet,
    ) -> Result<Vec<(Projection, MeritValue)>> {
        let mut merits = Vec::new();
        for (projection, weight) in self.weighted_projections(points.dimension()) {
            let merit = self
                .inner
                .evaluate_projection(points, &projection, None)?
                .value();
            merits.push((projection, weight * merit));
        }
        Ok(merits)
    }
}

impl<K: WafomKernel> MeritEvaluator for WeightedWafomEvaluator<K> {
    fn name(&self) -> &str {
        "weighted WAFOM"
    }

    /// An empty set of weighted projections evaluates to 0.
    fn evaluate(&self, points: &dyn PointSet, progress: Progress<'_>) -> Result<Evaluation> {
        let projections = self.weighted_projections(points.dimension());
        if projections.is_empty() {
            return Ok(Evaluation::Complete(0.0));
        }

        // still_to_come[i]: lower bound of the sum over projections i..
        let mut still_to_come = vec![0.0; projections.len() + 1];
        if self.norm == Norm::Sum && progress.is_some() {
            for (i, (projection, weight)) in projections.iter().enumerate().rev() {
                let lowest = self.min_term(*weight, projection.order());
                still_to_come[i] = still_to_come[i + 1] + lowest;
            }
        }

        let mut acc = self.norm.identity();
        for (i, (projection, weight)) in projections.iter().enumerate() {
            let merit = self
                .inner
                .evaluate_projection(points, projection, None)?
                .value();
            acc = self.norm.accumulate(acc, weight * merit);
            if let Some(progress) = progress {
                let bound = match self.norm {
                    Norm::Sum => acc + still_to_come[i + 1],
                    Norm::Max => acc,
                };
                if !progress(bound) {
                    return Ok(Evaluation::Aborted(bound));
                }
            }
        }
        Ok(Evaluation::Complete(acc))
    }
}
