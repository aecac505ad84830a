// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Point-by-point WAFOM summation.
//!
//! ```text
//! WAFOM(P) = 1/|P| * sum_{i=0}^{|P|-1} ( prod_{j in J} phi(x_{i,j}) - 1 )
//! ```
//!
//! where `J` is every coordinate, or a projection. Points are summed in index
//! order starting at 0; comparisons between candidates rely on this order being
//! fixed.

use super::kernel::{BitwiseKernel, TableKernel, WafomKernel};
use super::projection::Projection;
use super::{Evaluation, MeritEvaluator, MeritValue, Progress};
use crate::error::{Error, Result};
use crate::net::PointSet;
use std::ops::Range;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// WAFOM evaluator over a kernel.
#[derive(Debug, Clone)]
pub struct WafomEvaluator<K> {
    kernel: K,
}

/// Bit-by-bit evaluator, the ground truth.
pub type ReferenceWafomEvaluator = WafomEvaluator<BitwiseKernel>;

/// Lookup-table evaluator.
pub type FastWafomEvaluator = WafomEvaluator<TableKernel>;

impl<K: WafomKernel> WafomEvaluator<K> {
    pub fn new(kernel: K) -> Self {
        Self { kernel }
    }

    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    fn check_precision(&self, points: &dyn PointSet) -> Result<()> {
        if points.precision() != self.kernel.precision() {
            return Err(Error::PrecisionMismatch {
                expected: self.kernel.precision(),
                found: points.precision(),
            });
        }
        Ok(())
    }

    /// `prod_{j in coordinates} phi(x_{index,j}) - 1`.
    fn point_term(
        &self,
        points: &dyn PointSet,
        index: usize,
        coordinates: &[usize],
    ) -> Result<f64> {
        let mut product = 1.0;
        for &dim in coordinates {
            product *= self.kernel.coordinate_product(points.coordinate(index, dim))?;
        }
        Ok(product - 1.0)
    }

    /// Sequential sum of the point terms over `range`.
    pub fn partial_sum(
        &self,
        points: &dyn PointSet,
        coordinates: &[usize],
        range: Range<usize>,
    ) -> Result<f64> {
        let mut sum = 0.0;
        for index in range {
            sum += self.point_term(points, index, coordinates)?;
        }
        Ok(sum)
    }

    /// Evaluate on the given coordinates only.
    ///
    /// With a progress predicate, it is polled after every point with a lower
    /// bound of the final merit: the partial sum plus the smallest possible
    /// term for each remaining point.
    pub fn evaluate_coordinates(
        &self,
        points: &dyn PointSet,
        coordinates: &[usize],
        progress: Progress<'_>,
    ) -> Result<Evaluation> {
        self.check_precision(points)?;
        if let Some(&bad) = coordinates.iter().find(|&&c| c >= points.dimension()) {
            return Err(Error::out_of_range(
                "coordinate",
                bad as u64,
                points.dimension() as u64,
            ));
        }

        let n = points.num_points();
        let norm = n as f64;
        let Some(progress) = progress else {
            return Ok(Evaluation::Complete(self.partial_sum(points, coordinates, 0..n)? / norm));
        };

        let order = i32::try_from(coordinates.len()).unwrap_or(i32::MAX);
        let min_term = self.kernel.min_coordinate_product().powi(order) - 1.0;
        let mut sum = 0.0;
        for index in 0..n {
            sum += self.point_term(points, index, coordinates)?;
            let remaining = (n - index - 1) as f64;
            let bound = (sum + remaining * min_term) / norm;
            if !progress(bound) {
                return Ok(Evaluation::Aborted(bound));
            }
        }
        Ok(Evaluation::Complete(sum / norm))
    }

    /// Evaluate the WAFOM of the projection of `points` onto `projection`.
    ///
    /// # Errors
    ///
    /// `OutOfRange` when the projection names a coordinate beyond the dimension.
    pub fn evaluate_projection(
        &self,
        points: &dyn PointSet,
        projection: &Projection,
        progress: Progress<'_>,
    ) -> Result<Evaluation> {
        self.evaluate_coordinates(points, projection.coordinates(), progress)
    }

    /// Evaluate with the point range split into chunks of `chunk_size` points
    /// summed on the rayon pool.
    ///
    /// Partial sums are added in chunk order, so the result does not depend on
    /// scheduling; it may differ from [`MeritEvaluator::evaluate`] in the last
    /// bits because the additions are grouped differently.
    #[cfg(feature = "parallel")]
    pub fn evaluate_parallel(
        &self,
        points: &dyn PointSet,
        chunk_size: usize,
    ) -> Result<MeritValue> {
        self.check_precision(points)?;
        let coordinates: Vec<usize> = (0..points.dimension()).collect();
        let n = points.num_points();
        let chunk = chunk_size.max(1);
        let starts: Vec<usize> = (0..n).step_by(chunk).collect();
        let partials = starts
            .par_iter()
            .map(|&start| self.partial_sum(points, &coordinates, start..(start + chunk).min(n)))
            .collect::<Result<Vec<f64>>>()?;
        let sum: f64 = partials.iter().sum();
        Ok(sum / n as f64)
    }
}

impl<K: WafomKernel> MeritEvaluator for WafomEvaluator<K> {
    fn name(&self) -> &str {
        self.kernel.name()
    }

    fn evaluate(&self, points: &dyn PointSet, progress: Progress<'_>) -> Result<Evaluation> {
        let coordinates: Vec<usize> = (0..points.dimension()).collect();
        self.evaluate_coordinates(points, &coordinates, progress)
    }
}
