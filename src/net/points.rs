// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Point sets given directly as real coordinates.

use super::PointSet;
use crate::error::{Error, Result};
use crate::table::encode_coordinate;

/// Real points in [0, 1)^s, encoded once on `precision` bits.
///
/// # Example
///
/// ```
/// use wafom_search::net::{EncodedPointSet, PointSet};
///
/// let points = EncodedPointSet::from_reals(&[vec![0.0, 0.5], vec![0.75, 0.25]], 2).unwrap();
/// assert_eq!(points.num_points(), 2);
/// assert_eq!(points.coordinate(1, 0), 0b11);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPointSet {
    dimension: usize,
    precision: usize,
    /// Row-major: point `i` occupies `coordinates[i * dimension..(i + 1) * dimension]`.
    coordinates: Vec<u64>,
}

impl EncodedPointSet {
    /// Encode `points` by truncating every coordinate to `precision` bits.
    ///
    /// # Errors
    ///
    /// `CoordinateOutsideUnitInterval` for any coordinate outside [0, 1),
    /// `InvalidConfiguration` when the set is empty or the points do not all
    /// have the same, non-zero, dimension.
    pub fn from_reals(points: &[Vec<f64>], precision: usize) -> Result<Self> {
        let dimension = points
            .first()
            .map(Vec::len)
            .ok_or_else(|| Error::invalid("a point set needs at least one point"))?;
        if dimension == 0 {
            return Err(Error::invalid("points need at least one coordinate"));
        }
        let mut coordinates = Vec::with_capacity(points.len() * dimension);
        for (i, point) in points.iter().enumerate() {
            if point.len() != dimension {
                return Err(Error::invalid(format!(
                    "point {i} has {} coordinates, expected {dimension}",
                    point.len()
                )));
            }
            for &x in point {
                coordinates.push(encode_coordinate(x, precision)?);
            }
        }
        Ok(Self {
            dimension,
            precision,
            coordinates,
        })
    }
}

impl PointSet for EncodedPointSet {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn precision(&self) -> usize {
        self.precision
    }

    fn num_points(&self) -> usize {
        self.coordinates.len() / self.dimension
    }

    fn coordinate(&self, index: usize, dim: usize) -> u64 {
        self.coordinates[index * self.dimension + dim]
    }
}
