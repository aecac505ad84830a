// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Projections (coordinate subsets) and projection weights.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A strictly increasing set of coordinate indices.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Projection(Vec<usize>);

impl Projection {
    /// Projection onto `coordinates`; duplicates are removed and order is normalized.
    pub fn new(coordinates: impl IntoIterator<Item = usize>) -> Self {
        let mut coordinates: Vec<usize> = coordinates.into_iter().collect();
        coordinates.sort_unstable();
        coordinates.dedup();
        Self(coordinates)
    }

    /// Projection onto all of `0..dimension`.
    pub fn full(dimension: usize) -> Self {
        Self((0..dimension).collect())
    }

    /// Every non-empty projection of `0..dimension` with at most `max_order`
    /// coordinates, by increasing order then lexicographically.
    ///
    /// ```
    /// use wafom_search::merit::Projection;
    ///
    /// let all: Vec<String> = Projection::all_up_to(3, 2).iter().map(|p| p.to_string()).collect();
    /// assert_eq!(all, ["{0}", "{1}", "{2}", "{0,1}", "{0,2}", "{1,2}"]);
    /// ```
    pub fn all_up_to(dimension: usize, max_order: usize) -> Vec<Projection> {
        let mut projections = Vec::new();
        for order in 1..=max_order.min(dimension) {
            let mut current: Vec<usize> = (0..order).collect();
            loop {
                projections.push(Projection(current.clone()));
                // advance to the next combination in lexicographic order
                let Some(i) = (0..order).rev().find(|&i| current[i] < dimension - order + i) else {
                    break;
                };
                current[i] += 1;
                for j in i + 1..order {
                    current[j] = current[j - 1] + 1;
                }
            }
        }
        projections
    }

    pub fn coordinates(&self) -> &[usize] {
        &self.0
    }

    /// Number of coordinates.
    pub fn order(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Largest coordinate index, if any.
    pub fn max_coordinate(&self) -> Option<usize> {
        self.0.last().copied()
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, c) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{c}")?;
        }
        write!(f, "}}")
    }
}

/// Importance of each projection in a weighted figure of merit.
pub trait Weights: Send + Sync + fmt::Debug {
    fn weight(&self, projection: &Projection) -> f64;
}

/// Product weights: the weight of a projection is the product of the weights
/// of its coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductWeights {
    /// Weight of every coordinate without an explicit entry.
    pub default: f64,
    /// Weight of coordinate `j` at index `j`.
    #[serde(default)]
    pub coordinates: Vec<f64>,
}

impl ProductWeights {
    pub fn uniform(default: f64) -> Self {
        Self {
            default,
            coordinates: Vec::new(),
        }
    }

    fn coordinate_weight(&self, coordinate: usize) -> f64 {
        self.coordinates
            .get(coordinate)
            .copied()
            .unwrap_or(self.default)
    }
}

impl Weights for ProductWeights {
    fn weight(&self, projection: &Projection) -> f64 {
        projection
            .coordinates()
            .iter()
            .map(|&c| self.coordinate_weight(c))
            .product()
    }
}

/// Order-dependent weights: the weight depends only on the projection's order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDependentWeights {
    pub default: f64,
    /// Weight of order `k` at index `k - 1`.
    #[serde(default)]
    pub orders: Vec<f64>,
}

impl OrderDependentWeights {
    pub fn uniform(default: f64) -> Self {
        Self {
            default,
            orders: Vec::new(),
        }
    }
}

impl Weights for OrderDependentWeights {
    fn weight(&self, projection: &Projection) -> f64 {
        projection
            .order()
            .checked_sub(1)
            .and_then(|k| self.orders.get(k))
            .copied()
            .unwrap_or(self.default)
    }
}
