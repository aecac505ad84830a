// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Rank-1 lattice rules of Korobov type.
//!
//! The lattice with `n` points and generator `a` has generating vector
//! `z = (1, a, a^2, ..., a^{s-1}) mod n` and points `x_i = frac(i z / n)`.
//! Coordinates are truncated to `precision` bits so the WAFOM evaluators can
//! score lattices the same way they score digital nets.

use super::PointSet;
use crate::error::{Error, Result};
use crate::table::MAX_PRECISION;
use std::fmt;

/// A Korobov lattice rule with its coordinates encoded on `precision` bits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KorobovLattice {
    num_points: u64,
    generator: u64,
    precision: usize,
    vector: Vec<u64>,
}

impl KorobovLattice {
    /// # Errors
    ///
    /// `InvalidConfiguration` when `num_points` or `dimension` is zero, or
    /// `precision` is not in `1..=64`.
    pub fn new(
        num_points: u64,
        generator: u64,
        dimension: usize,
        precision: usize,
    ) -> Result<Self> {
        if num_points == 0 {
            return Err(Error::invalid("a lattice needs at least one point"));
        }
        if dimension == 0 {
            return Err(Error::invalid("a lattice needs at least one coordinate"));
        }
        if precision == 0 || precision > MAX_PRECISION {
            return Err(Error::invalid(format!(
                "precision must be between 1 and {MAX_PRECISION} bits, got {precision}"
            )));
        }
        let mut vector = Vec::with_capacity(dimension);
        let mut z = 1 % num_points;
        for _ in 0..dimension {
            vector.push(z);
            z = mul_mod(z, generator % num_points, num_points);
        }
        Ok(Self {
            num_points,
            generator: generator % num_points,
            precision,
            vector,
        })
    }

    pub fn generator(&self) -> u64 {
        self.generator
    }

    /// The generating vector `(1, a, a^2, ...) mod n`.
    pub fn generating_vector(&self) -> &[u64] {
        &self.vector
    }
}

fn mul_mod(a: u64, b: u64, n: u64) -> u64 {
    ((a as u128 * b as u128) % n as u128) as u64
}

impl PointSet for KorobovLattice {
    fn dimension(&self) -> usize {
        self.vector.len()
    }

    fn precision(&self) -> usize {
        self.precision
    }

    fn num_points(&self) -> usize {
        self.num_points as usize
    }

    fn coordinate(&self, index: usize, dim: usize) -> u64 {
        let numerator = mul_mod(index as u64, self.vector[dim], self.num_points);
        // floor(numerator / n * 2^w), exact in integers
        (((numerator as u128) << self.precision) / self.num_points as u128) as u64
    }
}

impl fmt::Display for KorobovLattice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Korobov lattice n={} a={} s={}",
            self.num_points,
            self.generator,
            self.vector.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generating_vector() {
        let lattice = KorobovLattice::new(101, 12, 4, 16).unwrap();
        assert_eq!(lattice.generating_vector(), &[1, 12, 144 % 101, (144 % 101) * 12 % 101]);
    }

    #[test]
    fn test_coordinates_are_truncated_fractions() {
        let lattice = KorobovLattice::new(8, 3, 2, 4).unwrap();
        // point 3: (3/8, 9/8 mod 1 = 1/8)
        assert_eq!(lattice.coordinate(3, 0), 0b0110);
        assert_eq!(lattice.coordinate(3, 1), 0b0010);

        let lattice = KorobovLattice::new(3, 1, 1, 4).unwrap();
        // 1/3 = 0.0101..., 2/3 = 0.1010...
        assert_eq!(lattice.coordinate(1, 0), 0b0101);
        assert_eq!(lattice.coordinate(2, 0), 0b1010);
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(KorobovLattice::new(0, 1, 2, 10).is_err());
        assert!(KorobovLattice::new(8, 1, 0, 10).is_err());
        assert!(KorobovLattice::new(8, 1, 2, 0).is_err());
        assert!(KorobovLattice::new(8, 1, 2, 65).is_err());
    }
}
