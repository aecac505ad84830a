// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Point-set structures consumed by the evaluators and produced by the searches.
//!
//! The search engine only talks to these through three narrow traits:
//!
//! - [`GeneratingMatrixLike`]: structural operations on a GF(2) generating matrix
//! - [`DigitalNetLike`]: a set of generating matrices of equal shape
//! - [`PointSet`]: anything that can hand out `w`-bit encoded coordinates
//!
//! The concrete types in this module are deliberately small: a dense
//! column-wise [`GeneratingMatrix`], an explicit [`DigitalNet`], a rank-1
//! [`KorobovLattice`] and an [`EncodedPointSet`] of user-supplied points.

pub mod digital_net;
pub mod lattice;
pub mod matrix;
pub mod points;

pub use digital_net::DigitalNet;
pub use lattice::KorobovLattice;
pub use matrix::{GeneratingMatrix, MAX_ROWS};
pub use points::EncodedPointSet;

use crate::error::Result;
use rand::Rng;

/// A point set whose coordinates are `precision`-bit unsigned integers.
///
/// Coordinate `x` stands for the real number `x / 2^precision` in [0, 1).
/// Implementations must be cheap to query concurrently; evaluators may split
/// the point range across threads.
pub trait PointSet: Sync {
    /// Number of coordinates per point.
    fn dimension(&self) -> usize;

    /// Bits per coordinate.
    fn precision(&self) -> usize;

    fn num_points(&self) -> usize;

    /// Encoded coordinate `dim` of point `index`.
    fn coordinate(&self, index: usize, dim: usize) -> u64;
}

/// Structural operations on a generating matrix over GF(2).
pub trait GeneratingMatrixLike: Clone {
    fn num_rows(&self) -> usize;

    fn num_columns(&self) -> usize;

    fn get(&self, row: usize, col: usize) -> bool;

    fn flip(&mut self, row: usize, col: usize);

    /// Integer representation of column `col`, row 0 being the most significant bit.
    fn column_bits(&self, col: usize) -> u64;

    /// Matrix with uniformly random entries.
    fn random<R: Rng + ?Sized>(num_rows: usize, num_columns: usize, rng: &mut R) -> Self;

    /// Single random column.
    fn random_column<R: Rng + ?Sized>(num_rows: usize, rng: &mut R) -> Self;

    /// Random lower-triangular matrix with unit diagonal (hence nonsingular).
    fn random_lower_triangular<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Self;

    /// Append the columns of `other` on the right.
    ///
    /// # Panics
    ///
    /// If the row counts differ.
    fn stack_right(&mut self, other: Self);

    /// Whether the leading `size x size` block is invertible.
    fn is_leading_invertible(&self, size: usize) -> bool;

    /// The product `lhs * self`.
    ///
    /// # Panics
    ///
    /// If `lhs` does not have one column per row of `self`.
    fn left_multiply(&self, lhs: &Self) -> Self;
}

/// A digital net in base 2 defined by one generating matrix per coordinate.
pub trait DigitalNetLike: PointSet + Sized {
    type Matrix: GeneratingMatrixLike;

    /// Net from `matrices`, one per coordinate, all of the same shape.
    fn from_matrices(matrices: Vec<Self::Matrix>) -> Result<Self>;

    fn num_rows(&self) -> usize;

    fn num_columns(&self) -> usize;

    fn generating_matrix(&self, dim: usize) -> &Self::Matrix;
}
