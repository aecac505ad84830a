// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Explicit digital nets in base 2.
//!
//! Point `i` of a net with generating matrices `C_1..C_s` has coordinate
//! `C_j * digits(i)`, where `digits(i)` is the binary expansion of `i` (least
//! significant digit first). With the columns stored as integers the
//! coordinate is the XOR of the columns selected by the set bits of `i`.

use super::{DigitalNetLike, GeneratingMatrix, GeneratingMatrixLike, PointSet, MAX_ROWS};
use crate::error::{Error, Result};
use std::fmt;

/// Most columns a net can have; `2^k` points must fit in a `usize`.
pub const MAX_COLUMNS: usize = 40;

/// A digital net given explicitly by its generating matrices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigitalNet<M: GeneratingMatrixLike = GeneratingMatrix> {
    matrices: Vec<M>,
    /// Integer column representations, cached per coordinate.
    columns: Vec<Vec<u64>>,
    num_rows: usize,
    num_columns: usize,
}

impl<M: GeneratingMatrixLike> DigitalNet<M> {
    /// Net of dimension `matrices.len()`.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` when there are no matrices, their shapes differ,
    /// or the shape exceeds [`MAX_ROWS`] rows or [`MAX_COLUMNS`] columns.
    pub fn new(matrices: Vec<M>) -> Result<Self> {
        let first = matrices
            .first()
            .ok_or_else(|| Error::invalid("a digital net needs at least one coordinate"))?;
        let num_rows = first.num_rows();
        let num_columns = first.num_columns();
        if num_rows == 0 || num_rows > MAX_ROWS {
            return Err(Error::invalid(format!(
                "generating matrices need between 1 and {MAX_ROWS} rows, got {num_rows}"
            )));
        }
        if num_columns > MAX_COLUMNS {
            return Err(Error::invalid(format!(
                "at most {MAX_COLUMNS} columns, got {num_columns}"
            )));
        }
        if let Some((dim, m)) = matrices
            .iter()
            .enumerate()
            .find(|(_, m)| m.num_rows() != num_rows || m.num_columns() != num_columns)
        {
            return Err(Error::invalid(format!(
                "matrix {dim} is {}x{}, expected {num_rows}x{num_columns}",
                m.num_rows(),
                m.num_columns()
            )));
        }

        let columns = matrices
            .iter()
            .map(|m| (0..num_columns).map(|c| m.column_bits(c)).collect())
            .collect();
        Ok(Self {
            matrices,
            columns,
            num_rows,
            num_columns,
        })
    }

    /// Generating matrices, one per coordinate.
    pub fn matrices(&self) -> &[M] {
        &self.matrices
    }

    /// Consume the net, returning its generating matrices.
    pub fn into_matrices(self) -> Vec<M> {
        self.matrices
    }
}

impl<M: GeneratingMatrixLike + Sync> PointSet for DigitalNet<M> {
    fn dimension(&self) -> usize {
        self.matrices.len()
    }

    fn precision(&self) -> usize {
        self.num_rows
    }

    fn num_points(&self) -> usize {
        1usize << self.num_columns
    }

    fn coordinate(&self, index: usize, dim: usize) -> u64 {
        let columns = &self.columns[dim];
        let mut digits = index;
        let mut value = 0u64;
        let mut c = 0;
        while digits != 0 {
            if digits & 1 == 1 {
                value ^= columns[c];
            }
            digits >>= 1;
            c += 1;
        }
        value
    }
}

impl<M: GeneratingMatrixLike + Sync> DigitalNetLike for DigitalNet<M> {
    type Matrix = M;

    fn from_matrices(matrices: Vec<M>) -> Result<Self> {
        Self::new(matrices)
    }

    fn num_rows(&self) -> usize {
        self.num_rows
    }

    fn num_columns(&self) -> usize {
        self.num_columns
    }

    fn generating_matrix(&self, dim: usize) -> &M {
        &self.matrices[dim]
    }
}

impl<M: GeneratingMatrixLike> fmt::Display for DigitalNet<M> {
    /// `s=2 w=4 k=3 [8 4 2] [15 3 1]`: integer columns per coordinate.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "s={} w={} k={}",
            self.matrices.len(),
            self.num_rows,
            self.num_columns
        )?;
        for columns in &self.columns {
            write!(f, " [")?;
            for (i, c) in columns.iter().enumerate() {
                if i > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{c}")?;
            }
            write!(f, "]")?;
        }
        Ok(())
    }
}
