// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Generating matrices over GF(2).
//!
//! A column is stored as a `u64` whose most significant used bit is row 0:
//! for a matrix with `w` rows, entry `(i, j)` is bit `w - 1 - i` of column `j`.
//! This is exactly the integer a digital net XORs together to produce the
//! `w`-bit coordinate of a point, so no conversion is needed at evaluation time.

use super::GeneratingMatrixLike;
use rand::Rng;
use std::fmt;

/// Most rows a matrix can hold (one `u64` per column).
pub const MAX_ROWS: usize = 64;

/// Dense GF(2) matrix stored column-wise.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GeneratingMatrix {
    num_rows: usize,
    columns: Vec<u64>,
}

impl GeneratingMatrix {
    /// Zero matrix.
    ///
    /// # Panics
    ///
    /// If `num_rows` exceeds [`MAX_ROWS`].
    pub fn zeros(num_rows: usize, num_columns: usize) -> Self {
        assert!(num_rows <= MAX_ROWS, "at most {MAX_ROWS} rows, got {num_rows}");
        Self {
            num_rows,
            columns: vec![0; num_columns],
        }
    }

    /// Identity matrix of size `size`.
    pub fn identity(size: usize) -> Self {
        let mut matrix = Self::zeros(size, size);
        for i in 0..size {
            matrix.set(i, i, true);
        }
        matrix
    }

    /// Matrix from integer column representations (row 0 = most significant bit).
    ///
    /// Bits above `num_rows` are discarded.
    ///
    /// # Panics
    ///
    /// If `num_rows` exceeds [`MAX_ROWS`].
    pub fn from_columns(num_rows: usize, columns: Vec<u64>) -> Self {
        assert!(num_rows <= MAX_ROWS, "at most {MAX_ROWS} rows, got {num_rows}");
        let mask = crate::table::encoding::low_mask(num_rows);
        Self {
            num_rows,
            columns: columns.into_iter().map(|c| c & mask).collect(),
        }
    }

    fn row_bit(&self, row: usize) -> u64 {
        1u64 << (self.num_rows - 1 - row)
    }

    /// Set entry `(row, col)`.
    pub fn set(&mut self, row: usize, col: usize, value: bool) {
        let bit = self.row_bit(row);
        if value {
            self.columns[col] |= bit;
        } else {
            self.columns[col] &= !bit;
        }
    }

    /// Leading `size x size` block.
    ///
    /// # Panics
    ///
    /// If `size` exceeds the number of rows or of columns.
    pub fn upper_left(&self, size: usize) -> Self {
        assert!(
            size <= self.num_rows && size <= self.columns.len(),
            "a {size}x{size} block does not fit in a {}x{} matrix",
            self.num_rows,
            self.columns.len()
        );
        let shift = self.num_rows - size;
        Self::from_columns(
            size,
            self.columns[..size].iter().map(|c| c >> shift).collect(),
        )
    }

    /// Rank over GF(2), by elimination on the columns.
    pub fn rank(&self) -> usize {
        let mut pivots: Vec<u64> = Vec::with_capacity(self.num_rows);
        for &column in &self.columns {
            let mut v = column;
            for &p in &pivots {
                // p has a distinct leading bit; clear it from v when present
                let lead = 63 - p.leading_zeros();
                if v >> lead & 1 == 1 {
                    v ^= p;
                }
            }
            if v != 0 {
                pivots.push(v);
                pivots.sort_unstable_by(|a, b| b.cmp(a));
            }
        }
        pivots.len()
    }
}

impl GeneratingMatrixLike for GeneratingMatrix {
    fn num_rows(&self) -> usize {
        self.num_rows
    }

    fn num_columns(&self) -> usize {
        self.columns.len()
    }

    fn get(&self, row: usize, col: usize) -> bool {
        self.columns[col] & self.row_bit(row) != 0
    }

    fn flip(&mut self, row: usize, col: usize) {
        self.columns[col] ^= self.row_bit(row);
    }

    fn column_bits(&self, col: usize) -> u64 {
        self.columns[col]
    }

    fn random<R: Rng + ?Sized>(num_rows: usize, num_columns: usize, rng: &mut R) -> Self {
        let columns = (0..num_columns).map(|_| rng.gen::<u64>()).collect();
        Self::from_columns(num_rows, columns)
    }

    fn random_column<R: Rng + ?Sized>(num_rows: usize, rng: &mut R) -> Self {
        Self::random(num_rows, 1, rng)
    }

    fn random_lower_triangular<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Self {
        let mut matrix = Self::random(size, size, rng);
        for col in 0..size {
            // rows above the diagonal are the high bits of the column
            let keep = crate::table::encoding::low_mask(size - col);
            matrix.columns[col] &= keep;
            matrix.set(col, col, true);
        }
        matrix
    }

    fn stack_right(&mut self, other: Self) {
        assert_eq!(self.num_rows, other.num_rows, "row counts differ");
        self.columns.extend(other.columns);
    }

    fn is_leading_invertible(&self, size: usize) -> bool {
        if size > self.num_rows || size > self.columns.len() {
            return false;
        }
        self.upper_left(size).rank() == size
    }

    fn left_multiply(&self, lhs: &Self) -> Self {
        assert_eq!(lhs.columns.len(), self.num_rows, "dimensions do not conform");
        let columns = self
            .columns
            .iter()
            .map(|&column| {
                (0..self.num_rows)
                    .filter(|&i| column & self.row_bit(i) != 0)
                    .fold(0u64, |acc, i| acc ^ lhs.columns[i])
            })
            .collect();
        Self {
            num_rows: lhs.num_rows,
            columns,
        }
    }
}

impl fmt::Display for GeneratingMatrix {
    /// One line per row, e.g. `10\n01` for the 2x2 identity.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.num_rows {
            if row > 0 {
                writeln!(f)?;
            }
            for col in 0..self.columns.len() {
                write!(f, "{}", u8::from(self.get(row, col)))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256Plus;

    #[test]
    fn test_identity_layout() {
        let id = GeneratingMatrix::identity(3);
        assert_eq!(id.column_bits(0), 0b100);
        assert_eq!(id.column_bits(1), 0b010);
        assert_eq!(id.column_bits(2), 0b001);
        assert_eq!(format!("{}", id), "100\n010\n001");
    }

    #[test]
    fn test_rank() {
        assert_eq!(GeneratingMatrix::identity(5).rank(), 5);
        assert_eq!(GeneratingMatrix::zeros(4, 4).rank(), 0);
        let m = GeneratingMatrix::from_columns(3, vec![0b110, 0b011, 0b101]);
        assert_eq!(m.rank(), 2);
        let m = GeneratingMatrix::from_columns(3, vec![0b110, 0b011, 0b001]);
        assert_eq!(m.rank(), 3);
    }

    #[test]
    fn test_flip_and_get() {
        let mut m = GeneratingMatrix::zeros(4, 2);
        m.flip(3, 1);
        assert!(m.get(3, 1));
        assert_eq!(m.column_bits(1), 0b0001);
        m.flip(3, 1);
        assert!(!m.get(3, 1));
    }

    #[test]
    fn test_upper_left() {
        let m = GeneratingMatrix::from_columns(4, vec![0b1011, 0b0110, 0b1111]);
        let block = m.upper_left(2);
        assert_eq!(block.num_rows(), 2);
        assert_eq!(block.num_columns(), 2);
        assert_eq!(block.column_bits(0), 0b10);
        assert_eq!(block.column_bits(1), 0b01);
        assert!(m.is_leading_invertible(2));
        assert!(!m.is_leading_invertible(5));
    }

    #[test]
    fn test_random_lower_triangular_is_unit_lower() {
        let mut rng = Xoshiro256Plus::seed_from_u64(7);
        let l = GeneratingMatrix::random_lower_triangular(20, &mut rng);
        for row in 0..20 {
            assert!(l.get(row, row));
            for col in row + 1..20 {
                assert!(!l.get(row, col), "entry ({row}, {col}) above the diagonal");
            }
        }
        assert_eq!(l.rank(), 20);
    }

    #[test]
    fn test_left_multiply() {
        let mut rng = Xoshiro256Plus::seed_from_u64(3);
        let c = GeneratingMatrix::random(6, 4, &mut rng);
        assert_eq!(c.left_multiply(&GeneratingMatrix::identity(6)), c);

        // swap rows 0 and 1
        let p = GeneratingMatrix::from_columns(2, vec![0b01, 0b10]);
        let m = GeneratingMatrix::from_columns(2, vec![0b10, 0b11]);
        let pm = m.left_multiply(&p);
        assert_eq!(pm.column_bits(0), 0b01);
        assert_eq!(pm.column_bits(1), 0b11);
    }

    #[test]
    fn test_stack_right() {
        let mut m = GeneratingMatrix::identity(3);
        m.stack_right(GeneratingMatrix::from_columns(3, vec![0b111]));
        assert_eq!(m.num_columns(), 4);
        assert_eq!(m.column_bits(3), 0b111);
    }

    #[test]
    #[should_panic(expected = "does not fit")]
    fn test_upper_left_larger_than_matrix() {
        GeneratingMatrix::identity(3).upper_left(4);
    }

    #[test]
    #[should_panic(expected = "row counts differ")]
    fn test_stack_right_shape_mismatch() {
        let mut m = GeneratingMatrix::identity(3);
        m.stack_right(GeneratingMatrix::identity(4));
    }

    #[test]
    #[should_panic(expected = "at most 64 rows")]
    fn test_from_columns_too_many_rows() {
        GeneratingMatrix::from_columns(65, vec![1]);
    }
}
