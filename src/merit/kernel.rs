// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! One-dimensional WAFOM factors.
//!
//! For an encoded coordinate `x` on `w` bits the factor is
//!
//! ```text
//! phi(x) = prod_{l=1}^{w} (1 + (1 - 2 bit_l(x)) 2^{-factor (l + h)})
//! ```
//!
//! with `bit_1` the most significant bit. Both kernels compute the same value;
//! [`TableKernel`] does it with one lookup per segment.

use crate::error::{Error, Result};
use crate::table::{bit_weight, validate_definition, SegmentLookupTable, MAX_PRECISION};
use std::sync::Arc;

/// Computes the WAFOM factor of one encoded coordinate.
pub trait WafomKernel: Send + Sync {
    /// Bits per coordinate this kernel was built for.
    fn precision(&self) -> usize;

    fn coordinate_product(&self, x: u64) -> Result<f64>;

    /// Smallest value `coordinate_product` can return (all bits set).
    fn min_coordinate_product(&self) -> f64;

    /// Largest value `coordinate_product` can return (all bits clear).
    fn max_coordinate_product(&self) -> f64;

    fn name(&self) -> &'static str;
}

fn min_product(precision: usize, h: u32, factor: u32) -> f64 {
    (1..=precision)
        .map(|l| 1.0 - bit_weight(l, h, factor))
        .product()
}

fn max_product(precision: usize, h: u32, factor: u32) -> f64 {
    (1..=precision)
        .map(|l| 1.0 + bit_weight(l, h, factor))
        .product()
}

/// Reference kernel: walks the `w` bits one at a time.
#[derive(Debug, Clone)]
pub struct BitwiseKernel {
    h: u32,
    factor: u32,
    /// `2^{-factor (l + h)}` for `l = 1..=w`.
    weights: Vec<f64>,
    min_product: f64,
    max_product: f64,
}

impl BitwiseKernel {
    /// # Errors
    ///
    /// `InvalidConfiguration` when `precision` is not in `1..=64`, `h` is not
    /// 0 or 1, or `factor` is not 1 or 2.
    pub fn new(precision: usize, h: u32, factor: u32) -> Result<Self> {
        validate_definition(h, factor)?;
        if precision == 0 || precision > MAX_PRECISION {
            return Err(Error::invalid(format!(
                "precision must be between 1 and {MAX_PRECISION} bits, got {precision}"
            )));
        }
        Ok(Self {
            h,
            factor,
            weights: (1..=precision).map(|l| bit_weight(l, h, factor)).collect(),
            min_product: min_product(precision, h, factor),
            max_product: max_product(precision, h, factor),
        })
    }

    pub fn h(&self) -> u32 {
        self.h
    }

    pub fn factor(&self) -> u32 {
        self.factor
    }
}

impl WafomKernel for BitwiseKernel {
    fn precision(&self) -> usize {
        self.weights.len()
    }

    fn coordinate_product(&self, x: u64) -> Result<f64> {
        let w = self.weights.len();
        let mut product = 1.0;
        for (l, weight) in self.weights.iter().enumerate() {
            let bit = (x >> (w - 1 - l)) & 1;
            product *= 1.0 + (1.0 - 2.0 * bit as f64) * weight;
        }
        Ok(product)
    }

    fn min_coordinate_product(&self) -> f64 {
        self.min_product
    }

    fn max_coordinate_product(&self) -> f64 {
        self.max_product
    }

    fn name(&self) -> &'static str {
        "WAFOM"
    }
}

/// Table-accelerated kernel: one lookup per segment.
#[derive(Debug, Clone)]
pub struct TableKernel {
    table: Arc<SegmentLookupTable>,
    min_product: f64,
    max_product: f64,
}

impl TableKernel {
    pub fn new(table: Arc<SegmentLookupTable>) -> Self {
        let (bits, h, factor) = (table.total_bits(), table.h(), table.factor());
        Self {
            min_product: min_product(bits, h, factor),
            max_product: max_product(bits, h, factor),
            table,
        }
    }

    pub fn table(&self) -> &Arc<SegmentLookupTable> {
        &self.table
    }
}

impl WafomKernel for TableKernel {
    fn precision(&self) -> usize {
        self.table.total_bits()
    }

    fn coordinate_product(&self, x: u64) -> Result<f64> {
        self.table.coordinate_product(x)
    }

    fn min_coordinate_product(&self) -> f64 {
        self.min_product
    }

    fn max_coordinate_product(&self) -> f64 {
        self.max_product
    }

    fn name(&self) -> &'static str {
        "fast WAFOM"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bitwise_kernel_single_bit() {
        let kernel = BitwiseKernel::new(1, 0, 1).unwrap();
        assert_eq!(kernel.coordinate_product(0).unwrap(), 1.5);
        assert_eq!(kernel.coordinate_product(1).unwrap(), 0.5);
        assert_eq!(kernel.min_coordinate_product(), 0.5);
    }

    #[test]
    fn test_kernels_agree_on_every_coordinate() {
        let table = Arc::new(SegmentLookupTable::for_precision(11, 3, 1, 2).unwrap());
        let fast = TableKernel::new(table);
        let reference = BitwiseKernel::new(11, 1, 2).unwrap();
        assert_eq!(fast.precision(), 11);
        assert!((fast.min_coordinate_product() - reference.min_coordinate_product()).abs() < 1e-15);
        for x in 0..(1u64 << 11) {
            let a = fast.coordinate_product(x).unwrap();
            let b = reference.coordinate_product(x).unwrap();
            assert!((a - b).abs() < 1e-14, "x={x}: {a} != {b}");
        }
    }

    #[test]
    fn test_extreme_products() {
        let kernel = BitwiseKernel::new(9, 1, 1).unwrap();
        let all_ones = (1u64 << 9) - 1;
        assert_eq!(
            kernel.coordinate_product(all_ones).unwrap(),
            kernel.min_coordinate_product()
        );
        assert_eq!(
            kernel.coordinate_product(0).unwrap(),
            kernel.max_coordinate_product()
        );
    }

    #[test]
    fn test_bitwise_kernel_validation() {
        assert!(BitwiseKernel::new(0, 0, 1).is_err());
        assert!(BitwiseKernel::new(10, 2, 1).is_err());
        assert!(BitwiseKernel::new(10, 0, 3).is_err());
    }
}
