// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Once};
use wafom_search::merit::{FastWafomFigure, FigureOfMerit, WafomFigure};
use wafom_search::net::EncodedPointSet;
use wafom_search::SegmentLookupTable;

static LOGGER: Once = Once::new();

/// Route `log` output through the test harness.
pub fn init_logging() {
    LOGGER.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// Bits per coordinate of the reference configuration.
pub const PRECISION: usize = 15;
pub const SEGMENTS: usize = 3;
pub const H: u32 = 1;
pub const FACTOR: u32 = 2;

pub fn table() -> Arc<SegmentLookupTable> {
    Arc::new(SegmentLookupTable::for_precision(PRECISION, SEGMENTS, H, FACTOR).unwrap())
}

pub fn fast_figure() -> Arc<dyn FigureOfMerit> {
    Arc::new(FastWafomFigure::new(table()))
}

pub fn reference_figure() -> Arc<dyn FigureOfMerit> {
    Arc::new(WafomFigure::new(PRECISION, H, FACTOR).unwrap())
}

/// Eight points in two dimensions: `(i/8, radical inverse of i)`.
pub fn eight_points() -> EncodedPointSet {
    let points: Vec<Vec<f64>> = (0u32..8)
        .map(|i| {
            let reversed = i.reverse_bits() >> 29;
            vec![f64::from(i) / 8.0, f64::from(reversed) / 8.0]
        })
        .collect();
    EncodedPointSet::from_reals(&points, PRECISION).unwrap()
}

/// Relative agreement with an absolute floor for values near zero.
pub fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-12 + 1e-9 * b.abs()
}
