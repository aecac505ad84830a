// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Precomputed segment products for the WAFOM family of figures of merit.
//!
//! The WAFOM of a point set `P` in base 2 is
//!
//! ```text
//! WAFOM(P) = 1/|P| * sum_{x in P} ( prod_{j=1}^{s} prod_{l=1}^{w} phi_l(x_{j,l}) - 1 )
//! phi_l(b) = 1 + eta(b) 2^{-f(l+h)}
//! ```
//!
//! where `eta(b) = (-1)^b`, `h = 0` gives Matsumoto's definition, `h = 1`
//! Yoshiki's, and `f = 2` the variant bounding the root mean square error.
//!
//! Evaluating the inner product bit by bit costs `O(w)` per coordinate. Following
//! Harase ("A search for extensible low-WAFOM point sets", MCMA 22.4, 2016) the
//! `w` bits are cut into `q` segments of `l` bits (see [`SegmentLayout`]) and the
//! partial product of every possible segment value is tabulated once, bringing
//! the cost down to `q` lookups per coordinate.
//!
//! # Memory
//!
//! The table holds `q * 2^l + 2^(w mod q)` doubles and is immutable after
//! construction, so evaluators share it through an `Arc` without locking.

pub mod encoding;

pub use encoding::{encode_coordinate, SegmentLayout, MAX_PRECISION};

use crate::error::{Error, Result};

/// Widest segment the table accepts (2^24 entries per segment).
pub const MAX_SEGMENT_LENGTH: usize = 24;

/// Weight `2^{-factor (position + h)}` of the bit at 1-based `position`.
pub(crate) fn bit_weight(position: usize, h: u32, factor: u32) -> f64 {
    let exponent = factor as i32 * (position as i32 + h as i32);
    2f64.powi(-exponent)
}

/// Check the `(h, factor)` pair shared by every WAFOM definition.
pub(crate) fn validate_definition(h: u32, factor: u32) -> Result<()> {
    if h > 1 {
        return Err(Error::invalid(format!(
            "h must be 0 (Matsumoto) or 1 (Yoshiki), got {h}"
        )));
    }
    if factor != 1 && factor != 2 {
        return Err(Error::invalid(format!(
            "factor must be 1 (WAFOM) or 2 (RMSE WAFOM), got {factor}"
        )));
    }
    Ok(())
}

/// Immutable table of per-segment WAFOM products.
///
/// # Example
///
/// ```
/// use wafom_search::table::SegmentLookupTable;
///
/// let table = SegmentLookupTable::new(15, 3, 5, 1, 2).unwrap();
/// assert_eq!(table.len(), 3 * 32);
///
/// // Segment 1 holding all zeros: every factor is (1 + 2^{-2(j+1)})
/// let expected: f64 = (1..=5).map(|j| 1.0 + 2f64.powi(-2 * (j + 1))).product();
/// assert!((table.get(1, 0).unwrap() - expected).abs() < 1e-15);
/// ```
#[derive(Debug, Clone)]
pub struct SegmentLookupTable {
    layout: SegmentLayout,
    h: u32,
    factor: u32,
    entries: Vec<f64>,
}

impl SegmentLookupTable {
    /// Build the table for `total_bits` bits cut into `segments` segments of
    /// `segment_length` bits.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` when `segments == 0`, `h` is not 0 or 1, `factor`
    /// is not 1 or 2, `total_bits < segments`, `total_bits > 64`,
    /// `segment_length != total_bits / segments`, or the segment is wider than
    /// [`MAX_SEGMENT_LENGTH`]. Nothing is allocated on failure.
    pub fn new(
        total_bits: usize,
        segments: usize,
        segment_length: usize,
        h: u32,
        factor: u32,
    ) -> Result<Self> {
        if segments == 0 {
            return Err(Error::invalid("q must be a positive number of segments"));
        }
        validate_definition(h, factor)?;
        if total_bits < segments {
            return Err(Error::invalid(format!(
                "number of bits ({total_bits}) must be at least the number of segments ({segments})"
            )));
        }
        if total_bits > MAX_PRECISION {
            return Err(Error::invalid(format!(
                "at most {MAX_PRECISION} bits per coordinate, got {total_bits}"
            )));
        }
        if segment_length != total_bits / segments {
            return Err(Error::invalid(format!(
                "segment length must be {} for {total_bits} bits in {segments} segments, \
                 got {segment_length}",
                total_bits / segments
            )));
        }
        if segment_length > MAX_SEGMENT_LENGTH {
            return Err(Error::invalid(format!(
                "segments of {segment_length} bits exceed the {MAX_SEGMENT_LENGTH}-bit table \
                 limit; use more segments"
            )));
        }

        let layout = SegmentLayout::new(total_bits, segments);
        let mut table = Self {
            layout,
            h,
            factor,
            entries: Vec::new(),
        };
        table.build();
        Ok(table)
    }

    /// Build the table deriving the segment length from `total_bits / segments`.
    pub fn for_precision(total_bits: usize, segments: usize, h: u32, factor: u32) -> Result<Self> {
        if segments == 0 {
            return Err(Error::invalid("q must be a positive number of segments"));
        }
        Self::new(total_bits, segments, total_bits / segments, h, factor)
    }

    /// Fill every entry. Called exactly once, from the constructor.
    fn build(&mut self) {
        let l = self.layout.segment_length();
        let q = self.layout.segments();
        let remainder = self.layout.remainder_bits();
        let full = 1usize << l;
        let tail = if remainder > 0 { 1usize << remainder } else { 0 };

        let mut entries = Vec::with_capacity(q * full + tail);
        for c in 1..=q {
            for e in 0..full as u64 {
                entries.push(self.segment_product(c, e, l));
            }
        }
        for e in 0..tail as u64 {
            entries.push(self.segment_product(q + 1, e, remainder));
        }
        self.entries = entries;
    }

    /// `prod_{j=1}^{length} (1 + (1 - 2 bit_j(e)) 2^{-factor((c-1) l + j + h)})`.
    fn segment_product(&self, c: usize, e: u64, length: usize) -> f64 {
        let offset = (c - 1) * self.layout.segment_length();
        (1..=length)
            .map(|j| {
                let bit = (e >> (length - j)) & 1;
                let sign = 1.0 - 2.0 * bit as f64;
                1.0 + sign * bit_weight(offset + j, self.h, self.factor)
            })
            .product()
    }

    fn index(&self, c: usize, e: u64) -> usize {
        let full = 1usize << self.layout.segment_length();
        if c <= self.layout.segments() {
            (c - 1) * full + e as usize
        } else {
            self.layout.segments() * full + e as usize
        }
    }

    /// Product for segment `c` (1-based) holding value `e`.
    ///
    /// # Errors
    ///
    /// `OutOfRange` when `c` is not in `1..=num_segments()` or `e` does not fit
    /// in the segment.
    pub fn get(&self, c: usize, e: u64) -> Result<f64> {
        let num_segments = self.layout.num_segments();
        if c == 0 || c > num_segments {
            return Err(Error::out_of_range(
                "segment index",
                c as u64,
                num_segments as u64,
            ));
        }
        let width = if c <= self.layout.segments() {
            self.layout.segment_length()
        } else {
            self.layout.remainder_bits()
        };
        let limit = 1u64 << width;
        if e >= limit {
            return Err(Error::out_of_range("segment value", e, limit - 1));
        }
        Ok(self.entries[self.index(c, e)])
    }

    /// Product of the table entries of every segment of the encoded coordinate `x`.
    pub fn coordinate_product(&self, x: u64) -> Result<f64> {
        let mut product = 1.0;
        for c in 1..=self.layout.num_segments() {
            product *= self.get(c, self.layout.segment_value(x, c))?;
        }
        Ok(product)
    }

    pub fn layout(&self) -> &SegmentLayout {
        &self.layout
    }

    pub fn total_bits(&self) -> usize {
        self.layout.total_bits()
    }

    pub fn segments(&self) -> usize {
        self.layout.segments()
    }

    pub fn segment_length(&self) -> usize {
        self.layout.segment_length()
    }

    pub fn remainder_bits(&self) -> usize {
        self.layout.remainder_bits()
    }

    pub fn num_segments(&self) -> usize {
        self.layout.num_segments()
    }

    pub fn h(&self) -> u32 {
        self.h
    }

    pub fn factor(&self) -> u32 {
        self.factor
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
