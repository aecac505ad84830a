// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Fixed-point encoding of coordinates and their split into bit segments.
//!
//! A coordinate is a `w`-bit unsigned integer whose most significant bit is
//! the first binary digit after the point. It is cut into `q` segments of
//! `l = w / q` bits, most significant first, followed by a remainder segment
//! holding the `w mod q` least significant bits when `q` does not divide `w`:
//!
//! ```text
//! w = 8, q = 3  ->  l = 2, remainder = 2
//!
//!   bit:  7 6 | 5 4 | 3 2 | 1 0
//!         c=1   c=2   c=3   c=4 (remainder)
//! ```

use crate::error::{Error, Result};

/// Largest number of bits a coordinate may carry.
pub const MAX_PRECISION: usize = 64;

/// Mask with the `bits` least significant bits set.
pub(crate) fn low_mask(bits: usize) -> u64 {
    if bits >= 64 {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}

/// Encode a real coordinate in [0, 1) as a `precision`-bit integer by truncation.
///
/// # Example
///
/// ```
/// use wafom_search::table::encode_coordinate;
///
/// assert_eq!(encode_coordinate(0.5, 4).unwrap(), 0b1000);
/// assert_eq!(encode_coordinate(0.8125, 4).unwrap(), 0b1101);
/// assert!(encode_coordinate(1.0, 4).is_err());
/// ```
pub fn encode_coordinate(x: f64, precision: usize) -> Result<u64> {
    if !(0.0..1.0).contains(&x) {
        return Err(Error::CoordinateOutsideUnitInterval { value: x });
    }
    if precision == 0 || precision > MAX_PRECISION {
        return Err(Error::invalid(format!(
            "precision must be between 1 and {MAX_PRECISION} bits, got {precision}"
        )));
    }
    let scaled = (x * 2f64.powi(precision as i32)).floor() as u64;
    // x just below 1 can round up to 2^w in floating point
    Ok(scaled.min(low_mask(precision)))
}

/// How a `w`-bit coordinate is cut into segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentLayout {
    total_bits: usize,
    segments: usize,
    segment_length: usize,
    remainder_bits: usize,
}

impl SegmentLayout {
    /// Layout of `total_bits` bits in `segments` full segments (plus remainder).
    ///
    /// Callers validate `segments > 0` and `segments <= total_bits` first.
    pub(crate) fn new(total_bits: usize, segments: usize) -> Self {
        Self {
            total_bits,
            segments,
            segment_length: total_bits / segments,
            remainder_bits: total_bits % segments,
        }
    }

    pub fn total_bits(&self) -> usize {
        self.total_bits
    }

    /// Number of full segments `q`.
    pub fn segments(&self) -> usize {
        self.segments
    }

    /// Length `l` of every full segment.
    pub fn segment_length(&self) -> usize {
        self.segment_length
    }

    /// Length of the trailing segment, zero when `q` divides `w`.
    pub fn remainder_bits(&self) -> usize {
        self.remainder_bits
    }

    /// `q`, or `q + 1` when there is a remainder segment.
    pub fn num_segments(&self) -> usize {
        self.segments + usize::from(self.remainder_bits > 0)
    }

    /// Value of segment `c` (1-based) of the encoded coordinate `x`.
    pub fn segment_value(&self, x: u64, c: usize) -> u64 {
        debug_assert!(c >= 1 && c <= self.num_segments());
        if c <= self.segments {
            let shift = self.total_bits - c * self.segment_length;
            (x >> shift) & low_mask(self.segment_length)
        } else {
            x & low_mask(self.remainder_bits)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_truncates() {
        assert_eq!(encode_coordinate(0.0, 15).unwrap(), 0);
        assert_eq!(encode_coordinate(0.25, 3).unwrap(), 0b010);
        // 0.3 = 0.0100110011... in binary
        assert_eq!(encode_coordinate(0.3, 4).unwrap(), 0b0100);
    }

    #[test]
    fn test_encode_rejects_outside_unit_interval() {
        assert!(matches!(
            encode_coordinate(-0.1, 8),
            Err(Error::CoordinateOutsideUnitInterval { .. })
        ));
        assert!(matches!(
            encode_coordinate(f64::NAN, 8),
            Err(Error::CoordinateOutsideUnitInterval { .. })
        ));
        assert!(encode_coordinate(0.5, 0).is_err());
        assert!(encode_coordinate(0.5, 65).is_err());
    }

    #[test]
    fn test_encode_full_precision_stays_in_range() {
        let x = 1.0 - f64::EPSILON / 2.0;
        assert_eq!(encode_coordinate(x, 64).unwrap() >> 63, 1);
    }

    #[test]
    fn test_layout_even_split() {
        let layout = SegmentLayout::new(15, 3);
        assert_eq!(layout.segment_length(), 5);
        assert_eq!(layout.remainder_bits(), 0);
        assert_eq!(layout.num_segments(), 3);

        let x = 0b10101_00111_11000;
        assert_eq!(layout.segment_value(x, 1), 0b10101);
        assert_eq!(layout.segment_value(x, 2), 0b00111);
        assert_eq!(layout.segment_value(x, 3), 0b11000);
    }

    #[test]
    fn test_layout_with_remainder() {
        let layout = SegmentLayout::new(8, 3);
        assert_eq!(layout.segment_length(), 2);
        assert_eq!(layout.remainder_bits(), 2);
        assert_eq!(layout.num_segments(), 4);

        let x = 0b11_01_10_01;
        assert_eq!(layout.segment_value(x, 1), 0b11);
        assert_eq!(layout.segment_value(x, 2), 0b01);
        assert_eq!(layout.segment_value(x, 3), 0b10);
        assert_eq!(layout.segment_value(x, 4), 0b01);
    }
}
