//! # Genomic Locus Helpers
//!
//! Interval arithmetic for the unifier's merge criterion.

use crate::model::BgcRecord;

/// Reciprocal overlap of two genomic intervals: the stricter (minimum) of the
/// two fractional overlaps, `min(intersection/len_a, intersection/len_b)`.
///
/// Returns 0.0 when either coordinate is missing (NaN), either interval has
/// non-positive length, or the intervals do not intersect.
pub fn reciprocal_overlap(a: &BgcRecord, b: &BgcRecord) -> f64 {
    if a.start.is_nan() || a.end.is_nan() || b.start.is_nan() || b.end.is_nan() {
        return 0.0;
    }
    let start = a.start.max(b.start);
    let end = a.end.min(b.end);
    if end <= start {
        return 0.0;
    }
    let length_a = a.length();
    let length_b = b.length();
    if length_a <= 0.0 || length_b <= 0.0 {
        return 0.0;
    }
    let intersection = end - start;
    (intersection / length_a).min(intersection / length_b)
}
