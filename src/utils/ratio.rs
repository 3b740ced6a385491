//! Guarded division.
//!
//! Every derived metric (PDR, throughput, average latency, min-max
//! normalization) divides by a quantity that can legitimately be zero for
//! degenerate inputs. They all go through [`safe_ratio`] so that the
//! zero-denominator policy lives in one place.

/// Divide `numerator` by `denominator`, returning `fallback` when the
/// denominator is zero or not a finite number.
///
/// # Examples
/// ```
/// use netsim_metrics::utils::ratio::safe_ratio;
///
/// assert_eq!(safe_ratio(1.0, 2.0, 0.0), 0.5);
/// assert_eq!(safe_ratio(1.0, 0.0, 0.0), 0.0);
/// assert_eq!(safe_ratio(5.0, f64::NAN, 1.0), 1.0);
/// ```
pub fn safe_ratio(numerator: f64, denominator: f64, fallback: f64) -> f64 {
    if denominator == 0.0 || !denominator.is_finite() {
        return fallback;
    }
    numerator / denominator
}

/// Percentage form of [`safe_ratio`]: `part / whole * 100`, or `0` when
/// `whole` is zero.
pub fn safe_percentage(part: f64, whole: f64) -> f64 {
    safe_ratio(part, whole, 0.0) * 100.0
}
