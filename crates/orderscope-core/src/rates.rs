//! Guarded rate arithmetic.
//!
//! Every rate, average, and growth computation in the engine goes
//! through these helpers so an empty denominator resolves to `0.0`
//! rather than `NaN` or `inf`.

/// `numerator / denominator`, or `0.0` when the denominator is zero.
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// `numerator / denominator` as a percentage, 0-guarded.
pub fn pct(numerator: f64, denominator: f64) -> f64 {
    ratio(numerator, denominator) * 100.0
}

/// Percent change from `previous` to `current`.
///
/// Returns `0.0` when `previous` is zero; callers that must tell
/// "no baseline" apart from "no change" carry their own flag (see the
/// comparative report's `baseline_zero`).
pub fn change_pct(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        0.0
    } else {
        (current - previous) / previous * 100.0
    }
}

/// Mean of `sum` over `count` items, 0-guarded.
pub fn mean(sum: f64, count: usize) -> f64 {
    ratio(sum, count as f64)
}
