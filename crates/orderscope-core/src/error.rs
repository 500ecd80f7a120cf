use std::time::Duration;

use thiserror::Error;

/// Errors surfaced by the metrics engine and the reporting service.
///
/// Division-by-zero situations are deliberately *not* represented here:
/// every rate and average computation resolves an empty denominator to
/// `0` (see [`crate::rates`]), so an empty window produces a zero-valued
/// result, never an error.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// Rejected before any store call (`start > end`, unsupported
    /// granularity, out-of-range calendar input).
    #[error("validation error: {0}")]
    Validation(String),

    /// The order store failed. Fails the enclosing report as a whole;
    /// no partially-populated report is ever returned.
    #[error("store query failed: {0}")]
    Store(#[from] anyhow::Error),

    /// The report fan-out exceeded its deadline. Same fail-fast
    /// behavior as a store failure.
    #[error("report generation timed out after {0:?}")]
    Timeout(Duration),

    /// CSV assembly failed for an already-computed report. Kept
    /// distinct from query errors so callers can tell "couldn't
    /// compute" from "couldn't format".
    #[error("export failed: {0}")]
    Export(String),
}
