use thiserror::Error;

/// Errors reported by the fallible graph operations.
///
/// Rewrite operations fail fast: when an error is returned after mutation has
/// begun, the graph is not rolled back and callers should treat it as
/// potentially inconsistent (e.g. reload from disk).
#[derive(Debug, Error)]
pub enum GraphError {
    /// A stale descriptor, out-of-range index or unmet precondition.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    /// Breadth-first search could not reach the target.
    #[error("no path between the requested endpoints")]
    NoPath,
    /// File open/read/write failure during import or export.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    /// An internal invariant was found broken mid-operation.
    #[error("internal inconsistency: {0}")]
    Inconsistency(&'static str),
}
