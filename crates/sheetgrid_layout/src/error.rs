//! Layout error type shared by the kernel and emitter backends.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, EnumLayoutError>;

/// Failures raised while building, placing or emitting a layout session.
///
/// Any error returned from placement leaves the session consumed; callers
/// start a new session instead of retrying.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnumLayoutError {
    /// The occupancy grid was too small for the actual placement demand.
    #[error("Layout overflow: cell at (row={row}, col={col}) does not fit grid {width}x{height}.")]
    LayoutOverflow {
        /// Grid-relative row that could not be placed.
        row: usize,
        /// Grid-relative column that could not be placed.
        col: usize,
        /// Grid width.
        width: usize,
        /// Grid height.
        height: usize,
    },
    /// A merge rectangle would cover a cell already taken by an earlier merge.
    #[error("Merge conflict: cell (row={row}, col={col}) is already occupied.")]
    MergeConflict {
        /// Grid-relative row of the conflicting cell.
        row: usize,
        /// Grid-relative column of the conflicting cell.
        col: usize,
    },
    /// Span counts must be >= 1 and within the zip-based sheet limits.
    #[error("Invalid span: {span} (span must be >= 1 and fit a worksheet).")]
    InvalidSpan {
        /// Offending span count.
        span: usize,
    },
    /// Dropdown value lacks options or violates the list-validation limits.
    #[error("Malformed dropdown: {0}")]
    MalformedDropdown(String),
    /// A value reached a backend that cannot write it.
    #[error("Unsupported value type: {0}")]
    UnsupportedValueType(String),
    /// The requested container format is not available in this backend.
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),
    /// Table (plus origin) exceeds the row/column limit of the container.
    #[error(
        "Sheet limit exceeded: need {rows} rows x {cols} cols, limit is {rows_max} x {cols_max}."
    )]
    SheetLimitExceeded {
        /// Required rows including origin offset.
        rows: usize,
        /// Required columns including origin offset.
        cols: usize,
        /// Container row limit.
        rows_max: usize,
        /// Container column limit.
        cols_max: usize,
    },
    /// The writer was closed, or aborted by an earlier error.
    #[error("Session closed: {0}")]
    SessionClosed(String),
    /// Sink or writer failure during emission or close.
    #[error("I/O failure: {0}")]
    IoFailure(String),
}

impl From<std::io::Error> for EnumLayoutError {
    fn from(err: std::io::Error) -> Self {
        Self::IoFailure(err.to_string())
    }
}
