//! Workbook-level specification models.

use sheetgrid_layout::EnumRowHeight;

////////////////////////////////////////////////////////////////////////////////
// #region PrintSetupSpecification

/// Page margins in inches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpecPageMargins {
    /// Top margin.
    pub top: f64,
    /// Bottom margin.
    pub bottom: f64,
    /// Left margin.
    pub left: f64,
    /// Right margin.
    pub right: f64,
}

/// Print options forwarded to the worksheet as-is.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecPrintSetup {
    /// Page margins; writer defaults when `None`.
    pub margins: Option<SpecPageMargins>,
    /// Landscape orientation; portrait when `false`.
    pub if_landscape: bool,
    /// Paper size index (for example 9 = A4).
    pub paper_size: Option<u8>,
    /// Fit the printed area to one page wide.
    pub if_fit_to_page: bool,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region FrameSpecification

/// Options for turning a DataFrame into logical rows.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecFrameRowsOptions {
    /// Emit column names as a subtitle-styled header row.
    pub if_include_header: bool,
    /// Text written for null values.
    pub null_text: String,
    /// Header row height; session default when `None`.
    pub height_header: Option<EnumRowHeight>,
}

impl Default for SpecFrameRowsOptions {
    fn default() -> Self {
        Self {
            if_include_header: true,
            null_text: String::new(),
            height_header: None,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
