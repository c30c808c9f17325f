//! Shared layout specification models.

use std::collections::BTreeMap;
use std::fmt;

use crate::conf::{
    N_LEN_LIST_VALIDATION_MAX, N_NCOLS_LEGACY_MAX, N_NCOLS_MODERN_MAX, N_NROWS_LEGACY_MAX,
    N_NROWS_MODERN_MAX,
};
use crate::error::{EnumLayoutError, Result};

////////////////////////////////////////////////////////////////////////////////
// #region CellFormatSpecification

/// Backend-neutral cell format.
///
/// Every field is optional so formats can be layered with [`Self::merge`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SpecCellFormat {
    /// Font family name.
    pub font_name: Option<String>,
    /// Font size in points.
    pub font_size: Option<i64>,
    /// Bold style.
    pub bold: Option<bool>,
    /// Italic style.
    pub italic: Option<bool>,

    /// Horizontal alignment.
    pub align: Option<String>,
    /// Vertical alignment.
    pub valign: Option<String>,
    /// Border style for all sides.
    pub border: Option<i64>,
    /// Text wrap.
    pub text_wrap: Option<bool>,

    /// Top border override.
    pub top: Option<i64>,
    /// Bottom border override.
    pub bottom: Option<i64>,
    /// Left border override.
    pub left: Option<i64>,
    /// Right border override.
    pub right: Option<i64>,

    /// Number format code.
    pub num_format: Option<String>,
    /// Background fill color.
    pub bg_color: Option<String>,
    /// Font color.
    pub font_color: Option<String>,
}

impl SpecCellFormat {
    /// Return a new format by overlaying `patch` onto `self`.
    pub fn with_(&self, patch: SpecCellFormat) -> SpecCellFormat {
        self.merge(&patch)
    }

    /// Overlay `other` onto `self`; fields set in `other` win.
    pub fn merge(&self, other: &SpecCellFormat) -> SpecCellFormat {
        macro_rules! overlay {
            ($($field:ident),* $(,)?) => {
                SpecCellFormat {
                    $($field: other.$field.clone().or_else(|| self.$field.clone()),)*
                }
            };
        }
        overlay!(
            font_name, font_size, bold, italic, align, valign, border, text_wrap, top, bottom,
            left, right, num_format, bg_color, font_color,
        )
    }

    /// Set the same thin/none border on the selected sides.
    pub fn with_border_sides(&self, top: bool, bottom: bool, left: bool, right: bool) -> Self {
        let mut fmt = self.clone();
        if top {
            fmt.top = Some(1);
        }
        if bottom {
            fmt.bottom = Some(1);
        }
        if left {
            fmt.left = Some(1);
        }
        if right {
            fmt.right = Some(1);
        }
        fmt
    }
}

/// Built-in style presets constructed once per session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecStylePresets {
    /// Main title style.
    pub main_title: SpecCellFormat,
    /// Subtitle (column header) style.
    pub subtitle: SpecCellFormat,
    /// Body content style; the session-level fallback.
    pub content: SpecCellFormat,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CellValueSpecification

/// List-constrained cell: the written value is `default`, the validation
/// lists `options`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecDropdown {
    default: String,
    options: Vec<String>,
}

impl SpecDropdown {
    /// Build a dropdown with an explicit default value.
    pub fn new(default: impl Into<String>, options: Vec<String>) -> Result<Self> {
        if options.is_empty() {
            return Err(EnumLayoutError::MalformedDropdown(
                "options must not be empty.".to_string(),
            ));
        }
        let n_len_options: usize = options.iter().map(|opt| opt.chars().count()).sum();
        let n_len_joined = n_len_options + options.len() - 1;
        if n_len_joined > N_LEN_LIST_VALIDATION_MAX {
            return Err(EnumLayoutError::MalformedDropdown(format!(
                "joined options length {n_len_joined} exceeds {N_LEN_LIST_VALIDATION_MAX}."
            )));
        }
        Ok(Self {
            default: default.into(),
            options,
        })
    }

    /// Build a dropdown whose default is the empty string.
    pub fn with_options(options: Vec<String>) -> Result<Self> {
        Self::new("", options)
    }

    /// Value written into the anchor cell.
    pub fn default_value(&self) -> &str {
        &self.default
    }

    /// Options listed by the validation.
    pub fn options(&self) -> &[String] {
        &self.options
    }
}

/// Closed set of cell value kinds, fixed at descriptor construction.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumCellValue {
    /// Text value.
    Text(String),
    /// 32-bit integer value.
    Integer(i32),
    /// 64-bit integer value.
    Long(i64),
    /// Floating point value.
    Decimal(f64),
    /// List-constrained value.
    Dropdown(SpecDropdown),
    /// Anything else, stringified when constructed.
    Other(String),
}

impl EnumCellValue {
    /// Stringify an arbitrary displayable value.
    pub fn other(value: impl fmt::Display) -> Self {
        Self::Other(value.to_string())
    }

    /// Short variant name for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Integer(_) => "integer",
            Self::Long(_) => "long",
            Self::Decimal(_) => "decimal",
            Self::Dropdown(_) => "dropdown",
            Self::Other(_) => "other",
        }
    }
}

impl From<&str> for EnumCellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for EnumCellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i32> for EnumCellValue {
    fn from(value: i32) -> Self {
        Self::Integer(value)
    }
}

impl From<i64> for EnumCellValue {
    fn from(value: i64) -> Self {
        Self::Long(value)
    }
}

impl From<f64> for EnumCellValue {
    fn from(value: f64) -> Self {
        Self::Decimal(value)
    }
}

impl From<SpecDropdown> for EnumCellValue {
    fn from(value: SpecDropdown) -> Self {
        Self::Dropdown(value)
    }
}

/// One logical cell: value, span increments and optional explicit style.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecCellDescriptor {
    /// Cell value.
    pub value: EnumCellValue,
    /// Column span minus one.
    pub col_span_increment: usize,
    /// Row span minus one.
    pub row_span_increment: usize,
    /// Explicit style; filled with the row default at row-build time.
    pub style: Option<SpecCellFormat>,
}

impl SpecCellDescriptor {
    /// Unmerged 1x1 cell without explicit style.
    pub fn new(value: impl Into<EnumCellValue>) -> Self {
        Self {
            value: value.into(),
            col_span_increment: 0,
            row_span_increment: 0,
            style: None,
        }
    }

    /// Cell spanning `col_span` columns and `row_span` rows.
    ///
    /// Both spans must be >= 1 and no larger than a zip-based worksheet.
    pub fn spanned(
        value: impl Into<EnumCellValue>,
        col_span: usize,
        row_span: usize,
    ) -> Result<Self> {
        if !(1..=N_NCOLS_MODERN_MAX).contains(&col_span) {
            return Err(EnumLayoutError::InvalidSpan { span: col_span });
        }
        if !(1..=N_NROWS_MODERN_MAX).contains(&row_span) {
            return Err(EnumLayoutError::InvalidSpan { span: row_span });
        }
        Ok(Self {
            value: value.into(),
            col_span_increment: col_span - 1,
            row_span_increment: row_span - 1,
            style: None,
        })
    }

    /// Attach an explicit style, which wins over any row default.
    pub fn with_style(mut self, style: SpecCellFormat) -> Self {
        self.style = Some(style);
        self
    }

    /// True when the descriptor covers more than one cell.
    pub fn is_merged(&self) -> bool {
        self.col_span_increment != 0 || self.row_span_increment != 0
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region RowAndGeometrySpecification

/// Output row height.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum EnumRowHeight {
    /// Leave the row to the writer's auto-height behavior.
    #[default]
    Auto,
    /// Fixed height in points.
    Points(f64),
}

impl From<f64> for EnumRowHeight {
    /// Negative heights are the auto-fit sentinel.
    fn from(value: f64) -> Self {
        if value < 0.0 {
            Self::Auto
        } else {
            Self::Points(value)
        }
    }
}

/// Ordered cells plus the height of the row they start on.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecLogicalRow {
    /// Cells in placement order.
    pub cells: Vec<SpecCellDescriptor>,
    /// Height applied to the output row where this row starts.
    pub height: EnumRowHeight,
}

impl SpecLogicalRow {
    /// Sum of column spans in this row, saturating at `usize::MAX`.
    pub fn width(&self) -> usize {
        self.cells
            .iter()
            .map(|cell| cell.col_span_increment.saturating_add(1))
            .fold(0, usize::saturating_add)
    }
}

/// Grid dimensions fixed before placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpecSheetGeometry {
    /// Number of columns.
    pub width: usize,
    /// Number of rows.
    pub height: usize,
}

/// Offset of the whole table inside the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpecGridOrigin {
    /// Row offset.
    pub row: usize,
    /// Column offset.
    pub col: usize,
}

/// Inclusive merge rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpecMergeRect {
    /// First row (inclusive).
    pub row_first: usize,
    /// Last row (inclusive).
    pub row_last: usize,
    /// First column (inclusive).
    pub col_first: usize,
    /// Last column (inclusive).
    pub col_last: usize,
}

impl SpecMergeRect {
    /// Rectangle anchored at `(row, col)` extended by span increments.
    ///
    /// Edges saturate, so an absurd span lands outside any grid.
    pub fn from_anchor(
        row: usize,
        col: usize,
        row_span_increment: usize,
        col_span_increment: usize,
    ) -> Self {
        Self {
            row_first: row,
            row_last: row.saturating_add(row_span_increment),
            col_first: col,
            col_last: col.saturating_add(col_span_increment),
        }
    }

    /// Shift by the table origin.
    pub fn offset(&self, origin: SpecGridOrigin) -> Self {
        Self {
            row_first: self.row_first + origin.row,
            row_last: self.row_last + origin.row,
            col_first: self.col_first + origin.col,
            col_last: self.col_last + origin.col,
        }
    }

    /// True when the rectangles share at least one cell.
    pub fn overlaps(&self, other: &SpecMergeRect) -> bool {
        self.row_first <= other.row_last
            && other.row_first <= self.row_last
            && self.col_first <= other.col_last
            && other.col_first <= self.col_last
    }

    /// True when more than one cell is covered.
    pub fn is_merge(&self) -> bool {
        self.row_first != self.row_last || self.col_first != self.col_last
    }

    /// Iterate covered `(row, col)` pairs in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (self.row_first..=self.row_last)
            .flat_map(move |row| (self.col_first..=self.col_last).map(move |col| (row, col)))
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region WriteOptions

/// Spreadsheet container kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumFileFormat {
    /// Legacy binary workbook.
    Legacy,
    /// Zip-based workbook.
    #[default]
    Modern,
}

impl EnumFileFormat {
    /// File extension including the dot.
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Legacy => ".xls",
            Self::Modern => ".xlsx",
        }
    }

    /// MIME type handed to transport layers.
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Legacy => "application/vnd.ms-excel",
            Self::Modern => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        }
    }

    /// Worksheet row limit.
    pub fn n_rows_max(&self) -> usize {
        match self {
            Self::Legacy => N_NROWS_LEGACY_MAX,
            Self::Modern => N_NROWS_MODERN_MAX,
        }
    }

    /// Worksheet column limit.
    pub fn n_cols_max(&self) -> usize {
        match self {
            Self::Legacy => N_NCOLS_LEGACY_MAX,
            Self::Modern => N_NCOLS_MODERN_MAX,
        }
    }
}

/// Grid height rule used by the table sizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumTableSizeRule {
    /// `rows + sum(row span increments)`; never undersizes.
    #[default]
    SafeUpperBound,
    /// `rows + ceil(sum(col_inc * row_inc) / width)`; may undersize.
    Heuristic,
}

/// Session-level layout options.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecLayoutOptions {
    /// Target container; decides sheet limits.
    pub file_format: EnumFileFormat,
    /// Offset applied to every emitted coordinate.
    pub origin: SpecGridOrigin,
    /// Width (characters) for columns without override.
    pub column_width_default: f64,
    /// Per-column width overrides (grid-relative column index).
    pub column_widths: BTreeMap<usize, f64>,
    /// Height given to rows built without an explicit height.
    pub row_height_default: EnumRowHeight,
    /// Grid height rule.
    pub rule_table_size: EnumTableSizeRule,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReportSpecification

/// One resolved descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecPlacement {
    /// Logical row index.
    pub index_row: usize,
    /// Cell index within the logical row.
    pub index_cell: usize,
    /// Grid-relative rectangle; anchor is `(row_first, col_first)`.
    pub rect: SpecMergeRect,
}

/// Per-session placement report.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecLayoutReport {
    /// Grid size used for placement.
    pub geometry: SpecSheetGeometry,
    /// Origin the rectangles are emitted at.
    pub origin: SpecGridOrigin,
    /// Placements in input order.
    pub placements: Vec<SpecPlacement>,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
}

impl SpecLayoutReport {
    /// Add a warning message.
    pub fn warn(&mut self, msg: impl AsRef<str>) {
        self.warnings.push(msg.as_ref().to_string());
    }

    /// Number of placements that produced a merged region.
    pub fn merge_count(&self) -> usize {
        self.placements
            .iter()
            .filter(|placement| placement.rect.is_merge())
            .count()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_overlays_right_side_values() {
        let base = SpecCellFormat {
            font_name: Some("A".to_string()),
            font_size: Some(11),
            ..Default::default()
        };
        let merged = base.with_(SpecCellFormat {
            font_size: Some(14),
            bold: Some(true),
            ..Default::default()
        });
        assert_eq!(merged.font_name.as_deref(), Some("A"));
        assert_eq!(merged.font_size, Some(14));
        assert_eq!(merged.bold, Some(true));
        assert_eq!(merged.italic, None);
        assert_eq!(SpecCellFormat::default().merge(&merged), merged);
        assert_eq!(merged.merge(&SpecCellFormat::default()), merged);
    }

    #[test]
    fn test_spanned_rejects_zero_and_oversized_spans() {
        assert_eq!(
            SpecCellDescriptor::spanned("x", 0, 1),
            Err(EnumLayoutError::InvalidSpan { span: 0 })
        );
        assert_eq!(
            SpecCellDescriptor::spanned("x", 1, 0),
            Err(EnumLayoutError::InvalidSpan { span: 0 })
        );

        assert_eq!(
            SpecCellDescriptor::spanned("x", N_NCOLS_MODERN_MAX + 1, 1),
            Err(EnumLayoutError::InvalidSpan {
                span: N_NCOLS_MODERN_MAX + 1
            })
        );
        assert_eq!(
            SpecCellDescriptor::spanned("x", 1, usize::MAX),
            Err(EnumLayoutError::InvalidSpan { span: usize::MAX })
        );
        let cell_max = SpecCellDescriptor::spanned("x", N_NCOLS_MODERN_MAX, N_NROWS_MODERN_MAX);
        assert!(cell_max.is_ok());

        let cell = SpecCellDescriptor::spanned("x", 3, 2).unwrap();
        assert_eq!(cell.col_span_increment, 2);
        assert_eq!(cell.row_span_increment, 1);
        assert!(cell.is_merged());
        assert!(!SpecCellDescriptor::new(1).is_merged());
    }

    #[test]
    fn test_dropdown_requires_options_within_limit() {
        assert!(matches!(
            SpecDropdown::with_options(vec![]),
            Err(EnumLayoutError::MalformedDropdown(_))
        ));
        assert!(matches!(
            SpecDropdown::with_options(vec!["x".repeat(256)]),
            Err(EnumLayoutError::MalformedDropdown(_))
        ));

        let dropdown = SpecDropdown::with_options(vec!["A".to_string(), "B".to_string()])
            .unwrap();
        assert_eq!(dropdown.default_value(), "");
        assert_eq!(dropdown.options(), ["A", "B"]);
    }

    #[test]
    fn test_row_height_negative_is_auto() {
        assert_eq!(EnumRowHeight::from(-1.0), EnumRowHeight::Auto);
        assert_eq!(EnumRowHeight::from(35.0), EnumRowHeight::Points(35.0));
    }

    #[test]
    fn test_merge_rect_overlap_and_cells() {
        let rect_a = SpecMergeRect::from_anchor(0, 0, 1, 1);
        let rect_b = SpecMergeRect::from_anchor(1, 1, 0, 0);
        let rect_c = SpecMergeRect::from_anchor(2, 0, 0, 3);
        assert!(rect_a.overlaps(&rect_b));
        assert!(!rect_a.overlaps(&rect_c));
        assert_eq!(
            rect_a.cells().collect::<Vec<_>>(),
            vec![(0, 0), (0, 1), (1, 0), (1, 1)]
        );

        let rect_huge = SpecMergeRect::from_anchor(3, 2, usize::MAX, usize::MAX);
        assert_eq!(rect_huge.row_last, usize::MAX);
        assert_eq!(rect_huge.col_last, usize::MAX);

        let shifted = rect_b.offset(SpecGridOrigin { row: 2, col: 3 });
        assert_eq!((shifted.row_first, shifted.col_first), (3, 4));
        assert!(!shifted.is_merge());
    }
}
