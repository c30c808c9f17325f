//! `sheetgrid_layout` v1:
//! Spreadsheet cell-grid layout kernel.
//!
//! Converts ordered rows of styled, optionally merged cells into a
//! non-overlapping grid of merge rectangles and drives a [`SheetEmitter`].
//!
//! Modules:
//! - `conf`    : constants and default presets
//! - `spec`    : specs/models/options
//! - `error`   : error type
//! - `util`    : pure helper functions (table sizer, chunking)
//! - `grid`    : occupancy tracker
//! - `emit`    : emitter seam and in-memory emitter
//! - `session` : row builder, style resolver and placement engine
pub mod conf;
pub mod emit;
pub mod error;
pub mod grid;
pub mod session;
pub mod spec;
pub mod util;

pub use conf::{
    N_COLUMN_WIDTH_DEFAULT, N_LEN_LIST_VALIDATION_MAX, N_NCOLS_LEGACY_MAX, N_NCOLS_MODERN_MAX,
    N_NROWS_LEGACY_MAX, N_NROWS_MODERN_MAX, N_ROW_HEIGHT_DEFAULT, derive_default_layout_options,
    derive_default_style_presets,
};
pub use emit::{MemorySheet, SheetEmitter, SpecMemoryCell};
pub use error::{EnumLayoutError, Result};
pub use grid::OccupancyGrid;
pub use session::{LayoutSession, resolve_default_style};
pub use spec::{
    EnumCellValue, EnumFileFormat, EnumRowHeight, EnumTableSizeRule, SpecCellDescriptor,
    SpecCellFormat, SpecDropdown, SpecGridOrigin, SpecLayoutOptions, SpecLayoutReport,
    SpecLogicalRow, SpecMergeRect, SpecPlacement, SpecSheetGeometry, SpecStylePresets,
};
pub use util::{calculate_table_size, validate_sheet_limits};
