//! `sheetgrid_xlsx` v1:
//! XLSX backend for the `sheetgrid_layout` kernel.
//!
//! Modules:
//! - `conf`    : sheet-name constants
//! - `spec`    : print setup and DataFrame ingestion options
//! - `util`    : sheet-name normalization, format conversion, casting
//! - `emitter` : `SheetEmitter` over a `rust_xlsxwriter` worksheet
//! - `writer`  : workbook writer and per-sheet sessions
//! - `frame`   : Polars DataFrame ingestion
pub mod conf;
pub mod emitter;
pub mod frame;
pub mod spec;
pub mod util;
pub mod writer;

pub use conf::{C_SHEET_NAME_DEFAULT, N_LEN_EXCEL_SHEET_NAME_MAX, TUP_EXCEL_ILLEGAL};
pub use emitter::XlsxSheetEmitter;
pub use frame::{append_dataframe, derive_dataframe_from_ipc_bytes};
pub use spec::{SpecFrameRowsOptions, SpecPageMargins, SpecPrintSetup};
pub use util::{derive_rust_xlsx_format, derive_unique_sheet_name, sanitize_sheet_name};
pub use writer::{EnumOutputSink, XlsxLayoutWriter, XlsxSheetSession};
