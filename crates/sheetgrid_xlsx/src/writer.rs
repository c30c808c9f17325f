//! Workbook writer that places layout sessions into worksheets.

use std::collections::BTreeSet;
use std::fmt;
use std::io::Write;
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use rust_xlsxwriter::{Workbook, Worksheet};
use sheetgrid_layout::{
    EnumFileFormat, EnumLayoutError, LayoutSession, Result, SpecLayoutOptions, SpecLayoutReport,
    SpecStylePresets,
};
use tracing::{debug, warn};

use crate::emitter::XlsxSheetEmitter;
use crate::spec::SpecPrintSetup;
use crate::util::{derive_unique_sheet_name, derive_xlsx_error, sanitize_sheet_name};

static N_WRITER_ID_NEXT: AtomicUsize = AtomicUsize::new(0);

/// Where the finished workbook goes.
pub enum EnumOutputSink {
    /// File path, created when the workbook is generated.
    Path(PathBuf),
    /// Arbitrary byte sink.
    Writer(Box<dyn Write + Send>),
}

impl fmt::Debug for EnumOutputSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Self::Writer(_) => f.write_str("Writer(..)"),
        }
    }
}

impl From<PathBuf> for EnumOutputSink {
    fn from(value: PathBuf) -> Self {
        Self::Path(value)
    }
}

/// A layout session bound to one worksheet of an [`XlsxLayoutWriter`].
///
/// Dereferences to [`LayoutSession`], so rows are built directly on it.
/// Only the writer that created it accepts it, and only once.
#[derive(Debug)]
pub struct XlsxSheetSession {
    n_writer_id: usize,
    sheet_index: usize,
    sheet_name: String,
    session: LayoutSession,
    /// Page setup applied when the session is written.
    pub print_setup: SpecPrintSetup,
}

impl XlsxSheetSession {
    /// Final (sanitized, de-duplicated) worksheet name.
    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }
}

impl Deref for XlsxSheetSession {
    type Target = LayoutSession;

    fn deref(&self) -> &Self::Target {
        &self.session
    }
}

impl DerefMut for XlsxSheetSession {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.session
    }
}

/// Stateful workbook writer.
///
/// The workbook is buffered in memory until [`Self::generate`] or
/// [`Self::close`]. Any failed write poisons the writer.
pub struct XlsxLayoutWriter {
    n_writer_id: usize,
    sink: Option<EnumOutputSink>,
    workbook: Workbook,
    presets: SpecStylePresets,
    options: SpecLayoutOptions,
    set_sheet_names_existing: BTreeSet<String>,
    l_reports: Vec<SpecLayoutReport>,
    l_warnings: Vec<String>,
    n_sheets: usize,
    if_generated: bool,
    if_failed: bool,
    if_closed: bool,
}

impl XlsxLayoutWriter {
    /// Create a writer bound to `sink`.
    ///
    /// Only [`EnumFileFormat::Modern`] can be produced by this backend.
    pub fn new(
        sink: impl Into<EnumOutputSink>,
        presets: SpecStylePresets,
        options: SpecLayoutOptions,
    ) -> Result<Self> {
        if options.file_format != EnumFileFormat::Modern {
            return Err(EnumLayoutError::UnsupportedFormat(format!(
                "{} output is not supported by the xlsx backend",
                options.file_format.suffix()
            )));
        }
        Ok(Self {
            n_writer_id: N_WRITER_ID_NEXT.fetch_add(1, Ordering::Relaxed),
            sink: Some(sink.into()),
            workbook: Workbook::new(),
            presets,
            options,
            set_sheet_names_existing: BTreeSet::new(),
            l_reports: Vec::new(),
            l_warnings: Vec::new(),
            n_sheets: 0,
            if_generated: false,
            if_failed: false,
            if_closed: false,
        })
    }

    /// Return immutable snapshot of per-sheet layout reports.
    pub fn report(&self) -> Vec<SpecLayoutReport> {
        self.l_reports.clone()
    }

    /// Writer-level warnings (for example a failed flush on close).
    pub fn warnings(&self) -> &[String] {
        &self.l_warnings
    }

    /// Open a worksheet and return an empty session bound to it.
    pub fn create_sheet(&mut self, sheet_name: &str) -> Result<XlsxSheetSession> {
        self.validate_open()?;

        let sheet_name_unique = derive_unique_sheet_name(
            &mut self.set_sheet_names_existing,
            &sanitize_sheet_name(sheet_name, "_"),
        );
        let worksheet = self.workbook.add_worksheet();
        worksheet
            .set_name(&sheet_name_unique)
            .map_err(derive_xlsx_error)?;
        let sheet_index = self.n_sheets;
        self.n_sheets += 1;
        debug!(sheet = %sheet_name_unique, index = sheet_index, "sheet created");

        Ok(XlsxSheetSession {
            n_writer_id: self.n_writer_id,
            sheet_index,
            sheet_name: sheet_name_unique,
            session: LayoutSession::new(self.presets.clone(), self.options.clone()),
            print_setup: SpecPrintSetup::default(),
        })
    }

    /// Place `sheet` into its worksheet.
    ///
    /// A session from another writer is rejected without side effects. On
    /// any other error the worksheet may hold partial output and the writer
    /// refuses further calls.
    pub fn write_session(&mut self, sheet: XlsxSheetSession) -> Result<SpecLayoutReport> {
        self.validate_open()?;
        if sheet.n_writer_id != self.n_writer_id {
            return Err(EnumLayoutError::SessionClosed(format!(
                "Sheet '{}' was created by another writer.",
                sheet.sheet_name
            )));
        }

        let result = self.write_session_inner(sheet);
        let report = self.track_failure(result)?;
        for msg in &report.warnings {
            warn!(warning = %msg, "layout warning");
        }
        self.l_reports.push(report.clone());
        Ok(report)
    }

    fn write_session_inner(&mut self, sheet: XlsxSheetSession) -> Result<SpecLayoutReport> {
        let XlsxSheetSession {
            n_writer_id: _,
            sheet_index,
            sheet_name,
            session,
            print_setup,
        } = sheet;
        let worksheet = self
            .workbook
            .worksheet_from_index(sheet_index)
            .map_err(derive_xlsx_error)?;
        apply_print_setup(worksheet, &print_setup);

        let mut emitter = XlsxSheetEmitter::new(worksheet);
        let report = session.place(&mut emitter)?;
        debug!(
            sheet = %sheet_name,
            placements = report.placements.len(),
            "sheet written"
        );
        Ok(report)
    }

    /// Serialize the workbook to bytes without touching the sink.
    pub fn serialize(&mut self) -> Result<Vec<u8>> {
        self.validate_open()?;
        let result = self.workbook.save_to_buffer().map_err(derive_xlsx_error);
        self.track_failure(result)
    }

    /// Serialize the workbook and write it to the sink.
    pub fn generate(&mut self) -> Result<()> {
        self.validate_open()?;
        let result = self.generate_inner();
        self.track_failure(result)
    }

    /// Poison the writer if `result` failed.
    fn track_failure<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            warn!(error = %err, "workbook write failed; writer aborted");
            self.if_failed = true;
        }
        result
    }

    fn generate_inner(&mut self) -> Result<()> {
        match self.sink.as_mut() {
            Some(EnumOutputSink::Path(path)) => {
                self.workbook
                    .save(path.as_path())
                    .map_err(derive_xlsx_error)?;
            }
            Some(EnumOutputSink::Writer(writer)) => {
                let v_bytes = self.workbook.save_to_buffer().map_err(derive_xlsx_error)?;
                writer.write_all(&v_bytes)?;
                writer.flush()?;
            }
            None => {
                return Err(EnumLayoutError::SessionClosed(
                    "output sink already released".to_string(),
                ));
            }
        }
        self.if_generated = true;
        debug!(sheets = self.n_sheets, "workbook generated");
        Ok(())
    }

    /// Generate if not yet done, then release the sink. Idempotent.
    ///
    /// Failures are logged and recorded in [`Self::warnings`], never raised.
    pub fn close(&mut self) {
        if self.if_closed {
            return;
        }
        if !self.if_generated && !self.if_failed {
            if let Err(err) = self.generate_inner() {
                warn!(error = %err, "workbook generation failed on close");
                self.l_warnings
                    .push(format!("Failed to generate workbook on close: {err}"));
            }
        } else if let Some(EnumOutputSink::Writer(writer)) = self.sink.as_mut()
            && let Err(err) = writer.flush()
        {
            warn!(error = %err, "sink flush failed on close");
            self.l_warnings
                .push(format!("Failed to flush output sink on close: {err}"));
        }
        self.sink = None;
        self.if_closed = true;
    }

    fn validate_open(&self) -> Result<()> {
        if self.if_closed {
            return Err(EnumLayoutError::SessionClosed(
                "Cannot write after close().".to_string(),
            ));
        }
        if self.if_failed {
            return Err(EnumLayoutError::SessionClosed(
                "Writer aborted by an earlier error.".to_string(),
            ));
        }
        Ok(())
    }
}

impl Drop for XlsxLayoutWriter {
    fn drop(&mut self) {
        self.close();
    }
}

fn apply_print_setup(worksheet: &mut Worksheet, print_setup: &SpecPrintSetup) {
    if let Some(margins) = print_setup.margins {
        // Header/footer margins: negative keeps the writer defaults.
        worksheet.set_margins(
            margins.left,
            margins.right,
            margins.top,
            margins.bottom,
            -1.0,
            -1.0,
        );
    }
    if print_setup.if_landscape {
        worksheet.set_landscape();
    }
    if let Some(n_paper) = print_setup.paper_size {
        worksheet.set_paper_size(n_paper);
    }
    if print_setup.if_fit_to_page {
        worksheet.set_print_fit_to_pages(1, 0);
    }
}

#[cfg(test)]
mod tests {
    use sheetgrid_layout::SpecCellDescriptor;

    use super::*;

    fn make_writer() -> XlsxLayoutWriter {
        XlsxLayoutWriter::new(
            EnumOutputSink::Writer(Box::new(Vec::new())),
            SpecStylePresets::default(),
            SpecLayoutOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_legacy_format_is_rejected() {
        let options = SpecLayoutOptions {
            file_format: EnumFileFormat::Legacy,
            ..Default::default()
        };
        let err = XlsxLayoutWriter::new(
            EnumOutputSink::Writer(Box::new(Vec::new())),
            SpecStylePresets::default(),
            options,
        )
        .err()
        .unwrap();
        assert!(matches!(err, EnumLayoutError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_create_sheet_dedupes_and_sanitizes_names() {
        let mut writer = make_writer();
        let s1 = writer.create_sheet("a/b").unwrap();
        let s2 = writer.create_sheet("a/b").unwrap();
        assert_eq!(s1.sheet_name(), "a_b");
        assert_eq!(s2.sheet_name(), "a_b__2");
        assert_eq!(s2.sheet_index, 1);
    }

    #[test]
    fn test_failed_session_poisons_writer() {
        let mut writer = make_writer();
        let mut sheet = writer.create_sheet("s").unwrap();
        sheet.set_origin(sheetgrid_layout::SpecGridOrigin {
            row: 0,
            col: 20_000,
        });
        sheet.create_row(vec![SpecCellDescriptor::new("x")]);
        let err = writer.write_session(sheet).unwrap_err();
        assert!(matches!(err, EnumLayoutError::SheetLimitExceeded { .. }));
        assert!(matches!(
            writer.create_sheet("t"),
            Err(EnumLayoutError::SessionClosed(_))
        ));
    }

    #[test]
    fn test_session_from_another_writer_is_rejected() {
        let mut writer_a = make_writer();
        let mut writer_b = make_writer();
        let sheet_a = writer_a.create_sheet("a").unwrap();
        writer_b.create_sheet("b").unwrap();

        let err = writer_b.write_session(sheet_a).unwrap_err();
        assert!(matches!(err, EnumLayoutError::SessionClosed(_)));
        assert!(writer_b.report().is_empty());
        assert!(writer_b.create_sheet("c").is_ok());
        assert!(writer_a.serialize().is_ok());
    }

    #[test]
    fn test_serialize_keeps_writer_open_and_failure_poisons_it() {
        let mut writer = make_writer();
        let mut sheet = writer.create_sheet("s").unwrap();
        sheet.create_row(vec![SpecCellDescriptor::new(1)]);
        writer.write_session(sheet).unwrap();
        assert!(!writer.serialize().unwrap().is_empty());
        assert!(!writer.serialize().unwrap().is_empty());

        let result: Result<Vec<u8>> = Err(EnumLayoutError::IoFailure("zip".to_string()));
        assert!(writer.track_failure(result).is_err());
        assert!(matches!(
            writer.serialize(),
            Err(EnumLayoutError::SessionClosed(_))
        ));
    }

    #[test]
    fn test_close_is_idempotent_and_blocks_writes() {
        let mut writer = make_writer();
        let mut sheet = writer.create_sheet("s").unwrap();
        sheet.create_row(vec![SpecCellDescriptor::new(1)]);
        writer.write_session(sheet).unwrap();
        writer.close();
        writer.close();
        assert!(writer.warnings().is_empty());
        assert!(matches!(
            writer.serialize(),
            Err(EnumLayoutError::SessionClosed(_))
        ));
    }
}
