//! Layout session: row builder, style resolver and placement engine.

use tracing::{Level, debug, trace};

use crate::emit::SheetEmitter;
use crate::error::{EnumLayoutError, Result};
use crate::grid::OccupancyGrid;
use crate::spec::{
    EnumCellValue, EnumRowHeight, SpecCellDescriptor, SpecCellFormat, SpecGridOrigin,
    SpecLayoutOptions, SpecLayoutReport, SpecLogicalRow, SpecMergeRect, SpecPlacement,
    SpecSheetGeometry, SpecStylePresets,
};
use crate::util::{
    calculate_table_size, convert_nan_inf_to_str, derive_column_widths, generate_row_chunks,
    validate_sheet_limits,
};

/// Fill `style` into every descriptor that has none yet.
///
/// Already-resolved styles are never overwritten, so repeated calls are
/// idempotent.
pub fn resolve_default_style(cells: &mut [SpecCellDescriptor], style: &SpecCellFormat) {
    for cell in cells.iter_mut().filter(|cell| cell.style.is_none()) {
        cell.style = Some(style.clone());
    }
}

/// One sheet's worth of rows, owned by a single export call.
///
/// Rows are accumulated with the `create_row*` family, then
/// [`Self::place`] sizes the grid, resolves every span into a merge rectangle
/// and drives the emitter. Placement consumes the session.
#[derive(Debug, Clone)]
pub struct LayoutSession {
    presets: SpecStylePresets,
    options: SpecLayoutOptions,
    rows: Vec<SpecLogicalRow>,
}

impl LayoutSession {
    /// Start an empty session.
    pub fn new(presets: SpecStylePresets, options: SpecLayoutOptions) -> Self {
        Self {
            presets,
            options,
            rows: Vec::new(),
        }
    }

    /// Style presets this session resolves against.
    pub fn presets(&self) -> &SpecStylePresets {
        &self.presets
    }

    /// Session options.
    pub fn options(&self) -> &SpecLayoutOptions {
        &self.options
    }

    /// Rows accumulated so far.
    pub fn rows(&self) -> &[SpecLogicalRow] {
        &self.rows
    }

    /// Override one column width (grid-relative index).
    pub fn set_column_width(&mut self, col: usize, width: f64) {
        self.options.column_widths.insert(col, width);
    }

    /// Change the width used by columns without override.
    pub fn set_all_column_width(&mut self, width: f64) {
        self.options.column_width_default = width;
    }

    /// Change the height given to rows built without explicit height.
    pub fn set_row_height_default(&mut self, height: EnumRowHeight) {
        self.options.row_height_default = height;
    }

    /// Shift the whole table inside the sheet.
    pub fn set_origin(&mut self, origin: SpecGridOrigin) {
        self.options.origin = origin;
    }

    /// Append a row using the content style and the default height.
    pub fn create_row(&mut self, cells: Vec<SpecCellDescriptor>) {
        self.create_row_with(None, None, cells);
    }

    /// Append a row with an optional row style and height.
    ///
    /// `style` falls back to the content preset, `height` to the default
    /// height. Cells that already carry a style keep it.
    pub fn create_row_with(
        &mut self,
        style: Option<&SpecCellFormat>,
        height: Option<EnumRowHeight>,
        mut cells: Vec<SpecCellDescriptor>,
    ) {
        resolve_default_style(&mut cells, style.unwrap_or(&self.presets.content));
        self.rows.push(SpecLogicalRow {
            cells,
            height: height.unwrap_or(self.options.row_height_default),
        });
    }

    /// Split `cells` into rows of `row_len` cells; the last row may be shorter.
    pub fn create_rows(
        &mut self,
        style: Option<&SpecCellFormat>,
        row_len: usize,
        cells: Vec<SpecCellDescriptor>,
    ) {
        let l_chunks = generate_row_chunks(cells.len(), row_len);
        let mut iter_cells = cells.into_iter();
        for (_, n_len) in l_chunks {
            let l_row: Vec<_> = iter_cells.by_ref().take(n_len).collect();
            self.create_row_with(style, None, l_row);
        }
    }

    /// Grid size the placement will allocate.
    pub fn calculate_table_size(&self) -> SpecSheetGeometry {
        calculate_table_size(&self.rows, self.options.rule_table_size)
    }

    /// Resolve all rows into merge rectangles and emit them.
    ///
    /// Each descriptor anchors at the first free cell at or after the cursor
    /// in row-major order. After a row, the cursor moves to column 0 of the
    /// grid row below the row's last anchor. Any error aborts immediately.
    pub fn place<E: SheetEmitter + ?Sized>(self, emitter: &mut E) -> Result<SpecLayoutReport> {
        let geometry = self.calculate_table_size();
        let origin = self.options.origin;
        validate_sheet_limits(geometry, origin, self.options.file_format)?;
        debug!(
            width = geometry.width,
            height = geometry.height,
            rows = self.rows.len(),
            "layout grid sized"
        );

        for (n_col, n_width) in derive_column_widths(&self.options, geometry.width) {
            emitter.set_column_width(n_col, n_width)?;
        }

        let mut grid = OccupancyGrid::new(geometry);
        let mut report = SpecLayoutReport {
            geometry,
            origin,
            ..Default::default()
        };

        let mut n_row_cursor = 0usize;
        for (idx_row, row) in self.rows.into_iter().enumerate() {
            if n_row_cursor >= geometry.height {
                return Err(EnumLayoutError::LayoutOverflow {
                    row: n_row_cursor,
                    col: 0,
                    width: geometry.width,
                    height: geometry.height,
                });
            }
            emitter.set_row_height(origin.row + n_row_cursor, row.height)?;

            let mut n_row_anchor_last = n_row_cursor;
            let (mut n_cur_row, mut n_cur_col) = (n_row_cursor, 0usize);
            for (idx_cell, cell) in row.cells.into_iter().enumerate() {
                let (n_row_anchor, n_col_anchor) = grid.find_free(n_cur_row, n_cur_col)?;
                let rect = SpecMergeRect::from_anchor(
                    n_row_anchor,
                    n_col_anchor,
                    cell.row_span_increment,
                    cell.col_span_increment,
                );
                grid.occupy(&rect)?;

                let style = cell.style.as_ref().unwrap_or(&self.presets.content);
                emit_cell(emitter, &rect.offset(origin), cell.value, style)?;

                if tracing::enabled!(Level::TRACE) {
                    trace!(
                        row = idx_row,
                        cell = idx_cell,
                        anchor_row = n_row_anchor,
                        anchor_col = n_col_anchor,
                        "placed\n{}",
                        grid.render()
                    );
                }

                report.placements.push(SpecPlacement {
                    index_row: idx_row,
                    index_cell: idx_cell,
                    rect,
                });
                n_cur_row = n_row_anchor;
                n_cur_col = n_col_anchor + cell.col_span_increment + 1;
                n_row_anchor_last = n_row_anchor;
            }

            if n_row_anchor_last > n_row_cursor {
                report.warn(format!(
                    "Row {idx_row} spilled over {} extra grid row(s) around earlier merges.",
                    n_row_anchor_last - n_row_cursor
                ));
            }
            n_row_cursor = n_row_anchor_last + 1;
        }

        debug!(
            placements = report.placements.len(),
            merges = report.merge_count(),
            occupied = grid.count_occupied(),
            "layout placed"
        );
        Ok(report)
    }
}

/// Emit one resolved rectangle: validation, merge, anchor value, then the
/// style of every covered sub-cell.
fn emit_cell<E: SheetEmitter + ?Sized>(
    emitter: &mut E,
    rect: &SpecMergeRect,
    value: EnumCellValue,
    style: &SpecCellFormat,
) -> Result<()> {
    let value = match value {
        EnumCellValue::Dropdown(dropdown) => {
            emitter.add_list_validation(rect, dropdown.options())?;
            EnumCellValue::Text(dropdown.default_value().to_string())
        }
        EnumCellValue::Decimal(x) => match convert_nan_inf_to_str(x) {
            Some(text) => EnumCellValue::Text(text),
            None => EnumCellValue::Decimal(x),
        },
        other => other,
    };

    if rect.is_merge() {
        emitter.add_merged_region(rect, style)?;
    }
    emitter.write_value(rect.row_first, rect.col_first, &value, style)?;
    for (n_row, n_col) in rect.cells().skip(1) {
        emitter.write_style(n_row, n_col, style)?;
    }
    Ok(())
}
