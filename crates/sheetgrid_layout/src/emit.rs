//! Emission seam between the placement engine and spreadsheet backends.

use std::collections::BTreeMap;

use crate::error::{EnumLayoutError, Result};
use crate::spec::{EnumCellValue, EnumRowHeight, SpecCellFormat, SpecMergeRect};

/// Sheet-level operations the placement engine drives.
///
/// All coordinates are absolute sheet coordinates (origin already applied).
/// Values handed to [`Self::write_value`] are already resolved: dropdowns
/// arrive as their default text.
pub trait SheetEmitter {
    /// Set one row's height.
    fn set_row_height(&mut self, row: usize, height: EnumRowHeight) -> Result<()>;

    /// Set one column's width in characters.
    fn set_column_width(&mut self, col: usize, width: f64) -> Result<()>;

    /// Write a typed value with its format.
    fn write_value(
        &mut self,
        row: usize,
        col: usize,
        value: &EnumCellValue,
        format: &SpecCellFormat,
    ) -> Result<()>;

    /// Apply a format to a cell that carries no value of its own.
    fn write_style(&mut self, row: usize, col: usize, format: &SpecCellFormat) -> Result<()>;

    /// Register a merged region.
    fn add_merged_region(&mut self, rect: &SpecMergeRect, format: &SpecCellFormat) -> Result<()>;

    /// Register a list-constrained validation over `rect`.
    fn add_list_validation(&mut self, rect: &SpecMergeRect, options: &[String]) -> Result<()>;
}

/// Cell state recorded by [`MemorySheet`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecMemoryCell {
    /// Written value, if any.
    pub value: Option<EnumCellValue>,
    /// Applied format, if any.
    pub format: Option<SpecCellFormat>,
}

/// In-memory emitter that records every call.
///
/// Useful for previews and for asserting layouts without a workbook.
#[derive(Debug, Clone, Default)]
pub struct MemorySheet {
    /// Cells keyed by `(row, col)`.
    pub cells: BTreeMap<(usize, usize), SpecMemoryCell>,
    /// Merged regions in registration order.
    pub merges: Vec<SpecMergeRect>,
    /// List validations in registration order.
    pub validations: Vec<(SpecMergeRect, Vec<String>)>,
    /// Row heights keyed by row.
    pub row_heights: BTreeMap<usize, EnumRowHeight>,
    /// Column widths keyed by column.
    pub column_widths: BTreeMap<usize, f64>,
}

impl MemorySheet {
    /// Empty sheet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Value at `(row, col)`.
    pub fn value_at(&self, row: usize, col: usize) -> Option<&EnumCellValue> {
        self.cells
            .get(&(row, col))
            .and_then(|cell| cell.value.as_ref())
    }

    /// Format at `(row, col)`.
    pub fn format_at(&self, row: usize, col: usize) -> Option<&SpecCellFormat> {
        self.cells
            .get(&(row, col))
            .and_then(|cell| cell.format.as_ref())
    }
}

impl SheetEmitter for MemorySheet {
    fn set_row_height(&mut self, row: usize, height: EnumRowHeight) -> Result<()> {
        self.row_heights.insert(row, height);
        Ok(())
    }

    fn set_column_width(&mut self, col: usize, width: f64) -> Result<()> {
        self.column_widths.insert(col, width);
        Ok(())
    }

    fn write_value(
        &mut self,
        row: usize,
        col: usize,
        value: &EnumCellValue,
        format: &SpecCellFormat,
    ) -> Result<()> {
        if let EnumCellValue::Dropdown(_) = value {
            return Err(EnumLayoutError::UnsupportedValueType(
                "dropdown must be resolved before writing".to_string(),
            ));
        }
        let cell = self.cells.entry((row, col)).or_default();
        cell.value = Some(value.clone());
        cell.format = Some(format.clone());
        Ok(())
    }

    fn write_style(&mut self, row: usize, col: usize, format: &SpecCellFormat) -> Result<()> {
        self.cells.entry((row, col)).or_default().format = Some(format.clone());
        Ok(())
    }

    fn add_merged_region(&mut self, rect: &SpecMergeRect, _format: &SpecCellFormat) -> Result<()> {
        if let Some(rect_prev) = self.merges.iter().find(|prev| prev.overlaps(rect)) {
            return Err(EnumLayoutError::MergeConflict {
                row: usize::max(rect.row_first, rect_prev.row_first),
                col: usize::max(rect.col_first, rect_prev.col_first),
            });
        }
        self.merges.push(*rect);
        Ok(())
    }

    fn add_list_validation(&mut self, rect: &SpecMergeRect, options: &[String]) -> Result<()> {
        self.validations.push((*rect, options.to_vec()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sheet_rejects_overlapping_merges() {
        let mut sheet = MemorySheet::new();
        let fmt = SpecCellFormat::default();
        sheet
            .add_merged_region(&SpecMergeRect::from_anchor(0, 0, 1, 1), &fmt)
            .unwrap();
        assert_eq!(
            sheet.add_merged_region(&SpecMergeRect::from_anchor(1, 1, 0, 1), &fmt),
            Err(EnumLayoutError::MergeConflict { row: 1, col: 1 })
        );
        assert_eq!(sheet.merges.len(), 1);
    }

    #[test]
    fn test_memory_sheet_style_keeps_existing_value() {
        let mut sheet = MemorySheet::new();
        let fmt = SpecCellFormat {
            bold: Some(true),
            ..Default::default()
        };
        sheet
            .write_value(0, 0, &EnumCellValue::Integer(7), &SpecCellFormat::default())
            .unwrap();
        sheet.write_style(0, 0, &fmt).unwrap();
        assert_eq!(sheet.value_at(0, 0), Some(&EnumCellValue::Integer(7)));
        assert_eq!(sheet.format_at(0, 0), Some(&fmt));
    }
}
