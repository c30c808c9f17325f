//! `SheetEmitter` backed by a `rust_xlsxwriter` worksheet.

use std::collections::HashMap;

use rust_xlsxwriter::{DataValidation, Format, Worksheet};
use sheetgrid_layout::{
    EnumCellValue, EnumLayoutError, EnumRowHeight, Result, SheetEmitter, SpecCellFormat,
    SpecMergeRect,
};

use crate::util::{cast_col_num, cast_row_num, derive_rust_xlsx_format, derive_xlsx_error};

/// Emitter writing into one borrowed worksheet.
///
/// Converted formats are cached per distinct [`SpecCellFormat`], so styling
/// every sub-cell of a large merge does not rebuild the format each time.
pub struct XlsxSheetEmitter<'a> {
    worksheet: &'a mut Worksheet,
    dict_formats: HashMap<SpecCellFormat, Format>,
}

impl<'a> XlsxSheetEmitter<'a> {
    pub fn new(worksheet: &'a mut Worksheet) -> Self {
        Self {
            worksheet,
            dict_formats: HashMap::new(),
        }
    }

    fn derive_format(&mut self, spec: &SpecCellFormat) -> Format {
        self.dict_formats
            .entry(spec.clone())
            .or_insert_with(|| derive_rust_xlsx_format(spec))
            .clone()
    }
}

impl SheetEmitter for XlsxSheetEmitter<'_> {
    fn set_row_height(&mut self, row: usize, height: EnumRowHeight) -> Result<()> {
        // Auto leaves the row untouched; the writer then sizes it itself.
        if let EnumRowHeight::Points(n_height) = height {
            self.worksheet
                .set_row_height(cast_row_num(row)?, n_height)
                .map_err(derive_xlsx_error)?;
        }
        Ok(())
    }

    fn set_column_width(&mut self, col: usize, width: f64) -> Result<()> {
        self.worksheet
            .set_column_width(cast_col_num(col)?, width)
            .map_err(derive_xlsx_error)?;
        Ok(())
    }

    fn write_value(
        &mut self,
        row: usize,
        col: usize,
        value: &EnumCellValue,
        format: &SpecCellFormat,
    ) -> Result<()> {
        let fmt = self.derive_format(format);
        let (n_row, n_col) = (cast_row_num(row)?, cast_col_num(col)?);
        match value {
            EnumCellValue::Text(val) | EnumCellValue::Other(val) => {
                self.worksheet
                    .write_string_with_format(n_row, n_col, val, &fmt)
                    .map_err(derive_xlsx_error)?;
            }
            EnumCellValue::Integer(val) => {
                self.worksheet
                    .write_number_with_format(n_row, n_col, *val, &fmt)
                    .map_err(derive_xlsx_error)?;
            }
            EnumCellValue::Long(val) => {
                self.worksheet
                    .write_number_with_format(n_row, n_col, *val as f64, &fmt)
                    .map_err(derive_xlsx_error)?;
            }
            EnumCellValue::Decimal(val) => {
                self.worksheet
                    .write_number_with_format(n_row, n_col, *val, &fmt)
                    .map_err(derive_xlsx_error)?;
            }
            EnumCellValue::Dropdown(_) => {
                return Err(EnumLayoutError::UnsupportedValueType(format!(
                    "{} must be resolved before reaching the worksheet",
                    value.kind()
                )));
            }
        }
        Ok(())
    }

    fn write_style(&mut self, row: usize, col: usize, format: &SpecCellFormat) -> Result<()> {
        let fmt = self.derive_format(format);
        self.worksheet
            .write_blank(cast_row_num(row)?, cast_col_num(col)?, &fmt)
            .map_err(derive_xlsx_error)?;
        Ok(())
    }

    fn add_merged_region(&mut self, rect: &SpecMergeRect, format: &SpecCellFormat) -> Result<()> {
        let fmt = self.derive_format(format);
        self.worksheet
            .merge_range(
                cast_row_num(rect.row_first)?,
                cast_col_num(rect.col_first)?,
                cast_row_num(rect.row_last)?,
                cast_col_num(rect.col_last)?,
                "",
                &fmt,
            )
            .map_err(derive_xlsx_error)?;
        Ok(())
    }

    fn add_list_validation(&mut self, rect: &SpecMergeRect, options: &[String]) -> Result<()> {
        let validation = DataValidation::new()
            .allow_list_strings(options)
            .map_err(|err| EnumLayoutError::MalformedDropdown(err.to_string()))?;
        self.worksheet
            .add_data_validation(
                cast_row_num(rect.row_first)?,
                cast_col_num(rect.col_first)?,
                cast_row_num(rect.row_last)?,
                cast_col_num(rect.col_last)?,
                &validation,
            )
            .map_err(derive_xlsx_error)?;
        Ok(())
    }
}
