//! Polars DataFrame ingestion into layout rows.

use std::io::Cursor;

use polars::prelude::{AnyValue, DataFrame, IpcReader, SerReader};
use sheetgrid_layout::{EnumCellValue, EnumLayoutError, LayoutSession, Result, SpecCellDescriptor};

use crate::spec::SpecFrameRowsOptions;

/// Append `df` to `session` as one logical row per record.
///
/// With `if_include_header` the column names go first, in the subtitle
/// style. Returns the number of rows appended.
pub fn append_dataframe(
    session: &mut LayoutSession,
    df: &DataFrame,
    options: &SpecFrameRowsOptions,
) -> Result<usize> {
    let mut n_rows = 0usize;

    if options.if_include_header {
        let l_header: Vec<SpecCellDescriptor> = df
            .get_column_names_str()
            .into_iter()
            .map(SpecCellDescriptor::new)
            .collect();
        let fmt_header = session.presets().subtitle.clone();
        session.create_row_with(Some(&fmt_header), options.height_header, l_header);
        n_rows += 1;
    }

    let l_cols = df.get_columns();
    for n_idx_row in 0..df.height() {
        let mut l_cells = Vec::with_capacity(l_cols.len());
        for col in l_cols {
            let value = col.get(n_idx_row).map_err(|err| {
                EnumLayoutError::IoFailure(format!("Failed to read DataFrame cell value: {err}"))
            })?;
            l_cells.push(SpecCellDescriptor::new(derive_cell_value_from_any_value(
                value,
                &options.null_text,
            )));
        }
        session.create_row(l_cells);
        n_rows += 1;
    }

    Ok(n_rows)
}

/// Read a Polars IPC payload.
pub fn derive_dataframe_from_ipc_bytes(v_ipc_df: &[u8]) -> Result<DataFrame> {
    IpcReader::new(Cursor::new(v_ipc_df))
        .finish()
        .map_err(|err| {
            EnumLayoutError::IoFailure(format!("Failed to read IPC DataFrame bytes: {err}"))
        })
}

fn derive_cell_value_from_any_value(value: AnyValue<'_>, null_text: &str) -> EnumCellValue {
    match value {
        AnyValue::Null => EnumCellValue::Text(null_text.to_string()),
        AnyValue::String(val) => EnumCellValue::Text(val.to_string()),
        AnyValue::StringOwned(val) => EnumCellValue::Text(val.to_string()),
        AnyValue::UInt8(val) => EnumCellValue::Integer(val as i32),
        AnyValue::UInt16(val) => EnumCellValue::Integer(val as i32),
        AnyValue::Int8(val) => EnumCellValue::Integer(val as i32),
        AnyValue::Int16(val) => EnumCellValue::Integer(val as i32),
        AnyValue::Int32(val) => EnumCellValue::Integer(val),
        AnyValue::UInt32(val) => EnumCellValue::Long(val as i64),
        AnyValue::Int64(val) => EnumCellValue::Long(val),
        // Out-of-range u64 keeps its digits instead of wrapping.
        AnyValue::UInt64(val) => match i64::try_from(val) {
            Ok(n_val) => EnumCellValue::Long(n_val),
            Err(_) => EnumCellValue::other(val),
        },
        AnyValue::Float32(val) => EnumCellValue::Decimal(val as f64),
        AnyValue::Float64(val) => EnumCellValue::Decimal(val),
        _ => EnumCellValue::other(value),
    }
}

#[cfg(test)]
mod tests {
    use polars::df;
    use sheetgrid_layout::{MemorySheet, SpecLayoutOptions, SpecStylePresets};

    use super::*;

    fn make_session() -> LayoutSession {
        LayoutSession::new(SpecStylePresets::default(), SpecLayoutOptions::default())
    }

    #[test]
    fn test_append_dataframe_types_values_by_dtype() {
        let df = df!(
            "id" => [1i32, 2],
            "big" => [10i64, 20],
            "score" => [Some(1.5f64), None],
            "name" => ["a", "b"],
        )
        .unwrap();

        let mut session = make_session();
        let n_rows = append_dataframe(&mut session, &df, &SpecFrameRowsOptions::default())
            .unwrap();
        assert_eq!(n_rows, 3);

        let fmt_subtitle = session.presets().subtitle.clone();
        let mut sheet = MemorySheet::new();
        session.place(&mut sheet).unwrap();

        assert_eq!(
            sheet.value_at(0, 0),
            Some(&EnumCellValue::Text("id".into()))
        );
        assert_eq!(sheet.format_at(0, 3), Some(&fmt_subtitle));
        assert_eq!(sheet.value_at(1, 0), Some(&EnumCellValue::Integer(1)));
        assert_eq!(sheet.value_at(1, 1), Some(&EnumCellValue::Long(10)));
        assert_eq!(sheet.value_at(1, 2), Some(&EnumCellValue::Decimal(1.5)));
        assert_eq!(
            sheet.value_at(2, 2),
            Some(&EnumCellValue::Text(String::new()))
        );
        assert_eq!(
            sheet.value_at(2, 3),
            Some(&EnumCellValue::Text("b".into()))
        );
    }

    #[test]
    fn test_append_dataframe_without_header() {
        let df = df!("x" => [true, false]).unwrap();
        let options = SpecFrameRowsOptions {
            if_include_header: false,
            null_text: "-".to_string(),
            height_header: None,
        };
        let mut session = make_session();
        assert_eq!(append_dataframe(&mut session, &df, &options).unwrap(), 2);
        assert_eq!(
            session.rows()[0].cells[0].value,
            EnumCellValue::Other("true".to_string())
        );
    }

    #[test]
    fn test_derive_dataframe_from_ipc_bytes_rejects_garbage() {
        let err = derive_dataframe_from_ipc_bytes(b"not ipc").unwrap_err();
        assert!(matches!(err, EnumLayoutError::IoFailure(_)));
    }
}
