//! Stateless helper utilities used by the layout kernel.

use crate::error::{EnumLayoutError, Result};
use crate::spec::{
    EnumFileFormat, EnumTableSizeRule, SpecGridOrigin, SpecLayoutOptions, SpecLogicalRow,
    SpecSheetGeometry,
};

////////////////////////////////////////////////////////////////////////////////
// #region TableSizing

/// Compute grid `(width, height)` from accumulated rows.
///
/// Width is the widest row (span-weighted), floored at 1. Height depends on
/// `rule`:
/// - [`EnumTableSizeRule::SafeUpperBound`]: `rows + sum(row_span_increment)`.
///   A logical row can only spill into an extra grid row when earlier
///   row-spanning merges block it, and each blocked grid row is charged to the
///   merge that blocks it, so the bound always holds.
/// - [`EnumTableSizeRule::Heuristic`]: `rows + ceil(sum(col_inc * row_inc) / width)`.
///   Cheap, but undersizes narrow row spans; placement then reports
///   [`EnumLayoutError::LayoutOverflow`].
///
/// Sums saturate at `usize::MAX`; [`validate_sheet_limits`] rejects them.
pub fn calculate_table_size(
    rows: &[SpecLogicalRow],
    rule: EnumTableSizeRule,
) -> SpecSheetGeometry {
    let n_width = rows.iter().map(SpecLogicalRow::width).max().unwrap_or(0);
    let n_width = usize::max(1, n_width);

    let n_rows_extra = match rule {
        EnumTableSizeRule::SafeUpperBound => rows
            .iter()
            .flat_map(|row| row.cells.iter())
            .map(|cell| cell.row_span_increment)
            .fold(0, usize::saturating_add),
        EnumTableSizeRule::Heuristic => {
            let n_span_area = rows
                .iter()
                .flat_map(|row| row.cells.iter())
                .map(|cell| usize::saturating_mul(cell.col_span_increment, cell.row_span_increment))
                .fold(0, usize::saturating_add);
            n_span_area.div_ceil(n_width)
        }
    };

    SpecSheetGeometry {
        width: n_width,
        height: rows.len().saturating_add(n_rows_extra),
    }
}

/// Ensure the grid shifted by `origin` fits the container limits.
pub fn validate_sheet_limits(
    geometry: SpecSheetGeometry,
    origin: SpecGridOrigin,
    file_format: EnumFileFormat,
) -> Result<()> {
    let n_rows = origin.row.saturating_add(geometry.height);
    let n_cols = origin.col.saturating_add(geometry.width);
    if n_rows > file_format.n_rows_max() || n_cols > file_format.n_cols_max() {
        return Err(EnumLayoutError::SheetLimitExceeded {
            rows: n_rows,
            cols: n_cols,
            rows_max: file_format.n_rows_max(),
            cols_max: file_format.n_cols_max(),
        });
    }
    Ok(())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region RowChunking

/// Generate `(start, len)` chunks covering `n_total` items.
pub fn generate_row_chunks(n_total: usize, size_chunk: usize) -> Vec<(usize, usize)> {
    let mut l_chunks = Vec::new();
    if size_chunk == 0 {
        return l_chunks;
    }
    let mut n_cursor = 0;
    while n_cursor < n_total {
        let n_len = usize::min(size_chunk, n_total - n_cursor);
        l_chunks.push((n_cursor, n_len));
        n_cursor += n_len;
    }
    l_chunks
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ValueAndWidthUtils

/// Text for non-finite decimals; `None` for finite values.
pub fn convert_nan_inf_to_str(x: f64) -> Option<String> {
    if x.is_nan() {
        return Some("NaN".to_string());
    }
    if x.is_infinite() {
        let c_sign = if x.is_sign_positive() { "Inf" } else { "-Inf" };
        return Some(c_sign.to_string());
    }
    None
}

/// Resolve widths for grid columns `0..n_width` as `(sheet_col, width)`.
pub fn derive_column_widths(options: &SpecLayoutOptions, n_width: usize) -> Vec<(usize, f64)> {
    (0..n_width)
        .map(|col_idx| {
            let n_width_col = options
                .column_widths
                .get(&col_idx)
                .copied()
                .unwrap_or(options.column_width_default);
            (col_idx + options.origin.col, n_width_col)
        })
        .collect()
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{EnumRowHeight, SpecCellDescriptor};

    fn make_row(cells: Vec<SpecCellDescriptor>) -> SpecLogicalRow {
        SpecLogicalRow {
            cells,
            height: EnumRowHeight::Auto,
        }
    }

    fn make_cell(col_span: usize, row_span: usize) -> SpecCellDescriptor {
        SpecCellDescriptor::spanned("v", col_span, row_span).unwrap()
    }

    #[test]
    fn test_unspanned_rows_size_to_max_cells_and_row_count() {
        let rows = vec![
            make_row(vec![make_cell(1, 1), make_cell(1, 1)]),
            make_row(vec![make_cell(1, 1), make_cell(1, 1), make_cell(1, 1)]),
            make_row(vec![make_cell(1, 1)]),
        ];
        for rule in [
            EnumTableSizeRule::SafeUpperBound,
            EnumTableSizeRule::Heuristic,
        ] {
            assert_eq!(
                calculate_table_size(&rows, rule),
                SpecSheetGeometry {
                    width: 3,
                    height: 3
                }
            );
        }
    }

    #[test]
    fn test_empty_input_floors_width_at_one() {
        assert_eq!(
            calculate_table_size(&[], EnumTableSizeRule::Heuristic),
            SpecSheetGeometry {
                width: 1,
                height: 0
            }
        );
    }

    #[test]
    fn test_heuristic_and_safe_heights_differ_for_narrow_row_spans() {
        // A 1x3 vertical merge has zero col*row area, so the heuristic adds nothing.
        let rows = vec![
            make_row(vec![make_cell(1, 3), make_cell(1, 1)]),
            make_row(vec![make_cell(1, 1), make_cell(1, 1)]),
        ];
        assert_eq!(
            calculate_table_size(&rows, EnumTableSizeRule::Heuristic).height,
            2
        );
        assert_eq!(
            calculate_table_size(&rows, EnumTableSizeRule::SafeUpperBound).height,
            4
        );

        let rows = vec![
            make_row(vec![make_cell(2, 2)]),
            make_row(vec![make_cell(1, 1)]),
        ];
        // area 1*1 over width 2 rounds up to one extra row.
        assert_eq!(
            calculate_table_size(&rows, EnumTableSizeRule::Heuristic),
            SpecSheetGeometry {
                width: 2,
                height: 3
            }
        );
    }

    #[test]
    fn test_validate_sheet_limits_counts_origin() {
        let geometry = SpecSheetGeometry {
            width: 250,
            height: 10,
        };
        assert!(
            validate_sheet_limits(geometry, SpecGridOrigin::default(), EnumFileFormat::Legacy)
                .is_ok()
        );
        assert!(matches!(
            validate_sheet_limits(
                geometry,
                SpecGridOrigin { row: 0, col: 7 },
                EnumFileFormat::Legacy
            ),
            Err(EnumLayoutError::SheetLimitExceeded { cols: 257, .. })
        ));
        assert!(
            validate_sheet_limits(
                geometry,
                SpecGridOrigin { row: 0, col: 7 },
                EnumFileFormat::Modern
            )
            .is_ok()
        );
    }

    #[test]
    fn test_huge_spans_saturate_and_fail_limits() {
        let mut cell_wide = make_cell(1, 1);
        cell_wide.col_span_increment = usize::MAX / 2;
        let mut cell_tall = make_cell(1, 1);
        cell_tall.row_span_increment = usize::MAX;
        let rows = vec![
            make_row(vec![cell_wide.clone(), cell_wide]),
            make_row(vec![cell_tall]),
        ];

        for rule in [
            EnumTableSizeRule::SafeUpperBound,
            EnumTableSizeRule::Heuristic,
        ] {
            let geometry = calculate_table_size(&rows, rule);
            assert_eq!(geometry.width, usize::MAX);
            assert!(matches!(
                validate_sheet_limits(
                    geometry,
                    SpecGridOrigin::default(),
                    EnumFileFormat::Modern
                ),
                Err(EnumLayoutError::SheetLimitExceeded { .. })
            ));
        }
        assert_eq!(
            calculate_table_size(&rows, EnumTableSizeRule::SafeUpperBound).height,
            usize::MAX
        );
    }

    #[test]
    fn test_generate_row_chunks_keeps_remainder() {
        assert_eq!(generate_row_chunks(7, 3), vec![(0, 3), (3, 3), (6, 1)]);
        assert!(generate_row_chunks(7, 0).is_empty());
        assert!(generate_row_chunks(0, 3).is_empty());
    }

    #[test]
    fn test_convert_nan_inf_to_str() {
        assert_eq!(convert_nan_inf_to_str(f64::NAN).as_deref(), Some("NaN"));
        assert_eq!(
            convert_nan_inf_to_str(f64::INFINITY).as_deref(),
            Some("Inf")
        );
        assert_eq!(
            convert_nan_inf_to_str(f64::NEG_INFINITY).as_deref(),
            Some("-Inf")
        );
        assert_eq!(convert_nan_inf_to_str(1.5), None);
    }

    #[test]
    fn test_derive_column_widths_applies_overrides_and_origin() {
        let mut options = SpecLayoutOptions::default();
        options.column_width_default = 10.0;
        options.column_widths.insert(1, 20.0);
        options.origin = SpecGridOrigin { row: 0, col: 2 };
        assert_eq!(
            derive_column_widths(&options, 3),
            vec![(2, 10.0), (3, 20.0), (4, 10.0)]
        );
    }
}
