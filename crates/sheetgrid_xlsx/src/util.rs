//! Stateless helpers shared by the workbook writer.

use std::collections::BTreeSet;

use rust_xlsxwriter::{ColNum, Format, FormatAlign, FormatBorder, RowNum, XlsxError};
use sheetgrid_layout::{EnumLayoutError, Result, SpecCellFormat};

use crate::conf::{C_SHEET_NAME_DEFAULT, N_LEN_EXCEL_SHEET_NAME_MAX, TUP_EXCEL_ILLEGAL};

////////////////////////////////////////////////////////////////////////////////
// #region SheetNormalization

/// Replace invalid chars and trim to valid Excel sheet name.
pub fn sanitize_sheet_name(name: &str, replace_to: &str) -> String {
    let mut c_name = name.to_string();
    for c_illegal in TUP_EXCEL_ILLEGAL {
        c_name = c_name.replace(c_illegal, replace_to);
    }
    c_name = c_name.trim().to_string();
    if c_name.is_empty() {
        c_name = C_SHEET_NAME_DEFAULT.to_string();
    }

    c_name.chars().take(N_LEN_EXCEL_SHEET_NAME_MAX).collect()
}

/// Return `name`, or `name__2`, `name__3`, ... if already taken; records it.
///
/// Excel compares sheet names case-insensitively, so `set_names_existing`
/// holds lowercased names.
pub fn derive_unique_sheet_name(set_names_existing: &mut BTreeSet<String>, name: &str) -> String {
    if set_names_existing.insert(name.to_lowercase()) {
        return name.to_string();
    }

    let base_name: String = name
        .chars()
        .take(usize::max(1, N_LEN_EXCEL_SHEET_NAME_MAX - 3))
        .collect();

    let mut n_idx = 2usize;
    loop {
        let candidate: String = format!("{base_name}__{n_idx}")
            .chars()
            .take(N_LEN_EXCEL_SHEET_NAME_MAX)
            .collect();
        if set_names_existing.insert(candidate.to_lowercase()) {
            return candidate;
        }
        n_idx += 1;
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region FormatConversion

/// Border styles by numeric index; anything out of range means no border.
const TUP_FORMAT_BORDERS: [FormatBorder; 14] = [
    FormatBorder::None,
    FormatBorder::Thin,
    FormatBorder::Medium,
    FormatBorder::Dashed,
    FormatBorder::Dotted,
    FormatBorder::Thick,
    FormatBorder::Double,
    FormatBorder::Hair,
    FormatBorder::MediumDashed,
    FormatBorder::DashDot,
    FormatBorder::MediumDashDot,
    FormatBorder::DashDotDot,
    FormatBorder::MediumDashDotDot,
    FormatBorder::SlantDashDot,
];

type FnSetBorder = fn(Format, FormatBorder) -> Format;

/// Build the `rust_xlsxwriter` format for a layout cell format.
pub fn derive_rust_xlsx_format(spec: &SpecCellFormat) -> Format {
    let mut format = apply_font(Format::new(), spec);
    format = apply_alignment(format, spec);
    format = apply_borders(format, spec);
    if let Some(val) = &spec.num_format {
        format = format.set_num_format(val.as_str());
    }
    if let Some(val) = &spec.bg_color {
        format = format.set_background_color(val.as_str());
    }
    format
}

fn apply_font(mut format: Format, spec: &SpecCellFormat) -> Format {
    if let Some(val) = &spec.font_name {
        format = format.set_font_name(val.as_str());
    }
    if let Some(n_size) = spec.font_size {
        format = format.set_font_size(n_size as f64);
    }
    if let Some(val) = &spec.font_color {
        format = format.set_font_color(val.as_str());
    }
    if spec.bold == Some(true) {
        format = format.set_bold();
    }
    if spec.italic == Some(true) {
        format = format.set_italic();
    }
    format
}

/// Horizontal and vertical alignment live in separate vocabularies; unknown
/// names leave the default alignment.
fn apply_alignment(mut format: Format, spec: &SpecCellFormat) -> Format {
    let align_h = spec.align.as_deref().and_then(derive_align_horizontal);
    let align_v = spec.valign.as_deref().and_then(derive_align_vertical);
    for align in align_h.into_iter().chain(align_v) {
        format = format.set_align(align);
    }
    if spec.text_wrap == Some(true) {
        format = format.set_text_wrap();
    }
    format
}

/// The all-sides border goes first so per-side borders override it.
fn apply_borders(mut format: Format, spec: &SpecCellFormat) -> Format {
    let l_sides: [(Option<i64>, FnSetBorder); 5] = [
        (spec.border, Format::set_border),
        (spec.top, Format::set_border_top),
        (spec.bottom, Format::set_border_bottom),
        (spec.left, Format::set_border_left),
        (spec.right, Format::set_border_right),
    ];
    for (n_border, set_border) in l_sides {
        if let Some(n_border) = n_border {
            format = set_border(format, derive_format_border(n_border));
        }
    }
    format
}

fn derive_format_border(n_border: i64) -> FormatBorder {
    usize::try_from(n_border)
        .ok()
        .and_then(|idx| TUP_FORMAT_BORDERS.get(idx).copied())
        .unwrap_or(FormatBorder::None)
}

fn derive_align_horizontal(align: &str) -> Option<FormatAlign> {
    let align = match align.trim().to_ascii_lowercase().as_str() {
        "general" => FormatAlign::General,
        "left" => FormatAlign::Left,
        "center" | "centre" => FormatAlign::Center,
        "right" => FormatAlign::Right,
        "fill" => FormatAlign::Fill,
        "justify" => FormatAlign::Justify,
        "center_across" => FormatAlign::CenterAcross,
        "distributed" => FormatAlign::Distributed,
        _ => return None,
    };
    Some(align)
}

fn derive_align_vertical(valign: &str) -> Option<FormatAlign> {
    let align = match valign.trim().to_ascii_lowercase().as_str() {
        "top" => FormatAlign::Top,
        "bottom" => FormatAlign::Bottom,
        "center" | "vcenter" | "vertical_center" => FormatAlign::VerticalCenter,
        "justify" | "vjustify" => FormatAlign::VerticalJustify,
        "distributed" | "vdistributed" => FormatAlign::VerticalDistributed,
        _ => return None,
    };
    Some(align)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Casting

/// Sheet row index as `rust_xlsxwriter` row number.
pub fn cast_row_num(value: usize) -> Result<RowNum> {
    RowNum::try_from(value)
        .map_err(|_| EnumLayoutError::IoFailure(format!("row index overflow: {value}")))
}

/// Sheet column index as `rust_xlsxwriter` column number.
pub fn cast_col_num(value: usize) -> Result<ColNum> {
    ColNum::try_from(value)
        .map_err(|_| EnumLayoutError::IoFailure(format!("column index overflow: {value}")))
}

/// Wrap a writer-library error.
pub fn derive_xlsx_error(err: XlsxError) -> EnumLayoutError {
    EnumLayoutError::IoFailure(format!("xlsx write error: {err}"))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
