//! Layout constants and default preset factories.

use std::collections::BTreeMap;

use crate::spec::{
    EnumFileFormat, EnumRowHeight, EnumTableSizeRule, SpecCellFormat, SpecGridOrigin,
    SpecLayoutOptions, SpecStylePresets,
};

/// Zip-based worksheet maximum row count.
pub const N_NROWS_MODERN_MAX: usize = 1_048_576;
/// Zip-based worksheet maximum column count.
pub const N_NCOLS_MODERN_MAX: usize = 16_384;
/// Legacy binary worksheet maximum row count.
pub const N_NROWS_LEGACY_MAX: usize = 65_536;
/// Legacy binary worksheet maximum column count.
pub const N_NCOLS_LEGACY_MAX: usize = 256;
/// Maximum length of an explicit list validation (comma-joined).
pub const N_LEN_LIST_VALIDATION_MAX: usize = 255;
/// Default column width in characters (3000 / 256 legacy width units).
pub const N_COLUMN_WIDTH_DEFAULT: f64 = 3000.0 / 256.0;
/// Default row height in points.
pub const N_ROW_HEIGHT_DEFAULT: f64 = 35.0;

const C_FONT_TITLE: &str = "黑体";
const C_FONT_BODY: &str = "仿宋_GB2312";

/// Build the three built-in presets: main title, subtitle, content.
pub fn derive_default_style_presets() -> SpecStylePresets {
    let cfg_base_fmt_spec = SpecCellFormat {
        align: Some("center".to_string()),
        valign: Some("vcenter".to_string()),
        text_wrap: Some(true),
        ..Default::default()
    };

    let main_title = cfg_base_fmt_spec.with_(SpecCellFormat {
        font_name: Some(C_FONT_TITLE.to_string()),
        font_size: Some(26),
        bold: Some(true),
        ..Default::default()
    });
    let subtitle = cfg_base_fmt_spec
        .with_(SpecCellFormat {
            font_name: Some(C_FONT_BODY.to_string()),
            font_size: Some(12),
            bold: Some(true),
            ..Default::default()
        })
        .with_border_sides(true, true, true, true);
    let content = cfg_base_fmt_spec
        .with_(SpecCellFormat {
            font_name: Some(C_FONT_BODY.to_string()),
            font_size: Some(12),
            bold: Some(false),
            ..Default::default()
        })
        .with_border_sides(true, true, true, true);

    SpecStylePresets {
        main_title,
        subtitle,
        content,
    }
}

/// Build default layout options for `file_format`.
pub fn derive_default_layout_options(file_format: EnumFileFormat) -> SpecLayoutOptions {
    SpecLayoutOptions {
        file_format,
        origin: SpecGridOrigin::default(),
        column_width_default: N_COLUMN_WIDTH_DEFAULT,
        column_widths: BTreeMap::new(),
        row_height_default: EnumRowHeight::Points(N_ROW_HEIGHT_DEFAULT),
        rule_table_size: EnumTableSizeRule::SafeUpperBound,
    }
}

impl Default for SpecLayoutOptions {
    fn default() -> Self {
        derive_default_layout_options(EnumFileFormat::Modern)
    }
}

impl Default for SpecStylePresets {
    fn default() -> Self {
        derive_default_style_presets()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_presets_match_title_and_body_fonts() {
        let presets = derive_default_style_presets();
        assert_eq!(presets.main_title.font_size, Some(26));
        assert_eq!(presets.main_title.bold, Some(true));
        assert_eq!(presets.main_title.top, None);

        assert_eq!(presets.subtitle.bold, Some(true));
        assert_eq!(presets.subtitle.left, Some(1));
        assert_eq!(presets.content.bold, Some(false));
        assert_eq!(presets.content.bottom, Some(1));
        assert_eq!(presets.content.font_name, presets.subtitle.font_name);
    }
}
