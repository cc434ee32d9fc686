//! Rebinding of externally supplied per-cell style overrides.
//!
//! Overrides arrive keyed by `"row-col"` strings captured *before* some
//! splices were applied, under a caller-chosen numbering base. [`translate`]
//! replays the splices on the keys; [`apply`] merges the result into the
//! sheet's cell styles.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use sheetsplice_model::{
    Border, BorderStyle, CellRef, Color, Fill, Font, Style, StyleRef, StyleTable, Workbook,
    Worksheet, EXCEL_MAX_COLS, EXCEL_MAX_ROWS,
};
use thiserror::Error;

use crate::editing::shift::{shift_point, SheetLimits};
use crate::editing::Splice;
use crate::error::SpliceError;
use crate::extent;

/// How override keys map onto sheet coordinates.
///
/// `sheet_row = key_row + row_offset`, `sheet_col = key_col + col_offset`.
/// There is deliberately no default: callers state the base they use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyBaseConfig {
    pub row_offset: i64,
    pub col_offset: i64,
}

impl KeyBaseConfig {
    pub fn to_cell(&self, key: StyleKey) -> Option<CellRef> {
        let row = i64::from(key.row).checked_add(self.row_offset)?;
        let col = i64::from(key.col).checked_add(self.col_offset)?;
        if !(1..=i64::from(EXCEL_MAX_ROWS)).contains(&row)
            || !(1..=i64::from(EXCEL_MAX_COLS)).contains(&col)
        {
            return None;
        }
        Some(CellRef::new(row as u32, col as u32))
    }

    /// `None` when the key would be negative under this base.
    pub fn to_key(&self, cell: CellRef) -> Option<StyleKey> {
        let row = u32::try_from(i64::from(cell.row).checked_sub(self.row_offset)?).ok()?;
        let col = u32::try_from(i64::from(cell.col).checked_sub(self.col_offset)?).ok()?;
        Some(StyleKey { row, col })
    }
}

/// A `"row-col"` override key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StyleKey {
    pub row: u32,
    pub col: u32,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("style key `{0}` is not of the form `row-col`")]
pub struct StyleKeyError(pub String);

impl FromStr for StyleKey {
    type Err = StyleKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || StyleKeyError(s.to_string());
        let (row, col) = s.trim().split_once('-').ok_or_else(err)?;
        let all_digits = |t: &str| !t.is_empty() && t.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(row) || !all_digits(col) {
            return Err(err());
        }
        Ok(StyleKey {
            row: row.parse().map_err(|_| err())?,
            col: col.parse().map_err(|_| err())?,
        })
    }
}

impl fmt::Display for StyleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.row, self.col)
    }
}

/// `null` deserializes to `Some(None)` (explicit clear), absence to `None`.
mod double_option {
    use super::*;

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

/// Attribute-level style override.
///
/// Every field is tri-state:
/// - `None`: key absent (leave the attribute alone)
/// - `Some(None)`: key present with `null` (clear the attribute)
/// - `Some(Some(v))`: set the attribute
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StylePatch {
    #[serde(
        default,
        deserialize_with = "double_option::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub bold: Option<Option<bool>>,
    #[serde(
        default,
        deserialize_with = "double_option::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub italic: Option<Option<bool>>,
    #[serde(
        default,
        deserialize_with = "double_option::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub underline: Option<Option<bool>>,
    #[serde(
        default,
        deserialize_with = "double_option::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub strikethrough: Option<Option<bool>>,
    /// `#RRGGBB` or `#AARRGGBB`.
    #[serde(
        default,
        deserialize_with = "double_option::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub font_color: Option<Option<Color>>,
    /// Solid fill color.
    #[serde(
        default,
        deserialize_with = "double_option::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub fill: Option<Option<Color>>,
    #[serde(
        default,
        deserialize_with = "double_option::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub border: Option<Option<BorderPatch>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorderPatch {
    #[serde(
        default,
        deserialize_with = "double_option::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub top: Option<Option<BorderStyle>>,
    #[serde(
        default,
        deserialize_with = "double_option::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub bottom: Option<Option<BorderStyle>>,
    #[serde(
        default,
        deserialize_with = "double_option::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub left: Option<Option<BorderStyle>>,
    #[serde(
        default,
        deserialize_with = "double_option::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub right: Option<Option<BorderStyle>>,
    #[serde(
        default,
        deserialize_with = "double_option::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub color: Option<Option<Color>>,
}

fn merge_field<T: Clone>(into: &mut Option<T>, from: &Option<T>) {
    if from.is_some() {
        *into = from.clone();
    }
}

impl BorderPatch {
    fn merge_from(&mut self, other: &BorderPatch) {
        merge_field(&mut self.top, &other.top);
        merge_field(&mut self.bottom, &other.bottom);
        merge_field(&mut self.left, &other.left);
        merge_field(&mut self.right, &other.right);
        merge_field(&mut self.color, &other.color);
    }

    fn apply_to(&self, border: &mut Border) {
        let edge = |patch: &Option<Option<BorderStyle>>, edge: &mut BorderStyle| {
            if let Some(value) = patch {
                *edge = value.unwrap_or_default();
            }
        };
        edge(&self.top, &mut border.top);
        edge(&self.bottom, &mut border.bottom);
        edge(&self.left, &mut border.left);
        edge(&self.right, &mut border.right);
        if let Some(color) = self.color {
            border.color = color;
        }
    }
}

impl StylePatch {
    pub fn is_empty(&self) -> bool {
        *self == StylePatch::default()
    }

    /// Overlay `other` on top of `self`; attributes `other` specifies win.
    pub fn merge_from(&mut self, other: &StylePatch) {
        merge_field(&mut self.bold, &other.bold);
        merge_field(&mut self.italic, &other.italic);
        merge_field(&mut self.underline, &other.underline);
        merge_field(&mut self.strikethrough, &other.strikethrough);
        merge_field(&mut self.font_color, &other.font_color);
        merge_field(&mut self.fill, &other.fill);
        match (&mut self.border, &other.border) {
            (Some(Some(mine)), Some(Some(theirs))) => mine.merge_from(theirs),
            (mine, theirs) => merge_field(mine, theirs),
        }
    }

    /// Merge the patch into `style`, attribute by attribute.
    pub fn apply_to(&self, style: &mut Style) {
        let touches_font = self.bold.is_some()
            || self.italic.is_some()
            || self.underline.is_some()
            || self.strikethrough.is_some()
            || self.font_color.is_some();
        if touches_font {
            let mut font = style.font.take().unwrap_or_default();
            if let Some(v) = self.bold {
                font.bold = v.unwrap_or(false);
            }
            if let Some(v) = self.italic {
                font.italic = v.unwrap_or(false);
            }
            if let Some(v) = self.underline {
                font.underline = v.unwrap_or(false);
            }
            if let Some(v) = self.strikethrough {
                font.strike = v.unwrap_or(false);
            }
            if let Some(color) = self.font_color {
                font.color = color;
            }
            style.font = (font != Font::default()).then_some(font);
        }

        if let Some(fill) = self.fill {
            style.fill = fill.map(Fill::solid);
        }

        match &self.border {
            None => {}
            Some(None) => style.border = None,
            Some(Some(patch)) => {
                let mut border = style.border.take().unwrap_or_default();
                patch.apply_to(&mut border);
                style.border = (border != Border::default()).then_some(border);
            }
        }
    }
}

/// Why an override entry was not translated or applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StyleDiagnosticReason {
    MalformedKey { message: String },
    /// The key decodes to a coordinate that is not on the sheet.
    OutsideSheet,
    /// The coordinate was removed by this splice.
    Deleted { splice: Splice },
    /// The shifted coordinate has no key under the configured base.
    NegativeKey,
    /// The coordinate lies outside the current sheet extent.
    OutsideExtent,
}

impl fmt::Display for StyleDiagnosticReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleDiagnosticReason::MalformedKey { message } => f.write_str(message),
            StyleDiagnosticReason::OutsideSheet => f.write_str("coordinate is off the sheet"),
            StyleDiagnosticReason::Deleted { splice } => write!(f, "deleted by {splice}"),
            StyleDiagnosticReason::NegativeKey => f.write_str("key would be negative"),
            StyleDiagnosticReason::OutsideExtent => f.write_str("outside the used range"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleDiagnostic {
    pub key: String,
    pub reason: StyleDiagnosticReason,
}

impl StyleDiagnostic {
    fn new(key: impl Into<String>, reason: StyleDiagnosticReason) -> Self {
        let diagnostic = Self {
            key: key.into(),
            reason,
        };
        log::warn!("style override `{}` skipped: {}", diagnostic.key, diagnostic.reason);
        diagnostic
    }
}

/// Output of [`translate`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Translation {
    pub overrides: BTreeMap<String, StylePatch>,
    pub diagnostics: Vec<StyleDiagnostic>,
}

/// Re-key `overrides` through `applied_splices`, replayed in order.
///
/// Keys whose coordinate was deleted, that fall off the sheet, that would
/// become negative, or that do not parse are dropped with a diagnostic. Two
/// keys landing on the same coordinate are merged in key order.
pub fn translate(
    overrides: &BTreeMap<String, StylePatch>,
    applied_splices: &[Splice],
    key_base: KeyBaseConfig,
) -> Translation {
    let limits = SheetLimits::EXCEL;
    let mut out = Translation::default();

    'keys: for (text, patch) in overrides {
        let key = match text.parse::<StyleKey>() {
            Ok(key) => key,
            Err(err) => {
                let reason = StyleDiagnosticReason::MalformedKey {
                    message: err.to_string(),
                };
                out.diagnostics.push(StyleDiagnostic::new(text, reason));
                continue;
            }
        };
        let Some(mut cell) = key_base.to_cell(key) else {
            let reason = StyleDiagnosticReason::OutsideSheet;
            out.diagnostics.push(StyleDiagnostic::new(text, reason));
            continue;
        };
        for splice in applied_splices {
            match shift_point(cell, splice, limits) {
                Some(next) => cell = next,
                None => {
                    let reason = StyleDiagnosticReason::Deleted { splice: *splice };
                    out.diagnostics.push(StyleDiagnostic::new(text, reason));
                    continue 'keys;
                }
            }
        }
        let Some(new_key) = key_base.to_key(cell) else {
            let reason = StyleDiagnosticReason::NegativeKey;
            out.diagnostics.push(StyleDiagnostic::new(text, reason));
            continue;
        };
        out.overrides
            .entry(new_key.to_string())
            .or_default()
            .merge_from(patch);
    }

    out
}

/// Merge translated overrides into the sheet's cell styles.
///
/// Styles are interned into `styles` and referenced by id. Coordinates outside
/// the sheet extent are skipped; missing cells inside it are created.
pub fn apply(
    sheet: &mut Worksheet,
    styles: &mut StyleTable,
    overrides: &BTreeMap<String, StylePatch>,
    key_base: KeyBaseConfig,
) -> Vec<StyleDiagnostic> {
    let mut diagnostics = Vec::new();
    let current_extent = extent::recompute(sheet);

    for (text, patch) in overrides {
        let key = match text.parse::<StyleKey>() {
            Ok(key) => key,
            Err(err) => {
                let reason = StyleDiagnosticReason::MalformedKey {
                    message: err.to_string(),
                };
                diagnostics.push(StyleDiagnostic::new(text, reason));
                continue;
            }
        };
        let Some(cell) = key_base.to_cell(key) else {
            diagnostics.push(StyleDiagnostic::new(text, StyleDiagnosticReason::OutsideSheet));
            continue;
        };
        if !current_extent.is_some_and(|e| e.contains(cell)) {
            diagnostics.push(StyleDiagnostic::new(text, StyleDiagnosticReason::OutsideExtent));
            continue;
        }

        let mut style = sheet
            .cell(cell)
            .map(|c| c.style.resolve(styles))
            .unwrap_or_default();
        patch.apply_to(&mut style);
        let style_ref = if style.is_default() {
            StyleRef::default()
        } else {
            StyleRef::Shared(styles.intern(style))
        };
        sheet.set_style(cell, style_ref);
    }

    sheet.dimension = extent::recompute(sheet);
    diagnostics
}

/// IPC payload asking for overrides collected before `applied_splices` to be
/// applied to a sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleOverrideRequest {
    pub sheet_name: String,
    pub overrides: BTreeMap<String, StylePatch>,
    pub key_base_config: KeyBaseConfig,
    #[serde(default)]
    pub applied_splices: Vec<Splice>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleResolution {
    /// Number of overrides written into the sheet.
    pub applied: usize,
    pub diagnostics: Vec<StyleDiagnostic>,
}

/// Translate then apply a [`StyleOverrideRequest`].
pub fn resolve_request(
    workbook: &mut Workbook,
    request: &StyleOverrideRequest,
) -> Result<StyleResolution, SpliceError> {
    let sheet = workbook
        .sheets
        .iter_mut()
        .find(|s| s.name.eq_ignore_ascii_case(&request.sheet_name))
        .ok_or_else(|| SpliceError::SheetNotFound(request.sheet_name.clone()))?;

    let translation = translate(
        &request.overrides,
        &request.applied_splices,
        request.key_base_config,
    );
    let skipped = apply(
        sheet,
        &mut workbook.styles,
        &translation.overrides,
        request.key_base_config,
    );

    let applied = translation.overrides.len() - skipped.len();
    log::debug!(
        "style overrides on `{}`: {applied} applied, {} skipped",
        request.sheet_name,
        translation.diagnostics.len() + skipped.len()
    );
    let mut diagnostics = translation.diagnostics;
    diagnostics.extend(skipped);
    Ok(StyleResolution {
        applied,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetsplice_model::FillPattern;

    const BASE: KeyBaseConfig = KeyBaseConfig {
        row_offset: 2,
        col_offset: 1,
    };

    fn overrides(keys: &[&str]) -> BTreeMap<String, StylePatch> {
        keys.iter()
            .map(|k| {
                let patch = StylePatch {
                    bold: Some(Some(true)),
                    ..StylePatch::default()
                };
                (k.to_string(), patch)
            })
            .collect()
    }

    #[test]
    fn keys_parse_strictly() {
        assert_eq!("20-5".parse::<StyleKey>(), Ok(StyleKey { row: 20, col: 5 }));
        assert!("20".parse::<StyleKey>().is_err());
        assert!("-1-5".parse::<StyleKey>().is_err());
        assert!("a-5".parse::<StyleKey>().is_err());
    }

    #[test]
    fn base_conversion_is_explicit() {
        let cell = BASE.to_cell(StyleKey { row: 20, col: 5 }).unwrap();
        assert_eq!(cell.to_a1(), "F22");
        assert_eq!(BASE.to_key(cell), Some(StyleKey { row: 20, col: 5 }));
        assert_eq!(BASE.to_key(CellRef::new(1, 1)), None);
    }

    #[test]
    fn extreme_offsets_produce_diagnostics() {
        let far: KeyBaseConfig =
            serde_json::from_str(r#"{"rowOffset": 9223372036854775807, "colOffset": 0}"#).unwrap();
        let t = translate(&overrides(&["1-1"]), &[], far);
        assert!(t.overrides.is_empty());
        assert_eq!(t.diagnostics[0].reason, StyleDiagnosticReason::OutsideSheet);

        let near = KeyBaseConfig {
            row_offset: i64::MIN,
            col_offset: 0,
        };
        assert_eq!(near.to_cell(StyleKey { row: 1, col: 1 }), None);
        assert_eq!(near.to_key(CellRef::new(1, 1)), None);
        assert_eq!(far.to_key(CellRef::new(1, 1)), None);
    }

    #[test]
    fn deleting_first_column_rekeys_overrides() {
        let t = translate(
            &overrides(&["20-5"]),
            &[Splice::DeleteCols { col: 1, count: 1 }],
            BASE,
        );
        assert!(t.diagnostics.is_empty());
        assert_eq!(t.overrides.keys().collect::<Vec<_>>(), ["20-4"]);
    }

    #[test]
    fn deleted_and_malformed_keys_are_reported() {
        let t = translate(
            &overrides(&["20-0", "x", "3-4"]),
            &[Splice::DeleteCols { col: 1, count: 1 }],
            BASE,
        );
        assert_eq!(t.overrides.keys().collect::<Vec<_>>(), ["3-3"]);
        assert_eq!(t.diagnostics.len(), 2);
        assert!(t
            .diagnostics
            .iter()
            .any(|d| d.key == "20-0" && matches!(d.reason, StyleDiagnosticReason::Deleted { .. })));
    }

    #[test]
    fn null_clears_and_absent_keeps() {
        let patch: StylePatch =
            serde_json::from_str(r##"{"fill": null, "bold": true, "fontColor": "#FF0000"}"##).unwrap();
        assert_eq!(patch.fill, Some(None));
        assert_eq!(patch.italic, None);

        let mut style = Style {
            fill: Some(Fill::solid(Color::new_argb(0xFF00FF00))),
            font: Some(Font {
                italic: true,
                ..Font::default()
            }),
            ..Style::default()
        };
        patch.apply_to(&mut style);
        assert_eq!(style.fill, None);
        let font = style.font.unwrap();
        assert!(font.bold && font.italic);
        assert_eq!(font.color, Some(Color::new_argb(0xFFFF0000)));
    }

    #[test]
    fn apply_interns_styles_and_skips_outside_extent() {
        let mut sheet = Worksheet::new("Sheet1");
        sheet.set_value(CellRef::new(22, 6), "x");
        sheet.set_value(CellRef::new(1, 1), "corner");
        let mut styles = StyleTable::new();

        let mut map = BTreeMap::new();
        map.insert(
            "20-5".to_string(),
            StylePatch {
                fill: Some(Some(Color::new_argb(0xFFFFFF00))),
                ..StylePatch::default()
            },
        );
        map.insert("0-4".to_string(), StylePatch::default());
        map.insert("500-5".to_string(), StylePatch::default());

        let diagnostics = apply(&mut sheet, &mut styles, &map, BASE);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].key, "500-5");

        let style = sheet.cell(CellRef::new(22, 6)).unwrap().style.resolve(&styles);
        assert_eq!(style.fill.map(|f| f.pattern), Some(FillPattern::Solid));
        // Row 2, column E is inside the extent but empty: an empty patch creates nothing.
        assert!(sheet.cell(CellRef::new(2, 5)).is_none());
    }
}
