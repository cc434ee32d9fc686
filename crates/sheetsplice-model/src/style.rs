use core::fmt;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// ARGB color. Crosses JSON as `"#AARRGGBB"`; `"#RRGGBB"` is read as opaque.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub argb: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("`{0}` is not a #RRGGBB or #AARRGGBB color")]
pub struct ColorParseError(String);

impl Color {
    pub const fn new_argb(argb: u32) -> Self {
        Self { argb }
    }

    /// Lenient form used by callers; the leading `#` is optional.
    pub fn from_hex(text: &str) -> Option<Self> {
        let text = text.trim();
        let digits = text.strip_prefix('#').unwrap_or(text);
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let value = u32::from_str_radix(digits, 16).ok()?;
        match digits.len() {
            6 => Some(Self::new_argb(0xFF00_0000 | value)),
            8 => Some(Self::new_argb(value)),
            _ => None,
        }
    }
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        text.trim()
            .starts_with('#')
            .then(|| Color::from_hex(&text))
            .flatten()
            .ok_or(ColorParseError(text))
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:08X}", self.argb)
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Font {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Hundredths of a point.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_100pt: Option<u16>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub underline: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub strike: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillPattern {
    #[default]
    None,
    Solid,
    Gray125,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fill {
    #[serde(default)]
    pub pattern: FillPattern,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

impl Fill {
    pub fn solid(color: Color) -> Self {
        Self {
            pattern: FillPattern::Solid,
            color: Some(color),
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BorderStyle {
    #[default]
    None,
    Thin,
    Medium,
    Thick,
    Dashed,
    Dotted,
    Double,
}

/// Edge styles plus one shared edge color.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Border {
    #[serde(default)]
    pub top: BorderStyle,
    #[serde(default)]
    pub bottom: BorderStyle,
    #[serde(default)]
    pub left: BorderStyle,
    #[serde(default)]
    pub right: BorderStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

/// Cell formatting. `number_format` is stored but never interpreted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Style {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<Font>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<Fill>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border: Option<Border>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_format: Option<String>,
}

impl Style {
    pub fn is_default(&self) -> bool {
        self == &Style::default()
    }
}

/// Interned workbook styles. Id `0` is always the empty style.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(from = "StyleList")]
pub struct StyleTable {
    pub styles: Vec<Style>,
    #[serde(skip)]
    ids: HashMap<Style, u32>,
}

#[derive(Deserialize)]
struct StyleList {
    #[serde(default)]
    styles: Vec<Style>,
}

impl From<StyleList> for StyleTable {
    fn from(list: StyleList) -> Self {
        let mut styles = list.styles;
        if styles.is_empty() {
            styles.push(Style::default());
        }
        // Duplicates read from a package resolve to their first id.
        let mut ids = HashMap::with_capacity(styles.len());
        for (id, style) in styles.iter().enumerate() {
            ids.entry(style.clone()).or_insert(id as u32);
        }
        Self { styles, ids }
    }
}

impl Default for StyleTable {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for StyleTable {
    fn eq(&self, other: &Self) -> bool {
        self.styles == other.styles
    }
}

impl StyleTable {
    pub fn new() -> Self {
        StyleList { styles: Vec::new() }.into()
    }

    /// Id of `style`, adding it on first sight.
    pub fn intern(&mut self, style: Style) -> u32 {
        if let Some(&id) = self.ids.get(&style) {
            return id;
        }
        let id = self.styles.len() as u32;
        self.styles.push(style.clone());
        self.ids.insert(style, id);
        id
    }

    pub fn get(&self, style_id: u32) -> Option<&Style> {
        self.styles.get(style_id as usize)
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}
