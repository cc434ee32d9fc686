use std::sync::OnceLock;

use regex::Regex;

use crate::{AnchoredRange, Range};

/// An A1 reference found inside formula text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormulaReference {
    /// Byte span of the reference token within the formula, sheet prefix excluded.
    pub span: std::ops::Range<usize>,
    /// Unescaped sheet name for `Sheet2!A1` and `'My Sheet'!A1`.
    pub sheet: Option<String>,
    pub reference: AnchoredRange,
}

fn cell_ref_re() -> &'static Regex {
    static CELL_REF_RE: OnceLock<Regex> = OnceLock::new();
    CELL_REF_RE.get_or_init(|| {
        Regex::new(r"(?i)(?:^|[^A-Z0-9_.$])(\$?[A-Z]{1,3}\$?\d+(?::\$?[A-Z]{1,3}\$?\d+)?)")
            .expect("valid regex")
    })
}

/// Byte offsets inside a `"..."` string literal or a `'...'` sheet name.
fn quoted_mask(formula: &str) -> Vec<bool> {
    let mut mask = vec![false; formula.len()];
    let mut open: Option<u8> = None;
    for (i, b) in formula.bytes().enumerate() {
        match open {
            // `""` and `''` inside a quote toggle twice and stay quoted.
            Some(q) if b == q => {
                open = None;
                mask[i] = true;
            }
            Some(_) => mask[i] = true,
            None if b == b'"' || b == b'\'' => {
                open = Some(b);
                mask[i] = true;
            }
            None => {}
        }
    }
    mask
}

/// The sheet qualifier written before a reference.
///
/// `Some(None)` for an unqualified reference, `Some(Some(name))` for a
/// local sheet, `None` for prefixes that are not rewritable (external
/// workbooks, 3D spans, anything unrecognized).
fn sheet_qualifier(before: &str) -> Option<Option<String>> {
    let Some(head) = before.strip_suffix('!') else {
        return Some(None);
    };
    let (name, rest) = match head.strip_suffix('\'') {
        Some(inner) => unquote_backwards(inner)?,
        None => {
            let start = head
                .char_indices()
                .rev()
                .take_while(|(_, c)| c.is_alphanumeric() || matches!(c, '_' | '.'))
                .last()
                .map(|(i, _)| i)?;
            (head[start..].to_string(), &head[..start])
        }
    };
    if name.starts_with('[') || rest.ends_with(|c: char| c == ']' || c == ':') {
        return None;
    }
    Some(Some(name))
}

/// Reads a quoted sheet name backwards from just inside its closing quote.
fn unquote_backwards(inner: &str) -> Option<(String, &str)> {
    let mut name = Vec::new();
    let mut chars = inner.char_indices().rev().peekable();
    while let Some((i, ch)) = chars.next() {
        if ch != '\'' {
            name.push(ch);
            continue;
        }
        if chars.next_if(|&(_, prev)| prev == '\'').is_some() {
            name.push('\'');
            continue;
        }
        return Some((name.into_iter().rev().collect(), &inner[..i]));
    }
    None
}

/// Best-effort scan for A1 references in a formula.
///
/// Skips references inside string literals and quoted sheet names, external
/// and 3D references (`[1]Data!A1`, `S1:S3!A1`), function names that look
/// like cells (`LOG10(`), and tokens that continue into a longer identifier.
/// Structured and R1C1 references are not recognized.
pub fn a1_reference_spans(formula: &str) -> Vec<FormulaReference> {
    let mask = quoted_mask(formula);
    let mut out = Vec::new();
    for cap in cell_ref_re().captures_iter(formula) {
        let Some(m) = cap.get(1) else {
            continue;
        };
        if mask.get(m.start()).copied().unwrap_or(false) {
            continue;
        }
        let Some(sheet) = sheet_qualifier(&formula[..m.start()]) else {
            continue;
        };
        let next = formula[m.end()..].chars().next();
        if next.is_some_and(|c| c == '(' || c == '!' || c.is_alphanumeric() || c == '_') {
            continue;
        }
        if let Ok(reference) = AnchoredRange::parse(m.as_str()) {
            out.push(FormulaReference {
                span: m.range(),
                sheet,
                reference,
            });
        }
    }
    out
}

/// Unqualified ranges referenced by a formula, sorted and deduplicated.
pub fn extract_a1_references(formula: &str) -> Vec<Range> {
    let mut refs: Vec<Range> = a1_reference_spans(formula)
        .into_iter()
        .filter(|r| r.sheet.is_none())
        .map(|r| r.reference.range())
        .collect();
    refs.sort_by_key(|r| (r.start.row, r.start.col, r.end.row, r.end.col));
    refs.dedup();
    refs
}

/// Replace each reference span with the text produced by `f`.
///
/// `f` returns `None` to keep a token unchanged. A sheet prefix is kept
/// in front of the replacement.
pub fn rewrite_a1_references(
    formula: &str,
    mut f: impl FnMut(&FormulaReference) -> Option<String>,
) -> String {
    let mut out = String::with_capacity(formula.len());
    let mut last = 0;
    for found in a1_reference_spans(formula) {
        if let Some(replacement) = f(&found) {
            out.push_str(&formula[last..found.span.start]);
            out.push_str(&replacement);
            last = found.span.end;
        }
    }
    out.push_str(&formula[last..]);
    out
}
