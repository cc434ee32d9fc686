//! Checks shared by table and defined-name validation.

use std::sync::OnceLock;

use regex::Regex;

/// `AB12`-shaped: one to three letters then digits.
pub(crate) fn looks_like_a1(name: &str) -> bool {
    static A1_LIKE: OnceLock<Regex> = OnceLock::new();
    A1_LIKE
        .get_or_init(|| Regex::new(r"^[A-Za-z]{1,3}[0-9]+$").expect("valid regex"))
        .is_match(name)
}

/// `R`, `C`, `RC`, `R5`, `C5`, `R2C3` in any case.
pub(crate) fn looks_like_r1c1(name: &str) -> bool {
    static R1C1_LIKE: OnceLock<Regex> = OnceLock::new();
    R1C1_LIKE
        .get_or_init(|| {
            Regex::new(r"(?i)^(?:r[0-9]*(?:c[0-9]*)?|c[0-9]*)$").expect("valid regex")
        })
        .is_match(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_lookalikes() {
        for name in ["A1", "xfd9", "R", "rc", "R12", "c7", "R2C3"] {
            assert!(looks_like_a1(name) || looks_like_r1c1(name), "{name}");
        }
        for name in ["Name1", "ABCD1", "Rate", "Col_1", "R2C3x", ""] {
            assert!(!looks_like_a1(name) && !looks_like_r1c1(name), "{name}");
        }
    }
}
