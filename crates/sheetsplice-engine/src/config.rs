use serde::{Deserialize, Serialize};
use sheetsplice_model::{EXCEL_MAX_COLS, EXCEL_MAX_ROWS};
use thiserror::Error;

/// Engine configuration.
///
/// Missing fields deserialize to their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpliceConfig {
    /// Last addressable row; inserts that would push content past it fail.
    pub max_rows: u32,
    /// Last addressable column.
    pub max_cols: u32,
    /// Drop or narrow metadata that ends up outside the sheet extent.
    pub clip_metadata_to_extent: bool,
    /// Shift A1 references inside cell, conditional-format and validation formulas.
    pub rewrite_formulas: bool,
}

impl Default for SpliceConfig {
    fn default() -> Self {
        Self {
            max_rows: EXCEL_MAX_ROWS,
            max_cols: EXCEL_MAX_COLS,
            clip_metadata_to_extent: true,
            rewrite_formulas: true,
        }
    }
}

impl SpliceConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_limit(self.max_rows, EXCEL_MAX_ROWS, "max_rows")?;
        ensure_limit(self.max_cols, EXCEL_MAX_COLS, "max_cols")?;
        Ok(())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field} must be greater than zero (got {value})")]
    NonPositiveLimit { field: &'static str, value: u32 },
    #[error("{field} must not exceed {max} (got {value})")]
    LimitTooLarge {
        field: &'static str,
        value: u32,
        max: u32,
    },
}

fn ensure_limit(value: u32, max: u32, field: &'static str) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::NonPositiveLimit { field, value });
    }
    if value > max {
        return Err(ConfigError::LimitTooLarge { field, value, max });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(SpliceConfig::default().validate(), Ok(()));
    }

    #[test]
    fn partial_json_uses_defaults() {
        let cfg: SpliceConfig = serde_json::from_str(r#"{"max_cols": 100}"#).unwrap();
        assert_eq!(cfg.max_cols, 100);
        assert_eq!(cfg.max_rows, EXCEL_MAX_ROWS);
        assert!(cfg.clip_metadata_to_extent);
        assert!(cfg.rewrite_formulas);
    }

    #[test]
    fn rejects_zero_and_oversized_limits() {
        let cfg = SpliceConfig {
            max_rows: 0,
            ..SpliceConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::NonPositiveLimit {
                field: "max_rows",
                value: 0
            })
        );
        let cfg = SpliceConfig {
            max_cols: EXCEL_MAX_COLS + 1,
            ..SpliceConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::LimitTooLarge { field: "max_cols", .. })
        ));
    }
}
