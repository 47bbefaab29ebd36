//! Validation codes and error reporting
//!
//! IMPORTANT: Validation codes are versioned and stable.
//! NEVER rename or remove codes - they are part of the public API.
//! Add new codes with new names only.

use serde::{Deserialize, Serialize};

/// Validation code registry (v1)
///
/// These codes are STABLE and VERSIONED.
/// Do NOT rename or remove codes - only add new ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationCode {
    // Config envelope (1xxx)
    /// Config version is not the supported "v1" literal
    UnsupportedVersion,

    /// More tables than the allowed maximum
    TooManyTables,

    /// A field has the wrong JSON type or is structurally broken
    MalformedField,

    // Table config (2xxx)
    /// Required industry tag is missing or empty
    MissingIndustry,

    /// Industry tag exceeds the length limit
    IndustryTooLong,

    /// More default filters than the allowed maximum
    TooManyDefaultFilters,

    /// More metrics than the allowed maximum
    TooManyMetrics,

    // Identifiers and literals (3xxx)
    /// Column name contains characters outside the permitted set
    InvalidColumnName,

    /// Column name exceeds the length limit
    ColumnNameTooLong,

    /// String literal exceeds the length limit
    LiteralTooLong,

    /// List literal has too many elements
    ListTooLong,

    /// A list element exceeds the length limit
    ListElementTooLong,

    /// Unknown filter operator
    InvalidOperator,

    /// Relative time spec is out of range or malformed
    InvalidRelativeTime,

    // Metrics (4xxx)
    /// Aggregation requires a target column but none was given
    MissingMetricColumn,

    /// More WHERE filters on a metric than the allowed maximum
    TooManyMetricFilters,

    /// Metric label exceeds the length limit
    LabelTooLong,
}

impl ValidationCode {
    /// Get the validation code as a stable string identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnsupportedVersion => "UNSUPPORTED_VERSION",
            Self::TooManyTables => "TOO_MANY_TABLES",
            Self::MalformedField => "MALFORMED_FIELD",
            Self::MissingIndustry => "MISSING_INDUSTRY",
            Self::IndustryTooLong => "INDUSTRY_TOO_LONG",
            Self::TooManyDefaultFilters => "TOO_MANY_DEFAULT_FILTERS",
            Self::TooManyMetrics => "TOO_MANY_METRICS",
            Self::InvalidColumnName => "INVALID_COLUMN_NAME",
            Self::ColumnNameTooLong => "COLUMN_NAME_TOO_LONG",
            Self::LiteralTooLong => "LITERAL_TOO_LONG",
            Self::ListTooLong => "LIST_TOO_LONG",
            Self::ListElementTooLong => "LIST_ELEMENT_TOO_LONG",
            Self::InvalidOperator => "INVALID_OPERATOR",
            Self::InvalidRelativeTime => "INVALID_RELATIVE_TIME",
            Self::MissingMetricColumn => "MISSING_METRIC_COLUMN",
            Self::TooManyMetricFilters => "TOO_MANY_METRIC_FILTERS",
            Self::LabelTooLong => "LABEL_TOO_LONG",
        }
    }
}

impl std::fmt::Display for ValidationCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single validation violation with structured metadata
///
/// The validator collects every violation in one pass so the user sees all
/// problems at once rather than fixing them one rejection at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Stable validation code
    pub code: ValidationCode,

    /// Path to the offending value, e.g. `tables.orders.defaultFilters[3].column`
    pub path: String,

    /// Human-readable message
    pub message: String,
}

impl ValidationError {
    /// Create a new validation error
    pub fn new(code: ValidationCode, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at {}: {}", self.code, self.path, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_code_stability() {
        // Ensure codes are stable strings
        assert_eq!(ValidationCode::UnsupportedVersion.as_str(), "UNSUPPORTED_VERSION");
        assert_eq!(ValidationCode::InvalidColumnName.as_str(), "INVALID_COLUMN_NAME");
        assert_eq!(ValidationCode::MissingMetricColumn.as_str(), "MISSING_METRIC_COLUMN");
    }

    #[test]
    fn validation_error_display() {
        let err = ValidationError::new(
            ValidationCode::TooManyTables,
            "tables",
            "11 tables exceed the maximum of 10",
        );

        let rendered = err.to_string();
        assert!(rendered.contains("TOO_MANY_TABLES"));
        assert!(rendered.contains("at tables:"));
    }

    #[test]
    fn validation_error_serialization() {
        let err = ValidationError::new(
            ValidationCode::InvalidColumnName,
            "tables.orders.defaultFilters[0].column",
            "column name contains forbidden characters",
        );

        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("INVALID_COLUMN_NAME"));
        assert!(json.contains("defaultFilters[0]"));
    }
}
