//! Security limits for user-supplied skill configuration
//!
//! These bounds defend against injection through identifiers and against
//! resource exhaustion (oversized literals blow up both query cost and the
//! prompt context). The validator is the only component that checks them;
//! everything downstream trusts a validated config.

/// Maximum number of tables in a user skill config
pub const MAX_TABLES: usize = 10;

/// Maximum number of default filters per table
pub const MAX_DEFAULT_FILTERS: usize = 20;

/// Maximum number of metric definitions per table
pub const MAX_METRICS: usize = 50;

/// Maximum number of WHERE filters per metric
pub const MAX_METRIC_FILTERS: usize = 10;

/// Maximum length of a column identifier (in characters)
pub const MAX_COLUMN_NAME_LEN: usize = 200;

/// Maximum length of a string literal in a filter value
pub const MAX_STRING_LITERAL_LEN: usize = 1000;

/// Maximum number of elements in a list literal (for `in` / `not_in`)
pub const MAX_LIST_ELEMENTS: usize = 1000;

/// Maximum length of a single list element
pub const MAX_LIST_ELEMENT_LEN: usize = 500;

/// Maximum length of the industry tag
pub const MAX_INDUSTRY_LEN: usize = 50;

/// Maximum length of a metric label
pub const MAX_LABEL_LEN: usize = 100;

/// Maximum amount for a relative time spec (~10 years in days)
pub const MAX_RELATIVE_AMOUNT: u32 = 3650;

/// Identifier character set: ASCII word characters plus CJK ideographs.
/// Anything else (quotes, dashes, whitespace) is rejected because validated
/// identifiers are later interpolated into generated SQL.
pub const IDENTIFIER_PATTERN: &str = r"^[A-Za-z0-9_\p{Han}]+$";
