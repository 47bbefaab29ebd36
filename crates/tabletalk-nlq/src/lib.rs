//! Natural-language question analysis
//!
//! Two concerns live here:
//! - Classification of a free-text question into a query archetype
//!   (deterministic rule pass first, model fallback on low confidence)
//! - Resolution of semantic field roles (time, amount, ids) to physical
//!   columns (explicit mapping first, then name-pattern inference)

pub mod classifier;
pub mod resolver;

pub use classifier::{is_distribution_question, Classification, Classifier, RuleClassifier};
pub use resolver::{
    guess_dimension, parse_granularity, resolve_field, FieldResolution, TimeGranularity,
};
