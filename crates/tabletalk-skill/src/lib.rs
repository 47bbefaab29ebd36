//! TableTalk skill layer
//!
//! This crate owns the trust boundary between externally supplied
//! configuration and the SQL-generating components:
//! - Security schema validation (untyped JSON in, trusted config out)
//! - Budgeted digest rendering for LLM prompts

pub mod digest;
pub mod validator;

pub use digest::{
    build_table_digest, build_user_digest, check_digest_budget, digest_stats, BudgetCheck,
    DigestOptions, DigestStats, TRUNCATION_MARKER,
};
pub use validator::validate;
