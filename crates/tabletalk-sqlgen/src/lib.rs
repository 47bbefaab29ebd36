//! Deterministic SQL assembly
//!
//! Turns a query shape (archetype plus resolved fields) and a table's
//! default filters into the final SQL text. Only a fixed set of templated
//! statement shapes is supported; identifiers come exclusively from
//! validated configuration or the live schema, and literals are quoted per
//! their runtime type.

pub mod assembler;
pub mod render;
pub mod shape;

pub use assembler::{assemble, AssemblyError, FALLBACK_TABLE};
pub use shape::{AggregateExpr, BucketGranularity, QueryPlan, QueryShape};
