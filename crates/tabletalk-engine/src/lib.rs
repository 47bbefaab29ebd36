//! TableTalk engine - request pipeline
//!
//! Wires the compilation stages together: trusted config + question in,
//! assembled plan (or a typed clarification) out. The engine never executes
//! SQL itself; execution is the downstream layer's job via [`QueryExecutor`].

pub mod executor;
pub mod pipeline;

pub use executor::{ExecuteError, FieldInfo, MockExecutor, QueryExecutor, ResultSet};
pub use pipeline::{CompileOutcome, SkillContext, SkillEngine};
