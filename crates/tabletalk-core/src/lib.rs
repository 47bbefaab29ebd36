//! TableTalk Core
//!
//! Core domain model with stable, versioned types.
//! Never rename validation codes - they are part of the public API.

pub mod archetype;
pub mod config;
pub mod diagnostic;
pub mod limits;
pub mod schema;
pub mod settings;

pub use archetype::QueryArchetype;
pub use config::{
    Aggregation, FieldMapping, FieldRole, FilterExpression, FilterOperator, FilterValue,
    MetricDefinition, RelativeTimeSpec, TableSkillConfig, TimeDirection, TimeUnit,
    UserSkillConfig, CONFIG_VERSION,
};
pub use diagnostic::{ValidationCode, ValidationError};
pub use schema::{ColumnInfo, TableSchema};
pub use settings::{Settings, SettingsError};
