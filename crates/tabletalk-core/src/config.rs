//! Trusted skill-configuration value types
//!
//! These types are only ever produced by the validator in `tabletalk-skill`.
//! A `UserSkillConfig` value in hand means every limit in [`crate::limits`]
//! already holds, so SQL-generating components may interpolate its
//! identifiers without re-checking them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The only accepted config version. Anything else is a hard rejection;
/// forward compatibility is explicitly not attempted.
pub const CONFIG_VERSION: &str = "v1";

/// Comparison operators allowed in filter expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterOperator {
    #[serde(rename = "=")]
    Eq,

    #[serde(rename = "!=")]
    NotEq,

    #[serde(rename = ">")]
    Gt,

    #[serde(rename = ">=")]
    Gte,

    #[serde(rename = "<")]
    Lt,

    #[serde(rename = "<=")]
    Lte,

    #[serde(rename = "in")]
    In,

    #[serde(rename = "not_in")]
    NotIn,

    #[serde(rename = "contains")]
    Contains,
}

impl FilterOperator {
    /// Parse the wire form used in raw config JSON
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "=" => Some(Self::Eq),
            "!=" => Some(Self::NotEq),
            ">" => Some(Self::Gt),
            ">=" => Some(Self::Gte),
            "<" => Some(Self::Lt),
            "<=" => Some(Self::Lte),
            "in" => Some(Self::In),
            "not_in" => Some(Self::NotIn),
            "contains" => Some(Self::Contains),
            _ => None,
        }
    }

    /// SQL rendering of the operator itself (`contains` becomes LIKE)
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::In => "IN",
            Self::NotIn => "NOT IN",
            Self::Contains => "LIKE",
        }
    }

    /// Whether this operator takes a list literal
    pub fn takes_list(&self) -> bool {
        matches!(self, Self::In | Self::NotIn)
    }
}

impl std::fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let wire = match self {
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::In => "in",
            Self::NotIn => "not_in",
            Self::Contains => "contains",
        };
        write!(f, "{}", wire)
    }
}

/// Calendar unit for relative time specs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Day,
    Week,
    Month,
    Year,
}

impl TimeUnit {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "day" => Some(Self::Day),
            "week" => Some(Self::Week),
            "month" => Some(Self::Month),
            "year" => Some(Self::Year),
            _ => None,
        }
    }

    /// SQL interval unit keyword
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Day => "DAY",
            Self::Week => "WEEK",
            Self::Month => "MONTH",
            Self::Year => "YEAR",
        }
    }
}

/// Whether a relative time spec points into the past or the future
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeDirection {
    Past,
    Future,
}

/// A window relative to the current date, e.g. "the past 30 days"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelativeTimeSpec {
    pub unit: TimeUnit,

    /// Positive count of units, capped at [`crate::limits::MAX_RELATIVE_AMOUNT`]
    pub amount: u32,

    pub direction: TimeDirection,
}

/// A literal or relative-time value on the right side of a filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Relative time window (checked first: it is the only object form)
    Relative(RelativeTimeSpec),

    String(String),

    Number(f64),

    Bool(bool),

    /// List literal for `in` / `not_in`
    List(Vec<String>),
}

/// A single validated filter condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterExpression {
    /// Validated column identifier, safe to interpolate
    pub column: String,

    pub operator: FilterOperator,

    pub value: FilterValue,
}

/// Aggregation functions supported by metric definitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    Count,
    CountDistinct,
    Sum,
    Avg,
    Min,
    Max,
}

impl Aggregation {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "count" => Some(Self::Count),
            "count_distinct" => Some(Self::CountDistinct),
            "sum" => Some(Self::Sum),
            "avg" => Some(Self::Avg),
            "min" => Some(Self::Min),
            "max" => Some(Self::Max),
            _ => None,
        }
    }

    /// Every aggregation except plain `count` needs a target column
    pub fn requires_column(&self) -> bool {
        !matches!(self, Self::Count)
    }

    /// SQL function name (`count_distinct` expands inside the assembler)
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Count | Self::CountDistinct => "COUNT",
            Self::Sum => "SUM",
            Self::Avg => "AVG",
            Self::Min => "MIN",
            Self::Max => "MAX",
        }
    }
}

impl std::fmt::Display for Aggregation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let wire = match self {
            Self::Count => "count",
            Self::CountDistinct => "count_distinct",
            Self::Sum => "sum",
            Self::Avg => "avg",
            Self::Min => "min",
            Self::Max => "max",
        };
        write!(f, "{}", wire)
    }
}

/// A named metric the user has defined for a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDefinition {
    /// Display label, capped at [`crate::limits::MAX_LABEL_LEN`]
    pub label: String,

    pub aggregation: Aggregation,

    /// Target column; required unless aggregation is `count`
    pub column: Option<String>,

    /// Metric-scoped WHERE filters, capped at [`crate::limits::MAX_METRIC_FILTERS`]
    #[serde(default)]
    pub where_filters: Vec<FilterExpression>,
}

/// Semantic roles a physical column can play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldRole {
    OrderId,
    UserId,
    Time,
    Amount,
}

impl FieldRole {
    /// Short label used in clarification messages and digests
    pub fn label(&self) -> &'static str {
        match self {
            Self::OrderId => "order id",
            Self::UserId => "user id",
            Self::Time => "time",
            Self::Amount => "amount",
        }
    }
}

/// User-declared mapping from semantic roles to physical columns
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    pub order_id: Option<String>,

    pub user_id: Option<String>,

    pub time: Option<String>,

    pub amount: Option<String>,
}

impl FieldMapping {
    /// Look up the column mapped to a role
    pub fn get(&self, role: FieldRole) -> Option<&str> {
        match role {
            FieldRole::OrderId => self.order_id.as_deref(),
            FieldRole::UserId => self.user_id.as_deref(),
            FieldRole::Time => self.time.as_deref(),
            FieldRole::Amount => self.amount.as_deref(),
        }
    }

    /// Roles that have an explicit mapping, in fixed display order
    pub fn present(&self) -> Vec<(FieldRole, &str)> {
        [
            FieldRole::OrderId,
            FieldRole::UserId,
            FieldRole::Time,
            FieldRole::Amount,
        ]
        .into_iter()
        .filter_map(|role| self.get(role).map(|col| (role, col)))
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.present().is_empty()
    }
}

/// Per-table skill configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSkillConfig {
    /// Industry tag selecting the downstream prompt pack. Mandatory.
    pub industry: String,

    #[serde(default)]
    pub field_mapping: Option<FieldMapping>,

    /// Applied to every generated query against this table
    #[serde(default)]
    pub default_filters: Vec<FilterExpression>,

    /// Named metric definitions, iteration order = name order
    #[serde(default)]
    pub metrics: BTreeMap<String, MetricDefinition>,
}

/// Root user skill configuration (persisted, user-editable)
///
/// Values of this type have passed the security validator; treat them as
/// read-only per request and never mutate them inside the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSkillConfig {
    /// Always the literal "v1"
    pub version: String,

    /// Per-table configs, iteration order = table-name order
    pub tables: BTreeMap<String, TableSkillConfig>,
}

impl UserSkillConfig {
    /// Look up the config for a table by name
    pub fn table(&self, name: &str) -> Option<&TableSkillConfig> {
        self.tables.get(name)
    }
}
