//! Query shapes and the assembled plan
//!
//! Archetype-to-SQL dispatch is a tagged union: each variant carries exactly
//! the resolved fields its statement shape needs, so an inconsistent plan
//! (e.g. a trend without a time column) cannot be constructed.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tabletalk_core::archetype::QueryArchetype;
use tabletalk_core::config::Aggregation;

/// Time bucket size for trend statements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BucketGranularity {
    Day,
    Week,
    Month,
}

impl BucketGranularity {
    /// Unit string for `DATE_TRUNC`
    pub fn trunc_unit(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        }
    }
}

/// An aggregate expression over an optional target column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateExpr {
    pub aggregation: Aggregation,

    /// Target column; `None` is only valid for plain `count`
    pub column: Option<String>,
}

impl AggregateExpr {
    /// Plain row count
    pub fn count() -> Self {
        Self {
            aggregation: Aggregation::Count,
            column: None,
        }
    }

    /// Aggregate over a column
    pub fn over(aggregation: Aggregation, column: impl Into<String>) -> Self {
        Self {
            aggregation,
            column: Some(column.into()),
        }
    }
}

/// The statement shape to assemble, tagged by archetype
#[derive(Debug, Clone, PartialEq)]
pub enum QueryShape {
    /// `SELECT <agg> FROM t [WHERE ...]`
    KpiSingle { aggregate: AggregateExpr },

    /// `SELECT dim, <agg> FROM t [WHERE ...] GROUP BY dim`
    KpiGrouped {
        aggregate: AggregateExpr,
        dimension: String,
    },

    /// `SELECT DATE_TRUNC(unit, time), <agg> FROM t [WHERE ...] GROUP BY bucket ORDER BY bucket`
    TrendTime {
        aggregate: AggregateExpr,
        time_column: String,
        granularity: BucketGranularity,
    },

    /// Average and median over the amount column
    Distribution { amount_column: String },

    /// Row-level preview with a trailing row cap
    Preview { row_cap: usize },
}

impl QueryShape {
    /// The archetype tag this shape reports in the plan.
    /// Distribution is a kpi_single refinement.
    pub fn archetype(&self) -> QueryArchetype {
        match self {
            Self::KpiSingle { .. } | Self::Distribution { .. } => QueryArchetype::KpiSingle,
            Self::KpiGrouped { .. } => QueryArchetype::KpiGrouped,
            Self::TrendTime { .. } => QueryArchetype::TrendTime,
            Self::Preview { .. } => QueryArchetype::Preview,
        }
    }
}

/// The assembled result: the sole externally observed output of the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryPlan {
    /// Archetype tag
    pub archetype: QueryArchetype,

    /// Final SQL text
    pub sql: String,

    /// Resolved semantic bindings (role label -> column) for presentation
    pub bindings: BTreeMap<String, String>,

    /// Row cap, present for row-level shapes only
    pub row_cap: Option<usize>,

    /// Tool identifier consumed by the downstream execution layer
    pub tool: String,
}
