//! Query archetypes
//!
//! The fixed set of analytical question shapes the engine can compile.
//! The wire tags are stable; the model fallback answers with one of them.

use serde::{Deserialize, Serialize};

/// A recognized analytical question shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryArchetype {
    /// A single aggregate value, e.g. "total order count"
    KpiSingle,

    /// An aggregate grouped by a dimension column
    KpiGrouped,

    /// An aggregate bucketed by a time truncation
    TrendTime,

    /// Generic fallback: row-level preview with a row cap
    Preview,
}

impl QueryArchetype {
    /// Stable wire tag
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::KpiSingle => "kpi_single",
            Self::KpiGrouped => "kpi_grouped",
            Self::TrendTime => "trend_time",
            Self::Preview => "preview",
        }
    }

    /// Parse a wire tag (model fallback answers use this form)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "kpi_single" => Some(Self::KpiSingle),
            "kpi_grouped" => Some(Self::KpiGrouped),
            "trend_time" => Some(Self::TrendTime),
            "preview" => Some(Self::Preview),
            _ => None,
        }
    }
}

impl std::fmt::Display for QueryArchetype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
