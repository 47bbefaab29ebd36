//! Statement assembly
//!
//! Emits the final SQL text for a query shape. Errors here mean the earlier
//! stages produced an inconsistent shape; they are internal defects, not user
//! errors, and the engine surfaces them as such.

use std::collections::BTreeMap;
use tabletalk_core::config::{Aggregation, FilterExpression, FilterOperator};

use crate::render::render_where;
use crate::shape::{AggregateExpr, QueryPlan, QueryShape};

/// Table identifier used when the context carries no active table
pub const FALLBACK_TABLE: &str = "current_table";

/// Tool identifier stamped on every plan
const TOOL_ID: &str = "skill_compiler";

/// Inconsistencies between archetype and resolved fields
#[derive(Debug, Clone, thiserror::Error)]
pub enum AssemblyError {
    #[error("Aggregation '{aggregation}' requires a target column")]
    MissingAggregateColumn { aggregation: Aggregation },

    #[error("Empty list literal cannot be rendered")]
    EmptyListLiteral,

    #[error("Operator '{operator}' cannot take value {value}")]
    UnsupportedValue {
        operator: FilterOperator,
        value: String,
    },
}

/// Assemble the final statement for a shape.
///
/// `table_name` falls back to [`FALLBACK_TABLE`]; `default_filters` become a
/// conjoined WHERE clause on every statement (absent filters add no WHERE).
pub fn assemble(
    shape: &QueryShape,
    table_name: Option<&str>,
    default_filters: &[FilterExpression],
) -> Result<QueryPlan, AssemblyError> {
    let table = table_name.unwrap_or(FALLBACK_TABLE);
    let where_clause = render_where(default_filters)?;
    let mut bindings = BTreeMap::new();

    let sql = match shape {
        QueryShape::KpiSingle { aggregate } => {
            let agg = render_aggregate(aggregate)?;
            if let Some(column) = &aggregate.column {
                bindings.insert("aggregate".to_string(), column.clone());
            }
            join_clauses([
                Some(format!("SELECT {} AS value", agg)),
                Some(format!("FROM {}", table)),
                where_clause,
            ])
        }
        QueryShape::KpiGrouped {
            aggregate,
            dimension,
        } => {
            let agg = render_aggregate(aggregate)?;
            bindings.insert("dimension".to_string(), dimension.clone());
            join_clauses([
                Some(format!("SELECT {}, {} AS value", dimension, agg)),
                Some(format!("FROM {}", table)),
                where_clause,
                Some(format!("GROUP BY {}", dimension)),
                Some("ORDER BY value DESC".to_string()),
            ])
        }
        QueryShape::TrendTime {
            aggregate,
            time_column,
            granularity,
        } => {
            let agg = render_aggregate(aggregate)?;
            bindings.insert("time".to_string(), time_column.clone());
            let bucket = format!(
                "DATE_TRUNC('{}', {})",
                granularity.trunc_unit(),
                time_column
            );
            join_clauses([
                Some(format!("SELECT {} AS bucket, {} AS value", bucket, agg)),
                Some(format!("FROM {}", table)),
                where_clause,
                Some("GROUP BY bucket".to_string()),
                Some("ORDER BY bucket".to_string()),
            ])
        }
        QueryShape::Distribution { amount_column } => {
            bindings.insert("amount".to_string(), amount_column.clone());
            join_clauses([
                Some(format!(
                    "SELECT AVG({col}) AS avg_value, MEDIAN({col}) AS median_value",
                    col = amount_column
                )),
                Some(format!("FROM {}", table)),
                where_clause,
            ])
        }
        QueryShape::Preview { row_cap } => join_clauses([
            Some("SELECT *".to_string()),
            Some(format!("FROM {}", table)),
            where_clause,
            Some(format!("LIMIT {}", row_cap)),
        ]),
    };

    let row_cap = match shape {
        QueryShape::Preview { row_cap } => Some(*row_cap),
        _ => None,
    };

    tracing::debug!(archetype = %shape.archetype(), %sql, "assembled statement");

    Ok(QueryPlan {
        archetype: shape.archetype(),
        sql,
        bindings,
        row_cap,
        tool: TOOL_ID.to_string(),
    })
}

fn render_aggregate(aggregate: &AggregateExpr) -> Result<String, AssemblyError> {
    match (aggregate.aggregation, &aggregate.column) {
        (Aggregation::Count, None) => Ok("COUNT(*)".to_string()),
        (Aggregation::Count, Some(column)) => Ok(format!("COUNT({})", column)),
        (Aggregation::CountDistinct, Some(column)) => Ok(format!("COUNT(DISTINCT {})", column)),
        (agg, Some(column)) => Ok(format!("{}({})", agg.as_sql(), column)),
        (agg, None) => Err(AssemblyError::MissingAggregateColumn { aggregation: agg }),
    }
}

fn join_clauses<const N: usize>(clauses: [Option<String>; N]) -> String {
    clauses
        .into_iter()
        .flatten()
        .collect::<Vec<String>>()
        .join(" ")
}
