//! Budgeted digest rendering
//!
//! Renders a trusted skill config into a compact text summary for inclusion
//! in a language-model prompt. All sizes are hard-bounded: per-section item
//! caps with `+K more` markers, then a whole-digest character budget with a
//! truncation suffix. Lengths are counted in Unicode scalar values so CJK
//! configs are budgeted the same as ASCII ones.

use tabletalk_core::config::{FilterExpression, FilterValue, TableSkillConfig, UserSkillConfig};
use tabletalk_core::config::TimeDirection;
use tabletalk_core::settings::{
    DEFAULT_DIGEST_MAX_CHARS, DEFAULT_DIGEST_MAX_FILTERS, DEFAULT_DIGEST_MAX_METRICS,
};

/// Suffix appended when the digest is cut at the character budget.
/// The final digest may exceed the budget by exactly this marker's length.
pub const TRUNCATION_MARKER: &str = "…[truncated]";

/// Rendering budgets for a digest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DigestOptions {
    /// Filters kept per section before the `+K more filters` marker
    pub max_filters: usize,

    /// Metrics kept per section before the `+K more metrics` marker
    pub max_metrics: usize,

    /// Hard character budget for the whole digest
    pub max_chars: usize,
}

impl Default for DigestOptions {
    fn default() -> Self {
        Self {
            max_filters: DEFAULT_DIGEST_MAX_FILTERS,
            max_metrics: DEFAULT_DIGEST_MAX_METRICS,
            max_chars: DEFAULT_DIGEST_MAX_CHARS,
        }
    }
}

/// Size statistics for a rendered digest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DigestStats {
    pub chars: usize,
    pub lines: usize,
}

/// Result of checking a digest against the default budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetCheck {
    pub within_budget: bool,
    pub chars: usize,
    pub limit: usize,
}

/// Render the digest for a single table config.
///
/// Always starts with `Active table: <name>`; an empty config yields exactly
/// that one line. Sections appear in fixed order (field mapping, default
/// filters, metrics) and empty sections are omitted entirely.
pub fn build_table_digest(
    table_name: &str,
    config: &TableSkillConfig,
    options: &DigestOptions,
) -> String {
    let mut lines = vec![format!("Active table: {}", table_name)];

    if let Some(mapping) = &config.field_mapping {
        let present = mapping.present();
        if !present.is_empty() {
            lines.push("Field mapping:".to_string());
            for (role, column) in present {
                lines.push(format!("  {}: {}", role.label(), column));
            }
        }
    }

    if !config.default_filters.is_empty() {
        lines.push("Default filters:".to_string());
        render_section(
            &mut lines,
            config.default_filters.iter().map(render_filter),
            config.default_filters.len(),
            options.max_filters,
            "filters",
        );
    }

    if !config.metrics.is_empty() {
        lines.push("Metrics:".to_string());
        render_section(
            &mut lines,
            config.metrics.iter().map(|(name, metric)| {
                let column = metric.column.as_deref().unwrap_or("*");
                format!("{}: {}({})", name, metric.aggregation, column)
            }),
            config.metrics.len(),
            options.max_metrics,
            "metrics",
        );
    }

    enforce_budget(lines.join("\n"), options.max_chars)
}

/// Render the digest for the active table of a user config.
///
/// Missing config or missing active-table name yields an empty string. A
/// named table with no config section renders as an empty config.
pub fn build_user_digest(
    config: Option<&UserSkillConfig>,
    active_table: Option<&str>,
    options: &DigestOptions,
) -> String {
    let (config, table_name) = match (config, active_table) {
        (Some(config), Some(table_name)) => (config, table_name),
        _ => return String::new(),
    };

    match config.table(table_name) {
        Some(table) => build_table_digest(table_name, table, options),
        None => enforce_budget(format!("Active table: {}", table_name), options.max_chars),
    }
}

/// Pure size introspection for a rendered digest
pub fn digest_stats(digest: &str) -> DigestStats {
    DigestStats {
        chars: digest.chars().count(),
        lines: digest.lines().count(),
    }
}

/// Check a digest against the fixed default budget
pub fn check_digest_budget(digest: &str) -> BudgetCheck {
    let chars = digest.chars().count();
    BudgetCheck {
        within_budget: chars <= DEFAULT_DIGEST_MAX_CHARS,
        chars,
        limit: DEFAULT_DIGEST_MAX_CHARS,
    }
}

/// Keep the first `max_items` rendered items and report how many were dropped.
fn render_section(
    lines: &mut Vec<String>,
    items: impl Iterator<Item = String>,
    total: usize,
    max_items: usize,
    section: &str,
) {
    for item in items.take(max_items) {
        lines.push(format!("  {}", item));
    }
    if total > max_items {
        lines.push(format!("  +{} more {}", total - max_items, section));
    }
}

fn render_filter(filter: &FilterExpression) -> String {
    format!(
        "{} {} {}",
        filter.column,
        filter.operator,
        render_value(&filter.value)
    )
}

fn render_value(value: &FilterValue) -> String {
    match value {
        FilterValue::String(s) => format!("\"{}\"", s),
        FilterValue::Number(n) => {
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                format!("{}", n)
            }
        }
        FilterValue::Bool(b) => b.to_string(),
        FilterValue::List(items) => {
            // Long lists are already capped by validation, but keep the
            // digest line short regardless.
            let shown: Vec<&str> = items.iter().take(3).map(String::as_str).collect();
            if items.len() > 3 {
                format!("[{}, … {} total]", shown.join(", "), items.len())
            } else {
                format!("[{}]", shown.join(", "))
            }
        }
        FilterValue::Relative(spec) => {
            let direction = match spec.direction {
                TimeDirection::Past => "past",
                TimeDirection::Future => "next",
            };
            let unit = match spec.unit {
                tabletalk_core::config::TimeUnit::Day => "day",
                tabletalk_core::config::TimeUnit::Week => "week",
                tabletalk_core::config::TimeUnit::Month => "month",
                tabletalk_core::config::TimeUnit::Year => "year",
            };
            format!("\"{} {} {}{}\"", direction, spec.amount, unit, plural(spec.amount))
        }
    }
}

fn plural(amount: u32) -> &'static str {
    if amount == 1 {
        ""
    } else {
        "s"
    }
}

/// Cut the digest at the character budget and append the truncation marker.
/// The result never exceeds `max_chars` plus the marker's own length.
fn enforce_budget(digest: String, max_chars: usize) -> String {
    if digest.chars().count() <= max_chars {
        return digest;
    }

    let mut truncated: String = digest.chars().take(max_chars).collect();
    truncated.push_str(TRUNCATION_MARKER);
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;
    use tabletalk_core::config::{
        Aggregation, FieldMapping, FilterOperator, MetricDefinition,
    };

    fn filter(column: &str, operator: FilterOperator, value: FilterValue) -> FilterExpression {
        FilterExpression {
            column: column.to_string(),
            operator,
            value,
        }
    }

    fn empty_table() -> TableSkillConfig {
        TableSkillConfig {
            industry: "ecommerce".to_string(),
            field_mapping: None,
            default_filters: Vec::new(),
            metrics: BTreeMap::new(),
        }
    }

    #[test]
    fn empty_config_is_exactly_the_header_line() {
        let digest = build_table_digest("orders", &empty_table(), &DigestOptions::default());
        assert_eq!(digest, "Active table: orders");
    }

    #[test]
    fn digest_is_idempotent_on_minimal_configs() {
        let options = DigestOptions::default();
        let first = build_table_digest("orders", &empty_table(), &options);
        let second = build_table_digest("orders", &empty_table(), &options);
        assert_eq!(first, second);
    }

    #[test]
    fn sections_render_in_fixed_order() {
        let mut metrics = BTreeMap::new();
        metrics.insert(
            "gmv".to_string(),
            MetricDefinition {
                label: "GMV".to_string(),
                aggregation: Aggregation::Sum,
                column: Some("amount".to_string()),
                where_filters: Vec::new(),
            },
        );

        let config = TableSkillConfig {
            industry: "ecommerce".to_string(),
            field_mapping: Some(FieldMapping {
                time: Some("order_time".to_string()),
                ..Default::default()
            }),
            default_filters: vec![filter(
                "status",
                FilterOperator::Eq,
                FilterValue::String("completed".to_string()),
            )],
            metrics,
        };

        let digest = build_table_digest("orders", &config, &DigestOptions::default());
        let lines: Vec<&str> = digest.lines().collect();
        assert_eq!(lines[0], "Active table: orders");
        assert_eq!(lines[1], "Field mapping:");
        assert_eq!(lines[2], "  time: order_time");
        assert_eq!(lines[3], "Default filters:");
        assert_eq!(lines[4], "  status = \"completed\"");
        assert_eq!(lines[5], "Metrics:");
        assert_eq!(lines[6], "  gmv: sum(amount)");
    }

    #[test]
    fn truncation_marker_reports_exact_omitted_count() {
        let filters: Vec<FilterExpression> = (0..8)
            .map(|i| {
                filter(
                    &format!("col_{}", i),
                    FilterOperator::Gt,
                    FilterValue::Number(i as f64),
                )
            })
            .collect();

        let config = TableSkillConfig {
            default_filters: filters,
            ..empty_table()
        };

        let digest = build_table_digest("orders", &config, &DigestOptions::default());
        assert!(digest.contains("+3 more filters"));
        // First five filters shown, sixth onward dropped
        assert!(digest.contains("col_4 > 4"));
        assert!(!digest.contains("col_5"));
    }

    #[test]
    fn metric_truncation_marker() {
        let mut metrics = BTreeMap::new();
        for i in 0..9 {
            metrics.insert(
                format!("m{}", i),
                MetricDefinition {
                    label: format!("m{}", i),
                    aggregation: Aggregation::Count,
                    column: None,
                    where_filters: Vec::new(),
                },
            );
        }

        let config = TableSkillConfig {
            metrics,
            ..empty_table()
        };

        let digest = build_table_digest("orders", &config, &DigestOptions::default());
        assert!(digest.contains("+4 more metrics"));
        assert!(digest.contains("m0: count(*)"));
    }

    #[test]
    fn hard_budget_truncates_with_bounded_slack() {
        let filters: Vec<FilterExpression> = (0..5)
            .map(|i| {
                filter(
                    &format!("column_with_a_long_name_{}", i),
                    FilterOperator::Eq,
                    FilterValue::String("a".repeat(80)),
                )
            })
            .collect();

        let config = TableSkillConfig {
            default_filters: filters,
            ..empty_table()
        };

        let options = DigestOptions {
            max_chars: 100,
            ..DigestOptions::default()
        };

        let digest = build_table_digest("orders", &config, &options);
        let chars = digest.chars().count();
        let marker_len = TRUNCATION_MARKER.chars().count();
        assert!(digest.ends_with(TRUNCATION_MARKER));
        assert_eq!(chars, 100 + marker_len);
    }

    #[test]
    fn user_digest_empty_without_config_or_table() {
        let options = DigestOptions::default();
        assert_eq!(build_user_digest(None, Some("orders"), &options), "");

        let config = UserSkillConfig {
            version: "v1".to_string(),
            tables: BTreeMap::new(),
        };
        assert_eq!(build_user_digest(Some(&config), None, &options), "");
    }

    #[test]
    fn user_digest_unknown_table_renders_header_only() {
        let config = UserSkillConfig {
            version: "v1".to_string(),
            tables: BTreeMap::new(),
        };
        let digest = build_user_digest(Some(&config), Some("orders"), &DigestOptions::default());
        assert_eq!(digest, "Active table: orders");
    }

    #[test]
    fn budget_check_against_default_limit() {
        let short = "Active table: orders";
        let check = check_digest_budget(short);
        assert!(check.within_budget);
        assert_eq!(check.limit, 1200);

        let exactly = "x".repeat(1200);
        assert!(check_digest_budget(&exactly).within_budget);

        let over = "x".repeat(1201);
        let check = check_digest_budget(&over);
        assert!(!check.within_budget);
        assert_eq!(check.chars, 1201);
    }

    #[test]
    fn stats_count_chars_and_lines() {
        let stats = digest_stats("Active table: 订单\nField mapping:");
        assert_eq!(stats.lines, 2);
        assert_eq!(stats.chars, "Active table: 订单\nField mapping:".chars().count());
    }

    #[test]
    fn cjk_budget_counts_characters_not_bytes() {
        let config = TableSkillConfig {
            default_filters: vec![filter(
                "订单状态",
                FilterOperator::Eq,
                FilterValue::String("已完成已完成已完成".to_string()),
            )],
            ..empty_table()
        };

        let options = DigestOptions {
            max_chars: 30,
            ..DigestOptions::default()
        };

        let digest = build_table_digest("订单表", &config, &options);
        assert!(digest.chars().count() <= 30 + TRUNCATION_MARKER.chars().count());
    }
}
