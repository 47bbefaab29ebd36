//! Semantic field resolution
//!
//! Determines which physical column plays which semantic role. The ladder is
//! explicit mapping first, then ranked name-pattern inference, then a typed
//! clarification outcome. Mandatory roles are never guessed past the pattern
//! tier: a failed resolution stops compilation with a clarification request
//! instead of producing a wrong query.

use tabletalk_core::config::{FieldMapping, FieldRole};

/// Outcome of resolving a role to a column
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldResolution {
    /// The role maps to this column
    Resolved(String),

    /// No mapping and no pattern matched; the engine must ask the user
    NeedsClarification {
        role: FieldRole,
        /// Human-readable hint naming the missing concept, e.g. "time field"
        hint: String,
    },
}

impl FieldResolution {
    /// The resolved column, if any
    pub fn column(&self) -> Option<&str> {
        match self {
            Self::Resolved(column) => Some(column),
            Self::NeedsClarification { .. } => None,
        }
    }
}

/// Ranked name tokens per role; earlier tokens win over later ones
fn role_patterns(role: FieldRole) -> &'static [&'static str] {
    match role {
        FieldRole::Time => &[
            "created_at", "create_time", "order_time", "time", "date", "timestamp",
            "occurred", "day", "时间", "日期",
        ],
        FieldRole::Amount => &[
            "amount", "price", "total", "revenue", "fee", "cost", "value", "金额", "价格",
        ],
        FieldRole::OrderId => &["order_id", "order_no", "orderid", "订单号", "订单"],
        FieldRole::UserId => &[
            "user_id", "customer_id", "userid", "uid", "member_id", "用户", "客户",
        ],
    }
}

/// Resolve a semantic role to a physical column.
///
/// Order: explicit mapping (used verbatim), then the ranked patterns over
/// the live column names, then clarification.
pub fn resolve_field(
    role: FieldRole,
    mapping: Option<&FieldMapping>,
    columns: &[String],
) -> FieldResolution {
    if let Some(column) = mapping.and_then(|m| m.get(role)) {
        return FieldResolution::Resolved(column.to_string());
    }

    for pattern in role_patterns(role) {
        if let Some(column) = columns
            .iter()
            .find(|c| c.to_lowercase().contains(pattern))
        {
            return FieldResolution::Resolved(column.clone());
        }
    }

    FieldResolution::NeedsClarification {
        role,
        hint: format!("{} field", role.label()),
    }
}

/// Guess the grouping dimension for a grouped-KPI question.
///
/// Prefers a column whose name appears in the question; otherwise the first
/// column that does not look like a time, amount, or id column. Dimensions
/// are a convenience slot, so a total miss here still falls back to the
/// first column rather than failing compilation.
pub fn guess_dimension(question: &str, columns: &[String]) -> Option<String> {
    let question = question.to_lowercase();

    if let Some(column) = columns
        .iter()
        .find(|c| question.contains(&c.to_lowercase()))
    {
        return Some(column.clone());
    }

    let reserved = [
        FieldRole::Time,
        FieldRole::Amount,
        FieldRole::OrderId,
        FieldRole::UserId,
    ];

    columns
        .iter()
        .find(|c| {
            let lower = c.to_lowercase();
            !reserved.iter().any(|role| {
                role_patterns(*role)
                    .iter()
                    .any(|pattern| lower.contains(pattern))
            }) && lower != "id"
        })
        .or_else(|| columns.first())
        .cloned()
}

/// Time bucket size for trend queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeGranularity {
    Day,
    Week,
    Month,
}

impl TimeGranularity {
    /// Unit string for `DATE_TRUNC`
    pub fn trunc_unit(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        }
    }
}

/// Pick the bucket size from the question's wording; the finest named
/// granularity wins and day is the default.
pub fn parse_granularity(question: &str) -> TimeGranularity {
    let question = question.to_lowercase();

    let day_cues = ["按天", "按日", "每天", "每日", "daily", "per day", "by day"];
    let week_cues = ["按周", "每周", "weekly", "per week", "by week"];
    let month_cues = ["按月", "每月", "monthly", "per month", "by month"];

    if day_cues.iter().any(|cue| question.contains(cue)) {
        TimeGranularity::Day
    } else if week_cues.iter().any(|cue| question.contains(cue)) {
        TimeGranularity::Week
    } else if month_cues.iter().any(|cue| question.contains(cue)) {
        TimeGranularity::Month
    } else {
        TimeGranularity::Day
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn explicit_mapping_wins_over_patterns() {
        let mapping = FieldMapping {
            time: Some("ts".to_string()),
            ..Default::default()
        };
        let columns = cols(&["order_time", "ts"]);

        let resolution = resolve_field(FieldRole::Time, Some(&mapping), &columns);
        assert_eq!(resolution, FieldResolution::Resolved("ts".to_string()));
    }

    #[test]
    fn pattern_inference_finds_time_column() {
        let columns = cols(&["id", "amount", "order_time"]);
        let resolution = resolve_field(FieldRole::Time, None, &columns);
        assert_eq!(resolution.column(), Some("order_time"));
    }

    #[test]
    fn pattern_rank_order_applies() {
        // "created_at" outranks a generic "date" column
        let columns = cols(&["update_date", "created_at"]);
        let resolution = resolve_field(FieldRole::Time, None, &columns);
        assert_eq!(resolution.column(), Some("created_at"));
    }

    #[test]
    fn amount_inference() {
        let columns = cols(&["id", "order_amount", "status"]);
        let resolution = resolve_field(FieldRole::Amount, None, &columns);
        assert_eq!(resolution.column(), Some("order_amount"));
    }

    #[test]
    fn cjk_column_inference() {
        let columns = cols(&["订单号", "金额", "下单时间"]);
        assert_eq!(
            resolve_field(FieldRole::Amount, None, &columns).column(),
            Some("金额")
        );
        assert_eq!(
            resolve_field(FieldRole::Time, None, &columns).column(),
            Some("下单时间")
        );
    }

    #[test]
    fn missing_time_column_needs_clarification() {
        // Table: orders (id, amount) - no time-like column
        let columns = cols(&["id", "amount"]);
        let resolution = resolve_field(FieldRole::Time, None, &columns);

        match resolution {
            FieldResolution::NeedsClarification { role, hint } => {
                assert_eq!(role, FieldRole::Time);
                assert!(hint.contains("time field"));
            }
            other => panic!("expected clarification, got {:?}", other),
        }
    }

    #[test]
    fn dimension_guess_prefers_question_mention() {
        let columns = cols(&["id", "region", "status"]);
        let dim = guess_dimension("total sales by region", &columns);
        assert_eq!(dim, Some("region".to_string()));
    }

    #[test]
    fn dimension_guess_skips_reserved_roles() {
        let columns = cols(&["id", "order_time", "amount", "category"]);
        let dim = guess_dimension("销售额分组", &columns);
        assert_eq!(dim, Some("category".to_string()));
    }

    #[test]
    fn granularity_from_question() {
        assert_eq!(parse_granularity("显示订单按天趋势"), TimeGranularity::Day);
        assert_eq!(parse_granularity("orders per week"), TimeGranularity::Week);
        assert_eq!(parse_granularity("按月统计销售额"), TimeGranularity::Month);
        assert_eq!(parse_granularity("订单趋势"), TimeGranularity::Day);
    }
}
