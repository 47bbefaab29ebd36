//! Literal and filter rendering
//!
//! Literals are quoted per their runtime type; identifiers are never quoted
//! because the validator already restricted them to a safe character set.

use tabletalk_core::config::{
    FilterExpression, FilterOperator, FilterValue, RelativeTimeSpec, TimeDirection,
};

use crate::assembler::AssemblyError;

/// Render a scalar literal for interpolation into SQL
pub fn render_literal(value: &FilterValue) -> Result<String, AssemblyError> {
    match value {
        FilterValue::String(s) => Ok(quote(s)),
        FilterValue::Number(n) => Ok(render_number(*n)),
        FilterValue::Bool(b) => Ok(if *b { "TRUE" } else { "FALSE" }.to_string()),
        FilterValue::List(items) => {
            if items.is_empty() {
                return Err(AssemblyError::EmptyListLiteral);
            }
            let quoted: Vec<String> = items.iter().map(|s| quote(s)).collect();
            Ok(format!("({})", quoted.join(", ")))
        }
        FilterValue::Relative(spec) => Ok(render_relative(spec)),
    }
}

/// Render one filter as `column operator literal`
pub fn render_filter(filter: &FilterExpression) -> Result<String, AssemblyError> {
    match filter.operator {
        FilterOperator::Contains => {
            let needle = match &filter.value {
                FilterValue::String(s) => s.clone(),
                FilterValue::Number(n) => render_number(*n),
                other => {
                    return Err(AssemblyError::UnsupportedValue {
                        operator: filter.operator,
                        value: format!("{:?}", other),
                    })
                }
            };
            Ok(format!("{} LIKE {}", filter.column, quote(&format!("%{}%", needle))))
        }
        op => Ok(format!(
            "{} {} {}",
            filter.column,
            op.as_sql(),
            render_literal(&filter.value)?
        )),
    }
}

/// Conjoin default filters into a WHERE clause; `None` when there are no
/// filters (never an empty WHERE).
pub fn render_where(filters: &[FilterExpression]) -> Result<Option<String>, AssemblyError> {
    if filters.is_empty() {
        return Ok(None);
    }

    let conditions: Result<Vec<String>, AssemblyError> =
        filters.iter().map(render_filter).collect();

    Ok(Some(format!("WHERE {}", conditions?.join(" AND "))))
}

fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

fn render_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Render a relative time spec as date arithmetic against the current date
fn render_relative(spec: &RelativeTimeSpec) -> String {
    let sign = match spec.direction {
        TimeDirection::Past => "-",
        TimeDirection::Future => "+",
    };
    format!(
        "CURRENT_DATE {} INTERVAL '{}' {}",
        sign,
        spec.amount,
        spec.unit.as_sql()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tabletalk_core::config::TimeUnit;

    fn filter(column: &str, operator: FilterOperator, value: FilterValue) -> FilterExpression {
        FilterExpression {
            column: column.to_string(),
            operator,
            value,
        }
    }

    #[test]
    fn string_literals_are_quoted_and_escaped() {
        let value = FilterValue::String("O'Brien".to_string());
        assert_eq!(render_literal(&value).unwrap(), "'O''Brien'");
    }

    #[test]
    fn numbers_render_without_trailing_zero() {
        assert_eq!(render_literal(&FilterValue::Number(100.0)).unwrap(), "100");
        assert_eq!(render_literal(&FilterValue::Number(99.5)).unwrap(), "99.5");
    }

    #[test]
    fn list_literals_are_parenthesized() {
        let value = FilterValue::List(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(render_literal(&value).unwrap(), "('a', 'b')");
    }

    #[test]
    fn empty_list_is_an_assembly_error() {
        let value = FilterValue::List(Vec::new());
        assert!(matches!(
            render_literal(&value),
            Err(AssemblyError::EmptyListLiteral)
        ));
    }

    #[test]
    fn contains_renders_as_like() {
        let f = filter(
            "note",
            FilterOperator::Contains,
            FilterValue::String("refund".to_string()),
        );
        assert_eq!(render_filter(&f).unwrap(), "note LIKE '%refund%'");
    }

    #[test]
    fn relative_time_renders_as_date_arithmetic() {
        let f = filter(
            "order_time",
            FilterOperator::Gte,
            FilterValue::Relative(RelativeTimeSpec {
                unit: TimeUnit::Day,
                amount: 30,
                direction: TimeDirection::Past,
            }),
        );
        assert_eq!(
            render_filter(&f).unwrap(),
            "order_time >= CURRENT_DATE - INTERVAL '30' DAY"
        );
    }

    #[test]
    fn where_clause_conjoins_filters() {
        let filters = vec![
            filter(
                "status",
                FilterOperator::Eq,
                FilterValue::String("completed".to_string()),
            ),
            filter("amount", FilterOperator::Gt, FilterValue::Number(100.0)),
        ];

        let clause = render_where(&filters).unwrap().unwrap();
        assert_eq!(clause, "WHERE status = 'completed' AND amount > 100");
    }

    #[test]
    fn no_filters_means_no_where_clause() {
        assert_eq!(render_where(&[]).unwrap(), None);
    }
}
