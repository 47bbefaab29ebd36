//! Security schema validation
//!
//! Converts a raw, untyped configuration object into a trusted
//! [`UserSkillConfig`]. This is the sole trust boundary in front of the SQL
//! assembler: validated identifiers are later interpolated into generated
//! statements, so the character-set and size checks here must be exhaustive.
//! All violations are collected in a single pass rather than failing fast.
//!
//! The raw wire format uses the side panel's camelCase keys
//! (`fieldMapping`, `defaultFilters`, `orderId`, ...).

use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;
use tabletalk_core::config::{
    Aggregation, FieldMapping, FilterExpression, FilterOperator, FilterValue, MetricDefinition,
    RelativeTimeSpec, TableSkillConfig, TimeDirection, TimeUnit, UserSkillConfig, CONFIG_VERSION,
};
use tabletalk_core::diagnostic::{ValidationCode, ValidationError};
use tabletalk_core::limits;

/// Validate a raw configuration object into a trusted [`UserSkillConfig`].
///
/// Returns every violation found; a non-empty error list means nothing from
/// the input may reach the SQL-generating components.
pub fn validate(raw: &Value) -> Result<UserSkillConfig, Vec<ValidationError>> {
    let mut validator = Validator::new();
    let config = validator.validate_root(raw);

    match config {
        Some(config) if validator.errors.is_empty() => {
            tracing::debug!(tables = config.tables.len(), "config validated");
            Ok(config)
        }
        _ => {
            tracing::debug!(violations = validator.errors.len(), "config rejected");
            Err(validator.errors)
        }
    }
}

struct Validator {
    errors: Vec<ValidationError>,
    identifier: Regex,
}

impl Validator {
    fn new() -> Self {
        Self {
            errors: Vec::new(),
            // The pattern is a compile-time constant; it cannot fail to build.
            identifier: Regex::new(limits::IDENTIFIER_PATTERN)
                .unwrap_or_else(|e| unreachable!("invalid identifier pattern: {e}")),
        }
    }

    fn reject(&mut self, code: ValidationCode, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ValidationError::new(code, path, message));
    }

    fn validate_root(&mut self, raw: &Value) -> Option<UserSkillConfig> {
        let obj = match raw.as_object() {
            Some(obj) => obj,
            None => {
                self.reject(
                    ValidationCode::MalformedField,
                    "$",
                    "config must be a JSON object",
                );
                return None;
            }
        };

        match obj.get("version").and_then(Value::as_str) {
            Some(CONFIG_VERSION) => {}
            Some(other) => self.reject(
                ValidationCode::UnsupportedVersion,
                "version",
                format!("unsupported version '{}', expected '{}'", other, CONFIG_VERSION),
            ),
            None => self.reject(
                ValidationCode::UnsupportedVersion,
                "version",
                format!("missing version, expected '{}'", CONFIG_VERSION),
            ),
        }

        let mut tables = BTreeMap::new();
        match obj.get("tables") {
            Some(Value::Object(raw_tables)) => {
                if raw_tables.len() > limits::MAX_TABLES {
                    self.reject(
                        ValidationCode::TooManyTables,
                        "tables",
                        format!(
                            "{} tables exceed the maximum of {}",
                            raw_tables.len(),
                            limits::MAX_TABLES
                        ),
                    );
                }

                for (name, raw_table) in raw_tables {
                    let path = format!("tables.{}", name);
                    // Table names reach the FROM clause, same rules as columns.
                    self.check_identifier(name, &path);
                    if let Some(table) = self.validate_table(raw_table, &path) {
                        tables.insert(name.clone(), table);
                    }
                }
            }
            Some(_) => self.reject(
                ValidationCode::MalformedField,
                "tables",
                "tables must be an object",
            ),
            None => {}
        }

        Some(UserSkillConfig {
            version: CONFIG_VERSION.to_string(),
            tables,
        })
    }

    fn validate_table(&mut self, raw: &Value, path: &str) -> Option<TableSkillConfig> {
        let obj = match raw.as_object() {
            Some(obj) => obj,
            None => {
                self.reject(
                    ValidationCode::MalformedField,
                    path,
                    "table config must be an object",
                );
                return None;
            }
        };

        let industry = match obj.get("industry") {
            Some(Value::String(s)) if !s.is_empty() => {
                if s.chars().count() > limits::MAX_INDUSTRY_LEN {
                    self.reject(
                        ValidationCode::IndustryTooLong,
                        format!("{}.industry", path),
                        format!("industry exceeds {} characters", limits::MAX_INDUSTRY_LEN),
                    );
                }
                s.clone()
            }
            Some(Value::String(_)) | None => {
                self.reject(
                    ValidationCode::MissingIndustry,
                    format!("{}.industry", path),
                    "industry is required and selects the downstream skill pack",
                );
                String::new()
            }
            Some(_) => {
                self.reject(
                    ValidationCode::MalformedField,
                    format!("{}.industry", path),
                    "industry must be a string",
                );
                String::new()
            }
        };

        let field_mapping = obj
            .get("fieldMapping")
            .and_then(|raw| self.validate_field_mapping(raw, &format!("{}.fieldMapping", path)));

        let mut default_filters = Vec::new();
        match obj.get("defaultFilters") {
            Some(Value::Array(raw_filters)) => {
                if raw_filters.len() > limits::MAX_DEFAULT_FILTERS {
                    self.reject(
                        ValidationCode::TooManyDefaultFilters,
                        format!("{}.defaultFilters", path),
                        format!(
                            "{} default filters exceed the maximum of {}",
                            raw_filters.len(),
                            limits::MAX_DEFAULT_FILTERS
                        ),
                    );
                }
                for (i, raw_filter) in raw_filters.iter().enumerate() {
                    let filter_path = format!("{}.defaultFilters[{}]", path, i);
                    if let Some(filter) = self.validate_filter(raw_filter, &filter_path) {
                        default_filters.push(filter);
                    }
                }
            }
            Some(_) => self.reject(
                ValidationCode::MalformedField,
                format!("{}.defaultFilters", path),
                "defaultFilters must be an array",
            ),
            None => {}
        }

        let mut metrics = BTreeMap::new();
        match obj.get("metrics") {
            Some(Value::Object(raw_metrics)) => {
                if raw_metrics.len() > limits::MAX_METRICS {
                    self.reject(
                        ValidationCode::TooManyMetrics,
                        format!("{}.metrics", path),
                        format!(
                            "{} metrics exceed the maximum of {}",
                            raw_metrics.len(),
                            limits::MAX_METRICS
                        ),
                    );
                }
                for (name, raw_metric) in raw_metrics {
                    let metric_path = format!("{}.metrics.{}", path, name);
                    if let Some(metric) = self.validate_metric(name, raw_metric, &metric_path) {
                        metrics.insert(name.clone(), metric);
                    }
                }
            }
            Some(_) => self.reject(
                ValidationCode::MalformedField,
                format!("{}.metrics", path),
                "metrics must be an object",
            ),
            None => {}
        }

        Some(TableSkillConfig {
            industry,
            field_mapping,
            default_filters,
            metrics,
        })
    }

    fn validate_field_mapping(&mut self, raw: &Value, path: &str) -> Option<FieldMapping> {
        let obj = match raw.as_object() {
            Some(obj) => obj,
            None => {
                self.reject(
                    ValidationCode::MalformedField,
                    path,
                    "fieldMapping must be an object",
                );
                return None;
            }
        };

        let mut mapping = FieldMapping::default();
        for (key, slot) in [
            ("orderId", &mut mapping.order_id),
            ("userId", &mut mapping.user_id),
            ("time", &mut mapping.time),
            ("amount", &mut mapping.amount),
        ] {
            match obj.get(key) {
                Some(Value::String(column)) => {
                    self.check_identifier(column, &format!("{}.{}", path, key));
                    *slot = Some(column.clone());
                }
                Some(Value::Null) | None => {}
                Some(_) => self.reject(
                    ValidationCode::MalformedField,
                    format!("{}.{}", path, key),
                    "field mapping entries must be column-name strings",
                ),
            }
        }

        Some(mapping)
    }

    fn validate_filter(&mut self, raw: &Value, path: &str) -> Option<FilterExpression> {
        let obj = match raw.as_object() {
            Some(obj) => obj,
            None => {
                self.reject(
                    ValidationCode::MalformedField,
                    path,
                    "filter must be an object",
                );
                return None;
            }
        };

        let column = match obj.get("column") {
            Some(Value::String(column)) => {
                self.check_identifier(column, &format!("{}.column", path));
                column.clone()
            }
            _ => {
                self.reject(
                    ValidationCode::MalformedField,
                    format!("{}.column", path),
                    "filter column must be a string",
                );
                return None;
            }
        };

        let operator = match obj.get("operator").and_then(Value::as_str) {
            Some(raw_op) => match FilterOperator::parse(raw_op) {
                Some(op) => op,
                None => {
                    self.reject(
                        ValidationCode::InvalidOperator,
                        format!("{}.operator", path),
                        format!("unknown operator '{}'", raw_op),
                    );
                    return None;
                }
            },
            None => {
                self.reject(
                    ValidationCode::MalformedField,
                    format!("{}.operator", path),
                    "filter operator must be a string",
                );
                return None;
            }
        };

        let value = match obj.get("value") {
            Some(raw_value) => {
                self.validate_filter_value(operator, raw_value, &format!("{}.value", path))?
            }
            None => {
                self.reject(
                    ValidationCode::MalformedField,
                    format!("{}.value", path),
                    "filter value is required",
                );
                return None;
            }
        };

        Some(FilterExpression {
            column,
            operator,
            value,
        })
    }

    fn validate_filter_value(
        &mut self,
        operator: FilterOperator,
        raw: &Value,
        path: &str,
    ) -> Option<FilterValue> {
        // Operator/value pairing is checked both ways: a mismatch that slips
        // through here would assemble into invalid SQL.
        if operator.takes_list() && !matches!(raw, Value::Array(_)) {
            self.reject(
                ValidationCode::MalformedField,
                path,
                format!("operator '{}' requires a list value", operator),
            );
            return None;
        }
        if operator == FilterOperator::Contains
            && !matches!(raw, Value::String(_) | Value::Number(_))
        {
            self.reject(
                ValidationCode::MalformedField,
                path,
                format!("operator '{}' requires a string or number value", operator),
            );
            return None;
        }

        match raw {
            Value::Object(_) => self.validate_relative_time(raw, path).map(FilterValue::Relative),
            Value::String(s) => {
                if s.chars().count() > limits::MAX_STRING_LITERAL_LEN {
                    self.reject(
                        ValidationCode::LiteralTooLong,
                        path,
                        format!(
                            "string literal exceeds {} characters",
                            limits::MAX_STRING_LITERAL_LEN
                        ),
                    );
                    return None;
                }
                Some(FilterValue::String(s.clone()))
            }
            Value::Number(n) => n.as_f64().map(FilterValue::Number),
            Value::Bool(b) => Some(FilterValue::Bool(*b)),
            Value::Array(items) => {
                if !operator.takes_list() {
                    self.reject(
                        ValidationCode::MalformedField,
                        path,
                        format!("operator '{}' does not take a list value", operator),
                    );
                    return None;
                }
                if items.len() > limits::MAX_LIST_ELEMENTS {
                    self.reject(
                        ValidationCode::ListTooLong,
                        path,
                        format!(
                            "{} list elements exceed the maximum of {}",
                            items.len(),
                            limits::MAX_LIST_ELEMENTS
                        ),
                    );
                    return None;
                }

                let mut elements = Vec::with_capacity(items.len());
                let mut ok = true;
                for (i, item) in items.iter().enumerate() {
                    let element = match item {
                        Value::String(s) => s.clone(),
                        Value::Number(n) => n.to_string(),
                        _ => {
                            self.reject(
                                ValidationCode::MalformedField,
                                format!("{}[{}]", path, i),
                                "list elements must be strings or numbers",
                            );
                            ok = false;
                            continue;
                        }
                    };
                    if element.chars().count() > limits::MAX_LIST_ELEMENT_LEN {
                        self.reject(
                            ValidationCode::ListElementTooLong,
                            format!("{}[{}]", path, i),
                            format!(
                                "list element exceeds {} characters",
                                limits::MAX_LIST_ELEMENT_LEN
                            ),
                        );
                        ok = false;
                        continue;
                    }
                    elements.push(element);
                }

                ok.then_some(FilterValue::List(elements))
            }
            Value::Null => {
                self.reject(ValidationCode::MalformedField, path, "filter value is null");
                None
            }
        }
    }

    fn validate_relative_time(&mut self, raw: &Value, path: &str) -> Option<RelativeTimeSpec> {
        let obj = raw.as_object()?;

        let unit = match obj.get("unit").and_then(Value::as_str).and_then(TimeUnit::parse) {
            Some(unit) => unit,
            None => {
                self.reject(
                    ValidationCode::InvalidRelativeTime,
                    path,
                    "relative time unit must be one of day, week, month, year",
                );
                return None;
            }
        };

        let amount = match obj.get("amount").and_then(Value::as_u64) {
            Some(amount) if amount >= 1 && amount <= limits::MAX_RELATIVE_AMOUNT as u64 => {
                amount as u32
            }
            _ => {
                self.reject(
                    ValidationCode::InvalidRelativeTime,
                    path,
                    format!(
                        "relative time amount must be a positive integer <= {}",
                        limits::MAX_RELATIVE_AMOUNT
                    ),
                );
                return None;
            }
        };

        let direction = match obj.get("direction").and_then(Value::as_str) {
            Some("past") => TimeDirection::Past,
            Some("future") => TimeDirection::Future,
            _ => {
                self.reject(
                    ValidationCode::InvalidRelativeTime,
                    path,
                    "relative time direction must be 'past' or 'future'",
                );
                return None;
            }
        };

        Some(RelativeTimeSpec {
            unit,
            amount,
            direction,
        })
    }

    fn validate_metric(&mut self, name: &str, raw: &Value, path: &str) -> Option<MetricDefinition> {
        let obj = match raw.as_object() {
            Some(obj) => obj,
            None => {
                self.reject(
                    ValidationCode::MalformedField,
                    path,
                    "metric must be an object",
                );
                return None;
            }
        };

        // Missing label falls back to the metric's map key.
        let label = match obj.get("label") {
            Some(Value::String(label)) => label.clone(),
            None => name.to_string(),
            Some(_) => {
                self.reject(
                    ValidationCode::MalformedField,
                    format!("{}.label", path),
                    "metric label must be a string",
                );
                name.to_string()
            }
        };
        if label.chars().count() > limits::MAX_LABEL_LEN {
            self.reject(
                ValidationCode::LabelTooLong,
                format!("{}.label", path),
                format!("label exceeds {} characters", limits::MAX_LABEL_LEN),
            );
        }

        let aggregation = match obj.get("aggregation").and_then(Value::as_str) {
            Some(raw_agg) => match Aggregation::parse(raw_agg) {
                Some(agg) => agg,
                None => {
                    self.reject(
                        ValidationCode::MalformedField,
                        format!("{}.aggregation", path),
                        format!("unknown aggregation '{}'", raw_agg),
                    );
                    return None;
                }
            },
            None => {
                self.reject(
                    ValidationCode::MalformedField,
                    format!("{}.aggregation", path),
                    "metric aggregation must be a string",
                );
                return None;
            }
        };

        let column = match obj.get("column") {
            Some(Value::String(column)) => {
                self.check_identifier(column, &format!("{}.column", path));
                Some(column.clone())
            }
            Some(Value::Null) | None => None,
            Some(_) => {
                self.reject(
                    ValidationCode::MalformedField,
                    format!("{}.column", path),
                    "metric column must be a string",
                );
                None
            }
        };

        if aggregation.requires_column() && column.is_none() {
            self.reject(
                ValidationCode::MissingMetricColumn,
                format!("{}.column", path),
                format!("aggregation '{}' requires a target column", aggregation),
            );
        }

        let mut where_filters = Vec::new();
        match obj.get("where") {
            Some(Value::Array(raw_filters)) => {
                if raw_filters.len() > limits::MAX_METRIC_FILTERS {
                    self.reject(
                        ValidationCode::TooManyMetricFilters,
                        format!("{}.where", path),
                        format!(
                            "{} filters exceed the maximum of {}",
                            raw_filters.len(),
                            limits::MAX_METRIC_FILTERS
                        ),
                    );
                }
                for (i, raw_filter) in raw_filters.iter().enumerate() {
                    let filter_path = format!("{}.where[{}]", path, i);
                    if let Some(filter) = self.validate_filter(raw_filter, &filter_path) {
                        where_filters.push(filter);
                    }
                }
            }
            Some(_) => self.reject(
                ValidationCode::MalformedField,
                format!("{}.where", path),
                "metric where must be an array",
            ),
            None => {}
        }

        Some(MetricDefinition {
            label,
            aggregation,
            column,
            where_filters,
        })
    }

    /// Enforce the identifier lexical rule: ASCII word characters plus CJK
    /// ideographs, at most [`limits::MAX_COLUMN_NAME_LEN`] characters.
    fn check_identifier(&mut self, name: &str, path: &str) {
        if name.chars().count() > limits::MAX_COLUMN_NAME_LEN {
            self.reject(
                ValidationCode::ColumnNameTooLong,
                path,
                format!(
                    "identifier exceeds {} characters",
                    limits::MAX_COLUMN_NAME_LEN
                ),
            );
            return;
        }
        if !self.identifier.is_match(name) {
            self.reject(
                ValidationCode::InvalidColumnName,
                path,
                format!("identifier '{}' contains forbidden characters", name),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tabletalk_core::config::FieldRole;

    fn codes(errors: &[ValidationError]) -> Vec<ValidationCode> {
        errors.iter().map(|e| e.code).collect()
    }

    #[test]
    fn accepts_minimal_config() {
        let raw = json!({
            "version": "v1",
            "tables": {
                "orders": { "industry": "ecommerce" }
            }
        });

        let config = validate(&raw).unwrap();
        assert_eq!(config.version, "v1");
        assert_eq!(config.tables.len(), 1);
        assert_eq!(config.table("orders").unwrap().industry, "ecommerce");
    }

    #[test]
    fn accepts_full_config() {
        let raw = json!({
            "version": "v1",
            "tables": {
                "orders": {
                    "industry": "ecommerce",
                    "fieldMapping": { "time": "order_time", "amount": "amount" },
                    "defaultFilters": [
                        { "column": "status", "operator": "=", "value": "completed" },
                        { "column": "order_time", "operator": ">=",
                          "value": { "unit": "day", "amount": 30, "direction": "past" } }
                    ],
                    "metrics": {
                        "gmv": { "label": "GMV", "aggregation": "sum", "column": "amount" },
                        "orders": { "aggregation": "count" }
                    }
                }
            }
        });

        let config = validate(&raw).unwrap();
        let table = config.table("orders").unwrap();
        assert_eq!(
            table.field_mapping.as_ref().unwrap().get(FieldRole::Time),
            Some("order_time")
        );
        assert_eq!(table.default_filters.len(), 2);
        assert!(matches!(
            table.default_filters[1].value,
            FilterValue::Relative(_)
        ));
        assert_eq!(table.metrics["gmv"].aggregation, Aggregation::Sum);
        // Missing label falls back to the metric name
        assert_eq!(table.metrics["orders"].label, "orders");
    }

    #[test]
    fn accepts_cjk_column_names() {
        let raw = json!({
            "version": "v1",
            "tables": {
                "orders": {
                    "industry": "retail",
                    "defaultFilters": [
                        { "column": "订单状态", "operator": "=", "value": "已完成" }
                    ]
                }
            }
        });

        assert!(validate(&raw).is_ok());
    }

    #[test]
    fn rejects_unsupported_version() {
        let raw = json!({ "version": "v2", "tables": {} });
        let errors = validate(&raw).unwrap_err();
        assert_eq!(codes(&errors), vec![ValidationCode::UnsupportedVersion]);
    }

    #[test]
    fn rejects_injection_through_column_name() {
        let raw = json!({
            "version": "v1",
            "tables": {
                "orders": {
                    "industry": "ecommerce",
                    "defaultFilters": [
                        { "column": "col'; DROP TABLE users; --", "operator": "=", "value": "x" }
                    ]
                }
            }
        });

        let errors = validate(&raw).unwrap_err();
        assert!(codes(&errors).contains(&ValidationCode::InvalidColumnName));
    }

    #[test]
    fn rejects_oversized_string_literal() {
        let raw = json!({
            "version": "v1",
            "tables": {
                "orders": {
                    "industry": "ecommerce",
                    "defaultFilters": [
                        { "column": "note", "operator": "=", "value": "x".repeat(1001) }
                    ]
                }
            }
        });

        let errors = validate(&raw).unwrap_err();
        assert!(codes(&errors).contains(&ValidationCode::LiteralTooLong));
    }

    #[test]
    fn rejects_oversized_in_list() {
        let elements: Vec<String> = (0..1001).map(|i| i.to_string()).collect();
        let raw = json!({
            "version": "v1",
            "tables": {
                "orders": {
                    "industry": "ecommerce",
                    "defaultFilters": [
                        { "column": "status", "operator": "in", "value": elements }
                    ]
                }
            }
        });

        let errors = validate(&raw).unwrap_err();
        assert!(codes(&errors).contains(&ValidationCode::ListTooLong));
    }

    #[test]
    fn rejects_oversized_list_element() {
        let raw = json!({
            "version": "v1",
            "tables": {
                "orders": {
                    "industry": "ecommerce",
                    "defaultFilters": [
                        { "column": "status", "operator": "in", "value": ["ok", "y".repeat(501)] }
                    ]
                }
            }
        });

        let errors = validate(&raw).unwrap_err();
        assert!(codes(&errors).contains(&ValidationCode::ListElementTooLong));
    }

    #[test]
    fn rejects_too_many_tables() {
        let mut tables = serde_json::Map::new();
        for i in 0..11 {
            tables.insert(format!("table_{}", i), json!({ "industry": "retail" }));
        }
        let raw = json!({ "version": "v1", "tables": tables });

        let errors = validate(&raw).unwrap_err();
        assert!(codes(&errors).contains(&ValidationCode::TooManyTables));
    }

    #[test]
    fn rejects_too_many_default_filters() {
        let filters: Vec<Value> = (0..21)
            .map(|i| json!({ "column": format!("c{}", i), "operator": "=", "value": 1 }))
            .collect();
        let raw = json!({
            "version": "v1",
            "tables": { "orders": { "industry": "retail", "defaultFilters": filters } }
        });

        let errors = validate(&raw).unwrap_err();
        assert!(codes(&errors).contains(&ValidationCode::TooManyDefaultFilters));
    }

    #[test]
    fn rejects_too_many_metrics() {
        let mut metrics = serde_json::Map::new();
        for i in 0..51 {
            metrics.insert(format!("m{}", i), json!({ "aggregation": "count" }));
        }
        let raw = json!({
            "version": "v1",
            "tables": { "orders": { "industry": "retail", "metrics": metrics } }
        });

        let errors = validate(&raw).unwrap_err();
        assert!(codes(&errors).contains(&ValidationCode::TooManyMetrics));
    }

    #[test]
    fn rejects_too_many_metric_filters() {
        let filters: Vec<Value> = (0..11)
            .map(|i| json!({ "column": format!("c{}", i), "operator": "=", "value": 1 }))
            .collect();
        let raw = json!({
            "version": "v1",
            "tables": {
                "orders": {
                    "industry": "retail",
                    "metrics": {
                        "m": { "aggregation": "count", "where": filters }
                    }
                }
            }
        });

        let errors = validate(&raw).unwrap_err();
        assert!(codes(&errors).contains(&ValidationCode::TooManyMetricFilters));
    }

    #[test]
    fn rejects_sum_without_column() {
        let raw = json!({
            "version": "v1",
            "tables": {
                "orders": {
                    "industry": "retail",
                    "metrics": { "total": { "aggregation": "sum" } }
                }
            }
        });

        let errors = validate(&raw).unwrap_err();
        assert!(codes(&errors).contains(&ValidationCode::MissingMetricColumn));
    }

    #[test]
    fn rejects_missing_industry() {
        let raw = json!({ "version": "v1", "tables": { "orders": {} } });
        let errors = validate(&raw).unwrap_err();
        assert!(codes(&errors).contains(&ValidationCode::MissingIndustry));
    }

    #[test]
    fn rejects_relative_time_out_of_range() {
        let raw = json!({
            "version": "v1",
            "tables": {
                "orders": {
                    "industry": "retail",
                    "defaultFilters": [
                        { "column": "t", "operator": ">=",
                          "value": { "unit": "day", "amount": 3651, "direction": "past" } }
                    ]
                }
            }
        });

        let errors = validate(&raw).unwrap_err();
        assert!(codes(&errors).contains(&ValidationCode::InvalidRelativeTime));
    }

    #[test]
    fn collects_all_violations_in_one_pass() {
        let raw = json!({
            "version": "v3",
            "tables": {
                "orders": {
                    "defaultFilters": [
                        { "column": "bad-name", "operator": "~", "value": "x" }
                    ],
                    "metrics": { "total": { "aggregation": "avg" } }
                }
            }
        });

        let errors = validate(&raw).unwrap_err();
        let codes = codes(&errors);
        assert!(codes.contains(&ValidationCode::UnsupportedVersion));
        assert!(codes.contains(&ValidationCode::MissingIndustry));
        assert!(codes.contains(&ValidationCode::InvalidColumnName));
        assert!(codes.contains(&ValidationCode::InvalidOperator));
        assert!(codes.contains(&ValidationCode::MissingMetricColumn));
        assert!(errors.len() >= 5);
    }

    #[test]
    fn rejects_list_for_scalar_operator() {
        let raw = json!({
            "version": "v1",
            "tables": {
                "orders": {
                    "industry": "retail",
                    "defaultFilters": [
                        { "column": "status", "operator": "=", "value": ["a", "b"] }
                    ]
                }
            }
        });

        let errors = validate(&raw).unwrap_err();
        assert!(codes(&errors).contains(&ValidationCode::MalformedField));
    }

    #[test]
    fn rejects_scalar_for_list_operator() {
        // An `in` with a scalar would render as `status IN 'completed'`,
        // which is not valid SQL; it must never survive validation.
        for value in [json!("completed"), json!(42), json!(true)] {
            let raw = json!({
                "version": "v1",
                "tables": {
                    "orders": {
                        "industry": "retail",
                        "defaultFilters": [
                            { "column": "status", "operator": "in", "value": value }
                        ]
                    }
                }
            });

            let errors = validate(&raw).unwrap_err();
            assert!(
                codes(&errors).contains(&ValidationCode::MalformedField),
                "scalar value for 'in' must be rejected"
            );
        }
    }

    #[test]
    fn rejects_non_scalar_for_contains() {
        let raw = json!({
            "version": "v1",
            "tables": {
                "orders": {
                    "industry": "retail",
                    "defaultFilters": [
                        { "column": "note", "operator": "contains",
                          "value": { "unit": "day", "amount": 7, "direction": "past" } }
                    ]
                }
            }
        });

        let errors = validate(&raw).unwrap_err();
        assert!(codes(&errors).contains(&ValidationCode::MalformedField));
    }
}
