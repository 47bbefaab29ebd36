//! Compilation pipeline
//!
//! Stages: classify the question, resolve the semantic fields the archetype
//! needs, build the query shape, assemble the statement with the table's
//! default filters injected. Every stage is pure computation over the
//! per-request context; only the optional model fallback suspends, and that
//! call is bounded by the settings timeout.

use std::time::Duration;
use tabletalk_core::archetype::QueryArchetype;
use tabletalk_core::config::{Aggregation, FieldMapping, FieldRole, UserSkillConfig};
use tabletalk_core::schema::TableSchema;
use tabletalk_core::settings::Settings;
use tabletalk_llm::ModelClient;
use tabletalk_nlq::classifier::{is_distribution_question, Classifier};
use tabletalk_nlq::resolver::{
    guess_dimension, parse_granularity, resolve_field, FieldResolution, TimeGranularity,
};
use tabletalk_skill::digest::{build_user_digest, DigestOptions};
use tabletalk_sqlgen::{assemble, AggregateExpr, BucketGranularity, QueryPlan, QueryShape};

/// Per-request compilation context
///
/// Configuration is borrowed read-only; nothing here outlives the request.
pub struct SkillContext<'a> {
    /// The user's question, verbatim
    pub question: &'a str,

    /// Currently selected table, if any
    pub active_table: Option<&'a str>,

    /// Validated skill configuration, if the user has one
    pub config: Option<&'a UserSkillConfig>,

    /// Live schema of the active table, if known
    pub table_schema: Option<&'a TableSchema>,

    /// Model client for the classification fallback, if configured
    pub model: Option<&'a dyn ModelClient>,
}

impl<'a> SkillContext<'a> {
    /// Create a context with just a question
    pub fn new(question: &'a str) -> Self {
        Self {
            question,
            active_table: None,
            config: None,
            table_schema: None,
            model: None,
        }
    }

    pub fn with_table(mut self, table: &'a str) -> Self {
        self.active_table = Some(table);
        self
    }

    pub fn with_config(mut self, config: &'a UserSkillConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_schema(mut self, schema: &'a TableSchema) -> Self {
        self.table_schema = Some(schema);
        self
    }

    pub fn with_model(mut self, model: &'a dyn ModelClient) -> Self {
        self.model = Some(model);
        self
    }
}

/// Result of compiling a question
#[derive(Debug, Clone, PartialEq)]
pub enum CompileOutcome {
    /// A plan was assembled
    Success(QueryPlan),

    /// A required field could not be resolved; ask the user
    NeedClarification { message: String },

    /// Internal inconsistency; should not occur when earlier stages are correct
    Error { message: String },
}

impl CompileOutcome {
    /// The plan, if compilation succeeded
    pub fn plan(&self) -> Option<&QueryPlan> {
        match self {
            Self::Success(plan) => Some(plan),
            _ => None,
        }
    }
}

/// The skill compilation engine
pub struct SkillEngine {
    settings: Settings,
    classifier: Classifier,
}

impl SkillEngine {
    pub fn new(settings: Settings) -> Self {
        let classifier = Classifier::new(
            settings.confidence_threshold,
            Duration::from_millis(settings.model_timeout_ms),
        );
        Self {
            settings,
            classifier,
        }
    }

    /// Compile a question into a query plan.
    ///
    /// Resolution failures short-circuit to `NeedClarification`; assembler
    /// inconsistencies surface as `Error`. Validator rejections never reach
    /// this point because only trusted configs are accepted.
    pub async fn compile(&self, ctx: &SkillContext<'_>) -> CompileOutcome {
        let table_name = ctx
            .active_table
            .or_else(|| ctx.table_schema.map(|s| s.name.as_str()));

        let classification = self
            .classifier
            .classify(ctx.question, &self.prompt_context(ctx, table_name), ctx.model)
            .await;

        tracing::debug!(
            archetype = %classification.archetype,
            confidence = classification.confidence,
            table = table_name.unwrap_or("<none>"),
            "question classified"
        );

        let table_config = ctx
            .config
            .zip(table_name)
            .and_then(|(config, name)| config.table(name));
        let mapping = table_config.and_then(|t| t.field_mapping.as_ref());
        let columns: Vec<String> = ctx
            .table_schema
            .map(|s| s.column_names())
            .unwrap_or_default();

        let shape = match self.build_shape(ctx, classification.archetype, mapping, &columns) {
            Ok(shape) => shape,
            Err(message) => {
                tracing::debug!(%message, "compilation needs clarification");
                return CompileOutcome::NeedClarification { message };
            }
        };

        let default_filters = table_config
            .map(|t| t.default_filters.as_slice())
            .unwrap_or(&[]);

        match assemble(&shape, table_name, default_filters) {
            Ok(plan) => CompileOutcome::Success(plan),
            Err(error) => {
                tracing::error!(%error, "assembly inconsistency");
                CompileOutcome::Error {
                    message: error.to_string(),
                }
            }
        }
    }

    /// Schema hints plus the skill digest, for the model fallback prompt
    fn prompt_context(&self, ctx: &SkillContext<'_>, table_name: Option<&str>) -> String {
        let options = DigestOptions {
            max_filters: self.settings.digest.max_filters,
            max_metrics: self.settings.digest.max_metrics,
            max_chars: self.settings.digest.max_chars,
        };
        let digest = build_user_digest(ctx.config, table_name, &options);
        match ctx.table_schema {
            Some(schema) if digest.is_empty() => format!("Table: {}", schema.summary()),
            Some(schema) => format!("Table: {}\n{}", schema.summary(), digest),
            None => digest,
        }
    }

    fn build_shape(
        &self,
        ctx: &SkillContext<'_>,
        archetype: QueryArchetype,
        mapping: Option<&FieldMapping>,
        columns: &[String],
    ) -> Result<QueryShape, String> {
        match archetype {
            QueryArchetype::KpiSingle => {
                if is_distribution_question(ctx.question) {
                    let amount = self.require_field(FieldRole::Amount, mapping, columns)?;
                    return Ok(QueryShape::Distribution {
                        amount_column: amount,
                    });
                }
                let aggregate = self.pick_aggregate(ctx.question, mapping, columns)?;
                Ok(QueryShape::KpiSingle { aggregate })
            }
            QueryArchetype::KpiGrouped => {
                let aggregate = self.pick_aggregate(ctx.question, mapping, columns)?;
                let dimension = guess_dimension(ctx.question, columns)
                    .ok_or_else(|| clarification_message("grouping field"))?;
                Ok(QueryShape::KpiGrouped {
                    aggregate,
                    dimension,
                })
            }
            QueryArchetype::TrendTime => {
                let time_column = self.require_field(FieldRole::Time, mapping, columns)?;
                let aggregate = self.pick_aggregate(ctx.question, mapping, columns)?;
                let granularity = match parse_granularity(ctx.question) {
                    TimeGranularity::Day => BucketGranularity::Day,
                    TimeGranularity::Week => BucketGranularity::Week,
                    TimeGranularity::Month => BucketGranularity::Month,
                };
                Ok(QueryShape::TrendTime {
                    aggregate,
                    time_column,
                    granularity,
                })
            }
            QueryArchetype::Preview => Ok(QueryShape::Preview {
                row_cap: self.settings.row_cap,
            }),
        }
    }

    /// Resolve a role the archetype cannot do without; a miss is a
    /// clarification, never a guess.
    fn require_field(
        &self,
        role: FieldRole,
        mapping: Option<&FieldMapping>,
        columns: &[String],
    ) -> Result<String, String> {
        match resolve_field(role, mapping, columns) {
            FieldResolution::Resolved(column) => Ok(column),
            FieldResolution::NeedsClarification { hint, .. } => {
                Err(clarification_message(&hint))
            }
        }
    }

    /// Choose the aggregate from the question's wording. Plain counting is
    /// the default; sum/average wording requires a resolvable amount column.
    fn pick_aggregate(
        &self,
        question: &str,
        mapping: Option<&FieldMapping>,
        columns: &[String],
    ) -> Result<AggregateExpr, String> {
        let question = question.to_lowercase();

        let avg_cues = ["平均", "average", "avg", "mean"];
        let sum_cues = ["总和", "合计", "总金额", "销售额", "总收入", "sum", "revenue"];

        let aggregation = if avg_cues.iter().any(|cue| question.contains(cue)) {
            Some(Aggregation::Avg)
        } else if sum_cues.iter().any(|cue| question.contains(cue)) {
            Some(Aggregation::Sum)
        } else {
            None
        };

        match aggregation {
            Some(aggregation) => {
                let amount = self.require_field(FieldRole::Amount, mapping, columns)?;
                Ok(AggregateExpr::over(aggregation, amount))
            }
            None => Ok(AggregateExpr::count()),
        }
    }
}

fn clarification_message(hint: &str) -> String {
    format!(
        "Could not determine the {} for this question; please set it in the table settings.",
        hint
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tabletalk_core::schema::ColumnInfo;

    fn orders_schema() -> TableSchema {
        TableSchema::new(
            "orders",
            vec![
                ColumnInfo::new("id", "BIGINT"),
                ColumnInfo::new("status", "VARCHAR"),
                ColumnInfo::new("amount", "DOUBLE"),
                ColumnInfo::new("order_time", "TIMESTAMP"),
            ],
        )
    }

    #[tokio::test]
    async fn count_question_compiles_to_count_star() {
        let engine = SkillEngine::new(Settings::default());
        let schema = orders_schema();
        let ctx = SkillContext::new("统计订单总数是多少").with_schema(&schema);

        let outcome = engine.compile(&ctx).await;
        let plan = outcome.plan().expect("expected a plan");

        assert_eq!(plan.archetype, QueryArchetype::KpiSingle);
        assert!(plan.sql.contains("COUNT(*)"));
        assert!(plan.sql.contains("FROM orders"));
    }

    #[tokio::test]
    async fn trend_question_without_time_column_needs_clarification() {
        let engine = SkillEngine::new(Settings::default());
        // Table: orders (id, amount) - no time-like column
        let schema = TableSchema::new(
            "orders",
            vec![
                ColumnInfo::new("id", "BIGINT"),
                ColumnInfo::new("amount", "DOUBLE"),
            ],
        );
        let ctx = SkillContext::new("显示订单按天趋势").with_schema(&schema);

        match engine.compile(&ctx).await {
            CompileOutcome::NeedClarification { message } => {
                assert!(message.contains("time field"));
            }
            other => panic!("expected clarification, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn preview_question_gets_row_cap() {
        let engine = SkillEngine::new(Settings::default());
        let schema = orders_schema();
        let ctx = SkillContext::new("订单").with_schema(&schema);

        let outcome = engine.compile(&ctx).await;
        let plan = outcome.plan().expect("expected a plan");

        assert_eq!(plan.archetype, QueryArchetype::Preview);
        assert_eq!(plan.row_cap, Some(200));
        assert!(plan.sql.ends_with("LIMIT 200"));
    }

    #[tokio::test]
    async fn distribution_question_compiles_to_avg_and_median() {
        let engine = SkillEngine::new(Settings::default());
        let schema = orders_schema();
        let ctx = SkillContext::new("金额分布如何").with_schema(&schema);

        let outcome = engine.compile(&ctx).await;
        let plan = outcome.plan().expect("expected a plan");

        assert!(plan.sql.contains("AVG(amount)"));
        assert!(plan.sql.contains("MEDIAN(amount)"));
    }

    #[tokio::test]
    async fn active_table_overrides_schema_name() {
        let engine = SkillEngine::new(Settings::default());
        let schema = orders_schema();
        let ctx = SkillContext::new("统计订单总数")
            .with_table("sales_orders")
            .with_schema(&schema);

        let outcome = engine.compile(&ctx).await;
        let plan = outcome.plan().expect("expected a plan");
        assert!(plan.sql.contains("FROM sales_orders"));
    }

    #[tokio::test]
    async fn no_table_at_all_uses_fallback_identifier() {
        let engine = SkillEngine::new(Settings::default());
        let ctx = SkillContext::new("统计总数");

        let outcome = engine.compile(&ctx).await;
        let plan = outcome.plan().expect("expected a plan");
        assert!(plan.sql.contains("FROM current_table"));
    }
}
