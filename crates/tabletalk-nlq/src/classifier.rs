//! Query type classification
//!
//! A deterministic keyword pass handles the common cases without any network
//! call; only low-confidence questions are deferred to the model client, and
//! that call is bounded by a timeout with the rule guess as the fallback.
//! Classification uncertainty is never surfaced as an error.

use std::time::Duration;
use tabletalk_core::archetype::QueryArchetype;
use tabletalk_llm::ModelClient;

/// Confidence assigned when a specific cue (trend, grouping) fires
const CONFIDENCE_SPECIFIC: f32 = 0.9;

/// Confidence for grouping cues without an aggregation cue
const CONFIDENCE_GROUP_ONLY: f32 = 0.65;

/// Confidence for aggregation cues alone
const CONFIDENCE_AGGREGATE: f32 = 0.75;

/// Confidence when no cue matches at all
const CONFIDENCE_NONE: f32 = 0.2;

/// Confidence assigned to an archetype returned by the model fallback
const CONFIDENCE_MODEL: f32 = 0.8;

/// Time-series cues. Checked first: the more specific archetype wins when
/// several cue families are present (e.g. "按天" also contains the grouping
/// cue "按").
const TREND_CUES: &[&str] = &[
    "趋势", "走势", "按天", "按日", "按周", "按月", "每天", "每日", "每周", "每月",
    "trend", "over time", "time series", "daily", "weekly", "monthly",
    "per day", "per week", "per month", "by day", "by week", "by month",
];

/// Grouping cues
const GROUP_CUES: &[&str] = &[
    "按", "每个", "各个", "分组", "分别", "group", "breakdown", "break down",
    " by ", "per ", "each ",
];

/// Aggregation cues
const AGG_CUES: &[&str] = &[
    "总数", "多少", "统计", "合计", "总和", "总共", "数量", "平均", "最大", "最小",
    "count", "total", "sum", "average", "avg", "how many", "number of",
    "max", "min",
];

/// Distribution cues (a kpi_single refinement handled by the assembler)
const DIST_CUES: &[&str] = &["分布", "distribution"];

/// A classified question
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub archetype: QueryArchetype,

    /// 0.0..=1.0; below the engine threshold the model fallback is consulted
    pub confidence: f32,
}

/// Deterministic keyword classifier (no IO)
pub struct RuleClassifier;

impl RuleClassifier {
    /// Classify a question from lexical cues alone.
    ///
    /// Tie-break: trend and grouping cues take precedence over plain
    /// aggregation cues, since they name the more specific archetype.
    pub fn classify(question: &str) -> Classification {
        let question = question.to_lowercase();

        if contains_any(&question, TREND_CUES) {
            return Classification {
                archetype: QueryArchetype::TrendTime,
                confidence: CONFIDENCE_SPECIFIC,
            };
        }

        let has_agg = contains_any(&question, AGG_CUES) || contains_any(&question, DIST_CUES);

        if contains_any(&question, GROUP_CUES) {
            return Classification {
                archetype: QueryArchetype::KpiGrouped,
                confidence: if has_agg {
                    CONFIDENCE_SPECIFIC
                } else {
                    CONFIDENCE_GROUP_ONLY
                },
            };
        }

        if has_agg {
            return Classification {
                archetype: QueryArchetype::KpiSingle,
                confidence: CONFIDENCE_AGGREGATE,
            };
        }

        Classification {
            archetype: QueryArchetype::Preview,
            confidence: CONFIDENCE_NONE,
        }
    }
}

/// Whether the question asks for a distribution (average/median shape)
pub fn is_distribution_question(question: &str) -> bool {
    contains_any(&question.to_lowercase(), DIST_CUES)
}

fn contains_any(question: &str, cues: &[&str]) -> bool {
    cues.iter().any(|cue| question.contains(cue))
}

/// Two-tier classifier: rule pass first, model fallback on low confidence
pub struct Classifier {
    confidence_threshold: f32,
    model_timeout: Duration,
}

impl Classifier {
    pub fn new(confidence_threshold: f32, model_timeout: Duration) -> Self {
        Self {
            confidence_threshold,
            model_timeout,
        }
    }

    /// Classify a question, consulting the model client only when the rule
    /// pass is below the confidence threshold.
    ///
    /// The model call is awaited under the configured timeout; timeout,
    /// transport failure, and unknown archetype tags all fall back to the
    /// rule guess.
    pub async fn classify(
        &self,
        question: &str,
        context: &str,
        model: Option<&dyn ModelClient>,
    ) -> Classification {
        let rule = RuleClassifier::classify(question);
        if rule.confidence >= self.confidence_threshold {
            tracing::debug!(
                archetype = %rule.archetype,
                confidence = rule.confidence,
                "rule classifier confident"
            );
            return rule;
        }

        let Some(model) = model else {
            return rule;
        };

        match tokio::time::timeout(self.model_timeout, model.classify(question, context)).await {
            Ok(Ok(tag)) => match QueryArchetype::parse(&tag) {
                Some(archetype) => {
                    tracing::debug!(%archetype, client = model.name(), "model fallback classified");
                    Classification {
                        archetype,
                        confidence: CONFIDENCE_MODEL,
                    }
                }
                None => {
                    tracing::warn!(tag, "model returned unknown archetype tag, keeping rule guess");
                    rule
                }
            },
            Ok(Err(error)) => {
                tracing::warn!(%error, "model fallback failed, keeping rule guess");
                rule
            }
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.model_timeout.as_millis() as u64,
                    "model fallback timed out, keeping rule guess"
                );
                rule
            }
        }
    }
}
