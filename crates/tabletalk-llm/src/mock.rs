//! Mock model client for testing
//!
//! Returns scripted classifications without any network call. Useful for:
//! - Unit testing the classifier fallback path
//! - Simulating slow or failing providers (timeout handling)
//! - Running the full pipeline deterministically in CI

use crate::{ModelClient, ModelError};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Mock model client with scripted answers
///
/// Answers are keyed by a substring of the question; the first configured
/// key contained in the question wins, otherwise the default answer (if any)
/// is returned.
pub struct MockModelClient {
    /// Scripted answers: question substring -> archetype tag
    answers: Arc<RwLock<HashMap<String, String>>>,

    /// Answer returned when no scripted key matches
    default_answer: Option<String>,

    /// Error returned instead of any answer
    failure: Option<ModelError>,

    /// Simulated latency in milliseconds
    latency_ms: u64,
}

impl MockModelClient {
    /// Create a mock with no scripted answers
    pub fn new() -> Self {
        Self {
            answers: Arc::new(RwLock::new(HashMap::new())),
            default_answer: None,
            failure: None,
            latency_ms: 0,
        }
    }

    /// Script an answer for questions containing `needle`
    pub async fn add_answer(&self, needle: impl Into<String>, archetype: impl Into<String>) {
        self.answers
            .write()
            .await
            .insert(needle.into(), archetype.into());
    }

    /// Set the answer used when no scripted key matches
    pub fn with_default_answer(mut self, archetype: impl Into<String>) -> Self {
        self.default_answer = Some(archetype.into());
        self
    }

    /// Make every call fail with the given error
    pub fn with_failure(mut self, error: ModelError) -> Self {
        self.failure = Some(error);
        self
    }

    /// Simulate latency before responding
    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    async fn simulate_latency(&self) {
        if self.latency_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.latency_ms)).await;
        }
    }
}

impl Default for MockModelClient {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MockModelClient {
    fn clone(&self) -> Self {
        Self {
            answers: Arc::clone(&self.answers),
            default_answer: self.default_answer.clone(),
            failure: self.failure.clone(),
            latency_ms: self.latency_ms,
        }
    }
}

#[async_trait::async_trait]
impl ModelClient for MockModelClient {
    fn name(&self) -> &'static str {
        "Mock"
    }

    async fn classify(&self, question: &str, _context: &str) -> Result<String, ModelError> {
        self.simulate_latency().await;

        if let Some(error) = &self.failure {
            return Err(error.clone());
        }

        let answers = self.answers.read().await;
        for (needle, archetype) in answers.iter() {
            if question.contains(needle.as_str()) {
                return Ok(archetype.clone());
            }
        }

        self.default_answer
            .clone()
            .ok_or_else(|| ModelError::InvalidResponse("no scripted answer".to_string()))
    }
}

/// Builder for a mock client with several scripted answers
pub struct MockModelClientBuilder {
    answers: HashMap<String, String>,
    default_answer: Option<String>,
    failure: Option<ModelError>,
    latency_ms: u64,
}

impl MockModelClientBuilder {
    pub fn new() -> Self {
        Self {
            answers: HashMap::new(),
            default_answer: None,
            failure: None,
            latency_ms: 0,
        }
    }

    /// Script an answer for questions containing `needle`
    pub fn with_answer(mut self, needle: impl Into<String>, archetype: impl Into<String>) -> Self {
        self.answers.insert(needle.into(), archetype.into());
        self
    }

    pub fn with_default_answer(mut self, archetype: impl Into<String>) -> Self {
        self.default_answer = Some(archetype.into());
        self
    }

    pub fn with_failure(mut self, error: ModelError) -> Self {
        self.failure = Some(error);
        self
    }

    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    pub fn build(self) -> MockModelClient {
        MockModelClient {
            answers: Arc::new(RwLock::new(self.answers)),
            default_answer: self.default_answer,
            failure: self.failure,
            latency_ms: self.latency_ms,
        }
    }
}

impl Default for MockModelClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_answer_by_substring() {
        let client = MockModelClient::new();
        client.add_answer("趋势", "trend_time").await;

        let answer = client.classify("显示订单按天趋势", "").await.unwrap();
        assert_eq!(answer, "trend_time");
    }

    #[tokio::test]
    async fn default_answer_when_no_match() {
        let client = MockModelClient::new().with_default_answer("kpi_single");

        let answer = client.classify("anything", "").await.unwrap();
        assert_eq!(answer, "kpi_single");
    }

    #[tokio::test]
    async fn no_answer_is_invalid_response() {
        let client = MockModelClient::new();
        let result = client.classify("anything", "").await;
        assert!(matches!(result, Err(ModelError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn scripted_failure() {
        let client =
            MockModelClient::new().with_failure(ModelError::Transport("boom".to_string()));

        let result = client.classify("anything", "").await;
        assert!(matches!(result, Err(ModelError::Transport(_))));
    }

    #[tokio::test]
    async fn builder_scripts_multiple_answers() {
        let client = MockModelClientBuilder::new()
            .with_answer("trend", "trend_time")
            .with_answer("group", "kpi_grouped")
            .build();

        assert_eq!(client.classify("show trend", "").await.unwrap(), "trend_time");
        assert_eq!(
            client.classify("group by region", "").await.unwrap(),
            "kpi_grouped"
        );
    }

    #[tokio::test]
    async fn shared_state_across_clones() {
        let client = MockModelClient::new();
        let cloned = client.clone();
        client.add_answer("orders", "kpi_single").await;

        let answer = cloned.classify("count orders", "").await.unwrap();
        assert_eq!(answer, "kpi_single");
    }
}
