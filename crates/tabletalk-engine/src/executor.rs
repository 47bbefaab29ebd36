//! Query executor collaborator
//!
//! The embedded analytical database lives outside this core; tests and the
//! downstream presentation layer talk to it through this trait. The mock
//! records every statement it receives and replays canned frames.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A column descriptor in a result set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    pub name: String,

    pub data_type: String,
}

impl FieldInfo {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }
}

/// Ordered rows plus their schema, as returned by the data engine
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultSet {
    /// Row objects in result order
    pub data: Vec<Value>,

    /// Ordered output columns
    pub schema: Vec<FieldInfo>,
}

/// Errors from executing a statement
#[derive(Debug, Clone, thiserror::Error)]
pub enum ExecuteError {
    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Engine unavailable: {0}")]
    EngineUnavailable(String),
}

/// Trait for the embedded query engine collaborator
#[async_trait::async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Get the executor name (e.g. "Mock")
    fn name(&self) -> &'static str;

    /// Execute a statement and return its result set
    async fn execute(&self, sql: &str) -> Result<ResultSet, ExecuteError>;
}

/// In-memory executor for tests
///
/// Returns a canned result for statements containing a configured substring
/// and records every statement it sees.
pub struct MockExecutor {
    /// Canned results: sql substring -> result set
    results: Arc<RwLock<HashMap<String, ResultSet>>>,

    /// Statements received, in call order
    executed: Arc<RwLock<Vec<String>>>,

    /// Fail every call with this error
    failure: Option<ExecuteError>,
}

impl MockExecutor {
    pub fn new() -> Self {
        Self {
            results: Arc::new(RwLock::new(HashMap::new())),
            executed: Arc::new(RwLock::new(Vec::new())),
            failure: None,
        }
    }

    /// Return `result` for statements containing `needle`
    pub async fn add_result(&self, needle: impl Into<String>, result: ResultSet) {
        self.results.write().await.insert(needle.into(), result);
    }

    /// Make every call fail
    pub fn with_failure(mut self, error: ExecuteError) -> Self {
        self.failure = Some(error);
        self
    }

    /// Statements executed so far
    pub async fn executed(&self) -> Vec<String> {
        self.executed.read().await.clone()
    }
}

impl Default for MockExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl QueryExecutor for MockExecutor {
    fn name(&self) -> &'static str {
        "Mock"
    }

    async fn execute(&self, sql: &str) -> Result<ResultSet, ExecuteError> {
        self.executed.write().await.push(sql.to_string());

        if let Some(error) = &self.failure {
            return Err(error.clone());
        }

        let results = self.results.read().await;
        for (needle, result) in results.iter() {
            if sql.contains(needle.as_str()) {
                return Ok(result.clone());
            }
        }

        Ok(ResultSet::default())
    }
}
