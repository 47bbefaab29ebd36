//! Model-client collaborator contract
//!
//! The classifier consults an external language model only when its
//! deterministic rule pass is not confident. This crate defines that narrow
//! contract plus a mock implementation for deterministic testing; no real
//! provider lives in the engine core.

pub mod mock;

pub use mock::{MockModelClient, MockModelClientBuilder};

/// Errors from a model-client call
#[derive(Debug, Clone, thiserror::Error)]
pub enum ModelError {
    #[error("Model client is disabled")]
    Disabled,

    #[error("Model call timed out")]
    Timeout,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Trait for language-model clients used by the classification fallback
///
/// Implementations must be cheap to call concurrently; the engine awaits
/// them under a bounded timeout and treats every failure as a signal to fall
/// back to the deterministic guess.
#[async_trait::async_trait]
pub trait ModelClient: Send + Sync {
    /// Get the client name (e.g. "Mock", "Disabled")
    fn name(&self) -> &'static str;

    /// Classify a question into an archetype tag.
    ///
    /// `context` carries schema hints and the active skill digest. The
    /// returned string should be one of the archetype wire tags
    /// (`kpi_single`, `kpi_grouped`, `trend_time`, `preview`); unknown tags
    /// are ignored by the caller.
    async fn classify(&self, question: &str, context: &str) -> Result<String, ModelError>;
}

/// A client that is always disabled
///
/// Used when the user has not configured a model provider; the classifier
/// then relies on the rule pass alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledClient;

#[async_trait::async_trait]
impl ModelClient for DisabledClient {
    fn name(&self) -> &'static str {
        "Disabled"
    }

    async fn classify(&self, _question: &str, _context: &str) -> Result<String, ModelError> {
        Err(ModelError::Disabled)
    }
}
