//! Error types for the CX vendor survey.

use std::time::Duration;

/// Errors that end an interactive session.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Workflow error: {0}")]
    Workflow(#[from] WorkflowError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// LLM provider errors.
///
/// Every variant is folded into a `NeedsRevision` verdict by the judge, so
/// the `Display` text is what the respondent ends up reading.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Authentication failed for provider {provider}: {reason}")]
    AuthFailed { provider: String, reason: String },

    #[error("Provider {provider} rate limited: {reason}")]
    RateLimited { provider: String, reason: String },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("Provider {provider} timed out after {timeout:?}")]
    Timeout { provider: String, timeout: Duration },
}

/// Answer-acceptance workflow errors.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// Submission after completion, or for a question other than the cursor.
    #[error("Invalid transition: {reason}")]
    InvalidTransition { reason: String },

    #[error("Question already answered: {question}")]
    AlreadyAnswered { question: String },

    #[error("Export failed: {0}")]
    Export(#[from] ExportError),
}

/// Export/storage errors. These are never recovered locally.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Session is not complete ({answered} of {total} answered)")]
    Incomplete { answered: usize, total: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to pack document: {0}")]
    Docx(String),
}

/// Presentation channel errors.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Channel {name} failed to start: {reason}")]
    StartupFailed { name: String, reason: String },

    #[error("Channel {name} IO error: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
}
