//! Answer judge: asks the LLM whether an answer is good enough.
//!
//! The judge is fail-closed. Any provider failure, including a timeout or a
//! missing credential, becomes a `NeedsRevision` verdict whose feedback is
//! the diagnostic, so a broken judge never accepts an answer.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use super::questions::Question;
use crate::error::LlmError;
use crate::llm::{ChatMessage, CompletionRequest, LlmProvider};

/// Phrase whose presence in the judge response means "accept".
pub const ACCEPTANCE_SENTINEL: &str = "Good answer.";

/// Prefix on feedback produced from a judge failure.
pub const ERROR_FEEDBACK_PREFIX: &str = "Error:";

/// Outcome of judging one submission. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", content = "feedback", rename_all = "snake_case")]
pub enum JudgeVerdict {
    Accepted,
    NeedsRevision(String),
}

impl JudgeVerdict {
    /// Classify a raw judge response.
    ///
    /// Containment, not equality: "Good answer. But consider..." is accepted.
    pub fn from_response(response: &str) -> Self {
        let response = response.trim();
        if response.contains(ACCEPTANCE_SENTINEL) {
            Self::Accepted
        } else {
            Self::NeedsRevision(response.to_string())
        }
    }

    /// Verdict for a judge that could not be reached.
    pub fn unavailable(error: &LlmError) -> Self {
        Self::NeedsRevision(format!("{ERROR_FEEDBACK_PREFIX} {error}"))
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Decides whether an answer is sufficient for a question.
#[async_trait]
pub trait Judge: Send + Sync {
    async fn evaluate(&self, question: &Question, answer: &str) -> JudgeVerdict;
}

/// Build the judge prompt for one submission.
pub fn judge_prompt(question: &Question, answer: &str) -> String {
    format!(
        "A vendor answered the following survey question:\n\
         Question: {question}\n\
         Answer: {answer}\n\
         \n\
         Is this answer vague, incomplete, or too short? If yes, suggest a follow-up question.\n\
         If it is sufficient, respond only with: '{ACCEPTANCE_SENTINEL}'"
    )
}

/// Judge backed by an `LlmProvider`, one call per evaluation.
pub struct LlmJudge {
    llm: Arc<dyn LlmProvider>,
    timeout: Duration,
}

impl LlmJudge {
    pub fn new(llm: Arc<dyn LlmProvider>, timeout: Duration) -> Self {
        Self { llm, timeout }
    }

    async fn ask(&self, question: &Question, answer: &str) -> Result<String, LlmError> {
        let request = CompletionRequest::new(vec![ChatMessage::user(judge_prompt(
            question, answer,
        ))]);

        match tokio::time::timeout(self.timeout, self.llm.complete(request)).await {
            Ok(result) => {
                let response = result?;
                tracing::debug!(
                    input_tokens = response.input_tokens,
                    output_tokens = response.output_tokens,
                    finish_reason = ?response.finish_reason,
                    response_id = response.response_id.as_deref().unwrap_or("-"),
                    "Judge call complete"
                );
                Ok(response.content)
            }
            Err(_) => Err(LlmError::Timeout {
                provider: self.llm.model_name().to_string(),
                timeout: self.timeout,
            }),
        }
    }
}

#[async_trait]
impl Judge for LlmJudge {
    async fn evaluate(&self, question: &Question, answer: &str) -> JudgeVerdict {
        match self.ask(question, answer).await {
            Ok(response) => JudgeVerdict::from_response(&response),
            Err(e) => {
                tracing::warn!("Judge unavailable, failing closed: {}", e);
                JudgeVerdict::unavailable(&e)
            }
        }
    }
}
