//! Answer-acceptance workflow: the per-question state machine.
//!
//! `InProgress(cursor)` → (`Accepted` on the last question) → `Complete`.
//! A `NeedsRevision` verdict leaves the state untouched. Export runs exactly
//! once, on the transition into `Complete`.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use super::export::{ExportBundle, Exporter};
use super::judge::{Judge, JudgeVerdict};
use super::questions::{Question, QuestionBank};
use super::session::SessionState;
use crate::error::WorkflowError;

/// Workflow phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum WorkflowPhase {
    InProgress { cursor: Question },
    Complete,
}

impl WorkflowPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete)
    }
}

impl fmt::Display for WorkflowPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InProgress { .. } => write!(f, "in_progress"),
            Self::Complete => write!(f, "complete"),
        }
    }
}

/// What happened to one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Answer stored; `next` is the new current question.
    Accepted { next: Question },
    /// Answer stored and it was the last one; export has run.
    Completed { bundle: ExportBundle },
    /// Answer discarded; show `feedback` and re-ask the same question.
    NeedsRevision { feedback: String },
}

/// Progress snapshot for presentation layers.
#[derive(Debug, Clone, Serialize)]
pub struct Progress {
    #[serde(flatten)]
    pub phase: WorkflowPhase,
    /// One-based number of the current question, if any.
    pub number: Option<usize>,
    pub answered: usize,
    pub total: usize,
}

impl Progress {
    /// "Question N of M", or `None` once complete.
    pub fn label(&self) -> Option<String> {
        self.number
            .map(|n| format!("Question {} of {}", n, self.total))
    }
}

/// Drives one respondent's session.
pub struct AnswerWorkflow {
    session: SessionState,
    phase: WorkflowPhase,
    judge: Arc<dyn Judge>,
    exporter: Arc<dyn Exporter>,
    bundle: Option<ExportBundle>,
}

impl AnswerWorkflow {
    /// Start a fresh session at the first question.
    ///
    /// An empty bank has nothing to ask; it starts `Complete` without
    /// exporting, since no transition into `Complete` ever happened.
    pub fn new(bank: QuestionBank, judge: Arc<dyn Judge>, exporter: Arc<dyn Exporter>) -> Self {
        if bank.is_empty() {
            tracing::warn!("Question bank is empty; the survey starts complete");
        }
        let session = SessionState::new(bank);
        let phase = Self::phase_for(&session);
        Self {
            session,
            phase,
            judge,
            exporter,
            bundle: None,
        }
    }

    fn phase_for(session: &SessionState) -> WorkflowPhase {
        match session.current_question() {
            Some(q) => WorkflowPhase::InProgress { cursor: q.clone() },
            None => WorkflowPhase::Complete,
        }
    }

    pub fn phase(&self) -> &WorkflowPhase {
        &self.phase
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Question awaiting an answer, if any.
    pub fn current_question(&self) -> Option<&Question> {
        match &self.phase {
            WorkflowPhase::InProgress { cursor } => Some(cursor),
            WorkflowPhase::Complete => None,
        }
    }

    /// Artifacts from the most recent successful export.
    pub fn bundle(&self) -> Option<&ExportBundle> {
        self.bundle.as_ref()
    }

    pub fn progress(&self) -> Progress {
        Progress {
            phase: self.phase.clone(),
            number: self.session.current_index().map(|i| i + 1),
            answered: self.session.answered_count(),
            total: self.session.total(),
        }
    }

    /// Submit an answer for the current question.
    pub async fn submit(&mut self, answer: &str) -> Result<SubmitOutcome, WorkflowError> {
        let question = self.cursor()?.clone();
        self.submit_for(&question, answer).await
    }

    /// Submit an answer for `question`, which must be the current question.
    pub async fn submit_for(
        &mut self,
        question: &Question,
        answer: &str,
    ) -> Result<SubmitOutcome, WorkflowError> {
        let cursor = self.cursor()?;
        if cursor != question {
            return Err(WorkflowError::InvalidTransition {
                reason: format!(
                    "submitted for \"{question}\" but the current question is \"{cursor}\""
                ),
            });
        }
        let index = self.session.current_index().unwrap_or_default() + 1;

        match self.judge.evaluate(question, answer).await {
            JudgeVerdict::NeedsRevision(feedback) => {
                tracing::info!(question = index, "Answer needs revision");
                Ok(SubmitOutcome::NeedsRevision { feedback })
            }
            JudgeVerdict::Accepted => {
                tracing::info!(question = index, "Answer accepted");
                self.session.accept(question, answer)?;
                self.phase = Self::phase_for(&self.session);
                if let WorkflowPhase::InProgress { cursor } = &self.phase {
                    return Ok(SubmitOutcome::Accepted {
                        next: cursor.clone(),
                    });
                }
                tracing::info!("All {} responses completed", self.session.total());
                let bundle = self.run_export().await?;
                Ok(SubmitOutcome::Completed { bundle })
            }
        }
    }

    /// Re-run the export of a completed session, overwriting both artifacts.
    pub async fn regenerate_export(&mut self) -> Result<ExportBundle, WorkflowError> {
        if !self.phase.is_terminal() {
            return Err(WorkflowError::InvalidTransition {
                reason: "export is only available once every question is answered".to_string(),
            });
        }
        self.run_export().await
    }

    async fn run_export(&mut self) -> Result<ExportBundle, WorkflowError> {
        let bundle = self.exporter.export(&self.session).await?;
        self.bundle = Some(bundle.clone());
        Ok(bundle)
    }

    fn cursor(&self) -> Result<&Question, WorkflowError> {
        self.current_question()
            .ok_or_else(|| WorkflowError::InvalidTransition {
                reason: "the questionnaire is already complete".to_string(),
            })
    }
}
