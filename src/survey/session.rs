//! Per-respondent session state: accepted answers plus an implicit cursor.

use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};

use super::questions::{Question, QuestionBank};
use crate::error::WorkflowError;

/// One respondent's progress through a `QuestionBank`.
///
/// Only the cursor question can be accepted, so accepted answers always
/// cover a prefix of the bank: `answers[i]` belongs to the bank's `i`-th
/// question and the cursor sits at `answers.len()`. The prefix only grows.
#[derive(Debug, Clone)]
pub struct SessionState {
    bank: QuestionBank,
    answers: Vec<String>,
}

impl SessionState {
    pub fn new(bank: QuestionBank) -> Self {
        Self {
            bank,
            answers: Vec::new(),
        }
    }

    pub fn is_answered(&self, question: &Question) -> bool {
        self.bank
            .position(question)
            .is_some_and(|i| i < self.answers.len())
    }

    /// Accepted answer for `question`, if any.
    pub fn answer(&self, question: &Question) -> Option<&str> {
        self.bank
            .position(question)
            .and_then(|i| self.answers.get(i))
            .map(String::as_str)
    }

    /// Record an accepted answer.
    ///
    /// Only the current question may be accepted; anything else (already
    /// answered, not in the bank, or out of order) is a contract violation.
    pub fn accept(&mut self, question: &Question, answer: &str) -> Result<(), WorkflowError> {
        if self.is_answered(question) {
            return Err(WorkflowError::AlreadyAnswered {
                question: question.to_string(),
            });
        }
        match self.current_question() {
            Some(current) if current == question => {}
            Some(current) => {
                return Err(WorkflowError::InvalidTransition {
                    reason: format!(
                        "cannot accept \"{question}\"; the current question is \"{current}\""
                    ),
                });
            }
            None => {
                return Err(WorkflowError::InvalidTransition {
                    reason: "session is already complete".to_string(),
                });
            }
        }
        self.answers.push(answer.to_string());
        Ok(())
    }

    pub fn is_complete(&self) -> bool {
        self.answers.len() == self.bank.len()
    }

    /// First question in bank order that is not yet answered.
    pub fn current_question(&self) -> Option<&Question> {
        self.bank.questions().get(self.answers.len())
    }

    /// Zero-based index of the current question.
    pub fn current_index(&self) -> Option<usize> {
        (!self.is_complete()).then_some(self.answers.len())
    }

    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    pub fn total(&self) -> usize {
        self.bank.len()
    }

    /// Accepted (question, answer) pairs in question order.
    pub fn answers(&self) -> impl Iterator<Item = (&Question, &str)> {
        self.bank
            .questions()
            .iter()
            .zip(self.answers.iter().map(String::as_str))
    }
}

/// Serializes as a JSON object keyed by question text, in question order.
impl Serialize for SessionState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.answers.len()))?;
        for (question, answer) in self.answers() {
            map.serialize_entry(question.text(), answer)?;
        }
        map.end()
    }
}
