//! The fixed vendor questionnaire.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An immutable survey prompt. Identity is its text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Question(String);

impl Question {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn text(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Question {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

/// Questions asked of every CX vendor, in order.
const CX_VENDOR_QUESTIONS: &[&str] = &[
    "When was your platform founded?",
    "Who was the founder and what is their current position in your company?",
    "In a nutshell, what does your platform do?",
    "At a high level what are the key features of your platform?",
    "What size businesses do you support?",
    "What sectors do you have specialism in / have most of your clients?",
    "Can you do B2B?",
    "Please provide a case study. This should highlight what makes your platform special.",
    "How does your platform upload historical feedback?",
    "What channels can clients use to distribute surveys?",
    "Which review platforms can your platform access?",
    "What formats of customer support data (e.g. chat, calls, emails) can your platform access?",
    "Can your platform identify churn probability by customer?",
    "Can your platform highlight touchpoints with significant issues?",
    "How does your platform help clients close individual issues?",
    "What sets your platform apart from other VoC solutions?",
    "If your platform were a person, who would they be and why?",
];

/// A fixed, ordered, restartable list of questions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    /// The 17-question CX vendor survey.
    pub fn cx_vendor() -> Self {
        Self::from_texts(CX_VENDOR_QUESTIONS.iter().copied())
    }

    /// Build a bank from arbitrary question texts. Duplicate texts are
    /// dropped, keeping the first occurrence, since a question's identity is
    /// its text.
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut questions: Vec<Question> = Vec::new();
        for text in texts {
            let question = Question::new(text);
            if !questions.contains(&question) {
                questions.push(question);
            }
        }
        Self { questions }
    }

    /// All questions, same order on every call.
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Zero-based position of `question` in the bank.
    pub fn position(&self, question: &Question) -> Option<usize> {
        self.questions.iter().position(|q| q == question)
    }

    pub fn contains(&self, question: &Question) -> bool {
        self.position(question).is_some()
    }
}

impl Default for QuestionBank {
    fn default() -> Self {
        Self::cx_vendor()
    }
}
