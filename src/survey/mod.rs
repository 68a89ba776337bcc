//! The CX vendor questionnaire.
//!
//! A fixed list of questions is walked one at a time. Each answer is graded by
//! an LLM judge and either accepted or sent back with feedback. Once every
//! question has an accepted answer, the session is exported as JSON and as a
//! Word document.

pub mod export;
pub mod judge;
pub mod questions;
pub mod session;
pub mod workflow;

pub use export::{ExportBundle, Exporter, FileExporter};
pub use judge::{ACCEPTANCE_SENTINEL, Judge, JudgeVerdict, LlmJudge};
pub use questions::{Question, QuestionBank};
pub use session::SessionState;
pub use workflow::{AnswerWorkflow, Progress, SubmitOutcome, WorkflowPhase};
