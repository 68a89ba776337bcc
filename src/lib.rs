//! CX vendor survey: an LLM-judged questionnaire.

pub mod channels;
pub mod config;
pub mod error;
pub mod llm;
pub mod survey;
