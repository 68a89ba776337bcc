//! Presentation adapters: each collects one answer at a time and renders the
//! question, the judge's feedback, and the completion downloads.

pub mod cli;
pub mod http;

pub use cli::{CliExit, run_cli};
pub use http::{SurveyRouteState, survey_routes};
