//! REST surface for the questionnaire: status, answer submission, and
//! downloads of the exported artifacts.

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::WorkflowError;
use crate::survey::export::{DOCX_FILENAME, JSON_FILENAME};
use crate::survey::{AnswerWorkflow, ExportBundle, Progress, Question, SubmitOutcome};

/// Shared state for survey routes.
///
/// The mutex serializes submissions: one judge call at a time, one writer.
#[derive(Clone)]
pub struct SurveyRouteState {
    pub workflow: Arc<Mutex<AnswerWorkflow>>,
}

impl SurveyRouteState {
    pub fn new(workflow: AnswerWorkflow) -> Self {
        Self {
            workflow: Arc::new(Mutex::new(workflow)),
        }
    }
}

/// Request body for `POST /api/survey/answer`.
#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    /// Text of the question being answered; must match the current one.
    pub question: String,
    #[serde(default)]
    pub answer: String,
}

/// Download links once the survey is complete.
#[derive(Debug, Serialize)]
pub struct Downloads {
    pub json: &'static str,
    pub docx: &'static str,
}

const DOWNLOADS: Downloads = Downloads {
    json: "/api/survey/export/json",
    docx: "/api/survey/export/docx",
};

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum AnswerResponse {
    Accepted {
        message: &'static str,
        progress: Progress,
    },
    NeedsRevision {
        feedback: String,
        progress: Progress,
    },
    Complete {
        message: &'static str,
        downloads: Downloads,
        progress: Progress,
    },
}

/// Build the survey REST routes.
pub fn survey_routes(state: SurveyRouteState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/survey/status", get(get_status))
        .route("/api/survey/answer", post(submit_answer))
        .route("/api/survey/export/{format}", get(download))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "cx-survey"
    }))
}

/// GET /api/survey/status
async fn get_status(State(state): State<SurveyRouteState>) -> impl IntoResponse {
    let workflow = state.workflow.lock().await;
    let progress = workflow.progress();
    Json(serde_json::json!({
        "label": progress.label(),
        "progress": progress,
        "answers": workflow.session(),
        "downloads": workflow.bundle().is_some().then_some(DOWNLOADS),
    }))
}

/// POST /api/survey/answer
async fn submit_answer(
    State(state): State<SurveyRouteState>,
    Json(req): Json<AnswerRequest>,
) -> Response {
    let mut workflow = state.workflow.lock().await;
    let question = Question::new(req.question);

    let outcome = match workflow.submit_for(&question, &req.answer).await {
        Ok(outcome) => outcome,
        Err(e) => return workflow_error_response(e),
    };

    let progress = workflow.progress();
    let body = match outcome {
        SubmitOutcome::Accepted { .. } => AnswerResponse::Accepted {
            message: "✅ Answer accepted.",
            progress,
        },
        SubmitOutcome::NeedsRevision { feedback } => {
            AnswerResponse::NeedsRevision { feedback, progress }
        }
        SubmitOutcome::Completed { .. } => AnswerResponse::Complete {
            message: "🎉 All responses completed!",
            downloads: DOWNLOADS,
            progress,
        },
    };
    Json(body).into_response()
}

/// GET /api/survey/export/{format}, where format is `json` or `docx`.
async fn download(
    State(state): State<SurveyRouteState>,
    Path(format): Path<String>,
) -> Response {
    let (filename, content_type) = match format.as_str() {
        "json" => (JSON_FILENAME, "application/json"),
        "docx" => (
            DOCX_FILENAME,
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        ),
        _ => return error_response(StatusCode::NOT_FOUND, format!("Unknown format: {format}")),
    };

    let bundle = {
        let mut workflow = state.workflow.lock().await;
        if !workflow.phase().is_terminal() {
            return error_response(
                StatusCode::NOT_FOUND,
                "Survey is not complete yet".to_string(),
            );
        }
        match workflow.bundle().cloned() {
            Some(bundle) => bundle,
            // The completion export failed earlier; try again now.
            None => match workflow.regenerate_export().await {
                Ok(bundle) => bundle,
                Err(e) => return workflow_error_response(e),
            },
        }
    };

    let path: PathBuf = artifact_path(&bundle, &format);
    match tokio::fs::read(&path).await {
        Ok(bytes) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, content_type.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{filename}\""),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to read {}: {}", path.display(), e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

fn artifact_path(bundle: &ExportBundle, format: &str) -> PathBuf {
    if format == "docx" {
        bundle.docx_path.clone()
    } else {
        bundle.json_path.clone()
    }
}

fn workflow_error_response(err: WorkflowError) -> Response {
    let status = match err {
        WorkflowError::InvalidTransition { .. } | WorkflowError::AlreadyAnswered { .. } => {
            StatusCode::CONFLICT
        }
        WorkflowError::Export(_) => {
            tracing::error!("Export failed: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    error_response(status, err.to_string())
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}
