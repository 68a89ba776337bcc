use std::sync::Arc;

use cx_survey::channels::{CliExit, SurveyRouteState, run_cli, survey_routes};
use cx_survey::config::SurveyConfig;
use cx_survey::error::ChannelError;
use cx_survey::llm::{LlmConfig, create_provider};
use cx_survey::survey::{AnswerWorkflow, FileExporter, LlmJudge, QuestionBank};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = SurveyConfig::from_env()?;

    eprintln!("🧠 CX Vendor Interview Agent v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", config.model);
    eprintln!("   Judge timeout: {}s", config.judge_timeout.as_secs());
    eprintln!("   Output: {}", config.output_dir.display());

    let llm = create_provider(&LlmConfig::from(&config));
    let judge = Arc::new(LlmJudge::new(llm, config.judge_timeout));
    let exporter = Arc::new(FileExporter::new(config.output_dir.clone()));
    let mut workflow = AnswerWorkflow::new(QuestionBank::cx_vendor(), judge, exporter);

    match config.http_port {
        Some(port) => {
            let app = survey_routes(SurveyRouteState::new(workflow));
            let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
                .await
                .map_err(|e| ChannelError::StartupFailed {
                    name: "http".to_string(),
                    reason: e.to_string(),
                })?;
            eprintln!("   Survey API: http://0.0.0.0:{port}/api/survey/status\n");
            tracing::info!(port, "Survey HTTP server started");
            axum::serve(listener, app).await?;
        }
        None => {
            eprintln!("   One answer per line. /quit to exit.");
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            match run_cli(&mut workflow, stdin, tokio::io::stdout()).await? {
                CliExit::Completed(_) => tracing::info!("Survey complete"),
                CliExit::Aborted => tracing::info!("Survey left unfinished"),
            }
        }
    }

    Ok(())
}
