//! CLI channel: line-oriented questionnaire over stdin/stdout.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{ChannelError, Error};
use crate::survey::{AnswerWorkflow, ExportBundle, SubmitOutcome};

/// Typed by the respondent to leave before finishing.
pub const QUIT_COMMAND: &str = "/quit";

/// How a CLI session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliExit {
    /// Every question answered; artifacts written (absent for an empty bank).
    Completed(Option<ExportBundle>),
    /// EOF or `/quit` before completion. Nothing was exported.
    Aborted,
}

/// Run the questionnaire until it completes or input ends.
///
/// Each input line is one answer submission for the current question.
pub async fn run_cli<R, W>(
    workflow: &mut AnswerWorkflow,
    input: R,
    mut output: W,
) -> Result<CliExit, Error>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();

    while let Some(question) = workflow.current_question().cloned() {
        let label = workflow.progress().label().unwrap_or_default();
        say(&mut output, &format!("\n{label}\n{question}\nYour answer: ")).await?;

        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => return Ok(CliExit::Aborted),
            Err(e) => {
                tracing::error!("Error reading stdin: {}", e);
                return Err(io_error(e).into());
            }
        };
        if line.trim() == QUIT_COMMAND {
            say(&mut output, "\nSurvey left unfinished; nothing was saved.\n").await?;
            return Ok(CliExit::Aborted);
        }

        match workflow.submit(line.trim_end()).await? {
            SubmitOutcome::Accepted { .. } => {
                say(&mut output, "✅ Answer accepted.\n").await?;
            }
            SubmitOutcome::NeedsRevision { feedback } => {
                say(&mut output, &format!("⚠️ AI Feedback: {feedback}\n")).await?;
            }
            SubmitOutcome::Completed { bundle } => {
                say(&mut output, "✅ Answer accepted.\n").await?;
                say(&mut output, &completion_message(&bundle)).await?;
                return Ok(CliExit::Completed(Some(bundle)));
            }
        }
    }

    say(&mut output, "🎉 All responses completed!\n").await?;
    Ok(CliExit::Completed(workflow.bundle().cloned()))
}

fn completion_message(bundle: &ExportBundle) -> String {
    format!(
        "\n🎉 All responses completed!\n📄 Word Doc: {}\n📄 JSON: {}\n",
        bundle.docx_path.display(),
        bundle.json_path.display()
    )
}

async fn say<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> Result<(), ChannelError> {
    output.write_all(text.as_bytes()).await.map_err(io_error)?;
    output.flush().await.map_err(io_error)
}

fn io_error(source: std::io::Error) -> ChannelError {
    ChannelError::Io {
        name: "cli".to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::survey::{FileExporter, Judge, JudgeVerdict, Question, QuestionBank};

    /// Accepts answers that mention "detailed", otherwise asks for more.
    struct KeywordJudge;

    #[async_trait]
    impl Judge for KeywordJudge {
        async fn evaluate(&self, _question: &Question, answer: &str) -> JudgeVerdict {
            if answer.contains("detailed") {
                JudgeVerdict::from_response("Good answer.")
            } else {
                JudgeVerdict::from_response("Too vague, please expand.")
            }
        }
    }

    fn workflow(dir: &std::path::Path) -> AnswerWorkflow {
        AnswerWorkflow::new(
            QuestionBank::from_texts(["Q1", "Q2"]),
            Arc::new(KeywordJudge),
            Arc::new(FileExporter::new(dir)),
        )
    }

    #[tokio::test]
    async fn full_session_prints_feedback_and_completes() {
        let dir = tempfile::tempdir().unwrap();
        let mut wf = workflow(dir.path());
        let input = b"short\nA detailed answer.\nAnother detailed answer.\n".as_slice();
        let mut output = Vec::new();

        let exit = run_cli(&mut wf, input, &mut output).await.unwrap();

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("Question 1 of 2\nQ1"));
        assert!(text.contains("⚠️ AI Feedback: Too vague, please expand."));
        assert!(text.contains("Question 2 of 2\nQ2"));
        assert!(text.contains("🎉 All responses completed!"));
        assert!(text.contains("vendor_responses.docx"));
        match exit {
            CliExit::Completed(Some(bundle)) => assert!(bundle.json_path.exists()),
            other => panic!("unexpected exit: {other:?}"),
        }
    }

    #[tokio::test]
    async fn eof_aborts_without_export() {
        let dir = tempfile::tempdir().unwrap();
        let mut wf = workflow(dir.path());
        let mut output = Vec::new();

        let exit = run_cli(&mut wf, b"A detailed answer.\n".as_slice(), &mut output)
            .await
            .unwrap();

        assert_eq!(exit, CliExit::Aborted);
        assert_eq!(wf.session().answered_count(), 1);
        assert!(!dir.path().join("vendor_responses.json").exists());
    }

    #[tokio::test]
    async fn quit_command_stops_the_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut wf = workflow(dir.path());
        let mut output = Vec::new();

        let exit = run_cli(&mut wf, b"/quit\nA detailed answer.\n".as_slice(), &mut output)
            .await
            .unwrap();

        assert_eq!(exit, CliExit::Aborted);
        assert_eq!(wf.session().answered_count(), 0);
        assert!(String::from_utf8(output).unwrap().contains("nothing was saved"));
    }
}
