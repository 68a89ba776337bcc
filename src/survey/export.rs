//! Export of a completed session to `vendor_responses.json` and
//! `vendor_responses.docx`.

use std::io::Cursor;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Local};
use docx_rs::{BreakType, Docx, Paragraph, Run, Style, StyleType};
use serde::Serialize;
use tokio::fs;

use super::session::SessionState;
use crate::error::ExportError;

/// File name of the structured record.
pub const JSON_FILENAME: &str = "vendor_responses.json";
/// File name of the formatted document.
pub const DOCX_FILENAME: &str = "vendor_responses.docx";
/// Title at the top of the formatted document.
pub const DOCUMENT_TITLE: &str = "CX Vendor Survey Responses";
/// Format of the generation timestamp in the document.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const TITLE_STYLE: &str = "Title";
const HEADING2_STYLE: &str = "Heading2";

/// The two artifacts produced from a completed session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportBundle {
    pub json_path: PathBuf,
    pub docx_path: PathBuf,
    /// Timestamp printed in the document, already formatted.
    pub generated_at: String,
}

/// Serializes a completed session somewhere retrievable.
#[async_trait]
pub trait Exporter: Send + Sync {
    async fn export(&self, session: &SessionState) -> Result<ExportBundle, ExportError>;
}

/// Render the structured record: question -> answer, 2-space indent.
///
/// Non-ASCII text is written as raw UTF-8, not `\u` escapes.
pub fn render_json(session: &SessionState) -> Result<Vec<u8>, ExportError> {
    Ok(serde_json::to_vec_pretty(session)?)
}

/// Render the formatted document as `.docx` bytes.
pub fn render_docx(
    session: &SessionState,
    generated_at: &DateTime<Local>,
) -> Result<Vec<u8>, ExportError> {
    let mut docx = Docx::new()
        .add_style(
            Style::new(TITLE_STYLE, StyleType::Paragraph)
                .name("Title")
                .size(56),
        )
        .add_style(
            Style::new(HEADING2_STYLE, StyleType::Paragraph)
                .name("Heading 2")
                .size(26)
                .bold(),
        )
        .add_paragraph(
            Paragraph::new()
                .add_run(Run::new().add_text(DOCUMENT_TITLE))
                .style(TITLE_STYLE),
        )
        .add_paragraph(Paragraph::new().add_run(
            Run::new().add_text(format!("Date: {}", generated_at.format(TIMESTAMP_FORMAT))),
        ));

    for (question, answer) in session.answers() {
        docx = docx
            .add_paragraph(
                Paragraph::new()
                    .add_run(Run::new().add_text(question.text()))
                    .style(HEADING2_STYLE),
            )
            .add_paragraph(Paragraph::new().add_run(answer_run(answer)));
    }

    let mut buf = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buf)
        .map_err(|e| ExportError::Docx(e.to_string()))?;
    Ok(buf.into_inner())
}

/// One run per answer; embedded newlines become line breaks.
fn answer_run(answer: &str) -> Run {
    let mut run = Run::new();
    for (i, line) in answer.split('\n').enumerate() {
        if i > 0 {
            run = run.add_break(BreakType::TextWrapping);
        }
        run = run.add_text(line.trim_end_matches('\r'));
    }
    run
}

/// Writes both artifacts into a directory, overwriting earlier exports.
pub struct FileExporter {
    output_dir: PathBuf,
    clock: fn() -> DateTime<Local>,
}

impl FileExporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            clock: Local::now,
        }
    }

    /// Override the timestamp source.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Local>) -> Self {
        self.clock = clock;
        self
    }

    pub fn json_path(&self) -> PathBuf {
        self.output_dir.join(JSON_FILENAME)
    }

    pub fn docx_path(&self) -> PathBuf {
        self.output_dir.join(DOCX_FILENAME)
    }
}

#[async_trait]
impl Exporter for FileExporter {
    async fn export(&self, session: &SessionState) -> Result<ExportBundle, ExportError> {
        if !session.is_complete() {
            return Err(ExportError::Incomplete {
                answered: session.answered_count(),
                total: session.total(),
            });
        }

        let generated_at = (self.clock)();
        let json = render_json(session)?;
        let docx = render_docx(session, &generated_at)?;

        fs::create_dir_all(&self.output_dir).await?;
        let json_path = self.json_path();
        let docx_path = self.docx_path();
        fs::write(&json_path, json).await?;
        fs::write(&docx_path, docx).await?;

        tracing::info!(
            json = %json_path.display(),
            docx = %docx_path.display(),
            "Exported {} responses",
            session.answered_count()
        );

        Ok(ExportBundle {
            json_path,
            docx_path,
            generated_at: generated_at.format(TIMESTAMP_FORMAT).to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::survey::questions::QuestionBank;

    fn fixed_clock() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap()
    }

    fn completed_session() -> SessionState {
        let mut session = SessionState::new(QuestionBank::from_texts([
            "When was your platform founded?",
            "Can you do B2B?",
        ]));
        session
            .accept(&"When was your platform founded?".into(), "2015, in Leeds.")
            .unwrap();
        session
            .accept(&"Can you do B2B?".into(), "Yes.\nAbout 40% of our clients are B2B.")
            .unwrap();
        session
    }

    #[test]
    fn json_is_pretty_printed_with_two_spaces_in_question_order() {
        let json = String::from_utf8(render_json(&completed_session()).unwrap()).unwrap();
        assert_eq!(
            json,
            "{\n  \"When was your platform founded?\": \"2015, in Leeds.\",\n  \
             \"Can you do B2B?\": \"Yes.\\nAbout 40% of our clients are B2B.\"\n}"
        );
    }

    #[test]
    fn non_ascii_answers_are_written_as_raw_utf8() {
        let mut session = SessionState::new(QuestionBank::from_texts(["Where are you based?"]));
        session
            .accept(&"Where are you based?".into(), "Café in São Paulo 😀")
            .unwrap();
        let json = String::from_utf8(render_json(&session).unwrap()).unwrap();
        assert_eq!(json, "{\n  \"Where are you based?\": \"Café in São Paulo 😀\"\n}");
        assert!(!json.contains("\\u"));
    }

    /// (style id, text) of every body paragraph in document order. Line
    /// breaks inside a run come back as `\n`.
    fn paragraphs(docx: &docx_rs::Docx) -> Vec<(Option<String>, String)> {
        use docx_rs::{DocumentChild, ParagraphChild, RunChild};

        docx.document
            .children
            .iter()
            .filter_map(|child| match child {
                DocumentChild::Paragraph(p) => Some(p),
                _ => None,
            })
            .map(|p| {
                let style = p.property.style.as_ref().map(|s| s.val.clone());
                let mut text = String::new();
                for child in &p.children {
                    if let ParagraphChild::Run(run) = child {
                        for rc in &run.children {
                            match rc {
                                RunChild::Text(t) => text.push_str(&t.text),
                                RunChild::Break(_) => text.push('\n'),
                                _ => {}
                            }
                        }
                    }
                }
                (style, text)
            })
            .collect()
    }

    #[test]
    fn docx_lays_out_title_date_then_heading_answer_pairs() {
        let bytes = render_docx(&completed_session(), &fixed_clock()).unwrap();
        assert_eq!(&bytes[..2], b"PK", "docx is a zip archive");

        let parsed = docx_rs::read_docx(&bytes).unwrap();
        let heading = Some(HEADING2_STYLE.to_string());
        assert_eq!(
            paragraphs(&parsed),
            vec![
                (Some(TITLE_STYLE.to_string()), DOCUMENT_TITLE.to_string()),
                (None, "Date: 2024-03-05 14:07:09".to_string()),
                (heading.clone(), "When was your platform founded?".to_string()),
                (None, "2015, in Leeds.".to_string()),
                (heading, "Can you do B2B?".to_string()),
                (None, "Yes.\nAbout 40% of our clients are B2B.".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn export_writes_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = FileExporter::new(dir.path()).with_clock(fixed_clock);
        let bundle = exporter.export(&completed_session()).await.unwrap();

        assert_eq!(bundle.json_path, dir.path().join("vendor_responses.json"));
        assert_eq!(bundle.docx_path, dir.path().join("vendor_responses.docx"));
        assert_eq!(bundle.generated_at, "2024-03-05 14:07:09");

        let json: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&bundle.json_path).unwrap()).unwrap();
        assert_eq!(json["Can you do B2B?"], "Yes.\nAbout 40% of our clients are B2B.");
        assert!(std::fs::metadata(&bundle.docx_path).unwrap().len() > 0);
    }

    #[tokio::test]
    async fn export_twice_overwrites_with_identical_json() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = FileExporter::new(dir.path()).with_clock(fixed_clock);
        let session = completed_session();

        let first = exporter.export(&session).await.unwrap();
        let first_bytes = std::fs::read(&first.json_path).unwrap();
        let second = exporter.export(&session).await.unwrap();
        let second_bytes = std::fs::read(&second.json_path).unwrap();

        assert_eq!(first, second);
        assert_eq!(first_bytes, second_bytes);
    }

    #[tokio::test]
    async fn export_of_incomplete_session_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let session = SessionState::new(QuestionBank::from_texts(["Q1", "Q2"]));
        let err = FileExporter::new(dir.path())
            .export(&session)
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::Incomplete { answered: 0, total: 2 }));
        assert!(!dir.path().join(JSON_FILENAME).exists());
    }

    #[tokio::test]
    async fn write_failure_propagates() {
        // A regular file where the output directory should be.
        let blocker = tempfile::NamedTempFile::new().unwrap();
        let exporter = FileExporter::new(blocker.path().join("out"));
        let err = exporter.export(&completed_session()).await.unwrap_err();
        assert!(matches!(err, ExportError::Io(_)));
    }
}
