//! Background worker — the command loop behind the UI.
//!
//! The UI thread sends [`StudyCommand`]s over an mpsc channel; the worker
//! processes them one at a time on the tokio runtime (the `recv` loop is
//! serial, so no two operations ever overlap) and sends a [`StudyResult`]
//! back for the UI to drain each frame.  Blocking work — file reads and
//! text extraction — runs under `tokio::task::spawn_blocking` so the async
//! loop never stalls.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::assistant::{Assistant, AssistantError, AssistantTask, Credential};
use crate::extract::{extract, DocumentKind, ExtractError, UploadedDocument};
use crate::speech::{SpeechError, SpeechSynthesizer};

// ---------------------------------------------------------------------------
// Command / result protocol
// ---------------------------------------------------------------------------

/// Commands sent from the UI thread to the background worker.
#[derive(Debug, Clone)]
pub enum StudyCommand {
    /// Read, extract and assemble the staged files into one material block
    /// for `subject`.
    SaveMaterial { subject: String, files: Vec<PathBuf> },
    /// One assistant call with the full material as context.
    AskAssistant {
        task: AssistantTask,
        context: String,
        credential: Credential,
    },
    /// One text-to-speech call.  The text arrives already excerpted.
    Synthesize { text: String },
}

/// Results delivered from the worker back to the UI.
#[derive(Debug)]
pub enum StudyResult {
    /// The upload batch was extracted; `block` is ready to append to
    /// `subject`'s material.
    MaterialSaved {
        subject: String,
        block: String,
        processed: usize,
        skipped: Vec<String>,
    },
    /// The batch failed; nothing was appended anywhere.
    SaveFailed { message: String },
    /// The assistant answered.
    AssistantAnswer { task: AssistantTask, text: String },
    /// The assistant call failed.
    AssistantFailed {
        task: AssistantTask,
        error: AssistantError,
    },
    /// Synthesis finished; `path` is the playable MP3.
    SpeechReady { path: PathBuf },
    /// Synthesis failed; playback must not be attempted.
    SpeechFailed { error: SpeechError },
}

// ---------------------------------------------------------------------------
// Upload batch assembly
// ---------------------------------------------------------------------------

/// Outcome of a successfully assembled upload batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedBatch {
    /// The text to append to the subject's material.
    pub block: String,
    /// Number of files extracted into the block.
    pub processed: usize,
    /// Names of files with unsupported suffixes, reported rather than
    /// silently dropped.
    pub skipped: Vec<String>,
}

/// The header line prefixed to each extracted file's text.
pub fn material_block(filename: &str, text: &str) -> String {
    format!("\n--- {filename} ---\n{text}")
}

/// Read and extract every staged file, in upload order, into one block.
///
/// All-or-nothing: the first read or extraction failure aborts the whole
/// batch with no partial result.  Unsupported suffixes are collected as
/// skipped, contribute nothing and are not counted.
pub fn assemble_batch(files: &[PathBuf]) -> Result<SavedBatch, ExtractError> {
    let mut block = String::new();
    let mut processed = 0;
    let mut skipped = Vec::new();

    for path in files {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let Some(kind) = DocumentKind::from_name(&name) else {
            skipped.push(name);
            continue;
        };

        let bytes = std::fs::read(path)?;
        let document = UploadedDocument { name, bytes, kind };
        let text = extract(&document)?;

        block.push_str(&material_block(&document.name, &text));
        processed += 1;
    }

    Ok(SavedBatch {
        block,
        processed,
        skipped,
    })
}

// ---------------------------------------------------------------------------
// Worker loop
// ---------------------------------------------------------------------------

/// Serial command loop; runs until the command channel closes.
pub async fn run_worker(
    assistant: Arc<dyn Assistant>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    mut command_rx: mpsc::Receiver<StudyCommand>,
    result_tx: mpsc::Sender<StudyResult>,
) {
    while let Some(command) = command_rx.recv().await {
        match command {
            StudyCommand::SaveMaterial { subject, files } => {
                let outcome =
                    tokio::task::spawn_blocking(move || assemble_batch(&files)).await;

                let result = match outcome {
                    Ok(Ok(batch)) => StudyResult::MaterialSaved {
                        subject,
                        block: batch.block,
                        processed: batch.processed,
                        skipped: batch.skipped,
                    },
                    Ok(Err(e)) => {
                        log::warn!("upload batch failed: {e}");
                        StudyResult::SaveFailed {
                            message: e.to_string(),
                        }
                    }
                    Err(e) => StudyResult::SaveFailed {
                        message: format!("internt fel: {e}"),
                    },
                };
                let _ = result_tx.send(result).await;
            }

            StudyCommand::AskAssistant {
                task,
                context,
                credential,
            } => {
                let result = match assistant
                    .ask(task.instruction(), &context, &credential)
                    .await
                {
                    Ok(text) => StudyResult::AssistantAnswer { task, text },
                    Err(error) => {
                        log::warn!("assistant call failed: {error}");
                        StudyResult::AssistantFailed { task, error }
                    }
                };
                let _ = result_tx.send(result).await;
            }

            StudyCommand::Synthesize { text } => {
                let result = match synthesizer.synthesize(&text).await {
                    Ok(path) => StudyResult::SpeechReady { path },
                    Err(error) => {
                        log::warn!("speech synthesis failed: {error}");
                        StudyResult::SpeechFailed { error }
                    }
                };
                let _ = result_tx.send(result).await;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::io::Write;
    use tempfile::tempdir;

    // -----------------------------------------------------------------------
    // Test doubles
    // -----------------------------------------------------------------------

    /// Always answers with a fixed string.
    struct AlwaysAnswers(String);

    #[async_trait]
    impl Assistant for AlwaysAnswers {
        async fn ask(
            &self,
            _instruction: &str,
            _context: &str,
            _credential: &Credential,
        ) -> Result<String, AssistantError> {
            Ok(self.0.clone())
        }
    }

    /// Always fails with a fixed error.
    struct AlwaysFails(AssistantError);

    #[async_trait]
    impl Assistant for AlwaysFails {
        async fn ask(
            &self,
            _instruction: &str,
            _context: &str,
            _credential: &Credential,
        ) -> Result<String, AssistantError> {
            Err(self.0.clone())
        }
    }

    /// Synthesizer double that records the text length it was given.
    struct FixedPathTts {
        path: PathBuf,
        seen_chars: std::sync::Mutex<Option<usize>>,
    }

    #[async_trait]
    impl SpeechSynthesizer for FixedPathTts {
        async fn synthesize(&self, text: &str) -> Result<PathBuf, SpeechError> {
            *self.seen_chars.lock().unwrap() = Some(text.chars().count());
            Ok(self.path.clone())
        }
    }

    fn spawn_worker(
        assistant: Arc<dyn Assistant>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
    ) -> (
        mpsc::Sender<StudyCommand>,
        mpsc::Receiver<StudyResult>,
    ) {
        let (command_tx, command_rx) = mpsc::channel(16);
        let (result_tx, result_rx) = mpsc::channel(32);
        tokio::spawn(run_worker(assistant, synthesizer, command_rx, result_tx));
        (command_tx, result_rx)
    }

    fn null_tts() -> Arc<dyn SpeechSynthesizer> {
        Arc::new(FixedPathTts {
            path: PathBuf::from("/dev/null"),
            seen_chars: std::sync::Mutex::new(None),
        })
    }

    // -----------------------------------------------------------------------
    // Batch assembly
    // -----------------------------------------------------------------------

    #[test]
    fn block_has_header_then_text() {
        assert_eq!(
            material_block("notes.pdf", "Hello"),
            "\n--- notes.pdf ---\nHello"
        );
    }

    #[test]
    fn empty_batch_produces_empty_block() {
        let batch = assemble_batch(&[]).expect("empty batch");
        assert_eq!(batch.block, "");
        assert_eq!(batch.processed, 0);
        assert!(batch.skipped.is_empty());
    }

    /// Unsupported suffixes contribute nothing, are not counted, and are
    /// reported by name.
    #[test]
    fn unsupported_files_are_skipped_and_reported() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("image.png");
        std::fs::File::create(&path)
            .and_then(|mut f| f.write_all(b"png bytes"))
            .expect("write fixture");

        let batch = assemble_batch(&[path]).expect("batch");

        assert_eq!(batch.block, "");
        assert_eq!(batch.processed, 0);
        assert_eq!(batch.skipped, vec!["image.png".to_string()]);
    }

    /// A malformed supported file aborts the whole batch — no partial block.
    #[test]
    fn malformed_file_aborts_the_batch() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("broken.pdf");
        std::fs::File::create(&path)
            .and_then(|mut f| f.write_all(b"not a pdf"))
            .expect("write fixture");

        let err = assemble_batch(&[path]).unwrap_err();
        assert!(matches!(err, ExtractError::Pdf(_)));
    }

    #[test]
    fn missing_file_aborts_the_batch() {
        let err = assemble_batch(&[PathBuf::from("/no/such/file.pdf")]).unwrap_err();
        assert!(matches!(err, ExtractError::Io(_)));
    }

    // -----------------------------------------------------------------------
    // Worker loop
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn ask_command_yields_the_answer() {
        let (command_tx, mut result_rx) =
            spawn_worker(Arc::new(AlwaysAnswers("Svar!".into())), null_tts());

        command_tx
            .send(StudyCommand::AskAssistant {
                task: AssistantTask::Summary,
                context: "material".into(),
                credential: Credential::new("AIza123"),
            })
            .await
            .expect("send");

        match result_rx.recv().await.expect("result") {
            StudyResult::AssistantAnswer { task, text } => {
                assert_eq!(task, AssistantTask::Summary);
                assert_eq!(text, "Svar!");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn failed_ask_carries_the_typed_error() {
        let (command_tx, mut result_rx) = spawn_worker(
            Arc::new(AlwaysFails(AssistantError::MissingCredential)),
            null_tts(),
        );

        command_tx
            .send(StudyCommand::AskAssistant {
                task: AssistantTask::Question("Vad är X?".into()),
                context: "material".into(),
                credential: Credential::default(),
            })
            .await
            .expect("send");

        match result_rx.recv().await.expect("result") {
            StudyResult::AssistantFailed { error, .. } => {
                assert_eq!(error, AssistantError::MissingCredential);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn save_command_reports_skipped_names() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("essay.docx");
        std::fs::File::create(&path).expect("fixture");

        let (command_tx, mut result_rx) =
            spawn_worker(Arc::new(AlwaysAnswers(String::new())), null_tts());

        command_tx
            .send(StudyCommand::SaveMaterial {
                subject: "Allmänt".into(),
                files: vec![path],
            })
            .await
            .expect("send");

        match result_rx.recv().await.expect("result") {
            StudyResult::MaterialSaved {
                subject,
                block,
                processed,
                skipped,
            } => {
                assert_eq!(subject, "Allmänt");
                assert_eq!(block, "");
                assert_eq!(processed, 0);
                assert_eq!(skipped, vec!["essay.docx".to_string()]);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn synthesize_command_returns_the_audio_path() {
        let tts = Arc::new(FixedPathTts {
            path: PathBuf::from("/tmp/klipp.mp3"),
            seen_chars: std::sync::Mutex::new(None),
        });
        let (command_tx, mut result_rx) =
            spawn_worker(Arc::new(AlwaysAnswers(String::new())), tts.clone());

        command_tx
            .send(StudyCommand::Synthesize {
                text: "läs upp det här".into(),
            })
            .await
            .expect("send");

        match result_rx.recv().await.expect("result") {
            StudyResult::SpeechReady { path } => {
                assert_eq!(path, PathBuf::from("/tmp/klipp.mp3"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(*tts.seen_chars.lock().unwrap(), Some(15));
    }
}
