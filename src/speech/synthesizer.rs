//! Core `SpeechSynthesizer` trait and the Google Translate TTS implementation.

use std::io::Write;
use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::SpeechConfig;

// ---------------------------------------------------------------------------
// SpeechError
// ---------------------------------------------------------------------------

/// Errors that can occur while synthesizing or playing speech.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpeechError {
    /// Synthesis was requested on empty text — no network call is attempted.
    #[error("nothing to read aloud")]
    EmptyText,

    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("speech request timed out")]
    Timeout,

    /// The service answered with a non-success HTTP status.
    #[error("speech service answered with status {0}")]
    Status(u16),

    /// The service answered success but sent no audio bytes.
    #[error("speech service returned no audio")]
    EmptyAudio,

    /// The audio file could not be written or read.
    #[error("audio file error: {0}")]
    Io(String),

    /// Local playback failed (no output device, undecodable audio, …).
    #[error("playback failed: {0}")]
    Playback(String),
}

impl From<reqwest::Error> for SpeechError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SpeechError::Timeout
        } else {
            SpeechError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// SpeechSynthesizer trait
// ---------------------------------------------------------------------------

/// Async trait for text-to-speech backends.
///
/// On success the returned path points at a freshly created audio file; the
/// file is not cleaned up by the app, its lifetime is left to the host
/// environment.  A caller that gets `Err` must not attempt playback.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<PathBuf, SpeechError>;
}

// ---------------------------------------------------------------------------
// TranslateTts
// ---------------------------------------------------------------------------

/// Synthesizes speech via the Google Translate `translate_tts` endpoint.
///
/// One GET request per call; the response body is MP3 audio, written to a
/// kept temporary file.  The language is fixed to one locale from
/// [`SpeechConfig`] (Swedish by default).  No retry, no chunking — bounding
/// the text length is the caller's job via [`excerpt`](crate::speech::excerpt).
pub struct TranslateTts {
    client: reqwest::Client,
    config: SpeechConfig,
}

impl TranslateTts {
    /// Build a `TranslateTts` from application config.
    pub fn from_config(config: &SpeechConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for TranslateTts {
    async fn synthesize(&self, text: &str) -> Result<PathBuf, SpeechError> {
        if text.trim().is_empty() {
            return Err(SpeechError::EmptyText);
        }

        let url = format!("{}/translate_tts", self.config.base_url);
        let textlen = text.chars().count().to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("tl", self.config.language.as_str()),
                ("q", text),
                ("textlen", textlen.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SpeechError::Status(status.as_u16()));
        }

        let audio = response.bytes().await?;
        if audio.is_empty() {
            return Err(SpeechError::EmptyAudio);
        }

        let mut file = tempfile::Builder::new()
            .prefix("studiekompis-")
            .suffix(".mp3")
            .tempfile()
            .map_err(|e| SpeechError::Io(e.to_string()))?;
        file.write_all(&audio)
            .map_err(|e| SpeechError::Io(e.to_string()))?;

        // Keep the file: playback happens after this call returns, and
        // cleanup is left to the host environment.
        let (_, path) = file.keep().map_err(|e| SpeechError::Io(e.to_string()))?;
        Ok(path)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
