//! Speech synthesis and playback for Studiekompis.
//!
//! This module provides:
//! * [`SpeechSynthesizer`] — async trait implemented by TTS backends.
//! * [`TranslateTts`] — Google Translate TTS implementation (one locale,
//!   MP3 into a kept temporary file).
//! * [`AudioPlayer`] — rodio playback of the synthesized file.
//! * [`excerpt`] — the caller-side truncation applied before synthesis.
//! * [`SpeechError`] — error variants for synthesis and playback.

pub mod playback;
pub mod synthesizer;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use playback::AudioPlayer;
pub use synthesizer::{SpeechError, SpeechSynthesizer, TranslateTts};

/// Truncate `text` to at most `max_chars` characters, on a char boundary.
///
/// This is the excerpt limit: the UI applies it both when seeding the
/// read-aloud buffer and again at dispatch, so no more than the configured
/// length ever reaches the synthesizer.
pub fn excerpt(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
