//! AI assistant client for Studiekompis.
//!
//! This module provides:
//! * [`Assistant`] — async trait implemented by all assistant backends.
//! * [`GeminiClient`] — Gemini REST (`generateContent`) implementation.
//! * [`Credential`] — the API key, redacted in `Debug`, never persisted.
//! * [`AssistantTask`] — the closed set of study operations with their
//!   fixed Swedish instructions.
//! * [`AssistantError`] — typed failure taxonomy for assistant calls.
//!
//! The client returns a typed `Result` and never talks to the UI itself;
//! presenting failures (notice banner + visible failure text) is entirely
//! the orchestration layer's job.

pub mod client;
pub mod credential;
pub mod prompt;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use client::{Assistant, AssistantError, GeminiClient};
pub use credential::Credential;
pub use prompt::{compose_request, AssistantTask, SYSTEM_INSTRUCTION};
