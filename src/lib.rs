//! Studiekompis — a single-user desktop study assistant.
//!
//! A learner uploads PDF/PPTX documents into named subjects, the app
//! extracts their text, and a hosted language model offers chaptering,
//! quiz generation, summarization and free-form Q&A over the material,
//! with text-to-speech playback on the side.
//!
//! # Module map
//!
//! * [`subjects`] — the in-memory subject store (session state).
//! * [`extract`] — PDF and PPTX text extraction.
//! * [`assistant`] — the Gemini client, credential and instruction texts.
//! * [`speech`] — Translate TTS synthesis, rodio playback, excerpt limit.
//! * [`worker`] — the background command loop between UI and services.
//! * [`app`] — the egui orchestration/UI layer.
//! * [`config`] — TOML settings and platform paths.

pub mod app;
pub mod assistant;
pub mod config;
pub mod extract;
pub mod speech;
pub mod subjects;
pub mod worker;
