//! Subject management for Studiekompis.
//!
//! A *subject* ("ämne") is a named bucket of accumulated study text — the
//! app's only persistent-within-the-session state.  [`SubjectStore`] owns
//! the full name → material map together with the "currently studied"
//! pointer, and enforces the two invariants every other module relies on:
//!
//! * at least one subject always exists;
//! * the current pointer always names a subject present in the map.

pub mod store;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use store::{SubjectError, SubjectStore, DEFAULT_SUBJECT};
