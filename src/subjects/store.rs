//! In-memory subject store — name → accumulated material, plus a pointer to
//! the subject currently being studied.
//!
//! The store is a plain value owned by the UI layer and passed into every
//! action handler; there are no globals and nothing is ever written to disk.
//! Subjects live exactly as long as the process.
//!
//! The map is an [`IndexMap`] so the sidebar lists subjects in the order
//! the learner created them.

use indexmap::IndexMap;
use thiserror::Error;

/// Name of the subject seeded at startup when none is configured.
pub const DEFAULT_SUBJECT: &str = "Allmänt";

// ---------------------------------------------------------------------------
// SubjectError
// ---------------------------------------------------------------------------

/// Errors from subject-store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubjectError {
    /// `create` was called with an empty name.
    #[error("subject name must not be empty")]
    EmptyName,

    /// `select` was called with a name that is not in the store.
    #[error("no subject named '{0}'")]
    Unknown(String),
}

// ---------------------------------------------------------------------------
// SubjectStore
// ---------------------------------------------------------------------------

/// Name → material map with a always-valid "current subject" pointer.
///
/// # Invariants
///
/// * The map is never empty (a default subject is seeded at construction).
/// * `current` always names a key present in the map.
///
/// Every mutating operation upholds both; there is no way to delete a
/// subject, so the invariants cannot be broken from outside.
///
/// # Example
/// ```rust
/// use studiekompis::subjects::SubjectStore;
///
/// let mut store = SubjectStore::new("Allmänt");
/// store.create("Kemi").unwrap();
/// store.append_current_text("syror och baser");
/// assert_eq!(store.current_name(), "Kemi");
/// assert_eq!(store.current_text(), "syror och baser");
/// ```
#[derive(Debug, Clone)]
pub struct SubjectStore {
    subjects: IndexMap<String, String>,
    current: String,
}

impl SubjectStore {
    /// Create a store seeded with one empty subject, which becomes current.
    ///
    /// An empty `default_name` falls back to [`DEFAULT_SUBJECT`] so the
    /// at-least-one-subject invariant holds even for a broken config value.
    pub fn new(default_name: &str) -> Self {
        let name = if default_name.is_empty() {
            DEFAULT_SUBJECT
        } else {
            default_name
        };

        let mut subjects = IndexMap::new();
        subjects.insert(name.to_string(), String::new());

        Self {
            subjects,
            current: name.to_string(),
        }
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Insert an empty subject named `name` and make it current.
    ///
    /// Fails (and changes nothing) when `name` is empty.  A name that
    /// already exists is overwritten silently — its material is reset to
    /// the empty string, matching a fresh folder.
    pub fn create(&mut self, name: &str) -> Result<(), SubjectError> {
        if name.is_empty() {
            return Err(SubjectError::EmptyName);
        }

        self.subjects.insert(name.to_string(), String::new());
        self.current = name.to_string();
        Ok(())
    }

    /// Make `name` the current subject.
    ///
    /// Fails when `name` is not a known subject; the current pointer is
    /// left untouched in that case.
    pub fn select(&mut self, name: &str) -> Result<(), SubjectError> {
        if !self.subjects.contains_key(name) {
            return Err(SubjectError::Unknown(name.to_string()));
        }

        self.current = name.to_string();
        Ok(())
    }

    /// Replace the current subject's material with `text`.
    pub fn set_current_text(&mut self, text: String) {
        self.subjects.insert(self.current.clone(), text);
    }

    /// Append `suffix` to the current subject's material.
    pub fn append_current_text(&mut self, suffix: &str) {
        self.subjects
            .entry(self.current.clone())
            .or_default()
            .push_str(suffix);
    }

    /// Append `suffix` to the named subject's material.
    ///
    /// Fails when `name` is not a known subject.  Used when a background
    /// save action finishes: the block lands in the subject it was started
    /// for, whatever is current by then.
    pub fn append_text(&mut self, name: &str, suffix: &str) -> Result<(), SubjectError> {
        match self.subjects.get_mut(name) {
            Some(material) => {
                material.push_str(suffix);
                Ok(())
            }
            None => Err(SubjectError::Unknown(name.to_string())),
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Name of the current subject.
    pub fn current_name(&self) -> &str {
        &self.current
    }

    /// Material of the current subject.
    pub fn current_text(&self) -> &str {
        self.subjects
            .get(&self.current)
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Material of the named subject, if it exists.
    pub fn text_of(&self, name: &str) -> Option<&str> {
        self.subjects.get(name).map(String::as_str)
    }

    /// Subject names in creation order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.subjects.keys().map(String::as_str)
    }

    /// Number of subjects in the store (always ≥ 1).
    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    /// Always `false`; present for completeness next to [`len`](Self::len).
    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
