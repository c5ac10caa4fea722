//! The Gemini API credential.
//!
//! The secret is resolved once at startup from the `GEMINI_API_KEY`
//! environment variable, or typed into the masked sidebar field.  It is
//! never part of [`crate::config::AppConfig`], never serialized, and the
//! `Debug` impl redacts it so it cannot leak through logs.

use std::fmt;

/// A Gemini API key, wrapped so it does not print or persist by accident.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Environment variable checked at startup.
    pub const ENV_VAR: &'static str = "GEMINI_API_KEY";

    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Read the credential from [`Self::ENV_VAR`], if set and non-empty.
    pub fn from_env() -> Option<Self> {
        match std::env::var(Self::ENV_VAR) {
            Ok(value) if !value.trim().is_empty() => Some(Self(value)),
            _ => None,
        }
    }

    /// Whether no usable secret is present.
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// The raw secret, for the request header only.
    pub fn reveal(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            f.write_str("Credential(<empty>)")
        } else {
            f.write_str("Credential(<redacted>)")
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_never_prints_the_secret() {
        let credential = Credential::new("AIza-super-secret");
        let printed = format!("{credential:?}");
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("redacted"));
    }

    #[test]
    fn empty_and_whitespace_count_as_missing() {
        assert!(Credential::default().is_empty());
        assert!(Credential::new("   ").is_empty());
        assert!(!Credential::new("AIza123").is_empty());
    }
}
