//! Local form checks, run before any request is sent.

use artshare_client::FieldErrors;

/// Accumulates field errors; the first failure per field is kept.
#[derive(Debug, Default)]
pub struct Validator {
    errors: FieldErrors,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// `value` must contain something other than whitespace.
    #[must_use]
    pub fn require(self, field: &str, value: &str, message: &str) -> Self {
        self.check(!value.trim().is_empty(), field, message)
    }

    #[must_use]
    pub fn require_some<T>(self, field: &str, value: Option<&T>, message: &str) -> Self {
        self.check(value.is_some(), field, message)
    }

    #[must_use]
    pub fn check(mut self, ok: bool, field: &str, message: &str) -> Self {
        if !ok {
            self.errors.insert(field, message);
        }
        self
    }

    pub fn finish(self) -> Result<(), FieldErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

/// Single required-field check.
pub fn require(field: &str, value: &str, message: &str) -> Result<(), FieldErrors> {
    Validator::new().require(field, value, message).finish()
}
