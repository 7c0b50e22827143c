//! Form submission state, stored at `form/{name}`.

use artshare_client::FieldErrors;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormState {
    pub busy: bool,
    pub errors: FieldErrors,
    /// The last submission succeeded.
    pub submitted: bool,
}

impl FormState {
    pub const LOGIN: &'static str = "login";
    pub const REGISTER: &'static str = "register";
    pub const CHANGE_PASSWORD: &'static str = "change-password";
    pub const POST: &'static str = "post";
    pub const COMMENT: &'static str = "comment";
    pub const PROFILE: &'static str = "profile";

    /// Dynamic path: `form/{name}`.
    pub fn path(name: &str) -> String {
        format!("form/{name}")
    }

    pub fn busy() -> Self {
        Self {
            busy: true,
            ..Self::default()
        }
    }

    pub fn failed(errors: FieldErrors) -> Self {
        Self {
            errors,
            ..Self::default()
        }
    }

    pub fn submitted() -> Self {
        Self {
            submitted: true,
            ..Self::default()
        }
    }
}
