//! Session state, stored at `session/state`.

use artshare_client::FieldErrors;

use crate::model::Identity;

/// What the view knows about the current user. Tokens never appear here.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub phase: SessionPhase,
    pub identity: Option<Identity>,
    /// A login/register call is in flight.
    pub busy: bool,
    /// Errors from the last login/register attempt.
    pub errors: FieldErrors,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Restoring persisted tokens at startup.
    Loading,
    Anonymous,
    Authenticated,
}

impl SessionState {
    pub const PATH: &'static str = "session/state";

    pub fn loading() -> Self {
        Self {
            phase: SessionPhase::Loading,
            identity: None,
            busy: false,
            errors: FieldErrors::new(),
        }
    }

    pub fn anonymous() -> Self {
        Self {
            phase: SessionPhase::Anonymous,
            ..Self::loading()
        }
    }

    pub fn authenticated(identity: Identity) -> Self {
        Self {
            phase: SessionPhase::Authenticated,
            identity: Some(identity),
            ..Self::loading()
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.phase == SessionPhase::Authenticated
    }
}
