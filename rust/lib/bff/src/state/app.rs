//! App-level state: `app/route` and `app/notice`.

use crate::model::Id;

/// Navigation route. Coordinators set it as a side effect, e.g. `/login`
/// after a forced logout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppRoute(pub String);

impl AppRoute {
    pub const PATH: &'static str = "app/route";

    pub const LOGIN: &'static str = "/login";
    pub const HOME: &'static str = "/";

    pub fn post(id: Id) -> Self {
        Self(format!("/posts/{id}"))
    }

    pub fn profile(id: Id) -> Self {
        Self(format!("/profiles/{id}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Transient message for a toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub const PATH: &'static str = "app/notice";

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}
