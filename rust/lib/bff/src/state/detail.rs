//! Single-entity views: `post/{id}` and `profile/{id}`.

use crate::model::{Id, Post, Profile};

/// One entity shown on its own page.
///
/// `NotFound` is distinct from `Failed` so the view can render a
/// not-found page rather than a generic error.
#[derive(Debug, Clone, PartialEq)]
pub enum Detail<T> {
    Loading,
    Ready(T),
    NotFound,
    Failed(String),
}

impl<T> Detail<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Detail::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn ready_mut(&mut self) -> Option<&mut T> {
        match self {
            Detail::Ready(value) => Some(value),
            _ => None,
        }
    }
}

pub type PostDetail = Detail<Post>;
pub type ProfileDetail = Detail<Profile>;

impl Detail<Post> {
    /// Dynamic path: `post/{id}`.
    pub fn path(id: Id) -> String {
        format!("post/{id}")
    }
}

impl Detail<Profile> {
    /// Dynamic path: `profile/{id}`.
    pub fn path(id: Id) -> String {
        format!("profile/{id}")
    }
}
