//! Like and bookmark toggles.

use artshare_client::ToggleOutcome;
use serde_json::json;
use tracing::{info, warn};

use super::Gallery;
use crate::error::MutationError;
use crate::model::{Id, Post};

impl Gallery {
    /// Like `post`, or unlike it when the server says the like existed.
    pub async fn toggle_like(&self, post: Id) -> Result<ToggleOutcome, MutationError> {
        self.signed_in()?;
        let known = self.find_post(post);
        let outcome = self
            .http
            .toggle(&self.endpoints().likes, &json!({ "post": post }))
            .await?;
        let like_id = outcome.created_id();
        if drifted(known.as_ref(), like_id) {
            warn!(post, liked = like_id.is_some(), "server like state differs from local copy");
        }
        let copies = self.patch_post(post, |p| apply_like(p, like_id));
        info!(post, liked = like_id.is_some(), copies, "like toggled");
        Ok(outcome)
    }

    pub async fn toggle_bookmark(&self, post: Id) -> Result<ToggleOutcome, MutationError> {
        self.signed_in()?;
        let outcome = self
            .http
            .toggle(&self.endpoints().bookmarks, &json!({ "post": post }))
            .await?;
        let bookmark_id = outcome.created_id();
        let copies = self.patch_post(post, |p| p.bookmark_id = bookmark_id);
        info!(post, bookmarked = bookmark_id.is_some(), copies, "bookmark toggled");
        Ok(outcome)
    }
}

/// A toggle is expected to create when the local copy is unliked and to
/// remove when it is liked.
fn drifted(known: Option<&Post>, like_id: Option<Id>) -> bool {
    known.is_some_and(|p| p.like_id.is_some() == like_id.is_some())
}

/// Move one copy of a post to the confirmed like state.
///
/// The count only moves when this copy's `like_id` actually flips, so a
/// copy that was already in the new state is not counted twice.
fn apply_like(post: &mut Post, like_id: Option<Id>) {
    match like_id {
        Some(id) => {
            if post.like_id.replace(id).is_none() {
                post.likes_count += 1;
            }
            post.likes_count = post.likes_count.max(1);
        }
        None => {
            if post.like_id.take().is_some() {
                post.likes_count = post.likes_count.saturating_sub(1);
            }
        }
    }
}
