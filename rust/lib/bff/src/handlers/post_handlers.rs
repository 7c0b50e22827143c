//! Post handler implementations.

use artshare_flux::StateStore;
use tracing::debug;

use super::helpers;
use crate::coordinators::Gallery;
use crate::error::MutationError;
use crate::request::*;
use crate::state::*;

/// Handle `posts/load`. Failures land in the collection's `error`.
pub async fn handle_load(req: &LoadPostsReq, gallery: &Gallery) {
    if let Err(e) = gallery.posts(req.listing.clone()).load().await {
        debug!(error = %e, "post listing failed to load");
    }
}

/// Handle `posts/load-more`.
pub async fn handle_load_more(req: &LoadMorePostsReq, gallery: &Gallery) {
    if let Err(e) = gallery.posts(req.listing.clone()).load_more().await {
        debug!(error = %e, "next post page failed to load");
    }
}

/// Handle `post/load`. The outcome is in `post/{id}`.
pub async fn handle_load_one(req: &LoadPostReq, gallery: &Gallery) {
    if let Err(e) = gallery.load_post(req.id).await {
        debug!(post = req.id, error = %e, "post failed to load");
    }
}

/// Handle `post/create`.
pub async fn handle_create(req: &CreatePostReq, store: &StateStore, gallery: &Gallery) {
    helpers::form_busy(store, FormState::POST);
    match gallery.create_post(&req.draft).await {
        Ok(post) => {
            helpers::form_submitted(store, FormState::POST);
            helpers::notify(store, Notice::success("Post created."));
            helpers::navigate(store, AppRoute::post(post.id));
        }
        Err(e) => helpers::form_failed(store, FormState::POST, e.field_errors()),
    }
}

/// Handle `post/edit`.
pub async fn handle_edit(req: &EditPostReq, store: &StateStore, gallery: &Gallery) {
    helpers::form_busy(store, FormState::POST);
    match gallery.edit_post(req.id, &req.draft).await {
        Ok(post) => {
            helpers::form_submitted(store, FormState::POST);
            helpers::notify(store, Notice::success("Post updated."));
            helpers::navigate(store, AppRoute::post(post.id));
        }
        Err(e) => helpers::form_failed(store, FormState::POST, e.field_errors()),
    }
}

/// Handle `post/delete`.
pub async fn handle_delete(req: &DeletePostReq, store: &StateStore, gallery: &Gallery) {
    match gallery.delete_post(req.id).await {
        Ok(()) => {
            helpers::notify(store, Notice::success("Post deleted."));
            helpers::navigate(store, AppRoute(AppRoute::HOME.into()));
        }
        Err(e) => report(store, &e),
    }
}

/// Handle `post/like`.
pub async fn handle_like(req: &ToggleLikeReq, store: &StateStore, gallery: &Gallery) {
    if let Err(e) = gallery.toggle_like(req.post).await {
        report(store, &e);
    }
}

/// Handle `post/bookmark`.
pub async fn handle_bookmark(req: &ToggleBookmarkReq, store: &StateStore, gallery: &Gallery) {
    if let Err(e) = gallery.toggle_bookmark(req.post).await {
        report(store, &e);
    }
}

fn report(store: &StateStore, e: &MutationError) {
    helpers::notify(store, Notice::error(e.user_message()));
}
