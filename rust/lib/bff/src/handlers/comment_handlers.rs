//! Comment handler implementations.

use artshare_flux::StateStore;
use tracing::debug;

use super::helpers;
use crate::coordinators::Gallery;
use crate::request::*;
use crate::state::*;

/// Handle `comments/load`.
pub async fn handle_load(req: &LoadCommentsReq, gallery: &Gallery) {
    if let Err(e) = gallery.comments(req.post).load().await {
        debug!(post = req.post, error = %e, "comments failed to load");
    }
}

/// Handle `comments/load-more`.
pub async fn handle_load_more(req: &LoadMoreCommentsReq, gallery: &Gallery) {
    if let Err(e) = gallery.comments(req.post).load_more().await {
        debug!(post = req.post, error = %e, "next comment page failed to load");
    }
}

/// Handle `comment/create`.
pub async fn handle_create(req: &CreateCommentReq, store: &StateStore, gallery: &Gallery) {
    helpers::form_busy(store, FormState::COMMENT);
    match gallery.create_comment(req.post, &req.content).await {
        Ok(_) => helpers::form_submitted(store, FormState::COMMENT),
        Err(e) => helpers::form_failed(store, FormState::COMMENT, e.field_errors()),
    }
}

/// Handle `comment/edit`.
pub async fn handle_edit(req: &EditCommentReq, store: &StateStore, gallery: &Gallery) {
    helpers::form_busy(store, FormState::COMMENT);
    match gallery.edit_comment(req.id, req.post, &req.content).await {
        Ok(_) => helpers::form_submitted(store, FormState::COMMENT),
        Err(e) => helpers::form_failed(store, FormState::COMMENT, e.field_errors()),
    }
}

/// Handle `comment/delete`.
pub async fn handle_delete(req: &DeleteCommentReq, store: &StateStore, gallery: &Gallery) {
    match gallery.delete_comment(req.id, req.post).await {
        Ok(()) => helpers::notify(store, Notice::success("Comment deleted.")),
        Err(e) => helpers::notify(store, Notice::error(e.user_message())),
    }
}
