//! Profile handler implementations.

use artshare_flux::StateStore;
use tracing::debug;

use super::helpers;
use crate::coordinators::Gallery;
use crate::request::*;
use crate::state::*;

/// Handle `profiles/load-top`.
pub async fn handle_load_top(gallery: &Gallery) {
    if let Err(e) = gallery.top_profiles().load().await {
        debug!(error = %e, "top profiles failed to load");
    }
}

/// Handle `profiles/load-more`.
pub async fn handle_load_more(gallery: &Gallery) {
    if let Err(e) = gallery.top_profiles().load_more().await {
        debug!(error = %e, "next profile page failed to load");
    }
}

/// Handle `profile/load`.
pub async fn handle_load(req: &LoadProfileReq, gallery: &Gallery) {
    if let Err(e) = gallery.load_profile(req.id).await {
        debug!(profile = req.id, error = %e, "profile failed to load");
    }
}

/// Handle `profile/follow`.
pub async fn handle_follow(req: &ToggleFollowReq, store: &StateStore, gallery: &Gallery) {
    if let Err(e) = gallery.toggle_follow(req.profile).await {
        helpers::notify(store, Notice::error(e.user_message()));
    }
}

/// Handle `profile/edit`.
pub async fn handle_edit(req: &EditProfileReq, store: &StateStore, gallery: &Gallery) {
    helpers::form_busy(store, FormState::PROFILE);
    match gallery.edit_profile(req.id, &req.draft).await {
        Ok(profile) => {
            helpers::form_submitted(store, FormState::PROFILE);
            helpers::notify(store, Notice::success("Profile updated."));
            helpers::navigate(store, AppRoute::profile(profile.id));
        }
        Err(e) => helpers::form_failed(store, FormState::PROFILE, e.field_errors()),
    }
}
