//! Auth handler implementations.

use artshare_flux::StateStore;
use tracing::debug;

use super::helpers;
use crate::coordinators::Gallery;
use crate::request::*;
use crate::state::*;

/// Handle `auth/restore`.
pub async fn handle_restore(gallery: &Gallery) {
    let identity = gallery.restore().await;
    debug!(signed_in = identity.is_some(), "restore finished");
}

/// Handle `auth/login`.
pub async fn handle_login(req: &LoginReq, store: &StateStore, gallery: &Gallery) {
    helpers::form_busy(store, FormState::LOGIN);
    match gallery.session().login(&req.username, &req.password).await {
        Ok(identity) => {
            helpers::form_submitted(store, FormState::LOGIN);
            helpers::notify(store, Notice::success(format!("Welcome back, {}!", identity.username)));
            helpers::navigate(store, AppRoute(AppRoute::HOME.into()));
        }
        Err(e) => helpers::form_failed(store, FormState::LOGIN, e.field_errors()),
    }
}

/// Handle `auth/register`.
pub async fn handle_register(req: &RegisterReq, store: &StateStore, gallery: &Gallery) {
    helpers::form_busy(store, FormState::REGISTER);
    let result = gallery
        .session()
        .register(&req.username, &req.password, &req.password_confirm)
        .await;
    match result {
        Ok(identity) => {
            helpers::form_submitted(store, FormState::REGISTER);
            helpers::notify(store, Notice::success(format!("Welcome, {}!", identity.username)));
            helpers::navigate(store, AppRoute(AppRoute::HOME.into()));
        }
        Err(e) => helpers::form_failed(store, FormState::REGISTER, e.field_errors()),
    }
}

/// Handle `auth/logout`.
pub async fn handle_logout(store: &StateStore, gallery: &Gallery) {
    gallery.session().logout();
    helpers::clear_user_views(store);
    helpers::notify(store, Notice::success("You have logged out."));
    helpers::navigate(store, AppRoute(AppRoute::HOME.into()));
}

/// Handle `auth/change-password`.
pub async fn handle_change_password(req: &ChangePasswordReq, store: &StateStore, gallery: &Gallery) {
    helpers::form_busy(store, FormState::CHANGE_PASSWORD);
    let result = gallery
        .change_password(&req.current_password, &req.new_password, &req.new_password_confirm)
        .await;
    match result {
        Ok(()) => {
            helpers::form_submitted(store, FormState::CHANGE_PASSWORD);
            helpers::notify(store, Notice::success("Password changed."));
        }
        Err(e) => helpers::form_failed(store, FormState::CHANGE_PASSWORD, e.field_errors()),
    }
}
