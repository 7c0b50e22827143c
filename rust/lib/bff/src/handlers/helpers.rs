//! Shared helpers for handlers.

use artshare_client::FieldErrors;
use artshare_flux::StateStore;

use crate::state::{AppRoute, FormState, Notice};

pub fn navigate(store: &StateStore, route: AppRoute) {
    store.set(AppRoute::PATH, route);
}

pub fn notify(store: &StateStore, notice: Notice) {
    store.set(Notice::PATH, notice);
}

pub fn form_busy(store: &StateStore, form: &str) {
    store.set(&FormState::path(form), FormState::busy());
}

pub fn form_submitted(store: &StateStore, form: &str) {
    store.set(&FormState::path(form), FormState::submitted());
}

pub fn form_failed(store: &StateStore, form: &str, errors: FieldErrors) {
    store.set(&FormState::path(form), FormState::failed(errors));
}

/// Drop everything that was fetched on behalf of the previous user.
pub fn clear_user_views(store: &StateStore) {
    for prefix in ["posts", "post", "comments", "profiles", "profile", "form"] {
        for (path, _) in store.scan(prefix) {
            store.remove(&path);
        }
    }
}
