//! Profile requests.

use artshare_flux::Request;

use crate::model::{Id, ProfileDraft};

/// Load the "top profiles" aside.
#[derive(Debug, Clone)]
pub struct LoadTopProfilesReq;

impl Request for LoadTopProfilesReq {
    const PATH: &'static str = "profiles/load-top";
}

#[derive(Debug, Clone)]
pub struct LoadMoreProfilesReq;

impl Request for LoadMoreProfilesReq {
    const PATH: &'static str = "profiles/load-more";
}

/// Load one profile into `profile/{id}`.
#[derive(Debug, Clone)]
pub struct LoadProfileReq {
    pub id: Id,
}

impl Request for LoadProfileReq {
    const PATH: &'static str = "profile/load";
}

/// Follow or unfollow, depending on the current state.
#[derive(Debug, Clone)]
pub struct ToggleFollowReq {
    pub profile: Id,
}

impl Request for ToggleFollowReq {
    const PATH: &'static str = "profile/follow";
}

#[derive(Debug, Clone)]
pub struct EditProfileReq {
    pub id: Id,
    pub draft: ProfileDraft,
}

impl Request for EditProfileReq {
    const PATH: &'static str = "profile/edit";
}
