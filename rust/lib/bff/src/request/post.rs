//! Post requests.

use artshare_flux::Request;

use crate::collection::PostListing;
use crate::model::{Id, PostDraft};

/// (Re)load a post listing from its first page.
#[derive(Debug, Clone)]
pub struct LoadPostsReq {
    pub listing: PostListing,
}

impl Request for LoadPostsReq {
    const PATH: &'static str = "posts/load";
}

/// Fetch the next page of a post listing.
#[derive(Debug, Clone)]
pub struct LoadMorePostsReq {
    pub listing: PostListing,
}

impl Request for LoadMorePostsReq {
    const PATH: &'static str = "posts/load-more";
}

/// Load one post into `post/{id}`.
#[derive(Debug, Clone)]
pub struct LoadPostReq {
    pub id: Id,
}

impl Request for LoadPostReq {
    const PATH: &'static str = "post/load";
}

#[derive(Debug, Clone)]
pub struct CreatePostReq {
    pub draft: PostDraft,
}

impl Request for CreatePostReq {
    const PATH: &'static str = "post/create";
}

#[derive(Debug, Clone)]
pub struct EditPostReq {
    pub id: Id,
    pub draft: PostDraft,
}

impl Request for EditPostReq {
    const PATH: &'static str = "post/edit";
}

#[derive(Debug, Clone)]
pub struct DeletePostReq {
    pub id: Id,
}

impl Request for DeletePostReq {
    const PATH: &'static str = "post/delete";
}

/// Like or unlike, depending on the current state.
#[derive(Debug, Clone)]
pub struct ToggleLikeReq {
    pub post: Id,
}

impl Request for ToggleLikeReq {
    const PATH: &'static str = "post/like";
}

#[derive(Debug, Clone)]
pub struct ToggleBookmarkReq {
    pub post: Id,
}

impl Request for ToggleBookmarkReq {
    const PATH: &'static str = "post/bookmark";
}
