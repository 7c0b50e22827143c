//! Comment requests.

use artshare_flux::Request;

use crate::model::Id;

#[derive(Debug, Clone)]
pub struct LoadCommentsReq {
    pub post: Id,
}

impl Request for LoadCommentsReq {
    const PATH: &'static str = "comments/load";
}

#[derive(Debug, Clone)]
pub struct LoadMoreCommentsReq {
    pub post: Id,
}

impl Request for LoadMoreCommentsReq {
    const PATH: &'static str = "comments/load-more";
}

#[derive(Debug, Clone)]
pub struct CreateCommentReq {
    pub post: Id,
    pub content: String,
}

impl Request for CreateCommentReq {
    const PATH: &'static str = "comment/create";
}

#[derive(Debug, Clone)]
pub struct EditCommentReq {
    pub id: Id,
    pub post: Id,
    pub content: String,
}

impl Request for EditCommentReq {
    const PATH: &'static str = "comment/edit";
}

#[derive(Debug, Clone)]
pub struct DeleteCommentReq {
    pub id: Id,
    pub post: Id,
}

impl Request for DeleteCommentReq {
    const PATH: &'static str = "comment/delete";
}
