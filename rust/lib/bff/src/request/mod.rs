//! Request definitions.
//!
//! Each struct is a typed intent a view emits through `Flux::emit`. The
//! `PATH` const is the dispatch path its handler is registered under.

pub mod auth;
pub mod comment;
pub mod post;
pub mod profile;

pub use auth::{ChangePasswordReq, LoginReq, LogoutReq, RegisterReq, RestoreReq};
pub use comment::{
    CreateCommentReq, DeleteCommentReq, EditCommentReq, LoadCommentsReq, LoadMoreCommentsReq,
};
pub use post::{
    CreatePostReq, DeletePostReq, EditPostReq, LoadMorePostsReq, LoadPostReq, LoadPostsReq,
    ToggleBookmarkReq, ToggleLikeReq,
};
pub use profile::{
    EditProfileReq, LoadMoreProfilesReq, LoadProfileReq, LoadTopProfilesReq, ToggleFollowReq,
};
