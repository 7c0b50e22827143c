//! Wire entities.
//!
//! Field names follow the backend's snake_case serializers; camelCase
//! aliases are accepted so either convention decodes.

use serde::{Deserialize, Serialize};

/// Server-assigned identifier.
pub type Id = u64;

/// Anything a collection can hold, keyed by id.
pub trait Entity: Clone + Send + Sync + 'static {
    fn id(&self) -> Id;
}

/// The signed-in user's public reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(alias = "pk", alias = "userId")]
    pub user_id: Id,
    pub username: String,
    #[serde(alias = "profileId")]
    pub profile_id: Id,
    #[serde(default, alias = "profile_image", alias = "avatarUrl")]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Id,
    /// Owner's username.
    #[serde(default)]
    pub owner: String,
    #[serde(default, alias = "ownerId")]
    pub owner_id: Option<Id>,
    #[serde(default, alias = "profileId")]
    pub profile_id: Option<Id>,
    #[serde(default, alias = "profileImage")]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    /// Image URL.
    #[serde(default)]
    pub image: String,
    #[serde(default, alias = "artistName")]
    pub artist_name: Option<String>,
    #[serde(default, alias = "yearOfArtwork")]
    pub year_of_artwork: Option<i32>,
    #[serde(default, alias = "isPrivate")]
    pub is_private: bool,
    #[serde(default, alias = "likesCount")]
    pub likes_count: u32,
    #[serde(default, alias = "commentsCount")]
    pub comments_count: u32,
    /// Present when the current user likes this post.
    #[serde(default, alias = "likeId")]
    pub like_id: Option<Id>,
    #[serde(default, alias = "bookmarkId")]
    pub bookmark_id: Option<Id>,
    #[serde(default, alias = "isOwner")]
    pub is_owner: Option<bool>,
    #[serde(default, alias = "createdAt")]
    pub created_at: String,
    #[serde(default, alias = "updatedAt")]
    pub updated_at: String,
}

impl Entity for Post {
    fn id(&self) -> Id {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Id,
    #[serde(default)]
    pub owner: String,
    #[serde(default, alias = "isOwner")]
    pub is_owner: bool,
    #[serde(default, alias = "profileId")]
    pub profile_id: Option<Id>,
    #[serde(default, alias = "profileImage")]
    pub profile_image: Option<String>,
    /// Parent post.
    #[serde(alias = "post_id", alias = "postId")]
    pub post: Id,
    #[serde(default)]
    pub content: String,
    #[serde(default, alias = "createdAt")]
    pub created_at: String,
    #[serde(default, alias = "updatedAt")]
    pub updated_at: String,
}

impl Entity for Comment {
    fn id(&self) -> Id {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Id,
    /// Owner's username.
    #[serde(default)]
    pub owner: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Bio.
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, alias = "isOwner")]
    pub is_owner: bool,
    /// Present when the current user follows this profile.
    #[serde(default, alias = "followingId")]
    pub following_id: Option<Id>,
    #[serde(default, alias = "postsCount")]
    pub posts_count: u32,
    #[serde(default, alias = "followersCount")]
    pub followers_count: u32,
    #[serde(default, alias = "followingCount")]
    pub following_count: u32,
    #[serde(default, alias = "createdAt")]
    pub created_at: String,
    #[serde(default, alias = "updatedAt")]
    pub updated_at: String,
}

impl Entity for Profile {
    fn id(&self) -> Id {
        self.id
    }
}

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub results: Vec<T>,
    /// Next page as an absolute URL or API path.
    #[serde(default)]
    pub next: Option<String>,
}

// ── Auth payloads ───────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(alias = "access", alias = "accessToken")]
    pub access_token: String,
    #[serde(alias = "refresh", alias = "refreshToken")]
    pub refresh_token: String,
    pub user: Identity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshResponse {
    #[serde(alias = "access", alias = "accessToken")]
    pub access_token: String,
    /// Set when the backend rotates refresh tokens too.
    #[serde(default, alias = "refresh", alias = "refreshToken")]
    pub refresh_token: Option<String>,
}

/// `GET /auth/me` answers either `{user: …}` or the user itself.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MeResponse {
    Wrapped { user: Identity },
    Bare(Identity),
}

impl MeResponse {
    pub fn into_identity(self) -> Identity {
        match self {
            MeResponse::Wrapped { user } | MeResponse::Bare(user) => user,
        }
    }
}

// ── Drafts ──────────────────────────────────────────────────────────

/// A file picked for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub filename: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(filename: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            mime: mime.into(),
            bytes,
        }
    }
}

/// Post create/edit form contents. `image` is required on create only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
    pub artist_name: Option<String>,
    pub year_of_artwork: Option<i32>,
    pub is_private: bool,
    pub image: Option<ImageUpload>,
}

/// Profile edit form contents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileDraft {
    pub name: String,
    pub content: String,
    pub image: Option<ImageUpload>,
}
