//! Paginated collection store.
//!
//! A [`CollectionStore`] drives one [`Paginated`] slot in the state store:
//! it fetches the first page for a [`Listing`], appends later pages, and
//! applies local patches. All read-modify-write steps go through
//! `StateStore::update`, so guards and generation checks are atomic.

use std::fmt::Debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use artshare_client::{ApiError, Endpoints, HttpClient};
use artshare_flux::StateStore;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::model::{Comment, Entity, Id, Page, Post, Profile};
use crate::state::{End, Paginated};

/// A paginated query bound to a state path.
pub trait Listing: Clone + Debug + Send + Sync + 'static {
    type Item: Entity + DeserializeOwned + Debug;

    /// State path of the collection.
    fn path(&self) -> String;

    /// API path of the first page.
    fn first_page(&self, endpoints: &Endpoints) -> String;
}

// ── Listings ────────────────────────────────────────────────────────

/// Which posts a post listing shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostScope {
    /// Everything, newest first.
    All,
    /// Posts by profiles that `profile` follows.
    FollowedBy(Id),
    /// Posts owned by `profile`.
    OwnedBy(Id),
    /// Posts `profile` liked, most recently liked first.
    LikedBy(Id),
    /// Posts `profile` bookmarked.
    BookmarkedBy(Id),
}

impl PostScope {
    fn path(&self) -> String {
        match self {
            PostScope::All => "posts/feed".to_string(),
            PostScope::FollowedBy(id) => format!("posts/following/{id}"),
            PostScope::OwnedBy(id) => format!("posts/profile/{id}"),
            PostScope::LikedBy(id) => format!("posts/liked/{id}"),
            PostScope::BookmarkedBy(id) => format!("posts/bookmarked/{id}"),
        }
    }

    fn params(&self) -> Vec<(&'static str, String)> {
        match self {
            PostScope::All => Vec::new(),
            PostScope::FollowedBy(id) => vec![("owner__followed__owner__profile", id.to_string())],
            PostScope::OwnedBy(id) => vec![("owner__profile", id.to_string())],
            PostScope::LikedBy(id) => vec![
                ("likes__owner__profile", id.to_string()),
                ("ordering", "-likes__created_at".to_string()),
            ],
            PostScope::BookmarkedBy(id) => vec![("bookmarks__owner__profile", id.to_string())],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostListing {
    pub scope: PostScope,
    pub search: String,
}

impl PostListing {
    pub fn new(scope: PostScope) -> Self {
        Self {
            scope,
            search: String::new(),
        }
    }

    pub fn feed() -> Self {
        Self::new(PostScope::All)
    }

    #[must_use]
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = term.into();
        self
    }
}

impl Listing for PostListing {
    type Item = Post;

    fn path(&self) -> String {
        self.scope.path()
    }

    fn first_page(&self, endpoints: &Endpoints) -> String {
        let mut params = self.scope.params();
        params.push(("search", self.search.trim().to_string()));
        let params: Vec<(&str, &str)> = params.iter().map(|(k, v)| (*k, v.as_str())).collect();
        Endpoints::with_query(&endpoints.posts, &params)
    }
}

/// Comments under one post, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentListing {
    pub post: Id,
}

impl CommentListing {
    pub fn path_for(post: Id) -> String {
        format!("comments/{post}")
    }
}

impl Listing for CommentListing {
    type Item = Comment;

    fn path(&self) -> String {
        Self::path_for(self.post)
    }

    fn first_page(&self, endpoints: &Endpoints) -> String {
        Endpoints::with_query(&endpoints.comments, &[("post", &self.post.to_string())])
    }
}

/// The "top profiles" aside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileListing {
    pub ordering: String,
}

impl ProfileListing {
    pub const TOP_PATH: &'static str = "profiles/top";

    /// Most-followed first.
    pub fn top() -> Self {
        Self {
            ordering: "-followers_count".into(),
        }
    }
}

impl Listing for ProfileListing {
    type Item = Profile;

    fn path(&self) -> String {
        Self::TOP_PATH.to_string()
    }

    fn first_page(&self, endpoints: &Endpoints) -> String {
        Endpoints::with_query(&endpoints.profiles, &[("ordering", &self.ordering)])
    }
}

// ── Store ───────────────────────────────────────────────────────────

/// Source of load generations. Never reused, even after a slot is removed.
static GENERATIONS: AtomicU64 = AtomicU64::new(1);

fn next_generation() -> u64 {
    GENERATIONS.fetch_add(1, Ordering::Relaxed)
}

pub struct CollectionStore<L: Listing> {
    store: Arc<StateStore>,
    http: Arc<HttpClient>,
    listing: L,
}

impl<L: Listing> CollectionStore<L> {
    pub fn new(store: Arc<StateStore>, http: Arc<HttpClient>, listing: L) -> Self {
        Self {
            store,
            http,
            listing,
        }
    }

    pub fn listing(&self) -> &L {
        &self.listing
    }

    pub fn path(&self) -> String {
        self.listing.path()
    }

    /// Current contents.
    pub fn get(&self) -> Option<Paginated<L::Item>> {
        self.store.get_as(&self.path())
    }

    /// Reset the collection and fetch the first page of the listing.
    ///
    /// Returns `Ok(false)` when a newer `load` on the same path started
    /// before this one finished; its response is then dropped.
    pub async fn load(&self) -> Result<bool, ApiError> {
        let path = self.path();
        let query = self.listing.first_page(self.http.endpoints());

        let generation = next_generation();
        self.store
            .set(&path, Paginated::<L::Item>::loading(query.clone(), generation));
        debug!(%path, %query, generation, "loading first page");

        let (page, error) = split(self.http.get_json::<Page<L::Item>>(&query).await);
        let message = error.as_ref().map(ApiError::user_message);

        let applied = self.store.update::<Paginated<L::Item>, _>(&path, |current| {
            let current = current.filter(|c| c.generation == generation)?;
            let mut next = current.clone();
            next.loading = false;
            next.error = message;
            if let Some(page) = page {
                next.items.clear();
                next.merge_page(page);
            }
            Some(next)
        });

        if !applied {
            warn!(%path, %query, generation, "discarding stale first page");
            return Ok(false);
        }
        error.map_or(Ok(true), Err)
    }

    /// Fetch the page at the cursor and merge it.
    ///
    /// A no-op returning `Ok(false)` when there is no cursor or a fetch is
    /// already in flight. On failure the items and cursor stay as they were.
    pub async fn load_more(&self) -> Result<bool, ApiError> {
        let path = self.path();

        let mut claim: Option<(String, u64)> = None;
        self.store.update::<Paginated<L::Item>, _>(&path, |current| {
            let current = current?;
            if current.loading || current.loading_more {
                return None;
            }
            let cursor = current.cursor.clone()?;
            claim = Some((cursor, current.generation));
            let mut next = current.clone();
            next.loading_more = true;
            Some(next)
        });
        let Some((cursor, generation)) = claim else {
            debug!(%path, "load_more skipped");
            return Ok(false);
        };
        debug!(%path, %cursor, "loading next page");

        let (page, error) = split(self.http.get_json::<Page<L::Item>>(&cursor).await);
        let message = error.as_ref().map(ApiError::user_message);

        let applied = self.store.update::<Paginated<L::Item>, _>(&path, |current| {
            let current = current.filter(|c| c.generation == generation)?;
            let mut next = current.clone();
            next.loading_more = false;
            next.error = message;
            if let Some(page) = page {
                next.merge_page(page);
            }
            Some(next)
        });
        if !applied {
            warn!(%path, generation, "collection reloaded while fetching more, page dropped");
            return Ok(false);
        }
        error.map_or(Ok(true), Err)
    }

    /// Apply `f` to the item with `id`, in place.
    pub fn patch(&self, id: Id, f: impl FnOnce(&mut L::Item)) -> bool {
        patch_one(&self.store, &self.path(), id, f)
    }

    pub fn append(&self, item: L::Item, end: End) -> bool {
        self.store
            .update::<Paginated<L::Item>, _>(&self.path(), |current| {
                let mut next = current?.clone();
                next.insert(item, end).then_some(next)
            })
    }

    pub fn remove(&self, id: Id) -> bool {
        self.store
            .update::<Paginated<L::Item>, _>(&self.path(), |current| {
                let mut next = current?.clone();
                next.remove(id).then_some(next)
            })
    }
}

fn split<T>(result: Result<T, ApiError>) -> (Option<T>, Option<ApiError>) {
    match result {
        Ok(value) => (Some(value), None),
        Err(e) => (None, Some(e)),
    }
}

/// Patch one item in the collection at `path`, if both exist.
pub(crate) fn patch_one<T: Entity>(
    store: &StateStore,
    path: &str,
    id: Id,
    f: impl FnOnce(&mut T),
) -> bool {
    store.update::<Paginated<T>, _>(path, |current| {
        let current = current?;
        if !current.contains(id) {
            return None;
        }
        let mut next = current.clone();
        next.patch(id, f);
        Some(next)
    })
}

/// Patch the item with `id` in every collection under `prefix`.
pub(crate) fn patch_all<T: Entity>(
    store: &StateStore,
    prefix: &str,
    id: Id,
    f: impl Fn(&mut T),
) -> usize {
    store.update_all::<Paginated<T>, _>(prefix, |_, current| {
        if !current.contains(id) {
            return None;
        }
        let mut next = current.clone();
        next.patch(id, &f);
        Some(next)
    })
}

/// Remove the item with `id` from every collection under `prefix`.
pub(crate) fn remove_all<T: Entity>(store: &StateStore, prefix: &str, id: Id) -> usize {
    store.update_all::<Paginated<T>, _>(prefix, |_, current| {
        let mut next = current.clone();
        next.remove(id).then_some(next)
    })
}
