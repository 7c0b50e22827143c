//! Mutation coordinators.
//!
//! [`Gallery`] is the context every coordinator runs in. A coordinator
//! calls the API, waits for the server to confirm, and only then patches
//! every copy of the affected entity: each collection under `posts/` or
//! `profiles/` and the matching `post/{id}` or `profile/{id}` detail.
//! On failure nothing is patched.

mod comments;
mod follow;
mod posts;
mod profiles;
mod reactions;

use std::sync::Arc;

use artshare_client::{
    ApiError, ClientConfig, Endpoints, FileTokenStorage, HttpClient, MemoryTokenStorage,
    ReqwestTransport, TokenStorage, Transport,
};
use artshare_flux::StateStore;
use tracing::debug;

use crate::collection::{CollectionStore, CommentListing, PostListing, ProfileListing, patch_all};
use crate::error::{AuthError, MutationError};
use crate::model::{Entity, Id, Identity, Post, Profile};
use crate::session::Session;
use crate::state::{Detail, Paginated, PostDetail, ProfileDetail};

/// Prefix of every post collection.
pub(crate) const POSTS: &str = "posts";
/// Prefix of every profile collection.
pub(crate) const PROFILES: &str = "profiles";

pub struct Gallery {
    store: Arc<StateStore>,
    http: Arc<HttpClient>,
    session: Arc<Session>,
}

impl Gallery {
    pub fn new(
        store: Arc<StateStore>,
        transport: Arc<dyn Transport>,
        endpoints: Endpoints,
        tokens: Arc<dyn TokenStorage>,
    ) -> Self {
        let session = Arc::new(Session::new(
            Arc::clone(&transport),
            endpoints.clone(),
            tokens,
            Arc::clone(&store),
        ));
        let http = Arc::new(HttpClient::new(transport, session.clone(), endpoints));
        Self {
            store,
            http,
            session,
        }
    }

    /// Production wiring: reqwest transport, tokens in the configured file
    /// (kept in memory when none is configured).
    pub fn from_config(store: Arc<StateStore>, config: &ClientConfig) -> Result<Self, ApiError> {
        let transport = ReqwestTransport::new(config.base_url.clone(), config.timeout())?;
        let tokens: Arc<dyn TokenStorage> = match &config.token_file {
            Some(path) => Arc::new(FileTokenStorage::new(path.clone())),
            None => Arc::new(MemoryTokenStorage::new()),
        };
        Ok(Self::new(
            store,
            Arc::new(transport),
            config.endpoints.clone(),
            tokens,
        ))
    }

    pub fn store(&self) -> &Arc<StateStore> {
        &self.store
    }

    pub fn http(&self) -> &Arc<HttpClient> {
        &self.http
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn endpoints(&self) -> &Endpoints {
        self.http.endpoints()
    }

    // ====================================================================
    // Collections
    // ====================================================================

    pub fn posts(&self, listing: PostListing) -> CollectionStore<PostListing> {
        CollectionStore::new(Arc::clone(&self.store), Arc::clone(&self.http), listing)
    }

    pub fn comments(&self, post: Id) -> CollectionStore<CommentListing> {
        CollectionStore::new(
            Arc::clone(&self.store),
            Arc::clone(&self.http),
            CommentListing { post },
        )
    }

    pub fn top_profiles(&self) -> CollectionStore<ProfileListing> {
        CollectionStore::new(
            Arc::clone(&self.store),
            Arc::clone(&self.http),
            ProfileListing::top(),
        )
    }

    // ====================================================================
    // Session
    // ====================================================================

    pub async fn restore(&self) -> Option<Identity> {
        self.session.restore(&self.http).await
    }

    pub async fn change_password(
        &self,
        current: &str,
        new: &str,
        confirm: &str,
    ) -> Result<(), AuthError> {
        self.session
            .change_password(&self.http, current, new, confirm)
            .await
    }

    fn signed_in(&self) -> Result<Identity, MutationError> {
        self.session.identity().ok_or(MutationError::NotSignedIn)
    }

    // ====================================================================
    // Fan-out
    // ====================================================================

    /// The freshest local copy of a post: its detail view, else any feed.
    pub(crate) fn find_post(&self, id: Id) -> Option<Post> {
        find::<Post>(&self.store, POSTS, &PostDetail::path(id), id)
    }

    pub(crate) fn find_profile(&self, id: Id) -> Option<Profile> {
        find::<Profile>(&self.store, PROFILES, &ProfileDetail::path(id), id)
    }

    /// Apply `f` to every copy of post `id`. Returns how many were patched.
    pub(crate) fn patch_post(&self, id: Id, f: impl Fn(&mut Post)) -> usize {
        let mut copies = patch_all::<Post>(&self.store, POSTS, id, &f);
        if patch_detail::<Post>(&self.store, &PostDetail::path(id), &f) {
            copies += 1;
        }
        debug!(post = id, copies, "patched post");
        copies
    }

    pub(crate) fn patch_profile(&self, id: Id, f: impl Fn(&mut Profile)) -> usize {
        let mut copies = patch_all::<Profile>(&self.store, PROFILES, id, &f);
        if patch_detail::<Profile>(&self.store, &ProfileDetail::path(id), &f) {
            copies += 1;
        }
        debug!(profile = id, copies, "patched profile");
        copies
    }
}

fn find<T: Entity>(store: &StateStore, prefix: &str, detail: &str, id: Id) -> Option<T> {
    if let Some(Detail::Ready(value)) = store.get_as::<Detail<T>>(detail) {
        return Some(value);
    }
    store.scan(prefix).into_iter().find_map(|(_, value)| {
        value
            .downcast_ref::<Paginated<T>>()
            .and_then(|c| c.get(id))
            .cloned()
    })
}

/// Patch a detail view in place if it is showing a loaded entity.
fn patch_detail<T: Entity>(store: &StateStore, path: &str, f: impl FnOnce(&mut T)) -> bool {
    store.update::<Detail<T>, _>(path, |current| {
        let mut next = current?.clone();
        f(next.ready_mut()?);
        Some(next)
    })
}

/// Store a freshly fetched entity in its detail view.
///
/// A not-found answer always replaces the view. Other failures keep an
/// already loaded entity on screen.
fn settle_detail<T: Entity>(store: &StateStore, path: &str, result: &Result<T, ApiError>) {
    match result {
        Ok(value) => store.set(path, Detail::Ready(value.clone())),
        Err(e) if e.is_not_found() => store.set(path, Detail::<T>::NotFound),
        Err(e) => {
            let message = e.user_message();
            store.update::<Detail<T>, _>(path, |current| match current {
                Some(Detail::Ready(_)) => None,
                _ => Some(Detail::Failed(message)),
            });
        }
    }
}

/// Mark a detail view as loading unless it already shows something.
fn begin_detail<T: Entity>(store: &StateStore, path: &str) {
    store.update::<Detail<T>, _>(path, |current| match current {
        Some(Detail::Ready(_)) => None,
        _ => Some(Detail::Loading),
    });
}
