//! Artshare client state layer.
//!
//! Owns everything a gallery view renders: the session, paginated post,
//! comment and profile collections, and single-entity details. Views emit
//! requests through [`artshare_flux::Flux`]; [`register_handlers`] routes
//! them to the [`Gallery`] coordinators, which talk to the backend through
//! [`artshare_client::HttpClient`] and patch the store once the server has
//! confirmed.
//!
//! ```ignore
//! let store = Arc::new(StateStore::new());
//! let gallery = Arc::new(Gallery::from_config(store.clone(), &config)?);
//! let flux = Flux::with_store(store);
//! register_handlers(&flux, gallery);
//! flux.emit(RestoreReq).await;
//! ```

pub mod collection;
pub mod coordinators;
pub mod error;
pub mod handlers;
pub mod model;
pub mod request;
pub mod session;
pub mod state;
pub mod validation;

#[cfg(test)]
mod testing;

pub use collection::{
    CollectionStore, CommentListing, Listing, PostListing, PostScope, ProfileListing,
};
pub use coordinators::Gallery;
pub use error::{AuthError, MutationError, RefreshError};
pub use handlers::register_handlers;
pub use model::{Comment, Id, Identity, ImageUpload, Post, PostDraft, Profile, ProfileDraft};
pub use session::Session;
