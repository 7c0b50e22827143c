//! Flux: path-addressed client state engine.
//!
//! Rust owns the state and the logic; a view layer only renders what the
//! store exposes and emits intents back in.
//!
//! # Three primitives
//!
//! - `get(path)` reads state at a path (an `Arc` clone)
//! - `emit(request)` sends a typed intent to its registered handler(s)
//! - `subscribe(pattern)` observes state changes
//!
//! # Paths
//!
//! State lives in a flat `/`-separated namespace:
//! - singletons: `session/state`, `app/route`
//! - collections: `posts/feed`, `posts/profile/{id}`, `comments/{post_id}`
//! - details: `post/{id}`, `profile/{id}`
//!
//! Subscription patterns use MQTT-style wildcards: `post/+` matches one
//! level, `posts/#` matches everything below `posts`, `#` matches all.

pub mod app;
pub mod router;
pub mod store;
pub mod trie;
pub mod value;

pub use app::Flux;
pub use router::{BoxFuture, Payload, Router};
pub use store::{ChangeHandler, StateStore};
pub use trie::Trie;
pub use value::{Request, StateValue, SubscriptionId};
