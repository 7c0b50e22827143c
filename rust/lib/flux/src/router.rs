use std::any::Any;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, warn};

use crate::store::StateStore;
use crate::trie::Trie;
use crate::value::Request;

/// A boxed, `Send`-able future returned by request handlers.
pub type BoxFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Type-erased payload as it travels through the router.
pub type Payload = Arc<dyn Any + Send + Sync>;

type ErasedHandler = Arc<dyn Fn(String, Payload, Arc<StateStore>) -> BoxFuture + Send + Sync>;

/// Request router: maps path patterns to async handlers.
///
/// Typed handlers are registered with [`on`](Router::on) under their
/// request's `PATH`; raw handlers with [`on_raw`](Router::on_raw) may use
/// wildcards. Every handler matching a dispatched path runs, one after
/// another, in registration order per pattern.
pub struct Router {
    trie: RwLock<Trie<ErasedHandler>>,
}

impl Router {
    pub fn new() -> Self {
        Self {
            trie: RwLock::new(Trie::new()),
        }
    }

    /// Register a handler for request type `R`.
    ///
    /// The payload is downcast before the handler runs. A payload of the
    /// wrong type is logged and skipped.
    pub fn on<R, F, Fut>(&self, handler: F)
    where
        R: Request,
        F: Fn(Arc<R>, Arc<StateStore>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handler = Arc::new(handler);
        self.on_raw(R::PATH, move |path, payload, store| {
            let handler = handler.clone();
            async move {
                match payload.downcast::<R>() {
                    Ok(req) => handler(req, store).await,
                    Err(_) => warn!(%path, "request payload type mismatch; handler skipped"),
                }
            }
        });
    }

    /// Register an untyped handler under a pattern (`+` / `#` allowed).
    pub fn on_raw<F, Fut>(&self, pattern: &str, handler: F)
    where
        F: Fn(String, Payload, Arc<StateStore>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let erased: ErasedHandler = Arc::new(
            move |path: String, payload: Payload, store: Arc<StateStore>| -> BoxFuture {
                Box::pin(handler(path, payload, store))
            },
        );
        self.trie
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(pattern, erased);
    }

    /// Run every handler matching `path`. Returns how many ran; zero is not
    /// an error.
    pub async fn dispatch(&self, path: &str, payload: Payload, store: Arc<StateStore>) -> usize {
        let handlers = self
            .trie
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .matches(path);
        debug!(path, handlers = handlers.len(), "dispatch");
        for handler in &handlers {
            handler(path.to_string(), payload.clone(), store.clone()).await;
        }
        handlers.len()
    }

    /// Whether a handler is registered under exactly `pattern`.
    pub fn has_handler(&self, pattern: &str) -> bool {
        self.trie
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .has_pattern(pattern)
    }

    /// Whether any handler would run for `path`.
    pub fn matches(&self, path: &str) -> bool {
        !self
            .trie
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .matches(path)
            .is_empty()
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}
