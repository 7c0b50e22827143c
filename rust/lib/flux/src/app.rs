use std::any::Any;
use std::future::Future;
use std::sync::Arc;

use crate::router::Router;
use crate::store::StateStore;
use crate::value::{Request, StateValue, SubscriptionId};

/// The state engine a view talks to.
///
/// - `get(path)` reads state
/// - `emit(request)` sends an intent to the handler(s) registered for it
/// - `subscribe(pattern)` observes state changes
///
/// ```ignore
/// let flux = Flux::new();
/// flux.on::<LoginReq, _, _>(|req, store| async move { /* ... */ });
/// flux.subscribe("session/#", |path, value| println!("{path} changed"));
/// flux.emit(LoginReq { username, password }).await;
/// ```
pub struct Flux {
    store: Arc<StateStore>,
    router: Router,
}

impl Flux {
    pub fn new() -> Self {
        Self::with_store(Arc::new(StateStore::new()))
    }

    /// Build on an existing store, e.g. one already shared with a session.
    pub fn with_store(store: Arc<StateStore>) -> Self {
        Self {
            store,
            router: Router::new(),
        }
    }

    // ====================================================================
    // State
    // ====================================================================

    pub fn get(&self, path: &str) -> Option<StateValue> {
        self.store.get(path)
    }

    pub fn get_as<T: Any + Clone>(&self, path: &str) -> Option<T> {
        self.store.get_as(path)
    }

    pub fn scan(&self, prefix: &str) -> Vec<(String, StateValue)> {
        self.store.scan(prefix)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.store.contains(path)
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    // ====================================================================
    // Requests
    // ====================================================================

    /// Dispatch `request` to its handlers and wait for all of them.
    ///
    /// A request nobody handles is a silent no-op; the return value says
    /// how many handlers ran.
    pub async fn emit<R: Request>(&self, request: R) -> usize {
        self.router
            .dispatch(R::PATH, Arc::new(request), Arc::clone(&self.store))
            .await
    }

    /// Register a typed handler for `R`.
    pub fn on<R, F, Fut>(&self, handler: F)
    where
        R: Request,
        F: Fn(Arc<R>, Arc<StateStore>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.router.on::<R, F, Fut>(handler);
    }

    pub fn handles<R: Request>(&self) -> bool {
        self.router.has_handler(R::PATH)
    }

    // ====================================================================
    // Subscriptions
    // ====================================================================

    /// Observe state changes on paths matching `pattern`. The handler runs
    /// synchronously on the writer's task.
    pub fn subscribe<F>(&self, pattern: &str, handler: F) -> SubscriptionId
    where
        F: Fn(&str, Option<&StateValue>) + Send + Sync + 'static,
    {
        self.store.subscribe(pattern, handler)
    }

    pub fn unsubscribe(&self, pattern: &str, id: SubscriptionId) -> bool {
        self.store.unsubscribe(pattern, id)
    }

    pub fn store(&self) -> &Arc<StateStore> {
        &self.store
    }
}

impl Default for Flux {
    fn default() -> Self {
        Self::new()
    }
}
