//! Session store.
//!
//! Owns the token pair and the signed-in identity. The identity is
//! published at `session/state`; tokens stay private to this type and are
//! read by the HTTP client through the [`Credentials`] impl.
//!
//! Auth endpoints are public, so the session talks to the transport
//! directly and never goes through the refresh-and-retry path itself.

use std::sync::{Arc, PoisonError, RwLock};

use artshare_client::{
    ApiError, ApiRequest, Credentials, Endpoints, FieldErrors, HttpClient, StoredTokens,
    TokenStorage, Transport,
};
use artshare_flux::StateStore;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::error::{AuthError, RefreshError};
use crate::model::{Identity, LoginResponse, MeResponse, RefreshResponse};
use crate::state::{AppRoute, SessionState};
use crate::validation::Validator;

const BAD_CREDENTIALS: &str = "Unable to log in with provided credentials.";

pub struct Session {
    transport: Arc<dyn Transport>,
    endpoints: Endpoints,
    storage: Arc<dyn TokenStorage>,
    store: Arc<StateStore>,
    tokens: RwLock<StoredTokens>,
}

impl Session {
    /// A session in the `Loading` phase. Call [`restore`](Self::restore)
    /// to leave it.
    pub fn new(
        transport: Arc<dyn Transport>,
        endpoints: Endpoints,
        storage: Arc<dyn TokenStorage>,
        store: Arc<StateStore>,
    ) -> Self {
        store.set(SessionState::PATH, SessionState::loading());
        Self {
            transport,
            endpoints,
            storage,
            store,
            tokens: RwLock::new(StoredTokens::default()),
        }
    }

    pub fn state(&self) -> SessionState {
        self.store
            .get_as(SessionState::PATH)
            .unwrap_or_else(SessionState::anonymous)
    }

    pub fn identity(&self) -> Option<Identity> {
        self.state().identity
    }

    pub fn is_authenticated(&self) -> bool {
        self.state().is_authenticated()
    }

    fn tokens(&self) -> StoredTokens {
        self.tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn replace_tokens(&self, tokens: StoredTokens) {
        let persisted = if tokens.is_empty() {
            self.storage.clear()
        } else {
            self.storage.save(&tokens)
        };
        if let Err(e) = persisted {
            warn!(error = %e, "could not persist tokens");
        }
        *self.tokens.write().unwrap_or_else(PoisonError::into_inner) = tokens;
    }

    // ====================================================================
    // Lifecycle
    // ====================================================================

    /// Resume a previous session from persisted tokens.
    ///
    /// Without a token the session becomes anonymous at once. Otherwise
    /// the identity endpoint is asked who the token belongs to; any failure
    /// clears the session and routes to the login page.
    pub async fn restore(&self, http: &HttpClient) -> Option<Identity> {
        let tokens = self.storage.load().unwrap_or_else(|e| {
            warn!(error = %e, "could not read persisted tokens");
            StoredTokens::default()
        });
        let has_access = tokens.access_token.is_some();
        *self.tokens.write().unwrap_or_else(PoisonError::into_inner) = tokens;

        if !has_access {
            debug!("no persisted access token, starting anonymous");
            self.store.set(SessionState::PATH, SessionState::anonymous());
            return None;
        }

        match http.get_json::<MeResponse>(&self.endpoints.me).await {
            Ok(me) => {
                let identity = me.into_identity();
                info!(username = %identity.username, "session restored");
                self.store
                    .set(SessionState::PATH, SessionState::authenticated(identity.clone()));
                Some(identity)
            }
            Err(e) => {
                warn!(error = %e, "session restore failed");
                self.expire();
                None
            }
        }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<Identity, AuthError> {
        Validator::new()
            .require("username", username, "Please enter your username.")
            .require("password", password, "Please enter your password.")
            .finish()
            .map_err(|errors| self.reject(errors))?;

        self.set_busy();
        let body = json!({ "username": username.trim(), "password": password });
        let result = self.post_public(&self.endpoints.login, body).await;
        self.sign_in(result)
    }

    /// Create an account. The confirmation must match before anything is
    /// sent.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        password_confirm: &str,
    ) -> Result<Identity, AuthError> {
        Validator::new()
            .require("username", username, "Please choose a username.")
            .require("password1", password, "Please enter a password.")
            .require("password2", password_confirm, "Please confirm your password.")
            .check(password == password_confirm, "password2", "Passwords do not match.")
            .finish()
            .map_err(|errors| self.reject(errors))?;

        self.set_busy();
        let body = json!({
            "username": username.trim(),
            "password1": password,
            "password2": password_confirm,
        });
        let result = self.post_public(&self.endpoints.register, body).await;
        self.sign_in(result)
    }

    /// Trade the refresh token for a new access token.
    ///
    /// Leaves the session alone on failure; the caller decides whether to
    /// expire it.
    pub async fn refresh(&self) -> Result<String, RefreshError> {
        let Some(refresh) = self.tokens().refresh_token else {
            return Err(RefreshError::NoRefreshToken);
        };
        let resp: RefreshResponse = self
            .post_public(&self.endpoints.refresh, json!({ "refresh": refresh }))
            .await
            .map_err(RefreshError::Rejected)?;

        let mut tokens = self.tokens();
        if tokens.refresh_token.as_deref() != Some(refresh.as_str()) {
            debug!("tokens replaced while refreshing, result dropped");
            return Err(RefreshError::Superseded);
        }
        tokens.access_token = Some(resp.access_token.clone());
        if let Some(rotated) = resp.refresh_token {
            tokens.refresh_token = Some(rotated);
        }
        self.replace_tokens(tokens);
        info!("access token rotated");
        Ok(resp.access_token)
    }

    /// Forget tokens and identity. Local only.
    pub fn logout(&self) {
        self.replace_tokens(StoredTokens::default());
        self.store.set(SessionState::PATH, SessionState::anonymous());
        info!("logged out");
    }

    /// The session can no longer be renewed: log out and send the user to
    /// the login page.
    pub fn expire(&self) {
        warn!("session expired");
        self.logout();
        self.store
            .set(AppRoute::PATH, AppRoute(AppRoute::LOGIN.to_string()));
    }

    pub async fn change_password(
        &self,
        http: &HttpClient,
        current: &str,
        new: &str,
        confirm: &str,
    ) -> Result<(), AuthError> {
        if !self.is_authenticated() {
            return Err(AuthError::NotSignedIn);
        }
        Validator::new()
            .require("current_password", current, "Please enter your current password.")
            .require("new_password1", new, "Please enter a new password.")
            .require("new_password2", confirm, "Please confirm new password.")
            .check(new == confirm, "new_password2", "Passwords do not match.")
            .finish()
            .map_err(AuthError::Invalid)?;

        let body = json!({
            "current_password": current,
            "new_password1": new,
            "new_password2": confirm,
        });
        http.post_json::<Value, _>(&self.endpoints.change_password, &body)
            .await
            .map_err(|e| match e {
                ApiError::Validation(errors) => AuthError::Invalid(errors),
                e => AuthError::Api(e),
            })?;
        info!("password changed");
        Ok(())
    }

    /// Mirror a new avatar after the user edits their own profile.
    pub fn set_avatar(&self, avatar_url: Option<String>) -> bool {
        self.store.update::<SessionState, _>(SessionState::PATH, |current| {
            let mut next = current?.clone();
            let identity = next.identity.as_mut()?;
            if identity.avatar_url == avatar_url {
                return None;
            }
            identity.avatar_url = avatar_url;
            Some(next)
        })
    }

    // ====================================================================
    // Internals
    // ====================================================================

    async fn post_public<T: DeserializeOwned>(&self, path: &str, body: Value) -> Result<T, ApiError> {
        let request = ApiRequest::post(path).json(body);
        self.transport
            .execute(&request, None)
            .await?
            .into_result()?
            .json()
    }

    fn set_busy(&self) {
        self.record_attempt(true, FieldErrors::new());
    }

    fn reject(&self, errors: FieldErrors) -> AuthError {
        self.record_attempt(false, errors.clone());
        AuthError::Invalid(errors)
    }

    /// Publish the progress of a login/register attempt. A signed-in user
    /// stays signed in until the attempt succeeds.
    fn record_attempt(&self, busy: bool, errors: FieldErrors) {
        self.store.update::<SessionState, _>(SessionState::PATH, |current| {
            let mut next = match current {
                Some(state) if state.is_authenticated() => state.clone(),
                _ => SessionState::anonymous(),
            };
            next.busy = busy;
            next.errors = errors;
            Some(next)
        });
    }

    fn sign_in(&self, result: Result<LoginResponse, ApiError>) -> Result<Identity, AuthError> {
        match result {
            Ok(resp) => {
                self.replace_tokens(StoredTokens::new(resp.access_token, resp.refresh_token));
                info!(username = %resp.user.username, "signed in");
                self.store
                    .set(SessionState::PATH, SessionState::authenticated(resp.user.clone()));
                Ok(resp.user)
            }
            Err(ApiError::Validation(errors)) => Err(self.reject(errors)),
            Err(ApiError::Unauthorized) => {
                Err(self.reject(FieldErrors::general_message(BAD_CREDENTIALS)))
            }
            Err(e) => {
                warn!(error = %e, "sign-in failed");
                self.record_attempt(false, e.field_errors());
                Err(AuthError::Api(e))
            }
        }
    }
}

#[async_trait]
impl Credentials for Session {
    fn access_token(&self) -> Option<String> {
        self.tokens().access_token
    }

    async fn refresh(&self) -> Result<String, ApiError> {
        Session::refresh(self).await.map_err(ApiError::from)
    }

    fn expire(&self) {
        Session::expire(self);
    }
}
