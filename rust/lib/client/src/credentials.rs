use async_trait::async_trait;

use crate::error::ApiError;

// ── Credentials ─────────────────────────────────────────────────────

/// Pluggable credential provider for [`HttpClient`](crate::HttpClient).
///
/// The client reads the current access token before every protected
/// request, asks for a rotation when the server answers 401, and tells the
/// provider to drop its credentials when the rotation fails. The provider
/// owns the tokens; the client never writes them.
#[async_trait]
pub trait Credentials: Send + Sync + 'static {
    /// Current access token. `None` sends the request anonymously.
    fn access_token(&self) -> Option<String>;

    /// Rotate the access token using whatever refresh material the provider
    /// holds. Must not clear anything on failure.
    async fn refresh(&self) -> Result<String, ApiError>;

    /// Rotation failed: forget the credentials.
    fn expire(&self);
}

/// No authentication: anonymous requests, nothing to refresh.
pub struct NoAuth;

#[async_trait]
impl Credentials for NoAuth {
    fn access_token(&self) -> Option<String> {
        None
    }

    async fn refresh(&self) -> Result<String, ApiError> {
        Err(ApiError::Unauthorized)
    }

    fn expire(&self) {}
}

/// Static bearer token obtained externally. It cannot be rotated.
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl Credentials for StaticToken {
    fn access_token(&self) -> Option<String> {
        Some(self.0.clone())
    }

    async fn refresh(&self) -> Result<String, ApiError> {
        Err(ApiError::Unauthorized)
    }

    fn expire(&self) {}
}
