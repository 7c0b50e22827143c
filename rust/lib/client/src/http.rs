use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::Endpoints;
use crate::credentials::Credentials;
use crate::error::ApiError;
use crate::toggle::ToggleOutcome;
use crate::transport::{ApiRequest, ApiResponse, FormPart, Transport};

/// Authenticated API client.
///
/// Attaches the current access token to every request except the public
/// auth endpoints. A 401 triggers one token rotation and one replay of the
/// request; if the rotation fails the credentials are expired and the
/// caller gets [`ApiError::Unauthorized`]. A failure that raced a sign-in
/// or logout leaves the credentials alone.
///
/// Rotations are single-flight: concurrent requests that all hit 401 queue
/// on one gate, and whoever gets it after the first rotation sees the new
/// token and replays without refreshing again.
pub struct HttpClient {
    transport: Arc<dyn Transport>,
    credentials: Arc<dyn Credentials>,
    endpoints: Endpoints,
    refresh_gate: Mutex<()>,
}

impl HttpClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        credentials: Arc<dyn Credentials>,
        endpoints: Endpoints,
    ) -> Self {
        Self {
            transport,
            credentials,
            endpoints,
            refresh_gate: Mutex::new(()),
        }
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Send `request`, applying bearer attachment and refresh-and-retry.
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        if self.endpoints.is_public(&request.path) {
            return self.transport.execute(&request, None).await?.into_result();
        }

        let sent_with = self.credentials.access_token();
        let resp = self
            .transport
            .execute(&request, sent_with.as_deref())
            .await?;
        if resp.status != 401 {
            return resp.into_result();
        }

        debug!(method = %request.method, path = %request.path, "401, renewing access token");
        let token = self.renew(sent_with.as_deref()).await?;
        // Replayed once; a second 401 is final.
        self.transport
            .execute(&request, Some(&token))
            .await?
            .into_result()
    }

    async fn renew(&self, sent_with: Option<&str>) -> Result<String, ApiError> {
        let _gate = self.refresh_gate.lock().await;

        match (self.credentials.access_token(), sent_with) {
            (Some(current), Some(sent)) if current != sent => {
                debug!("access token already rotated by a concurrent request");
                return Ok(current);
            }
            (Some(current), None) => return Ok(current),
            (None, Some(_)) => return Err(ApiError::Unauthorized),
            _ => {}
        }

        match self.credentials.refresh().await {
            Ok(token) => {
                info!("access token refreshed");
                Ok(token)
            }
            Err(e) => {
                // Credentials replaced by a sign-in or logout while refreshing.
                let now = self.credentials.access_token();
                if now.as_deref() != sent_with {
                    debug!(error = %e, "credentials replaced during refresh");
                    return now.ok_or(ApiError::Unauthorized);
                }
                warn!(error = %e, "token refresh failed, expiring credentials");
                self.credentials.expire();
                Err(ApiError::Unauthorized)
            }
        }
    }

    // ── Conveniences ────────────────────────────────────────────────

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(ApiRequest::get(path)).await?.json()
    }

    pub async fn post_json<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = ApiRequest::post(path).json(to_value(body)?);
        self.send(request).await?.json()
    }

    pub async fn put_json<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = ApiRequest::put(path).json(to_value(body)?);
        self.send(request).await?.json()
    }

    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        parts: Vec<FormPart>,
    ) -> Result<T, ApiError> {
        self.send(ApiRequest::post(path).multipart(parts))
            .await?
            .json()
    }

    pub async fn put_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        parts: Vec<FormPart>,
    ) -> Result<T, ApiError> {
        self.send(ApiRequest::put(path).multipart(parts))
            .await?
            .json()
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send(ApiRequest::delete(path)).await?;
        Ok(())
    }

    /// POST to a toggle endpoint and interpret what it did.
    pub async fn toggle<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ToggleOutcome, ApiError> {
        let resp = self.send(ApiRequest::post(path).json(to_value(body)?)).await?;
        ToggleOutcome::from_response(&resp)
    }
}

fn to_value<B: Serialize + ?Sized>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::Decode(format!("request body: {e}")))
}
