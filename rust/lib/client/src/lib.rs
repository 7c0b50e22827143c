//! Artshare API client.
//!
//! [`HttpClient`] sends requests through a pluggable [`Transport`] and gets
//! access tokens from a pluggable [`Credentials`] provider. A 401 triggers a
//! single-flight token rotation and one replay of the request.
//!
//! # Usage
//!
//! ```ignore
//! use artshare_client::{ClientConfig, HttpClient, ReqwestTransport, StaticToken};
//!
//! let config = ClientConfig::from_env()?;
//! let transport = Arc::new(ReqwestTransport::new(&config.base_url, config.timeout())?);
//! let http = HttpClient::new(transport, Arc::new(StaticToken::new(token)), config.endpoints);
//! let post: serde_json::Value = http.get_json("/posts/7").await?;
//! ```

pub mod config;
pub mod credentials;
pub mod error;
pub mod http;
pub mod toggle;
pub mod token;
pub mod transport;

pub use config::{ClientConfig, ConfigError, Endpoints};
pub use credentials::{Credentials, NoAuth, StaticToken};
pub use error::{ApiError, FieldErrors, NON_FIELD_ERRORS};
pub use http::HttpClient;
pub use toggle::ToggleOutcome;
pub use token::{
    FileTokenStorage, MemoryTokenStorage, StoredTokens, TokenStorage, TokenStorageError,
};
pub use transport::{
    ApiRequest, ApiResponse, FormPart, Method, PartValue, ReqwestTransport, RequestBody, Transport,
};
