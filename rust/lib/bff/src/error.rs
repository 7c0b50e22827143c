use artshare_client::{ApiError, FieldErrors};

/// Failure of a session operation (login, register, password change).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AuthError {
    /// Rejected by local checks or by the backend, keyed by field.
    #[error("invalid: {0}")]
    Invalid(FieldErrors),

    #[error("not signed in")]
    NotSignedIn,

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl AuthError {
    pub fn field_errors(&self) -> FieldErrors {
        match self {
            AuthError::Invalid(errors) => errors.clone(),
            AuthError::NotSignedIn => FieldErrors::general_message("Please log in first."),
            AuthError::Api(e) => e.field_errors(),
        }
    }
}

/// Failure of a token rotation. The session is left as it was.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RefreshError {
    #[error("no refresh token")]
    NoRefreshToken,

    #[error("refresh rejected: {0}")]
    Rejected(ApiError),

    /// The tokens were replaced (logout or a new sign-in) while the refresh
    /// was in flight; its result was thrown away.
    #[error("refresh superseded")]
    Superseded,
}

impl From<RefreshError> for ApiError {
    fn from(err: RefreshError) -> Self {
        match err {
            RefreshError::NoRefreshToken | RefreshError::Superseded => ApiError::Unauthorized,
            RefreshError::Rejected(e) => e,
        }
    }
}

/// Failure of a coordinator. Nothing in the store was changed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MutationError {
    /// Local validation failed; no request was sent.
    #[error("invalid: {0}")]
    Invalid(FieldErrors),

    #[error("cannot follow your own profile")]
    SelfFollow,

    #[error("not signed in")]
    NotSignedIn,

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl MutationError {
    /// Project into the field-keyed shape forms render.
    pub fn field_errors(&self) -> FieldErrors {
        match self {
            MutationError::Invalid(errors) => errors.clone(),
            MutationError::SelfFollow => {
                FieldErrors::general_message("You can't follow your own profile.")
            }
            MutationError::NotSignedIn => FieldErrors::general_message("Please log in first."),
            MutationError::Api(e) => e.field_errors(),
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            MutationError::Api(e) => e.user_message(),
            other => {
                let errors = other.field_errors();
                errors
                    .general()
                    .map_or_else(|| errors.to_string(), str::to_string)
            }
        }
    }

    /// Whether the request never left the client.
    pub fn is_local(&self) -> bool {
        !matches!(self, MutationError::Api(_))
    }
}

impl From<AuthError> for MutationError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Invalid(errors) => MutationError::Invalid(errors),
            AuthError::NotSignedIn => MutationError::NotSignedIn,
            AuthError::Api(e) => MutationError::Api(e),
        }
    }
}
