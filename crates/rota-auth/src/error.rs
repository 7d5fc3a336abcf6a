use rota_core::AuthFailure;

/// Bearer token verification failures
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("authorization header is missing")]
    Missing,

    #[error("authorization header is not a bearer token")]
    NotBearer,

    #[error("malformed token: {0}")]
    Malformed(#[from] jwt_compact::ParseError),

    #[error("token rejected: {0}")]
    Rejected(jwt_compact::ValidationError),

    #[error("token has expired")]
    Expired,

    #[error("token has no subject")]
    MissingSubject,

    #[error("failed to sign token: {0}")]
    Signing(#[from] jwt_compact::CreationError),
}

impl TokenError {
    /// Taxonomy classification of this failure
    pub const fn failure(&self) -> AuthFailure {
        match self {
            Self::Missing => AuthFailure::TokenMissing,
            Self::Expired => AuthFailure::TokenExpired,
            Self::NotBearer | Self::Malformed(_) | Self::Rejected(_) | Self::MissingSubject | Self::Signing(_) => {
                AuthFailure::TokenInvalid
            }
        }
    }
}
