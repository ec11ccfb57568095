use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthzError {
    #[error("jwt error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("invalid subject claim: {0}")]
    InvalidSubject(String),
    #[error("signing secret must not be empty")]
    EmptySecret,
    #[error("token lifetime of {0}s is out of range")]
    TokenLifetime(u64),
}

pub type AuthzResult<T> = Result<T, AuthzError>;
