pub mod claims;
pub use self::claims::{IdToken, TokenClaims};

pub mod client;
pub use self::client::IdentityClient;

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

/// Handle for a signed-in user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
}

/// Role claim embedded in the identity token. The claim is set server-side
/// on the provider account; the profile service never overrides it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Officer,
    User,
}

impl Role {
    #[must_use]
    pub fn parse(claim: &str) -> Option<Self> {
        match claim.to_ascii_uppercase().as_str() {
            "ADMIN" => Some(Self::Admin),
            "OFFICER" => Some(Self::Officer),
            "USER" => Some(Self::User),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Officer => "OFFICER",
            Self::User => "USER",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sign-in state change emitted by the identity provider.
#[derive(Debug, Clone)]
pub enum AuthEvent {
    SignedIn(Principal),
    SignedOut,
}

/// Source of identity tokens for a signed-in principal.
#[async_trait]
pub trait TokenSource {
    async fn id_token(&self, principal: &Principal) -> Result<IdToken, Error>;
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid email address")]
    InvalidEmail,
    #[error("invalid token format")]
    TokenFormat,
    #[error("invalid base64url encoding")]
    Base64,
    #[error("invalid json")]
    Json(#[from] serde_json::Error),
    #[error("sign-in rejected: {status}, {message}")]
    SignIn { status: StatusCode, message: String },
    #[error("no active session for principal")]
    NoSession,
    #[error("request timed out")]
    Timeout,
    #[error("transport error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("ADMIN"), Some(Role::Admin));
        assert_eq!(Role::parse("officer"), Some(Role::Officer));
        assert_eq!(Role::parse("User"), Some(Role::User));
        assert_eq!(Role::parse("SUPERUSER"), None);
        assert_eq!(Role::parse(""), None);
    }

    #[test]
    fn test_role_display() {
        assert_eq!(Role::Admin.to_string(), "ADMIN");
        assert_eq!(Role::Officer.to_string(), "OFFICER");
        assert_eq!(Role::User.to_string(), "USER");
    }
}
