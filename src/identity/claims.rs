use crate::identity::{Error, Role};
use base64ct::{Base64UrlUnpadded, Encoding};
use secrecy::SecretString;
use serde::Deserialize;

/// Claims carried in the identity token payload. Only the fields the
/// session bootstrap cares about; everything else is ignored.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct TokenClaims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub iat: Option<i64>,
    #[serde(default)]
    pub exp: Option<i64>,
}

/// Bearer credential plus its decoded claims.
#[derive(Debug, Clone)]
pub struct IdToken {
    pub raw: SecretString,
    pub claims: TokenClaims,
}

impl IdToken {
    /// Decode the payload segment of a compact JWT.
    ///
    /// The signature is not verified here: the backend verifies it on every
    /// request, this side only reads the claims for display and gating.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is not three dot-separated segments or
    /// the payload is not base64url-encoded JSON.
    pub fn decode(raw: &str) -> Result<Self, Error> {
        let mut segments = raw.split('.');

        let payload = match (segments.next(), segments.next(), segments.next(), segments.next())
        {
            (Some(_header), Some(payload), Some(_signature), None) => payload,
            _ => return Err(Error::TokenFormat),
        };

        let claims: TokenClaims = b64d_json(payload)?;

        Ok(Self {
            raw: SecretString::from(raw.to_string()),
            claims,
        })
    }

    /// Role claim, parsed. Unknown or absent values yield no role.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.claims.role.as_deref().and_then(Role::parse)
    }
}

fn b64d_json<T: for<'de> Deserialize<'de>>(s: &str) -> Result<T, Error> {
    let bytes = Base64UrlUnpadded::decode_vec(s).map_err(|_| Error::Base64)?;
    Ok(serde_json::from_slice(&bytes)?)
}
