use crate::APP_USER_AGENT;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid base URL: {0}")]
    BaseUrl(String),
    #[error("unexpected response: {status}, {message}")]
    Response { status: StatusCode, message: String },
    #[error("request timed out")]
    Timeout,
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("transport error: {0}")]
    Transport(String),
}

impl Error {
    /// The 401/404 class meaning the profile record does not exist yet.
    #[must_use]
    pub fn is_absent(&self) -> bool {
        matches!(
            self,
            Self::Response { status, .. }
                if *status == StatusCode::UNAUTHORIZED || *status == StatusCode::NOT_FOUND
        )
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Malformed(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Approval status payload from `GET /api/auth/profile/status`. Accounts
/// created before status tracking have no `status` field at all.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    #[serde(default)]
    pub status: Option<String>,
}

/// Body for `POST /api/auth/profile`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateProfile {
    pub name: String,
    pub email: String,
}

/// Profile record from `GET /api/auth/me`, used for display.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub uid: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Profile provisioning operations the session controller depends on.
#[async_trait]
pub trait ProfileApi {
    async fn status(&self, token: &SecretString) -> Result<StatusResponse, Error>;
    async fn create(&self, token: &SecretString, profile: &CreateProfile) -> Result<(), Error>;
}

/// REST client for the portal backend profile endpoints.
pub struct ProfileClient {
    client: Client,
    base_url: String,
}

impl ProfileClient {
    /// # Errors
    ///
    /// Returns an error if the base URL cannot be parsed or the HTTP client
    /// cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, Error> {
        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: normalize_base_url(base_url)?,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn error_response(response: reqwest::Response) -> Error {
        let status = response.status();
        let json_response: Value = response.json().await.unwrap_or(Value::Null);

        Error::Response {
            status,
            message: json_response["error"].as_str().unwrap_or("").to_string(),
        }
    }

    /// Fetch the caller's profile record.
    ///
    /// # Errors
    ///
    /// Returns an error on any non-success response or transport failure.
    #[instrument(skip(self, token))]
    pub async fn me(&self, token: &SecretString) -> Result<Account, Error> {
        let response = self
            .client
            .get(self.endpoint("/api/auth/me"))
            .bearer_auth(token.expose_secret())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_response(response).await);
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl ProfileApi for ProfileClient {
    #[instrument(skip(self, token))]
    async fn status(&self, token: &SecretString) -> Result<StatusResponse, Error> {
        let response = self
            .client
            .get(self.endpoint("/api/auth/profile/status"))
            .bearer_auth(token.expose_secret())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_response(response).await);
        }

        let status: StatusResponse = response.json().await?;

        debug!("profile status: {:?}", status.status);

        Ok(status)
    }

    #[instrument(skip(self, token))]
    async fn create(&self, token: &SecretString, profile: &CreateProfile) -> Result<(), Error> {
        let response = self
            .client
            .post(self.endpoint("/api/auth/profile"))
            .bearer_auth(token.expose_secret())
            .json(profile)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_response(response).await);
        }

        debug!("profile created for {}", profile.email);

        Ok(())
    }
}

/// Normalize a backend base URL to `scheme://host:port`.
#[instrument]
pub fn normalize_base_url(raw: &str) -> Result<String, Error> {
    let url = Url::parse(raw).map_err(|err| Error::BaseUrl(err.to_string()))?;

    let scheme = url.scheme();

    let host = url
        .host()
        .ok_or_else(|| Error::BaseUrl("no host specified".to_string()))?
        .to_owned();

    let port = match url.port() {
        Some(p) => p,
        None => match scheme {
            "http" => 80,
            "https" => 443,
            _ => {
                return Err(Error::BaseUrl(format!("unsupported scheme {scheme}")));
            }
        },
    };

    Ok(format!("{scheme}://{host}:{port}"))
}
