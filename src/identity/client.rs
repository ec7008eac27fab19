use crate::identity::{Error, IdToken, Principal, TokenSource};
use crate::APP_USER_AGENT;
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").map_or(false, |re| re.is_match(email))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    id_token: String,
    local_id: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    display_name: Option<String>,
}

/// REST client for the identity provider.
///
/// Sign-in goes through the identity toolkit password endpoint; the issued
/// token is cached per principal and handed to the session controller
/// through [`TokenSource`].
pub struct IdentityClient {
    client: Client,
    base_url: String,
    api_key: SecretString,
    tokens: Mutex<HashMap<String, IdToken>>,
}

impl IdentityClient {
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(base_url: &str, api_key: SecretString, timeout: Duration) -> Result<Self, Error> {
        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            tokens: Mutex::new(HashMap::new()),
        })
    }

    /// Sign in with an email and password.
    ///
    /// # Errors
    ///
    /// Returns an error if the email is malformed, the provider rejects the
    /// credentials, or the returned token cannot be decoded.
    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &SecretString) -> Result<Principal, Error> {
        if !valid_email(email) {
            return Err(Error::InvalidEmail);
        }

        let sign_in_url = format!(
            "{}/v1/accounts:signInWithPassword?key={}",
            self.base_url,
            self.api_key.expose_secret()
        );

        let payload = json!({
            "email": email,
            "password": password.expose_secret(),
            "returnSecureToken": true,
        });

        let response = self.client.post(&sign_in_url).json(&payload).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let json_response: Value = response.json().await.unwrap_or(Value::Null);

            return Err(Error::SignIn {
                status,
                message: json_response["error"]["message"]
                    .as_str()
                    .unwrap_or("")
                    .to_string(),
            });
        }

        let body: SignInResponse = response.json().await?;
        let token = IdToken::decode(&body.id_token)?;

        let principal = Principal {
            uid: body.local_id,
            email: body.email,
            display_name: body.display_name.filter(|name| !name.is_empty()),
        };

        debug!("signed in principal {}", principal.uid);

        self.tokens
            .lock()
            .await
            .insert(principal.uid.clone(), token);

        Ok(principal)
    }

    /// Drop the cached token for a principal. Local only, like the
    /// provider SDK's sign-out.
    pub async fn sign_out(&self, principal: &Principal) {
        self.tokens.lock().await.remove(&principal.uid);
        debug!("signed out principal {}", principal.uid);
    }
}

#[async_trait]
impl TokenSource for IdentityClient {
    async fn id_token(&self, principal: &Principal) -> Result<IdToken, Error> {
        self.tokens
            .lock()
            .await
            .get(&principal.uid)
            .cloned()
            .ok_or(Error::NoSession)
    }
}
