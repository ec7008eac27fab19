use crate::session::FailPolicy;
use secrecy::SecretString;
use std::time::Duration;

pub const DEFAULT_IDENTITY_URL: &str = "https://identitytoolkit.googleapis.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub api_url: String,
    pub identity_url: String,
    pub identity_api_key: SecretString,
    pub timeout: Duration,
    pub fail_policy: FailPolicy,
    pub strict_admin: bool,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(api_url: String) -> Self {
        Self {
            api_url,
            identity_url: DEFAULT_IDENTITY_URL.to_string(),
            identity_api_key: SecretString::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            fail_policy: FailPolicy::default(),
            strict_admin: false,
        }
    }

    pub fn set_api_key(&mut self, key: SecretString) {
        self.identity_api_key = key;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_global_args() {
        let api_url = "http://localhost:8080".to_string();
        let args = GlobalArgs::new(api_url);
        assert_eq!(args.api_url, "http://localhost:8080");
        assert_eq!(args.identity_url, DEFAULT_IDENTITY_URL);
        assert_eq!(args.identity_api_key.expose_secret(), "");
        assert_eq!(args.timeout, Duration::from_secs(10));
        assert_eq!(args.fail_policy, FailPolicy::Open);
        assert!(!args.strict_admin);
    }
}
