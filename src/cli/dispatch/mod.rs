use crate::cli::{actions::Action, globals::GlobalArgs};
use crate::session::FailPolicy;
use anyhow::Result;
use secrecy::SecretString;
use std::time::Duration;

pub fn handler(matches: &clap::ArgMatches) -> Result<(Action, GlobalArgs)> {
    let required = |name: &str| -> Result<String> {
        matches
            .get_one::<String>(name)
            .map(String::to_string)
            .ok_or_else(|| anyhow::anyhow!("missing required argument: --{name}"))
    };

    let mut globals = GlobalArgs::new(required("api-url")?);

    globals.identity_url = required("identity-url")?;
    globals.set_api_key(SecretString::from(required("identity-api-key")?));
    globals.timeout = Duration::from_secs(
        matches
            .get_one::<u64>("timeout")
            .copied()
            .unwrap_or(crate::cli::globals::DEFAULT_TIMEOUT_SECS),
    );
    globals.fail_policy = if matches.get_flag("fail-closed") {
        FailPolicy::Closed
    } else {
        FailPolicy::Open
    };
    globals.strict_admin = matches.get_flag("strict-admin");

    let action = Action::Check {
        email: required("email")?,
        password: SecretString::from(required("password")?),
    };

    Ok((action, globals))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;
    use secrecy::ExposeSecret;

    #[test]
    fn test_handler() {
        let matches = commands::new().get_matches_from(vec![
            "custodia",
            "--api-url",
            "http://localhost:8080",
            "--identity-api-key",
            "api-key",
            "--email",
            "officer@example.com",
            "--password",
            "hunter2",
            "--fail-closed",
            "--strict-admin",
        ]);

        let (action, globals) = handler(&matches).unwrap();

        assert_eq!(globals.api_url, "http://localhost:8080");
        assert_eq!(globals.identity_api_key.expose_secret(), "api-key");
        assert_eq!(globals.timeout, Duration::from_secs(10));
        assert_eq!(globals.fail_policy, FailPolicy::Closed);
        assert!(globals.strict_admin);

        let Action::Check { email, password } = action;
        assert_eq!(email, "officer@example.com");
        assert_eq!(password.expose_secret(), "hunter2");
    }
}
