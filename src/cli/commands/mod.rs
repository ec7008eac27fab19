use crate::cli::globals::DEFAULT_IDENTITY_URL;
use clap::{
    builder::{
        styling::{AnsiColor, Effects, Styles},
        ValueParser,
    },
    Arg, ArgAction, ColorChoice, Command,
};

pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(parsed) = level.parse::<u8>() {
            // Successfully parsed as a number
            if parsed <= 5 {
                return Ok(parsed);
            }
        }

        match level.to_lowercase().as_str() {
            "error" => Ok(0),
            "warn" => Ok(1),
            "info" => Ok(2),
            "debug" => Ok(3),
            "trace" => Ok(4),
            _ => Err("invalid log level".to_string()),
        }
    })
}

pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    Command::new("custodia")
        .about("Session and authorization bootstrap for the crime-record portal")
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new("api-url")
                .short('a')
                .long("api-url")
                .help("Portal backend base URL")
                .default_value("http://localhost:8080")
                .env("CUSTODIA_API_URL"),
        )
        .arg(
            Arg::new("identity-url")
                .long("identity-url")
                .help("Identity provider base URL")
                .default_value(DEFAULT_IDENTITY_URL)
                .env("CUSTODIA_IDENTITY_URL"),
        )
        .arg(
            Arg::new("identity-api-key")
                .long("identity-api-key")
                .help("Identity provider API key")
                .env("CUSTODIA_IDENTITY_API_KEY")
                .required(true),
        )
        .arg(
            Arg::new("email")
                .short('e')
                .long("email")
                .help("Email address to sign in with")
                .env("CUSTODIA_EMAIL")
                .required(true),
        )
        .arg(
            Arg::new("password")
                .long("password")
                .help("Password to sign in with")
                .env("CUSTODIA_PASSWORD")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new("timeout")
                .short('t')
                .long("timeout")
                .help("Network timeout in seconds for identity and profile calls")
                .default_value("10")
                .env("CUSTODIA_TIMEOUT")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("fail-closed")
                .long("fail-closed")
                .help("Block access when the profile status check fails instead of treating the account as approved")
                .env("CUSTODIA_FAIL_CLOSED")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("strict-admin")
                .long("strict-admin")
                .help("Require an approved profile for the admin route, not just the ADMIN role")
                .env("CUSTODIA_STRICT_ADMIN")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbose")
                .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
                .env("CUSTODIA_LOG_LEVEL")
                .global(true)
                .action(ArgAction::Count)
                .value_parser(validator_log_level()),
        )
}
