//! Session and authorization bootstrap for the crime-record portal.

pub mod cli;
pub mod guard;
pub mod identity;
pub mod profile;
pub mod session;

pub static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
