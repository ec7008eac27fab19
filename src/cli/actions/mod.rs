pub mod check;

use secrecy::SecretString;

#[derive(Debug)]
pub enum Action {
    Check {
        email: String,
        password: SecretString,
    },
}
