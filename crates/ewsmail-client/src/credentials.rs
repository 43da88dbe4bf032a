use crate::error::{EwsError, EwsResult};
use std::fmt;

/// Username and password presented to the Exchange server
///
/// The username is usually domain-qualified (`DOMAIN\user`) but a UPN
/// (`user@domain`) works as well.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> EwsResult<Self> {
        let username = username.into();

        let user = username.rsplit('\\').next().unwrap_or_default();
        if user.is_empty() {
            return Err(EwsError::InvalidCredentials(format!(
                "username {:?} has no user part",
                username
            )));
        }
        if username.chars().any(char::is_control) {
            return Err(EwsError::InvalidCredentials(
                "username contains control characters".to_string(),
            ));
        }

        Ok(Self {
            username,
            password: password.into(),
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"********")
            .finish()
    }
}
