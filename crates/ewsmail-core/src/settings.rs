//! Process-wide mail settings
//!
//! Backends read these once at construction time for every value the caller
//! did not override.

use crate::{CoreError, CoreResult};
use serde::Deserialize;
use std::fmt;
use tracing::debug;

/// Mail settings shared by every backend in a process
#[derive(Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Mail server host
    pub email_host: String,
    /// Mail server port
    pub email_port: u16,
    /// Login name on the mail server
    pub email_host_user: String,
    /// Password for `email_host_user`
    pub email_host_password: String,
    /// Windows domain of the mail account
    pub email_domain: String,
    /// Charset used for headers when a message does not declare one
    pub default_charset: String,
    /// Sender used when a message does not declare one
    pub default_from_email: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            email_host: "localhost".to_string(),
            email_port: 25,
            email_host_user: String::new(),
            email_host_password: String::new(),
            email_domain: String::new(),
            default_charset: "utf-8".to_string(),
            default_from_email: "webmaster@localhost".to_string(),
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("email_host", &self.email_host)
            .field("email_port", &self.email_port)
            .field("email_host_user", &self.email_host_user)
            .field("email_host_password", &"<redacted>")
            .field("email_domain", &self.email_domain)
            .field("default_charset", &self.default_charset)
            .field("default_from_email", &self.default_from_email)
            .finish()
    }
}

impl Settings {
    /// Load settings from environment variables
    ///
    /// Recognised:
    /// - EMAIL_HOST
    /// - EMAIL_PORT
    /// - EMAIL_HOST_USER
    /// - EMAIL_HOST_PASSWORD
    /// - EMAIL_DOMAIN
    /// - DEFAULT_CHARSET
    /// - DEFAULT_FROM_EMAIL
    ///
    /// Unset or empty variables keep their default.
    pub fn from_env() -> CoreResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> CoreResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|s| !s.is_empty());
        let mut settings = Self::default();

        if let Some(host) = get("EMAIL_HOST") {
            settings.email_host = host;
        }
        if let Some(port) = get("EMAIL_PORT") {
            settings.email_port = port.trim().parse().map_err(|_| CoreError::InvalidSetting {
                name: "EMAIL_PORT".to_string(),
                value: port.clone(),
            })?;
        }
        if let Some(user) = get("EMAIL_HOST_USER") {
            settings.email_host_user = user;
        }
        if let Some(password) = get("EMAIL_HOST_PASSWORD") {
            settings.email_host_password = password;
        }
        if let Some(domain) = get("EMAIL_DOMAIN") {
            settings.email_domain = domain;
        }
        if let Some(charset) = get("DEFAULT_CHARSET") {
            settings.default_charset = charset;
        }
        if let Some(from) = get("DEFAULT_FROM_EMAIL") {
            settings.default_from_email = from;
        }

        debug!(
            "Settings: host {}:{}, user {:?}, charset {}",
            settings.email_host, settings.email_port, settings.email_host_user, settings.default_charset
        );
        Ok(settings)
    }
}
