//! Construction options for the Exchange backend

use std::collections::HashMap;
use std::fmt;

/// Per-backend overrides; anything left unset comes from [`ewsmail_core::Settings`]
#[derive(Clone, Default)]
pub struct BackendOptions {
    /// Exchange host, also used as the credential domain
    pub host: Option<String>,
    /// Server port
    pub port: Option<u16>,
    /// Login name (without domain)
    pub username: Option<String>,
    /// Password
    pub password: Option<String>,
    /// Windows domain
    pub domain: Option<String>,
    /// Swallow failures and report them only through the sent count
    pub fail_silently: bool,
    /// Extra options accepted for compatibility; recorded but unused
    pub extra: HashMap<String, String>,
}

impl BackendOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn fail_silently(mut self, fail_silently: bool) -> Self {
        self.fail_silently = fail_silently;
        self
    }

    pub fn option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

impl fmt::Debug for BackendOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendOptions")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("domain", &self.domain)
            .field("fail_silently", &self.fail_silently)
            .field("extra", &self.extra)
            .finish()
    }
}
