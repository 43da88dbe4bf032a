use std::fmt;

/// How the credentials relate to the mailbox being accessed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessType {
    /// Act on behalf of the mailbox owner with delegate rights
    #[default]
    Delegate,
    /// Impersonate the mailbox owner (requires the ApplicationImpersonation role)
    Impersonation,
}

impl fmt::Display for AccessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessType::Delegate => f.write_str("delegate"),
            AccessType::Impersonation => f.write_str("impersonation"),
        }
    }
}

/// A recipient or sender mailbox
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mailbox {
    pub email_address: String,
    pub name: Option<String>,
}

impl Mailbox {
    pub fn new(email_address: impl Into<String>) -> Self {
        Self {
            email_address: email_address.into(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Raw HTTP response handed back by a transport
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
