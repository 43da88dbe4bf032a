//! Outbound email message

use crate::EmailBackend;
use tracing::debug;

/// A message handed to a delivery backend
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmailMessage {
    /// Subject line
    pub subject: String,
    /// Plain text body
    pub body: String,
    /// Sender address; backends fall back to `default_from_email`
    pub from_email: Option<String>,
    /// To addresses
    pub to: Vec<String>,
    /// CC addresses
    pub cc: Vec<String>,
    /// BCC addresses
    pub bcc: Vec<String>,
    /// Reply-To addresses
    pub reply_to: Vec<String>,
    /// Charset for header encoding; backends fall back to `default_charset`
    pub encoding: Option<String>,
}

impl EmailMessage {
    /// Create a new message builder
    pub fn new(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
            ..Self::default()
        }
    }

    /// Set the sender address
    pub fn from(mut self, address: impl Into<String>) -> Self {
        self.from_email = Some(address.into());
        self
    }

    /// Add a To recipient
    pub fn to(mut self, address: impl Into<String>) -> Self {
        self.to.push(address.into());
        self
    }

    /// Add a CC recipient
    pub fn cc(mut self, address: impl Into<String>) -> Self {
        self.cc.push(address.into());
        self
    }

    /// Add a BCC recipient
    pub fn bcc(mut self, address: impl Into<String>) -> Self {
        self.bcc.push(address.into());
        self
    }

    /// Add a Reply-To address
    pub fn reply_to(mut self, address: impl Into<String>) -> Self {
        self.reply_to.push(address.into());
        self
    }

    /// Set the charset used for headers
    pub fn encoding(mut self, charset: impl Into<String>) -> Self {
        self.encoding = Some(charset.into());
        self
    }

    /// All envelope recipients (to, cc and bcc), skipping empty entries
    pub fn recipients(&self) -> Vec<&str> {
        self.to
            .iter()
            .chain(&self.cc)
            .chain(&self.bcc)
            .map(String::as_str)
            .filter(|addr| !addr.is_empty())
            .collect()
    }

    /// Send this message through `backend`
    ///
    /// Returns `Ok(0)` without touching the backend when there are no
    /// recipients.
    pub async fn send<B>(&self, backend: &B) -> Result<usize, B::Error>
    where
        B: EmailBackend + ?Sized,
    {
        if self.recipients().is_empty() {
            debug!("Message {:?} has no recipients, not sending", self.subject);
            return Ok(0);
        }
        backend.send_messages(std::slice::from_ref(self)).await
    }
}
