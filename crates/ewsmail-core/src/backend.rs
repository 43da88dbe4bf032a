//! Delivery backend contract

use crate::EmailMessage;
use async_trait::async_trait;

/// Result of asking a backend to open its connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    /// A new connection was set up by this call
    Opened,
    /// A connection was already open; nothing was done
    AlreadyOpen,
    /// Opening failed and the backend is configured to fail silently
    Suppressed,
}

impl OpenOutcome {
    /// Whether the caller owns the connection and must close it
    pub fn created_connection(&self) -> bool {
        matches!(self, OpenOutcome::Opened)
    }
}

/// A pluggable outbound mail backend
///
/// `send_messages` opens and closes the connection itself when needed;
/// `open` and `close` are exposed so callers can keep one connection across
/// several batches.
#[async_trait]
pub trait EmailBackend: Send + Sync {
    /// Error surfaced when the backend does not fail silently
    type Error: std::error::Error + Send + Sync + 'static;

    /// Whether failures are swallowed instead of returned
    fn fail_silently(&self) -> bool;

    /// Open a connection to the mail server
    async fn open(&self) -> Result<OpenOutcome, Self::Error>;

    /// Close the connection, if one is open
    async fn close(&self) -> Result<(), Self::Error>;

    /// Send messages and return how many were delivered
    async fn send_messages(&self, messages: &[EmailMessage]) -> Result<usize, Self::Error>;
}

/// Send a single message to a list of recipients
pub async fn send_mail<B>(
    backend: &B,
    subject: &str,
    body: &str,
    from_email: Option<&str>,
    recipient_list: &[&str],
) -> Result<usize, B::Error>
where
    B: EmailBackend + ?Sized,
{
    let message = build_message(subject, body, from_email, recipient_list);
    backend.send_messages(&[message]).await
}

/// Send one message per `(subject, body, from, recipients)` entry in a single batch
pub async fn send_mass_mail<B>(
    backend: &B,
    datatuple: &[(&str, &str, Option<&str>, &[&str])],
) -> Result<usize, B::Error>
where
    B: EmailBackend + ?Sized,
{
    let messages: Vec<EmailMessage> = datatuple
        .iter()
        .map(|(subject, body, from, recipients)| build_message(subject, body, *from, recipients))
        .collect();
    backend.send_messages(&messages).await
}

fn build_message(
    subject: &str,
    body: &str,
    from_email: Option<&str>,
    recipient_list: &[&str],
) -> EmailMessage {
    let mut message = EmailMessage::new(subject, body);
    message.from_email = from_email.map(str::to_string);
    message.to = recipient_list.iter().map(|r| r.to_string()).collect();
    message
}
