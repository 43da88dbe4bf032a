//! Exchange delivery backend
//!
//! Sends each outbound message by binding the sender's mailbox through
//! autodiscover and issuing an EWS `CreateItem`. Credentials are created on
//! `open` and dropped on `close`; `send_messages` does both around a batch
//! unless the caller opened the connection beforehand.

use crate::{BackendError, BackendOptions, BackendResult};
use async_trait::async_trait;
use ewsmail_client::{AccessType, Account, Credentials, EwsConfig, EwsResult, Mailbox, Message};
use ewsmail_core::{
    sanitize_mailbox, Charset, CoreResult, EmailBackend, EmailMessage, OpenOutcome,
    SanitizedAddress, Settings,
};
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Mail backend that delivers through Microsoft Exchange
pub struct ExchangeEmailBackend {
    host: String,
    port: u16,
    username: String,
    password: String,
    domain: String,
    fail_silently: bool,
    default_charset: String,
    default_from_email: String,
    extra: HashMap<String, String>,
    ews_config: EwsConfig,
    /// Present between `open` and `close`. Holding the lock also serializes
    /// send batches on this backend.
    credentials: Mutex<Option<Credentials>>,
}

impl ExchangeEmailBackend {
    /// Create a backend, filling unset options from `settings`
    ///
    /// An empty host or a zero port also fall back to settings; an explicitly
    /// empty username, password or domain is kept as given.
    pub fn new(options: BackendOptions, settings: &Settings) -> Self {
        let host = options
            .host
            .filter(|host| !host.is_empty())
            .unwrap_or_else(|| settings.email_host.clone());
        let port = options
            .port
            .filter(|port| *port != 0)
            .unwrap_or(settings.email_port);
        let username = options
            .username
            .unwrap_or_else(|| settings.email_host_user.clone());
        let password = options
            .password
            .unwrap_or_else(|| settings.email_host_password.clone());
        let domain = options
            .domain
            .unwrap_or_else(|| settings.email_domain.clone());

        if !options.extra.is_empty() {
            debug!(
                "Exchange backend: ignoring extra options {:?}",
                options.extra.keys().collect::<Vec<_>>()
            );
        }

        Self {
            host,
            port,
            username,
            password,
            domain,
            fail_silently: options.fail_silently,
            default_charset: settings.default_charset.clone(),
            default_from_email: settings.default_from_email.clone(),
            extra: options.extra,
            ews_config: EwsConfig::new(),
            credentials: Mutex::new(None),
        }
    }

    /// Use a specific EWS configuration (transport, autodiscover endpoints)
    pub fn with_ews_config(mut self, config: EwsConfig) -> Self {
        self.ews_config = config;
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// An extra option passed at construction
    pub fn option(&self, key: &str) -> Option<&str> {
        self.extra.get(key).map(String::as_str)
    }

    /// Snapshot of the credentials currently held, if any
    pub async fn credentials(&self) -> Option<Credentials> {
        self.credentials.lock().await.clone()
    }

    fn open_locked(&self, slot: &mut Option<Credentials>) -> BackendResult<OpenOutcome> {
        if slot.is_some() {
            return Ok(OpenOutcome::AlreadyOpen);
        }

        let username = format!("{}\\{}", self.host, self.username);
        match Credentials::new(username, self.password.clone()) {
            Ok(credentials) => {
                debug!("Exchange backend: credentials set up for {}", credentials.username());
                *slot = Some(credentials);
                Ok(OpenOutcome::Opened)
            }
            Err(e) if self.fail_silently => {
                warn!("Exchange backend: could not set up credentials: {}", e);
                Ok(OpenOutcome::Suppressed)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn close_locked(slot: &mut Option<Credentials>) {
        if slot.take().is_some() {
            debug!("Exchange backend: credentials cleared");
        }
    }

    /// Send one message; `Ok(false)` means skipped or silently failed
    ///
    /// Address and charset errors are returned whatever the fail-silently
    /// setting; only failures talking to Exchange are swallowed.
    async fn send_one(
        &self,
        credentials: &Credentials,
        message: &EmailMessage,
    ) -> BackendResult<bool> {
        let recipients = message.recipients();
        if recipients.is_empty() {
            debug!("Exchange backend: skipping {:?}, no recipients", message.subject);
            return Ok(false);
        }

        let envelope = self.envelope(message, &recipients)?;
        match self.deliver(credentials, message, envelope).await {
            Ok(()) => Ok(true),
            Err(e) if self.fail_silently => {
                warn!("Exchange backend: failed to send {:?}: {}", message.subject, e);
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn envelope(&self, message: &EmailMessage, recipients: &[&str]) -> CoreResult<Envelope> {
        let charset: Charset = message
            .encoding
            .as_deref()
            .unwrap_or(&self.default_charset)
            .parse()?;
        let from_email = message
            .from_email
            .as_deref()
            .unwrap_or(&self.default_from_email);

        Ok(Envelope {
            sender: sanitize_mailbox(from_email, charset)?.addr_spec,
            to: sanitize_all(recipients.iter().copied(), charset)?,
            reply_to: sanitize_all(
                message
                    .reply_to
                    .iter()
                    .map(String::as_str)
                    .filter(|addr| !addr.is_empty()),
                charset,
            )?,
        })
    }

    async fn deliver(
        &self,
        credentials: &Credentials,
        message: &EmailMessage,
        envelope: Envelope,
    ) -> EwsResult<()> {
        let account = Account::new(
            envelope.sender,
            credentials.clone(),
            true,
            AccessType::Delegate,
            &self.ews_config,
        )
        .await?;

        Message::new(&account, message.subject.as_str(), message.body.as_str(), envelope.to)
            .reply_to(envelope.reply_to)
            .send()
            .await
    }
}

/// Sanitized addressing for one message
struct Envelope {
    sender: String,
    to: Vec<Mailbox>,
    reply_to: Vec<Mailbox>,
}

fn sanitize_all<'a>(
    addresses: impl Iterator<Item = &'a str>,
    charset: Charset,
) -> CoreResult<Vec<Mailbox>> {
    addresses
        .map(|addr| sanitize_mailbox(addr, charset).map(to_mailbox))
        .collect()
}

fn to_mailbox(address: SanitizedAddress) -> Mailbox {
    let mailbox = Mailbox::new(address.addr_spec);
    match address.display_name {
        Some(name) => mailbox.with_name(name),
        None => mailbox,
    }
}

#[async_trait]
impl EmailBackend for ExchangeEmailBackend {
    type Error = BackendError;

    fn fail_silently(&self) -> bool {
        self.fail_silently
    }

    /// Set up credentials for talking to the Exchange server
    async fn open(&self) -> BackendResult<OpenOutcome> {
        let mut slot = self.credentials.lock().await;
        self.open_locked(&mut slot)
    }

    /// Drop the credentials; no network traffic is involved
    async fn close(&self) -> BackendResult<()> {
        let mut slot = self.credentials.lock().await;
        Self::close_locked(&mut slot);
        Ok(())
    }

    async fn send_messages(&self, messages: &[EmailMessage]) -> BackendResult<usize> {
        if messages.is_empty() {
            return Ok(0);
        }

        let mut slot = self.credentials.lock().await;
        let outcome = self.open_locked(&mut slot)?;
        if outcome == OpenOutcome::Suppressed {
            return Ok(0);
        }
        let Some(credentials) = slot.clone() else {
            return Ok(0);
        };

        // A hard failure returns early and leaves the credentials in place.
        let mut num_sent = 0;
        for message in messages {
            if self.send_one(&credentials, message).await? {
                num_sent += 1;
            }
        }

        if outcome.created_connection() {
            Self::close_locked(&mut slot);
        }

        info!(
            "Exchange backend: sent {} of {} message(s)",
            num_sent,
            messages.len()
        );
        Ok(num_sent)
    }
}
