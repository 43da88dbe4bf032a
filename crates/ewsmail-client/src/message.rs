use crate::account::Account;
use crate::error::{EwsError, EwsResult};
use crate::types::Mailbox;
use crate::xml::{create_item_request, parse_create_item_response};
use tracing::info;

/// A plain-text message sent from an account
pub struct Message<'a> {
    account: &'a Account,
    subject: String,
    body: String,
    to_recipients: Vec<Mailbox>,
    reply_to: Vec<Mailbox>,
}

impl<'a> Message<'a> {
    pub fn new(
        account: &'a Account,
        subject: impl Into<String>,
        body: impl Into<String>,
        to_recipients: Vec<Mailbox>,
    ) -> Self {
        Self {
            account,
            subject: subject.into(),
            body: body.into(),
            to_recipients,
            reply_to: Vec::new(),
        }
    }

    pub fn reply_to(mut self, mailboxes: Vec<Mailbox>) -> Self {
        self.reply_to = mailboxes;
        self
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn to_recipients(&self) -> &[Mailbox] {
        &self.to_recipients
    }

    /// Send the message and keep a copy in the sender's Sent Items
    pub async fn send(&self) -> EwsResult<()> {
        if self.to_recipients.is_empty() {
            return Err(EwsError::InvalidField(
                "message has no recipients".to_string(),
            ));
        }

        let request = create_item_request(
            self.account.primary_smtp_address(),
            self.account.access_type(),
            &self.subject,
            &self.body,
            &self.to_recipients,
            &self.reply_to,
        );
        let response = self.account.post(request).await?;

        match response.status {
            401 => {
                return Err(EwsError::Unauthorized(format!(
                    "{} rejected the credentials",
                    self.account.ews_url()
                )))
            }
            // EWS reports SOAP faults with a 500 status
            500 => {
                parse_create_item_response(&response.body).map_err(|e| match e {
                    EwsError::ParseError(_) => EwsError::HttpStatus {
                        status: response.status,
                        body: response.body.clone(),
                    },
                    other => other,
                })?;
            }
            _ if response.is_success() => parse_create_item_response(&response.body)?,
            status => {
                return Err(EwsError::HttpStatus {
                    status,
                    body: response.body,
                })
            }
        }

        info!(
            "EWS: sent {:?} from {} to {} recipient(s)",
            self.subject,
            self.account.primary_smtp_address(),
            self.to_recipients.len()
        );
        Ok(())
    }
}
