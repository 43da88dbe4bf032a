use crate::autodiscover::discover;
use crate::config::EwsConfig;
use crate::credentials::Credentials;
use crate::error::{EwsError, EwsResult};
use crate::transport::EwsTransport;
use crate::types::{AccessType, TransportResponse};
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// A mailbox bound to the EWS endpoint that serves it
pub struct Account {
    primary_smtp_address: String,
    credentials: Credentials,
    access_type: AccessType,
    ews_url: Url,
    transport: Arc<dyn EwsTransport>,
}

impl Account {
    /// Bind to a mailbox, locating its server through autodiscover when
    /// `autodiscover` is set and using the configured service endpoint otherwise
    pub async fn new(
        primary_smtp_address: impl Into<String>,
        credentials: Credentials,
        autodiscover: bool,
        access_type: AccessType,
        config: &EwsConfig,
    ) -> EwsResult<Self> {
        let primary_smtp_address = primary_smtp_address.into();

        let ews_url = if autodiscover {
            discover(&primary_smtp_address, &credentials, config).await?
        } else {
            config.get_service_endpoint().cloned().ok_or_else(|| {
                EwsError::InvalidConfig(
                    "a service endpoint is required when autodiscover is off".to_string(),
                )
            })?
        };
        debug!(
            "EWS: account {} bound to {} ({})",
            primary_smtp_address, ews_url, access_type
        );

        Ok(Self {
            primary_smtp_address,
            credentials,
            access_type,
            ews_url,
            transport: config.transport().clone(),
        })
    }

    pub fn primary_smtp_address(&self) -> &str {
        &self.primary_smtp_address
    }

    pub fn access_type(&self) -> AccessType {
        self.access_type
    }

    pub fn ews_url(&self) -> &Url {
        &self.ews_url
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub(crate) async fn post(&self, body: String) -> EwsResult<TransportResponse> {
        self.transport
            .post(&self.ews_url, &self.credentials, body)
            .await
    }
}
