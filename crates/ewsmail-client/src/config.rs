use crate::transport::{EwsTransport, HttpTransport};
use std::fmt;
use std::sync::Arc;
use url::Url;

/// Connection settings shared by accounts
#[derive(Clone)]
pub struct EwsConfig {
    transport: Arc<dyn EwsTransport>,
    service_endpoint: Option<Url>,
    autodiscover_endpoints: Option<Vec<Url>>,
}

impl EwsConfig {
    pub fn new() -> Self {
        Self::with_transport(Arc::new(HttpTransport::new()))
    }

    pub fn with_transport(transport: Arc<dyn EwsTransport>) -> Self {
        Self {
            transport,
            service_endpoint: None,
            autodiscover_endpoints: None,
        }
    }

    /// Fixed EWS endpoint for accounts created without autodiscover
    pub fn service_endpoint(mut self, url: Url) -> Self {
        self.service_endpoint = Some(url);
        self
    }

    /// Query these autodiscover URLs instead of deriving them from the address
    pub fn autodiscover_endpoints(mut self, urls: Vec<Url>) -> Self {
        self.autodiscover_endpoints = Some(urls);
        self
    }

    pub fn transport(&self) -> &Arc<dyn EwsTransport> {
        &self.transport
    }

    pub fn get_service_endpoint(&self) -> Option<&Url> {
        self.service_endpoint.as_ref()
    }

    pub fn get_autodiscover_endpoints(&self) -> Option<&[Url]> {
        self.autodiscover_endpoints.as_deref()
    }
}

impl Default for EwsConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EwsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EwsConfig")
            .field("service_endpoint", &self.service_endpoint)
            .field("autodiscover_endpoints", &self.autodiscover_endpoints)
            .finish_non_exhaustive()
    }
}
