//! POX autodiscover
//!
//! Locates the EWS endpoint for a mailbox by asking the autodiscover service
//! of the address's domain, following address and URL redirects.

use crate::config::EwsConfig;
use crate::credentials::Credentials;
use crate::error::{EwsError, EwsResult};
use crate::transport::EwsTransport;
use crate::xml::{autodiscover_request, parse_autodiscover_response, AutodiscoverResponse};
use std::collections::HashSet;
use tracing::{debug, info};
use url::Url;

/// Maximum number of redirects followed before giving up
pub const MAX_REDIRECTS: usize = 10;

/// Find the EWS URL for `email`
pub async fn discover(email: &str, credentials: &Credentials, config: &EwsConfig) -> EwsResult<Url> {
    info!("Autodiscover: looking up {}", email);

    let mut address = email.to_string();
    let mut candidates = candidate_endpoints(&address, config)?;
    let mut seen_addresses = HashSet::from([address.to_lowercase()]);
    let mut hops = 0;

    loop {
        let response =
            query_candidates(&address, &candidates, credentials, &**config.transport()).await?;

        match response {
            AutodiscoverResponse::EwsUrl(url) => {
                info!("Autodiscover: {} uses {}", email, url);
                return Url::parse(&url)
                    .map_err(|e| EwsError::ParseError(format!("EwsUrl {:?}: {}", url, e)));
            }
            AutodiscoverResponse::Error { code, message } => {
                return Err(EwsError::AutoDiscoverError(format!("{}: {}", code, message)));
            }
            AutodiscoverResponse::RedirectAddr(next) => {
                debug!("Autodiscover: {} redirected to address {}", address, next);
                if !seen_addresses.insert(next.to_lowercase()) {
                    return Err(EwsError::AutoDiscoverCircularRedirect(format!(
                        "{} was already tried",
                        next
                    )));
                }
                candidates = candidate_endpoints(&next, config)?;
                address = next;
            }
            AutodiscoverResponse::RedirectUrl(next) => {
                debug!("Autodiscover: {} redirected to URL {}", address, next);
                let url = Url::parse(&next).map_err(|e| {
                    EwsError::AutoDiscoverError(format!("bad redirect URL {:?}: {}", next, e))
                })?;
                if candidates.len() == 1 && candidates[0] == url {
                    return Err(EwsError::AutoDiscoverCircularRedirect(format!(
                        "{} redirects to itself",
                        url
                    )));
                }
                candidates = vec![url];
            }
        }

        hops += 1;
        if hops > MAX_REDIRECTS {
            return Err(EwsError::AutoDiscoverFailed(format!(
                "more than {} redirects for email {}",
                MAX_REDIRECTS, email
            )));
        }
    }
}

/// Autodiscover URLs to try for `email`, in order
pub fn candidate_endpoints(email: &str, config: &EwsConfig) -> EwsResult<Vec<Url>> {
    if let Some(urls) = config.get_autodiscover_endpoints() {
        return Ok(urls.to_vec());
    }

    let domain = email
        .rsplit_once('@')
        .map(|(_, domain)| domain)
        .filter(|domain| !domain.is_empty())
        .ok_or_else(|| EwsError::InvalidField(format!("{:?} is not an email address", email)))?;

    [
        format!("https://{}/autodiscover/autodiscover.xml", domain),
        format!("https://autodiscover.{}/autodiscover/autodiscover.xml", domain),
    ]
    .iter()
    .map(|s| {
        Url::parse(s).map_err(|e| EwsError::InvalidField(format!("domain {:?}: {}", domain, e)))
    })
    .collect()
}

async fn query_candidates(
    address: &str,
    candidates: &[Url],
    credentials: &Credentials,
    transport: &dyn EwsTransport,
) -> EwsResult<AutodiscoverResponse> {
    for url in candidates {
        let response = match transport
            .post(url, credentials, autodiscover_request(address))
            .await
        {
            Ok(response) => response,
            Err(e) => {
                debug!("Autodiscover: {} unreachable: {}", url, e);
                continue;
            }
        };

        if response.status == 401 {
            return Err(EwsError::Unauthorized(format!(
                "autodiscover at {} rejected the credentials",
                url
            )));
        }
        if !response.is_success() {
            debug!("Autodiscover: {} answered {}", url, response.status);
            continue;
        }

        match parse_autodiscover_response(&response.body) {
            Ok(parsed) => return Ok(parsed),
            Err(e) => debug!("Autodiscover: {} sent an unusable response: {}", url, e),
        }
    }

    Err(EwsError::AutoDiscoverFailed(format!(
        "All steps in the autodiscover protocol failed for email {}",
        address
    )))
}
