//! Minimal Exchange Web Services client
//!
//! Covers what a delivery backend needs: credentials, POX autodiscover,
//! binding an account to its EWS endpoint and sending a plain-text message.

pub mod account;
pub mod autodiscover;
pub mod config;
pub mod credentials;
pub mod error;
pub mod message;
pub mod transport;
pub mod types;
pub mod xml;

pub use account::Account;
pub use config::EwsConfig;
pub use credentials::Credentials;
pub use error::{EwsError, EwsResult};
pub use message::Message;
pub use transport::{EwsTransport, HttpTransport};
pub use types::*;
