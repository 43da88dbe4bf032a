//! Exchange delivery backend for ewsmail
//!
//! Implements [`ewsmail_core::EmailBackend`] on top of Exchange Web Services:
//! the sender's mailbox is located through autodiscover and each message is
//! sent with `CreateItem`, keeping a copy in Sent Items.

mod backend;
mod error;
mod options;

pub use backend::ExchangeEmailBackend;
pub use error::{BackendError, BackendResult};
pub use options::BackendOptions;
