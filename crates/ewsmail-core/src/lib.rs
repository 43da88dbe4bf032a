//! Outbound mail model for ewsmail
//!
//! Provides the message type, the backend contract every delivery backend
//! implements, process-wide settings and address sanitization.

mod address;
mod backend;
mod error;
mod message;
mod settings;

pub use address::{sanitize_mailbox, Charset, SanitizedAddress};
pub use backend::{send_mail, send_mass_mail, EmailBackend, OpenOutcome};
pub use error::{CoreError, CoreResult};
pub use message::EmailMessage;
pub use settings::Settings;
