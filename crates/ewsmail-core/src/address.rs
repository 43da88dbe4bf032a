//! Address sanitization
//!
//! Normalizes sender and recipient addresses before they are handed to a
//! delivery backend. A display name has to be representable in the message's
//! charset.

use crate::{CoreError, CoreResult};
use lettre::message::Mailbox;
use std::fmt;
use std::str::FromStr;

/// Character sets supported for header encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    Utf8,
    UsAscii,
    Latin1,
}

impl Charset {
    /// Canonical label used in encoded words
    pub fn label(&self) -> &'static str {
        match self {
            Charset::Utf8 => "utf-8",
            Charset::UsAscii => "us-ascii",
            Charset::Latin1 => "iso-8859-1",
        }
    }

    /// Encode text in this charset, or `None` if a character has no mapping
    pub fn encode(&self, text: &str) -> Option<Vec<u8>> {
        match self {
            Charset::Utf8 => Some(text.as_bytes().to_vec()),
            Charset::UsAscii => text.is_ascii().then(|| text.as_bytes().to_vec()),
            Charset::Latin1 => text
                .chars()
                .map(|c| u8::try_from(u32::from(c)).ok())
                .collect(),
        }
    }
}

impl FromStr for Charset {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(Charset::Utf8),
            "us-ascii" | "ascii" => Ok(Charset::UsAscii),
            "iso-8859-1" | "iso8859-1" | "latin-1" | "latin1" => Ok(Charset::Latin1),
            _ => Err(CoreError::UnsupportedCharset(s.to_string())),
        }
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A parsed, validated address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedAddress {
    /// Display name as written, if any
    pub display_name: Option<String>,
    /// `local@domain`
    pub addr_spec: String,
}

/// Parse and validate `Display Name <local@domain>` or `local@domain`
///
/// Fails on newlines anywhere in the address, on anything that does not parse
/// as a single mailbox, and on display names the charset cannot represent.
pub fn sanitize_mailbox(addr: &str, charset: Charset) -> CoreResult<SanitizedAddress> {
    if addr.contains(['\r', '\n']) {
        return Err(CoreError::InvalidAddress(
            "address parts cannot contain newlines".to_string(),
        ));
    }

    let mailbox: Mailbox = addr
        .trim()
        .parse()
        .map_err(|e| CoreError::InvalidAddress(format!("{:?}: {}", addr, e)))?;

    let display_name = mailbox.name.filter(|name| !name.is_empty());
    if let Some(ref name) = display_name {
        if charset.encode(name).is_none() {
            return Err(CoreError::InvalidAddress(format!(
                "{:?} cannot be encoded as {}",
                name, charset
            )));
        }
    }

    Ok(SanitizedAddress {
        display_name,
        addr_spec: format!("{}@{}", mailbox.email.user(), mailbox.email.domain()),
    })
}
