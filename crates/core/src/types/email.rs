//! Email address type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`Email`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    /// The input string is empty (after trimming).
    #[error("email cannot be empty")]
    Empty,
    /// The input contains whitespace inside the address.
    #[error("email cannot contain whitespace")]
    ContainsWhitespace,
    /// The input does not contain an @ symbol.
    #[error("email must contain an @ symbol")]
    MissingAtSymbol,
    /// The input contains more than one @ symbol.
    #[error("email must contain exactly one @ symbol")]
    MultipleAtSymbols,
    /// The local part (before @) is empty.
    #[error("email local part cannot be empty")]
    EmptyLocalPart,
    /// The domain part (after @) has no dot with text on both sides.
    #[error("email domain must look like name.tld")]
    InvalidDomain,
}

/// An email address.
///
/// This is a permissive structural check, not RFC 5322 compliance. After
/// trimming surrounding whitespace the address must be
/// `local@name.tld` where every part is non-empty and contains neither
/// whitespace nor `@`.
///
/// ## Examples
///
/// ```
/// use meatshop_core::Email;
///
/// // Valid emails
/// assert!(Email::parse("a@b.co").is_ok());
/// assert!(Email::parse("  user.name+tag@domain.co.uk  ").is_ok());
///
/// // Invalid emails
/// assert!(Email::parse("").is_err());             // empty
/// assert!(Email::parse("bad").is_err());          // missing @
/// assert!(Email::parse("user@localhost").is_err()); // no dot in domain
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Parse an `Email` from a string, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input:
    /// - Is empty
    /// - Contains whitespace
    /// - Does not contain exactly one @ symbol
    /// - Has an empty local part
    /// - Has a domain without a dot that has text on both sides
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(EmailError::Empty);
        }

        if s.chars().any(char::is_whitespace) {
            return Err(EmailError::ContainsWhitespace);
        }

        let (local, domain) = s.split_once('@').ok_or(EmailError::MissingAtSymbol)?;

        if domain.contains('@') {
            return Err(EmailError::MultipleAtSymbols);
        }

        if local.is_empty() {
            return Err(EmailError::EmptyLocalPart);
        }

        if !has_inner_dot(domain) {
            return Err(EmailError::InvalidDomain);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the email address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A dot somewhere other than the first or last character.
fn has_inner_dot(domain: &str) -> bool {
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// Returns `true` if `s` passes [`Email::parse`].
#[must_use]
pub fn is_valid_email(s: &str) -> bool {
    Email::parse(s).is_ok()
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
