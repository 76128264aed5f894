//! Validated string identifiers.
//!
//! Identifiers arrive from clients, the identity provider, and the payment
//! gateway, so they are opaque strings rather than UUIDs. Locally generated
//! identifiers are UUID v4 strings.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum accepted identifier length in bytes.
pub const IDENTIFIER_MAX_LEN: usize = 128;

/// Validation errors for identifier newtypes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentifierValidationError {
    #[error("{kind} must not be empty")]
    Empty { kind: &'static str },
    #[error("{kind} must be at most {max} characters")]
    TooLong { kind: &'static str, max: usize },
    #[error("{kind} may only contain letters, digits, '-' or '_'")]
    InvalidCharacters { kind: &'static str },
}

fn validate(kind: &'static str, raw: &str) -> Result<(), IdentifierValidationError> {
    if raw.is_empty() {
        return Err(IdentifierValidationError::Empty { kind });
    }
    if raw.len() > IDENTIFIER_MAX_LEN {
        return Err(IdentifierValidationError::TooLong {
            kind,
            max: IDENTIFIER_MAX_LEN,
        });
    }
    let allowed = |c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_';
    if !raw.chars().all(allowed) {
        return Err(IdentifierValidationError::InvalidCharacters { kind });
    }
    Ok(())
}

macro_rules! define_identifier {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Validate and construct the identifier.
            pub fn new(raw: impl Into<String>) -> Result<Self, IdentifierValidationError> {
                let raw = raw.into();
                validate($kind, &raw)?;
                Ok(Self(raw))
            }

            /// Generate a fresh random identifier.
            pub fn random() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            /// Borrow the raw identifier.
            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdentifierValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }
    };
}

define_identifier!(
    /// Learner or teacher identifier issued by the identity provider.
    UserId,
    "user id"
);
define_identifier!(
    /// Course identifier; immutable once assigned.
    CourseId,
    "course id"
);
define_identifier!(
    /// Section identifier, unique within its course for the course lifetime.
    SectionId,
    "section id"
);
define_identifier!(
    /// Chapter identifier, unique within its course for the course lifetime.
    ChapterId,
    "chapter id"
);
define_identifier!(
    /// Client-supplied purchase identifier used as the enrollment idempotency key.
    TransactionId,
    "transaction id"
);
