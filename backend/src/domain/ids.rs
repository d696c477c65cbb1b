//! Strongly typed identifiers for owners, clubs, ledger entries and
//! testing sessions.
//!
//! The inventory store is document-oriented, so identifiers are opaque
//! strings rather than UUIDs. Each identifier rejects blank values and
//! surrounding whitespace; freshly minted identifiers use UUID v4 text.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Validation errors returned when constructing an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdValidationError {
    /// Identifier is empty after trimming whitespace.
    #[error("{kind} must not be empty")]
    Empty {
        /// Human-readable identifier kind.
        kind: &'static str,
    },
    /// Identifier carries leading or trailing whitespace.
    #[error("{kind} must not contain surrounding whitespace")]
    SurroundingWhitespace {
        /// Human-readable identifier kind.
        kind: &'static str,
    },
}

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident => $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Validate and construct the identifier.
            pub fn new(raw: impl Into<String>) -> Result<Self, IdValidationError> {
                let raw = raw.into();
                if raw.trim().is_empty() {
                    return Err(IdValidationError::Empty { kind: $kind });
                }
                if raw.trim() != raw {
                    return Err(IdValidationError::SurroundingWhitespace { kind: $kind });
                }
                Ok(Self(raw))
            }

            /// Mint a fresh random identifier.
            pub fn random() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            /// Borrow the identifier text.
            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }
    };
}

define_id! {
    /// Identity of the golfer who owns a bag.
    OwnerId => "owner id"
}

define_id! {
    /// Identity of one physical club document.
    ClubId => "club id"
}

define_id! {
    /// Identity of one change ledger entry.
    ChangeId => "change id"
}

define_id! {
    /// Identity of the fitting or testing session that produced a change.
    SessionId => "session id"
}

#[cfg(test)]
mod tests {
    //! Regression coverage for identifier validation.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn blank_identifiers_are_rejected(#[case] raw: &str) {
        assert_eq!(
            ClubId::new(raw),
            Err(IdValidationError::Empty { kind: "club id" })
        );
    }

    #[rstest]
    fn padded_identifiers_are_rejected() {
        assert_eq!(
            OwnerId::new(" owner-1"),
            Err(IdValidationError::SurroundingWhitespace { kind: "owner id" })
        );
    }

    #[rstest]
    fn identifiers_round_trip_through_json_strings() {
        let id = ChangeId::new("change-42").expect("valid id");
        let json = serde_json::to_string(&id).expect("serialise");
        assert_eq!(json, "\"change-42\"");
        let decoded: ChangeId = serde_json::from_str(&json).expect("deserialise");
        assert_eq!(decoded, id);
    }

    #[rstest]
    fn random_identifiers_are_distinct() {
        assert_ne!(SessionId::random(), SessionId::random());
    }
}
