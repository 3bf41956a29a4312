//! Opaque ledger handles.
//!
//! Addresses and object identifiers are assigned by the ledger and are
//! treated as opaque strings. The only normalisation applied is trimming
//! surrounding whitespace and lower-casing, so that `0xABC` and ` 0xabc `
//! compare equal. No format validation happens here: the ledger is the
//! source of truth for what a well-formed handle looks like.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a normalised handle (trimmed, lower-case).
            pub fn new(value: impl AsRef<str>) -> Self {
                Self(value.as_ref().trim().to_ascii_lowercase())
            }

            /// Returns the handle as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns `true` if the handle is empty after normalisation.
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            /// Returns the first `len` characters followed by `...`,
            /// or the whole handle when it is not longer than `len`.
            pub fn shortened(&self, len: usize) -> String {
                match self.0.char_indices().nth(len) {
                    Some((cut, _)) => format!("{}...", &self.0[..cut]),
                    None => self.0.clone(),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self::new(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_handle!(
    /// Account address on the ledger (student, issuer, administrator).
    Address
);

define_handle!(
    /// Identifier of a ledger object: a credential, the registry, the
    /// contract package or the clock.
    ObjectId
);

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn address_is_trimmed_and_lowercased() {
        let addr = Address::new("  0xABCdef \n");
        assert_eq!(addr.as_str(), "0xabcdef");
        assert_eq!(addr, Address::new("0xabcdef"));
    }

    #[test]
    fn whitespace_only_handle_is_empty() {
        assert!(Address::new("   ").is_empty());
        assert!(ObjectId::default().is_empty());
    }

    #[test]
    fn shortened_cuts_long_handles() {
        let id = ObjectId::new("0x1234567890abcdef");
        assert_eq!(id.shortened(8), "0x123456...");
        assert_eq!(ObjectId::new("0x12").shortened(8), "0x12");
    }

    #[test]
    fn serde_goes_through_normalisation() {
        let addr: Address = address_from_toml("\"0xAB\"");
        assert_eq!(addr.as_str(), "0xab");
    }

    fn address_from_toml(raw: &str) -> Address {
        #[derive(Deserialize)]
        struct Wrapper {
            value: Address,
        }
        let wrapped: Wrapper = toml::from_str(&format!("value = {raw}")).unwrap();
        wrapped.value
    }
}
