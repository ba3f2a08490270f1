//! Validation errors.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A rejected prefix, address or tag.
///
/// Every variant belongs to one of three broad kinds (see [`ErrorKind`]) so
/// that callers can map failures without matching on the details.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Prefix length larger than the address width.
    #[error("prefix length /{len} exceeds the {max}-bit address width")]
    PrefixLength { len: u32, max: u8 },

    /// Strictly parsed prefix with bits set below its mask.
    #[error("prefix {0:?} has host bits set beyond its mask")]
    HostBitsSet(String),

    /// Prefix text that is not `address/length`.
    #[error("malformed prefix {0:?}, expected `address/length`")]
    MalformedPrefix(String),

    /// Raw address value wider than the address width.
    #[error("address value {value:#x} does not fit in {width} bits")]
    AddressOutOfRange { value: u128, width: u8 },

    /// Address text that is not four dot-separated octets.
    #[error("malformed address {0:?}, expected four dot-separated octets")]
    MalformedAddress(String),

    /// One octet of an address is not a decimal number in `0..=255`.
    #[error("invalid octet {octet:?} in address {address:?}")]
    InvalidOctet { address: String, octet: String },

    #[error("tag must not be empty")]
    EmptyTag,
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidPrefix,
    InvalidAddress,
    InvalidTag,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::PrefixLength { .. } | Error::HostBitsSet(_) | Error::MalformedPrefix(_) => {
                ErrorKind::InvalidPrefix
            }
            Error::AddressOutOfRange { .. }
            | Error::MalformedAddress(_)
            | Error::InvalidOctet { .. } => ErrorKind::InvalidAddress,
            Error::EmptyTag => ErrorKind::InvalidTag,
        }
    }
}

/// Checks that `tag` can be stored in an index.
pub(crate) fn validate_tag(tag: &str) -> Result<()> {
    if tag.is_empty() {
        return Err(Error::EmptyTag);
    }
    Ok(())
}
