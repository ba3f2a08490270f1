//! IPv4 text parsing.
//!
//! The trie only sees normalized `(address, length)` pairs; this module turns
//! dotted-quad and CIDR text into them. Octets are plain decimal without
//! leading zeros, so `"010.0.0.1"` is rejected rather than guessed at.

use std::net::Ipv4Addr;
use std::str::FromStr;

use crate::address::Address;
use crate::error::{Error, Result};
use crate::prefix::Prefix;

/// Parses a dotted-quad IPv4 address into its raw value.
///
/// ```
/// assert_eq!(prefix_tags::parse_ipv4("10.20.30.40").unwrap(), 0x0A14_1E28);
/// assert!(prefix_tags::parse_ipv4("255.255.255.2524").is_err());
/// ```
pub fn parse_ipv4(text: &str) -> Result<u32> {
    let mut value = 0u32;
    let mut octets = 0;
    for part in text.split('.') {
        if octets == 4 {
            return Err(Error::MalformedAddress(text.to_owned()));
        }
        value = (value << 8) | u32::from(parse_octet(text, part)?);
        octets += 1;
    }
    if octets != 4 {
        return Err(Error::MalformedAddress(text.to_owned()));
    }
    Ok(value)
}

fn parse_octet(address: &str, part: &str) -> Result<u8> {
    let invalid = || Error::InvalidOctet {
        address: address.to_owned(),
        octet: part.to_owned(),
    };
    if !is_canonical_decimal(part, 3) {
        return Err(invalid());
    }
    part.parse::<u8>().map_err(|_| invalid())
}

/// Non-empty ASCII digits, at most `max_digits` long, no leading zero.
fn is_canonical_decimal(s: &str, max_digits: usize) -> bool {
    !s.is_empty()
        && s.len() <= max_digits
        && s.bytes().all(|b| b.is_ascii_digit())
        && (s == "0" || !s.starts_with('0'))
}

fn split_cidr(text: &str) -> Result<(u32, u8)> {
    let (addr, len) = text
        .split_once('/')
        .ok_or_else(|| Error::MalformedPrefix(text.to_owned()))?;
    let addr = parse_ipv4(addr)?;
    if !is_canonical_decimal(len, 3) {
        return Err(Error::MalformedPrefix(text.to_owned()));
    }
    let len: u32 = len
        .parse()
        .map_err(|_| Error::MalformedPrefix(text.to_owned()))?;
    let len = u8::try_from(len)
        .ok()
        .filter(|&l| l <= u32::BITS as u8)
        .ok_or(Error::PrefixLength {
            len,
            max: u32::BITS as u8,
        })?;
    Ok((addr, len))
}

impl Prefix<u32> {
    /// Parses CIDR text, masking off host bits instead of rejecting them.
    ///
    /// ```
    /// use prefix_tags::Prefix;
    ///
    /// let p = Prefix::parse_lenient("10.0.0.99/24").unwrap();
    /// assert_eq!(p.to_string(), "10.0.0.0/24");
    /// assert!("10.0.0.99/24".parse::<Prefix<u32>>().is_err());
    /// ```
    pub fn parse_lenient(text: &str) -> Result<Self> {
        let (addr, len) = split_cidr(text)?;
        Prefix::new(addr, len)
    }
}

/// Strict CIDR parsing: host bits below the mask must be zero.
impl FromStr for Prefix<u32> {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self> {
        let (addr, len) = split_cidr(text)?;
        if addr.mask(len) != addr {
            return Err(Error::HostBitsSet(text.to_owned()));
        }
        Prefix::new(addr, len)
    }
}

impl From<Ipv4Addr> for Prefix<u32> {
    fn from(addr: Ipv4Addr) -> Self {
        Prefix::host(u32::from(addr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_parse_ipv4() {
        assert_eq!(parse_ipv4("0.0.0.0"), Ok(0));
        assert_eq!(parse_ipv4("255.255.255.255"), Ok(u32::MAX));
        assert_eq!(parse_ipv4("192.0.2.9"), Ok(0xC000_0209));
    }

    #[test]
    fn test_parse_ipv4_errors() {
        for text in ["", "1.2.3", "1.2.3.4.5", "255.255.255.255/24"] {
            let err = parse_ipv4(text).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidAddress, "{text:?}");
        }
        assert_eq!(
            parse_ipv4("1.2.3"),
            Err(Error::MalformedAddress("1.2.3".into()))
        );
        assert_eq!(
            parse_ipv4("255.255.255.2524"),
            Err(Error::InvalidOctet {
                address: "255.255.255.2524".into(),
                octet: "2524".into()
            })
        );
        for bad in ["256.0.0.1", "01.2.3.4", "1..3.4", "+1.2.3.4", " 1.2.3.4", "a.b.c.d"] {
            assert!(
                matches!(parse_ipv4(bad), Err(Error::InvalidOctet { .. })),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn test_parse_prefix_strict() {
        let p: Prefix<u32> = "192.0.2.8/29".parse().unwrap();
        assert_eq!(p.addr(), 0xC000_0208);
        assert_eq!(p.len(), 29);

        let p: Prefix<u32> = "0.0.0.0/0".parse().unwrap();
        assert_eq!(p, Prefix::any());

        assert_eq!(
            "10.0.0.1/24".parse::<Prefix<u32>>(),
            Err(Error::HostBitsSet("10.0.0.1/24".into()))
        );
    }

    #[test]
    fn test_parse_prefix_errors_are_distinct() {
        assert_eq!(
            "10.0.0.0".parse::<Prefix<u32>>(),
            Err(Error::MalformedPrefix("10.0.0.0".into()))
        );
        assert_eq!(
            "10.0.0.0/x".parse::<Prefix<u32>>(),
            Err(Error::MalformedPrefix("10.0.0.0/x".into()))
        );
        assert_eq!(
            "10.0.0.0/08".parse::<Prefix<u32>>(),
            Err(Error::MalformedPrefix("10.0.0.0/08".into()))
        );
        assert_eq!(
            "10.0.0.0/33".parse::<Prefix<u32>>(),
            Err(Error::PrefixLength { len: 33, max: 32 })
        );
        assert!(matches!(
            "10.0.0.256/24".parse::<Prefix<u32>>(),
            Err(Error::InvalidOctet { .. })
        ));
    }

    #[test]
    fn test_parse_lenient_masks() {
        let a = Prefix::parse_lenient("10.0.0.1/24").unwrap();
        let b = Prefix::parse_lenient("10.0.0.99/24").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "10.0.0.0/24");
    }

    #[test]
    fn test_from_ipv4addr() {
        let p = Prefix::from(Ipv4Addr::new(10, 20, 30, 40));
        assert_eq!(p.to_string(), "10.20.30.40/32");
    }
}
