use std::fmt;

use crate::address::{fmt_address, Address};
use crate::error::{Error, Result};

/// A network prefix: the top `len` bits of an address.
///
/// The bits below the mask are always zero, so two prefixes compare equal
/// exactly when they cover the same range.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Prefix<A> {
    addr: A,
    len: u8,
}

impl<A: Address> Prefix<A> {
    /// Creates a prefix, clearing any bits of `addr` below the mask.
    ///
    /// ```
    /// use prefix_tags::Prefix;
    ///
    /// let a = Prefix::new(0x0A00_0001u32, 24).unwrap();
    /// let b = Prefix::new(0x0A00_0063u32, 24).unwrap();
    /// assert_eq!(a, b);
    /// assert_eq!(a.addr(), 0x0A00_0000);
    /// ```
    pub fn new(addr: A, len: u8) -> Result<Self> {
        if len > A::BITS {
            return Err(Error::PrefixLength {
                len: len.into(),
                max: A::BITS,
            });
        }
        Ok(Self {
            addr: addr.mask(len),
            len,
        })
    }

    /// Creates a prefix from raw, unchecked-width inputs.
    pub fn from_raw(value: u128, len: u32) -> Result<Self> {
        let addr = A::from_u128(value).ok_or(Error::AddressOutOfRange {
            value,
            width: A::BITS,
        })?;
        let len = u8::try_from(len)
            .ok()
            .filter(|&l| l <= A::BITS)
            .ok_or(Error::PrefixLength { len, max: A::BITS })?;
        Self::new(addr, len)
    }

    /// The prefix of length zero, containing every address.
    pub fn any() -> Self {
        Self {
            addr: A::ZERO,
            len: 0,
        }
    }

    /// The full-length prefix containing only `addr`.
    pub fn host(addr: A) -> Self {
        Self {
            addr,
            len: A::BITS,
        }
    }

    /// `addr` must already be masked to `len`.
    pub(crate) fn from_parts(addr: A, len: u8) -> Self {
        debug_assert!(len <= A::BITS);
        debug_assert!(addr.mask(len) == addr);
        Self { addr, len }
    }

    #[inline]
    pub fn addr(&self) -> A {
        self.addr
    }

    #[inline]
    pub fn len(&self) -> u8 {
        self.len
    }

    /// True for the zero-length prefix, which contains every address.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether `addr` lies inside this prefix.
    #[inline]
    pub fn contains(&self, addr: A) -> bool {
        addr.mask(self.len) == self.addr
    }

    /// Whether every address of `other` also lies inside this prefix.
    pub fn covers(&self, other: &Prefix<A>) -> bool {
        self.len <= other.len && self.contains(other.addr)
    }
}

impl<A: Address> fmt::Display for Prefix<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_address(self.addr, f)?;
        write!(f, "/{}", self.len)
    }
}

impl<A: Address> fmt::Debug for Prefix<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
