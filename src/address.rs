//! Fixed-width address values.
//!
//! The trie never looks at an address as anything but a string of `BITS` bits,
//! most significant first. IPv4 is `u32`; the narrower widths exist mostly so
//! that exhaustive tests can enumerate every address.

use std::fmt;
use std::hash::Hash;

/// An unsigned address of a fixed bit width.
///
/// Bits are indexed from the most significant end: bit `0` is the MSB and bit
/// `BITS - 1` is the LSB.
pub trait Address: Copy + Eq + Ord + Hash + fmt::Debug + Send + Sync + 'static {
    /// Width of the address in bits.
    const BITS: u8;

    /// The all-zeros address.
    const ZERO: Self;

    /// Value of bit `i` (MSB first).
    fn bit(self, i: u8) -> bool;

    /// Returns the address with bit `i` (MSB first) set.
    fn with_bit(self, i: u8) -> Self;

    /// Keeps the top `len` bits and clears the rest.
    fn mask(self, len: u8) -> Self;

    /// Narrows a raw value, or `None` if it does not fit in `BITS` bits.
    fn from_u128(value: u128) -> Option<Self>;

    /// Widens the address to a raw value.
    fn to_u128(self) -> u128;
}

macro_rules! impl_address {
    ($($t:ty),* $(,)?) => {$(
        impl Address for $t {
            const BITS: u8 = <$t>::BITS as u8;
            const ZERO: Self = 0;

            #[inline]
            fn bit(self, i: u8) -> bool {
                debug_assert!(i < <Self as Address>::BITS);
                (self >> (<Self as Address>::BITS - 1 - i)) & 1 == 1
            }

            #[inline]
            fn with_bit(self, i: u8) -> Self {
                debug_assert!(i < <Self as Address>::BITS);
                self | ((1 as $t) << (<Self as Address>::BITS - 1 - i))
            }

            #[inline]
            fn mask(self, len: u8) -> Self {
                debug_assert!(len <= <Self as Address>::BITS);
                if len == 0 {
                    0
                } else {
                    self & (<$t>::MAX << (<Self as Address>::BITS - len))
                }
            }

            #[inline]
            fn from_u128(value: u128) -> Option<Self> {
                <$t>::try_from(value).ok()
            }

            #[inline]
            fn to_u128(self) -> u128 {
                u128::from(self)
            }
        }
    )*};
}

impl_address!(u8, u16, u32, u64);

/// Writes an address in its usual text form: dotted quad for 32-bit
/// addresses, hex otherwise.
pub(crate) fn fmt_address<A: Address>(addr: A, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let raw = addr.to_u128();
    if A::BITS == 32 {
        write!(
            f,
            "{}.{}.{}.{}",
            (raw >> 24) & 0xFF,
            (raw >> 16) & 0xFF,
            (raw >> 8) & 0xFF,
            raw & 0xFF
        )
    } else {
        write!(f, "{:#x}", raw)
    }
}
