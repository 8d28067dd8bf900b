//! 8-bit Fletcher checksum used by UBX frames.
//!
//! Computed over class, id, both length bytes and the payload. The sync
//! marker and the two checksum bytes themselves are never included.
//!
//! ```
//! use ubx_framing::protocol::{checksum, Checksum};
//!
//! // UBX-CFG-PRT poll: B5 62 | 06 00 00 00 | 06 18
//! let ck = checksum(&[0x06, 0x00, 0x00, 0x00]).unwrap();
//! assert_eq!(ck, Checksum::new(0x06, 0x18));
//! ```

use std::fmt;

/// Checksum size in bytes.
pub const CHECKSUM_SIZE: usize = 2;

/// The two checksum bytes, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Checksum {
    pub ck_a: u8,
    pub ck_b: u8,
}

impl Checksum {
    #[inline]
    pub const fn new(ck_a: u8, ck_b: u8) -> Self {
        Self { ck_a, ck_b }
    }

    /// Read a checksum from the first two bytes of `buf`.
    ///
    /// Returns `None` if buffer is too short.
    #[inline]
    pub fn from_slice(buf: &[u8]) -> Option<Self> {
        match buf {
            [ck_a, ck_b, ..] => Some(Self::new(*ck_a, *ck_b)),
            _ => None,
        }
    }

    /// Wire representation `[ck_a, ck_b]`.
    #[inline]
    pub fn to_bytes(self) -> [u8; CHECKSUM_SIZE] {
        [self.ck_a, self.ck_b]
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02x} {:02x}", self.ck_a, self.ck_b)
    }
}

/// Compute the checksum of `bytes`.
///
/// Returns `None` for an empty slice: there is nothing to seed the
/// accumulators with.
pub fn checksum(bytes: &[u8]) -> Option<Checksum> {
    let (&first, rest) = bytes.split_first()?;
    let mut ck_a = first;
    let mut ck_b = first;
    for &b in rest {
        ck_a = ck_a.wrapping_add(b);
        ck_b = ck_b.wrapping_add(ck_a);
    }
    Some(Checksum { ck_a, ck_b })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_is_noop() {
        assert_eq!(checksum(&[]), None);
    }

    #[test]
    fn test_all_zero_header() {
        // class=0, id=0, len=0
        assert_eq!(checksum(&[0, 0, 0, 0]), Some(Checksum::new(0, 0)));
    }

    #[test]
    fn test_single_byte_seeds_both_accumulators() {
        assert_eq!(checksum(&[0x42]), Some(Checksum::new(0x42, 0x42)));
    }

    #[test]
    fn test_known_poll_requests() {
        // CFG-PRT poll
        assert_eq!(
            checksum(&[0x06, 0x00, 0x00, 0x00]),
            Some(Checksum::new(0x06, 0x18))
        );
        // MON-VER poll
        assert_eq!(
            checksum(&[0x0A, 0x04, 0x00, 0x00]),
            Some(Checksum::new(0x0E, 0x34))
        );
        // NAV-PVT poll
        assert_eq!(
            checksum(&[0x01, 0x07, 0x00, 0x00]),
            Some(Checksum::new(0x08, 0x19))
        );
    }

    #[test]
    fn test_known_ack() {
        // ACK-ACK for CFG-PRT: B5 62 05 01 02 00 06 00 0E 37
        assert_eq!(
            checksum(&[0x05, 0x01, 0x02, 0x00, 0x06, 0x00]),
            Some(Checksum::new(0x0E, 0x37))
        );
    }

    #[test]
    fn test_accumulators_wrap() {
        let ck = checksum(&[0xFF; 4]).unwrap();
        // a: FF, FE, FD, FC   b: FF, FD, FA, F6
        assert_eq!(ck, Checksum::new(0xFC, 0xF6));
    }

    #[test]
    fn test_from_slice_and_to_bytes() {
        let ck = Checksum::from_slice(&[0x0E, 0x37, 0x99]).unwrap();
        assert_eq!(ck, Checksum::new(0x0E, 0x37));
        assert_eq!(ck.to_bytes(), [0x0E, 0x37]);
        assert!(Checksum::from_slice(&[0x0E]).is_none());
    }
}
