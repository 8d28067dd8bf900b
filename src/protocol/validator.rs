//! Frame validation.
//!
//! Takes a window that starts at the class byte (the caller has already
//! matched and skipped the sync marker) and decides whether a complete,
//! checksum-valid frame is present.
//!
//! The length field comes off the wire and is never trusted: every index is
//! checked against the window before it is used.

use super::checksum::{checksum, Checksum, CHECKSUM_SIZE};
use super::wire_format::{Header, HEADER_SIZE};
use crate::error::FrameError;

/// Smallest possible frame body: header + checksum, empty payload.
pub const MIN_BODY_SIZE: usize = HEADER_SIZE + CHECKSUM_SIZE;

/// A frame that passed validation.
///
/// Offsets are relative to the window handed to [`validate_frame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidFrame {
    pub header: Header,
    /// Payload start within the window. Always [`HEADER_SIZE`].
    pub payload_offset: usize,
    pub payload_length: usize,
    /// Bytes the frame occupies in the window, checksum included.
    pub consumed: usize,
}

impl ValidFrame {
    /// Payload bytes of this frame within `window`.
    ///
    /// Returns `None` if `window` is not the buffer the frame was validated
    /// against (too short).
    #[inline]
    pub fn payload<'a>(&self, window: &'a [u8]) -> Option<&'a [u8]> {
        let end = self.payload_offset.checked_add(self.payload_length)?;
        window.get(self.payload_offset..end)
    }
}

/// Validate the frame at the start of `window`.
///
/// # Errors
///
/// - [`FrameError::Incomplete`] if the window is shorter than the frame its
///   header announces (or shorter than a header).
/// - [`FrameError::ChecksumMismatch`] if the frame is complete but the
///   trailing checksum does not match.
///
/// # Example
///
/// ```
/// use ubx_framing::protocol::validate_frame;
///
/// // ACK-ACK for CFG-PRT, without the sync marker.
/// let window = [0x05, 0x01, 0x02, 0x00, 0x06, 0x00, 0x0E, 0x37];
/// let frame = validate_frame(&window).unwrap();
/// assert_eq!(frame.payload_offset, 4);
/// assert_eq!(frame.payload_length, 2);
/// assert_eq!(frame.consumed, 8);
/// ```
pub fn validate_frame(window: &[u8]) -> Result<ValidFrame, FrameError> {
    let header = match Header::decode(window) {
        Some(header) => header,
        None => {
            return Err(FrameError::Incomplete {
                needed: MIN_BODY_SIZE,
                available: window.len(),
            })
        }
    };

    let payload_length = header.payload_length as usize;
    let covered = HEADER_SIZE + payload_length;
    let needed = covered + CHECKSUM_SIZE;
    if window.len() < needed {
        return Err(FrameError::Incomplete {
            needed,
            available: window.len(),
        });
    }

    let expected = checksum(&window[..covered]).unwrap_or_default();
    let found = Checksum::from_slice(&window[covered..]).ok_or(FrameError::Incomplete {
        needed,
        available: window.len(),
    })?;
    if expected != found {
        return Err(FrameError::ChecksumMismatch { expected, found });
    }

    Ok(ValidFrame {
        header,
        payload_offset: HEADER_SIZE,
        payload_length,
        consumed: needed,
    })
}
