//! Frame struct with typed accessors.
//!
//! Represents a complete UBX frame with header and payload.
//! Uses `bytes::Bytes` for zero-copy payload sharing.
//!
//! # Example
//!
//! ```
//! use ubx_framing::protocol::{classes, ids, Frame, Header};
//! use bytes::Bytes;
//!
//! let header = Header::new(classes::ACK, ids::ACK_ACK, 2);
//! let frame = Frame::new(header, Bytes::from_static(&[0x06, 0x00]));
//!
//! assert_eq!(frame.name(), Some("ACK-ACK"));
//! assert_eq!(
//!     frame.encode(),
//!     [0xB5, 0x62, 0x05, 0x01, 0x02, 0x00, 0x06, 0x00, 0x0E, 0x37]
//! );
//! ```

use std::io::Write;

use bytes::Bytes;

use super::checksum::checksum;
use super::wire_format::{Header, FRAME_OVERHEAD, HEADER_SIZE, MAX_PAYLOAD_SIZE, SYNC};
use crate::error::{Result, UbxError};

/// A complete protocol frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Decoded header.
    pub header: Header,
    /// Payload bytes (zero-copy via `bytes::Bytes`).
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame from header and payload.
    ///
    /// The header's length field must match `payload`; use
    /// [`Frame::from_parts`] to derive it.
    pub fn new(header: Header, payload: Bytes) -> Self {
        debug_assert_eq!(usize::from(header.payload_length), payload.len());
        Self { header, payload }
    }

    /// Create a frame from class, id and raw bytes (copies data).
    ///
    /// # Errors
    ///
    /// Returns `PayloadTooLarge` if the payload does not fit the length field.
    pub fn from_parts(class: u8, id: u8, payload: &[u8]) -> Result<Self> {
        let length = payload_length(payload)?;
        Ok(Self {
            header: Header::new(class, id, length),
            payload: Bytes::copy_from_slice(payload),
        })
    }

    /// Get a reference to the payload bytes.
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Get a clone of the payload as Bytes (cheap, zero-copy).
    #[inline]
    pub fn payload_bytes(&self) -> Bytes {
        self.payload.clone()
    }

    #[inline]
    pub fn payload_len(&self) -> usize {
        self.payload.len()
    }

    #[inline]
    pub fn class(&self) -> u8 {
        self.header.class
    }

    #[inline]
    pub fn id(&self) -> u8 {
        self.header.id
    }

    /// Message name, e.g. `NAV-POSLLH`, if known.
    #[inline]
    pub fn name(&self) -> Option<&'static str> {
        self.header.name()
    }

    /// Check if this frame is of the given class and id.
    #[inline]
    pub fn is(&self, class: u8, id: u8) -> bool {
        self.header.class == class && self.header.id == id
    }

    /// Encode to on-wire bytes, sync marker and checksum included.
    ///
    /// The length field is written from the payload, not from `header`.
    /// Payloads past 65535 bytes are cut to fit.
    pub fn encode(&self) -> Vec<u8> {
        let payload = &self.payload[..self.payload.len().min(MAX_PAYLOAD_SIZE)];
        let header = Header::new(self.header.class, self.header.id, payload.len() as u16);
        encode_parts(&header, payload)
    }

    /// Write the encoded frame to `writer`.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.encode())?;
        Ok(())
    }
}

/// Build a complete frame as a single byte vector.
///
/// # Errors
///
/// Returns `PayloadTooLarge` if `payload` is longer than 65535 bytes.
///
/// # Example
///
/// ```
/// use ubx_framing::protocol::build_frame;
///
/// let bytes = build_frame(0x06, 0x08, &[0xE8, 0x03, 0x01, 0x00, 0x01, 0x00]).unwrap();
/// assert_eq!(bytes.len(), 8 + 6);
/// assert_eq!(&bytes[..2], &[0xB5, 0x62]);
/// ```
pub fn build_frame(class: u8, id: u8, payload: &[u8]) -> Result<Vec<u8>> {
    let header = Header::new(class, id, payload_length(payload)?);
    Ok(encode_parts(&header, payload))
}

/// Build a zero-length poll request for `class`/`id`.
///
/// ```
/// use ubx_framing::protocol::build_poll;
///
/// // MON-VER poll
/// assert_eq!(build_poll(0x0A, 0x04), [0xB5, 0x62, 0x0A, 0x04, 0x00, 0x00, 0x0E, 0x34]);
/// ```
pub fn build_poll(class: u8, id: u8) -> [u8; FRAME_OVERHEAD] {
    let header = Header::new(class, id, 0).encode();
    let ck = checksum(&header).unwrap_or_default();
    [
        SYNC[0], SYNC[1], header[0], header[1], header[2], header[3], ck.ck_a, ck.ck_b,
    ]
}

fn payload_length(payload: &[u8]) -> Result<u16> {
    if payload.len() > MAX_PAYLOAD_SIZE {
        return Err(UbxError::PayloadTooLarge(payload.len()));
    }
    Ok(payload.len() as u16)
}

fn encode_parts(header: &Header, payload: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(FRAME_OVERHEAD + payload.len());
    buf.extend_from_slice(&SYNC);
    buf.extend_from_slice(&header.encode());
    buf.extend_from_slice(payload);
    let ck = checksum(&buf[SYNC.len()..SYNC.len() + HEADER_SIZE + payload.len()])
        .unwrap_or_default();
    buf.extend_from_slice(&ck.to_bytes());
    buf
}
