//! Wire format encoding and decoding.
//!
//! Implements the UBX frame layout:
//! ```text
//! ┌────────────┬───────┬───────┬──────────┬─────────────┬──────────┐
//! │ Sync       │ Class │ ID    │ Length   │ Payload     │ CK_A CK_B│
//! │ 0xB5 0x62  │ 1 byte│ 1 byte│ uint16 LE│ Length bytes│ 2 bytes  │
//! └────────────┴───────┴───────┴──────────┴─────────────┴──────────┘
//! ```
//!
//! All multi-byte integers are Little Endian. The checksum covers class, id,
//! length and payload.

/// First sync byte.
pub const SYNC_CHAR_1: u8 = 0xB5;

/// Second sync byte.
pub const SYNC_CHAR_2: u8 = 0x62;

/// The two-byte sync marker.
pub const SYNC: [u8; 2] = [SYNC_CHAR_1, SYNC_CHAR_2];

/// Sync marker size in bytes.
pub const SYNC_SIZE: usize = 2;

/// Header size in bytes after the sync marker (class, id, length).
pub const HEADER_SIZE: usize = 4;

/// Bytes a frame adds around its payload: sync + header + checksum.
pub const FRAME_OVERHEAD: usize = SYNC_SIZE + HEADER_SIZE + super::CHECKSUM_SIZE;

/// Largest payload the 16-bit length field can describe.
pub const MAX_PAYLOAD_SIZE: usize = u16::MAX as usize;

/// Message class constants.
pub mod classes {
    /// Navigation results.
    pub const NAV: u8 = 0x01;
    /// Receiver manager messages.
    pub const RXM: u8 = 0x02;
    /// Information messages (printf-style text).
    pub const INF: u8 = 0x04;
    /// Ack/Nak replies to CFG messages.
    pub const ACK: u8 = 0x05;
    /// Configuration input messages.
    pub const CFG: u8 = 0x06;
    /// Monitoring messages.
    pub const MON: u8 = 0x0A;
    /// Timing messages.
    pub const TIM: u8 = 0x0D;
}

/// Message id constants, grouped by class.
pub mod ids {
    pub const NAV_POSLLH: u8 = 0x02;
    pub const NAV_STATUS: u8 = 0x03;
    pub const NAV_PVT: u8 = 0x07;

    pub const ACK_NAK: u8 = 0x00;
    pub const ACK_ACK: u8 = 0x01;

    pub const CFG_PRT: u8 = 0x00;
    pub const CFG_MSG: u8 = 0x01;
    pub const CFG_RATE: u8 = 0x08;

    pub const INF_ERROR: u8 = 0x00;
    pub const INF_WARNING: u8 = 0x01;
    pub const INF_NOTICE: u8 = 0x02;
    pub const INF_TEST: u8 = 0x03;
    pub const INF_DEBUG: u8 = 0x04;

    pub const MON_VER: u8 = 0x04;
}

/// Decoded header from wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Header {
    /// Message class.
    pub class: u8,
    /// Message id within the class.
    pub id: u8,
    /// Payload length in bytes.
    pub payload_length: u16,
}

impl Header {
    /// Create a new header.
    pub fn new(class: u8, id: u8, payload_length: u16) -> Self {
        Self {
            class,
            id,
            payload_length,
        }
    }

    /// Encode header to bytes (Little Endian length).
    ///
    /// # Example
    ///
    /// ```
    /// use ubx_framing::protocol::Header;
    ///
    /// let header = Header::new(0x06, 0x08, 6);
    /// assert_eq!(header.encode(), [0x06, 0x08, 0x06, 0x00]);
    /// ```
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let len = self.payload_length.to_le_bytes();
        [self.class, self.id, len[0], len[1]]
    }

    /// Decode header from bytes starting at the class byte.
    ///
    /// Returns `None` if buffer is too short.
    ///
    /// # Example
    ///
    /// ```
    /// use ubx_framing::protocol::Header;
    ///
    /// let header = Header::decode(&[0x01, 0x02, 0x1C, 0x00]).unwrap();
    /// assert_eq!(header.class, 0x01);
    /// assert_eq!(header.id, 0x02);
    /// assert_eq!(header.payload_length, 28);
    /// ```
    pub fn decode(buf: &[u8]) -> Option<Self> {
        match buf {
            [class, id, lo, hi, ..] => Some(Self {
                class: *class,
                id: *id,
                payload_length: u16::from_le_bytes([*lo, *hi]),
            }),
            _ => None,
        }
    }

    /// Bytes this frame occupies after the sync marker
    /// (header + payload + checksum).
    #[inline]
    pub fn body_size(&self) -> usize {
        HEADER_SIZE + self.payload_length as usize + super::CHECKSUM_SIZE
    }

    /// Bytes this frame occupies on the wire, sync marker included.
    #[inline]
    pub fn frame_size(&self) -> usize {
        SYNC_SIZE + self.body_size()
    }

    /// Human-readable message name, if known.
    #[inline]
    pub fn name(&self) -> Option<&'static str> {
        message_name(self.class, self.id)
    }
}

/// Check whether `buf` starts with the sync marker.
#[inline]
pub fn is_sync(buf: &[u8]) -> bool {
    buf.starts_with(&SYNC)
}

/// Name a message by class and id, e.g. `NAV-POSLLH`.
pub fn message_name(class: u8, id: u8) -> Option<&'static str> {
    use classes::*;
    use ids::*;

    let name = match (class, id) {
        (NAV, NAV_POSLLH) => "NAV-POSLLH",
        (NAV, NAV_STATUS) => "NAV-STATUS",
        (NAV, NAV_PVT) => "NAV-PVT",
        (ACK, ACK_NAK) => "ACK-NAK",
        (ACK, ACK_ACK) => "ACK-ACK",
        (CFG, CFG_PRT) => "CFG-PRT",
        (CFG, CFG_MSG) => "CFG-MSG",
        (CFG, CFG_RATE) => "CFG-RATE",
        (INF, INF_ERROR) => "INF-ERROR",
        (INF, INF_WARNING) => "INF-WARNING",
        (INF, INF_NOTICE) => "INF-NOTICE",
        (INF, INF_TEST) => "INF-TEST",
        (INF, INF_DEBUG) => "INF-DEBUG",
        (MON, MON_VER) => "MON-VER",
        _ => return None,
    };
    Some(name)
}
