//! Protocol module - wire format, checksum, validation and framing.
//!
//! This module implements the UBX link layer:
//! - 4-byte header encoding/decoding behind the `0xB5 0x62` sync marker
//! - 8-bit Fletcher checksum
//! - Frame validation with an `Incomplete` / `ChecksumMismatch` split
//! - Frame buffer for accumulating partial reads
//! - Frame struct and frame builders

mod checksum;
mod frame;
mod frame_buffer;
mod validator;
mod wire_format;

pub use checksum::{checksum, Checksum, CHECKSUM_SIZE};
pub use frame::{build_frame, build_poll, Frame};
pub use frame_buffer::{BufferStats, FrameBuffer, DEFAULT_BUFFER_CAPACITY};
pub use validator::{validate_frame, ValidFrame, MIN_BODY_SIZE};
pub use wire_format::{
    classes, ids, is_sync, message_name, Header, FRAME_OVERHEAD, HEADER_SIZE, MAX_PAYLOAD_SIZE,
    SYNC, SYNC_CHAR_1, SYNC_CHAR_2, SYNC_SIZE,
};
