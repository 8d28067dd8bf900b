//! Transport module - getting receiver bytes into a frame buffer.
//!
//! Provides abstraction over:
//! - Blocking byte sources (`std::io::Read`, the DDC register interface)
//! - Async readers (`tokio::io::AsyncRead`)

mod reader;
mod source;

pub use reader::{AsyncFrameReader, FrameReader, DEFAULT_CHUNK_SIZE, DEFAULT_READER_MAX_PAYLOAD};
pub use source::{
    ByteSource, DdcPort, RegisterBus, DEFAULT_DDC_ADDRESS, DEFAULT_MAX_DDC_READ,
    REG_BYTES_AVAILABLE, REG_DATA_STREAM,
};
