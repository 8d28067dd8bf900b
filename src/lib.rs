//! # ubx-framing
//!
//! Link layer for the u-blox UBX binary protocol.
//!
//! This crate finds, validates and builds UBX frames in byte streams coming
//! from a GNSS receiver, whether over a UART, USB or the DDC (I2C) port.
//!
//! ## Architecture
//!
//! - **Scanner**: one pass over a fixed buffer, reporting where each valid
//!   payload (and optionally each run of NMEA text) lives
//! - **Frame buffer**: incremental framing for bytes arriving in chunks
//! - **Messages**: fixed record layouts for common payloads
//!
//! ## Example
//!
//! ```
//! use ubx_framing::protocol::{build_poll, classes, ids};
//! use ubx_framing::{Fragment, Scanner};
//!
//! let mut buf = vec![0x00, 0x42];
//! buf.extend_from_slice(&build_poll(classes::MON, ids::MON_VER));
//!
//! let report = Scanner::default().scan(&buf);
//! assert_eq!(report.fragments, vec![Fragment::Protocol { offset: 8, length: 0 }]);
//! ```

pub mod error;
pub mod messages;
pub mod protocol;
pub mod report;
pub mod scanner;
pub mod transport;

pub use error::{FrameError, Result, UbxError};
pub use messages::Message;
pub use protocol::{build_frame, build_poll, checksum, validate_frame, Checksum, Frame, FrameBuffer};
pub use report::{dissect, JsonLinesSink, ReportSink};
pub use scanner::{scan_payloads, Fragment, ScanConfig, ScanReport, Scanner};
pub use transport::{AsyncFrameReader, ByteSource, DdcPort, FrameReader, RegisterBus};
