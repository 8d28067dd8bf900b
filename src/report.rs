//! Dissection of scan results.
//!
//! [`dissect`] walks a [`ScanReport`] in buffer order, decodes every protocol
//! fragment into a [`Message`] and hands messages, text runs and decode
//! failures to a [`ReportSink`].
//!
//! [`JsonLinesSink`] writes one JSON object per line:
//!
//! ```text
//! {"offset":6,"message":"ACK-ACK","data":{"type":"AckAck","class_id":6,"msg_id":0}}
//! {"offset":10,"text":"$GNTXT,01*00\r\n"}
//! {"offset":30,"error":"NAV-POSLLH payload must be 28 bytes, got 4"}
//! ```

use std::io::Write;

use serde::Serialize;
use serde_json::json;

use crate::error::{Result, UbxError};
use crate::messages::Message;
use crate::scanner::{Fragment, ScanReport};

/// Consumer of dissected fragments.
///
/// Offsets are payload offsets in the scanned buffer for messages, and run
/// offsets for text.
pub trait ReportSink {
    fn on_message(&mut self, offset: usize, message: &Message) -> Result<()>;

    fn on_text(&mut self, offset: usize, text: &str) -> Result<()>;

    /// A protocol fragment that could not be decoded. Default: ignored.
    fn on_error(&mut self, offset: usize, error: &UbxError) -> Result<()> {
        let _ = (offset, error);
        Ok(())
    }
}

/// Feed every fragment of `report` to `sink`.
///
/// `buf` must be the buffer `report` was produced from. Decode failures go to
/// `on_error` and do not stop the walk; sink errors do.
pub fn dissect<S: ReportSink + ?Sized>(buf: &[u8], report: &ScanReport, sink: &mut S) -> Result<()> {
    for fragment in &report.fragments {
        let offset = fragment.offset();
        let bytes = fragment.slice(buf).ok_or_else(|| {
            UbxError::Protocol(format!(
                "Fragment {}..{} outside {} byte buffer",
                offset,
                offset + fragment.len(),
                buf.len()
            ))
        })?;

        match fragment {
            Fragment::Protocol { .. } => {
                let header = fragment.header(buf).ok_or_else(|| {
                    UbxError::Protocol(format!("No frame header before offset {}", offset))
                })?;
                match Message::decode(&header, bytes) {
                    Ok(message) => sink.on_message(offset, &message)?,
                    Err(err) => sink.on_error(offset, &err)?,
                }
            }
            Fragment::Text { .. } => {
                sink.on_text(offset, &String::from_utf8_lossy(bytes))?;
            }
        }
    }
    Ok(())
}

/// Write a JSON value as a single line.
///
/// Writes the serialized value followed by a single `\n` and flushes.
pub fn write_json_line<W: Write, T: Serialize>(writer: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer(&mut *writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Sink writing one JSON object per fragment.
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Get the underlying writer back.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl JsonLinesSink<std::io::Stdout> {
    /// Sink writing to stdout.
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> ReportSink for JsonLinesSink<W> {
    fn on_message(&mut self, offset: usize, message: &Message) -> Result<()> {
        let line = json!({
            "offset": offset,
            "message": message.name(),
            "data": message,
        });
        write_json_line(&mut self.writer, &line)
    }

    fn on_text(&mut self, offset: usize, text: &str) -> Result<()> {
        write_json_line(&mut self.writer, &json!({ "offset": offset, "text": text }))
    }

    fn on_error(&mut self, offset: usize, error: &UbxError) -> Result<()> {
        write_json_line(
            &mut self.writer,
            &json!({ "offset": offset, "error": error.to_string() }),
        )
    }
}
