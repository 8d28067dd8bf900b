//! Frame buffer for accumulating partial reads.
//!
//! Uses `bytes::BytesMut` for zero-copy buffer management.
//! Implements a state machine for handling fragmented frames arriving from a
//! serial line or DDC poll:
//! - `Hunting`: Looking for the sync marker and a complete header
//! - `WaitingForBody`: Header parsed, need the payload and checksum
//!
//! Bytes that cannot start a frame are dropped. A frame whose checksum does
//! not match (or whose length field exceeds the configured limit) is dropped
//! by skipping its sync marker, and hunting resumes right after it.
//!
//! # Example
//!
//! ```
//! use ubx_framing::protocol::{build_frame, FrameBuffer};
//!
//! let bytes = build_frame(0x05, 0x01, &[0x06, 0x00]).unwrap();
//! let mut buffer = FrameBuffer::new();
//!
//! // Data arrives in chunks from the receiver
//! assert!(buffer.push(&bytes[..3]).is_empty());
//! let frames = buffer.push(&bytes[3..]);
//!
//! assert_eq!(frames.len(), 1);
//! assert_eq!(frames[0].name(), Some("ACK-ACK"));
//! ```

use bytes::BytesMut;
use tracing::{debug, warn};

use super::validator::validate_frame;
use super::wire_format::{Header, HEADER_SIZE, MAX_PAYLOAD_SIZE, SYNC, SYNC_CHAR_1, SYNC_SIZE};
use super::Frame;

/// Default buffer capacity.
pub const DEFAULT_BUFFER_CAPACITY: usize = 4 * 1024;

/// State machine for frame parsing.
#[derive(Debug, Clone)]
enum State {
    /// Looking for a sync marker followed by a complete header.
    Hunting,
    /// Header parsed, waiting for payload and checksum bytes.
    WaitingForBody { header: Header },
}

/// Running counters for a [`FrameBuffer`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BufferStats {
    /// Valid frames extracted.
    pub frames: u64,
    /// Frames dropped for a bad checksum or an oversized length field.
    pub bad_frames: u64,
    /// Bytes dropped without producing a frame.
    pub discarded_bytes: u64,
}

/// Buffer for accumulating incoming bytes and extracting complete frames.
///
/// Uses a state machine to handle partial reads efficiently.
/// All data is stored in a single `BytesMut` buffer to minimize allocations.
pub struct FrameBuffer {
    /// Accumulated bytes from the byte source.
    buffer: BytesMut,
    /// Current parsing state.
    state: State,
    /// Largest payload accepted; longer length fields are treated as noise.
    max_payload_size: usize,
    stats: BufferStats,
}

impl FrameBuffer {
    /// Create a new frame buffer with default settings.
    ///
    /// Default capacity: 4KB, max payload: 65535 (any length field).
    pub fn new() -> Self {
        Self::with_capacity_and_max_payload(DEFAULT_BUFFER_CAPACITY, MAX_PAYLOAD_SIZE)
    }

    /// Create a new frame buffer with custom max payload size.
    ///
    /// Receivers only emit payloads up to a few hundred bytes, so a tighter
    /// limit lets the buffer give up on noise-generated length fields sooner.
    pub fn with_max_payload(max_payload_size: usize) -> Self {
        Self::with_capacity_and_max_payload(DEFAULT_BUFFER_CAPACITY, max_payload_size)
    }

    /// Create a new frame buffer with custom capacity and max payload.
    pub fn with_capacity_and_max_payload(capacity: usize, max_payload_size: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(capacity),
            state: State::Hunting,
            max_payload_size: max_payload_size.min(MAX_PAYLOAD_SIZE),
            stats: BufferStats::default(),
        }
    }

    /// Push data into the buffer and extract all complete frames.
    ///
    /// Returns the frames completed by this push, in arrival order (may be
    /// empty if still waiting for data). Partial data is kept for the next
    /// push.
    pub fn push(&mut self, data: &[u8]) -> Vec<Frame> {
        self.buffer.extend_from_slice(data);

        let mut frames = Vec::new();
        while let Some(frame) = self.try_extract_one() {
            frames.push(frame);
        }
        frames
    }

    /// Try to extract a single frame from the buffer.
    ///
    /// Returns `None` if more data is needed.
    fn try_extract_one(&mut self) -> Option<Frame> {
        loop {
            match &self.state {
                State::Hunting => {
                    if !self.align_to_sync() {
                        return None;
                    }

                    // Peek, don't consume yet
                    let header = Header::decode(&self.buffer[SYNC_SIZE..])?;

                    if header.payload_length as usize > self.max_payload_size {
                        warn!(
                            "Length field {} exceeds maximum {}, resyncing",
                            header.payload_length, self.max_payload_size
                        );
                        self.reject_sync();
                        continue;
                    }

                    self.state = State::WaitingForBody { header };
                }

                State::WaitingForBody { header } => {
                    let header = *header;
                    let frame_size = header.frame_size();
                    if self.buffer.len() < frame_size {
                        return None;
                    }

                    match validate_frame(&self.buffer[SYNC_SIZE..frame_size]) {
                        Ok(valid) => {
                            let mut raw = self.buffer.split_to(frame_size);
                            let _ = raw.split_to(SYNC_SIZE + HEADER_SIZE);
                            raw.truncate(valid.payload_length);

                            self.state = State::Hunting;
                            self.stats.frames += 1;
                            return Some(Frame::new(header, raw.freeze()));
                        }
                        Err(err) => {
                            debug!(
                                "Dropping {:02x}/{:02x} frame: {}",
                                header.class, header.id, err
                            );
                            self.reject_sync();
                        }
                    }
                }
            }
        }
    }

    /// Flush the buffer at end of input.
    ///
    /// A sync marker still waiting for its body can never complete, so it is
    /// rejected and the bytes behind it are hunted again. Returns the frames
    /// recovered that way; anything left that cannot form a frame is dropped.
    pub fn finish(&mut self) -> Vec<Frame> {
        let mut frames = Vec::new();
        loop {
            while let Some(frame) = self.try_extract_one() {
                frames.push(frame);
            }
            match self.state {
                State::WaitingForBody { header } => {
                    debug!(
                        "Input ended inside {:02x}/{:02x} frame announcing {} bytes, resyncing",
                        header.class, header.id, header.payload_length
                    );
                    self.reject_sync();
                }
                State::Hunting => break,
            }
        }
        let rest = self.buffer.len();
        self.discard(rest);
        frames
    }

    /// Drop bytes up to the next sync marker.
    ///
    /// Returns `false` if no marker is buffered. A trailing first sync byte is
    /// kept since its partner may arrive with the next push.
    fn align_to_sync(&mut self) -> bool {
        match self.buffer.windows(SYNC_SIZE).position(|w| w == SYNC) {
            Some(pos) => {
                self.discard(pos);
                true
            }
            None => {
                let keep = usize::from(self.buffer.last() == Some(&SYNC_CHAR_1));
                self.discard(self.buffer.len() - keep);
                false
            }
        }
    }

    /// Skip the sync marker at the head of the buffer and resume hunting.
    fn reject_sync(&mut self) {
        self.stats.bad_frames += 1;
        self.discard(SYNC_SIZE);
        self.state = State::Hunting;
    }

    fn discard(&mut self, count: usize) {
        if count > 0 {
            let _ = self.buffer.split_to(count);
            self.stats.discarded_bytes += count as u64;
        }
    }

    /// Get the number of buffered bytes.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Counters accumulated since creation or the last `clear()`.
    pub fn stats(&self) -> BufferStats {
        self.stats
    }

    /// Clear the buffer, counters and state.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.state = State::Hunting;
        self.stats = BufferStats::default();
    }

    /// Get the current state for debugging.
    #[cfg(test)]
    fn state_name(&self) -> &'static str {
        match &self.state {
            State::Hunting => "Hunting",
            State::WaitingForBody { .. } => "WaitingForBody",
        }
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{build_frame, classes, ids};

    fn ack(msg_id: u8) -> Vec<u8> {
        build_frame(classes::ACK, ids::ACK_ACK, &[classes::CFG, msg_id]).unwrap()
    }

    #[test]
    fn test_single_complete_frame() {
        let mut buffer = FrameBuffer::new();
        let frames = buffer.push(&build_frame(0x01, 0x02, b"hello").unwrap());

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].class(), 0x01);
        assert_eq!(frames[0].id(), 0x02);
        assert_eq!(frames[0].payload(), b"hello");
        assert!(buffer.is_empty());
        assert_eq!(buffer.stats().frames, 1);
    }

    #[test]
    fn test_multiple_frames_in_one_push() {
        let mut buffer = FrameBuffer::new();

        let mut combined = Vec::new();
        combined.extend_from_slice(&ack(0x00));
        combined.extend_from_slice(&ack(0x01));
        combined.extend_from_slice(&ack(0x08));

        let frames = buffer.push(&combined);

        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].payload(), &[0x06, 0x00]);
        assert_eq!(frames[1].payload(), &[0x06, 0x01]);
        assert_eq!(frames[2].payload(), &[0x06, 0x08]);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_fragmented_header() {
        let mut buffer = FrameBuffer::new();
        let frame_bytes = build_frame(0x01, 0x02, b"test").unwrap();

        assert!(buffer.push(&frame_bytes[..4]).is_empty());
        assert_eq!(buffer.state_name(), "Hunting");
        assert_eq!(buffer.len(), 4);

        let frames = buffer.push(&frame_bytes[4..]);
        assert_eq!(frames.len(), 1);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_fragmented_payload() {
        let mut buffer = FrameBuffer::new();
        let payload = b"this is a longer payload that will be fragmented";
        let frame_bytes = build_frame(0x01, 0x02, payload).unwrap();

        let partial_len = SYNC_SIZE + HEADER_SIZE + 10;
        assert!(buffer.push(&frame_bytes[..partial_len]).is_empty());
        assert_eq!(buffer.state_name(), "WaitingForBody");

        let frames = buffer.push(&frame_bytes[partial_len..]);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].payload(), payload);
    }

    #[test]
    fn test_empty_payload() {
        let mut buffer = FrameBuffer::new();
        let frames = buffer.push(&build_frame(0x0A, 0x04, b"").unwrap());

        assert_eq!(frames.len(), 1);
        assert!(frames[0].payload().is_empty());
        assert_eq!(frames[0].header.payload_length, 0);
    }

    #[test]
    fn test_leading_garbage_is_discarded() {
        let mut buffer = FrameBuffer::new();
        let mut data = b"$GPGGA,,,*66\r\n".to_vec();
        data.extend_from_slice(&ack(0x00));

        let frames = buffer.push(&data);
        assert_eq!(frames.len(), 1);
        assert_eq!(buffer.stats().discarded_bytes, 14);
        assert_eq!(buffer.stats().bad_frames, 0);
    }

    #[test]
    fn test_trailing_first_sync_byte_is_kept() {
        let mut buffer = FrameBuffer::new();
        let frame_bytes = ack(0x00);

        let mut first = vec![0x00, 0x11, 0x22];
        first.push(frame_bytes[0]);
        assert!(buffer.push(&first).is_empty());
        assert_eq!(buffer.len(), 1);

        let frames = buffer.push(&frame_bytes[1..]);
        assert_eq!(frames.len(), 1);
        assert_eq!(buffer.stats().discarded_bytes, 3);
    }

    #[test]
    fn test_bad_checksum_resyncs_to_next_frame() {
        let mut buffer = FrameBuffer::new();
        let mut corrupted = ack(0x00);
        let last = corrupted.len() - 1;
        corrupted[last] ^= 0xFF;

        let mut data = corrupted;
        data.extend_from_slice(&ack(0x01));

        let frames = buffer.push(&data);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].payload(), &[0x06, 0x01]);
        assert_eq!(buffer.stats().bad_frames, 1);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_frame_hidden_inside_false_start_is_found() {
        // A sync marker whose length field swallows a real frame.
        let mut data = vec![0xB5, 0x62, 0x01, 0x02, 0x0A, 0x00];
        data.extend_from_slice(&ack(0x00));
        data.extend_from_slice(&[0x00; 4]);

        let mut buffer = FrameBuffer::new();
        let frames = buffer.push(&data);

        assert_eq!(frames.len(), 1);
        assert!(frames[0].is(classes::ACK, ids::ACK_ACK));
        assert_eq!(buffer.stats().bad_frames, 1);
    }

    #[test]
    fn test_finish_recovers_frames_behind_long_false_start() {
        // Announces 300 bytes; only three ACKs follow before input ends.
        let mut data = vec![0xB5, 0x62, 0x01, 0x02, 0x2C, 0x01];
        for msg_id in [0x00, 0x01, 0x08] {
            data.extend_from_slice(&ack(msg_id));
        }

        let mut buffer = FrameBuffer::new();
        assert!(buffer.push(&data).is_empty());
        assert_eq!(buffer.state_name(), "WaitingForBody");

        let frames = buffer.finish();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[2].payload(), &[0x06, 0x08]);
        assert!(buffer.is_empty());
        assert_eq!(buffer.state_name(), "Hunting");
        assert_eq!(buffer.stats().bad_frames, 1);
        assert_eq!(buffer.stats().discarded_bytes, 6);
    }

    #[test]
    fn test_finish_drops_truncated_tail() {
        let frame = ack(0x00);
        let mut data = ack(0x01);
        data.extend_from_slice(&frame[..7]);

        let mut buffer = FrameBuffer::new();
        assert_eq!(buffer.push(&data).len(), 1);
        assert!(buffer.finish().is_empty());
        assert!(buffer.is_empty());
        assert_eq!(buffer.stats().bad_frames, 1);
        assert_eq!(buffer.stats().discarded_bytes, 7);
    }

    #[test]
    fn test_max_payload_rejects_noise_length() {
        let mut buffer = FrameBuffer::with_max_payload(100);

        let mut data = vec![0xB5, 0x62, 0x01, 0x02, 0xE8, 0x03];
        data.extend_from_slice(&ack(0x00));

        let frames = buffer.push(&data);
        assert_eq!(frames.len(), 1);
        assert_eq!(buffer.stats().bad_frames, 1);
    }

    #[test]
    fn test_clear_resets_state() {
        let mut buffer = FrameBuffer::new();
        let frame_bytes = build_frame(0x01, 0x02, b"test").unwrap();

        buffer.push(&frame_bytes[..SYNC_SIZE + HEADER_SIZE]);
        assert_eq!(buffer.state_name(), "WaitingForBody");

        buffer.clear();

        assert_eq!(buffer.state_name(), "Hunting");
        assert!(buffer.is_empty());
        assert_eq!(buffer.stats(), BufferStats::default());
    }

    #[test]
    fn test_mixed_complete_and_partial() {
        let mut buffer = FrameBuffer::new();

        let frame1 = ack(0x00);
        let frame2 = ack(0x01);

        let mut data = frame1.clone();
        data.extend_from_slice(&frame2[..5]);

        let frames = buffer.push(&data);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].payload(), &[0x06, 0x00]);

        let frames = buffer.push(&frame2[5..]);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].payload(), &[0x06, 0x01]);
    }

    #[test]
    fn test_byte_at_a_time() {
        let mut buffer = FrameBuffer::new();
        let frame_bytes = build_frame(0x01, 0x02, b"hi").unwrap();

        let mut all_frames = Vec::new();
        for byte in &frame_bytes {
            all_frames.extend(buffer.push(&[*byte]));
        }

        assert_eq!(all_frames.len(), 1);
        assert_eq!(all_frames[0].payload(), b"hi");
        assert_eq!(buffer.stats().discarded_bytes, 0);
    }
}
