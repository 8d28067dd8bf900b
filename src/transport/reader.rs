//! Frame readers: a byte source plus a [`FrameBuffer`].
//!
//! [`FrameReader`] is the blocking variant used for DDC polling and plain
//! `std::io::Read` sources. [`AsyncFrameReader`] drives any tokio
//! `AsyncRead` (serial port, socket, file) the same way.

use std::io;

use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::debug;

use super::source::ByteSource;
use crate::error::Result;
use crate::protocol::{BufferStats, Frame, FrameBuffer};

/// Default read chunk size.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Payload limit of the readers' default frame buffer. Larger length fields
/// are treated as noise.
pub const DEFAULT_READER_MAX_PAYLOAD: usize = 8 * 1024;

/// Blocking frame reader over a [`ByteSource`].
pub struct FrameReader<S> {
    source: S,
    buffer: FrameBuffer,
    chunk: Vec<u8>,
}

impl<S: ByteSource> FrameReader<S> {
    pub fn new(source: S) -> Self {
        Self::with_chunk_size(source, DEFAULT_CHUNK_SIZE)
    }

    /// Read at most `chunk_size` bytes per poll.
    pub fn with_chunk_size(source: S, chunk_size: usize) -> Self {
        Self::with_buffer(
            source,
            FrameBuffer::with_max_payload(DEFAULT_READER_MAX_PAYLOAD),
            chunk_size,
        )
    }

    /// Use a preconfigured frame buffer (e.g. a tighter payload limit).
    pub fn with_buffer(source: S, buffer: FrameBuffer, chunk_size: usize) -> Self {
        Self {
            source,
            buffer,
            chunk: vec![0u8; chunk_size.max(1)],
        }
    }

    /// Perform one read and return the frames it completed.
    ///
    /// An empty vector means either nothing was available or the bytes read
    /// did not finish a frame yet.
    pub fn poll(&mut self) -> Result<Vec<Frame>> {
        let n = self.read_chunk()?;
        Ok(self.buffer.push(&self.chunk[..n]))
    }

    /// Poll until the source returns no bytes, collecting every frame.
    ///
    /// The empty read is treated as end of input: a false start still waiting
    /// for its body is rejected and the bytes behind it are framed (see
    /// [`FrameBuffer::finish`]). For a DDC port this drains what the receiver
    /// has queued; for a file it reads to the end. Use [`poll`](Self::poll)
    /// to keep partial frames across reads.
    pub fn drain(&mut self) -> Result<Vec<Frame>> {
        let mut frames = Vec::new();
        loop {
            let n = self.read_chunk()?;
            if n == 0 {
                break;
            }
            frames.extend(self.buffer.push(&self.chunk[..n]));
        }
        let leftover = self.buffer.len();
        frames.extend(self.buffer.finish());
        if leftover > 0 {
            debug!("Flushed {} trailing bytes at end of input", leftover);
        }
        Ok(frames)
    }

    fn read_chunk(&mut self) -> Result<usize> {
        loop {
            match self.source.read_bytes(&mut self.chunk) {
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    pub fn stats(&self) -> BufferStats {
        self.buffer.stats()
    }

    /// Bytes held back waiting for more input.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    pub fn get_ref(&self) -> &S {
        &self.source
    }

    pub fn get_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn into_inner(self) -> S {
        self.source
    }
}

/// Frame reader over a tokio `AsyncRead`.
pub struct AsyncFrameReader<R> {
    reader: R,
    buffer: FrameBuffer,
    chunk: Vec<u8>,
}

impl<R: AsyncRead + Unpin> AsyncFrameReader<R> {
    pub fn new(reader: R) -> Self {
        Self::with_chunk_size(reader, DEFAULT_CHUNK_SIZE)
    }

    pub fn with_chunk_size(reader: R, chunk_size: usize) -> Self {
        Self::with_buffer(
            reader,
            FrameBuffer::with_max_payload(DEFAULT_READER_MAX_PAYLOAD),
            chunk_size,
        )
    }

    pub fn with_buffer(reader: R, buffer: FrameBuffer, chunk_size: usize) -> Self {
        Self {
            reader,
            buffer,
            chunk: vec![0u8; chunk_size.max(1)],
        }
    }

    /// Read until at least one frame completes.
    ///
    /// At end of stream the buffer is flushed (see [`FrameBuffer::finish`]);
    /// frames recovered that way come back as a final batch. Returns
    /// `Ok(None)` once nothing is left.
    pub async fn next_batch(&mut self) -> Result<Option<Vec<Frame>>> {
        loop {
            let n = self.reader.read(&mut self.chunk).await?;
            if n == 0 {
                if self.buffer.is_empty() {
                    return Ok(None);
                }
                debug!(
                    "End of stream with {} unframed bytes buffered",
                    self.buffer.len()
                );
                let frames = self.buffer.finish();
                return Ok((!frames.is_empty()).then_some(frames));
            }

            let frames = self.buffer.push(&self.chunk[..n]);
            if !frames.is_empty() {
                return Ok(Some(frames));
            }
        }
    }

    pub fn stats(&self) -> BufferStats {
        self.buffer.stats()
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}
