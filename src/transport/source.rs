//! Byte sources feeding the frame readers.
//!
//! - Anything implementing `std::io::Read` (a UART tty, a capture file)
//! - [`DdcPort`]: the receiver's DDC (I2C) interface, polled through a
//!   [`RegisterBus`]
//!
//! The bus itself (i2c-dev ioctls, a bridge chip, a simulator) is supplied by
//! the caller.

use std::io;

use tracing::trace;

/// Default 7-bit I2C address of u-blox receivers.
pub const DEFAULT_DDC_ADDRESS: u8 = 0x42;

/// High byte of the bytes-available counter; the low byte follows at 0xFE.
pub const REG_BYTES_AVAILABLE: u8 = 0xFD;

/// Data stream register. Reads return 0xFF once the stream is drained.
pub const REG_DATA_STREAM: u8 = 0xFF;

/// Default cap on bytes fetched by one DDC read.
pub const DEFAULT_MAX_DDC_READ: usize = 256;

/// A synchronous source of raw bytes.
pub trait ByteSource {
    /// Read up to `buf.len()` bytes, returning how many were read.
    ///
    /// `Ok(0)` means nothing is available right now; for streams that can end
    /// (files, pipes) it means the end was reached.
    fn read_bytes(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

impl<R: io::Read> ByteSource for R {
    fn read_bytes(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read(buf)
    }
}

/// Register-level access to an I2C device.
pub trait RegisterBus {
    /// Set the register pointer to `register` and read `buf.len()` bytes.
    fn read_register(&mut self, register: u8, buf: &mut [u8]) -> io::Result<()>;

    /// Plain write with no register pointer.
    fn write(&mut self, data: &[u8]) -> io::Result<()>;
}

impl<B: RegisterBus + ?Sized> RegisterBus for &mut B {
    fn read_register(&mut self, register: u8, buf: &mut [u8]) -> io::Result<()> {
        (**self).read_register(register, buf)
    }

    fn write(&mut self, data: &[u8]) -> io::Result<()> {
        (**self).write(data)
    }
}

/// The receiver's DDC port.
///
/// Each read first asks the receiver how many bytes are pending, then pulls
/// at most that many from the data stream register, so the bus never reads
/// the 0xFF filler the receiver sends once drained.
pub struct DdcPort<B> {
    bus: B,
    max_read: usize,
}

impl<B: RegisterBus> DdcPort<B> {
    pub fn new(bus: B) -> Self {
        Self::with_max_read(bus, DEFAULT_MAX_DDC_READ)
    }

    /// Cap how many bytes a single read transfers.
    pub fn with_max_read(bus: B, max_read: usize) -> Self {
        Self {
            bus,
            max_read: max_read.max(1),
        }
    }

    /// Bytes the receiver has queued for us.
    pub fn bytes_available(&mut self) -> io::Result<usize> {
        let mut count = [0u8; 2];
        self.bus.read_register(REG_BYTES_AVAILABLE, &mut count)?;
        Ok(usize::from(u16::from_be_bytes(count)))
    }

    /// Send an encoded frame to the receiver.
    pub fn send(&mut self, frame: &[u8]) -> io::Result<()> {
        self.bus.write(frame)
    }

    pub fn get_ref(&self) -> &B {
        &self.bus
    }

    pub fn into_inner(self) -> B {
        self.bus
    }
}

impl<B: RegisterBus> ByteSource for DdcPort<B> {
    fn read_bytes(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let available = self.bytes_available()?;
        let n = available.min(buf.len()).min(self.max_read);
        if n == 0 {
            return Ok(0);
        }
        self.bus.read_register(REG_DATA_STREAM, &mut buf[..n])?;
        trace!("DDC read {} of {} pending bytes", n, available);
        Ok(n)
    }
}
