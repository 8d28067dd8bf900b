//! DDC Poll - talk to a receiver over its I2C (DDC) port.
//!
//! This example demonstrates:
//! - Implementing `RegisterBus` for an I2C backend
//! - Sending a poll and a configuration frame through `DdcPort`
//! - Reading the replies with `FrameReader` and decoding them
//!
//! The bus here is a simulated receiver that answers MON-VER polls and
//! acknowledges CFG messages. On real hardware, implement `RegisterBus` on top
//! of the platform's I2C device at address `DEFAULT_DDC_ADDRESS`.

use std::collections::VecDeque;
use std::io;

use ubx_framing::messages::{proto, CfgPrt, MonVer};
use ubx_framing::protocol::{build_frame, build_poll, classes, ids, FrameBuffer};
use ubx_framing::transport::{REG_BYTES_AVAILABLE, REG_DATA_STREAM};
use ubx_framing::{DdcPort, FrameReader, Message, RegisterBus, Scanner};

/// Simulated receiver behind the DDC registers.
#[derive(Default)]
struct SimulatedReceiver {
    outbound: VecDeque<u8>,
}

impl SimulatedReceiver {
    fn queue(&mut self, frame: &[u8]) {
        self.outbound.extend(frame.iter().copied());
    }

    fn mon_ver() -> io::Result<Vec<u8>> {
        let mut payload = vec![0u8; MonVer::MIN_SIZE + MonVer::EXTENSION_LEN];
        payload[..8].copy_from_slice(b"ROM CORE");
        payload[30..38].copy_from_slice(b"00080000");
        payload[40..50].copy_from_slice(b"PROTVER=18");
        build_frame(classes::MON, ids::MON_VER, &payload)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))
    }
}

impl RegisterBus for SimulatedReceiver {
    fn read_register(&mut self, register: u8, buf: &mut [u8]) -> io::Result<()> {
        match register {
            REG_BYTES_AVAILABLE => {
                let count = (self.outbound.len().min(usize::from(u16::MAX)) as u16).to_be_bytes();
                let n = buf.len().min(2);
                buf[..n].copy_from_slice(&count[..n]);
            }
            REG_DATA_STREAM => {
                for b in buf.iter_mut() {
                    *b = self.outbound.pop_front().unwrap_or(0xFF);
                }
            }
            other => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("register {:#04x} not simulated", other),
                ))
            }
        }
        Ok(())
    }

    fn write(&mut self, data: &[u8]) -> io::Result<()> {
        // Answer every complete frame the host writes.
        for fragment in Scanner::default().scan(data).fragments {
            let Some(header) = fragment.header(data) else {
                continue;
            };
            match header.class {
                classes::MON if header.id == ids::MON_VER => self.queue(&Self::mon_ver()?),
                classes::CFG => {
                    let ack = build_frame(classes::ACK, ids::ACK_ACK, &[header.class, header.id])
                        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
                    self.queue(&ack);
                }
                _ => {}
            }
        }
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let port = DdcPort::new(SimulatedReceiver::default());
    // Nothing this receiver sends is longer; larger length fields are noise.
    let mut reader = FrameReader::with_buffer(port, FrameBuffer::with_max_payload(1024), 64);

    reader.get_mut().send(&build_poll(classes::MON, ids::MON_VER))?;
    reader
        .get_mut()
        .send(&CfgPrt::ddc(0x42, proto::UBX, proto::UBX).to_frame()?)?;

    for frame in reader.drain()? {
        match Message::decode(&frame.header, frame.payload())? {
            Message::MonVer(ver) => {
                println!("software {} hardware {}", ver.sw_version, ver.hw_version);
                for ext in ver.extensions {
                    println!("  {}", ext);
                }
            }
            Message::AckAck(ack) => {
                println!("acknowledged {:02x}/{:02x}", ack.class_id, ack.msg_id);
            }
            other => println!("{:?}", other),
        }
    }

    let stats = reader.stats();
    println!("{} frames, {} dropped", stats.frames, stats.bad_frames);
    Ok(())
}
