//! Payload records for a set of UBX messages.
//!
//! Each record is a plain struct with named fields and a `decode` from the
//! little-endian payload bytes. Records the host sends to the receiver also
//! carry an `encode` and a `to_frame` helper.
//!
//! ```
//! use ubx_framing::messages::CfgRate;
//!
//! let rate = CfgRate { meas_rate: 1000, nav_rate: 1, time_ref: 1 };
//! assert_eq!(rate.encode(), [0xE8, 0x03, 0x01, 0x00, 0x01, 0x00]);
//! assert_eq!(CfgRate::decode(&rate.encode()).unwrap(), rate);
//! ```

use serde::Serialize;

use crate::error::{Result, UbxError};
use crate::protocol::{build_frame, classes, ids, message_name, Header};

#[inline]
fn le_u16(buf: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([buf[at], buf[at + 1]])
}

#[inline]
fn le_u32(buf: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}

#[inline]
fn le_i32(buf: &[u8], at: usize) -> i32 {
    le_u32(buf, at) as i32
}

fn require_exact(message: &'static str, expected: usize, payload: &[u8]) -> Result<()> {
    if payload.len() != expected {
        return Err(UbxError::PayloadLength {
            message,
            expected,
            actual: payload.len(),
        });
    }
    Ok(())
}

/// Fixed-width, NUL-padded string field.
fn fixed_str(field: &[u8]) -> String {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end]).into_owned()
}

/// ACK-ACK / ACK-NAK payload: the message being acknowledged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Ack {
    pub class_id: u8,
    pub msg_id: u8,
}

impl Ack {
    pub const SIZE: usize = 2;

    pub fn decode(payload: &[u8]) -> Result<Self> {
        require_exact("ACK", Self::SIZE, payload)?;
        Ok(Self {
            class_id: payload[0],
            msg_id: payload[1],
        })
    }

    pub fn encode(&self) -> [u8; Self::SIZE] {
        [self.class_id, self.msg_id]
    }

    /// True if this acknowledges `class`/`id`.
    pub fn acknowledges(&self, class: u8, id: u8) -> bool {
        self.class_id == class && self.msg_id == id
    }
}

/// NAV-POSLLH: geodetic position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavPosllh {
    /// GPS time of week, ms.
    pub i_tow: u32,
    /// Longitude, 1e-7 deg.
    pub lon: i32,
    /// Latitude, 1e-7 deg.
    pub lat: i32,
    /// Height above ellipsoid, mm.
    pub height: i32,
    /// Height above mean sea level, mm.
    pub h_msl: i32,
    /// Horizontal accuracy estimate, mm.
    pub h_acc: u32,
    /// Vertical accuracy estimate, mm.
    pub v_acc: u32,
}

impl NavPosllh {
    pub const SIZE: usize = 28;

    pub fn decode(payload: &[u8]) -> Result<Self> {
        require_exact("NAV-POSLLH", Self::SIZE, payload)?;
        Ok(Self {
            i_tow: le_u32(payload, 0),
            lon: le_i32(payload, 4),
            lat: le_i32(payload, 8),
            height: le_i32(payload, 12),
            h_msl: le_i32(payload, 16),
            h_acc: le_u32(payload, 20),
            v_acc: le_u32(payload, 24),
        })
    }

    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        buf[0..4].copy_from_slice(&self.i_tow.to_le_bytes());
        buf[4..8].copy_from_slice(&self.lon.to_le_bytes());
        buf[8..12].copy_from_slice(&self.lat.to_le_bytes());
        buf[12..16].copy_from_slice(&self.height.to_le_bytes());
        buf[16..20].copy_from_slice(&self.h_msl.to_le_bytes());
        buf[20..24].copy_from_slice(&self.h_acc.to_le_bytes());
        buf[24..28].copy_from_slice(&self.v_acc.to_le_bytes());
        buf
    }

    pub fn lon_degrees(&self) -> f64 {
        f64::from(self.lon) * 1e-7
    }

    pub fn lat_degrees(&self) -> f64 {
        f64::from(self.lat) * 1e-7
    }
}

/// NAV-STATUS: fix type and receiver timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavStatus {
    pub i_tow: u32,
    /// 0 no fix, 1 dead reckoning, 2 2D, 3 3D, 4 GNSS + DR, 5 time only.
    pub gps_fix: u8,
    pub flags: u8,
    pub fix_stat: u8,
    pub flags2: u8,
    /// Time to first fix, ms.
    pub ttff: u32,
    /// Milliseconds since startup or reset.
    pub msss: u32,
}

impl NavStatus {
    pub const SIZE: usize = 16;

    /// `flags` bit 0: position and velocity valid.
    pub const FLAG_GPS_FIX_OK: u8 = 0x01;

    pub fn decode(payload: &[u8]) -> Result<Self> {
        require_exact("NAV-STATUS", Self::SIZE, payload)?;
        Ok(Self {
            i_tow: le_u32(payload, 0),
            gps_fix: payload[4],
            flags: payload[5],
            fix_stat: payload[6],
            flags2: payload[7],
            ttff: le_u32(payload, 8),
            msss: le_u32(payload, 12),
        })
    }

    pub fn gps_fix_ok(&self) -> bool {
        self.flags & Self::FLAG_GPS_FIX_OK != 0
    }
}

/// CFG-RATE: navigation measurement rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CfgRate {
    /// Measurement period, ms.
    pub meas_rate: u16,
    /// Measurements per navigation solution.
    pub nav_rate: u16,
    /// 0 UTC, 1 GPS time.
    pub time_ref: u16,
}

impl CfgRate {
    pub const SIZE: usize = 6;

    pub fn decode(payload: &[u8]) -> Result<Self> {
        require_exact("CFG-RATE", Self::SIZE, payload)?;
        Ok(Self {
            meas_rate: le_u16(payload, 0),
            nav_rate: le_u16(payload, 2),
            time_ref: le_u16(payload, 4),
        })
    }

    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        buf[0..2].copy_from_slice(&self.meas_rate.to_le_bytes());
        buf[2..4].copy_from_slice(&self.nav_rate.to_le_bytes());
        buf[4..6].copy_from_slice(&self.time_ref.to_le_bytes());
        buf
    }

    pub fn to_frame(&self) -> Result<Vec<u8>> {
        build_frame(classes::CFG, ids::CFG_RATE, &self.encode())
    }
}

/// Port ids used by CFG-PRT.
pub mod port {
    pub const DDC: u8 = 0;
    pub const UART1: u8 = 1;
    pub const USB: u8 = 3;
    pub const SPI: u8 = 4;
}

/// Protocol mask bits used by CFG-PRT.
pub mod proto {
    pub const UBX: u16 = 0x0001;
    pub const NMEA: u16 = 0x0002;
    pub const RTCM3: u16 = 0x0020;
}

/// CFG-PRT: port configuration.
///
/// `mode` is port specific: for DDC it carries the 7-bit slave address in
/// bits 7..1, for UART the character framing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CfgPrt {
    pub port_id: u8,
    pub tx_ready: u16,
    pub mode: u32,
    /// UART only; zero elsewhere.
    pub baud_rate: u32,
    pub in_proto_mask: u16,
    pub out_proto_mask: u16,
    pub flags: u16,
}

impl CfgPrt {
    pub const SIZE: usize = 20;

    /// DDC (I2C) port at `address` speaking the given protocols.
    pub fn ddc(address: u8, in_proto_mask: u16, out_proto_mask: u16) -> Self {
        Self {
            port_id: port::DDC,
            tx_ready: 0,
            mode: u32::from(address & 0x7F) << 1,
            baud_rate: 0,
            in_proto_mask,
            out_proto_mask,
            flags: 0,
        }
    }

    /// Slave address configured in a DDC `mode` field.
    pub fn ddc_address(&self) -> u8 {
        ((self.mode >> 1) & 0x7F) as u8
    }

    pub fn decode(payload: &[u8]) -> Result<Self> {
        require_exact("CFG-PRT", Self::SIZE, payload)?;
        Ok(Self {
            port_id: payload[0],
            tx_ready: le_u16(payload, 2),
            mode: le_u32(payload, 4),
            baud_rate: le_u32(payload, 8),
            in_proto_mask: le_u16(payload, 12),
            out_proto_mask: le_u16(payload, 14),
            flags: le_u16(payload, 16),
        })
    }

    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        buf[0] = self.port_id;
        buf[2..4].copy_from_slice(&self.tx_ready.to_le_bytes());
        buf[4..8].copy_from_slice(&self.mode.to_le_bytes());
        buf[8..12].copy_from_slice(&self.baud_rate.to_le_bytes());
        buf[12..14].copy_from_slice(&self.in_proto_mask.to_le_bytes());
        buf[14..16].copy_from_slice(&self.out_proto_mask.to_le_bytes());
        buf[16..18].copy_from_slice(&self.flags.to_le_bytes());
        buf
    }

    pub fn to_frame(&self) -> Result<Vec<u8>> {
        build_frame(classes::CFG, ids::CFG_PRT, &self.encode())
    }
}

/// MON-VER: software, hardware and extension version strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonVer {
    pub sw_version: String,
    pub hw_version: String,
    pub extensions: Vec<String>,
}

impl MonVer {
    pub const SW_VERSION_LEN: usize = 30;
    pub const HW_VERSION_LEN: usize = 10;
    pub const EXTENSION_LEN: usize = 30;
    pub const MIN_SIZE: usize = Self::SW_VERSION_LEN + Self::HW_VERSION_LEN;

    /// Trailing bytes short of a full extension field are ignored.
    pub fn decode(payload: &[u8]) -> Result<Self> {
        if payload.len() < Self::MIN_SIZE {
            return Err(UbxError::PayloadLength {
                message: "MON-VER",
                expected: Self::MIN_SIZE,
                actual: payload.len(),
            });
        }
        let (sw, rest) = payload.split_at(Self::SW_VERSION_LEN);
        let (hw, rest) = rest.split_at(Self::HW_VERSION_LEN);
        Ok(Self {
            sw_version: fixed_str(sw),
            hw_version: fixed_str(hw),
            extensions: rest
                .chunks_exact(Self::EXTENSION_LEN)
                .map(fixed_str)
                .collect(),
        })
    }
}

/// A decoded payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum Message {
    AckAck(Ack),
    AckNak(Ack),
    NavPosllh(NavPosllh),
    NavStatus(NavStatus),
    CfgRate(CfgRate),
    CfgPrt(CfgPrt),
    MonVer(MonVer),
    /// INF-ERROR, INF-WARNING, INF-NOTICE, INF-TEST or INF-DEBUG text.
    Inf { level: &'static str, text: String },
    /// Any message without a record type here.
    Unknown { class: u8, id: u8, length: usize },
}

impl Message {
    /// Decode `payload` according to `header`.
    ///
    /// # Errors
    ///
    /// Returns `PayloadLength` if a known message has the wrong size.
    /// Unknown messages never fail.
    pub fn decode(header: &Header, payload: &[u8]) -> Result<Self> {
        use classes::*;
        use ids::*;

        let message = match (header.class, header.id) {
            (ACK, ACK_ACK) => Message::AckAck(Ack::decode(payload)?),
            (ACK, ACK_NAK) => Message::AckNak(Ack::decode(payload)?),
            (NAV, NAV_POSLLH) => Message::NavPosllh(NavPosllh::decode(payload)?),
            (NAV, NAV_STATUS) => Message::NavStatus(NavStatus::decode(payload)?),
            (CFG, CFG_RATE) => Message::CfgRate(CfgRate::decode(payload)?),
            (CFG, CFG_PRT) => Message::CfgPrt(CfgPrt::decode(payload)?),
            (MON, MON_VER) => Message::MonVer(MonVer::decode(payload)?),
            (INF, id) if id <= INF_DEBUG => Message::Inf {
                level: message_name(INF, id).unwrap_or("INF"),
                text: fixed_str(payload),
            },
            (class, id) => Message::Unknown {
                class,
                id,
                length: payload.len(),
            },
        };
        Ok(message)
    }

    /// Message name, e.g. `NAV-POSLLH`; `None` for unknown messages.
    pub fn name(&self) -> Option<&'static str> {
        let name = match self {
            Message::AckAck(_) => "ACK-ACK",
            Message::AckNak(_) => "ACK-NAK",
            Message::NavPosllh(_) => "NAV-POSLLH",
            Message::NavStatus(_) => "NAV-STATUS",
            Message::CfgRate(_) => "CFG-RATE",
            Message::CfgPrt(_) => "CFG-PRT",
            Message::MonVer(_) => "MON-VER",
            Message::Inf { level, .. } => *level,
            Message::Unknown { .. } => return None,
        };
        Some(name)
    }
}
