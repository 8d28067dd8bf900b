//! Scan Dump - print every frame and NMEA sentence in a capture file.
//!
//! This example demonstrates:
//! - Loading a `ScanConfig` from JSON
//! - Scanning a raw receiver capture in one pass
//! - Dissecting the result into JSON lines on stdout
//!
//! # Running
//!
//! ```text
//! cargo run --example scan_dump -- capture.ubx '{"text_capture": true}'
//! ```
//!
//! Without a capture path a small built-in capture is scanned.

use ubx_framing::messages::CfgRate;
use ubx_framing::protocol::{build_frame, build_poll, classes, ids};
use ubx_framing::{dissect, JsonLinesSink, ScanConfig, Scanner};

fn sample_capture() -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let mut buf = b"$GNTXT,01,01,02,u-blox AG - www.u-blox.com*4E\r\n".to_vec();
    buf.extend_from_slice(&build_poll(classes::MON, ids::MON_VER));
    buf.extend(
        CfgRate {
            meas_rate: 1000,
            nav_rate: 1,
            time_ref: 1,
        }
        .to_frame()?,
    );
    buf.extend(build_frame(classes::ACK, ids::ACK_ACK, &[classes::CFG, ids::CFG_RATE])?);
    Ok(buf)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);

    let buf = match args.next() {
        Some(path) => std::fs::read(path)?,
        None => sample_capture()?,
    };
    let config = match args.next() {
        Some(json) => ScanConfig::from_json(&json)?,
        None => ScanConfig::new().text_capture(true),
    };

    let report = Scanner::new(config).scan(&buf);
    let mut sink = JsonLinesSink::stdout();
    dissect(&buf, &report, &mut sink)?;

    eprintln!(
        "{} frames, {} text runs, {} bad frames{}",
        report.frames,
        report.text_runs,
        report.bad_frames,
        if report.capacity_reached {
            " (capacity reached)"
        } else {
            ""
        }
    );
    Ok(())
}
