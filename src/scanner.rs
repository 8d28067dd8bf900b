//! Single-pass frame scanner over a fixed buffer.
//!
//! The scanner walks a buffer left to right looking for the sync marker,
//! validates each candidate frame and records where its payload lives. It
//! keeps no state between calls: every scan starts hunting from byte 0.
//!
//! Receivers often interleave UBX with NMEA text on the same port. With
//! `text_capture` enabled, runs of printable ASCII between frames are
//! reported too, as [`Fragment::Text`], in the same ordered list.
//!
//! A corrupted sync marker hides its frame, and a run of noise that happens
//! to contain `0xB5 0x62` followed by a matching checksum is reported as a
//! frame. Both are accepted limits of a single pass without backtracking.
//!
//! # Example
//!
//! ```
//! use ubx_framing::protocol::build_frame;
//! use ubx_framing::scanner::{Fragment, ScanConfig, Scanner};
//!
//! let mut buf = b"$GNTXT,01*00\r\n".to_vec();
//! buf.extend(build_frame(0x05, 0x01, &[0x06, 0x00]).unwrap());
//!
//! let scanner = Scanner::new(ScanConfig::new().text_capture(true));
//! let report = scanner.scan(&buf);
//!
//! assert_eq!(report.frames, 1);
//! assert_eq!(
//!     report.fragments,
//!     vec![
//!         Fragment::Text { offset: 0, length: 14 },
//!         Fragment::Protocol { offset: 20, length: 2 },
//!     ]
//! );
//! ```

use std::ops::Range;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::Result;
use crate::protocol::{is_sync, message_name, validate_frame, Header, HEADER_SIZE, SYNC_SIZE};

/// Default cap on protocol fragments per scan.
pub const DEFAULT_MAX_FRAGMENTS: usize = 64;

/// Default cap on text fragments per scan.
pub const DEFAULT_MAX_TEXT_FRAGMENTS: usize = 16;

/// Default shortest text run worth reporting.
pub const DEFAULT_MIN_TEXT_LEN: usize = 4;

/// A region of interest in a scanned buffer.
///
/// Fragments never own data. They index into the buffer they were produced
/// from and are meaningless against any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Fragment {
    /// Payload of a checksum-valid frame.
    Protocol { offset: usize, length: usize },
    /// Run of printable ASCII outside any frame.
    Text { offset: usize, length: usize },
}

impl Fragment {
    #[inline]
    pub fn offset(&self) -> usize {
        match *self {
            Fragment::Protocol { offset, .. } | Fragment::Text { offset, .. } => offset,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        match *self {
            Fragment::Protocol { length, .. } | Fragment::Text { length, .. } => length,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Byte range in the scanned buffer; `None` if it overflows `usize`.
    #[inline]
    pub fn range(&self) -> Option<Range<usize>> {
        let end = self.offset().checked_add(self.len())?;
        Some(self.offset()..end)
    }

    #[inline]
    pub fn is_protocol(&self) -> bool {
        matches!(self, Fragment::Protocol { .. })
    }

    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self, Fragment::Text { .. })
    }

    /// The bytes this fragment covers in `buf`.
    ///
    /// Returns `None` if the fragment does not fit `buf`.
    #[inline]
    pub fn slice<'a>(&self, buf: &'a [u8]) -> Option<&'a [u8]> {
        buf.get(self.range()?)
    }

    /// Header of the frame a protocol fragment was taken from.
    ///
    /// Returns `None` for text fragments or if `buf` is not the scanned buffer.
    pub fn header(&self, buf: &[u8]) -> Option<Header> {
        match *self {
            Fragment::Protocol { offset, .. } => {
                let start = offset.checked_sub(HEADER_SIZE)?;
                Header::decode(buf.get(start..offset)?)
            }
            Fragment::Text { .. } => None,
        }
    }
}

/// Scanner settings.
///
/// Deserializes from JSON with every field optional:
///
/// ```
/// use ubx_framing::scanner::ScanConfig;
///
/// let config = ScanConfig::from_json(r#"{ "max_fragments": 8, "text_capture": true }"#).unwrap();
/// assert_eq!(config.max_fragments, 8);
/// assert!(config.text_capture);
/// assert_eq!(config.min_text_len, 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Stop after this many valid frames.
    pub max_fragments: usize,
    /// Report printable ASCII runs between frames.
    pub text_capture: bool,
    /// Shorter text runs are skipped silently.
    pub min_text_len: usize,
    /// Text runs past this count are skipped silently.
    pub max_text_fragments: usize,
    /// Emit a `trace!` event for every frame found.
    pub trace_frames: bool,
}

impl ScanConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set the protocol fragment capacity.
    ///
    /// Default: 64
    pub fn max_fragments(mut self, limit: usize) -> Self {
        self.max_fragments = limit;
        self
    }

    /// Enable or disable text capture.
    ///
    /// Default: disabled
    pub fn text_capture(mut self, enabled: bool) -> Self {
        self.text_capture = enabled;
        self
    }

    /// Default: 4
    pub fn min_text_len(mut self, len: usize) -> Self {
        self.min_text_len = len;
        self
    }

    /// Default: 16
    pub fn max_text_fragments(mut self, limit: usize) -> Self {
        self.max_text_fragments = limit;
        self
    }

    /// Default: disabled
    pub fn trace_frames(mut self, enabled: bool) -> Self {
        self.trace_frames = enabled;
        self
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_fragments: DEFAULT_MAX_FRAGMENTS,
            text_capture: false,
            min_text_len: DEFAULT_MIN_TEXT_LEN,
            max_text_fragments: DEFAULT_MAX_TEXT_FRAGMENTS,
            trace_frames: false,
        }
    }
}

/// Result of one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    /// Protocol and text fragments in buffer order.
    pub fragments: Vec<Fragment>,
    /// Valid frames found. Text runs are not counted.
    pub frames: usize,
    /// Text fragments recorded.
    pub text_runs: usize,
    /// Sync markers that did not lead to a valid frame, either because the
    /// checksum failed or because the buffer ended first.
    pub bad_frames: usize,
    /// The scan stopped early on `max_fragments`.
    pub capacity_reached: bool,
    /// Offset where the cursor stopped.
    pub end: usize,
}

impl ScanReport {
    pub fn protocol_fragments(&self) -> impl Iterator<Item = &Fragment> + '_ {
        self.fragments.iter().filter(|f| f.is_protocol())
    }

    pub fn text_fragments(&self) -> impl Iterator<Item = &Fragment> + '_ {
        self.fragments.iter().filter(|f| f.is_text())
    }
}

/// Stateless frame scanner.
#[derive(Debug, Clone, Default)]
pub struct Scanner {
    config: ScanConfig,
}

impl Scanner {
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Scan `buf` for frames (and text runs, if enabled).
    ///
    /// Never fails: malformed input only shows up in `bad_frames`.
    pub fn scan(&self, buf: &[u8]) -> ScanReport {
        let config = &self.config;
        let mut report = ScanReport::default();

        if config.max_fragments == 0 {
            report.capacity_reached = true;
            return report;
        }

        let mut i = 0;
        while i + SYNC_SIZE < buf.len() {
            if is_sync(&buf[i..]) {
                i += SYNC_SIZE;
                match validate_frame(&buf[i..]) {
                    Ok(valid) => {
                        let fragment = Fragment::Protocol {
                            offset: i + valid.payload_offset,
                            length: valid.payload_length,
                        };
                        if config.trace_frames {
                            trace!(
                                "{} ({:02x}/{:02x}) at {}, {} byte payload",
                                message_name(valid.header.class, valid.header.id)
                                    .unwrap_or("UBX-?"),
                                valid.header.class,
                                valid.header.id,
                                i - SYNC_SIZE,
                                valid.payload_length
                            );
                        }
                        report.fragments.push(fragment);
                        report.frames += 1;
                        i += valid.consumed;

                        if report.frames >= config.max_fragments {
                            report.capacity_reached = true;
                            break;
                        }
                    }
                    Err(err) => {
                        report.bad_frames += 1;
                        debug!("Bad frame at {}: {}", i - SYNC_SIZE, err);
                    }
                }
                continue;
            }

            if config.text_capture && is_text_byte(buf[i]) {
                let run = buf[i..].iter().take_while(|&&b| is_text_byte(b)).count();
                if run >= config.min_text_len && report.text_runs < config.max_text_fragments {
                    report.fragments.push(Fragment::Text {
                        offset: i,
                        length: run,
                    });
                    report.text_runs += 1;
                }
                i += run;
                continue;
            }

            i += 1;
        }

        report.end = i;
        report
    }
}

/// Scan `buf` with default settings and a custom frame capacity.
pub fn scan_payloads(buf: &[u8], max_fragments: usize) -> ScanReport {
    Scanner::new(ScanConfig::new().max_fragments(max_fragments)).scan(buf)
}

/// Printable ASCII plus the whitespace NMEA sentences use.
#[inline]
fn is_text_byte(b: u8) -> bool {
    b.is_ascii_graphic() || matches!(b, b' ' | b'\r' | b'\n' | b'\t')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{build_frame, classes, ids};

    fn frame(class: u8, id: u8, payload: &[u8]) -> Vec<u8> {
        build_frame(class, id, payload).unwrap()
    }

    fn assert_fragments_in_bounds(report: &ScanReport, buf: &[u8]) {
        for fragment in &report.fragments {
            assert!(fragment.offset() + fragment.len() <= buf.len());
            assert!(fragment.slice(buf).is_some());
        }
    }

    #[test]
    fn test_empty_and_short_buffers() {
        for len in 0..=3 {
            let report = scan_payloads(&[0xB5, 0x62, 0x01][..len], 8);
            assert_eq!(report.frames, 0);
            assert!(report.fragments.is_empty());
        }
    }

    #[test]
    fn test_three_back_to_back_frames() {
        let mut buf = Vec::new();
        buf.extend(frame(classes::NAV, ids::NAV_POSLLH, &[0x11; 28]));
        buf.extend(frame(classes::ACK, ids::ACK_ACK, &[0x06, 0x08]));
        buf.extend(frame(classes::MON, ids::MON_VER, b""));

        let report = scan_payloads(&buf, 8);

        assert_eq!(report.frames, 3);
        assert_eq!(report.bad_frames, 0);
        assert!(!report.capacity_reached);
        assert_eq!(report.end, buf.len());
        assert_eq!(
            report.fragments,
            vec![
                Fragment::Protocol {
                    offset: 6,
                    length: 28
                },
                Fragment::Protocol {
                    offset: 36 + 6,
                    length: 2
                },
                Fragment::Protocol {
                    offset: 36 + 10 + 6,
                    length: 0
                },
            ]
        );
        assert_eq!(report.fragments[0].slice(&buf), Some(&[0x11; 28][..]));
        assert_eq!(report.fragments[1].slice(&buf), Some(&[0x06, 0x08][..]));
    }

    #[test]
    fn test_resync_across_garbage() {
        let garbage_a = [0x00, 0xFF, 0x13, 0xB5, 0x00, 0x62, 0x7F];
        let garbage_b = [0x62, 0xB5, 0xB5, 0x01, 0x99];

        let mut buf = garbage_a.to_vec();
        buf.extend(frame(classes::ACK, ids::ACK_ACK, &[0x06, 0x00]));
        buf.extend_from_slice(&garbage_b);
        buf.extend(frame(classes::ACK, ids::ACK_NAK, &[0x06, 0x01]));
        buf.extend_from_slice(&garbage_a);

        let report = scan_payloads(&buf, 8);

        assert_eq!(report.frames, 2);
        let first = 7 + 6;
        let second = 7 + 10 + 5 + 6;
        assert_eq!(
            report.fragments,
            vec![
                Fragment::Protocol {
                    offset: first,
                    length: 2
                },
                Fragment::Protocol {
                    offset: second,
                    length: 2
                },
            ]
        );
        assert_eq!(report.fragments[1].slice(&buf), Some(&[0x06, 0x01][..]));
        assert_fragments_in_bounds(&report, &buf);
    }

    #[test]
    fn test_capacity_bound() {
        let mut buf = Vec::new();
        for n in 0..10u8 {
            buf.extend(frame(classes::NAV, ids::NAV_STATUS, &[n; 16]));
        }

        let report = scan_payloads(&buf, 3);

        assert_eq!(report.frames, 3);
        assert_eq!(report.fragments.len(), 3);
        assert!(report.capacity_reached);
        assert_eq!(report.end, 3 * 24);
        assert_eq!(report.fragments[2].slice(&buf), Some(&[2u8; 16][..]));
    }

    #[test]
    fn test_zero_capacity_scans_nothing() {
        let buf = frame(classes::ACK, ids::ACK_ACK, &[0x06, 0x00]);
        let report = scan_payloads(&buf, 0);
        assert_eq!(report.frames, 0);
        assert!(report.capacity_reached);
    }

    #[test]
    fn test_bad_checksum_counted_and_skipped() {
        let mut bad = frame(classes::ACK, ids::ACK_ACK, &[0x06, 0x00]);
        bad[6] ^= 0x01;
        let mut buf = bad;
        buf.extend(frame(classes::ACK, ids::ACK_ACK, &[0x06, 0x01]));

        let report = scan_payloads(&buf, 8);

        assert_eq!(report.frames, 1);
        assert_eq!(report.bad_frames, 1);
        assert_eq!(
            report.fragments,
            vec![Fragment::Protocol {
                offset: 10 + 6,
                length: 2
            }]
        );
    }

    #[test]
    fn test_truncated_final_frame_is_bad() {
        let mut buf = frame(classes::ACK, ids::ACK_ACK, &[0x06, 0x00]);
        let full = frame(classes::NAV, ids::NAV_POSLLH, &[0x22; 28]);
        buf.extend_from_slice(&full[..20]);

        let report = scan_payloads(&buf, 8);

        assert_eq!(report.frames, 1);
        assert_eq!(report.bad_frames, 1);
        assert_fragments_in_bounds(&report, &buf);
    }

    #[test]
    fn test_every_truncation_is_safe() {
        let full = frame(classes::NAV, ids::NAV_POSLLH, &[0x22; 28]);
        for len in 0..full.len() {
            let report = scan_payloads(&full[..len], 8);
            assert_eq!(report.frames, 0, "truncation to {} bytes", len);
            assert!(report.end <= len);
        }
        assert_eq!(scan_payloads(&full, 8).frames, 1);
    }

    #[test]
    fn test_decoy_sync_with_matching_checksum_is_accepted() {
        // Noise that happens to form a valid empty frame is indistinguishable
        // from a real one.
        let decoy = frame(0x00, 0x00, b"");
        let mut buf = vec![0x01, 0x02];
        buf.extend_from_slice(&decoy);

        let report = scan_payloads(&buf, 8);
        assert_eq!(report.frames, 1);
        assert_eq!(
            report.fragments[0].header(&buf),
            Some(Header::new(0, 0, 0))
        );
    }

    #[test]
    fn test_text_capture_between_frames() {
        let mut buf = b"$GNGGA,123*4F\r\n".to_vec();
        buf.extend(frame(classes::ACK, ids::ACK_ACK, &[0x06, 0x00]));
        buf.extend_from_slice(b"$GNRMC\r\n");

        let report = Scanner::new(ScanConfig::new().text_capture(true)).scan(&buf);

        assert_eq!(report.frames, 1);
        assert_eq!(report.text_runs, 2);
        assert_eq!(
            report.fragments,
            vec![
                Fragment::Text {
                    offset: 0,
                    length: 15
                },
                Fragment::Protocol {
                    offset: 21,
                    length: 2
                },
                Fragment::Text {
                    offset: 25,
                    length: 8
                },
            ]
        );
        assert_eq!(report.fragments[2].slice(&buf), Some(&b"$GNRMC\r\n"[..]));
        assert_eq!(report.protocol_fragments().count(), 1);
        assert_eq!(report.text_fragments().count(), 2);
    }

    #[test]
    fn test_text_ignored_without_capture() {
        let mut buf = b"$GNGGA,123*4F\r\n".to_vec();
        buf.extend(frame(classes::ACK, ids::ACK_ACK, &[0x06, 0x00]));

        let report = scan_payloads(&buf, 8);
        assert_eq!(report.text_runs, 0);
        assert!(report.fragments.iter().all(Fragment::is_protocol));
    }

    #[test]
    fn test_short_text_runs_skipped() {
        let mut buf = vec![0x00, b'o', b'k', 0x00];
        buf.extend_from_slice(b"long enough");
        buf.push(0x00);

        let report = Scanner::new(ScanConfig::new().text_capture(true)).scan(&buf);
        assert_eq!(
            report.fragments,
            vec![Fragment::Text {
                offset: 4,
                length: 11
            }]
        );
    }

    #[test]
    fn test_text_capacity_does_not_stop_scan() {
        let mut buf = Vec::new();
        for _ in 0..3 {
            buf.extend_from_slice(b"TEXT");
            buf.push(0x00);
        }
        buf.extend(frame(classes::ACK, ids::ACK_ACK, &[0x06, 0x00]));

        let config = ScanConfig::new().text_capture(true).max_text_fragments(1);
        let report = Scanner::new(config).scan(&buf);

        assert_eq!(report.text_runs, 1);
        assert_eq!(report.frames, 1);
        assert_eq!(report.fragments.len(), 2);
    }

    #[test]
    fn test_fragment_header_lookup() {
        let buf = frame(classes::CFG, ids::CFG_RATE, &[0xE8, 0x03, 0x01, 0x00, 0x01, 0x00]);
        let report = scan_payloads(&buf, 1);

        let header = report.fragments[0].header(&buf).unwrap();
        assert_eq!(header, Header::new(classes::CFG, ids::CFG_RATE, 6));
        assert_eq!(Fragment::Text { offset: 0, length: 1 }.header(&buf), None);
        assert_eq!(Fragment::Protocol { offset: 2, length: 0 }.header(&buf), None);
    }

    #[test]
    fn test_fragment_accessors() {
        let fragment = Fragment::Protocol {
            offset: 6,
            length: 2,
        };
        assert_eq!(fragment.range(), Some(6..8));
        assert!(fragment.is_protocol());
        assert!(!fragment.is_text());
        assert!(!fragment.is_empty());
        assert_eq!(fragment.slice(&[0u8; 7]), None);
    }

    #[test]
    fn test_fragment_near_usize_max() {
        let fragment = Fragment::Text {
            offset: usize::MAX - 1,
            length: 4,
        };
        assert_eq!(fragment.range(), None);
        assert_eq!(fragment.slice(&[0u8; 16]), None);
        assert_eq!(fragment.header(&[0u8; 16]), None);
    }

    #[test]
    fn test_config_builder_and_json() {
        let config = ScanConfig::new()
            .max_fragments(3)
            .text_capture(true)
            .min_text_len(2)
            .max_text_fragments(5)
            .trace_frames(true);

        let json = serde_json::to_string(&config).unwrap();
        let parsed = ScanConfig::from_json(&json).unwrap();
        assert_eq!(parsed, config);

        assert_eq!(ScanConfig::from_json("{}").unwrap(), ScanConfig::default());
        assert!(ScanConfig::from_json("{ \"max_fragments\": -1 }").is_err());
    }

    #[test]
    fn test_fragment_serializes_tagged() {
        let json = serde_json::to_string(&Fragment::Text {
            offset: 1,
            length: 2,
        })
        .unwrap();
        assert_eq!(json, r#"{"kind":"text","offset":1,"length":2}"#);
    }
}
