//! Error types for ubx-framing.

use thiserror::Error;

use crate::protocol::Checksum;

/// Main error type for all ubx-framing operations.
#[derive(Debug, Error)]
pub enum UbxError {
    /// I/O error from the byte source or the report sink.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error (config and reports).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Protocol error (bad frame, unexpected message, etc.).
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// A payload did not have the size its record layout requires.
    #[error("{message} payload must be {expected} bytes, got {actual}")]
    PayloadLength {
        /// Message name, e.g. `NAV-POSLLH`.
        message: &'static str,
        /// Required size (minimum size for variable-length records).
        expected: usize,
        /// Size actually received.
        actual: usize,
    },

    /// Payload does not fit the 16-bit length field.
    #[error("Payload of {0} bytes exceeds the 65535 byte frame limit")]
    PayloadTooLarge(usize),
}

/// Why a frame window failed validation.
///
/// This is a closed set: a window is either too short to judge yet, or it is
/// complete and its checksum does not match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FrameError {
    /// The window does not hold a whole frame yet.
    #[error("Incomplete frame: need {needed} bytes, have {available}")]
    Incomplete {
        /// Bytes the frame needs, counted from the class byte.
        needed: usize,
        /// Bytes present in the window.
        available: usize,
    },

    /// The frame is complete but its checksum is wrong.
    #[error("Checksum mismatch: computed {expected}, frame carries {found}")]
    ChecksumMismatch {
        /// Checksum computed over class, id, length and payload.
        expected: Checksum,
        /// Checksum bytes carried by the frame.
        found: Checksum,
    },
}

impl FrameError {
    /// True when waiting for more bytes could still produce a valid frame.
    #[inline]
    pub fn is_incomplete(&self) -> bool {
        matches!(self, FrameError::Incomplete { .. })
    }
}

impl From<FrameError> for UbxError {
    fn from(err: FrameError) -> Self {
        UbxError::Protocol(err.to_string())
    }
}

/// Result type alias using UbxError.
pub type Result<T> = std::result::Result<T, UbxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_error_display() {
        let err = FrameError::Incomplete {
            needed: 10,
            available: 4,
        };
        assert_eq!(err.to_string(), "Incomplete frame: need 10 bytes, have 4");
        assert!(err.is_incomplete());

        let err = FrameError::ChecksumMismatch {
            expected: Checksum::new(0x06, 0x18),
            found: Checksum::new(0x00, 0x00),
        };
        assert_eq!(
            err.to_string(),
            "Checksum mismatch: computed 06 18, frame carries 00 00"
        );
        assert!(!err.is_incomplete());
    }

    #[test]
    fn test_frame_error_into_ubx_error() {
        let err: UbxError = FrameError::Incomplete {
            needed: 8,
            available: 2,
        }
        .into();
        assert!(matches!(err, UbxError::Protocol(_)));
        assert!(err.to_string().contains("need 8 bytes"));
    }

    #[test]
    fn test_payload_length_display() {
        let err = UbxError::PayloadLength {
            message: "NAV-POSLLH",
            expected: 28,
            actual: 3,
        };
        assert_eq!(
            err.to_string(),
            "NAV-POSLLH payload must be 28 bytes, got 3"
        );
    }
}
