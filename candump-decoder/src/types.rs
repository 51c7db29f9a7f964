//! Core types for the candump decoder library
//!
//! This module defines the frame record consumed by the decoder, the decode
//! outcomes it emits, and the diagnostic records (length adjustments, decode
//! errors) that accumulate over a decode session.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Result type for decoder operations
pub type Result<T> = std::result::Result<T, DecoderError>;

/// Raw CAN frame from a candump text log
///
/// A single frame as read from the log, before any length reconciliation
/// or signal decoding.
#[derive(Debug, Clone, PartialEq)]
pub struct CanFrame {
    /// Timestamp in seconds since epoch, as candump prints it
    pub timestamp: f64,
    /// CAN message ID (11-bit or 29-bit)
    pub can_id: u32,
    /// Frame data bytes (conventionally 0-8 for classic CAN)
    pub data: Vec<u8>,
}

impl CanFrame {
    /// Convert the epoch-seconds timestamp to a DateTime<Utc>
    pub fn datetime(&self) -> DateTime<Utc> {
        let secs = self.timestamp.trunc() as i64;
        let nsecs = (self.timestamp.fract() * 1e9) as u32;
        DateTime::from_timestamp(secs, nsecs).unwrap_or_else(Utc::now)
    }

    /// Number of data bytes actually carried by the frame
    pub fn dlc(&self) -> usize {
        self.data.len()
    }
}

/// Errors that can occur during decoding
#[derive(Debug, thiserror::Error)]
pub enum DecoderError {
    #[error("Failed to parse log file: {0}")]
    LogParseError(String),

    #[error("Failed to parse DBC file: {0}")]
    DbcParseError(String),

    #[error("Invalid signal definition: {0}")]
    InvalidSignalDefinition(String),

    #[error("signal '{name}' needs {required} bytes but payload has {available}")]
    SignalOutOfRange {
        name: String,
        required: usize,
        available: usize,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Record of a payload that was padded or truncated to the layout's
/// expected length before extraction
///
/// Carries the full before/after byte sequences as evidence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LengthAdjustment {
    /// Timestamp of the adjusted frame (epoch seconds)
    pub timestamp: f64,
    /// CAN message ID
    pub can_id: u32,
    /// Payload length as it appeared in the log
    pub original_length: usize,
    /// Expected length from the message layout
    pub adjusted_length: usize,
    /// Payload bytes as they appeared in the log
    pub original: Vec<u8>,
    /// Payload bytes after padding or truncation
    pub adjusted: Vec<u8>,
}

/// Record of a frame that failed signal extraction
///
/// A per-frame fault captured as data. Faults never abort a decode session;
/// the aggregator keeps the first [`crate::stats::MAX_RECORDED_ERRORS`] of
/// them and the caller decides what to surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodeError {
    /// Timestamp of the failing frame (epoch seconds)
    pub timestamp: f64,
    /// CAN message ID
    pub can_id: u32,
    /// Human-readable cause
    pub message: String,
}

/// Outcome of decoding a single frame
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeResult {
    /// The frame's identifier has no layout. Expected traffic, not a fault.
    Unknown,

    /// Every signal extracted successfully.
    Decoded {
        signals: Vec<DecodedSignal>,
        adjustment: Option<LengthAdjustment>,
    },

    /// At least one signal failed extraction. The whole frame is reported
    /// failed; the adjustment, if any, is still reported since it is
    /// independent of the extraction outcome.
    Failed {
        error: DecodeError,
        adjustment: Option<LengthAdjustment>,
    },
}

impl DecodeResult {
    /// True if the frame decoded fully
    pub fn is_decoded(&self) -> bool {
        matches!(self, DecodeResult::Decoded { .. })
    }

    /// Decoded signals, if the frame decoded fully
    pub fn signals(&self) -> Option<&[DecodedSignal]> {
        match self {
            DecodeResult::Decoded { signals, .. } => Some(signals),
            _ => None,
        }
    }

    /// The length adjustment attached to this outcome, if any
    pub fn adjustment(&self) -> Option<&LengthAdjustment> {
        match self {
            DecodeResult::Decoded { adjustment, .. } => adjustment.as_ref(),
            DecodeResult::Failed { adjustment, .. } => adjustment.as_ref(),
            DecodeResult::Unknown => None,
        }
    }
}

/// A decoded signal with its physical value
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedSignal {
    /// Signal name from the layout
    pub name: String,
    /// Decoded value after scaling and label lookup
    pub value: SignalValue,
    /// Engineering unit (e.g., "km/h", "V")
    pub unit: Option<String>,
}

/// Signal value variants emitted by the decoder
#[derive(Debug, Clone, PartialEq)]
pub enum SignalValue {
    /// Integer value (unscaled signals)
    Integer(i64),
    /// Floating-point value (after scaling/offset, or float-coded signals)
    Float(f64),
    /// Symbolic label from the layout's value table
    Label(String),
}

impl fmt::Display for SignalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalValue::Integer(v) => write!(f, "{}", v),
            SignalValue::Float(v) => write!(f, "{}", v),
            SignalValue::Label(v) => write!(f, "{}", v),
        }
    }
}

impl SignalValue {
    /// Numeric view of the value; None for labels
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SignalValue::Integer(v) => Some(*v as f64),
            SignalValue::Float(v) => Some(*v),
            SignalValue::Label(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_value_conversions() {
        assert_eq!(SignalValue::Integer(42).as_f64(), Some(42.0));
        assert_eq!(SignalValue::Float(3.14).as_f64(), Some(3.14));
        assert_eq!(SignalValue::Label("Off".to_string()).as_f64(), None);
    }

    #[test]
    fn test_signal_value_display() {
        assert_eq!(format!("{}", SignalValue::Integer(42)), "42");
        assert_eq!(format!("{}", SignalValue::Float(-30.0)), "-30");
        assert_eq!(format!("{}", SignalValue::Float(0.5)), "0.5");
        assert_eq!(format!("{}", SignalValue::Label("On".to_string())), "On");
    }

    #[test]
    fn test_frame_datetime() {
        let frame = CanFrame {
            timestamp: 1234567890.5,
            can_id: 0x2B4,
            data: vec![],
        };
        let dt = frame.datetime();
        assert_eq!(dt.timestamp(), 1234567890);
        assert_eq!(dt.timestamp_subsec_millis(), 500);
    }

    #[test]
    fn test_decode_result_accessors() {
        let decoded = DecodeResult::Decoded {
            signals: vec![],
            adjustment: None,
        };
        assert!(decoded.is_decoded());
        assert!(decoded.adjustment().is_none());
        assert!(!DecodeResult::Unknown.is_decoded());
        assert!(DecodeResult::Unknown.signals().is_none());
    }
}
