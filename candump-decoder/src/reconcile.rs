//! Payload length reconciliation
//!
//! Logged frames regularly disagree with their layout's declared length:
//! candump truncates trailing zero bytes on some adapters, and gateways
//! repad frames. Before extraction the payload is adjusted to the layout's
//! expected length, keeping the original bytes as evidence.

use crate::types::{CanFrame, LengthAdjustment};

/// Adjust a frame's payload to the expected length.
///
/// Shorter payloads are right-padded with zero bytes, longer ones truncated.
/// Returns the adjusted payload and, when the length changed, a record
/// carrying both the original and the adjusted byte sequences. Pure; never
/// fails.
pub fn reconcile(frame: &CanFrame, expected_length: usize) -> (Vec<u8>, Option<LengthAdjustment>) {
    let actual_length = frame.data.len();
    if actual_length == expected_length {
        return (frame.data.clone(), None);
    }

    let mut adjusted = frame.data.clone();
    if actual_length < expected_length {
        adjusted.resize(expected_length, 0);
    } else {
        adjusted.truncate(expected_length);
    }

    let adjustment = LengthAdjustment {
        timestamp: frame.timestamp,
        can_id: frame.can_id,
        original_length: actual_length,
        adjusted_length: expected_length,
        original: frame.data.clone(),
        adjusted: adjusted.clone(),
    };

    (adjusted, Some(adjustment))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(data: Vec<u8>) -> CanFrame {
        CanFrame {
            timestamp: 1.0,
            can_id: 0x123,
            data,
        }
    }

    #[test]
    fn test_matching_length_is_untouched() {
        for len in 0..=8 {
            let payload: Vec<u8> = (0..len as u8).collect();
            let (adjusted, adjustment) = reconcile(&frame(payload.clone()), len);
            assert_eq!(adjusted, payload);
            assert!(adjustment.is_none());
        }
    }

    #[test]
    fn test_short_payload_is_zero_padded() {
        let (adjusted, adjustment) = reconcile(&frame(vec![0xAA, 0xBB, 0xCC, 0xDD]), 8);
        assert_eq!(adjusted, vec![0xAA, 0xBB, 0xCC, 0xDD, 0, 0, 0, 0]);

        let adjustment = adjustment.unwrap();
        assert_eq!(adjustment.original_length, 4);
        assert_eq!(adjustment.adjusted_length, 8);
        assert_eq!(adjustment.original, vec![0xAA, 0xBB, 0xCC, 0xDD]);
        assert_eq!(adjustment.adjusted, adjusted);
    }

    #[test]
    fn test_long_payload_is_truncated() {
        let (adjusted, adjustment) = reconcile(&frame(vec![1, 2, 3, 4, 5, 6]), 4);
        assert_eq!(adjusted, vec![1, 2, 3, 4]);

        let adjustment = adjustment.unwrap();
        assert_eq!(adjustment.original_length, 6);
        assert_eq!(adjustment.adjusted_length, 4);
        assert_eq!(adjustment.original, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(adjustment.adjusted, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_empty_payload_pads_to_expected() {
        let (adjusted, adjustment) = reconcile(&frame(vec![]), 3);
        assert_eq!(adjusted, vec![0, 0, 0]);
        assert_eq!(adjustment.unwrap().original_length, 0);
    }

    #[test]
    fn test_zero_expected_length_truncates_to_empty() {
        let (adjusted, adjustment) = reconcile(&frame(vec![0xFF]), 0);
        assert!(adjusted.is_empty());
        assert_eq!(adjustment.unwrap().adjusted_length, 0);
    }

    #[test]
    fn test_adjustment_carries_frame_identity() {
        let input = CanFrame {
            timestamp: 1234567890.234567,
            can_id: 0x2B4,
            data: vec![0xAA],
        };
        let (_, adjustment) = reconcile(&input, 8);
        let adjustment = adjustment.unwrap();
        assert_eq!(adjustment.can_id, 0x2B4);
        assert_eq!(adjustment.timestamp, 1234567890.234567);
    }
}
