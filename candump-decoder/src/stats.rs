//! Stream aggregation of per-frame decode outcomes
//!
//! One [`AggregateStats`] value is threaded through a decode session and
//! updated once per frame. There is no ambient state: partitioned decoding
//! builds one accumulator per partition and merges them in frame order.

use crate::types::{CanFrame, DecodeError, DecodeResult, LengthAdjustment};
use serde::Serialize;
use std::collections::HashMap;

/// Cap on the number of decode errors kept in the accumulator.
///
/// Errors beyond the cap are counted but silently dropped from the list.
pub const MAX_RECORDED_ERRORS: usize = 30;

/// Per-identifier counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IdentifierStats {
    /// Frames seen with this identifier
    pub seen: u64,
    /// Frames fully decoded
    pub decoded: u64,
    /// Frames whose payload length was adjusted
    pub corrected: u64,
}

/// Running statistics over a stream of decode outcomes
#[derive(Debug, Clone, Default, Serialize)]
pub struct AggregateStats {
    /// All frames fed to the decoder, including unknown identifiers
    pub total_frames: u64,
    /// Frames that decoded fully
    pub decoded_frames: u64,
    /// Sum of signal counts over decoded frames
    pub total_signals_decoded: u64,
    /// Counters per identifier, created on first sight
    pub per_identifier: HashMap<u32, IdentifierStats>,
    /// Every length adjustment, in frame order
    pub length_adjustments: Vec<LengthAdjustment>,
    /// The first [`MAX_RECORDED_ERRORS`] decode errors, in frame order
    pub errors: Vec<DecodeError>,
}

impl AggregateStats {
    /// Create an empty accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one frame's decode outcome into the statistics
    pub fn record(&mut self, frame: &CanFrame, result: &DecodeResult) {
        self.total_frames += 1;

        let bucket = self.per_identifier.entry(frame.can_id).or_default();
        bucket.seen += 1;
        match result {
            DecodeResult::Unknown => {}
            DecodeResult::Decoded { adjustment, .. } => {
                bucket.decoded += 1;
                if adjustment.is_some() {
                    bucket.corrected += 1;
                }
            }
            DecodeResult::Failed { adjustment, .. } => {
                if adjustment.is_some() {
                    bucket.corrected += 1;
                }
            }
        }

        match result {
            DecodeResult::Unknown => {}
            DecodeResult::Decoded { signals, adjustment } => {
                self.decoded_frames += 1;
                self.total_signals_decoded += signals.len() as u64;
                if let Some(adjustment) = adjustment {
                    self.length_adjustments.push(adjustment.clone());
                }
            }
            DecodeResult::Failed { error, adjustment } => {
                if let Some(adjustment) = adjustment {
                    self.length_adjustments.push(adjustment.clone());
                }
                if self.errors.len() < MAX_RECORDED_ERRORS {
                    self.errors.push(error.clone());
                }
            }
        }
    }

    /// Merge statistics accumulated over a later partition of the frame
    /// stream into this one.
    ///
    /// Partitions must be merged in original frame order for the
    /// adjustment and error lists to stay in encounter order.
    pub fn merge(&mut self, other: AggregateStats) {
        self.total_frames += other.total_frames;
        self.decoded_frames += other.decoded_frames;
        self.total_signals_decoded += other.total_signals_decoded;

        for (id, bucket) in other.per_identifier {
            let entry = self.per_identifier.entry(id).or_default();
            entry.seen += bucket.seen;
            entry.decoded += bucket.decoded;
            entry.corrected += bucket.corrected;
        }

        self.length_adjustments.extend(other.length_adjustments);

        let room = MAX_RECORDED_ERRORS.saturating_sub(self.errors.len());
        self.errors.extend(other.errors.into_iter().take(room));
    }

    /// All identifiers seen so far, sorted
    pub fn identifiers(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.per_identifier.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}
