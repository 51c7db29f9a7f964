//! Main decoder API
//!
//! The [`Decoder`] owns the layout table and decodes frames one at a time.
//! It holds no other state: feeding it a stream of frames and folding the
//! outcomes into an [`crate::stats::AggregateStats`] is the caller's loop.

use crate::message_decoder::MessageDecoder;
use crate::signals::layout::{LayoutStats, LayoutTable};
use crate::types::{CanFrame, DecodeResult, Result};
use std::path::Path;

/// The decoding engine: a layout table plus the per-frame decode operation
pub struct Decoder {
    layout: LayoutTable,
}

impl Decoder {
    /// Create a decoder with an empty layout table
    pub fn new() -> Self {
        Self {
            layout: LayoutTable::new(),
        }
    }

    /// Create a decoder over an existing layout table
    pub fn with_layout(layout: LayoutTable) -> Self {
        Self { layout }
    }

    /// Load a DBC file and add its layouts to the table
    ///
    /// # Example
    /// ```no_run
    /// use candump_decoder::Decoder;
    /// use std::path::Path;
    ///
    /// let mut decoder = Decoder::new();
    /// decoder.add_dbc(Path::new("powertrain.dbc")).unwrap();
    /// ```
    pub fn add_dbc(&mut self, path: &Path) -> Result<()> {
        log::info!("Loading DBC file: {:?}", path);

        for message in crate::signals::dbc::parse_dbc_file(path)? {
            self.layout.insert(message);
        }

        log::info!("DBC file loaded successfully: {:?}", path);
        Ok(())
    }

    /// Decode a single frame against the layout table.
    ///
    /// Total over its inputs: an identifier without a layout yields
    /// [`DecodeResult::Unknown`], extraction faults yield
    /// [`DecodeResult::Failed`], and nothing escapes as an `Err`.
    pub fn decode_frame(&self, frame: &CanFrame) -> DecodeResult {
        match self.layout.get(frame.can_id) {
            Some(layout) => {
                log::trace!("Decoding message '{}' (ID 0x{:X})", layout.name, frame.can_id);
                MessageDecoder::decode_message(frame, layout)
            }
            None => {
                log::trace!("Unknown CAN ID 0x{:X}", frame.can_id);
                DecodeResult::Unknown
            }
        }
    }

    /// Statistics about the loaded layout table
    pub fn layout_stats(&self) -> LayoutStats {
        self.layout.stats()
    }

    /// Read access to the layout table
    pub fn layout(&self) -> &LayoutTable {
        &self.layout
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::layout::{ByteOrder, MessageLayout, SignalLayout, ValueType};
    use crate::types::SignalValue;

    fn speed_layout() -> MessageLayout {
        MessageLayout {
            id: 0x123,
            name: "EngineData".to_string(),
            length: 8,
            sender: None,
            signals: vec![SignalLayout {
                name: "EngineSpeed".to_string(),
                start_bit: 0,
                bit_length: 16,
                byte_order: ByteOrder::LittleEndian,
                value_type: ValueType::Unsigned,
                scale: 1.0,
                offset: 0.0,
                min: 0.0,
                max: 8000.0,
                unit: Some("rpm".to_string()),
                value_labels: None,
            }],
            source: "test.dbc".to_string(),
        }
    }

    #[test]
    fn test_empty_decoder_yields_unknown() {
        let decoder = Decoder::new();
        let frame = CanFrame {
            timestamp: 1.0,
            can_id: 0x123,
            data: vec![0; 8],
        };
        assert_eq!(decoder.decode_frame(&frame), DecodeResult::Unknown);
        assert_eq!(decoder.layout_stats().num_messages, 0);
    }

    #[test]
    fn test_decode_known_frame() {
        let mut table = LayoutTable::new();
        table.insert(speed_layout());
        let decoder = Decoder::with_layout(table);

        let frame = CanFrame {
            timestamp: 1.0,
            can_id: 0x123,
            data: vec![0xE8, 0x03, 0, 0, 0, 0, 0, 0],
        };
        let result = decoder.decode_frame(&frame);
        let signals = result.signals().unwrap();
        assert_eq!(signals[0].name, "EngineSpeed");
        assert_eq!(signals[0].value, SignalValue::Integer(1000));
        assert_eq!(signals[0].unit, Some("rpm".to_string()));
    }
}
