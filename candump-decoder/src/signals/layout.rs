//! Message/signal layout table
//!
//! The read-only table mapping CAN identifiers to message layouts. Built
//! once per run (normally from DBC files) and only read during decoding.

use crate::types::{DecoderError, Result};
use std::collections::HashMap;

/// A complete CAN message layout
#[derive(Debug, Clone, PartialEq)]
pub struct MessageLayout {
    /// CAN message ID
    pub id: u32,
    /// Message name
    pub name: String,
    /// Expected payload length in bytes (DLC)
    pub length: usize,
    /// Sender ECU name (optional)
    pub sender: Option<String>,
    /// All signals in this message, in declared order
    pub signals: Vec<SignalLayout>,
    /// Source file the layout came from
    pub source: String,
}

impl MessageLayout {
    /// Check that every signal's bit field fits inside the declared
    /// message length.
    ///
    /// Out-of-range signals are a layout defect and are rejected here at
    /// load time; the extractor keeps its own defensive check for layouts
    /// constructed directly.
    pub fn validate(&self) -> Result<()> {
        for signal in &self.signals {
            let end_bit = signal.start_bit as usize + signal.bit_length as usize;
            if signal.bit_length == 0 || end_bit > self.length * 8 {
                return Err(DecoderError::InvalidSignalDefinition(format!(
                    "signal '{}' in message '{}' (0x{:X}) occupies bits {}..{} but the message is {} bytes",
                    signal.name, self.name, self.id, signal.start_bit, end_bit, self.length
                )));
            }
        }
        Ok(())
    }
}

/// A CAN signal layout
#[derive(Debug, Clone, PartialEq)]
pub struct SignalLayout {
    /// Signal name, unique within the message
    pub name: String,
    /// Offset of the field's first bit within the payload
    pub start_bit: u16,
    /// Field width in bits
    pub bit_length: u16,
    /// Byte order for bit extraction
    pub byte_order: ByteOrder,
    /// Raw value interpretation
    pub value_type: ValueType,
    /// Scale factor applied to the raw value
    pub scale: f64,
    /// Offset added after scaling
    pub offset: f64,
    /// Minimum physical value
    pub min: f64,
    /// Maximum physical value
    pub max: f64,
    /// Engineering unit
    pub unit: Option<String>,
    /// Raw value -> display label (DBC VAL_ table)
    pub value_labels: Option<HashMap<i64, String>>,
}

/// Byte order for signal extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Little-endian (Intel format)
    LittleEndian,
    /// Big-endian (Motorola format)
    BigEndian,
}

/// Raw value interpretation
///
/// Float signals reinterpret the raw bit pattern as IEEE-754 single or
/// double precision depending on the bit length (32 or 64).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    /// Unsigned integer
    Unsigned,
    /// Two's-complement signed integer
    Signed,
    /// IEEE-754 float
    Float,
}

/// The layout table consumed by the decoder
///
/// One layout per identifier. Inserting a second layout for the same
/// identifier replaces the first with a warning.
#[derive(Debug, Clone, Default)]
pub struct LayoutTable {
    messages: HashMap<u32, MessageLayout>,
}

impl LayoutTable {
    /// Create a new empty layout table
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a message layout to the table
    pub fn insert(&mut self, message: MessageLayout) {
        if let Some(existing) = self.messages.get(&message.id) {
            log::warn!(
                "Duplicate message ID 0x{:X} ('{}' from {}). Overwriting with '{}' from {}.",
                message.id,
                existing.name,
                existing.source,
                message.name,
                message.source
            );
        }
        self.messages.insert(message.id, message);
    }

    /// Get the layout for a CAN ID
    pub fn get(&self, can_id: u32) -> Option<&MessageLayout> {
        self.messages.get(&can_id)
    }

    /// All CAN IDs in the table, sorted
    pub fn ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.messages.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Number of message layouts
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// True if the table holds no layouts
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Get table statistics
    pub fn stats(&self) -> LayoutStats {
        LayoutStats {
            num_messages: self.messages.len(),
            num_signals: self.messages.values().map(|m| m.signals.len()).sum(),
        }
    }
}

/// Layout table statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutStats {
    /// Total number of message layouts
    pub num_messages: usize,
    /// Total number of signal layouts
    pub num_signals: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unsigned_signal(name: &str, start_bit: u16, bit_length: u16) -> SignalLayout {
        SignalLayout {
            name: name.to_string(),
            start_bit,
            bit_length,
            byte_order: ByteOrder::LittleEndian,
            value_type: ValueType::Unsigned,
            scale: 1.0,
            offset: 0.0,
            min: 0.0,
            max: 0.0,
            unit: None,
            value_labels: None,
        }
    }

    fn message(id: u32, length: usize, signals: Vec<SignalLayout>) -> MessageLayout {
        MessageLayout {
            id,
            name: format!("Msg{:X}", id),
            length,
            sender: None,
            signals,
            source: "test.dbc".to_string(),
        }
    }

    #[test]
    fn test_empty_table() {
        let table = LayoutTable::new();
        assert!(table.is_empty());
        assert_eq!(table.stats().num_messages, 0);
        assert_eq!(table.stats().num_signals, 0);
        assert!(table.get(0x123).is_none());
    }

    #[test]
    fn test_insert_and_get() {
        let mut table = LayoutTable::new();
        table.insert(message(0x123, 8, vec![unsigned_signal("EngineSpeed", 0, 16)]));

        let stats = table.stats();
        assert_eq!(stats.num_messages, 1);
        assert_eq!(stats.num_signals, 1);

        let layout = table.get(0x123).unwrap();
        assert_eq!(layout.length, 8);
        assert_eq!(layout.signals[0].name, "EngineSpeed");
    }

    #[test]
    fn test_duplicate_id_overwrites() {
        let mut table = LayoutTable::new();
        table.insert(message(0x123, 8, vec![unsigned_signal("A", 0, 8)]));
        table.insert(message(0x123, 4, vec![]));

        assert_eq!(table.len(), 1);
        assert_eq!(table.get(0x123).unwrap().length, 4);
    }

    #[test]
    fn test_ids_are_sorted() {
        let mut table = LayoutTable::new();
        table.insert(message(0x300, 8, vec![]));
        table.insert(message(0x100, 8, vec![]));
        table.insert(message(0x200, 8, vec![]));
        assert_eq!(table.ids(), vec![0x100, 0x200, 0x300]);
    }

    #[test]
    fn test_validate_accepts_fitting_signal() {
        let layout = message(0x123, 8, vec![unsigned_signal("A", 56, 8)]);
        assert!(layout.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range_signal() {
        let layout = message(0x123, 8, vec![unsigned_signal("A", 60, 8)]);
        assert!(layout.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_width_signal() {
        let layout = message(0x123, 8, vec![unsigned_signal("A", 0, 0)]);
        assert!(layout.validate().is_err());
    }
}
