//! Message decoding engine
//!
//! Extracts signal values from raw CAN frames based on a message layout.
//! Handles length reconciliation, bit extraction, endianness, and physical
//! value conversion.
//!
//! Bit addressing conventions, applied uniformly:
//! - little-endian: the start bit is the LSB of the field, numbered from the
//!   least-significant bit of byte 0 upward (lsb0)
//! - big-endian: bit 0 is the MSB of byte 0, bit 7 its LSB; the field is
//!   assembled MSB-first from the start bit onward (msb0)

use crate::reconcile::reconcile;
use crate::signals::layout::{ByteOrder, MessageLayout, SignalLayout, ValueType};
use crate::types::{
    CanFrame, DecodeError, DecodeResult, DecodedSignal, DecoderError, Result, SignalValue,
};

/// Message decoder - extracts signals from CAN frames
pub struct MessageDecoder;

impl MessageDecoder {
    /// Decode one frame against its message layout.
    ///
    /// Reconciles the payload length, then extracts every signal in the
    /// layout's declared order. The first extraction failure fails the
    /// whole frame; the length adjustment, if any, survives either way.
    pub fn decode_message(frame: &CanFrame, layout: &MessageLayout) -> DecodeResult {
        let (data, adjustment) = reconcile(frame, layout.length);

        let mut signals = Vec::with_capacity(layout.signals.len());
        for signal in &layout.signals {
            match Self::decode_signal(&data, signal) {
                Ok(decoded) => signals.push(decoded),
                Err(e) => {
                    log::warn!(
                        "Failed to decode signal '{}' in message 0x{:X}: {}",
                        signal.name,
                        frame.can_id,
                        e
                    );
                    return DecodeResult::Failed {
                        error: DecodeError {
                            timestamp: frame.timestamp,
                            can_id: frame.can_id,
                            message: e.to_string(),
                        },
                        adjustment,
                    };
                }
            }
        }

        DecodeResult::Decoded { signals, adjustment }
    }

    /// Decode a single signal from reconciled frame data
    fn decode_signal(data: &[u8], signal: &SignalLayout) -> Result<DecodedSignal> {
        let raw_bits = Self::extract_raw(data, signal)?;

        let value = match signal.value_type {
            ValueType::Float => {
                let raw = match signal.bit_length {
                    32 => f32::from_bits(raw_bits as u32) as f64,
                    64 => f64::from_bits(raw_bits),
                    other => {
                        return Err(DecoderError::InvalidSignalDefinition(format!(
                            "float signal '{}' has unsupported bit length {}",
                            signal.name, other
                        )))
                    }
                };
                SignalValue::Float(signal.offset + signal.scale * raw)
            }
            ValueType::Unsigned | ValueType::Signed => {
                let raw = if signal.value_type == ValueType::Signed {
                    Self::sign_extend(raw_bits, signal.bit_length as usize)
                } else {
                    raw_bits as i64
                };

                if let Some(label) = signal.value_labels.as_ref().and_then(|t| t.get(&raw)) {
                    SignalValue::Label(label.clone())
                } else if signal.scale == 1.0 && signal.offset == 0.0 {
                    SignalValue::Integer(raw)
                } else {
                    SignalValue::Float(signal.offset + signal.scale * raw as f64)
                }
            }
        };

        Ok(DecodedSignal {
            name: signal.name.clone(),
            value,
            unit: signal.unit.clone(),
        })
    }

    /// Extract the raw bit field of a signal as an unsigned word
    fn extract_raw(data: &[u8], signal: &SignalLayout) -> Result<u64> {
        let start_bit = signal.start_bit as usize;
        let length = signal.bit_length as usize;

        if length == 0 || length > 64 {
            return Err(DecoderError::InvalidSignalDefinition(format!(
                "signal '{}' has invalid bit length {}",
                signal.name, length
            )));
        }

        let required_bytes = (start_bit + length + 7) / 8;
        if required_bytes > data.len() {
            return Err(DecoderError::SignalOutOfRange {
                name: signal.name.clone(),
                required: required_bytes,
                available: data.len(),
            });
        }

        Ok(match signal.byte_order {
            ByteOrder::LittleEndian => Self::extract_little_endian(data, start_bit, length),
            ByteOrder::BigEndian => Self::extract_big_endian(data, start_bit, length),
        })
    }

    /// Extract a bit field with little-endian (Intel) byte order.
    ///
    /// The start bit is the LSB of the field; bits are numbered from the
    /// LSB of byte 0 and grow toward later bytes.
    fn extract_little_endian(data: &[u8], start_bit: usize, length: usize) -> u64 {
        let mut result: u64 = 0;

        for i in 0..length {
            let bit_pos = start_bit + i;
            let byte_idx = bit_pos / 8;
            let bit_in_byte = bit_pos % 8;

            let bit_value = (data[byte_idx] >> bit_in_byte) & 0x01;
            result |= (bit_value as u64) << i;
        }

        result
    }

    /// Extract a bit field with big-endian (Motorola) byte order.
    ///
    /// Bit 0 is the MSB of byte 0, bit 7 its LSB; the field is assembled
    /// MSB-first starting at the start bit.
    fn extract_big_endian(data: &[u8], start_bit: usize, length: usize) -> u64 {
        let mut result: u64 = 0;

        for i in 0..length {
            let bit_pos = start_bit + i;
            let byte_idx = bit_pos / 8;
            let bit_in_byte = 7 - (bit_pos % 8);

            let bit_value = (data[byte_idx] >> bit_in_byte) & 0x01;
            result |= (bit_value as u64) << (length - 1 - i);
        }

        result
    }

    /// Sign-extend a two's-complement value of the given width to i64
    fn sign_extend(value: u64, bit_length: usize) -> i64 {
        if bit_length >= 64 {
            return value as i64;
        }

        let sign_bit = 1u64 << (bit_length - 1);
        if (value & sign_bit) != 0 {
            let mask = !0u64 << bit_length;
            (value | mask) as i64
        } else {
            value as i64
        }
    }
}
