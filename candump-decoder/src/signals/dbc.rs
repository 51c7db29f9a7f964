//! DBC file loading
//!
//! Parses Vector DBC files with the `can-dbc` crate and converts them into
//! the layout table format consumed by the decoder.

use crate::signals::layout::{ByteOrder, MessageLayout, SignalLayout, ValueType};
use crate::types::{DecoderError, Result};
use std::collections::HashMap;
use std::path::Path;

/// Parse a DBC file and return the message layouts it defines.
///
/// Messages with multiplexed signals are skipped with a warning; layouts
/// whose signals don't fit the declared message length are rejected.
pub fn parse_dbc_file(path: &Path) -> Result<Vec<MessageLayout>> {
    log::info!("Parsing DBC file: {:?}", path);

    let bytes = std::fs::read(path)
        .map_err(|e| DecoderError::DbcParseError(format!("Failed to read file {:?}: {}", path, e)))?;

    // DBC files from older toolchains are often Latin-1/Windows-1252
    let content = String::from_utf8(bytes.clone()).unwrap_or_else(|_| {
        log::warn!("DBC file {:?} is not UTF-8, falling back to Latin-1", path);
        bytes.iter().map(|&b| b as char).collect()
    });

    let dbc = can_dbc::DBC::from_slice(content.as_bytes()).map_err(|e| {
        DecoderError::DbcParseError(format!("Failed to parse DBC file {:?}: {:?}", path, e))
    })?;

    let source = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown.dbc")
        .to_string();

    let mut messages = Vec::new();
    for dbc_msg in dbc.messages() {
        if let Some(message) = convert_message(&dbc, dbc_msg, &source)? {
            message.validate()?;
            messages.push(message);
        }
    }

    log::info!("Parsed {} messages from {:?}", messages.len(), path);
    Ok(messages)
}

/// Raw numeric CAN ID of a DBC message id
fn raw_id(message_id: &can_dbc::MessageId) -> u32 {
    // can-dbc stores the raw DBC id; extended frames set bit 31. Strip the
    // extended flag so the id matches incoming frame ids, which carry only
    // the 11-/29-bit CAN id.
    message_id.0 & 0x1FFF_FFFF
}

/// Convert a can-dbc message to a MessageLayout.
///
/// Returns None for multiplexed messages: this decoder handles fixed
/// layouts only.
fn convert_message(
    dbc: &can_dbc::DBC,
    dbc_msg: &can_dbc::Message,
    source: &str,
) -> Result<Option<MessageLayout>> {
    let multiplexed = dbc_msg.signals().iter().any(|s| {
        !matches!(s.multiplexer_indicator(), can_dbc::MultiplexIndicator::Plain)
    });
    if multiplexed {
        log::warn!(
            "Skipping multiplexed message '{}' (0x{:X}): multiplexing is not supported",
            dbc_msg.message_name(),
            raw_id(dbc_msg.message_id())
        );
        return Ok(None);
    }

    let mut signals = Vec::new();
    for dbc_sig in dbc_msg.signals() {
        signals.push(convert_signal(dbc, dbc_msg.message_id(), dbc_sig)?);
    }

    Ok(Some(MessageLayout {
        id: raw_id(dbc_msg.message_id()),
        name: dbc_msg.message_name().to_string(),
        length: *dbc_msg.message_size() as usize,
        sender: match dbc_msg.transmitter() {
            can_dbc::Transmitter::NodeName(name) => Some(name.to_string()),
            _ => None,
        },
        signals,
        source: source.to_string(),
    }))
}

/// Convert a can-dbc signal to a SignalLayout
fn convert_signal(
    dbc: &can_dbc::DBC,
    message_id: &can_dbc::MessageId,
    dbc_sig: &can_dbc::Signal,
) -> Result<SignalLayout> {
    let byte_order = match dbc_sig.byte_order() {
        can_dbc::ByteOrder::LittleEndian => ByteOrder::LittleEndian,
        can_dbc::ByteOrder::BigEndian => ByteOrder::BigEndian,
    };

    // SIG_VALTYPE_ overrides the signed/unsigned flag with a float encoding
    let value_type = match extended_value_type(dbc, message_id, dbc_sig.name()) {
        Some(can_dbc::SignalExtendedValueType::IEEEfloat32Bit)
        | Some(can_dbc::SignalExtendedValueType::IEEEdouble64bit) => ValueType::Float,
        _ => match dbc_sig.value_type() {
            can_dbc::ValueType::Signed => ValueType::Signed,
            can_dbc::ValueType::Unsigned => ValueType::Unsigned,
        },
    };

    Ok(SignalLayout {
        name: dbc_sig.name().to_string(),
        start_bit: *dbc_sig.start_bit() as u16,
        bit_length: *dbc_sig.signal_size() as u16,
        byte_order,
        value_type,
        scale: *dbc_sig.factor(),
        offset: *dbc_sig.offset(),
        min: *dbc_sig.min(),
        max: *dbc_sig.max(),
        unit: if dbc_sig.unit().is_empty() {
            None
        } else {
            Some(dbc_sig.unit().to_string())
        },
        value_labels: value_labels(dbc, message_id, dbc_sig.name()),
    })
}

/// Extended value type (SIG_VALTYPE_) for a signal, if declared
fn extended_value_type<'a>(
    dbc: &'a can_dbc::DBC,
    message_id: &can_dbc::MessageId,
    signal_name: &str,
) -> Option<&'a can_dbc::SignalExtendedValueType> {
    dbc.signal_extended_value_type_list()
        .iter()
        .find(|entry| entry.message_id() == message_id && entry.signal_name() == signal_name)
        .map(|entry| entry.signal_extended_value_type())
}

/// VAL_ table for a signal, if declared
fn value_labels(
    dbc: &can_dbc::DBC,
    message_id: &can_dbc::MessageId,
    signal_name: &str,
) -> Option<HashMap<i64, String>> {
    let mut labels = HashMap::new();
    for desc in dbc.value_descriptions() {
        if let can_dbc::ValueDescription::Signal {
            message_id: desc_id,
            signal_name: desc_name,
            value_descriptions,
        } = desc
        {
            if desc_id == message_id && desc_name == signal_name {
                for val in value_descriptions {
                    labels.insert(*val.a() as i64, val.b().clone());
                }
            }
        }
    }
    if labels.is_empty() {
        None
    } else {
        Some(labels)
    }
}
