//! Decoded signal export
//!
//! Wide CSV: one row per decoded frame, one column per signal, rows sorted
//! by timestamp, cells for signals a row doesn't carry left empty. Column
//! order is the order of first appearance in the frame stream.

use anyhow::{Context, Result};
use candump_decoder::{AggregateStats, DecodedSignal, SignalValue};
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// One decoded frame, ready for tabular export
#[derive(Debug, Clone)]
pub struct DecodedRow {
    /// Frame timestamp (epoch seconds)
    pub timestamp: f64,
    /// Signals decoded from the frame
    pub signals: Vec<DecodedSignal>,
}

/// Write the wide CSV file
pub fn write_wide_csv(path: &Path, rows: &[DecodedRow]) -> Result<()> {
    let columns = column_order(rows);

    let mut sorted: Vec<&DecodedRow> = rows.iter().collect();
    sorted.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));

    let file = File::create(path).with_context(|| format!("creating CSV file {:?}", path))?;
    let mut out = BufWriter::new(file);

    write!(out, "timestamp")?;
    for name in &columns {
        write!(out, ",{}", csv_field(name))?;
    }
    writeln!(out)?;

    for row in sorted {
        let by_name: HashMap<&str, &SignalValue> = row
            .signals
            .iter()
            .map(|s| (s.name.as_str(), &s.value))
            .collect();

        write!(out, "{:.6}", row.timestamp)?;
        for name in &columns {
            match by_name.get(name.as_str()) {
                Some(value) => write!(out, ",{}", csv_field(&value.to_string()))?,
                None => write!(out, ",")?,
            }
        }
        writeln!(out)?;
    }

    out.flush()?;
    Ok(())
}

/// Write the final statistics snapshot as JSON
pub fn write_stats_json(path: &Path, stats: &AggregateStats) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating stats file {:?}", path))?;
    serde_json::to_writer_pretty(BufWriter::new(file), stats)
        .with_context(|| format!("writing stats to {:?}", path))?;
    Ok(())
}

/// Signal names in order of first appearance across the frame stream
fn column_order(rows: &[DecodedRow]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut columns = Vec::new();
    for row in rows {
        for signal in &row.signals {
            if seen.insert(signal.name.clone()) {
                columns.push(signal.name.clone());
            }
        }
    }
    columns
}

/// Quote a CSV field if it contains a separator, quote, or newline
fn csv_field(s: &str) -> Cow<'_, str> {
    if s.contains([',', '"', '\n']) {
        Cow::Owned(format!("\"{}\"", s.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(s)
    }
}
