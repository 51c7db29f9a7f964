//! candump text log parser
//!
//! Parses logs written by `candump -l` / `candump -L`, one frame per line:
//!
//! ```text
//! (1736527112.345678) can0 2B4#AABBCCDD
//! ```
//!
//! Lines that don't have this shape (comments, error frames, remote frames,
//! odd-length hex payloads) are skipped, not treated as failures.

use crate::types::{CanFrame, DecoderError, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

/// Parse a single candump log line into a frame.
///
/// Returns None for anything that is not a plain data frame line.
pub fn parse_line(line: &str) -> Option<CanFrame> {
    let mut parts = line.split_whitespace();

    let stamp = parts.next()?;
    let timestamp: f64 = stamp.strip_prefix('(')?.strip_suffix(')')?.parse().ok()?;

    let _interface = parts.next()?;

    let frame_part = parts.next()?;
    let (id_str, data_str) = frame_part.split_once('#')?;
    let can_id = u32::from_str_radix(id_str, 16).ok()?;
    let data = parse_hex(data_str)?;

    Some(CanFrame {
        timestamp,
        can_id,
        data,
    })
}

/// Decode a hex payload string; empty input is a valid zero-length payload
fn parse_hex(s: &str) -> Option<Vec<u8>> {
    if !s.is_ascii() || s.len() % 2 != 0 {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok())
        .collect()
}

/// candump log file parser
pub struct CandumpParser;

impl CandumpParser {
    /// Open a candump log file and return an iterator over its CAN frames
    pub fn parse(path: &Path) -> Result<CandumpFrameIterator> {
        log::info!("Parsing candump log: {:?}", path);

        let file = File::open(path).map_err(|e| {
            DecoderError::LogParseError(format!("Failed to open log file {:?}: {}", path, e))
        })?;

        Ok(CandumpFrameIterator {
            lines: BufReader::new(file).lines(),
            skipped: 0,
        })
    }
}

/// Iterator over CAN frames from a candump log file
///
/// Unparseable lines are skipped and counted; I/O errors end the stream
/// with an `Err` item.
pub struct CandumpFrameIterator {
    lines: Lines<BufReader<File>>,
    skipped: u64,
}

impl CandumpFrameIterator {
    /// Number of non-empty lines skipped so far
    pub fn skipped_lines(&self) -> u64 {
        self.skipped
    }
}

impl Iterator for CandumpFrameIterator {
    type Item = Result<CanFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.lines.next()? {
                Ok(line) => {
                    if let Some(frame) = parse_line(&line) {
                        return Some(Ok(frame));
                    }
                    if !line.trim().is_empty() {
                        self.skipped += 1;
                        log::debug!("Skipping unparseable log line: {}", line.trim());
                    }
                }
                Err(e) => return Some(Err(DecoderError::IoError(e))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_plain_line() {
        let frame = parse_line("(1736527112.345678) can0 2B4#AABBCCDD").unwrap();
        assert_eq!(frame.timestamp, 1736527112.345678);
        assert_eq!(frame.can_id, 0x2B4);
        assert_eq!(frame.data, vec![0xAA, 0xBB, 0xCC, 0xDD]);
    }

    #[test]
    fn test_parse_extended_id_and_lowercase_hex() {
        let frame = parse_line("(0.000001) vcan0 18FEF100#aabb").unwrap();
        assert_eq!(frame.can_id, 0x18FEF100);
        assert_eq!(frame.data, vec![0xAA, 0xBB]);
    }

    #[test]
    fn test_parse_empty_payload() {
        let frame = parse_line("(5.5) can1 123#").unwrap();
        assert_eq!(frame.can_id, 0x123);
        assert!(frame.data.is_empty());
    }

    #[test]
    fn test_rejects_odd_length_hex() {
        assert!(parse_line("(1.0) can0 123#ABC").is_none());
    }

    #[test]
    fn test_rejects_malformed_lines() {
        assert!(parse_line("").is_none());
        assert!(parse_line("# comment").is_none());
        assert!(parse_line("1.0 can0 123#AB").is_none());
        assert!(parse_line("(1.0) can0 123AB").is_none());
        assert!(parse_line("(1.0) can0 XYZ#AB").is_none());
        // remote frames carry no payload to decode
        assert!(parse_line("(1.0) can0 123#R").is_none());
        // CAN-FD framing is not supported
        assert!(parse_line("(1.0) can0 123##1AABB").is_none());
    }

    #[test]
    fn test_iterator_skips_garbage_and_counts() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "(1.0) can0 100#01").unwrap();
        writeln!(temp_file, "not a frame line").unwrap();
        writeln!(temp_file).unwrap();
        writeln!(temp_file, "(2.0) can0 200#0203").unwrap();
        temp_file.flush().unwrap();

        let mut iter = CandumpParser::parse(temp_file.path()).unwrap();
        let frames: Vec<CanFrame> = iter.by_ref().map(|f| f.unwrap()).collect();

        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].can_id, 0x100);
        assert_eq!(frames[1].data, vec![0x02, 0x03]);
        assert_eq!(iter.skipped_lines(), 1);
    }

    #[test]
    fn test_missing_file() {
        let result = CandumpParser::parse(Path::new("/nonexistent/trace.log"));
        assert!(matches!(result, Err(DecoderError::LogParseError(_))));
    }
}
