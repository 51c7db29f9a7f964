//! End-of-run summary report
//!
//! Prints the final statistics snapshot: totals, a per-identifier table,
//! a compressed overview of length adjustments (one example per
//! identifier plus a count), and the recorded decode errors.

use candump_decoder::{AggregateStats, LengthAdjustment, MAX_RECORDED_ERRORS};
use chrono::DateTime;
use std::collections::BTreeMap;

/// Print the full summary to stdout
pub fn print_summary(stats: &AggregateStats) {
    println!("\n===== SUMMARY =====");
    println!("  Total CAN frames in log: {}", stats.total_frames);
    println!("  Frames decoded (found in DBC): {}", stats.decoded_frames);
    println!("  Total signals decoded: {}", stats.total_signals_decoded);
    println!();

    print_per_identifier(stats);
    print_adjustments(stats);
    print_errors(stats);

    println!("===== END INFO =====");
}

fn print_per_identifier(stats: &AggregateStats) {
    println!("Per-CAN-ID statistics:");
    println!(
        "{:>8} | {:>10} | {:>8} | {:>13}",
        "CAN-ID", "Frames", "Decoded", "DLC Corrected"
    );
    println!("{}", "-".repeat(50));
    for id in stats.identifiers() {
        let bucket = &stats.per_identifier[&id];
        println!(
            "0x{:06X} | {:>10} | {:>8} | {:>13}",
            id, bucket.seen, bucket.decoded, bucket.corrected
        );
    }
}

fn print_adjustments(stats: &AggregateStats) {
    if stats.length_adjustments.is_empty() {
        return;
    }

    println!("\nDLC adjustments (compressed overview):");
    for (id, adjustments) in adjustments_by_id(&stats.length_adjustments) {
        let first = adjustments[0];
        println!(
            "  CAN-ID 0x{:X}: {} frames corrected, first example:",
            id,
            adjustments.len()
        );
        println!(
            "    Timestamp: {:.6} ({})",
            first.timestamp,
            format_utc(first.timestamp)
        );
        println!(
            "    DLC: {} -> {}",
            first.original_length, first.adjusted_length
        );
        println!("    Original: {}", hex_string(&first.original));
        println!("    Adjusted: {}", hex_string(&first.adjusted));
    }
}

fn print_errors(stats: &AggregateStats) {
    if stats.errors.is_empty() {
        return;
    }

    println!(
        "\nDecoding errors (after DLC adjustment, first {} kept):",
        MAX_RECORDED_ERRORS
    );
    for error in &stats.errors {
        println!(
            "  {:.6}: 0x{:X} - {}",
            error.timestamp, error.can_id, error.message
        );
    }
}

/// Group adjustments by identifier, keeping encounter order within each
fn adjustments_by_id(adjustments: &[LengthAdjustment]) -> BTreeMap<u32, Vec<&LengthAdjustment>> {
    let mut by_id: BTreeMap<u32, Vec<&LengthAdjustment>> = BTreeMap::new();
    for adjustment in adjustments {
        by_id.entry(adjustment.can_id).or_default().push(adjustment);
    }
    by_id
}

fn format_utc(timestamp: f64) -> String {
    let secs = timestamp.trunc() as i64;
    let nsecs = (timestamp.fract() * 1e9) as u32;
    DateTime::from_timestamp(secs, nsecs)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S%.3f UTC").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn hex_string(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
