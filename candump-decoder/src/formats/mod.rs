//! Log file format parsers
//!
//! Input is candump text logs. Each parser exposes an iterator over
//! [`crate::types::CanFrame`] items.

pub mod candump;

pub use candump::{CandumpFrameIterator, CandumpParser};
