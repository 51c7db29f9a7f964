//! Message/signal layout definitions and loading

pub mod dbc;
pub mod layout;

pub use layout::{ByteOrder, LayoutStats, LayoutTable, MessageLayout, SignalLayout, ValueType};
