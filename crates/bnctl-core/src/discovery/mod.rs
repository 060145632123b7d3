//! Broadcast discovery of devices.

pub mod service;

pub use service::{discover, probe, scan, ScanControl};
