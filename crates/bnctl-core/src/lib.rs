//! Core library for managing bero*fos and bero*rps appliances.
//!
//! This crate provides the GBL4 UDP management protocol (discovery, unicast
//! operations, firmware flashing), the HTTP configuration session, and the
//! key-mapping codec that translates configuration keys for each device
//! family.

pub mod device;
pub mod discovery;
pub mod error;
pub mod events;
pub mod keymap;
pub mod protocol;
pub mod transport;
pub mod types;

pub use error::{ConfigError, CoreError, DeviceError, FrameError, Result};
pub use events::{EventSink, Priority};
pub use keymap::{DeviceFamily, FOS, RPS};
pub use transport::{Transport, TransportConfig};
pub use types::{Credentials, Device, DiscoveredDevice, MacAddr, NetConfig};
