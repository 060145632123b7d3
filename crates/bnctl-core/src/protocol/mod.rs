//! GBL4 management protocol.
//!
//! Frame codec and the fixed payload layouts of every command.

pub mod packet;
pub mod payload;

pub use packet::{Command, Packet};
