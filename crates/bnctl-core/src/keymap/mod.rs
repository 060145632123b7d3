//! Key-mapping configuration codec.
//!
//! Translates user-facing configuration keys to HTTP command strings and
//! decodes bulk configuration dumps, driven by a per-family descriptor table.

pub mod descriptor;
pub mod dump;
pub mod value;

pub use descriptor::{DeviceFamily, KeyDescriptor, ValueType, FOS, RPS};
pub use dump::{ConfigDump, ConfigValue, DumpParser};
pub use value::{escape, prepare_set, PreparedSet};
