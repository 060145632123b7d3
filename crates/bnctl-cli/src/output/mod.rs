//! Output formatting for CLI results.

pub mod json;
pub mod table;

pub use json::JsonOutput;
pub use table::TableOutput;

use bnctl_core::keymap::{ConfigDump, ConfigValue, KeyDescriptor, ValueType};
use bnctl_core::{DeviceFamily, DiscoveredDevice};

/// Output formatter trait
pub trait OutputFormatter {
    /// Format the devices found by a scan
    fn format_devices(&self, devices: &[DiscoveredDevice]) -> String;

    /// Format a full configuration dump
    fn format_dump(&self, dump: &ConfigDump) -> String;

    /// Format a single configuration value
    fn format_value(&self, keyword: &str, value: Option<&ConfigValue>) -> String;

    /// Format the key table of a device family
    fn format_keys(&self, family: &DeviceFamily) -> String;

    /// Format the outcome of a device operation
    fn format_result(&self, operation: &str, target: &str, success: bool, message: &str) -> String;

    /// Format a generic message
    fn format_message(&self, message: &str) -> String;
}

/// Get the appropriate formatter based on JSON flag
pub fn get_formatter(json: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonOutput::new())
    } else {
        Box::new(TableOutput::new())
    }
}

/// Value syntax shown next to a key, e.g. `{0|1}`.
pub fn value_syntax(key: &KeyDescriptor) -> String {
    match key.value_type {
        ValueType::Boolean => "{0|1}".to_string(),
        ValueType::Port => "{1..65535}".to_string(),
        ValueType::Trigger | ValueType::Status => String::new(),
        other => format!("<{}>", other),
    }
}
