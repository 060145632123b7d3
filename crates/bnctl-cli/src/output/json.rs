//! JSON-formatted output for CLI.

use bnctl_core::keymap::{ConfigDump, ConfigValue};
use bnctl_core::{DeviceFamily, DiscoveredDevice};
use serde::Serialize;
use serde_json::json;

use super::OutputFormatter;

pub struct JsonOutput;

impl JsonOutput {
    pub fn new() -> Self {
        Self
    }

    fn to_json<T: Serialize>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for JsonOutput {
    fn format_devices(&self, devices: &[DiscoveredDevice]) -> String {
        let output = json!({
            "devices": devices,
            "count": devices.len()
        });
        Self::to_json(&output)
    }

    fn format_dump(&self, dump: &ConfigDump) -> String {
        let output = json!({
            "family": dump.family().name,
            "version": dump.version(),
            "values": dump
        });
        Self::to_json(&output)
    }

    fn format_value(&self, keyword: &str, value: Option<&ConfigValue>) -> String {
        Self::to_json(&json!({
            "key": keyword,
            "value": value
        }))
    }

    fn format_keys(&self, family: &DeviceFamily) -> String {
        let keys: Vec<_> = family
            .keys
            .iter()
            .map(|k| {
                json!({
                    "key": k.keyword,
                    "type": k.value_type,
                    "readable": k.is_readable(),
                    "writable": k.is_writable(),
                    "description": k.description
                })
            })
            .collect();
        Self::to_json(&json!({
            "family": family.name,
            "keys": keys
        }))
    }

    fn format_result(&self, operation: &str, target: &str, success: bool, message: &str) -> String {
        Self::to_json(&json!({
            "operation": operation,
            "target": target,
            "success": success,
            "message": message
        }))
    }

    fn format_message(&self, message: &str) -> String {
        Self::to_json(&json!({ "message": message }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bnctl_core::keymap::DumpParser;
    use bnctl_core::FOS;
    use serde_json::Value;

    #[test]
    fn test_format_dump() {
        let mut parser = DumpParser::new(&FOS);
        parser.feed(b"bnfos_confmap_magic=0.1\n3_dhcp=1\n3_ip=10.0.0.2\n");
        let dump = parser.finish().unwrap();

        let out: Value = serde_json::from_str(&JsonOutput::new().format_dump(&dump)).unwrap();
        assert_eq!(out["family"], "fos");
        assert_eq!(out["version"], "0.1");
        assert_eq!(out["values"]["dhcp"], true);
        assert_eq!(out["values"]["address"], "10.0.0.2");
    }

    #[test]
    fn test_format_keys_marks_write_only() {
        let out: Value = serde_json::from_str(&JsonOutput::new().format_keys(&FOS)).unwrap();
        let keys = out["keys"].as_array().unwrap();
        assert_eq!(keys.len(), FOS.keys.len());
        let apwd = keys.iter().find(|k| k["key"] == "apwd").unwrap();
        assert_eq!(apwd["readable"], false);
        assert_eq!(apwd["type"], "secret");
    }
}
