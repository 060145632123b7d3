//! Table-formatted output for CLI.

use bnctl_core::keymap::{ConfigDump, ConfigValue};
use bnctl_core::{DeviceFamily, DiscoveredDevice};
use colored::*;
use comfy_table::{Cell, Color, ContentArrangement, Table};

use super::{value_syntax, OutputFormatter};

pub struct TableOutput;

impl TableOutput {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TableOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for TableOutput {
    fn format_devices(&self, devices: &[DiscoveredDevice]) -> String {
        if devices.is_empty() {
            return "0 device(s) found.".to_string();
        }

        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec![
            "MAC", "Address", "Netmask", "Gateway", "HTTP", "Firmware", "Bootloader", "Mode", "Options",
        ]);

        for device in devices {
            let mode = if device.flash_mode {
                Cell::new(device.mode_name()).fg(Color::Yellow)
            } else {
                Cell::new(device.mode_name()).fg(Color::Green)
            };
            table.add_row(vec![
                Cell::new(device.mac),
                Cell::new(device.address),
                Cell::new(device.netmask),
                Cell::new(device.gateway),
                Cell::new(device.http_port),
                Cell::new(device.firmware),
                Cell::new(device.bootloader),
                mode,
                Cell::new(device.options),
            ]);
        }

        format!("{}\n\n{} device(s) found.", table, devices.len())
    }

    fn format_dump(&self, dump: &ConfigDump) -> String {
        let width = dump
            .family()
            .keys
            .iter()
            .map(|k| k.keyword.len())
            .max()
            .unwrap_or(0)
            .max(10);

        dump.iter()
            .map(|(key, value)| format!("{:<width$}: {}", key.keyword, value, width = width))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn format_value(&self, _keyword: &str, value: Option<&ConfigValue>) -> String {
        value.map(|v| v.to_string()).unwrap_or_default()
    }

    fn format_keys(&self, family: &DeviceFamily) -> String {
        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["Key", "Value", "Access", "Description"]);

        for key in family.keys {
            let access = match (key.is_readable(), key.is_writable()) {
                (true, true) => "get/set",
                (true, false) => "get",
                (false, true) => "set",
                (false, false) => "-",
            };
            table.add_row(vec![
                Cell::new(key.keyword),
                Cell::new(value_syntax(key)),
                Cell::new(access),
                Cell::new(key.description),
            ]);
        }

        table.to_string()
    }

    fn format_result(&self, _operation: &str, _target: &str, success: bool, message: &str) -> String {
        if success {
            message.green().to_string()
        } else {
            message.red().to_string()
        }
    }

    fn format_message(&self, message: &str) -> String {
        message.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bnctl_core::keymap::DumpParser;
    use bnctl_core::RPS;

    #[test]
    fn test_format_dump_pads_keywords() {
        let mut parser = DumpParser::new(&RPS);
        parser.feed(b"bnrps_confmap_magic=0.1\n1_p1=1\n4_port=80\n");
        let dump = parser.finish().unwrap();

        let out = TableOutput::new().format_dump(&dump);
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines, vec!["power1    : 1", "port      : 80"]);
    }

    #[test]
    fn test_format_missing_value_is_empty() {
        assert_eq!(TableOutput::new().format_value("dhcp", None), "");
        assert_eq!(
            TableOutput::new().format_value("dhcp", Some(&ConfigValue::Flag(false))),
            "0"
        );
    }

    #[test]
    fn test_empty_scan() {
        assert_eq!(TableOutput::new().format_devices(&[]), "0 device(s) found.");
    }
}
