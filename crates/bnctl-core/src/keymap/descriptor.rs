//! Key descriptor tables for the supported device families.

use std::fmt;

use serde::Serialize;

use crate::error::ConfigError;

/// Value type of a configuration key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Boolean,
    Address,
    Hostname,
    Port,
    /// Write-only password, at most [`MAX_SECRET_LEN`] bytes.
    Secret,
    /// Free-form non-empty string.
    Text,
    /// Action without a value.
    Trigger,
    /// Read-only state reported by the device.
    Status,
}

/// Longest secret the devices store, in bytes.
pub const MAX_SECRET_LEN: usize = 15;

impl ValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::Boolean => "boolean",
            ValueType::Address => "address",
            ValueType::Hostname => "hostname",
            ValueType::Port => "port",
            ValueType::Secret => "secret",
            ValueType::Text => "text",
            ValueType::Trigger => "trigger",
            ValueType::Status => "status",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One configuration key of a device family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyDescriptor {
    /// Name used on the command line.
    pub keyword: &'static str,
    /// Device-side field name, used in dump lines.
    pub field: &'static str,
    pub value_type: ValueType,
    /// Command id of the HTTP interface.
    pub command: u8,
    /// Query parameter template; `%s` marks the value.
    pub template: Option<&'static str>,
    /// Firmware macro that expands to the current value in a dump.
    #[serde(rename = "macro")]
    pub macro_name: Option<&'static str>,
    pub description: &'static str,
}

impl KeyDescriptor {
    /// Whether the key appears in configuration dumps.
    pub fn is_readable(&self) -> bool {
        self.macro_name.is_some()
    }

    pub fn is_writable(&self) -> bool {
        self.value_type != ValueType::Status
    }

    /// Key of this descriptor's line in a dump (`<command>_<field>`).
    pub fn dump_key(&self) -> Option<String> {
        self.macro_name
            .map(|_| format!("{}_{}", self.command, self.field))
    }
}

const fn key(
    keyword: &'static str,
    field: &'static str,
    value_type: ValueType,
    command: u8,
    template: Option<&'static str>,
    macro_name: Option<&'static str>,
    description: &'static str,
) -> KeyDescriptor {
    KeyDescriptor {
        keyword,
        field,
        value_type,
        command,
        template,
        macro_name,
        description,
    }
}

/// Static profile of a device family.
#[derive(Debug, PartialEq, Eq)]
pub struct DeviceFamily {
    pub name: &'static str,
    /// Hardware identifiers accepted during discovery.
    pub hwmagics: &'static [u16],
    pub magic_key: &'static str,
    pub magic_version: &'static str,
    pub keys: &'static [KeyDescriptor],
}

impl DeviceFamily {
    /// Look up a family by name (`fos` or `rps`).
    pub fn by_name(name: &str) -> Option<&'static DeviceFamily> {
        DeviceFamily::all()
            .into_iter()
            .find(|f| f.name.eq_ignore_ascii_case(name))
    }

    pub fn all() -> [&'static DeviceFamily; 2] {
        [&FOS, &RPS]
    }

    pub fn accepts(&self, hwmagic: u16) -> bool {
        self.hwmagics.contains(&hwmagic)
    }

    /// Find a key by its keyword.
    pub fn lookup(&self, keyword: &str) -> Result<&'static KeyDescriptor, ConfigError> {
        self.position(keyword)
            .map(|i| &self.keys[i])
            .ok_or_else(|| ConfigError::UnknownKey(keyword.to_string()))
    }

    pub(crate) fn position(&self, keyword: &str) -> Option<usize> {
        self.keys
            .iter()
            .position(|k| k.keyword.eq_ignore_ascii_case(keyword))
    }

    /// Index of the readable key whose dump line key is `<command>_<field>`.
    pub(crate) fn dump_position(&self, line_key: &str) -> Option<usize> {
        let (command, field) = line_key.split_once('_')?;
        let command: u8 = command.parse().ok()?;
        self.keys
            .iter()
            .position(|k| k.is_readable() && k.command == command && k.field == field)
    }

    /// The magic line that opens every dump.
    pub fn magic_line(&self) -> String {
        format!("{}={}", self.magic_key, self.magic_version)
    }

    /// Render the `config.txt` template the firmware expands into a dump.
    pub fn dump_template(&self) -> String {
        let mut out = self.magic_line();
        out.push('\n');
        for k in self.keys {
            if let Some(macro_name) = k.macro_name {
                out.push_str(&format!("{}_{}=${}$\n", k.command, k.field, macro_name));
            }
        }
        out
    }
}

impl fmt::Display for DeviceFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

use ValueType::*;

/// bero*fos failover switches.
pub static FOS: DeviceFamily = DeviceFamily {
    name: "fos",
    hwmagics: &[0x0050, 0x00bb],
    magic_key: "bnfos_confmap_magic",
    magic_version: "0.1",
    keys: &[
        key("scenario", "sz", Boolean, 1, Some("sz=%s"), Some("szenario(0)"), "scenario (0=fallback; 1=bypass)"),
        key("mode", "mode", Boolean, 4, Some("mode=%s"), Some("mode(0)"), "relais mode (0=A--D; 1=A--B or A--B,C--D)"),
        key("modedef", "rm", Boolean, 1, Some("rm=%s"), Some("config(1,1)"), "default relais mode (0=A--D; 1=A--B or A--B,C--D)"),
        key("power1", "p0", Boolean, 5, Some("p=0&s=%s"), Some("pwrport(0,0)"), "state of powerport 1 (0=off; 1=on)"),
        key("power1def", "p0", Boolean, 1, Some("p0=%s"), Some("config(2,1)"), "default state of powerport 1 (0=off; 1=on)"),
        key("power2", "p1", Boolean, 5, Some("p=1&s=%s"), Some("pwrport(0,1)"), "state of powerport 2 (0=off; 1=on)"),
        key("power2def", "p1", Boolean, 1, Some("p1=%s"), Some("config(3,1)"), "default state of powerport 2 (0=off; 1=on)"),
        key("hostname", "dn", Hostname, 3, Some("dn=%s"), Some("hostname(1)"), "device hostname"),
        key("address", "ip", Address, 3, Some("ip=%s"), Some("netconf(0)"), "ip address"),
        key("netmask", "nm", Address, 3, Some("nm=%s"), Some("netconf(1)"), "netmask address"),
        key("gateway", "gw", Address, 3, Some("gw=%s"), Some("netconf(2)"), "gateway address"),
        key("dns", "dns", Address, 3, Some("dns=%s"), Some("netconf(3)"), "dns server address"),
        key("dhcp", "dhcp", Boolean, 3, Some("dhcp=%s"), Some("config(4,1)"), "query dhcp server (0=off; 1=on)"),
        key("port", "port", Port, 3, Some("port=%s"), Some("netconf(6)"), "http listen port"),
        key("pwd", "pwd", Boolean, 3, Some("pwd=%s"), Some("config(5,1)"), "http password protection (0=off; 1=on)"),
        key("apwd", "apwd", Secret, 3, Some("apwd=%s"), None, "admin password"),
        key("smtpserv", "mhost", Text, 2, Some("mhost=%s"), Some("netconf(5)"), "smtp server"),
        key("smtpfrom", "mfrom", Text, 2, Some("mfrom=%s"), Some("netconf(7)"), "smtp sender address"),
        key("smtpto", "mto", Text, 2, Some("mto=%s"), Some("netconf(8)"), "smtp destination address"),
        key("smtptest", "XXXXX", Trigger, 7, None, None, "trigger testmail"),
        key("syslog", "log", Boolean, 3, Some("syslog=%s"), Some("config(10,1)"), "syslog logging (0=off; 1=on)"),
        key("slgip", "loghost", Address, 3, Some("slgip=%s"), Some("netconf(9)"), "syslog server ip"),
        key("slgpt", "logport", Port, 3, Some("slgpt=%s"), Some("netconf(10)"), "syslog server port"),
        key("wdog", "wen", Boolean, 6, Some("wen=%s"), Some("wdog(0)"), "watchdog enable (0=off; 1=on)"),
        key("wdogdef", "wen", Boolean, 2, Some("wen=%s"), Some("config(6,1)"), "default watchdog enable (0=off; 1=on)"),
        key("wdogstate", "wstate", Status, 6, Some("wstate=%s"), Some("wdog(0)"), "watchdog state (0=off; 1=on; 2=failure)"),
        key("wdogitime", "wintv", Port, 2, Some("wintv=%s"), Some("config(8,?)"), "watchdog intervall time"),
        key("wdogaudio", "as", Boolean, 2, Some("as=%s"), Some("config(9,1)"), "watchdog audio alarm (0=off; 1=on)"),
        key("wdogmail", "men", Boolean, 2, Some("men=%s"), Some("config(7,1)"), "watchdog alarm mails (0=off; 1=on)"),
        key("wdogrtime", "wretv", Status, 0, None, Some("wdog(2)"), "watchdog remaining time to failure"),
    ],
};

/// bero*rps remote power switches.
pub static RPS: DeviceFamily = DeviceFamily {
    name: "rps",
    hwmagics: &[0x0035, 0x00bb],
    magic_key: "bnrps_confmap_magic",
    magic_version: "0.1",
    keys: &[
        key("power1", "p1", Boolean, 1, Some("p=1&s=%s"), Some("state(0,0)"), "state of powerport 1 (0=off; 1=on)"),
        key("power2", "p2", Boolean, 1, Some("p=2&s=%s"), Some("state(0,1)"), "state of powerport 2 (0=off; 1=on)"),
        key("power3", "p3", Boolean, 1, Some("p=3&s=%s"), Some("state(0,2)"), "state of powerport 3 (0=off; 1=on)"),
        key("power4", "p4", Boolean, 1, Some("p=4&s=%s"), Some("state(0,3)"), "state of powerport 4 (0=off; 1=on)"),
        key("power5", "p5", Boolean, 1, Some("p=5&s=%s"), Some("state(0,4)"), "state of powerport 5 (0=off; 1=on)"),
        key("power6", "p6", Boolean, 1, Some("p=6&s=%s"), Some("state(0,5)"), "state of powerport 6 (0=off; 1=on)"),
        key("power7", "p7", Boolean, 1, Some("p=7&s=%s"), Some("state(0,6)"), "state of powerport 7 (0=off; 1=on)"),
        key("power8", "p8", Boolean, 1, Some("p=8&s=%s"), Some("state(0,7)"), "state of powerport 8 (0=off; 1=on)"),
        key("hostname", "dn", Hostname, 4, Some("a=%s"), Some("hostname(1)"), "device hostname"),
        key("address", "ip", Address, 4, Some("ip=%s"), Some("netcfg(0)"), "ip address"),
        key("netmask", "nm", Address, 4, Some("nm=%s"), Some("netcfg(1)"), "netmask address"),
        key("gateway", "gw", Address, 4, Some("gw=%s"), Some("netcfg(2)"), "gateway address"),
        key("dhcp", "dhcp", Boolean, 4, Some("dhcp=%s"), Some("selchk(0,1,0)"), "query dhcp server (0=off; 1=on)"),
        key("port", "port", Port, 4, Some("port=%s"), Some("netcfg(3)"), "http listen port"),
        key("pwd", "pwd", Boolean, 4, Some("pwd=%s"), Some("selchk(1,1,0)"), "http password protection (0=off; 1=on)"),
        key("apwd", "apwd", Secret, 4, Some("apwd=%s"), None, "admin password"),
        key("upwd", "upwd", Secret, 4, Some("upwd=%s"), None, "user password"),
        key("syslog", "log", Boolean, 4, Some("syslog=%s"), Some("selchk(2,1,0)"), "syslog logging (0=off; 1=on)"),
        key("slgip", "loghost", Address, 4, Some("slgip=%s"), Some("netcfg(4)"), "syslog server ip"),
        key("slgpt", "logport", Port, 4, Some("slgpt=%s"), Some("netcfg(5)"), "syslog server port"),
    ],
};
