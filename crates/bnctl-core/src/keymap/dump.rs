//! Dump path of the key-mapping codec.
//!
//! A device serves its configuration as `config.txt`: a magic line
//! `<magic-key>=<version>` followed by `<command>_<field>=<value>` lines.
//! [`DumpParser`] consumes the body chunk by chunk; a chunk may end anywhere,
//! including in the middle of a line.

use std::fmt;
use std::net::Ipv4Addr;

use bytes::{Buf, BytesMut};
use serde::{Serialize, Serializer};

use crate::error::ConfigError;

use super::descriptor::{DeviceFamily, KeyDescriptor, ValueType};

/// A decoded configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValue {
    Flag(bool),
    Address(Ipv4Addr),
    Text(String),
    /// Write-only value, never reported.
    Redacted,
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Flag(on) => f.write_str(if *on { "1" } else { "0" }),
            ConfigValue::Address(addr) => write!(f, "{}", addr),
            ConfigValue::Text(s) => f.write_str(s),
            ConfigValue::Redacted => Ok(()),
        }
    }
}

impl Serialize for ConfigValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ConfigValue::Flag(on) => serializer.serialize_bool(*on),
            ConfigValue::Redacted => serializer.serialize_none(),
            other => serializer.collect_str(other),
        }
    }
}

fn decode_value(value_type: ValueType, raw: &str) -> ConfigValue {
    match value_type {
        ValueType::Boolean => ConfigValue::Flag(raw.contains('1') || raw.contains("checked")),
        ValueType::Address => {
            ConfigValue::Address(raw.trim().parse().unwrap_or(Ipv4Addr::UNSPECIFIED))
        }
        ValueType::Secret => ConfigValue::Redacted,
        _ => ConfigValue::Text(raw.to_string()),
    }
}

/// Decoded configuration of one device.
#[derive(Debug, Clone)]
pub struct ConfigDump {
    family: &'static DeviceFamily,
    version: String,
    values: Vec<Option<ConfigValue>>,
}

impl ConfigDump {
    pub fn family(&self) -> &'static DeviceFamily {
        self.family
    }

    /// Version announced by the magic line.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Warning for a dump whose format version differs from the expected one.
    /// Values are decoded regardless.
    pub fn version_mismatch(&self) -> Option<ConfigError> {
        (self.version != self.family.magic_version).then(|| ConfigError::VersionMismatch {
            expected: self.family.magic_version.to_string(),
            found: self.version.clone(),
        })
    }

    pub fn get(&self, keyword: &str) -> Option<&ConfigValue> {
        self.family
            .position(keyword)
            .and_then(|i| self.values[i].as_ref())
    }

    /// Values present in the dump, in table order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static KeyDescriptor, &ConfigValue)> + '_ {
        self.family
            .keys
            .iter()
            .zip(self.values.iter())
            .filter_map(|(k, v)| v.as_ref().map(|v| (k, v)))
    }

    pub fn len(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Serialize for ConfigDump {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key.keyword, value)?;
        }
        map.end()
    }
}

/// Longest dump line kept; longer lines are dropped.
pub const MAX_LINE_LEN: usize = 4096;

/// Incremental parser for configuration dumps.
#[derive(Debug)]
pub struct DumpParser {
    family: &'static DeviceFamily,
    source: String,
    buffer: BytesMut,
    /// Inside a dropped line, waiting for its end.
    skipping: bool,
    version: Option<String>,
    values: Vec<Option<ConfigValue>>,
}

impl DumpParser {
    pub fn new(family: &'static DeviceFamily) -> Self {
        Self {
            family,
            source: "device".to_string(),
            buffer: BytesMut::new(),
            skipping: false,
            version: None,
            values: vec![None; family.keys.len()],
        }
    }

    /// Name the dump's origin in errors.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Whether the magic line has been seen.
    pub fn magic_seen(&self) -> bool {
        self.version.is_some()
    }

    /// Append a body chunk and consume every line it completes.
    pub fn feed(&mut self, mut chunk: &[u8]) {
        if self.skipping {
            match chunk.iter().position(|b| *b == b'\n') {
                Some(end) => {
                    chunk = &chunk[end + 1..];
                    self.skipping = false;
                }
                None => return,
            }
        }
        self.buffer.extend_from_slice(chunk);

        while let Some(end) = self.buffer.iter().position(|b| *b == b'\n') {
            let line = self.buffer.split_to(end);
            self.buffer.advance(1);

            if line.len() > MAX_LINE_LEN {
                tracing::debug!(len = line.len(), "Dropping overlong dump line");
                continue;
            }
            let line = String::from_utf8_lossy(&line);
            self.consume_line(line.strip_suffix('\r').unwrap_or(&line));
        }

        if self.buffer.len() > MAX_LINE_LEN {
            tracing::debug!(len = self.buffer.len(), "Dropping overlong dump line");
            self.buffer.clear();
            self.skipping = true;
        }
    }

    fn consume_line(&mut self, line: &str) {
        let Some((key, value)) = line.split_once('=') else {
            return;
        };

        if key == self.family.magic_key {
            if value != self.family.magic_version {
                tracing::debug!(
                    expected = self.family.magic_version,
                    found = value,
                    "Configuration version differs"
                );
            }
            self.version = Some(value.to_string());
            return;
        }

        if self.version.is_none() {
            return;
        }

        if let Some(index) = self.family.dump_position(key) {
            let value_type = self.family.keys[index].value_type;
            self.values[index] = Some(decode_value(value_type, value));
        }
    }

    /// Finish parsing. An unterminated trailing line is discarded.
    pub fn finish(self) -> Result<ConfigDump, ConfigError> {
        let version = self
            .version
            .ok_or(ConfigError::NoConfiguration { ip: self.source })?;

        Ok(ConfigDump {
            family: self.family,
            version,
            values: self.values,
        })
    }
}
