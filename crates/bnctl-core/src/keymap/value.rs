//! Set path of the key-mapping codec: value validation and command paths.

use std::net::Ipv4Addr;

use crate::error::ConfigError;

use super::descriptor::{DeviceFamily, KeyDescriptor, ValueType, MAX_SECRET_LEN};

const TRUE_WORDS: [&str; 4] = ["yes", "y", "true", "1"];
const FALSE_WORDS: [&str; 4] = ["no", "n", "false", "0"];

/// A validated value ready to be sent to a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedSet {
    descriptor: &'static KeyDescriptor,
    value: Option<String>,
}

impl PreparedSet {
    pub fn descriptor(&self) -> &'static KeyDescriptor {
        self.descriptor
    }

    /// Normalized value; `None` for triggers.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Query part of the HTTP command, e.g. `?cmd=3&dhcp=0`.
    pub fn command_path(&self) -> String {
        match (self.descriptor.template, self.value.as_deref()) {
            (Some(template), Some(value)) => format!(
                "?cmd={}&{}",
                self.descriptor.command,
                template.replacen("%s", &escape(value), 1)
            ),
            _ => format!("?cmd={}", self.descriptor.command),
        }
    }
}

/// Validate `value` for `keyword` and normalize it for transmission.
pub fn prepare_set(
    family: &'static DeviceFamily,
    keyword: &str,
    value: Option<&str>,
) -> Result<PreparedSet, ConfigError> {
    let descriptor = family.lookup(keyword)?;
    let value = normalize(descriptor, value)?;
    Ok(PreparedSet { descriptor, value })
}

/// Apply the type rules of `descriptor` to a user supplied value.
pub fn normalize(descriptor: &KeyDescriptor, value: Option<&str>) -> Result<Option<String>, ConfigError> {
    let key = descriptor.keyword;
    let err = |msg: &str| ConfigError::validation(key, msg);

    match descriptor.value_type {
        ValueType::Boolean => {
            let v = value.ok_or_else(|| err("Value has to be 0 or 1"))?;
            if TRUE_WORDS.iter().any(|w| w.eq_ignore_ascii_case(v)) {
                Ok(Some("1".to_string()))
            } else if FALSE_WORDS.iter().any(|w| w.eq_ignore_ascii_case(v)) {
                Ok(Some("0".to_string()))
            } else {
                Err(err("Value has to be 0 or 1"))
            }
        }
        ValueType::Address => {
            let addr: Ipv4Addr = value
                .and_then(|v| v.trim().parse().ok())
                .ok_or_else(|| err("No valid ip address"))?;
            Ok(Some(addr.to_string()))
        }
        ValueType::Hostname => match value {
            Some(v) if !v.is_empty() => Ok(Some(v.to_string())),
            _ => Err(err("Host not specified")),
        },
        ValueType::Text => match value {
            Some(v) if !v.is_empty() => Ok(Some(v.to_string())),
            _ => Err(err("Value not specified")),
        },
        ValueType::Port => {
            let port = value
                .and_then(|v| v.trim().parse::<u32>().ok())
                .filter(|p| (1..=u32::from(u16::MAX)).contains(p))
                .ok_or_else(|| err("Value not in range 1 to 65535"))?;
            Ok(Some(port.to_string()))
        }
        ValueType::Secret => match value {
            None => Err(err("Password not specified")),
            Some(v) if v.len() > MAX_SECRET_LEN => {
                Err(err(&format!("Password exceeded length {}", MAX_SECRET_LEN)))
            }
            Some(v) => Ok(Some(v.to_string())),
        },
        ValueType::Trigger => Ok(None),
        ValueType::Status => Err(err("Key is read-only")),
    }
}

/// Percent-escape everything except unreserved characters.
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for b in value.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~') {
            out.push(char::from(b));
        } else {
            out.push_str(&format!("%{:02X}", b));
        }
    }
    out
}
