//! Shared device types.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use serde::{Serialize, Serializer};

/// Default HTTP port of the configuration interface.
pub const DEFAULT_HTTP_PORT: u16 = 80;

/// Six-byte link-layer address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MacAddr(pub [u8; 6]);

impl MacAddr {
    pub fn octets(&self) -> [u8; 6] {
        self.0
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = self.0;
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            m[0], m[1], m[2], m[3], m[4], m[5]
        )
    }
}

/// Error returned when a MAC address string is not `XX:XX:XX:XX:XX:XX`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid mac address '{0}', expecting XX:XX:XX:XX:XX:XX notation")]
pub struct ParseMacError(pub String);

impl FromStr for MacAddr {
    type Err = ParseMacError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseMacError(s.to_string());

        if s.len() != 17 {
            return Err(err());
        }

        let mut octets = [0u8; 6];
        let mut parts = s.split(':');
        for octet in octets.iter_mut() {
            let part = parts.next().ok_or_else(err)?;
            if part.len() != 2 {
                return Err(err());
            }
            *octet = u8::from_str_radix(part, 16).map_err(|_| err())?;
        }

        if parts.next().is_some() {
            return Err(err());
        }

        Ok(MacAddr(octets))
    }
}

impl Serialize for MacAddr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Basic-auth credential pair for the HTTP configuration interface.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Error returned when credentials are not given as `<user>:<password>`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid authentication data, expecting <username>:<password>")]
pub struct ParseCredentialsError;

impl FromStr for Credentials {
    type Err = ParseCredentialsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (user, pass) = s.split_once(':').ok_or(ParseCredentialsError)?;
        if user.is_empty() {
            return Err(ParseCredentialsError);
        }
        Ok(Credentials::new(user, pass))
    }
}

/// Identity of a single device, supplied by the caller for every operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    pub mac: MacAddr,
    pub address: Ipv4Addr,
    pub port: u16,
    pub credentials: Option<Credentials>,
}

impl Device {
    pub fn new(mac: MacAddr, address: Ipv4Addr) -> Self {
        Self {
            mac,
            address,
            port: DEFAULT_HTTP_PORT,
            credentials: None,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }
}

impl Default for Device {
    fn default() -> Self {
        Device::new(MacAddr::default(), Ipv4Addr::BROADCAST)
    }
}

impl From<&DiscoveredDevice> for Device {
    fn from(d: &DiscoveredDevice) -> Self {
        Device::new(d.mac, d.address).with_port(d.http_port)
    }
}

/// Bootloader or firmware version as reported by a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}.{}", self.major, self.minor)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Ethernet PHY probing configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct PhyConfig(pub u8);

impl PhyConfig {
    pub const PROBE_10MBIT: PhyConfig = PhyConfig(0x01);
    pub const PROBE_100MBIT: PhyConfig = PhyConfig(0x02);
    pub const AUTO: PhyConfig = PhyConfig(0x03);

    pub fn contains(self, other: PhyConfig) -> bool {
        self.0 & other.0 == other.0
    }
}

impl fmt::Display for PhyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == PhyConfig::AUTO {
            return write!(f, "PROBE_AUTO");
        }
        let mut names = Vec::new();
        if self.contains(PhyConfig::PROBE_10MBIT) {
            names.push("PROBE_10MBIT");
        }
        if self.contains(PhyConfig::PROBE_100MBIT) {
            names.push("PROBE_100MBIT");
        }
        write!(f, "{}", names.join(" | "))
    }
}

/// Ethernet link state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct PhyState(pub u8);

impl PhyState {
    pub const LINK_BEAT: PhyState = PhyState(0x01);
    pub const LINK_100MBIT: PhyState = PhyState(0x02);
    pub const LINK_FDX: PhyState = PhyState(0x04);

    pub fn contains(self, other: PhyState) -> bool {
        self.0 & other.0 == other.0
    }
}

impl fmt::Display for PhyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = Vec::new();
        if self.contains(PhyState::LINK_BEAT) {
            names.push("LINK_BEAT");
        }
        if self.contains(PhyState::LINK_100MBIT) {
            names.push("LINK_100MBIT");
        } else {
            names.push("LINK_10MBIT");
        }
        if self.contains(PhyState::LINK_FDX) {
            names.push("LINK_FDX");
        }
        write!(f, "{}", names.join(" | "))
    }
}

/// Option bits of the network configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct DeviceOptions(pub u8);

impl DeviceOptions {
    pub const DHCP: DeviceOptions = DeviceOptions(0x01);
    pub const HTTP_AUTH: DeviceOptions = DeviceOptions(0x02);
    pub const IP_ACL: DeviceOptions = DeviceOptions(0x04);

    pub fn contains(self, other: DeviceOptions) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn set(&mut self, other: DeviceOptions, on: bool) {
        if on {
            self.0 |= other.0;
        } else {
            self.0 &= !other.0;
        }
    }
}

impl fmt::Display for DeviceOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = Vec::new();
        if self.contains(DeviceOptions::DHCP) {
            names.push("OPT_DHCP");
        }
        if self.contains(DeviceOptions::HTTP_AUTH) {
            names.push("OPT_HTTP_AUTH");
        }
        if self.contains(DeviceOptions::IP_ACL) {
            names.push("OPT_IP_ACL");
        }
        write!(f, "{}", names.join(" | "))
    }
}

/// Attributes of a device as reported in a get-netconf reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveredDevice {
    pub mac: MacAddr,
    pub hwmagic: u16,
    pub bootloader: Version,
    pub firmware: Version,
    pub flash_mode: bool,
    pub address: Ipv4Addr,
    pub netmask: Ipv4Addr,
    pub gateway: Ipv4Addr,
    pub phy_config: PhyConfig,
    pub phy_state: PhyState,
    pub options: DeviceOptions,
    pub http_port: u16,
}

impl DiscoveredDevice {
    pub fn mode_name(&self) -> &'static str {
        if self.flash_mode {
            "FLASH MODE"
        } else {
            "OPERATIONAL"
        }
    }
}

/// New network configuration pushed with set-netconf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetConfig {
    pub address: Ipv4Addr,
    pub netmask: Ipv4Addr,
    pub gateway: Ipv4Addr,
    pub phy_config: PhyConfig,
    pub options: DeviceOptions,
    pub http_port: u16,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            address: Ipv4Addr::UNSPECIFIED,
            netmask: Ipv4Addr::new(255, 255, 255, 0),
            gateway: Ipv4Addr::UNSPECIFIED,
            phy_config: PhyConfig::AUTO,
            options: DeviceOptions::DHCP,
            http_port: DEFAULT_HTTP_PORT,
        }
    }
}

/// Classful default netmask for an address, used when none is given.
pub fn classful_netmask(address: Ipv4Addr) -> Ipv4Addr {
    match address.octets()[0] {
        0..=127 => Ipv4Addr::new(255, 0, 0, 0),
        128..=191 => Ipv4Addr::new(255, 255, 0, 0),
        _ => Ipv4Addr::new(255, 255, 255, 0),
    }
}
