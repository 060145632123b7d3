//! CLI argument definitions using clap.

use std::net::Ipv4Addr;
use std::path::PathBuf;

use bnctl_core::{Credentials, DeviceFamily, MacAddr, FOS, RPS};
use clap::{Args, Parser, Subcommand, ValueEnum};

/// bnctl - manage bero*fos failover switches and bero*rps power switches
#[derive(Parser, Debug)]
#[command(name = "bnctl")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Reply timeout in seconds
    #[arg(short, long, global = true, default_value = "3", env = "BNCTL_TIMEOUT")]
    pub timeout: u64,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Device family to manage
    #[arg(long, global = true, value_enum, default_value = "fos", env = "BNCTL_FAMILY")]
    pub family: FamilyArg,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FamilyArg {
    /// bero*fos failover switch
    Fos,
    /// bero*rps remote power switch
    Rps,
}

impl FamilyArg {
    pub fn profile(self) -> &'static DeviceFamily {
        match self {
            FamilyArg::Fos => &FOS,
            FamilyArg::Rps => &RPS,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan the network for devices
    Scan(ScanArgs),

    /// Set the network configuration of a device
    Netconf(NetconfArgs),

    /// Ping a device
    Ping(PingArgs),

    /// Kick the watchdog of a device
    Kick(KickArgs),

    /// Reset a device
    Reset(ResetArgs),

    /// Flash a firmware image onto a device in flash mode
    Flash(FlashArgs),

    /// Change a configuration value over HTTP
    Set(SetArgs),

    /// Read a configuration value over HTTP
    Get(GetArgs),

    /// Show the full device configuration
    Show(ShowArgs),

    /// List the configuration keys of the device family
    Keys,

    /// Print the config.txt template of the device family
    Template,
}

// ==================== Shared ====================

/// Device addressed over the UDP management protocol.
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// MAC address of the device (XX:XX:XX:XX:XX:XX)
    #[arg(short, long)]
    pub mac: MacAddr,

    /// Address to send requests to
    #[arg(short = 'H', long, default_value = "255.255.255.255")]
    pub host: Ipv4Addr,
}

/// Device addressed over its HTTP interface.
#[derive(Args, Debug, Clone)]
pub struct HttpTargetArgs {
    /// IP address of the device
    #[arg(short = 'H', long)]
    pub host: Ipv4Addr,

    /// HTTP port of the device
    #[arg(short, long, default_value = "80")]
    pub port: u16,

    /// HTTP credentials as <username>:<password>
    #[arg(short, long, env = "BNCTL_AUTH")]
    pub user: Option<Credentials>,
}

/// Repeat the operation until interrupted.
#[derive(Args, Debug, Clone)]
pub struct RepeatArgs {
    /// Repeat until interrupted
    #[arg(short, long)]
    pub continuous: bool,

    /// Seconds to wait between repetitions
    #[arg(short, long, default_value = "2")]
    pub wait: u64,
}

// ==================== Scan ====================

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Scan a single address instead of broadcasting
    #[arg(short = 'H', long)]
    pub host: Option<Ipv4Addr>,

    #[command(flatten)]
    pub repeat: RepeatArgs,
}

// ==================== Netconf ====================

#[derive(Args, Debug)]
pub struct NetconfArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// New IP address
    #[arg(short, long, default_value = "0.0.0.0")]
    pub ip: Ipv4Addr,

    /// Netmask (classful default for the address when omitted)
    #[arg(short, long)]
    pub netmask: Option<Ipv4Addr>,

    /// Default gateway
    #[arg(short, long, default_value = "0.0.0.0")]
    pub gateway: Ipv4Addr,

    /// Ethernet PHY: 0=auto, 1=10mbit, 2=100mbit, 3=10mbit and 100mbit
    #[arg(short = 'e', long, default_value = "0", value_parser = clap::value_parser!(u8).range(0..=3))]
    pub phy: u8,

    /// Obtain the address via DHCP (0 or 1)
    #[arg(short, long, default_value = "1", value_parser = clap::value_parser!(u8).range(0..=1))]
    pub dhcp: u8,

    /// Require HTTP authentication (0 or 1)
    #[arg(short, long, default_value = "0", value_parser = clap::value_parser!(u8).range(0..=1))]
    pub auth: u8,

    /// HTTP port
    #[arg(short, long, default_value = "80")]
    pub port: u16,
}

// ==================== Ping / Kick / Reset ====================

#[derive(Args, Debug)]
pub struct PingArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    #[command(flatten)]
    pub repeat: RepeatArgs,
}

#[derive(Args, Debug)]
pub struct KickArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    #[command(flatten)]
    pub repeat: RepeatArgs,
}

#[derive(Args, Debug)]
pub struct ResetArgs {
    #[command(flatten)]
    pub target: TargetArgs,
}

// ==================== Flash ====================

#[derive(Args, Debug)]
pub struct FlashArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Firmware image file
    pub file: PathBuf,
}

// ==================== Config ====================

#[derive(Args, Debug)]
pub struct SetArgs {
    #[command(flatten)]
    pub http: HttpTargetArgs,

    /// Assignment as <key>=<value>, or <key> for keys without a value
    pub assignment: String,
}

#[derive(Args, Debug)]
pub struct GetArgs {
    #[command(flatten)]
    pub http: HttpTargetArgs,

    /// Key to read
    pub key: String,

    #[command(flatten)]
    pub repeat: RepeatArgs,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    #[command(flatten)]
    pub http: HttpTargetArgs,

    #[command(flatten)]
    pub repeat: RepeatArgs,
}
