//! Netconf command implementation.

use bnctl_core::device::set_netconf;
use bnctl_core::types::{classful_netmask, DeviceOptions, NetConfig, PhyConfig};

use super::{target_device, Context};
use crate::cli::NetconfArgs;
use crate::error::CliError;

fn phy_config(value: u8) -> PhyConfig {
    match value {
        1 => PhyConfig::PROBE_10MBIT,
        2 => PhyConfig::PROBE_100MBIT,
        _ => PhyConfig::AUTO,
    }
}

/// Build the configuration pushed to the device.
pub fn net_config(args: &NetconfArgs) -> NetConfig {
    let mut options = DeviceOptions::default();
    options.set(DeviceOptions::DHCP, args.dhcp == 1);
    options.set(DeviceOptions::HTTP_AUTH, args.auth == 1);

    NetConfig {
        address: args.ip,
        netmask: args.netmask.unwrap_or_else(|| classful_netmask(args.ip)),
        gateway: args.gateway,
        phy_config: phy_config(args.phy),
        options,
        http_port: args.port,
    }
}

/// Run the netconf command
pub async fn run_netconf(args: NetconfArgs, ctx: &Context) -> Result<(), CliError> {
    let formatter = ctx.formatter();
    let transport = ctx.transport().await?;
    let device = target_device(&args.target);

    set_netconf(&transport, &device, &net_config(&args)).await?;
    println!(
        "{}",
        formatter.format_result(
            "netconf",
            &device.mac.to_string(),
            true,
            "Setting network configuration succeeded!"
        )
    );
    Ok(())
}
