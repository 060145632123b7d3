//! Unicast management operations.
//!
//! Each operation sends one request to the device's unicast address and waits
//! once for a reply carrying the same command. There are no retries.

use std::time::Duration;

use bytes::Bytes;

use crate::error::{DeviceError, Result};
use crate::events::Priority;
use crate::protocol::payload::{self, StatusReply};
use crate::protocol::{Command, Packet};
use crate::transport::Transport;
use crate::types::{Device, NetConfig};

pub(crate) fn timeout_error(device: &Device, command: Command) -> DeviceError {
    DeviceError::Timeout {
        device: device.address.to_string(),
        operation: command.name().to_string(),
    }
}

/// Single request/reply exchange; the reply payload is returned.
async fn exchange(
    transport: &Transport,
    device: &Device,
    command: Command,
    body: Bytes,
    wait: Duration,
) -> Result<Bytes> {
    let request = Packet::new(command, body)?;
    let exchange = transport.exchange().await?;

    tracing::debug!(device = %device.mac, address = %device.address, operation = command.name(), "Sending request");

    let reply = exchange
        .request(&request, device.address, wait)
        .await?
        .ok_or_else(|| timeout_error(device, command))?;
    Ok(reply.payload)
}

/// Exchange whose reply carries a device error code.
async fn status_exchange(
    transport: &Transport,
    device: &Device,
    command: Command,
    body: Bytes,
    wait: Duration,
) -> Result<()> {
    let reply = exchange(transport, device, command, body, wait).await?;
    let status = StatusReply::decode(&reply).map_err(|source| DeviceError::Malformed {
        device: device.address.to_string(),
        source,
    })?;

    if status.code != 0 {
        transport.events().log(
            Priority::Notice,
            &format!("Device reported error code {}!", status.code),
        );
        return Err(DeviceError::Rejected {
            device: device.address.to_string(),
            operation: command.name().to_string(),
            code: status.code,
        }
        .into());
    }
    Ok(())
}

/// Check that a device answers.
pub async fn ping(transport: &Transport, device: &Device) -> Result<()> {
    let wait = transport.config().timeout();
    exchange(transport, device, Command::Ping, payload::ping_request(device.mac), wait).await?;
    Ok(())
}

/// Reset the hardware watchdog of a device.
pub async fn kick_watchdog(transport: &Transport, device: &Device) -> Result<()> {
    let wait = transport.config().timeout();
    exchange(
        transport,
        device,
        Command::KickWatchdog,
        payload::kick_request(device.mac),
        wait,
    )
    .await?;
    Ok(())
}

/// Reboot a device. Uses the longer reset timeout.
pub async fn reset(transport: &Transport, device: &Device) -> Result<()> {
    let wait = transport.config().reset_timeout();
    status_exchange(transport, device, Command::Reset, payload::mac_only(device.mac), wait).await
}

/// Push a new network configuration.
pub async fn set_netconf(transport: &Transport, device: &Device, config: &NetConfig) -> Result<()> {
    let wait = transport.config().timeout();
    status_exchange(
        transport,
        device,
        Command::SetNetconf,
        payload::set_netconf_request(device.mac, config),
        wait,
    )
    .await
}
