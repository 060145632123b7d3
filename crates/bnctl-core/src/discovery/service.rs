//! Discovery engine.
//!
//! One get-netconf request is sent to the broadcast address (or a given
//! address) and replies are collected until the deadline. The exchange lock
//! is held for the whole collection window.

use std::net::Ipv4Addr;
use std::time::Duration;

use bytes::Bytes;
use tokio::time::Instant;

use crate::error::{DeviceError, Result};
use crate::keymap::DeviceFamily;
use crate::protocol::payload::decode_netconf_reply;
use crate::protocol::{Command, Packet};
use crate::transport::Transport;
use crate::types::DiscoveredDevice;

/// Returned by a scan callback to keep collecting or stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanControl {
    Continue,
    Abort,
}

/// Scan for devices of `family`.
///
/// `on_device` is called once per matching reply, in order of arrival.
/// Replies that fail to decode or carry a foreign hardware identifier are
/// ignored. Reaching the deadline is a normal end of the scan, and so is an
/// [`ScanControl::Abort`] from the callback.
pub async fn scan<F>(
    transport: &Transport,
    family: &DeviceFamily,
    target: Option<Ipv4Addr>,
    wait: Duration,
    mut on_device: F,
) -> Result<()>
where
    F: FnMut(DiscoveredDevice) -> ScanControl,
{
    let address = target.unwrap_or(Ipv4Addr::BROADCAST);
    let request = Packet::new(Command::GetNetconf, Bytes::new())?;

    let exchange = transport.exchange().await?;
    exchange.send(&request, address).await?;

    let deadline = Instant::now() + wait;
    let mut matched = 0usize;

    while let Some((reply, src)) = exchange.recv(Command::GetNetconf, deadline).await? {
        let device = match decode_netconf_reply(&reply.payload) {
            Ok(device) => device,
            Err(e) => {
                tracing::trace!(remote = %src, error = %e, "Ignoring netconf reply");
                continue;
            }
        };

        if !family.accepts(device.hwmagic) {
            tracing::trace!(
                remote = %src,
                hwmagic = device.hwmagic,
                family = family.name,
                "Ignoring device of another family"
            );
            continue;
        }

        matched += 1;
        tracing::debug!(device = %device.mac, address = %device.address, "Device found");

        if on_device(device) == ScanControl::Abort {
            tracing::debug!(matched, "Scan aborted by caller");
            return Ok(());
        }
    }

    tracing::debug!(matched, family = family.name, "Scan finished");
    Ok(())
}

/// Collect every device that answers within `wait`.
pub async fn discover(
    transport: &Transport,
    family: &DeviceFamily,
    target: Option<Ipv4Addr>,
    wait: Duration,
) -> Result<Vec<DiscoveredDevice>> {
    let mut devices = Vec::new();
    scan(transport, family, target, wait, |device| {
        devices.push(device);
        ScanControl::Continue
    })
    .await?;
    Ok(devices)
}

/// Query one address and return the first matching device.
pub async fn probe(
    transport: &Transport,
    family: &DeviceFamily,
    address: Ipv4Addr,
    wait: Duration,
) -> Result<DiscoveredDevice> {
    let mut found = None;
    scan(transport, family, Some(address), wait, |device| {
        found = Some(device);
        ScanControl::Abort
    })
    .await?;
    found.ok_or_else(|| DeviceError::NotFound(address.to_string()).into())
}
