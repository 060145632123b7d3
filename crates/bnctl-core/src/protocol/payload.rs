//! Command payload layouts.
//!
//! All multi-byte fields are big-endian; addresses are raw IPv4 octets.

use std::net::Ipv4Addr;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::FrameError;
use crate::types::{DeviceOptions, DiscoveredDevice, MacAddr, NetConfig, PhyConfig, PhyState, Version};

/// Size of a single firmware page.
pub const FLASH_PAGE_SIZE: usize = 512;

/// Length of a get-netconf reply payload.
pub const NETCONF_REPLY_LEN: usize = 30;

fn ensure_len(what: &'static str, payload: &[u8], need: usize) -> Result<(), FrameError> {
    if payload.len() < need {
        return Err(FrameError::Truncated {
            what,
            len: payload.len(),
            need,
        });
    }
    Ok(())
}

fn get_mac(buf: &mut impl Buf) -> MacAddr {
    let mut mac = [0u8; 6];
    buf.copy_to_slice(&mut mac);
    MacAddr(mac)
}

fn get_ipv4(buf: &mut impl Buf) -> Ipv4Addr {
    let mut octets = [0u8; 4];
    buf.copy_to_slice(&mut octets);
    Ipv4Addr::from(octets)
}

/// Payload addressed only by MAC (reset request).
pub fn mac_only(mac: MacAddr) -> Bytes {
    Bytes::copy_from_slice(&mac.0)
}

/// Ping request: MAC followed by a zero sequence number.
pub fn ping_request(mac: MacAddr) -> Bytes {
    let mut buf = BytesMut::with_capacity(8);
    buf.put_slice(&mac.0);
    buf.put_u16(0);
    buf.freeze()
}

/// Kick-watchdog request: MAC followed by a zero byte.
pub fn kick_request(mac: MacAddr) -> Bytes {
    let mut buf = BytesMut::with_capacity(7);
    buf.put_slice(&mac.0);
    buf.put_u8(0);
    buf.freeze()
}

pub fn set_netconf_request(mac: MacAddr, config: &NetConfig) -> Bytes {
    let mut buf = BytesMut::with_capacity(22);
    buf.put_slice(&mac.0);
    buf.put_slice(&config.address.octets());
    buf.put_slice(&config.netmask.octets());
    buf.put_slice(&config.gateway.octets());
    buf.put_u8(config.phy_config.0);
    buf.put_u8(config.options.0);
    buf.put_u16(config.http_port);
    buf.freeze()
}

pub fn flash_prepare_request(mac: MacAddr, pages: u16, image_checksum: u8) -> Bytes {
    let mut buf = BytesMut::with_capacity(9);
    buf.put_slice(&mac.0);
    buf.put_u16(pages);
    buf.put_u8(image_checksum);
    buf.freeze()
}

/// Flash page request. `data` shorter than a page is zero-padded.
pub fn flash_page_request(mac: MacAddr, index: u16, data: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(8 + FLASH_PAGE_SIZE);
    buf.put_slice(&mac.0);
    buf.put_u16(index);
    let take = data.len().min(FLASH_PAGE_SIZE);
    buf.put_slice(&data[..take]);
    buf.put_bytes(0, FLASH_PAGE_SIZE - take);
    buf.freeze()
}

/// Device status carried by set-netconf and reset replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusReply {
    pub mac: MacAddr,
    pub code: u8,
}

impl StatusReply {
    pub fn decode(payload: &[u8]) -> Result<Self, FrameError> {
        ensure_len("status", payload, 7)?;
        let mut buf = payload;
        let mac = get_mac(&mut buf);
        let code = buf.get_u8();
        Ok(Self { mac, code })
    }
}

/// Decode a get-netconf reply.
pub fn decode_netconf_reply(payload: &[u8]) -> Result<DiscoveredDevice, FrameError> {
    ensure_len("get-netconf", payload, NETCONF_REPLY_LEN)?;
    let mut buf = payload;

    let mac = get_mac(&mut buf);
    let hwmagic = buf.get_u16();
    let bootloader = Version {
        major: buf.get_u8(),
        minor: buf.get_u8(),
    };
    let firmware = Version {
        major: buf.get_u8(),
        minor: buf.get_u8(),
    };
    let devmode = buf.get_u8();
    let address = get_ipv4(&mut buf);
    let netmask = get_ipv4(&mut buf);
    let gateway = get_ipv4(&mut buf);
    let phy_config = PhyConfig(buf.get_u8());
    let phy_state = PhyState(buf.get_u8());
    let options = DeviceOptions(buf.get_u8());
    let http_port = buf.get_u16();

    Ok(DiscoveredDevice {
        mac,
        hwmagic,
        bootloader,
        firmware,
        flash_mode: devmode != 0,
        address,
        netmask,
        gateway,
        phy_config,
        phy_state,
        options,
        http_port,
    })
}

/// Encode a get-netconf reply, as a device would answer a scan.
pub fn encode_netconf_reply(device: &DiscoveredDevice) -> Bytes {
    let mut buf = BytesMut::with_capacity(NETCONF_REPLY_LEN);
    buf.put_slice(&device.mac.0);
    buf.put_u16(device.hwmagic);
    buf.put_u8(device.bootloader.major);
    buf.put_u8(device.bootloader.minor);
    buf.put_u8(device.firmware.major);
    buf.put_u8(device.firmware.minor);
    buf.put_u8(u8::from(device.flash_mode));
    buf.put_slice(&device.address.octets());
    buf.put_slice(&device.netmask.octets());
    buf.put_slice(&device.gateway.octets());
    buf.put_u8(device.phy_config.0);
    buf.put_u8(device.phy_state.0);
    buf.put_u8(device.options.0);
    buf.put_u16(device.http_port);
    buf.freeze()
}
