//! Shared fixtures: an in-process UDP device and a one-shot HTTP responder.

#![allow(dead_code)]

use std::net::Ipv4Addr;
use std::time::Duration;

use bnctl_core::protocol::payload::encode_netconf_reply;
use bnctl_core::protocol::{Command, Packet};
use bnctl_core::types::{
    DeviceOptions, DiscoveredDevice, MacAddr, PhyConfig, PhyState, Version,
};
use bnctl_core::{Transport, TransportConfig};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, UdpSocket};
use tokio::task::JoinHandle;

/// A UDP socket on loopback standing in for one or more devices.
pub struct MockDevice {
    pub socket: UdpSocket,
}

impl MockDevice {
    pub async fn new() -> Self {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        Self { socket }
    }

    pub fn port(&self) -> u16 {
        self.socket.local_addr().unwrap().port()
    }

    /// Transport whose device port points at this mock.
    pub async fn transport(&self, timeout_ms: u64) -> Transport {
        let config = TransportConfig {
            device_port: self.port(),
            timeout_ms,
            reset_timeout_ms: timeout_ms,
            ..TransportConfig::default()
        };
        Transport::bind(config).await.unwrap()
    }
}

/// Receive one frame with a deadline. Returns the decoded packet and sender.
pub async fn recv_frame(
    socket: &UdpSocket,
    wait: Duration,
) -> Option<(Packet, std::net::SocketAddr)> {
    let mut buf = vec![0u8; 1500];
    let (len, src) = tokio::time::timeout(wait, socket.recv_from(&mut buf))
        .await
        .ok()?
        .ok()?;
    Some((Packet::decode(&buf[..len]).unwrap(), src))
}

pub fn mac(last: u8) -> MacAddr {
    MacAddr([0x00, 0x50, 0xc2, 0x00, 0x00, last])
}

pub fn discovered(last: u8, hwmagic: u16) -> DiscoveredDevice {
    DiscoveredDevice {
        mac: mac(last),
        hwmagic,
        bootloader: Version { major: 1, minor: 0 },
        firmware: Version { major: 2, minor: 3 },
        flash_mode: false,
        address: Ipv4Addr::new(192, 168, 0, last),
        netmask: Ipv4Addr::new(255, 255, 255, 0),
        gateway: Ipv4Addr::new(192, 168, 0, 1),
        phy_config: PhyConfig::AUTO,
        phy_state: PhyState(0x07),
        options: DeviceOptions::DHCP,
        http_port: 80,
    }
}

/// Encoded get-netconf reply frame.
pub fn netconf_frame(device: &DiscoveredDevice) -> Vec<u8> {
    Packet::new(Command::GetNetconf, encode_netconf_reply(device))
        .unwrap()
        .encode()
        .to_vec()
}

/// Serve a single HTTP request with `status` and a chunked body made of
/// `chunks`. The task returns the raw request head.
pub async fn serve_once(status: u16, chunks: Vec<&'static str>) -> (u16, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();

        let mut head = Vec::new();
        let mut buf = [0u8; 1024];
        while !head.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).await.unwrap_or(0);
            if n == 0 {
                break;
            }
            head.extend_from_slice(&buf[..n]);
        }

        let reason = match status {
            200 => "OK",
            401 => "Unauthorized",
            404 => "Not Found",
            _ => "Internal Server Error",
        };
        let header = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: text/plain\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n",
            status, reason
        );
        let _ = stream.write_all(header.as_bytes()).await;
        for chunk in chunks {
            let _ = stream
                .write_all(format!("{:x}\r\n{}\r\n", chunk.len(), chunk).as_bytes())
                .await;
            let _ = stream.flush().await;
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        let _ = stream.write_all(b"0\r\n\r\n").await;
        let _ = stream.shutdown().await;

        String::from_utf8_lossy(&head).into_owned()
    });

    (port, handle)
}
