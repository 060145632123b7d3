//! UDP transport for the GBL4 management protocol.
//!
//! A [`Transport`] owns one UDP endpoint. Every request/response conversation
//! holds the transport's exchange lock from the first send until the last
//! reply is read, so at most one conversation is in flight at a time and
//! replies never need to be matched to a request id.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;
use tokio::sync::{MappedMutexGuard, Mutex, MutexGuard};
use tokio::time::{timeout_at, Instant};

use crate::error::{CoreError, DeviceError, Result};
use crate::events::{default_sink, EventSink};
use crate::protocol::packet::MAX_FRAME_LEN;
use crate::protocol::{Command, Packet};

/// Well-known management port devices listen on.
pub const DEVICE_PORT: u16 = 50123;

/// Default wait for a unicast reply.
pub const DEFAULT_TIMEOUT_MS: u64 = 3_000;

/// Default wait for a reset reply; devices erase flash before answering.
pub const DEFAULT_RESET_TIMEOUT_MS: u64 = 8_000;

/// Transport settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransportConfig {
    /// Local UDP port, 0 for an ephemeral port.
    pub local_port: u16,
    /// Destination port on the devices.
    pub device_port: u16,
    /// Reply timeout for scans and unicast operations.
    pub timeout_ms: u64,
    /// Reply timeout for reset.
    pub reset_timeout_ms: u64,
}

impl TransportConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn reset_timeout(&self) -> Duration {
        Duration::from_millis(self.reset_timeout_ms)
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            local_port: 0,
            device_port: DEVICE_PORT,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            reset_timeout_ms: DEFAULT_RESET_TIMEOUT_MS,
        }
    }
}

/// Create the management socket with socket2 so broadcast can be toggled.
fn create_socket(port: u16) -> std::result::Result<std::net::UdpSocket, std::io::Error> {
    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;

    let addr = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port));
    socket.bind(&addr.into())?;

    socket.set_nonblocking(true)?;

    Ok(socket.into())
}

/// Process-wide UDP endpoint.
pub struct Transport {
    config: TransportConfig,
    socket: Mutex<Option<UdpSocket>>,
    events: Arc<dyn EventSink>,
}

impl Transport {
    /// Create an uninitialized transport.
    pub fn new(config: TransportConfig) -> Self {
        Self {
            config,
            socket: Mutex::new(None),
            events: default_sink(),
        }
    }

    /// Replace the event sink.
    pub fn with_event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// Create and initialize a transport in one step.
    pub async fn bind(config: TransportConfig) -> Result<Self> {
        let transport = Self::new(config);
        transport.init().await?;
        Ok(transport)
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    pub fn events(&self) -> &Arc<dyn EventSink> {
        &self.events
    }

    /// Bind the UDP endpoint. Calling this on an initialized transport is a no-op.
    pub async fn init(&self) -> Result<()> {
        let mut socket = self.socket.lock().await;
        if socket.is_some() {
            return Ok(());
        }

        let std_socket = create_socket(self.config.local_port).map_err(|e| {
            tracing::error!(port = self.config.local_port, error = %e, "Failed to bind management socket");
            CoreError::Io(e)
        })?;
        let udp = UdpSocket::from_std(std_socket)?;

        tracing::debug!(local_addr = ?udp.local_addr().ok(), "Management socket bound");
        *socket = Some(udp);
        Ok(())
    }

    /// Close the UDP endpoint. Calling this on a closed transport is a no-op.
    pub async fn teardown(&self) {
        if self.socket.lock().await.take().is_some() {
            tracing::debug!("Management socket closed");
        }
    }

    pub async fn is_initialized(&self) -> bool {
        self.socket.lock().await.is_some()
    }

    pub async fn local_addr(&self) -> Result<SocketAddr> {
        let exchange = self.exchange().await?;
        Ok(exchange.socket.local_addr()?)
    }

    /// Take the exchange lock. Held for the whole conversation.
    pub async fn exchange(&self) -> Result<Exchange<'_>> {
        let guard = self.socket.lock().await;
        let socket = MutexGuard::try_map(guard, |s| s.as_mut())
            .map_err(|_| DeviceError::NotInitialized)?;
        Ok(Exchange {
            socket,
            device_port: self.config.device_port,
        })
    }
}

/// Exclusive access to the endpoint for one request/response conversation.
pub struct Exchange<'a> {
    socket: MappedMutexGuard<'a, UdpSocket>,
    device_port: u16,
}

impl Exchange<'_> {
    /// Send a frame to `address`. Broadcast is enabled on the socket only for
    /// the limited broadcast address.
    pub async fn send(&self, packet: &Packet, address: Ipv4Addr) -> Result<()> {
        let broadcast = address.is_broadcast();
        self.socket.set_broadcast(broadcast)?;

        let dest = SocketAddr::V4(SocketAddrV4::new(address, self.device_port));
        let frame = packet.encode();

        tracing::trace!(
            remote = %dest,
            command = packet.command.name(),
            bytes = frame.len(),
            broadcast,
            "Sending frame"
        );

        self.socket.send_to(&frame, dest).await.map_err(|e| {
            tracing::error!(remote = %dest, error = %e, "Failed to send frame");
            CoreError::Io(e)
        })?;
        Ok(())
    }

    /// Wait until `deadline` for a valid frame carrying `command`.
    ///
    /// Frames that fail to decode or carry another command are dropped.
    /// Returns `Ok(None)` once the deadline passes.
    pub async fn recv(&self, command: Command, deadline: Instant) -> Result<Option<(Packet, SocketAddr)>> {
        let mut buf = vec![0u8; MAX_FRAME_LEN];

        loop {
            let (len, src) = match timeout_at(deadline, self.socket.recv_from(&mut buf)).await {
                Ok(Ok(received)) => received,
                Ok(Err(e)) => {
                    tracing::error!(error = %e, "Failed to receive frame");
                    return Err(CoreError::Io(e));
                }
                Err(_) => return Ok(None),
            };

            match Packet::decode(&buf[..len]) {
                Ok(packet) if packet.command == command => {
                    tracing::trace!(remote = %src, command = command.name(), "Received reply");
                    return Ok(Some((packet, src)));
                }
                Ok(packet) => {
                    tracing::trace!(
                        remote = %src,
                        expected = command.name(),
                        got = packet.command.name(),
                        "Ignoring reply for another command"
                    );
                }
                Err(e) => {
                    tracing::trace!(remote = %src, error = %e, "Discarding malformed frame");
                }
            }
        }
    }

    /// Send `packet` and wait up to `wait` for one matching reply.
    pub async fn request(
        &self,
        packet: &Packet,
        address: Ipv4Addr,
        wait: Duration,
    ) -> Result<Option<Packet>> {
        self.send(packet, address).await?;
        let deadline = Instant::now() + wait;
        Ok(self.recv(packet.command, deadline).await?.map(|(p, _)| p))
    }
}
