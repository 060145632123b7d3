//! Command implementations.

pub mod config;
pub mod flash;
pub mod kick;
pub mod keys;
pub mod netconf;
pub mod ping;
pub mod reset;
pub mod scan;

pub use config::{run_get, run_set, run_show};
pub use flash::run_flash;
pub use keys::{run_keys, run_template};
pub use kick::run_kick;
pub use netconf::run_netconf;
pub use ping::run_ping;
pub use reset::run_reset;
pub use scan::run_scan;

use std::sync::Arc;
use std::time::Duration;

use bnctl_core::device::{ConfigSession, SessionConfig};
use bnctl_core::events::{EventSink, Priority};
use bnctl_core::{Device, DeviceFamily, MacAddr, Transport, TransportConfig};

use crate::cli::{Cli, HttpTargetArgs, RepeatArgs, TargetArgs};
use crate::error::Result;
use crate::output::{get_formatter, OutputFormatter};

/// Settings shared by every command.
pub struct Context {
    pub json: bool,
    pub timeout: Duration,
    pub family: &'static DeviceFamily,
}

impl Context {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            json: cli.json,
            timeout: Duration::from_secs(cli.timeout),
            family: cli.family.profile(),
        }
    }

    /// Timeout in milliseconds, saturating on overflow.
    pub fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }

    pub fn formatter(&self) -> Box<dyn OutputFormatter> {
        get_formatter(self.json)
    }

    /// Bind the management socket.
    pub async fn transport(&self) -> Result<Arc<Transport>> {
        let defaults = TransportConfig::default();
        let timeout_ms = self.timeout_ms();
        let config = TransportConfig {
            timeout_ms,
            reset_timeout_ms: defaults.reset_timeout_ms.max(timeout_ms),
            ..defaults
        };
        let transport = Transport::new(config).with_event_sink(Arc::new(ConsoleSink));
        transport.init().await?;
        Ok(Arc::new(transport))
    }

    /// Open an HTTP configuration session.
    pub fn session(&self, http: &HttpTargetArgs) -> Result<ConfigSession> {
        let mut device = Device::new(MacAddr::default(), http.host).with_port(http.port);
        if let Some(credentials) = &http.user {
            device = device.with_credentials(credentials.clone());
        }
        let config = SessionConfig {
            timeout_ms: self.timeout_ms(),
            ..SessionConfig::default()
        };
        Ok(ConfigSession::new(device, self.family, &config)?.with_event_sink(Arc::new(ConsoleSink)))
    }
}

/// Device addressed by the UDP target options.
pub fn target_device(target: &TargetArgs) -> Device {
    Device::new(target.mac, target.host)
}

/// Wait between repetitions. Returns false when the command should stop.
pub async fn pause(repeat: &RepeatArgs) -> bool {
    if !repeat.continuous {
        return false;
    }
    tokio::select! {
        _ = tokio::time::sleep(Duration::from_secs(repeat.wait)) => true,
        _ = tokio::signal::ctrl_c() => false,
    }
}

/// Prints device-side notices to stderr.
struct ConsoleSink;

impl EventSink for ConsoleSink {
    fn log(&self, priority: Priority, message: &str) {
        match priority {
            Priority::Error | Priority::Warning | Priority::Notice => eprintln!("{}", message),
            Priority::Info => tracing::info!("{}", message),
            Priority::Debug => tracing::debug!("{}", message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bnctl_core::FOS;

    fn context(timeout: Duration) -> Context {
        Context {
            json: false,
            timeout,
            family: &FOS,
        }
    }

    #[test]
    fn test_timeout_ms() {
        assert_eq!(context(Duration::from_secs(3)).timeout_ms(), 3_000);
        assert_eq!(context(Duration::from_secs(u64::MAX)).timeout_ms(), u64::MAX);
    }
}
