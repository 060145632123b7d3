//! Periodic watchdog kicking.
//!
//! A [`WatchdogKicker`] owns a background task that kicks one device's
//! watchdog at a fixed interval and reports state transitions to a
//! [`WatchdogListener`].

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep, MissedTickBehavior};

use crate::error::{CoreError, Result};
use crate::transport::Transport;
use crate::types::Device;

use super::ops;

/// Default kick interval in seconds.
pub const DEFAULT_INTERVAL_SECS: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchdogState {
    Starting,
    Running,
    WatchdogOk,
    WatchdogFailed,
    Stopped,
}

impl fmt::Display for WatchdogState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WatchdogState::Starting => "starting",
            WatchdogState::Running => "running",
            WatchdogState::WatchdogOk => "watchdog ok",
            WatchdogState::WatchdogFailed => "watchdog failed",
            WatchdogState::Stopped => "stopped",
        };
        f.write_str(s)
    }
}

/// Receiver of kicker state changes.
pub trait WatchdogListener: Send + Sync {
    fn on_state(&self, name: &str, state: WatchdogState, at: DateTime<Utc>);
}

/// Kicker timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KickerSettings {
    pub interval_secs: u64,
    /// Delay before the first kick; defaults to the interval.
    pub start_delay_secs: Option<u64>,
}

impl Default for KickerSettings {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_INTERVAL_SECS,
            start_delay_secs: None,
        }
    }
}

impl KickerSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn start_delay(&self) -> Duration {
        Duration::from_secs(self.start_delay_secs.unwrap_or(self.interval_secs))
    }

    fn validate(&self) -> Result<()> {
        if self.interval_secs < 1 {
            return Err(CoreError::Other(
                "Watchdog interval must be at least 1 second".to_string(),
            ));
        }
        Ok(())
    }
}

/// Handle of a running kicker task.
pub struct WatchdogKicker {
    name: String,
    stop: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl WatchdogKicker {
    /// Spawn the kicker task. Must be called within a tokio runtime.
    pub fn start(
        transport: Arc<Transport>,
        device: Device,
        name: impl Into<String>,
        settings: KickerSettings,
        listener: Arc<dyn WatchdogListener>,
    ) -> Result<Self> {
        settings.validate()?;
        let name = name.into();
        let (stop, stop_rx) = watch::channel(false);

        let handle = tokio::spawn(run(
            transport,
            device,
            name.clone(),
            settings,
            listener,
            stop_rx,
        ));

        Ok(Self { name, stop, handle })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stop the task and wait until it has reported `Stopped`.
    pub async fn stop(self) {
        let _ = self.stop.send(true);
        if let Err(e) = self.handle.await {
            tracing::warn!(name = %self.name, error = %e, "Watchdog task ended abnormally");
        }
    }
}

async fn run(
    transport: Arc<Transport>,
    device: Device,
    name: String,
    settings: KickerSettings,
    listener: Arc<dyn WatchdogListener>,
    mut stop: watch::Receiver<bool>,
) {
    let notify = |state: WatchdogState| {
        tracing::debug!(name = %name, %state, "Watchdog state");
        listener.on_state(&name, state, Utc::now());
    };

    notify(WatchdogState::Starting);

    tokio::select! {
        _ = sleep(settings.start_delay()) => {}
        _ = stop.changed() => {
            notify(WatchdogState::Stopped);
            return;
        }
    }

    notify(WatchdogState::Running);

    let mut ticker = interval(settings.interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_ok: Option<bool> = None;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let ok = match ops::kick_watchdog(&transport, &device).await {
                    Ok(()) => true,
                    Err(e) => {
                        tracing::debug!(name = %name, error = %e, "Kick failed");
                        false
                    }
                };
                if last_ok != Some(ok) {
                    notify(if ok { WatchdogState::WatchdogOk } else { WatchdogState::WatchdogFailed });
                    last_ok = Some(ok);
                }
            }
            _ = stop.changed() => break,
        }
    }

    notify(WatchdogState::Stopped);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{Command, Packet};
    use crate::transport::TransportConfig;
    use crate::types::MacAddr;
    use std::net::Ipv4Addr;
    use std::sync::Mutex;
    use tokio::net::UdpSocket;

    #[derive(Default)]
    struct Recorder {
        states: Mutex<Vec<WatchdogState>>,
    }

    impl Recorder {
        fn states(&self) -> Vec<WatchdogState> {
            self.states.lock().unwrap().clone()
        }
    }

    impl WatchdogListener for Recorder {
        fn on_state(&self, name: &str, state: WatchdogState, _at: DateTime<Utc>) {
            assert_eq!(name, "fos1");
            self.states.lock().unwrap().push(state);
        }
    }

    #[test]
    fn test_settings() {
        let settings = KickerSettings::default();
        assert_eq!(settings.interval(), Duration::from_secs(5));
        assert_eq!(settings.start_delay(), Duration::from_secs(5));
        assert!(KickerSettings {
            interval_secs: 0,
            start_delay_secs: None
        }
        .validate()
        .is_err());
    }

    #[tokio::test]
    async fn test_stop_before_running() {
        let transport = Arc::new(Transport::new(TransportConfig::default()));
        let recorder = Arc::new(Recorder::default());
        let kicker = WatchdogKicker::start(
            transport,
            Device::default(),
            "fos1",
            KickerSettings::default(),
            recorder.clone(),
        )
        .unwrap();

        kicker.stop().await;
        assert_eq!(
            recorder.states(),
            vec![WatchdogState::Starting, WatchdogState::Stopped]
        );
    }

    #[tokio::test]
    async fn test_reports_transitions_only() {
        let device = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let config = TransportConfig {
            device_port: device.local_addr().unwrap().port(),
            timeout_ms: 200,
            ..TransportConfig::default()
        };
        let transport = Arc::new(Transport::bind(config).await.unwrap());

        // Answer the first kick only.
        tokio::spawn(async move {
            let mut buf = [0u8; 64];
            let (_, src) = device.recv_from(&mut buf).await.unwrap();
            let reply = Packet::new(Command::KickWatchdog, vec![0u8; 7]).unwrap();
            device.send_to(&reply.encode(), src).await.unwrap();
            loop {
                if device.recv_from(&mut buf).await.is_err() {
                    break;
                }
            }
        });

        let recorder = Arc::new(Recorder::default());
        let kicker = WatchdogKicker::start(
            transport,
            Device::new(MacAddr([0, 0x50, 0xc2, 0, 0, 1]), Ipv4Addr::LOCALHOST),
            "fos1",
            KickerSettings {
                interval_secs: 1,
                start_delay_secs: Some(0),
            },
            recorder.clone(),
        )
        .unwrap();

        tokio::time::timeout(Duration::from_secs(10), async {
            while !recorder.states().contains(&WatchdogState::WatchdogFailed) {
                sleep(Duration::from_millis(50)).await;
            }
        })
        .await
        .unwrap();
        kicker.stop().await;

        assert_eq!(
            recorder.states(),
            vec![
                WatchdogState::Starting,
                WatchdogState::Running,
                WatchdogState::WatchdogOk,
                WatchdogState::WatchdogFailed,
                WatchdogState::Stopped,
            ]
        );
    }
}
