//! HTTP configuration channel of a single device.

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::error::{ConfigError, CoreError, Result};
use crate::events::{default_sink, EventSink, Priority};
use crate::keymap::{prepare_set, ConfigDump, ConfigValue, DeviceFamily, DumpParser, PreparedSet};
use crate::types::Device;

/// Path of the configuration dump.
pub const DUMP_PATH: &str = "config.txt";

/// HTTP client settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionConfig {
    pub timeout_ms: u64,
    pub user_agent: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 3_000,
            user_agent: "bnctl".to_string(),
        }
    }
}

/// Configuration session with one device. Requests are serialized.
pub struct ConfigSession {
    client: Client,
    device: Device,
    family: &'static DeviceFamily,
    events: Arc<dyn EventSink>,
    lock: Mutex<()>,
}

impl ConfigSession {
    pub fn new(device: Device, family: &'static DeviceFamily, config: &SessionConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            // Appliances sit on the local network.
            .no_proxy()
            .build()
            .map_err(|e| CoreError::Other(format!("HTTP client error: {}", e)))?;

        Ok(Self {
            client,
            device,
            family,
            events: default_sink(),
            lock: Mutex::new(()),
        })
    }

    pub fn with_event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn family(&self) -> &'static DeviceFamily {
        self.family
    }

    fn ip(&self) -> String {
        self.device.address.to_string()
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}:{}/{}", self.device.address, self.device.port, path)
    }

    fn http_error(&self, e: reqwest::Error) -> CoreError {
        self.events.log(Priority::Error, &e.to_string());
        ConfigError::Http {
            ip: self.ip(),
            message: e.to_string(),
        }
        .into()
    }

    /// Issue a GET and classify the status code.
    async fn get(&self, path: &str, what: &str) -> Result<Response> {
        let url = self.url(path);
        let mut request = self.client.get(&url);
        if let Some(creds) = &self.device.credentials {
            request = request.basic_auth(&creds.username, Some(&creds.password));
        }

        tracing::debug!(%url, "HTTP request");
        let response = request.send().await.map_err(|e| self.http_error(e))?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            self.events.log(
                Priority::Error,
                &format!("Invalid username/password to {}!", what),
            );
            return Err(ConfigError::AuthFailure { ip: self.ip() }.into());
        }
        if !status.is_success() {
            self.events
                .log(Priority::Error, &format!("Failed to {}!", what));
            return Err(ConfigError::CommandFailed {
                ip: self.ip(),
                status: status.as_u16(),
            }
            .into());
        }
        Ok(response)
    }

    /// Validate and send a value.
    pub async fn set(&self, keyword: &str, value: Option<&str>) -> Result<()> {
        let prepared = prepare_set(self.family, keyword, value)?;
        self.commit_set(&prepared).await
    }

    /// Send a prepared value to the device.
    pub async fn commit_set(&self, prepared: &PreparedSet) -> Result<()> {
        let _guard = self.lock.lock().await;
        self.get(&prepared.command_path(), "change value").await?;
        tracing::info!(
            device = %self.device.address,
            key = prepared.descriptor().keyword,
            "Value changed"
        );
        Ok(())
    }

    /// Fetch and decode the device configuration.
    pub async fn dump(&self) -> Result<ConfigDump> {
        let _guard = self.lock.lock().await;
        let response = self.get(DUMP_PATH, "get configuration").await?;

        let mut parser = DumpParser::new(self.family).with_source(self.ip());
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| self.http_error(e))?;
            parser.feed(&chunk);
        }

        let dump = parser.finish().map_err(|e| {
            self.events
                .log(Priority::Error, "No valid configuration information found!");
            e
        })?;

        if let Some(warning) = dump.version_mismatch() {
            self.events.log(Priority::Warning, &warning.to_string());
        }
        Ok(dump)
    }

    /// Current value of one key. `None` when the dump did not carry it.
    pub async fn get_value(&self, keyword: &str) -> Result<Option<ConfigValue>> {
        let descriptor = self.family.lookup(keyword)?;
        if !descriptor.is_readable() {
            return Err(ConfigError::validation(keyword, "Key cannot be read").into());
        }
        Ok(self.dump().await?.get(keyword).cloned())
    }
}
