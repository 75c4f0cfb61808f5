//! MQTT integration configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Configuration for the MQTT integration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    /// MQTT broker hostname or IP address.
    pub broker_host: String,
    /// MQTT broker port.
    pub broker_port: u16,
    /// MQTT client identifier.
    pub client_id: String,
    /// Keep-alive interval in seconds.
    pub keep_alive_secs: u16,
    /// First reconnect delay after the connection drops, in seconds.
    pub reconnect_min_secs: u16,
    /// Upper bound for the exponentially growing reconnect delay, in seconds.
    pub reconnect_max_secs: u16,
    /// Capacity of the client's outbound request queue.
    pub request_capacity: usize,
    /// File holding the username and password, one per line.
    ///
    /// Defaults to `$HOME/.mqtt_auth` when unset.
    pub credentials_file: Option<PathBuf>,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            broker_host: "10.8.0.1".to_string(),
            broker_port: 1883,
            client_id: "gpioswitch".to_string(),
            keep_alive_secs: 60,
            reconnect_min_secs: 2,
            reconnect_max_secs: 10,
            request_capacity: 32,
            credentials_file: None,
        }
    }
}

impl MqttConfig {
    #[must_use]
    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(u64::from(self.keep_alive_secs))
    }

    #[must_use]
    pub fn reconnect_min(&self) -> Duration {
        Duration::from_secs(u64::from(self.reconnect_min_secs))
    }

    #[must_use]
    pub fn reconnect_max(&self) -> Duration {
        Duration::from_secs(u64::from(self.reconnect_max_secs))
    }
}
