//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `gpioswitch.toml` in the working directory (or the path in
//! `GPIOSWITCH_CONFIG`). Every field has a sensible default so the file is
//! optional. Environment variables take precedence over file values.

use std::collections::HashSet;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use gpioswitch_adapter_mqtt::MqttConfig;
use gpioswitch_adapter_mqtt::topics::default_topic;
use gpioswitch_domain::id::SwitchId;
use gpioswitch_domain::switch::Switch;
use gpioswitch_domain::time::MAX_TIMEOUT;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_PATH: &str = "gpioswitch.toml";

/// Top-level configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Broker connection settings.
    pub mqtt: MqttConfig,
    /// Auto-off settings.
    pub timeout: TimeoutConfig,
    /// Output backend.
    pub gpio: GpioConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// The fixed set of switches.
    pub switches: Vec<SwitchConfig>,
}

/// Auto-off timing.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Time a switch stays on after its last `on` command, in seconds.
    pub duration_secs: u64,
    /// How often deadlines are checked, in milliseconds.
    pub tick_interval_ms: u64,
}

/// Output backend selection.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GpioConfig {
    pub backend: GpioBackend,
}

/// Which actuator drives the outputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GpioBackend {
    /// Memory-mapped Raspberry Pi GPIO.
    #[default]
    Rppal,
    /// In-memory outputs, for running without GPIO hardware.
    Virtual,
}

impl FromStr for GpioBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rppal" => Ok(Self::Rppal),
            "virtual" => Ok(Self::Virtual),
            other => Err(ConfigError::Validation(format!(
                "unknown GPIO backend {other:?}"
            ))),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// One switch: the pin it drives and where its commands arrive.
#[derive(Debug, Clone, Deserialize)]
pub struct SwitchConfig {
    /// BCM GPIO number, also the switch id.
    pub pin: u8,
    /// Human-readable name used in logs.
    pub name: String,
    /// Command/state topic; defaults to `gpio/<pin>`.
    #[serde(default)]
    pub topic: Option<String>,
}

impl SwitchConfig {
    /// The configured topic, or `gpio/<pin>`.
    #[must_use]
    pub fn topic(&self) -> String {
        self.topic
            .clone()
            .unwrap_or_else(|| default_topic(SwitchId::new(self.pin)))
    }
}

impl Config {
    /// Load configuration from the config file (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var_os("GPIOSWITCH_CONFIG")
            .map_or_else(|| PathBuf::from(DEFAULT_PATH), PathBuf::from);
        let mut config = Self::from_file(&path)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(
        &mut self,
        var: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(val) = var("GPIOSWITCH_BROKER") {
            match val.rsplit_once(':') {
                Some((host, port)) => {
                    self.mqtt.broker_host = host.to_string();
                    self.mqtt.broker_port = port.parse().map_err(|_| {
                        ConfigError::Validation(format!("invalid broker port {port:?}"))
                    })?;
                }
                None => self.mqtt.broker_host = val,
            }
        }
        if let Some(val) = var("GPIOSWITCH_TIMEOUT_SECS") {
            self.timeout.duration_secs = val.parse().map_err(|_| {
                ConfigError::Validation(format!("invalid timeout {val:?}"))
            })?;
        }
        if let Some(val) = var("GPIOSWITCH_GPIO_BACKEND") {
            self.gpio.backend = val.parse()?;
        }
        if let Some(val) = var("GPIOSWITCH_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Validation(msg.to_string()));

        if self.mqtt.broker_port == 0 {
            return invalid("broker port must be non-zero");
        }
        if self.mqtt.keep_alive_secs < 5 {
            return invalid("keep-alive must be at least 5 seconds");
        }
        if self.mqtt.reconnect_min_secs == 0 {
            return invalid("reconnect delay must be non-zero");
        }
        if self.mqtt.reconnect_min_secs > self.mqtt.reconnect_max_secs {
            return invalid("reconnect_min_secs must not exceed reconnect_max_secs");
        }
        if self.timeout.duration_secs == 0 {
            return invalid("timeout must be non-zero");
        }
        if self.timeout() > MAX_TIMEOUT {
            return invalid("timeout must not exceed one week");
        }
        if self.timeout.tick_interval_ms == 0 {
            return invalid("tick interval must be non-zero");
        }
        if self.switches.is_empty() {
            return invalid("at least one switch must be configured");
        }

        let mut pins = HashSet::new();
        let mut topics = HashSet::new();
        for switch in &self.switches {
            SwitchId::checked(switch.pin)
                .map_err(|err| ConfigError::Validation(err.to_string()))?;
            if !pins.insert(switch.pin) {
                return Err(ConfigError::Validation(format!(
                    "pin {} is configured more than once",
                    switch.pin
                )));
            }
            let topic = switch.topic();
            if topic.is_empty() {
                return invalid("switch topics must not be empty");
            }
            if !topics.insert(topic.clone()) {
                return Err(ConfigError::Validation(format!(
                    "topic {topic:?} is used by more than one switch"
                )));
            }
        }
        Ok(())
    }

    /// Auto-off timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout.duration_secs)
    }

    /// Deadline check period.
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.timeout.tick_interval_ms)
    }

    /// Idle domain switches for every configured entry.
    ///
    /// # Errors
    ///
    /// Returns an error if a switch name is blank.
    pub fn build_switches(&self) -> Result<Vec<Switch>, ConfigError> {
        self.switches
            .iter()
            .map(|s| {
                Switch::new(SwitchId::new(s.pin), s.name.clone())
                    .map_err(|err| ConfigError::Validation(err.to_string()))
            })
            .collect()
    }

    /// `(switch, topic)` pairs for the MQTT topic map.
    #[must_use]
    pub fn switch_topics(&self) -> Vec<(SwitchId, String)> {
        self.switches
            .iter()
            .map(|s| (SwitchId::new(s.pin), s.topic()))
            .collect()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mqtt: MqttConfig::default(),
            timeout: TimeoutConfig::default(),
            gpio: GpioConfig::default(),
            logging: LoggingConfig::default(),
            switches: vec![
                SwitchConfig {
                    pin: 17,
                    name: "lights".to_string(),
                    topic: None,
                },
                SwitchConfig {
                    pin: 27,
                    name: "bell".to_string(),
                    topic: None,
                },
            ],
        }
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            duration_secs: 60,
            tick_interval_ms: 1000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "gpioswitchd=info,gpioswitch=info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.mqtt.broker_host, "10.8.0.1");
        assert_eq!(config.timeout(), Duration::from_secs(60));
        assert_eq!(config.tick_interval(), Duration::from_secs(1));
        assert_eq!(config.gpio.backend, GpioBackend::Rppal);
        assert_eq!(
            config.switch_topics(),
            vec![
                (SwitchId::new(17), "gpio/17".to_string()),
                (SwitchId::new(27), "gpio/27".to_string()),
            ]
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn should_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.switches.len(), 2);
        assert_eq!(config.timeout.duration_secs, 60);
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = "
            [mqtt]
            broker_host = 'broker.lan'
            broker_port = 1884
            credentials_file = '/etc/gpioswitch/auth'

            [timeout]
            duration_secs = 120
            tick_interval_ms = 250

            [gpio]
            backend = 'virtual'

            [logging]
            filter = 'debug'

            [[switches]]
            pin = 22
            name = 'gate'
            topic = 'garage/gate'
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.mqtt.broker_host, "broker.lan");
        assert_eq!(config.mqtt.broker_port, 1884);
        assert_eq!(config.timeout(), Duration::from_secs(120));
        assert_eq!(config.tick_interval(), Duration::from_millis(250));
        assert_eq!(config.gpio.backend, GpioBackend::Virtual);
        assert_eq!(config.logging.filter, "debug");
        assert_eq!(
            config.switch_topics(),
            vec![(SwitchId::new(22), "garage/gate".to_string())]
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file(std::path::Path::new("nonexistent.toml")).unwrap();
        assert_eq!(config.switches.len(), 2);
    }

    #[test]
    fn should_report_parse_error_for_invalid_toml() {
        let result: Result<Config, _> = toml::from_str("invalid {{{");
        assert!(result.is_err());
    }

    #[test]
    fn should_reject_unknown_backend_in_toml() {
        let result: Result<Config, _> = toml::from_str("[gpio]\nbackend = 'sysfs'");
        assert!(result.is_err());
    }

    #[test]
    fn should_override_broker_with_port() {
        let mut config = Config::default();
        config
            .apply_overrides(env(&[("GPIOSWITCH_BROKER", "192.168.1.2:8883")]))
            .unwrap();
        assert_eq!(config.mqtt.broker_host, "192.168.1.2");
        assert_eq!(config.mqtt.broker_port, 8883);
    }

    #[test]
    fn should_override_broker_host_only() {
        let mut config = Config::default();
        config
            .apply_overrides(env(&[("GPIOSWITCH_BROKER", "broker.lan")]))
            .unwrap();
        assert_eq!(config.mqtt.broker_host, "broker.lan");
        assert_eq!(config.mqtt.broker_port, 1883);
    }

    #[test]
    fn should_reject_non_numeric_broker_port() {
        let mut config = Config::default();
        let result = config.apply_overrides(env(&[("GPIOSWITCH_BROKER", "host:abc")]));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn should_override_timeout_and_backend() {
        let mut config = Config::default();
        config
            .apply_overrides(env(&[
                ("GPIOSWITCH_TIMEOUT_SECS", "5"),
                ("GPIOSWITCH_GPIO_BACKEND", "Virtual"),
            ]))
            .unwrap();
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.gpio.backend, GpioBackend::Virtual);
    }

    #[test]
    fn should_prefer_rust_log_over_own_variable() {
        let mut config = Config::default();
        config
            .apply_overrides(env(&[("GPIOSWITCH_LOG", "warn"), ("RUST_LOG", "trace")]))
            .unwrap();
        assert_eq!(config.logging.filter, "trace");
    }

    #[test]
    fn should_reject_zero_port() {
        let mut config = Config::default();
        config.mqtt.broker_port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_zero_timeout() {
        let mut config = Config::default();
        config.timeout.duration_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_timeout_over_one_week() {
        let mut config = Config::default();
        config.timeout.duration_secs = MAX_TIMEOUT.as_secs() + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_zero_tick_interval() {
        let mut config = Config::default();
        config.timeout.tick_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_short_keep_alive() {
        let mut config = Config::default();
        config.mqtt.keep_alive_secs = 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_inverted_reconnect_bounds() {
        let mut config = Config::default();
        config.mqtt.reconnect_min_secs = 20;
        config.mqtt.reconnect_max_secs = 10;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_empty_switch_list() {
        let mut config = Config::default();
        config.switches.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_duplicate_pin() {
        let mut config = Config::default();
        config.switches[1].pin = 17;
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid configuration: pin 17 is configured more than once"
        );
    }

    #[test]
    fn should_reject_duplicate_topic() {
        let mut config = Config::default();
        config.switches[1].topic = Some("gpio/17".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_pin_outside_gpio_range() {
        let mut config = Config::default();
        config.switches[0].pin = 99;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_build_idle_switches() {
        let switches = Config::default().build_switches().unwrap();
        assert_eq!(switches.len(), 2);
        assert_eq!(switches[0].name(), "lights");
        assert!(!switches[1].is_on());
    }

    #[test]
    fn should_reject_blank_switch_name() {
        let mut config = Config::default();
        config.switches[0].name = String::new();
        assert!(config.build_switches().is_err());
    }
}
