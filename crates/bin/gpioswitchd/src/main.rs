//! # gpioswitchd
//!
//! Composition root that wires the controller to the GPIO and MQTT adapters
//! and runs until it is told to stop.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars)
//! - Initialize logging
//! - Claim the output pins (or build the virtual backend)
//! - Resolve broker credentials and configure the MQTT connection
//! - Run the broker event loop and the deadline ticker side by side
//! - Handle graceful shutdown (SIGTERM/SIGINT): stop both tasks, disconnect,
//!   drive every output low
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

mod config;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use gpioswitch_adapter_gpio::RppalActuator;
use gpioswitch_adapter_mqtt::{CredentialStore, Credentials, MqttIntegration, TopicMap, credentials};
use gpioswitch_adapter_virtual::VirtualActuator;
use gpioswitch_app::controller::SwitchController;
use gpioswitch_app::ports::{Actuator, ActuatorError};
use gpioswitch_app::ticker::Ticker;
use gpioswitch_domain::error::GpioSwitchError;
use gpioswitch_domain::id::SwitchId;

use config::{Config, GpioBackend};

/// The actuator picked by `gpio.backend`.
enum SelectedActuator {
    Gpio(RppalActuator),
    Virtual(VirtualActuator),
}

impl SelectedActuator {
    fn build(backend: GpioBackend, switch_ids: Vec<SwitchId>) -> Result<Self, GpioSwitchError> {
        match backend {
            GpioBackend::Rppal => Ok(Self::Gpio(RppalActuator::new(switch_ids)?)),
            GpioBackend::Virtual => {
                tracing::warn!("virtual GPIO backend selected, no pins will be driven");
                Ok(Self::Virtual(VirtualActuator::new(switch_ids)))
            }
        }
    }
}

impl Actuator for SelectedActuator {
    fn set_output(&self, switch_id: SwitchId, on: bool) -> Result<(), ActuatorError> {
        match self {
            Self::Gpio(actuator) => actuator.set_output(switch_id, on),
            Self::Virtual(actuator) => actuator.set_output(switch_id, on),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    init_tracing(&config.logging.filter);

    // Controller
    let actuator = SelectedActuator::build(
        config.gpio.backend,
        config.switches.iter().map(|s| SwitchId::new(s.pin)).collect(),
    )?;
    let controller = Arc::new(SwitchController::new(
        config.build_switches()?,
        config.timeout(),
        actuator,
    )?);

    // MQTT
    let store = config
        .mqtt
        .credentials_file
        .clone()
        .map(CredentialStore::new)
        .or_else(CredentialStore::in_home);
    let creds = credentials::resolve(
        credentials_from_env(|key| std::env::var(key).ok()),
        store.as_ref(),
    )?;
    let topics = TopicMap::new(config.switch_topics())?;
    let mqtt = MqttIntegration::new(&config.mqtt, creds.as_ref(), topics);
    let ticker = Ticker::new(controller.clone(), mqtt.publisher(), config.tick_interval());

    tracing::info!(
        switches = config.switches.len(),
        timeout_secs = config.timeout().as_secs(),
        backend = ?config.gpio.backend,
        integration = mqtt.name(),
        "gpioswitchd started"
    );

    let cancel = CancellationToken::new();
    let mqtt_task = tokio::spawn(mqtt.run(controller.clone(), cancel.clone()));
    let ticker_task = tokio::spawn(ticker.run(cancel.clone()));

    shutdown_signal().await;
    tracing::info!("shutting down");
    cancel.cancel();

    for (name, task) in [("mqtt", mqtt_task), ("ticker", ticker_task)] {
        if let Err(err) = task.await {
            tracing::error!(task = name, error = %err, "task ended abnormally");
        }
    }

    // Last owner: dropping the controller releases the pins low.
    drop(controller);
    tracing::info!("gpioswitchd stopped");
    Ok(())
}

fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|err| {
        eprintln!("invalid log filter {filter:?} ({err}), falling back to info");
        EnvFilter::new("info")
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn credentials_from_env(var: impl Fn(&str) -> Option<String>) -> Option<Credentials> {
    let password = var("GPIOSWITCH_MQTT_PASSWORD");
    let Some(username) = var("GPIOSWITCH_MQTT_USERNAME") else {
        if password.is_some() {
            tracing::warn!(
                "GPIOSWITCH_MQTT_PASSWORD is set without GPIOSWITCH_MQTT_USERNAME, ignoring it"
            );
        }
        return None;
    };
    Some(Credentials::new(username, password.unwrap_or_default()))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
