//! # gpioswitch-adapter-mqtt
//!
//! MQTT adapter: bridges the switch controller to a broker.
//!
//! ## Responsibilities
//! - Connect to the broker, with credentials from the environment or the
//!   credentials file
//! - Subscribe to one topic per switch, again after every reconnect
//! - Translate `on` / `off` payloads into controller commands
//! - Publish retained `off` announcements after an automatic turn-off
//! - Reconnect with exponential backoff when the connection drops
//!
//! ## Dependency rule
//! Same as other adapters: depends on `gpioswitch-app` and `gpioswitch-domain`.

mod backoff;
mod config;
pub mod credentials;
mod error;
mod publisher;
mod session;
pub mod topics;

pub use backoff::Backoff;
pub use config::MqttConfig;
pub use credentials::{CredentialStore, Credentials};
pub use error::MqttError;
pub use publisher::MqttPublisher;
pub use topics::TopicMap;

use std::sync::Arc;
use std::time::Duration;

use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Outgoing};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use gpioswitch_app::controller::SwitchController;
use gpioswitch_app::ports::Actuator;

use session::{Reaction, Session};

/// How long to wait for the `DISCONNECT` packet to leave on shutdown.
const DISCONNECT_GRACE: Duration = Duration::from_millis(500);

/// A configured broker connection, ready to be driven by [`run`](Self::run).
///
/// The connection itself is established lazily by the event loop.
pub struct MqttIntegration {
    session: Session,
    eventloop: EventLoop,
    topics: Arc<TopicMap>,
}

impl MqttIntegration {
    /// Build the client for `config`, authenticating with `credentials` if
    /// given.
    #[must_use]
    pub fn new(config: &MqttConfig, credentials: Option<&Credentials>, topics: TopicMap) -> Self {
        let mut options = MqttOptions::new(
            config.client_id.clone(),
            config.broker_host.clone(),
            config.broker_port,
        );
        options.set_keep_alive(config.keep_alive());
        options.set_clean_session(true);
        if let Some(creds) = credentials {
            options.set_credentials(creds.username.clone(), creds.password.clone());
        }

        let (client, eventloop) = AsyncClient::new(options, config.request_capacity.max(1));
        let topics = Arc::new(topics);
        let backoff = Backoff::new(config.reconnect_min(), config.reconnect_max());

        tracing::info!(
            broker = %format!("{}:{}", config.broker_host, config.broker_port),
            client_id = %config.client_id,
            topics = topics.len(),
            authenticated = credentials.is_some(),
            "MQTT integration configured"
        );

        Self {
            session: Session::new(client, topics.clone(), backoff),
            eventloop,
            topics,
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        "mqtt"
    }

    /// Publisher for announcements on this connection.
    #[must_use]
    pub fn publisher(&self) -> MqttPublisher {
        MqttPublisher::new(self.session.client().clone(), self.topics.clone())
    }

    /// Drive the connection until `cancel` fires, feeding inbound commands
    /// to `controller`.
    ///
    /// Connection errors never end the loop: the next attempt waits for the
    /// backoff delay (or for cancellation, whichever comes first). On exit
    /// a clean `DISCONNECT` is attempted.
    pub async fn run<A: Actuator>(
        mut self,
        controller: Arc<SwitchController<A>>,
        cancel: CancellationToken,
    ) {
        loop {
            let polled = tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                polled = self.eventloop.poll() => polled,
            };

            match polled {
                Ok(event) => {
                    let reaction =
                        self.session
                            .on_event(&event, &controller, Instant::now().into_std());
                    let missing = match reaction {
                        Reaction::Subscribed(queued) => self.topics.len().saturating_sub(queued),
                        _ => 0,
                    };
                    if missing > 0 {
                        tracing::warn!(missing, "not every switch topic is subscribed");
                    }
                }
                Err(err) => {
                    let delay = self.session.on_connection_error(&err);
                    tokio::select! {
                        biased;
                        () = cancel.cancelled() => break,
                        () = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }

        self.disconnect().await;
    }

    async fn disconnect(&mut self) {
        if let Err(err) = self.session.client().try_disconnect() {
            tracing::debug!(error = %err, "disconnect request not queued");
            return;
        }

        let flushed = tokio::time::timeout(DISCONNECT_GRACE, async {
            loop {
                match self.eventloop.poll().await {
                    Ok(Event::Outgoing(Outgoing::Disconnect)) | Err(_) => break,
                    Ok(_) => {}
                }
            }
        })
        .await;

        if flushed.is_err() {
            tracing::debug!("timed out waiting for disconnect");
        }
        tracing::info!("MQTT integration stopped");
    }
}

#[cfg(test)]
mod tests {
    use gpioswitch_app::ports::ActuatorError;
    use gpioswitch_domain::id::SwitchId;
    use gpioswitch_domain::switch::Switch;

    use super::*;

    struct NoopActuator;

    impl Actuator for NoopActuator {
        fn set_output(&self, _switch_id: SwitchId, _on: bool) -> Result<(), ActuatorError> {
            Ok(())
        }
    }

    fn integration() -> MqttIntegration {
        let config = MqttConfig {
            broker_host: "127.0.0.1".to_string(),
            broker_port: 9,
            ..MqttConfig::default()
        };
        let topics = TopicMap::new([(SwitchId::new(17), "gpio/17".to_string())]).unwrap();
        MqttIntegration::new(&config, Some(&Credentials::new("pi", "secret")), topics)
    }

    #[test]
    fn should_return_mqtt_as_name() {
        assert_eq!(integration().name(), "mqtt");
    }

    #[tokio::test]
    async fn should_stop_when_cancelled_while_broker_unreachable() {
        let integration = integration();
        let controller = Arc::new(
            SwitchController::new(
                vec![Switch::new(SwitchId::new(17), "lights").unwrap()],
                Duration::from_secs(60),
                NoopActuator,
            )
            .unwrap(),
        );
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(integration.run(controller, cancel.clone()));

        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();

        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("event loop should stop promptly")
            .unwrap();
    }
}
