//! Connection session: reacts to broker events.
//!
//! Kept apart from the event loop so every reaction can be exercised
//! without a broker.

use std::sync::Arc;
use std::time::Duration;

use rumqttc::{AsyncClient, Event, Packet, QoS};

use gpioswitch_app::controller::{CommandOutcome, SwitchController};
use gpioswitch_app::ports::Actuator;
use gpioswitch_domain::time::Timestamp;

use crate::backoff::Backoff;
use crate::topics::{Ignored, TopicMap};

/// What a single event led to.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Reaction {
    /// Connected; this many subscriptions were queued.
    Subscribed(usize),
    /// A command was applied to a known switch.
    CommandApplied,
    /// An inbound message was dropped.
    Ignored(Ignored),
    /// Nothing to do.
    None,
}

pub(crate) struct Session {
    client: AsyncClient,
    topics: Arc<TopicMap>,
    backoff: Backoff,
}

impl Session {
    pub(crate) fn new(client: AsyncClient, topics: Arc<TopicMap>, backoff: Backoff) -> Self {
        Self {
            client,
            topics,
            backoff,
        }
    }

    pub(crate) fn client(&self) -> &AsyncClient {
        &self.client
    }

    /// React to one event from the event loop.
    pub(crate) fn on_event<A: Actuator>(
        &mut self,
        event: &Event,
        controller: &SwitchController<A>,
        now: Timestamp,
    ) -> Reaction {
        match event {
            Event::Incoming(Packet::ConnAck(ack)) => {
                tracing::info!(session_present = ack.session_present, "MQTT connected");
                self.backoff.reset();
                Reaction::Subscribed(self.subscribe_all())
            }
            Event::Incoming(Packet::Publish(publish)) => {
                self.on_message(&publish.topic, &publish.payload, controller, now)
            }
            Event::Incoming(Packet::SubAck(ack)) => {
                tracing::debug!(pkid = ack.pkid, "subscription acknowledged");
                Reaction::None
            }
            Event::Incoming(Packet::Disconnect) => {
                tracing::warn!("broker closed the session");
                Reaction::None
            }
            _ => Reaction::None,
        }
    }

    /// Delay before retrying after a connection error.
    pub(crate) fn on_connection_error(&mut self, error: &rumqttc::ConnectionError) -> Duration {
        let delay = self.backoff.next_delay();
        tracing::warn!(
            error = %error,
            retry_in_ms = delay.as_millis(),
            "MQTT connection lost, reconnecting"
        );
        delay
    }

    fn subscribe_all(&self) -> usize {
        let mut queued = 0;
        for topic in self.topics.topics() {
            match self.client.try_subscribe(topic, QoS::AtMostOnce) {
                Ok(()) => {
                    tracing::info!(topic, "subscribed");
                    queued += 1;
                }
                Err(err) => tracing::error!(topic, error = %err, "failed to subscribe"),
            }
        }
        queued
    }

    fn on_message<A: Actuator>(
        &self,
        topic: &str,
        payload: &[u8],
        controller: &SwitchController<A>,
        now: Timestamp,
    ) -> Reaction {
        let command = match self.topics.decode(topic, payload) {
            Ok(command) => command,
            Err(reason) => {
                tracing::debug!(topic, ?reason, "message ignored");
                return Reaction::Ignored(reason);
            }
        };

        tracing::debug!(topic, switch = %command.switch_id, action = ?command.action, "command received");
        match controller.apply(command, now) {
            CommandOutcome::Applied { .. } => Reaction::CommandApplied,
            CommandOutcome::UnknownSwitch => Reaction::Ignored(Ignored::UnknownTopic),
        }
    }
}
