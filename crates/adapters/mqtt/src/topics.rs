//! Mapping between switches and MQTT topics, and inbound message decoding.

use std::collections::{BTreeMap, HashMap};

use gpioswitch_domain::command::{Action, Command};
use gpioswitch_domain::id::SwitchId;

use crate::error::MqttError;

/// Topic used for a switch when none is configured: `gpio/<pin>`.
#[must_use]
pub fn default_topic(switch_id: SwitchId) -> String {
    format!("gpio/{}", switch_id.pin())
}

/// Why an inbound message did not produce a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ignored {
    /// The topic belongs to no switch.
    UnknownTopic,
    /// The payload is not valid UTF-8.
    NotUtf8,
    /// The payload is neither `on` nor `off`.
    UnrecognizedPayload(String),
}

/// Bidirectional switch ↔ topic table.
#[derive(Debug, Clone, Default)]
pub struct TopicMap {
    by_topic: HashMap<String, SwitchId>,
    by_switch: BTreeMap<SwitchId, String>,
}

impl TopicMap {
    /// Build the table from `(switch, topic)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`MqttError::DuplicateTopic`] if two switches share a topic.
    pub fn new(entries: impl IntoIterator<Item = (SwitchId, String)>) -> Result<Self, MqttError> {
        let mut map = Self::default();
        for (switch_id, topic) in entries {
            if map.by_topic.insert(topic.clone(), switch_id).is_some() {
                return Err(MqttError::DuplicateTopic(topic));
            }
            map.by_switch.insert(switch_id, topic);
        }
        Ok(map)
    }

    /// Switch addressed by `topic`.
    #[must_use]
    pub fn switch_for(&self, topic: &str) -> Option<SwitchId> {
        self.by_topic.get(topic).copied()
    }

    /// Topic of `switch_id`.
    #[must_use]
    pub fn topic_for(&self, switch_id: SwitchId) -> Option<&str> {
        self.by_switch.get(&switch_id).map(String::as_str)
    }

    /// All topics, in switch id order.
    pub fn topics(&self) -> impl Iterator<Item = &str> {
        self.by_switch.values().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_switch.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_switch.is_empty()
    }

    /// Turn an inbound message into a [`Command`].
    ///
    /// # Errors
    ///
    /// Returns the reason the message was [`Ignored`].
    pub fn decode(&self, topic: &str, payload: &[u8]) -> Result<Command, Ignored> {
        let switch_id = self.switch_for(topic).ok_or(Ignored::UnknownTopic)?;
        let text = std::str::from_utf8(payload).map_err(|_| Ignored::NotUtf8)?;
        let action = Action::from_payload(text)
            .ok_or_else(|| Ignored::UnrecognizedPayload(text.to_string()))?;
        Ok(Command::new(switch_id, action))
    }
}
