//! MQTT state publisher: retained, fire-and-forget announcements.

use std::sync::Arc;

use rumqttc::{AsyncClient, ClientError, Publish, QoS};

use gpioswitch_app::ports::{PublishError, StatePublisher};
use gpioswitch_domain::announcement::Announcement;

use crate::topics::TopicMap;

/// Publishes announcements on each switch's topic with QoS 1 and the
/// retain flag set, so late subscribers see the last known state.
#[derive(Clone)]
pub struct MqttPublisher {
    client: AsyncClient,
    topics: Arc<TopicMap>,
}

impl MqttPublisher {
    pub(crate) fn new(client: AsyncClient, topics: Arc<TopicMap>) -> Self {
        Self { client, topics }
    }
}

/// Build the retained QoS 1 message announcing `announcement` on its
/// switch's topic.
pub(crate) fn announcement_publish(
    topics: &TopicMap,
    announcement: Announcement,
) -> Result<Publish, PublishError> {
    let topic = topics
        .topic_for(announcement.switch_id)
        .ok_or(PublishError::UnknownSwitch(announcement.switch_id))?;
    let mut publish = Publish::new(topic, QoS::AtLeastOnce, announcement.payload());
    publish.retain = true;
    Ok(publish)
}

impl StatePublisher for MqttPublisher {
    fn publish(&self, announcement: Announcement) -> Result<(), PublishError> {
        let Publish {
            topic,
            qos,
            retain,
            payload,
            ..
        } = announcement_publish(&self.topics, announcement)?;

        self.client
            .try_publish(topic.as_str(), qos, retain, payload.to_vec())
            .map_err(|err| match err {
                ClientError::TryRequest(_) => PublishError::Backlogged,
                other => PublishError::Closed(Box::new(other)),
            })?;

        tracing::info!(switch = %announcement.switch_id, topic = %topic, payload = announcement.payload(), "state published");
        Ok(())
    }
}
