//! State publisher port: announces switch states to observers.

use gpioswitch_domain::announcement::Announcement;
use gpioswitch_domain::error::{BoxError, GpioSwitchError};
use gpioswitch_domain::id::SwitchId;

/// Publishes announcements, fire-and-forget.
///
/// Implementations must never wait on the transport: when the outbound
/// queue is backlogged they fail with [`PublishError::Backlogged`] instead
/// of blocking the caller.
pub trait StatePublisher {
    /// Queue `announcement` for delivery.
    ///
    /// # Errors
    ///
    /// Returns a [`PublishError`] if the announcement could not be queued.
    fn publish(&self, announcement: Announcement) -> Result<(), PublishError>;
}

impl<T: StatePublisher + ?Sized> StatePublisher for std::sync::Arc<T> {
    fn publish(&self, announcement: Announcement) -> Result<(), PublishError> {
        (**self).publish(announcement)
    }
}

/// Failure to queue an announcement.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// No outbound address is known for this switch.
    #[error("no topic for switch {0}")]
    UnknownSwitch(SwitchId),

    /// The outbound queue is full; the announcement was dropped.
    #[error("outbound queue is full")]
    Backlogged,

    /// The transport is gone.
    #[error("publisher closed")]
    Closed(#[source] BoxError),
}

impl From<PublishError> for GpioSwitchError {
    fn from(err: PublishError) -> Self {
        Self::Transport(Box::new(err))
    }
}
