//! Virtual publisher: keeps announcements in memory.

use std::sync::{Mutex, PoisonError};

use gpioswitch_app::ports::{PublishError, StatePublisher};
use gpioswitch_domain::announcement::Announcement;

/// A publisher that records every announcement it is given.
#[derive(Default)]
pub struct VirtualPublisher {
    sent: Mutex<Vec<Announcement>>,
}

impl VirtualPublisher {
    /// Everything published so far, oldest first.
    #[must_use]
    pub fn sent(&self) -> Vec<Announcement> {
        self.sent
            .lock()
            .map_or_else(|poisoned| poisoned.into_inner().clone(), |g| g.clone())
    }
}

impl StatePublisher for VirtualPublisher {
    fn publish(&self, announcement: Announcement) -> Result<(), PublishError> {
        tracing::info!(
            switch = %announcement.switch_id,
            state = %announcement.state,
            "virtual announcement"
        );
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(announcement);
        Ok(())
    }
}
