//! Announcements: switch states published to observers.

use crate::id::SwitchId;
use crate::switch::OutputState;

/// A state announcement for one switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Announcement {
    pub switch_id: SwitchId,
    pub state: OutputState,
}

impl Announcement {
    /// Announcement emitted when a deadline expires.
    #[must_use]
    pub fn off(switch_id: SwitchId) -> Self {
        Self {
            switch_id,
            state: OutputState::Off,
        }
    }

    /// Wire payload for this announcement.
    #[must_use]
    pub fn payload(&self) -> &'static str {
        self.state.as_str()
    }
}
