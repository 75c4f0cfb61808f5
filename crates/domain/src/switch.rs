//! Switch: a named binary output with an optional auto-off deadline.

mod state;

pub use state::{OutputState, SwitchState};

use std::time::Duration;

use crate::error::ValidationError;
use crate::id::SwitchId;
use crate::time::Timestamp;

/// A binary output controlled by commands and subject to auto-off.
///
/// The `(output, deadline)` pair is only ever changed through the methods
/// below so a switch can never be off while still holding a deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Switch {
    id: SwitchId,
    name: String,
    output: bool,
    deadline: Option<Timestamp>,
}

impl Switch {
    /// Create an idle switch.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyName`] if `name` is blank.
    pub fn new(id: SwitchId, name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        Ok(Self {
            id,
            name,
            output: false,
            deadline: None,
        })
    }

    #[must_use]
    pub fn id(&self) -> SwitchId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the output is currently driven high.
    #[must_use]
    pub fn is_on(&self) -> bool {
        self.output
    }

    /// The armed auto-off deadline, if any.
    #[must_use]
    pub fn deadline(&self) -> Option<Timestamp> {
        self.deadline
    }

    /// Derived lifecycle state.
    #[must_use]
    pub fn state(&self) -> SwitchState {
        match (self.output, self.deadline) {
            (false, _) => SwitchState::Idle,
            (true, Some(deadline)) => SwitchState::ActiveTimed { deadline },
            (true, None) => SwitchState::ActiveLatched,
        }
    }

    /// Turn on and (re)arm the deadline at `now + timeout`.
    ///
    /// Returns the new deadline. An already armed deadline is overwritten.
    pub fn activate(&mut self, now: Timestamp, timeout: Duration) -> Timestamp {
        let deadline = now + timeout;
        self.output = true;
        self.deadline = Some(deadline);
        deadline
    }

    /// Turn off and disarm the deadline.
    pub fn deactivate(&mut self) {
        self.output = false;
        self.deadline = None;
    }

    /// Whether the armed deadline has been reached at `now`.
    #[must_use]
    pub fn is_due(&self, now: Timestamp) -> bool {
        self.deadline.is_some_and(|deadline| deadline <= now)
    }

    /// Deactivate if the deadline has been reached.
    ///
    /// Returns `true` exactly once per armed deadline.
    pub fn expire_if_due(&mut self, now: Timestamp) -> bool {
        if !self.is_due(now) {
            return false;
        }
        self.deactivate();
        true
    }
}
