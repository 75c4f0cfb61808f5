//! Output and lifecycle states of a switch.

use crate::time::Timestamp;

/// Logical level of a switch output, as announced on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputState {
    On,
    Off,
}

impl OutputState {
    /// Wire token for this state.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
        }
    }
}

impl std::fmt::Display for OutputState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of a switch.
///
/// ```text
/// Idle --Activate--> ActiveTimed
/// ActiveTimed --Activate--> ActiveTimed (deadline refreshed)
/// ActiveTimed --Deactivate | deadline elapsed--> Idle
/// ```
///
/// [`ActiveLatched`](Self::ActiveLatched) (on without a deadline) is
/// reserved; the current policy always arms a deadline on activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchState {
    Idle,
    ActiveTimed { deadline: Timestamp },
    ActiveLatched,
}

impl SwitchState {
    /// Output level implied by this state.
    #[must_use]
    pub fn output(self) -> OutputState {
        match self {
            Self::Idle => OutputState::Off,
            Self::ActiveTimed { .. } | Self::ActiveLatched => OutputState::On,
        }
    }
}
