//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`GpioSwitchError`] at port boundaries.

use crate::id::SwitchId;

/// Boxed error coming from an adapter (hardware, network, …).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Top-level error shared by all layers.
#[derive(Debug, thiserror::Error)]
pub enum GpioSwitchError {
    /// A domain invariant was violated.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// The output hardware could not be driven.
    #[error("hardware error")]
    Hardware(#[source] BoxError),

    /// The message transport failed.
    #[error("transport error")]
    Transport(#[source] BoxError),
}

/// Domain invariant violations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A switch was given an empty name.
    #[error("switch name must not be empty")]
    EmptyName,

    /// The switch set must contain at least one switch.
    #[error("at least one switch must be configured")]
    NoSwitches,

    /// Two switches share the same id.
    #[error("switch {0} is configured more than once")]
    DuplicateSwitch(SwitchId),

    /// The pin number is outside the BCM GPIO range.
    #[error("pin {pin} is out of range (max {max})")]
    PinOutOfRange {
        /// The rejected pin.
        pin: u8,
        /// Highest accepted pin.
        max: u8,
    },

    /// The auto-off timeout must be positive.
    #[error("timeout must be greater than zero")]
    ZeroTimeout,

    /// The auto-off timeout is unreasonably long.
    #[error("timeout of {secs}s exceeds the maximum of {max_secs}s")]
    TimeoutTooLong {
        /// The rejected timeout, in seconds.
        secs: u64,
        /// Maximum accepted timeout, in seconds.
        max_secs: u64,
    },
}
