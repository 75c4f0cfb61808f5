//! Actuator port: drives the physical output of a switch.

use gpioswitch_domain::error::{BoxError, GpioSwitchError};
use gpioswitch_domain::id::SwitchId;

/// Writes a switch output.
///
/// Implementations must return promptly: the controller calls this while
/// holding the switch table lock.
pub trait Actuator {
    /// Drive the output of `switch_id` high (`true`) or low (`false`).
    ///
    /// # Errors
    ///
    /// Returns an [`ActuatorError`] if the write could not be performed.
    fn set_output(&self, switch_id: SwitchId, on: bool) -> Result<(), ActuatorError>;
}

impl<T: Actuator + ?Sized> Actuator for std::sync::Arc<T> {
    fn set_output(&self, switch_id: SwitchId, on: bool) -> Result<(), ActuatorError> {
        (**self).set_output(switch_id, on)
    }
}

/// Failure to drive a switch output.
#[derive(Debug, thiserror::Error)]
pub enum ActuatorError {
    /// The actuator holds no output for this switch.
    #[error("no output claimed for switch {0}")]
    Unclaimed(SwitchId),

    /// The underlying write failed.
    #[error("failed to drive switch {switch_id}")]
    Write {
        switch_id: SwitchId,
        #[source]
        source: BoxError,
    },
}

impl From<ActuatorError> for GpioSwitchError {
    fn from(err: ActuatorError) -> Self {
        Self::Hardware(Box::new(err))
    }
}
