//! GPIO adapter error types.

use gpioswitch_domain::error::GpioSwitchError;
use gpioswitch_domain::id::SwitchId;

/// Errors specific to the GPIO adapter.
#[derive(Debug, thiserror::Error)]
pub enum GpioError {
    /// The GPIO peripheral could not be opened.
    #[error("GPIO peripheral unavailable")]
    Init(#[source] rppal::gpio::Error),

    /// A switch's pin could not be claimed.
    #[error("failed to claim pin for switch {switch_id}")]
    Claim {
        switch_id: SwitchId,
        #[source]
        source: rppal::gpio::Error,
    },
}

impl GpioError {
    /// Convert into a [`GpioSwitchError::Hardware`] for propagation across
    /// port boundaries.
    #[must_use]
    pub fn into_domain(self) -> GpioSwitchError {
        GpioSwitchError::Hardware(Box::new(self))
    }
}

impl From<GpioError> for GpioSwitchError {
    fn from(err: GpioError) -> Self {
        err.into_domain()
    }
}
