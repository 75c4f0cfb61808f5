//! # gpioswitch-adapter-gpio
//!
//! GPIO adapter: drives one Raspberry Pi output pin per switch.
//!
//! Pins are claimed through `rppal` (which maps `/dev/gpiomem`) when the
//! actuator is built, configured as outputs and driven low. They are driven
//! low again and handed back when the actuator is dropped.
//!
//! ## Dependency rule
//!
//! Same as other adapters: depends on `gpioswitch-app` and `gpioswitch-domain`.

mod error;

pub use error::GpioError;

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use rppal::gpio::{Gpio, OutputPin};

use gpioswitch_app::ports::{Actuator, ActuatorError};
use gpioswitch_domain::id::SwitchId;

/// Actuator backed by memory-mapped GPIO output pins.
pub struct RppalActuator {
    pins: Mutex<BTreeMap<SwitchId, OutputPin>>,
}

impl RppalActuator {
    /// Claim the pin of every switch as a low output.
    ///
    /// # Errors
    ///
    /// Returns [`GpioError::Init`] if the GPIO peripheral is not accessible,
    /// or [`GpioError::Claim`] if a pin is unavailable or already in use.
    pub fn new(switch_ids: impl IntoIterator<Item = SwitchId>) -> Result<Self, GpioError> {
        let gpio = Gpio::new().map_err(GpioError::Init)?;

        let mut pins = BTreeMap::new();
        for switch_id in switch_ids {
            let pin = gpio
                .get(switch_id.pin())
                .map_err(|source| GpioError::Claim { switch_id, source })?;
            let mut output = pin.into_output_low();
            output.set_reset_on_drop(true);
            tracing::debug!(pin = switch_id.pin(), "output pin claimed");
            pins.insert(switch_id, output);
        }

        tracing::info!(count = pins.len(), "GPIO outputs ready");
        Ok(Self {
            pins: Mutex::new(pins),
        })
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<SwitchId, OutputPin>> {
        self.pins.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Actuator for RppalActuator {
    fn set_output(&self, switch_id: SwitchId, on: bool) -> Result<(), ActuatorError> {
        let mut pins = self.lock();
        let pin = pins
            .get_mut(&switch_id)
            .ok_or(ActuatorError::Unclaimed(switch_id))?;
        if on {
            pin.set_high();
        } else {
            pin.set_low();
        }
        Ok(())
    }
}

impl Drop for RppalActuator {
    fn drop(&mut self) {
        let pins = self
            .pins
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        for pin in pins.values_mut() {
            pin.set_low();
        }
        tracing::info!("GPIO outputs released");
    }
}
