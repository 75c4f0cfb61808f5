//! Typed switch identifier.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Identifier of a switch: the BCM GPIO number of the pin it drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SwitchId(u8);

impl SwitchId {
    /// Highest BCM GPIO number on the BCM2835 family.
    pub const MAX_PIN: u8 = 53;

    /// Wrap a pin number without range checking.
    ///
    /// Ids arriving from the outside world may refer to pins that do not
    /// exist; lookups simply miss for them.
    #[must_use]
    pub const fn new(pin: u8) -> Self {
        Self(pin)
    }

    /// Wrap a pin number, rejecting anything outside the GPIO range.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::PinOutOfRange`] when `pin > MAX_PIN`.
    pub fn checked(pin: u8) -> Result<Self, ValidationError> {
        if pin > Self::MAX_PIN {
            return Err(ValidationError::PinOutOfRange {
                pin,
                max: Self::MAX_PIN,
            });
        }
        Ok(Self(pin))
    }

    /// The pin number.
    #[must_use]
    pub const fn pin(self) -> u8 {
        self.0
    }
}

impl fmt::Display for SwitchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for SwitchId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}
