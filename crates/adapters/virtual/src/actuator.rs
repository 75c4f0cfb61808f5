//! Virtual actuator: output levels kept in memory.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use gpioswitch_app::ports::{Actuator, ActuatorError};
use gpioswitch_domain::id::SwitchId;

#[derive(Default)]
struct Outputs {
    levels: HashMap<SwitchId, bool>,
    writes: usize,
    failing: HashSet<SwitchId>,
}

/// An actuator that records output levels instead of touching hardware.
///
/// Only switches passed to [`new`](Self::new) are claimed; writes to any
/// other id fail with [`ActuatorError::Unclaimed`], mirroring a GPIO
/// backend that only owns the configured pins.
pub struct VirtualActuator {
    outputs: Mutex<Outputs>,
}

impl VirtualActuator {
    /// Claim `switch_ids`, all starting low.
    #[must_use]
    pub fn new(switch_ids: impl IntoIterator<Item = SwitchId>) -> Self {
        let levels = switch_ids.into_iter().map(|id| (id, false)).collect();
        Self {
            outputs: Mutex::new(Outputs {
                levels,
                ..Outputs::default()
            }),
        }
    }

    /// Current level of a claimed output.
    #[must_use]
    pub fn level(&self, switch_id: SwitchId) -> Option<bool> {
        self.lock().levels.get(&switch_id).copied()
    }

    /// Number of successful writes so far.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.lock().writes
    }

    /// Make every subsequent write to `switch_id` fail (or succeed again).
    pub fn set_failing(&self, switch_id: SwitchId, failing: bool) {
        let mut outputs = self.lock();
        if failing {
            outputs.failing.insert(switch_id);
        } else {
            outputs.failing.remove(&switch_id);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Outputs> {
        self.outputs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Actuator for VirtualActuator {
    fn set_output(&self, switch_id: SwitchId, on: bool) -> Result<(), ActuatorError> {
        let mut outputs = self.lock();
        if outputs.failing.contains(&switch_id) {
            return Err(ActuatorError::Write {
                switch_id,
                source: "simulated output failure".into(),
            });
        }
        let Some(level) = outputs.levels.get_mut(&switch_id) else {
            return Err(ActuatorError::Unclaimed(switch_id));
        };
        *level = on;
        outputs.writes += 1;
        tracing::debug!(switch = %switch_id, on, "virtual output written");
        Ok(())
    }
}
