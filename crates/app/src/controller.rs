//! Switch timeout controller: owns switch state and auto-off deadlines.
//!
//! Commands turn a switch on (arming a deadline `timeout` after arrival) or
//! off (disarming it). A periodic [`tick`](SwitchController::tick) turns off
//! every switch whose deadline has been reached and reports the
//! announcements to publish.
//!
//! Deadlines are absolute monotonic timestamps, so a stalled or jittery
//! tick loop delays an expiry by at most the stall itself.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use gpioswitch_domain::announcement::Announcement;
use gpioswitch_domain::command::{Action, Command};
use gpioswitch_domain::error::ValidationError;
use gpioswitch_domain::id::SwitchId;
use gpioswitch_domain::switch::{Switch, SwitchState};
use gpioswitch_domain::time::{MAX_TIMEOUT, Timestamp, millis_until};

use crate::ports::{Actuator, ActuatorError};

/// Result of [`SwitchController::handle_command`].
#[derive(Debug)]
pub enum CommandOutcome {
    /// The command addressed a switch that is not configured.
    UnknownSwitch,
    /// The command was applied to the switch table.
    ///
    /// `actuator_error` is set when the output write failed; the
    /// bookkeeping change is kept regardless.
    Applied {
        state: SwitchState,
        actuator_error: Option<ActuatorError>,
    },
}

impl CommandOutcome {
    /// Whether the command addressed a known switch.
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

/// Result of one [`SwitchController::tick`].
#[derive(Debug, Default)]
pub struct TickReport {
    /// One announcement per switch that expired during this tick.
    pub announcements: Vec<Announcement>,
    /// Output writes that failed while turning expired switches off.
    pub failures: Vec<ActuatorError>,
}

impl TickReport {
    /// Whether nothing expired.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.announcements.is_empty() && self.failures.is_empty()
    }
}

struct SwitchTable {
    switches: BTreeMap<SwitchId, Switch>,
    last_tick: Option<Timestamp>,
}

/// Single owner of every switch's `(output, deadline)` pair.
///
/// Safe to share between the command intake and the ticker: all access goes
/// through one mutex, and actuator writes happen under it so the recorded
/// state and the physical output never diverge between two callers.
pub struct SwitchController<A> {
    actuator: A,
    timeout: Duration,
    table: Mutex<SwitchTable>,
}

impl<A: Actuator> SwitchController<A> {
    /// Create a controller for a fixed set of idle switches.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if `switches` is empty, contains the
    /// same id twice, or if `timeout` is zero or longer than
    /// [`MAX_TIMEOUT`].
    pub fn new(
        switches: Vec<Switch>,
        timeout: Duration,
        actuator: A,
    ) -> Result<Self, ValidationError> {
        if timeout.is_zero() {
            return Err(ValidationError::ZeroTimeout);
        }
        if timeout > MAX_TIMEOUT {
            return Err(ValidationError::TimeoutTooLong {
                secs: timeout.as_secs(),
                max_secs: MAX_TIMEOUT.as_secs(),
            });
        }
        if switches.is_empty() {
            return Err(ValidationError::NoSwitches);
        }

        let mut table = BTreeMap::new();
        for switch in switches {
            let id = switch.id();
            if table.insert(id, switch).is_some() {
                return Err(ValidationError::DuplicateSwitch(id));
            }
        }

        Ok(Self {
            actuator,
            timeout,
            table: Mutex::new(SwitchTable {
                switches: table,
                last_tick: None,
            }),
        })
    }

    /// Auto-off timeout applied on every activation.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Ids of all configured switches, in ascending order.
    #[must_use]
    pub fn switch_ids(&self) -> Vec<SwitchId> {
        self.lock().switches.keys().copied().collect()
    }

    /// Current state of one switch, or `None` if it is not configured.
    #[must_use]
    pub fn state_of(&self, switch_id: SwitchId) -> Option<SwitchState> {
        self.lock().switches.get(&switch_id).map(Switch::state)
    }

    /// Copy of every switch, in ascending id order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Switch> {
        self.lock().switches.values().cloned().collect()
    }

    /// Apply a decoded [`Command`] received at `now`.
    pub fn apply(&self, command: Command, now: Timestamp) -> CommandOutcome {
        self.handle_command(command.switch_id, command.action, now)
    }

    /// Apply `action` to `switch_id` at `now`.
    ///
    /// `Activate` drives the output high and arms the deadline at
    /// `now + timeout`, replacing any earlier one. `Deactivate` drives the
    /// output low and disarms the deadline. Unknown switches are ignored.
    pub fn handle_command(
        &self,
        switch_id: SwitchId,
        action: Action,
        now: Timestamp,
    ) -> CommandOutcome {
        let mut table = self.lock();
        let Some(switch) = table.switches.get_mut(&switch_id) else {
            tracing::debug!(switch = %switch_id, ?action, "command for unknown switch ignored");
            return CommandOutcome::UnknownSwitch;
        };

        let on = match action {
            Action::Activate => {
                let deadline = switch.activate(now, self.timeout);
                tracing::info!(
                    switch = %switch_id,
                    name = switch.name(),
                    deadline_in_ms = millis_until(deadline, now),
                    "switch on, auto-off armed"
                );
                true
            }
            Action::Deactivate => {
                switch.deactivate();
                tracing::info!(switch = %switch_id, name = switch.name(), "switch off");
                false
            }
        };
        let state = switch.state();

        let actuator_error = self.actuator.set_output(switch_id, on).err();
        if let Some(err) = &actuator_error {
            tracing::error!(switch = %switch_id, on, error = %err, "failed to drive output");
        }

        CommandOutcome::Applied {
            state,
            actuator_error,
        }
    }

    /// Turn off every switch whose deadline is at or before `now`.
    ///
    /// Each expiry is reported exactly once. Ticks must be strictly
    /// increasing: a `now` at or before the latest tick seen so far is
    /// ignored and fires nothing. A failed output write is recorded and the
    /// remaining switches are still processed.
    pub fn tick(&self, now: Timestamp) -> TickReport {
        let mut table = self.lock();
        if table.last_tick.is_some_and(|last| now <= last) {
            tracing::debug!("tick without a later timestamp ignored");
            return TickReport::default();
        }
        table.last_tick = Some(now);

        let mut report = TickReport::default();
        for switch in table.switches.values_mut() {
            if !switch.expire_if_due(now) {
                continue;
            }
            let switch_id = switch.id();
            tracing::info!(switch = %switch_id, name = switch.name(), "timeout elapsed, switch off");

            if let Err(err) = self.actuator.set_output(switch_id, false) {
                tracing::error!(switch = %switch_id, error = %err, "failed to drive output");
                report.failures.push(err);
            }
            report.announcements.push(Announcement::off(switch_id));
        }
        report
    }

    fn lock(&self) -> MutexGuard<'_, SwitchTable> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
