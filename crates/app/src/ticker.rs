//! Ticker: periodically expires deadlines and announces the result.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::controller::{SwitchController, TickReport};
use crate::ports::{Actuator, PublishError, StatePublisher};

/// Drives [`SwitchController::tick`] on a fixed period.
pub struct Ticker<A, P> {
    controller: Arc<SwitchController<A>>,
    publisher: P,
    period: Duration,
}

impl<A, P> Ticker<A, P>
where
    A: Actuator,
    P: StatePublisher,
{
    /// Create a ticker that checks deadlines every `period`.
    pub fn new(controller: Arc<SwitchController<A>>, publisher: P, period: Duration) -> Self {
        Self {
            controller,
            publisher,
            period,
        }
    }

    /// Run until `cancel` fires.
    ///
    /// Missed ticks (e.g. after the process was suspended) are skipped
    /// rather than replayed; the next tick still sees every overdue deadline.
    pub async fn run(self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::debug!(period_ms = self.period.as_millis(), "ticker started");
        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                _ = interval.tick() => {
                    self.tick_once(Instant::now().into_std());
                }
            }
        }
        tracing::debug!("ticker stopped");
    }

    /// Run a single tick at `now` and forward its announcements.
    ///
    /// Publishing is fire-and-forget: failures are logged and the remaining
    /// announcements are still sent.
    pub fn tick_once(&self, now: std::time::Instant) -> TickReport {
        let report = self.controller.tick(now);
        for announcement in &report.announcements {
            match self.publisher.publish(*announcement) {
                Ok(()) => {}
                Err(PublishError::Backlogged) => {
                    tracing::warn!(switch = %announcement.switch_id, "outbound queue full, announcement dropped");
                }
                Err(err) => {
                    tracing::warn!(switch = %announcement.switch_id, error = %err, "failed to announce");
                }
            }
        }
        report
    }
}
