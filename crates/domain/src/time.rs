//! Time and deadline helpers.
//!
//! All deadlines are measured on the monotonic clock so wall-clock
//! adjustments can never fire or suppress an auto-off.

use std::time::{Duration, Instant};

/// Monotonic timestamp used for command arrival, ticks and deadlines.
pub type Timestamp = Instant;

/// Longest accepted auto-off timeout (one week).
pub const MAX_TIMEOUT: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Signed distance from `now` to `deadline`, in milliseconds.
///
/// Negative once the deadline has passed. Used for log fields.
#[must_use]
pub fn millis_until(deadline: Timestamp, now: Timestamp) -> i64 {
    let (magnitude, sign) = match deadline.checked_duration_since(now) {
        Some(ahead) => (ahead, 1),
        None => (now.duration_since(deadline), -1),
    };
    sign * i64::try_from(magnitude.as_millis()).unwrap_or(i64::MAX)
}
