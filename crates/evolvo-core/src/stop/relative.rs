//! Relative elapsed time stop condition
//!
//! ```text
//! stop  ⇔  elapsed_nanos / avg_load_penalty_nanos > r
//! ```
//!
//! Normalising elapsed time by the cost of one real evaluation lets the same
//! `r` behave alike on cheap and expensive problems.

use super::StopCondition;
use crate::evaluation::LoadStats;
use crate::event::Event;
use evolvo_common::{ConfigError, NANOS_PER_MILLI};
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Stops once the run has lasted more than `r` average evaluations
pub struct RelativeElapsedTime {
    r: f64,
    stats: Arc<dyn LoadStats>,
}

impl RelativeElapsedTime {
    /// `r` must be finite and strictly positive
    pub fn new(r: f64, stats: Arc<dyn LoadStats>) -> Result<Self, ConfigError> {
        if !r.is_finite() || r <= 0.0 {
            return Err(ConfigError::InvalidRatio(r));
        }
        Ok(Self { r, stats })
    }

    pub fn ratio(&self) -> f64 {
        self.r
    }

    /// Decision for an explicit elapsed time, shared by every event type
    pub fn exceeded(&self, elapsed_millis: u64) -> bool {
        let avg_nanos = self.stats.average_load_penalty();
        // No timed evaluation yet
        if avg_nanos <= 0.0 || !avg_nanos.is_finite() {
            return false;
        }
        let elapsed_nanos = elapsed_millis as f64 * NANOS_PER_MILLI;
        let ratio = elapsed_nanos / avg_nanos;
        trace!(ratio, r = self.r, "Relative elapsed time");
        ratio > self.r
    }
}

impl fmt::Debug for RelativeElapsedTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelativeElapsedTime")
            .field("r", &self.r)
            .finish_non_exhaustive()
    }
}

impl<G, S, F> StopCondition<G, S, F> for RelativeElapsedTime {
    fn should_stop(&self, event: &Event<G, S, F>) -> bool {
        self.exceeded(event.state().elapsed_millis())
    }
}
