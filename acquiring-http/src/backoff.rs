//! Delay schedules.
//!
//! The transport never replays a request on its own: acquiring operations are
//! not idempotent, and a replayed `Init` creates a second payment.
//! [`BackoffStrategy`] paces payment status polling upstream.

use std::time::Duration;

/// Delay schedule between attempts.
#[derive(Debug, Clone, PartialEq)]
pub enum BackoffStrategy {
    None,
    Constant(Duration),
    /// `initial * multiplier^attempt`, never above `max`.
    Exponential {
        initial: Duration,
        max: Duration,
        multiplier: f64,
    },
}

impl BackoffStrategy {
    /// Delay after the 0-indexed `attempt`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        match self {
            Self::None => Duration::ZERO,
            Self::Constant(delay) => *delay,
            Self::Exponential {
                initial,
                max,
                multiplier,
            } => {
                let scaled = initial.as_secs_f64() * multiplier.powi(attempt.min(32) as i32);
                Duration::try_from_secs_f64(scaled).map_or(*max, |delay| delay.min(*max))
            }
        }
    }
}
