//! Error types for the simulation core.
//!
//! Most "failures" here are deliberately not errors: a position outside the
//! lattice resolves to `None`, and an unreachable pathfinding goal yields an
//! empty path. Only genuine caller bugs surface as typed errors.

use thiserror::Error;

/// Errors raised by the scheduling API.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ScheduleError {
    /// A non-finite or negative delay was passed to a duration-based schedule
    /// call. The request is logged and dropped rather than halting the tick.
    #[error("invalid event delay: {0}")]
    InvalidDuration(f64),
}
