//! Actuation seam between the control loop and the interaction backend.
//!
//! The controller decides; the actuator applies. Keeping the seam this
//! thin lets the same loop drive a real interaction stack, a recording
//! harness, or nothing at all during calibration sweeps. Actuation
//! failures are recoverable by contract: the loop reports them and
//! keeps running with its internal mode already advanced, retrying
//! implicitly on the next transition.
//!
//! Copyright (c) 2025 Mohammad Atashi. All rights reserved.

use std::fmt::Debug;

use thiserror::Error;

use crate::mode::InteractionMode;

/// Failure surfaced by an interaction backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActuatorError {
    /// The backend refused the requested mode.
    #[error("interaction backend rejected switch to {}: {reason}", .mode.name())]
    Rejected {
        mode: InteractionMode,
        reason: String,
    },
    /// The backend could not be reached at all.
    #[error("interaction backend unavailable: {0}")]
    Unavailable(String),
}

/// Applies a committed mode to the interaction backend.
pub trait ModeActuator: Send + Sync + Debug {
    /// Make `mode` the active input configuration.
    ///
    /// Called once per committed transition, never per cycle. Must not
    /// block the control loop.
    fn set_mode(&mut self, mode: InteractionMode) -> Result<(), ActuatorError>;
}

/// Actuator that accepts every command and touches nothing.
///
/// Used by calibration sweeps and tests, where only the controller's
/// internal trajectory matters.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullActuator;

impl ModeActuator for NullActuator {
    fn set_mode(&mut self, _mode: InteractionMode) -> Result<(), ActuatorError> {
        Ok(())
    }
}
