//! Controller configuration and init-time validation.
//!
//! Every tunable of the loop lives in one serializable struct so that a
//! session's parameters can be recorded next to its data and replayed
//! exactly. Validation is fatal: a controller with inverted thresholds
//! or an out-of-range smoothing factor would run forever and simply
//! never switch, so constructors refuse an invalid set before anything
//! starts.
//!
//! Copyright (c) 2025 Mohammad Atashi. All rights reserved.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::detect::DetectorConfig;

/// Weight kept by the previous score on conflict cycles.
pub const DEFAULT_SMOOTHING_ALPHA: f64 = 0.9;
/// Multiplicative per-cycle decay applied on quiet cycles.
pub const DEFAULT_DECAY_RATE: f64 = 0.995;
/// Score above which hand tracking escalates to assistance.
pub const DEFAULT_THRESHOLD_HIGH: f64 = 0.75;
/// Score below which assistance relaxes back to hand tracking.
pub const DEFAULT_THRESHOLD_LOW: f64 = 0.25;
/// Control cycle rate matched to a 90 Hz headset refresh.
pub const DEFAULT_CYCLE_RATE_HZ: u32 = 90;

const DEFAULT_TELEMETRY_CAPACITY: usize = 256;

/// Rejection raised by [`ControllerConfig::validate`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("threshold_low ({low}) must be strictly below threshold_high ({high})")]
    ThresholdOrder { low: f64, high: f64 },
    #[error("smoothing_alpha ({0}) must lie strictly inside (0, 1)")]
    SmoothingOutOfRange(f64),
    #[error("decay_rate ({0}) must lie strictly inside (0, 1)")]
    DecayOutOfRange(f64),
    #[error("cycle_rate_hz must be non-zero")]
    ZeroCycleRate,
    #[error("detector latency window [{start:?}, {end:?}] is empty or inverted")]
    LatencyWindow { start: Duration, end: Duration },
    #[error("detector baseline span must be non-zero")]
    EmptyBaseline,
    #[error("detector min_deflection ({0}) must be finite and non-negative")]
    DeflectionFloor(f64),
    #[error("detector amplitude_scale ({0}) must be finite and positive")]
    AmplitudeScale(f64),
}

/// Complete parameter set of an adaptive controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Weight kept by the previous score when a conflict is folded in.
    pub smoothing_alpha: f64,
    /// Per-cycle multiplicative decay applied on quiet cycles.
    pub decay_rate: f64,
    /// Escalation threshold; strictly exceeding it switches to
    /// controller-assisted input.
    pub threshold_high: f64,
    /// De-escalation threshold; strictly undershooting it restores
    /// hand tracking.
    pub threshold_low: f64,
    /// Nominal control cycle rate in Hz.
    pub cycle_rate_hz: u32,
    /// Confine the score to `[0, 1]` after every update. Off by
    /// default; with calibrated amplitudes the score is naturally
    /// bounded and clamping would only mask a miscalibration.
    pub clamp_score: bool,
    /// Transitions retained in the in-memory telemetry log.
    pub telemetry_capacity: usize,
    /// Parameters of the FRN detector.
    pub detector: DetectorConfig,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            smoothing_alpha: DEFAULT_SMOOTHING_ALPHA,
            decay_rate: DEFAULT_DECAY_RATE,
            threshold_high: DEFAULT_THRESHOLD_HIGH,
            threshold_low: DEFAULT_THRESHOLD_LOW,
            cycle_rate_hz: DEFAULT_CYCLE_RATE_HZ,
            clamp_score: false,
            telemetry_capacity: DEFAULT_TELEMETRY_CAPACITY,
            detector: DetectorConfig::default(),
        }
    }
}

impl ControllerConfig {
    /// Check every invariant the loop depends on.
    ///
    /// NaN parameters fail the corresponding range check and are
    /// rejected like any other out-of-range value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.smoothing_alpha > 0.0 && self.smoothing_alpha < 1.0) {
            return Err(ConfigError::SmoothingOutOfRange(self.smoothing_alpha));
        }
        if !(self.decay_rate > 0.0 && self.decay_rate < 1.0) {
            return Err(ConfigError::DecayOutOfRange(self.decay_rate));
        }
        if !(self.threshold_low < self.threshold_high) {
            return Err(ConfigError::ThresholdOrder {
                low: self.threshold_low,
                high: self.threshold_high,
            });
        }
        if self.cycle_rate_hz == 0 {
            return Err(ConfigError::ZeroCycleRate);
        }
        self.detector.validate()
    }

    /// Nominal duration of one control cycle.
    pub fn cycle_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.cycle_rate_hz.max(1)))
    }
}
