//! Conflict event detection from action-aligned EEG features.
//!
//! # Theoretical Foundation
//!
//! When an action produces an outcome worse than expected, fronto-central
//! EEG shows a negative deflection roughly 200-350 ms after the feedback,
//! the feedback-related negativity (FRN; Miltner, Braun & Coles, 1997;
//! Gehring & Willoughby, 2002). Reinforcement-learning accounts tie its
//! magnitude to the size of the reward prediction error (Holroyd & Coles,
//! 2002), which makes it a usable index of the user-machine conflict this
//! crate regulates: a mismatch between what the user meant and what the
//! interface did elicits an FRN without requiring any overt report.
//!
//! [`FrnDetector`] implements a plain amplitude criterion
//! over pre-binned features: mean pre-action baseline, minimum within the
//! post-action latency window, and a fixed deflection floor. Template
//! matching and single-trial classifiers belong upstream in the signal
//! processing pipeline; by the time data reaches this crate it is a small
//! vector of microvolt bins.
//!
//! Copyright (c) 2025 Mohammad Atashi. All rights reserved.

use std::fmt::Debug;
use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::signal::SensorSnapshot;

/// Canonical FRN latency window onset after action feedback.
const DEFAULT_WINDOW_START: Duration = Duration::from_millis(200);
/// Canonical FRN latency window offset after action feedback.
const DEFAULT_WINDOW_END: Duration = Duration::from_millis(350);
/// Pre-action span whose mean amplitude serves as the baseline.
const DEFAULT_BASELINE_SPAN: Duration = Duration::from_millis(100);
/// Minimum baseline-to-trough deflection accepted as an FRN, microvolts.
const DEFAULT_MIN_DEFLECTION: f64 = 2.0;
/// Microvolts-to-score-units conversion applied to accepted deflections.
const DEFAULT_AMPLITUDE_SCALE: f64 = 0.1;

/// Outcome of classifying one cycle of sensor data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConflictEvent {
    /// Whether an error-related neural response followed the last action.
    pub occurred: bool,
    /// Response strength in score units; `0.0` when nothing occurred.
    pub amplitude: f64,
}

impl ConflictEvent {
    /// The quiet outcome: no evidence of conflict on this cycle.
    pub fn none() -> Self {
        Self {
            occurred: false,
            amplitude: 0.0,
        }
    }

    /// A detected conflict with the given non-negative strength.
    pub fn detected(amplitude: f64) -> Self {
        Self {
            occurred: true,
            amplitude: amplitude.max(0.0),
        }
    }
}

/// Amplitude-criterion parameters for [`FrnDetector`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Start of the post-action latency window, relative to action onset.
    pub window_start: Duration,
    /// End of the post-action latency window, relative to action onset.
    pub window_end: Duration,
    /// Length of the pre-action baseline span.
    pub baseline_span: Duration,
    /// Smallest baseline-to-trough deflection reported as a conflict,
    /// in microvolts.
    pub min_deflection: f64,
    /// Factor converting an accepted deflection into score units.
    pub amplitude_scale: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            window_start: DEFAULT_WINDOW_START,
            window_end: DEFAULT_WINDOW_END,
            baseline_span: DEFAULT_BASELINE_SPAN,
            min_deflection: DEFAULT_MIN_DEFLECTION,
            amplitude_scale: DEFAULT_AMPLITUDE_SCALE,
        }
    }
}

impl DetectorConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.window_start >= self.window_end {
            return Err(ConfigError::LatencyWindow {
                start: self.window_start,
                end: self.window_end,
            });
        }
        if self.baseline_span.is_zero() {
            return Err(ConfigError::EmptyBaseline);
        }
        if !self.min_deflection.is_finite() || self.min_deflection < 0.0 {
            return Err(ConfigError::DeflectionFloor(self.min_deflection));
        }
        if !self.amplitude_scale.is_finite() || self.amplitude_scale <= 0.0 {
            return Err(ConfigError::AmplitudeScale(self.amplitude_scale));
        }
        Ok(())
    }
}

/// Classifier turning one cycle of sensor data into a [`ConflictEvent`].
///
/// Implementations hold no per-cycle mutable state; classification is a
/// pure function of the snapshot and the detector's configuration.
pub trait ConflictDetector: Send + Sync + Debug {
    fn classify(&self, snapshot: &SensorSnapshot) -> ConflictEvent;
}

/// Baseline-relative trough detector over the FRN latency window.
#[derive(Debug, Clone)]
pub struct FrnDetector {
    config: DetectorConfig,
}

impl FrnDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }
}

impl Default for FrnDetector {
    fn default() -> Self {
        Self::new(DetectorConfig::default())
    }
}

impl ConflictDetector for FrnDetector {
    fn classify(&self, snapshot: &SensorSnapshot) -> ConflictEvent {
        let action = match &snapshot.last_action {
            Some(action) => action,
            None => return ConflictEvent::none(),
        };
        let epoch = match &snapshot.eeg {
            Some(epoch) => epoch,
            None => return ConflictEvent::none(),
        };

        let baseline_from = action.onset.saturating_sub(self.config.baseline_span);
        let window_from = action.onset + self.config.window_start;
        let window_to = action.onset + self.config.window_end;

        // An epoch that does not span both the baseline and the full
        // latency window is stale or truncated; classify the cycle as
        // quiet rather than judging partial evidence.
        if !epoch.covers(baseline_from, window_to) {
            return ConflictEvent::none();
        }
        let baseline_bins = epoch.bins_overlapping(baseline_from, action.onset);
        let window_bins = epoch.bins_overlapping(window_from, window_to);
        if baseline_bins.is_empty() || window_bins.is_empty() {
            return ConflictEvent::none();
        }

        let baseline = baseline_bins.iter().sum::<f64>() / baseline_bins.len() as f64;
        let trough = window_bins.iter().fold(f64::INFINITY, |acc, &v| acc.min(v));
        let deflection = baseline - trough;
        if deflection < self.config.min_deflection {
            return ConflictEvent::none();
        }

        let amplitude = deflection * self.config.amplitude_scale;
        debug!(
            "FRN after {:?} at cycle {}: deflection {:.2} uV, amplitude {:.3}",
            action.action, snapshot.cycle.index, deflection, amplitude
        );
        ConflictEvent::detected(amplitude)
    }
}
