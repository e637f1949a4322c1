//! Seeded synthetic conflict scenarios.
//!
//! Developing a closed-loop controller against live EEG is slow and
//! unrepeatable, so this module fabricates the whole sensing side as a
//! [`SignalSource`]: trials fire on a fixed cadence, each one randomly
//! conflicted or clean, and conflicted trials carry a negative
//! deflection in the canonical 200-350 ms post-onset window over a
//! noise floor. Every draw comes from a ChaCha20 stream cipher seeded
//! from the configuration, so a scenario is a pure function of its
//! config: same seed, same session, cycle for cycle.
//!
//! The scenario also remembers which action onsets were conflicted and
//! actually delivered, giving calibration code ground-truth labels that
//! a live session cannot provide.
//!
//! Copyright (c) 2025 Mohammad Atashi. All rights reserved.

use std::time::Duration;

use aegis_core::signal::{
    ActionEvent, CycleStamp, EegEpoch, SensorSnapshot, SignalSource, UserAction,
};
use log::debug;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::record::{RecordedSession, SessionHeader};

/// Epoch geometry mirrored from the detector defaults: 50 ms bins from
/// 100 ms before each action onset to 400 ms after it.
const BIN_WIDTH: Duration = Duration::from_millis(50);
const PRE_ONSET: Duration = Duration::from_millis(100);
const POST_ONSET: Duration = Duration::from_millis(400);
const BIN_COUNT: usize = 10;

/// Bins carrying the deflection on conflicted trials, covering the
/// 200-350 ms latency window.
const FRN_BINS: std::ops::Range<usize> = 6..9;

/// Polls between the end of an epoch and its delivery, standing in for
/// feature-extraction latency.
const PROCESSING_MARGIN_CYCLES: u64 = 2;

/// Rejection raised by [`SyntheticScenario::new`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScenarioError {
    #[error("{field} ({value}) must lie within [0, 1]")]
    Probability { field: &'static str, value: f64 },
    #[error("frn_amplitude range ({low}, {high}) must be positive and ordered")]
    AmplitudeRange { low: f64, high: f64 },
    #[error("noise_amplitude ({0}) must be finite and non-negative")]
    NoiseAmplitude(f64),
    #[error("action_period must be non-zero")]
    ZeroActionPeriod,
    #[error("duration_cycles must be non-zero")]
    ZeroDuration,
    #[error("cycle_rate_hz must be non-zero")]
    ZeroCycleRate,
}

/// Parameters of a synthetic session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// Poll cadence the scenario is laid out against.
    pub cycle_rate_hz: u32,
    /// Session length in cycles.
    pub duration_cycles: u64,
    /// Cycles between consecutive user actions.
    pub action_period: u64,
    /// Probability that a trial is conflicted.
    pub conflict_probability: f64,
    /// Uniform range of the deflection on conflicted trials, microvolts.
    pub frn_amplitude: (f64, f64),
    /// Half-width of the uniform noise floor on every bin, microvolts.
    pub noise_amplitude: f64,
    /// Probability that a trial's epoch is lost before delivery.
    pub dropout_probability: f64,
    /// Seed of the scenario's random stream.
    pub seed: u64,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            cycle_rate_hz: 90,
            duration_cycles: 5400,
            action_period: 180,
            conflict_probability: 0.3,
            frn_amplitude: (4.0, 8.0),
            noise_amplitude: 0.5,
            dropout_probability: 0.05,
            seed: 42,
        }
    }
}

impl ScenarioConfig {
    fn validate(&self) -> Result<(), ScenarioError> {
        for (field, value) in [
            ("conflict_probability", self.conflict_probability),
            ("dropout_probability", self.dropout_probability),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ScenarioError::Probability { field, value });
            }
        }
        let (low, high) = self.frn_amplitude;
        if !(low.is_finite() && high.is_finite() && low > 0.0 && low <= high) {
            return Err(ScenarioError::AmplitudeRange { low, high });
        }
        if !self.noise_amplitude.is_finite() || self.noise_amplitude < 0.0 {
            return Err(ScenarioError::NoiseAmplitude(self.noise_amplitude));
        }
        if self.action_period == 0 {
            return Err(ScenarioError::ZeroActionPeriod);
        }
        if self.duration_cycles == 0 {
            return Err(ScenarioError::ZeroDuration);
        }
        if self.cycle_rate_hz == 0 {
            return Err(ScenarioError::ZeroCycleRate);
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct PendingTrial {
    due: u64,
    onset_index: u64,
    conflict: bool,
    action: ActionEvent,
    eeg: Option<EegEpoch>,
}

/// Deterministic fabricated sensing session.
#[derive(Debug)]
pub struct SyntheticScenario {
    config: ScenarioConfig,
    rng: ChaCha20Rng,
    period: Duration,
    latency_cycles: u64,
    cursor: CycleStamp,
    pending: Option<PendingTrial>,
    conflict_onsets: Vec<u64>,
}

impl SyntheticScenario {
    pub fn new(config: ScenarioConfig) -> Result<Self, ScenarioError> {
        config.validate()?;
        let period = Duration::from_secs_f64(1.0 / f64::from(config.cycle_rate_hz));
        let latency_cycles = (POST_ONSET.as_secs_f64() * f64::from(config.cycle_rate_hz)).ceil()
            as u64
            + PROCESSING_MARGIN_CYCLES;
        Ok(Self {
            rng: ChaCha20Rng::seed_from_u64(config.seed),
            config,
            period,
            latency_cycles,
            cursor: CycleStamp::origin(),
            pending: None,
            conflict_onsets: Vec::new(),
        })
    }

    /// Cycle indices of action onsets whose conflicted epochs were
    /// delivered. Complete once the scenario is drained.
    pub fn conflict_onsets(&self) -> &[u64] {
        &self.conflict_onsets
    }

    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    /// Drain the scenario into a recorded session with ground-truth
    /// labels in the header.
    pub fn record(mut self, description: impl Into<String>) -> RecordedSession {
        let mut snapshots = Vec::with_capacity(self.config.duration_cycles as usize);
        while let Some(snapshot) = self.poll() {
            snapshots.push(snapshot);
        }
        RecordedSession {
            header: SessionHeader {
                session_id: Uuid::new_v4(),
                cycle_rate_hz: self.config.cycle_rate_hz,
                description: description.into(),
                conflict_onsets: self.conflict_onsets,
            },
            snapshots,
        }
    }

    fn random_action(&mut self) -> UserAction {
        match self.rng.gen_range(0..5u8) {
            0 => UserAction::Grab,
            1 => UserAction::Release,
            2 => UserAction::Place,
            3 => UserAction::Press,
            _ => UserAction::Point,
        }
    }

    fn synthesize_epoch(&mut self, onset: Duration, conflicted: bool) -> EegEpoch {
        let noise = self.config.noise_amplitude;
        let (low, high) = self.config.frn_amplitude;
        let deflection = if conflicted {
            self.rng.gen_range(low..=high)
        } else {
            0.0
        };
        let mut amplitudes = Vec::with_capacity(BIN_COUNT);
        for bin in 0..BIN_COUNT {
            let mut value = self.rng.gen_range(-noise..=noise);
            if conflicted && FRN_BINS.contains(&bin) {
                // Full deflection mid-window, shoulders at 60%.
                let weight = if bin == 7 { 1.0 } else { 0.6 };
                value -= deflection * weight;
            }
            amplitudes.push(value);
        }
        EegEpoch {
            start: onset.saturating_sub(PRE_ONSET),
            bin_width: BIN_WIDTH,
            amplitudes,
        }
    }

    fn schedule_trial(&mut self, stamp: CycleStamp) {
        let action = ActionEvent {
            action: self.random_action(),
            onset: stamp.elapsed,
        };
        let conflicted = self.rng.gen_bool(self.config.conflict_probability);
        let dropped = self.rng.gen_bool(self.config.dropout_probability);
        let eeg = if dropped {
            None
        } else {
            Some(self.synthesize_epoch(action.onset, conflicted))
        };
        debug!(
            "trial at cycle {}: {:?}, conflicted={}, dropped={}",
            stamp.index, action.action, conflicted, dropped
        );
        self.pending = Some(PendingTrial {
            due: stamp.index + self.latency_cycles,
            onset_index: stamp.index,
            conflict: conflicted,
            action,
            eeg,
        });
    }
}

impl SignalSource for SyntheticScenario {
    fn poll(&mut self) -> Option<SensorSnapshot> {
        if self.cursor.index >= self.config.duration_cycles {
            return None;
        }
        let stamp = self.cursor;
        self.cursor = stamp.next(self.period);

        // One trial in flight at a time; an action cadence faster than
        // the epoch latency skips beats rather than overlapping trials.
        if stamp.index > 0 && stamp.index % self.config.action_period == 0 && self.pending.is_none()
        {
            self.schedule_trial(stamp);
        }

        let mut snapshot = SensorSnapshot::empty(stamp);
        if let Some(trial) = self.pending.take() {
            if trial.due == stamp.index {
                // Ground truth records delivery, so a trial cut off by
                // session end never enters the labels.
                if trial.conflict && trial.eeg.is_some() {
                    self.conflict_onsets.push(trial.onset_index);
                }
                snapshot.last_action = Some(trial.action);
                snapshot.eeg = trial.eeg;
            } else {
                self.pending = Some(trial);
            }
        }
        Some(snapshot)
    }
}
