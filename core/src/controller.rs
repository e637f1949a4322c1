//! The closed-loop adaptive controller.
//!
//! [`AdaptiveController`] owns one instance of every pipeline stage and
//! advances the whole loop by exactly one cycle per [`tick`] call:
//! classify the snapshot, fold the result into the score, re-evaluate
//! the mode, and push any committed transition to the actuator. The
//! struct is synchronous and single-threaded; hosts that
//! want a cadence wrap it in a driver rather than the loop growing one
//! itself.
//!
//! # Failure semantics
//!
//! Construction is strict: an invalid configuration is refused outright.
//! Operation is lenient: missing sensor data is ordinary input, and an
//! actuator failure is reported but does not halt or roll back the
//! loop. The internal mode advances before actuation, so after a failed
//! switch the controller keeps estimating from a consistent state and
//! the next committed transition retries the backend naturally.
//!
//! Copyright (c) 2025 Mohammad Atashi. All rights reserved.

use log::{info, trace, warn};
use thiserror::Error;

use crate::actuate::{ActuatorError, ModeActuator};
use crate::config::{ConfigError, ControllerConfig};
use crate::detect::{ConflictDetector, FrnDetector};
use crate::mode::{InteractionMode, ModeController, ModeTransition};
use crate::score::ConflictScoreEstimator;
use crate::signal::SensorSnapshot;
use crate::telemetry::TransitionLog;

/// Runtime failure surfaced by [`AdaptiveController::tick`].
///
/// The only runtime failure is a refused actuation. The transition it
/// carries has already been committed internally and logged; callers
/// that ignore the error keep a fully functional loop.
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error(
        "actuation failed switching {} -> {} at cycle {}: {source}",
        .transition.from.name(),
        .transition.to.name(),
        .transition.cycle.index
    )]
    Actuation {
        transition: ModeTransition,
        #[source]
        source: ActuatorError,
    },
}

/// Complete conflict-adaptive control loop over one session.
#[derive(Debug)]
pub struct AdaptiveController {
    config: ControllerConfig,
    detector: Box<dyn ConflictDetector>,
    estimator: ConflictScoreEstimator,
    mode: ModeController,
    actuator: Box<dyn ModeActuator>,
    telemetry: TransitionLog,
    cycles: u64,
}

impl AdaptiveController {
    /// Build a controller with the stock FRN detector.
    ///
    /// Fails if `config` violates any invariant; see
    /// [`ControllerConfig::validate`].
    pub fn new(
        config: ControllerConfig,
        actuator: Box<dyn ModeActuator>,
    ) -> Result<Self, ConfigError> {
        let detector = Box::new(FrnDetector::new(config.detector.clone()));
        Self::with_detector(config, detector, actuator)
    }

    /// Build a controller around a custom detector implementation.
    pub fn with_detector(
        config: ControllerConfig,
        detector: Box<dyn ConflictDetector>,
        actuator: Box<dyn ModeActuator>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        info!(
            "adaptive controller up: alpha={}, decay={}, thresholds=[{}, {}], {} Hz",
            config.smoothing_alpha,
            config.decay_rate,
            config.threshold_low,
            config.threshold_high,
            config.cycle_rate_hz
        );
        Ok(Self {
            estimator: ConflictScoreEstimator::new(&config),
            mode: ModeController::new(&config),
            telemetry: TransitionLog::new(config.telemetry_capacity),
            config,
            detector,
            actuator,
            cycles: 0,
        })
    }

    /// Run one atomic control cycle over `snapshot`.
    ///
    /// Returns the committed transition when the mode changed, `None`
    /// when it persisted. On an actuation failure the returned error
    /// carries the transition that was committed internally; the loop
    /// remains live either way.
    pub fn tick(
        &mut self,
        snapshot: SensorSnapshot,
    ) -> Result<Option<ModeTransition>, ControllerError> {
        self.cycles += 1;

        let event = self.detector.classify(&snapshot);
        let score = self.estimator.update(&event);
        trace!(
            "cycle {}: conflict={}, score={:.4}",
            snapshot.cycle.index,
            event.occurred,
            score
        );

        let transition = match self.mode.evaluate(score, snapshot.cycle) {
            Some(transition) => transition,
            None => {
                self.telemetry.record_cycle(self.mode.current());
                return Ok(None);
            }
        };
        self.telemetry.record_cycle(self.mode.current());
        self.telemetry.record_transition(transition.clone());
        info!(
            "mode {} -> {} at cycle {} (score {:.4})",
            transition.from.name(),
            transition.to.name(),
            transition.cycle.index,
            transition.score
        );

        match self.actuator.set_mode(transition.to) {
            Ok(()) => Ok(Some(transition)),
            Err(source) => {
                warn!(
                    "backend refused {} at cycle {}: {}",
                    transition.to.name(),
                    transition.cycle.index,
                    source
                );
                Err(ControllerError::Actuation { transition, source })
            }
        }
    }

    /// Mode currently in effect.
    pub fn current_mode(&self) -> InteractionMode {
        self.mode.current()
    }

    /// Current smoothed conflict score.
    pub fn conflict_score(&self) -> f64 {
        self.estimator.score()
    }

    /// Cycles processed so far.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Session telemetry accumulated so far.
    pub fn telemetry(&self) -> &TransitionLog {
        &self.telemetry
    }

    /// Configuration the controller was built with.
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use super::*;
    use crate::actuate::NullActuator;
    use crate::detect::ConflictEvent;
    use crate::signal::{ActionEvent, CycleStamp, UserAction};

    /// Detector that fires at fixed strength whenever an action is
    /// present, sidestepping EEG synthesis in loop-level tests.
    #[derive(Debug)]
    struct PulseDetector {
        amplitude: f64,
    }

    impl ConflictDetector for PulseDetector {
        fn classify(&self, snapshot: &SensorSnapshot) -> ConflictEvent {
            match snapshot.last_action {
                Some(_) => ConflictEvent::detected(self.amplitude),
                None => ConflictEvent::none(),
            }
        }
    }

    /// Actuator recording every applied mode into shared state.
    #[derive(Debug)]
    struct RecordingActuator {
        applied: Arc<Mutex<Vec<InteractionMode>>>,
    }

    impl ModeActuator for RecordingActuator {
        fn set_mode(&mut self, mode: InteractionMode) -> Result<(), ActuatorError> {
            self.applied.lock().unwrap().push(mode);
            Ok(())
        }
    }

    /// Actuator whose backend is permanently offline.
    #[derive(Debug)]
    struct OfflineActuator;

    impl ModeActuator for OfflineActuator {
        fn set_mode(&mut self, mode: InteractionMode) -> Result<(), ActuatorError> {
            let _ = mode;
            Err(ActuatorError::Unavailable("haptics bridge down".into()))
        }
    }

    fn stamp(index: u64) -> CycleStamp {
        CycleStamp {
            index,
            elapsed: Duration::from_millis(index * 11),
        }
    }

    fn quiet(index: u64) -> SensorSnapshot {
        SensorSnapshot::empty(stamp(index))
    }

    fn acting(index: u64) -> SensorSnapshot {
        SensorSnapshot {
            cycle: stamp(index),
            eeg: None,
            last_action: Some(ActionEvent {
                action: UserAction::Place,
                onset: Duration::from_millis(index * 11),
            }),
        }
    }

    fn pulsed(amplitude: f64) -> AdaptiveController {
        AdaptiveController::with_detector(
            ControllerConfig::default(),
            Box::new(PulseDetector { amplitude }),
            Box::new(NullActuator),
        )
        .unwrap()
    }

    #[test]
    fn test_invalid_config_refuses_construction() {
        let config = ControllerConfig {
            threshold_high: 0.2,
            threshold_low: 0.8,
            ..ControllerConfig::default()
        };
        let result = AdaptiveController::new(config, Box::new(NullActuator));
        assert!(matches!(result, Err(ConfigError::ThresholdOrder { .. })));
    }

    #[test]
    fn test_quiet_session_never_switches() {
        let mut controller = pulsed(1.0);
        for i in 0..500 {
            let outcome = controller.tick(quiet(i)).unwrap();
            assert!(outcome.is_none());
        }
        assert_eq!(controller.current_mode(), InteractionMode::HandTracking);
        assert_eq!(controller.conflict_score(), 0.0);
        assert_eq!(controller.cycles(), 500);
        assert_eq!(controller.telemetry().dwell().hand_tracking, 500);
    }

    #[test]
    fn test_sustained_conflict_escalates_on_fourteenth_event() {
        let mut controller = pulsed(1.0);
        let mut switched_at = None;
        for i in 0..20 {
            if let Some(transition) = controller.tick(acting(i)).unwrap() {
                switched_at = Some((i, transition));
                break;
            }
        }
        // Unit-amplitude conflicts on consecutive cycles walk the score
        // through 1 - 0.9^n, which first exceeds 0.75 at n = 14.
        let (index, transition) = switched_at.unwrap();
        assert_eq!(index, 13);
        assert_eq!(transition.to, InteractionMode::ControllerAssisted);
        assert!(transition.score > 0.75 && transition.score < 0.78);
    }

    #[test]
    fn test_decay_deescalates_after_233_quiet_cycles() {
        let mut controller = pulsed(8.0);
        // One strong event lands the score at 0.8 and commits the
        // escalation in the same cycle.
        let up = controller.tick(acting(0)).unwrap();
        assert_eq!(up.unwrap().to, InteractionMode::ControllerAssisted);
        assert!((controller.conflict_score() - 0.8).abs() < 1e-9);

        // 0.8 * 0.995^n first drops below 0.25 at n = 233.
        let mut reverted_at = None;
        for i in 1..=300u64 {
            if let Some(transition) = controller.tick(quiet(i)).unwrap() {
                reverted_at = Some((i, transition));
                break;
            }
        }
        let (quiet_cycles, transition) = reverted_at.unwrap();
        assert_eq!(quiet_cycles, 233);
        assert_eq!(transition.to, InteractionMode::HandTracking);
        assert!(transition.score < 0.25);
    }

    #[test]
    fn test_committed_transitions_reach_the_actuator_exactly_once() {
        let applied = Arc::new(Mutex::new(Vec::new()));
        let mut controller = AdaptiveController::with_detector(
            ControllerConfig::default(),
            Box::new(PulseDetector { amplitude: 8.0 }),
            Box::new(RecordingActuator {
                applied: Arc::clone(&applied),
            }),
        )
        .unwrap();

        controller.tick(acting(0)).unwrap();
        for i in 1..50 {
            controller.tick(quiet(i)).unwrap();
        }
        // One escalation; the following quiet cycles stay in the dead
        // zone and must not re-actuate.
        assert_eq!(
            applied.lock().unwrap().as_slice(),
            &[InteractionMode::ControllerAssisted]
        );
    }

    #[test]
    fn test_actuator_failure_leaves_loop_consistent() {
        let mut controller = AdaptiveController::with_detector(
            ControllerConfig::default(),
            Box::new(PulseDetector { amplitude: 8.0 }),
            Box::new(OfflineActuator),
        )
        .unwrap();

        let err = controller.tick(acting(0)).unwrap_err();
        let ControllerError::Actuation { transition, source } = err;
        assert_eq!(transition.to, InteractionMode::ControllerAssisted);
        assert!(matches!(source, ActuatorError::Unavailable(_)));

        // The internal mode advanced despite the refusal, and the loop
        // keeps running.
        assert_eq!(controller.current_mode(), InteractionMode::ControllerAssisted);
        assert!(controller.tick(quiet(1)).unwrap().is_none());
        assert_eq!(controller.telemetry().total_transitions(), 1);
    }

    #[test]
    fn test_missing_sensor_data_is_not_an_error() {
        let mut controller = AdaptiveController::new(
            ControllerConfig::default(),
            Box::new(NullActuator),
        )
        .unwrap();
        assert!(controller.tick(quiet(0)).is_ok());
        // Action without its EEG epoch decays like any quiet cycle.
        assert!(controller.tick(acting(1)).is_ok());
        assert_eq!(controller.conflict_score(), 0.0);
    }

    #[test]
    fn test_telemetry_tracks_dwell_across_modes() {
        let mut controller = pulsed(8.0);
        controller.tick(acting(0)).unwrap();
        for i in 1..=100u64 {
            controller.tick(quiet(i)).unwrap();
        }
        let dwell = controller.telemetry().dwell();
        assert_eq!(dwell.controller_assisted, 101);
        assert_eq!(dwell.hand_tracking, 0);
    }
}
