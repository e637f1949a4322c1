//! Hysteresis-based interaction mode selection.
//!
//! # Theoretical Foundation
//!
//! A single threshold on a noisy score chatters: values hovering near
//! the boundary toggle the interface every few cycles, and for a VR
//! user every toggle is a visible change of input behavior. The classic
//! remedy is the Schmitt trigger (Schmitt, 1938): switch up only above
//! a high threshold, switch back only below a distinct low threshold,
//! and treat the band between them as a dead zone in which the current
//! mode persists. Transition frequency is then bounded by the time the
//! score needs to traverse the band, not by its cycle-to-cycle jitter.
//!
//! Copyright (c) 2025 Mohammad Atashi. All rights reserved.

use serde::{Deserialize, Serialize};

use crate::config::ControllerConfig;
use crate::signal::CycleStamp;

/// Interaction mode presented to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InteractionMode {
    /// Direct, unconstrained hand tracking.
    HandTracking,
    /// Precision-assisted input with snapping and magnetic targets.
    ControllerAssisted,
}

impl InteractionMode {
    /// Stable display name for logs and telemetry.
    pub fn name(&self) -> &'static str {
        match self {
            InteractionMode::HandTracking => "hand-tracking",
            InteractionMode::ControllerAssisted => "controller-assisted",
        }
    }
}

/// Record of a committed mode change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeTransition {
    pub from: InteractionMode,
    pub to: InteractionMode,
    /// Conflict score that triggered the change.
    pub score: f64,
    /// Cycle on which the change was committed.
    pub cycle: CycleStamp,
}

/// Two-threshold switching machine over the conflict score.
///
/// Sessions begin in [`InteractionMode::HandTracking`]; assistance is
/// an escalation the score has to earn.
#[derive(Debug, Clone)]
pub struct ModeController {
    current: InteractionMode,
    threshold_high: f64,
    threshold_low: f64,
}

impl ModeController {
    pub fn new(config: &ControllerConfig) -> Self {
        Self {
            current: InteractionMode::HandTracking,
            threshold_high: config.threshold_high,
            threshold_low: config.threshold_low,
        }
    }

    /// Mode currently in effect.
    pub fn current(&self) -> InteractionMode {
        self.current
    }

    /// Re-evaluate the mode against an updated score.
    ///
    /// Escalation requires the score to strictly exceed the high
    /// threshold; de-escalation requires it to fall strictly below the
    /// low one. Scores inside the dead zone, or exactly on a threshold,
    /// leave the mode unchanged. Returns the committed transition, or
    /// `None` when the mode persists.
    pub fn evaluate(&mut self, score: f64, cycle: CycleStamp) -> Option<ModeTransition> {
        let next = match self.current {
            InteractionMode::HandTracking if score > self.threshold_high => {
                InteractionMode::ControllerAssisted
            }
            InteractionMode::ControllerAssisted if score < self.threshold_low => {
                InteractionMode::HandTracking
            }
            unchanged => unchanged,
        };
        if next == self.current {
            return None;
        }
        let transition = ModeTransition {
            from: self.current,
            to: next,
            score,
            cycle,
        };
        self.current = next;
        Some(transition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> ModeController {
        ModeController::new(&ControllerConfig::default())
    }

    fn cycle(index: u64) -> CycleStamp {
        CycleStamp {
            index,
            elapsed: std::time::Duration::from_millis(index * 11),
        }
    }

    #[test]
    fn test_sessions_start_in_hand_tracking() {
        assert_eq!(controller().current(), InteractionMode::HandTracking);
    }

    #[test]
    fn test_dead_zone_preserves_current_mode() {
        let mut mc = controller();
        for score in [0.0, 0.25, 0.5, 0.74, 0.75] {
            assert!(mc.evaluate(score, cycle(0)).is_none());
            assert_eq!(mc.current(), InteractionMode::HandTracking);
        }
    }

    #[test]
    fn test_escalation_requires_strict_exceedance() {
        let mut mc = controller();
        assert!(mc.evaluate(0.75, cycle(1)).is_none());
        let transition = mc.evaluate(0.750001, cycle(2)).unwrap();
        assert_eq!(transition.from, InteractionMode::HandTracking);
        assert_eq!(transition.to, InteractionMode::ControllerAssisted);
        assert_eq!(transition.cycle.index, 2);
        assert_eq!(mc.current(), InteractionMode::ControllerAssisted);
    }

    #[test]
    fn test_deescalation_requires_strict_undershoot() {
        let mut mc = controller();
        mc.evaluate(0.9, cycle(0)).unwrap();
        // Anywhere at or above the low threshold keeps assistance on.
        for score in [0.74, 0.5, 0.26, 0.25] {
            assert!(mc.evaluate(score, cycle(1)).is_none());
            assert_eq!(mc.current(), InteractionMode::ControllerAssisted);
        }
        let transition = mc.evaluate(0.249999, cycle(2)).unwrap();
        assert_eq!(transition.to, InteractionMode::HandTracking);
    }

    #[test]
    fn test_evaluate_is_idempotent_at_constant_score() {
        let mut mc = controller();
        assert!(mc.evaluate(0.8, cycle(0)).is_some());
        for i in 1..50 {
            assert!(mc.evaluate(0.8, cycle(i)).is_none());
        }
        assert_eq!(mc.current(), InteractionMode::ControllerAssisted);
    }

    #[test]
    fn test_full_hysteresis_loop() {
        let mut mc = controller();
        let up = mc.evaluate(0.76, cycle(10)).unwrap();
        assert_eq!(up.to, InteractionMode::ControllerAssisted);
        assert!(mc.evaluate(0.5, cycle(11)).is_none());
        let down = mc.evaluate(0.2, cycle(12)).unwrap();
        assert_eq!(down.from, InteractionMode::ControllerAssisted);
        assert_eq!(down.to, InteractionMode::HandTracking);
        // Equal score no longer triggers anything in the new mode.
        assert!(mc.evaluate(0.2, cycle(13)).is_none());
    }

    #[test]
    fn test_transition_records_triggering_score() {
        let mut mc = controller();
        let transition = mc.evaluate(0.82, cycle(7)).unwrap();
        assert!((transition.score - 0.82).abs() < 1e-12);
        assert_eq!(transition.cycle, cycle(7));
    }
}
