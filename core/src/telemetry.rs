//! In-memory session telemetry.
//!
//! The loop keeps a bounded window of recent transitions plus a few
//! session-long aggregates. Enough for a host HUD, a post-session
//! summary, or a calibration objective; persistent recording lives in
//! the signal crate.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use serde::{Deserialize, Serialize};

use crate::mode::{InteractionMode, ModeTransition};

/// Cycles spent in each mode over the whole session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeDwell {
    pub hand_tracking: u64,
    pub controller_assisted: u64,
}

impl ModeDwell {
    pub(crate) fn count(&mut self, mode: InteractionMode) {
        match mode {
            InteractionMode::HandTracking => self.hand_tracking += 1,
            InteractionMode::ControllerAssisted => self.controller_assisted += 1,
        }
    }

    /// Fraction of counted cycles spent under assistance.
    pub fn assisted_share(&self) -> f64 {
        let total = self.hand_tracking + self.controller_assisted;
        if total == 0 {
            0.0
        } else {
            self.controller_assisted as f64 / total as f64
        }
    }
}

/// Bounded transition history with session-long aggregates.
///
/// The window holds the most recent transitions up to the configured
/// capacity, evicting oldest-first; the aggregate counters cover the
/// entire session regardless of eviction. A capacity of zero keeps the
/// aggregates and stores no window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionLog {
    transitions: Vec<ModeTransition>,
    max_size: usize,
    total: u64,
    dwell: ModeDwell,
}

impl TransitionLog {
    pub fn new(max_size: usize) -> Self {
        Self {
            transitions: Vec::with_capacity(max_size),
            max_size,
            total: 0,
            dwell: ModeDwell::default(),
        }
    }

    /// Attribute one cycle of dwell time to `mode`.
    pub(crate) fn record_cycle(&mut self, mode: InteractionMode) {
        self.dwell.count(mode);
    }

    /// Append a committed transition, evicting the oldest entry when
    /// the window is full.
    pub(crate) fn record_transition(&mut self, transition: ModeTransition) {
        if self.max_size > 0 {
            if self.transitions.len() >= self.max_size {
                self.transitions.remove(0);
            }
            self.transitions.push(transition);
        }
        self.total += 1;
    }

    /// Retained window of recent transitions, oldest first.
    pub fn recent(&self) -> &[ModeTransition] {
        &self.transitions
    }

    /// Most recent transition still in the window.
    pub fn last(&self) -> Option<&ModeTransition> {
        self.transitions.last()
    }

    /// Transitions committed over the whole session.
    pub fn total_transitions(&self) -> u64 {
        self.total
    }

    /// Per-mode dwell counters.
    pub fn dwell(&self) -> ModeDwell {
        self.dwell
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::CycleStamp;

    fn transition(index: u64, to: InteractionMode) -> ModeTransition {
        let from = match to {
            InteractionMode::HandTracking => InteractionMode::ControllerAssisted,
            InteractionMode::ControllerAssisted => InteractionMode::HandTracking,
        };
        ModeTransition {
            from,
            to,
            score: 0.5,
            cycle: CycleStamp {
                index,
                elapsed: std::time::Duration::from_millis(index),
            },
        }
    }

    #[test]
    fn test_window_evicts_oldest_first() {
        let mut log = TransitionLog::new(3);
        for i in 0..5 {
            log.record_transition(transition(i, InteractionMode::ControllerAssisted));
        }
        assert_eq!(log.recent().len(), 3);
        assert_eq!(log.recent()[0].cycle.index, 2);
        assert_eq!(log.last().unwrap().cycle.index, 4);
        assert_eq!(log.total_transitions(), 5);
    }

    #[test]
    fn test_zero_capacity_keeps_aggregates_only() {
        let mut log = TransitionLog::new(0);
        for i in 0..4 {
            log.record_transition(transition(i, InteractionMode::HandTracking));
        }
        assert!(log.recent().is_empty());
        assert!(log.last().is_none());
        assert_eq!(log.total_transitions(), 4);
    }

    #[test]
    fn test_dwell_counts_per_mode() {
        let mut log = TransitionLog::new(8);
        for _ in 0..30 {
            log.record_cycle(InteractionMode::HandTracking);
        }
        for _ in 0..10 {
            log.record_cycle(InteractionMode::ControllerAssisted);
        }
        let dwell = log.dwell();
        assert_eq!(dwell.hand_tracking, 30);
        assert_eq!(dwell.controller_assisted, 10);
        assert!((dwell.assisted_share() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_empty_dwell_share_is_zero() {
        assert_eq!(ModeDwell::default().assisted_share(), 0.0);
    }
}
