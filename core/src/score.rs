//! Cognitive conflict score estimation.
//!
//! # Theoretical Foundation
//!
//! Single-trial FRN detections are noisy; acting on any one of them
//! would make the interface twitchy. The estimator therefore maintains
//! an exponentially weighted moving average (Roberts, 1959) over
//! detections: on a conflict cycle the score moves a fixed fraction of
//! the way toward the detected amplitude, and on every quiet cycle it
//! decays multiplicatively toward zero. The pairing gives slow,
//! evidence-weighted rises and a long tail of forgiveness once the user
//! stops struggling, which is the temporal profile adaptive-automation
//! work has favored since Pope, Bogart and Bartolome (1995).
//!
//! With the default smoothing factor of 0.9, an isolated detection of
//! amplitude `a` perturbs the score by `0.1 * a`; with the default
//! decay of 0.995 per cycle, a score above the upper switching threshold
//! needs a few hundred quiet cycles (a handful of seconds at typical
//! frame rates) to fall below the lower one.
//!
//! Copyright (c) 2025 Mohammad Atashi. All rights reserved.

use crate::config::ControllerConfig;
use crate::detect::ConflictEvent;

/// Exponentially smoothed accumulator of conflict evidence.
///
/// Exactly one [`update`](Self::update) call per control cycle keeps
/// the decay rate's time semantics honest; the estimator itself has no
/// notion of wall-clock time.
#[derive(Debug, Clone)]
pub struct ConflictScoreEstimator {
    score: f64,
    alpha: f64,
    decay: f64,
    clamp: bool,
}

impl ConflictScoreEstimator {
    pub fn new(config: &ControllerConfig) -> Self {
        Self {
            score: 0.0,
            alpha: config.smoothing_alpha,
            decay: config.decay_rate,
            clamp: config.clamp_score,
        }
    }

    /// Fold one cycle's classification into the score and return the
    /// updated value.
    ///
    /// Conflict cycles apply `alpha * score + (1 - alpha) * amplitude`;
    /// quiet cycles apply the multiplicative decay. When clamping is
    /// enabled the result is confined to `[0, 1]` after the update.
    pub fn update(&mut self, event: &ConflictEvent) -> f64 {
        if event.occurred {
            self.score = self.alpha * self.score + (1.0 - self.alpha) * event.amplitude;
        } else {
            self.score *= self.decay;
        }
        if self.clamp {
            self.score = self.score.clamp(0.0, 1.0);
        }
        self.score
    }

    /// Current smoothed conflict score.
    pub fn score(&self) -> f64 {
        self.score
    }
}
