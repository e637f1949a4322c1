//! Parameter sweep over a recorded session.
//!
//! A candidate parameter set is judged by replaying the session and
//! comparing the controller's trajectory against the recording's
//! ground-truth conflict labels: assistance should arrive within a
//! response horizon of each labeled onset, should stay away from
//! unlabeled stretches, and should not flap. The objective folds those
//! three terms into one number per candidate; the sweep evaluates the
//! whole grid in parallel and returns the candidates best first.
//!
//! Labels exist only in synthetic and annotated sessions. Sweeping an
//! unlabeled recording still ranks by quietness and stability, but the
//! coverage term is identically zero and the result mostly rewards the
//! controller for doing nothing.
//!
//! Copyright (c) 2025 Mohammad Atashi. All rights reserved.

use std::cmp::Ordering;

use aegis_core::config::ConfigError;
use aegis_core::mode::InteractionMode;
use aegis_core::{AdaptiveController, ControllerConfig, NullActuator};
use aegis_signal::RecordedSession;
use log::info;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Candidate axes swept as a cartesian product.
///
/// Combinations that fail configuration validation (inverted
/// thresholds, out-of-range rates) are dropped silently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterGrid {
    pub smoothing_alphas: Vec<f64>,
    pub decay_rates: Vec<f64>,
    pub threshold_highs: Vec<f64>,
    pub threshold_lows: Vec<f64>,
}

impl Default for ParameterGrid {
    fn default() -> Self {
        Self {
            smoothing_alphas: vec![0.85, 0.9, 0.95],
            decay_rates: vec![0.99, 0.995, 0.998],
            threshold_highs: vec![0.2, 0.4, 0.6, 0.75],
            threshold_lows: vec![0.05, 0.1, 0.25],
        }
    }
}

impl ParameterGrid {
    /// Expand the grid against a base configuration, keeping only
    /// candidates that validate.
    pub fn candidates(&self, base: &ControllerConfig) -> Vec<ControllerConfig> {
        let mut out = Vec::new();
        for &alpha in &self.smoothing_alphas {
            for &decay in &self.decay_rates {
                for &high in &self.threshold_highs {
                    for &low in &self.threshold_lows {
                        let candidate = ControllerConfig {
                            smoothing_alpha: alpha,
                            decay_rate: decay,
                            threshold_high: high,
                            threshold_low: low,
                            ..base.clone()
                        };
                        if candidate.validate().is_ok() {
                            out.push(candidate);
                        }
                    }
                }
            }
        }
        out
    }
}

/// Weights of the sweep objective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepObjective {
    /// Cycles after a labeled onset within which assistance counts as
    /// responsive.
    pub response_horizon_cycles: u64,
    /// Penalty weight on the share of assisted cycles that fall
    /// outside every response window.
    pub quiet_weight: f64,
    /// Penalty per committed mode transition.
    pub flap_cost: f64,
}

impl Default for SweepObjective {
    fn default() -> Self {
        Self {
            response_horizon_cycles: 450,
            quiet_weight: 0.5,
            flap_cost: 0.05,
        }
    }
}

/// One candidate's replay outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateOutcome {
    pub config: ControllerConfig,
    pub transitions: u64,
    /// Fraction of all cycles spent under assistance.
    pub assisted_share: f64,
    /// Fraction of labeled onsets answered within the horizon.
    pub response_coverage: f64,
    /// Fraction of assisted cycles outside every response window.
    pub misplaced_assistance: f64,
    pub objective: f64,
}

/// Replay `session` under `config` and score the trajectory.
pub fn evaluate(
    session: &RecordedSession,
    config: ControllerConfig,
    objective: &SweepObjective,
) -> Result<CandidateOutcome, ConfigError> {
    let mut controller = AdaptiveController::new(config.clone(), Box::new(NullActuator))?;
    let labels = &session.header.conflict_onsets;
    let horizon = objective.response_horizon_cycles;

    let mut covered = vec![false; labels.len()];
    let mut assisted_cycles: u64 = 0;
    let mut misplaced: u64 = 0;

    for snapshot in &session.snapshots {
        let index = snapshot.cycle.index;
        // The null actuator cannot refuse, so tick cannot fail here.
        let _ = controller.tick(snapshot.clone());

        if controller.current_mode() == InteractionMode::ControllerAssisted {
            assisted_cycles += 1;
            let mut in_window = false;
            for (flag, &onset) in covered.iter_mut().zip(labels) {
                if index >= onset && index - onset < horizon {
                    *flag = true;
                    in_window = true;
                }
            }
            if !in_window {
                misplaced += 1;
            }
        }
    }

    let total = session.snapshots.len() as u64;
    let transitions = controller.telemetry().total_transitions();
    let response_coverage = if labels.is_empty() {
        0.0
    } else {
        covered.iter().filter(|flag| **flag).count() as f64 / labels.len() as f64
    };
    let misplaced_assistance = if assisted_cycles == 0 {
        0.0
    } else {
        misplaced as f64 / assisted_cycles as f64
    };
    let assisted_share = if total == 0 {
        0.0
    } else {
        assisted_cycles as f64 / total as f64
    };
    let score = response_coverage
        - objective.quiet_weight * misplaced_assistance
        - objective.flap_cost * transitions as f64;

    Ok(CandidateOutcome {
        config,
        transitions,
        assisted_share,
        response_coverage,
        misplaced_assistance,
        objective: score,
    })
}

/// Evaluate every grid candidate in parallel, best first.
pub fn sweep(
    session: &RecordedSession,
    base: &ControllerConfig,
    grid: &ParameterGrid,
    objective: &SweepObjective,
) -> Vec<CandidateOutcome> {
    let candidates = grid.candidates(base);
    info!(
        "sweeping {} candidates over session {} ({} snapshots, {} labels)",
        candidates.len(),
        session.header.session_id,
        session.snapshots.len(),
        session.header.conflict_onsets.len()
    );

    let mut outcomes: Vec<CandidateOutcome> = candidates
        .into_par_iter()
        .filter_map(|candidate| evaluate(session, candidate, objective).ok())
        .collect();
    outcomes.sort_by(|a, b| {
        b.objective
            .partial_cmp(&a.objective)
            .unwrap_or(Ordering::Equal)
    });

    if let Some(best) = outcomes.first() {
        info!(
            "best objective {:.4}: thresholds [{}, {}], alpha {}, decay {}",
            best.objective,
            best.config.threshold_low,
            best.config.threshold_high,
            best.config.smoothing_alpha,
            best.config.decay_rate
        );
    }
    outcomes
}
