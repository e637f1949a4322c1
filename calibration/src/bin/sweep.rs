//! Rank controller parameter sets against a recorded session.
//!
//! Usage: `aegis-sweep [session.json]`. Without an argument the sweep
//! runs over a stock synthetic session, which is enough to sanity-check
//! a grid before pointing it at real recordings.
//!
//! Copyright (c) 2025 Mohammad Atashi. All rights reserved.

use std::path::PathBuf;
use std::process::ExitCode;

use aegis_calibration::{sweep, ParameterGrid, SweepObjective};
use aegis_core::ControllerConfig;
use aegis_signal::{RecordedSession, ScenarioConfig, SyntheticScenario};
use log::error;

fn main() -> ExitCode {
    env_logger::init();

    let session = match std::env::args().nth(1) {
        Some(path) => {
            let path = PathBuf::from(path);
            match RecordedSession::load(&path) {
                Ok(session) => session,
                Err(err) => {
                    error!("cannot load {}: {err}", path.display());
                    return ExitCode::FAILURE;
                }
            }
        }
        None => match SyntheticScenario::new(ScenarioConfig::default()) {
            Ok(scenario) => scenario.record("stock synthetic sweep session"),
            Err(err) => {
                error!("cannot build stock scenario: {err}");
                return ExitCode::FAILURE;
            }
        },
    };

    let outcomes = sweep(
        &session,
        &ControllerConfig::default(),
        &ParameterGrid::default(),
        &SweepObjective::default(),
    );
    if outcomes.is_empty() {
        error!("grid produced no valid candidates");
        return ExitCode::FAILURE;
    }

    println!(
        "{:>9} {:>6} {:>6} {:>5} {:>5} {:>9} {:>10} {:>9}",
        "objective", "alpha", "decay", "low", "high", "coverage", "misplaced", "switches"
    );
    for outcome in outcomes.iter().take(12) {
        println!(
            "{:>9.4} {:>6.2} {:>6.3} {:>5.2} {:>5.2} {:>9.2} {:>10.2} {:>9}",
            outcome.objective,
            outcome.config.smoothing_alpha,
            outcome.config.decay_rate,
            outcome.config.threshold_low,
            outcome.config.threshold_high,
            outcome.response_coverage,
            outcome.misplaced_assistance,
            outcome.transitions
        );
    }

    if let Some(best) = outcomes.first() {
        match serde_json::to_string_pretty(&best.config) {
            Ok(json) => println!("\nbest candidate:\n{json}"),
            Err(err) => {
                error!("cannot serialize best candidate: {err}");
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}
