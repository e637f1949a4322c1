//! # AEGIS Calibration
//!
//! Thresholds that feel right for one user, task, and trial density are
//! wrong for the next. This crate replays a recorded session through
//! the controller under a grid of candidate parameter sets, scores each
//! trajectory against the session's ground-truth conflict labels, and
//! ranks the candidates. Re-running the same loop a few hundred times
//! over the same snapshots is embarrassingly parallel, so the sweep
//! fans out across cores.
//!
//! Copyright (c) 2025 Mohammad Atashi. All rights reserved.

pub mod sweep;

pub use sweep::{sweep, CandidateOutcome, ParameterGrid, SweepObjective};
