//! # AEGIS Core
//!
//! Closed-loop controller for cognitive-conflict-driven interaction mode
//! switching in immersive environments. The loop fuses discrete user
//! action events with EEG feature epochs supplied by an upstream sensing
//! pipeline, detects feedback-related negativity (FRN) responses that
//! follow those actions, folds detections into a smoothed cognitive
//! conflict score, and drives a two-threshold hysteresis machine that
//! selects between unconstrained hand tracking and controller-assisted
//! precision input.
//!
//! ## Cycle anatomy
//!
//! Each control cycle is one atomic pass through
//! [`AdaptiveController::tick`]:
//!
//! ```text
//! SignalSource::poll -> ConflictDetector::classify -> ConflictScoreEstimator::update
//!                                                                |
//!                       ModeActuator::set_mode <- ModeController::evaluate
//! ```
//!
//! The loop is single-threaded and non-blocking by construction: sensor
//! absence is an ordinary value (the score decays), and no stage waits
//! for data. Scheduling lives outside this crate; any context that can
//! call `tick` once per cycle can host the loop.
//!
//! Copyright (c) 2025 Mohammad Atashi. All rights reserved.

pub mod actuate;
pub mod config;
pub mod controller;
pub mod detect;
pub mod mode;
pub mod score;
pub mod signal;
pub mod telemetry;

pub use actuate::{ActuatorError, ModeActuator, NullActuator};
pub use config::{ConfigError, ControllerConfig};
pub use controller::{AdaptiveController, ControllerError};
pub use detect::{ConflictDetector, ConflictEvent, DetectorConfig, FrnDetector};
pub use mode::{InteractionMode, ModeController, ModeTransition};
pub use score::ConflictScoreEstimator;
pub use signal::{ActionEvent, CycleStamp, EegEpoch, SensorSnapshot, SignalSource, UserAction};
pub use telemetry::{ModeDwell, TransitionLog};

/// Crate version, re-exported for hosts and telemetry headers.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
