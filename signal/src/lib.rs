//! # AEGIS Signal
//!
//! Everything that can stand on the sensor side of the control loop
//! without real hardware: seeded synthetic conflict scenarios for
//! development and calibration, a tee that records any live source to a
//! serializable session, and a deterministic replay source that feeds a
//! recording back through the loop cycle for cycle.
//!
//! Copyright (c) 2025 Mohammad Atashi. All rights reserved.

pub mod record;
pub mod replay;
pub mod synthetic;

pub use record::{RecordError, RecordedSession, RecordingSource, SessionHeader};
pub use replay::ReplaySource;
pub use synthetic::{ScenarioConfig, ScenarioError, SyntheticScenario};
