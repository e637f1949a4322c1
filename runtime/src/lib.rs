//! # AEGIS Runtime
//!
//! Host-side harness around the synchronous control loop: a Tokio task
//! that ticks an [`aegis_core::AdaptiveController`] at a fixed cadence,
//! a shutdown handle for the host, and a lock-protected observable the
//! host can render from without touching the loop itself.
//!
//! Copyright (c) 2025 Mohammad Atashi. All rights reserved.

pub mod driver;
pub mod observe;

pub use driver::{SessionControl, SessionDriver, SessionSummary};
pub use observe::{ObservedState, SessionObservable};
