//! Shared read-only view of a running session.
//!
//! The driver publishes after every cycle; observers read whenever they
//! like. A HUD overlay polling at display rate and a debug console
//! polling once a second see the same struct, and neither can stall
//! the loop: the critical section on both sides is a field copy.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::sync::Arc;

use aegis_core::mode::InteractionMode;
use parking_lot::RwLock;
use serde::Serialize;

/// Point-in-time state of the control loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ObservedState {
    pub mode: InteractionMode,
    pub score: f64,
    pub cycles: u64,
    pub transitions: u64,
    pub actuation_failures: u64,
}

impl Default for ObservedState {
    fn default() -> Self {
        Self {
            mode: InteractionMode::HandTracking,
            score: 0.0,
            cycles: 0,
            transitions: 0,
            actuation_failures: 0,
        }
    }
}

/// Cloneable handle onto the live state of one session.
#[derive(Debug, Clone, Default)]
pub struct SessionObservable {
    state: Arc<RwLock<ObservedState>>,
}

impl SessionObservable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the most recently published state.
    pub fn snapshot(&self) -> ObservedState {
        *self.state.read()
    }

    pub(crate) fn publish(&self, state: ObservedState) {
        *self.state.write() = state;
    }
}
