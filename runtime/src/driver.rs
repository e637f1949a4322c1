//! Fixed-cadence session driver.
//!
//! The controller itself is synchronous; this module gives it a heart.
//! [`SessionDriver::run`] is a future that ticks the loop once per
//! period until the source exhausts or the host asks it to stop, then
//! resolves to a [`SessionSummary`]. Cadence slips are absorbed by
//! skipping missed ticks rather than bursting, since two control
//! cycles back to back would double-apply the per-cycle decay.
//!
//! Copyright (c) 2025 Mohammad Atashi. All rights reserved.

use std::time::Duration;

use aegis_core::mode::InteractionMode;
use aegis_core::signal::SignalSource;
use aegis_core::telemetry::ModeDwell;
use aegis_core::AdaptiveController;
use log::{info, warn};
use serde::Serialize;
use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};
use uuid::Uuid;

use crate::observe::{ObservedState, SessionObservable};

/// Host-side handle onto a running driver.
///
/// Dropping the handle does not stop the session; a driver without a
/// host simply runs until its source exhausts.
#[derive(Debug)]
pub struct SessionControl {
    shutdown: watch::Sender<bool>,
    observable: SessionObservable,
}

impl SessionControl {
    /// Live view of the session for HUDs and consoles.
    pub fn observable(&self) -> SessionObservable {
        self.observable.clone()
    }

    /// Ask the driver to stop after the cycle in flight.
    pub fn shutdown(&self) {
        let _ = self.shutdown.send(true);
    }
}

/// End-of-session accounting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub cycles: u64,
    pub transitions: u64,
    pub final_mode: InteractionMode,
    pub final_score: f64,
    pub dwell: ModeDwell,
    pub actuation_failures: u64,
}

/// Owns one controller and one source for the length of a session.
#[derive(Debug)]
pub struct SessionDriver<S> {
    controller: AdaptiveController,
    source: S,
    period: Duration,
    session_id: Uuid,
    shutdown: watch::Receiver<bool>,
    observable: SessionObservable,
    failures: u64,
}

impl<S: SignalSource> SessionDriver<S> {
    /// Pair a controller with a source; the cadence comes from the
    /// controller's configured cycle rate.
    pub fn new(controller: AdaptiveController, source: S) -> (Self, SessionControl) {
        let (tx, rx) = watch::channel(false);
        let observable = SessionObservable::new();
        let period = controller.config().cycle_period();
        let driver = Self {
            controller,
            source,
            period,
            session_id: Uuid::new_v4(),
            shutdown: rx,
            observable: observable.clone(),
            failures: 0,
        };
        let control = SessionControl {
            shutdown: tx,
            observable,
        };
        (driver, control)
    }

    /// Override the cadence. Replays and tests run much faster than
    /// real time.
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Drive the loop to completion.
    ///
    /// Resolves when the source exhausts or shutdown is requested.
    /// Actuation failures are counted and logged, never fatal.
    pub async fn run(mut self) -> SessionSummary {
        info!(
            "session {} starting, period {:?}",
            self.session_id, self.period
        );
        let mut ticker = time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            if *self.shutdown.borrow() {
                info!("session {}: shutdown requested", self.session_id);
                break;
            }
            let snapshot = match self.source.poll() {
                Some(snapshot) => snapshot,
                None => {
                    info!("session {}: source exhausted", self.session_id);
                    break;
                }
            };
            if let Err(err) = self.controller.tick(snapshot) {
                self.failures += 1;
                warn!("session {}: {}", self.session_id, err);
            }
            self.publish();
        }
        self.summarize()
    }

    fn publish(&self) {
        self.observable.publish(ObservedState {
            mode: self.controller.current_mode(),
            score: self.controller.conflict_score(),
            cycles: self.controller.cycles(),
            transitions: self.controller.telemetry().total_transitions(),
            actuation_failures: self.failures,
        });
    }

    fn summarize(self) -> SessionSummary {
        let telemetry = self.controller.telemetry();
        let summary = SessionSummary {
            session_id: self.session_id,
            cycles: self.controller.cycles(),
            transitions: telemetry.total_transitions(),
            final_mode: self.controller.current_mode(),
            final_score: self.controller.conflict_score(),
            dwell: telemetry.dwell(),
            actuation_failures: self.failures,
        };
        info!(
            "session {} finished: {} cycles, {} transitions, final mode {}",
            summary.session_id,
            summary.cycles,
            summary.transitions,
            summary.final_mode.name()
        );
        summary
    }
}
