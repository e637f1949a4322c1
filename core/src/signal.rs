//! Sensing contracts shared by every stage of the control loop.
//!
//! The controller never talks to hardware. It consumes
//! [`SensorSnapshot`] values pulled from a [`SignalSource`], an adapter
//! over whatever acquisition pipeline the host runs (live headset and
//! hand tracker, a replayed recording, or a synthetic scenario). The
//! contract is narrow:
//!
//! - `poll` never blocks. A live source returns whatever has arrived
//!   since the previous cycle, or an empty snapshot when nothing has.
//! - Missing data is a value, not an error. EEG packet loss and idle
//!   hands both surface as `None` fields and leave the loop running.
//! - A given EEG epoch is delivered on exactly one snapshot, so the
//!   detector never classifies the same evidence twice.
//!
//! Copyright (c) 2025 Mohammad Atashi. All rights reserved.

use std::fmt::Debug;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Monotonic identity of a single control cycle within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleStamp {
    /// Zero-based cycle index since session start.
    pub index: u64,
    /// Session-relative time at which the cycle began.
    pub elapsed: Duration,
}

impl CycleStamp {
    /// Stamp of the first cycle of a session.
    pub fn origin() -> Self {
        Self {
            index: 0,
            elapsed: Duration::ZERO,
        }
    }

    /// Stamp of the cycle that follows this one at the given period.
    pub fn next(&self, period: Duration) -> Self {
        Self {
            index: self.index + 1,
            elapsed: self.elapsed + period,
        }
    }
}

/// Discrete manipulation recognized by the upstream hand-tracking layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserAction {
    /// Closing the hand around a virtual object.
    Grab,
    /// Letting go of a held object.
    Release,
    /// Depositing a held object at a target location.
    Place,
    /// Pushing a virtual control such as a button or slider.
    Press,
    /// Directing a ray or fingertip at a distant target.
    Point,
}

/// A recognized user action together with its onset time.
///
/// The onset anchors the post-action analysis window; it is the moment
/// the interaction outcome became visible to the user, not the moment
/// the tracker finished classifying it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActionEvent {
    pub action: UserAction,
    /// Session-relative onset of the action.
    pub onset: Duration,
}

/// Time-binned fronto-central EEG feature epoch.
///
/// Amplitudes are mean microvolt values per bin, baseline-uncorrected,
/// covering a contiguous span starting at `start`. Bin `i` covers
/// `[start + i * bin_width, start + (i + 1) * bin_width)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EegEpoch {
    /// Session-relative time of the leading edge of the first bin.
    pub start: Duration,
    /// Width of each amplitude bin.
    pub bin_width: Duration,
    /// Mean fronto-central amplitude per bin, in microvolts.
    pub amplitudes: Vec<f64>,
}

impl EegEpoch {
    /// Session-relative time of the trailing edge of the last bin.
    pub fn end(&self) -> Duration {
        self.start + self.bin_width * self.amplitudes.len() as u32
    }

    /// Whether the epoch fully contains the span `[from, to]`.
    pub fn covers(&self, from: Duration, to: Duration) -> bool {
        self.start <= from && to <= self.end()
    }

    /// Bins overlapping the half-open span `[from, to)`.
    ///
    /// Spans outside the epoch yield an empty slice, as do degenerate
    /// spans and epochs with a zero bin width.
    pub fn bins_overlapping(&self, from: Duration, to: Duration) -> &[f64] {
        if self.amplitudes.is_empty() || self.bin_width.is_zero() || to <= from || to <= self.start
        {
            return &[];
        }
        let width = self.bin_width.as_secs_f64();
        let rel_from = from.saturating_sub(self.start).as_secs_f64();
        let rel_to = to.saturating_sub(self.start).as_secs_f64();
        let first = ((rel_from / width).floor() as usize).min(self.amplitudes.len());
        let last = ((rel_to / width).ceil() as usize).min(self.amplitudes.len());
        &self.amplitudes[first..last]
    }
}

/// Everything the sensors produced for one control cycle.
///
/// Either field may be absent on any cycle, and usually both are: most
/// cycles carry no fresh action and no new epoch. Absence is the
/// steady state of the loop, not a fault.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorSnapshot {
    /// The cycle this snapshot belongs to.
    pub cycle: CycleStamp,
    /// Newly completed post-action EEG feature epoch, if one arrived.
    pub eeg: Option<EegEpoch>,
    /// Most recent user action awaiting classification, if any.
    pub last_action: Option<ActionEvent>,
}

impl SensorSnapshot {
    /// Snapshot carrying no new sensor data for the cycle.
    pub fn empty(cycle: CycleStamp) -> Self {
        Self {
            cycle,
            eeg: None,
            last_action: None,
        }
    }
}

/// Pull adapter over an acquisition pipeline.
///
/// `poll` returns `None` only when the source is exhausted, which is
/// how finite sources (replays, scenarios) signal the end of a session.
/// Live sources are never exhausted; they return empty snapshots while
/// idle.
pub trait SignalSource: Send + Sync + Debug {
    /// Non-blocking fetch of the next snapshot.
    fn poll(&mut self) -> Option<SensorSnapshot>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn epoch(start_ms: u64, bin_ms: u64, amplitudes: Vec<f64>) -> EegEpoch {
        EegEpoch {
            start: Duration::from_millis(start_ms),
            bin_width: Duration::from_millis(bin_ms),
            amplitudes,
        }
    }

    #[test]
    fn test_cycle_stamp_advance() {
        let period = Duration::from_millis(11);
        let c0 = CycleStamp::origin();
        let c1 = c0.next(period);
        let c2 = c1.next(period);
        assert_eq!(c2.index, 2);
        assert_eq!(c2.elapsed, Duration::from_millis(22));
    }

    #[test]
    fn test_epoch_end_and_covers() {
        let e = epoch(1000, 50, vec![0.0; 10]);
        assert_eq!(e.end(), Duration::from_millis(1500));
        assert!(e.covers(Duration::from_millis(1000), Duration::from_millis(1500)));
        assert!(e.covers(Duration::from_millis(1200), Duration::from_millis(1350)));
        assert!(!e.covers(Duration::from_millis(950), Duration::from_millis(1100)));
        assert!(!e.covers(Duration::from_millis(1400), Duration::from_millis(1501)));
    }

    #[test]
    fn test_bins_overlapping_selects_interior_span() {
        let e = epoch(1000, 50, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        // [1100, 1250) overlaps bins 2, 3 and 4.
        let bins = e.bins_overlapping(Duration::from_millis(1100), Duration::from_millis(1250));
        assert_eq!(bins, &[3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_bins_overlapping_boundary_excludes_next_bin() {
        let e = epoch(0, 50, vec![1.0, 2.0, 3.0]);
        // A span ending exactly on a bin edge does not include the bin
        // that starts there.
        let bins = e.bins_overlapping(Duration::from_millis(0), Duration::from_millis(100));
        assert_eq!(bins, &[1.0, 2.0]);
    }

    #[test]
    fn test_bins_overlapping_clamps_to_epoch() {
        let e = epoch(1000, 50, vec![1.0, 2.0]);
        let bins = e.bins_overlapping(Duration::from_millis(0), Duration::from_millis(5000));
        assert_eq!(bins, &[1.0, 2.0]);
        let before = e.bins_overlapping(Duration::from_millis(0), Duration::from_millis(900));
        assert!(before.is_empty());
        let degenerate = e.bins_overlapping(Duration::from_millis(1100), Duration::from_millis(1100));
        assert!(degenerate.is_empty());
    }

    #[test]
    fn test_snapshot_roundtrips_through_json() {
        let snapshot = SensorSnapshot {
            cycle: CycleStamp {
                index: 42,
                elapsed: Duration::from_millis(466),
            },
            eeg: Some(epoch(400, 50, vec![0.5, -1.5])),
            last_action: Some(ActionEvent {
                action: UserAction::Grab,
                onset: Duration::from_millis(390),
            }),
        };
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: SensorSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }
}
