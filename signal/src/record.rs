//! Session recording.
//!
//! A recorded session is the complete snapshot stream of one run plus a
//! small header, serialized as JSON. Recordings make field sessions
//! reproducible: the exact stream that drove a controller once can
//! drive it again under different parameters, which is what the
//! calibration sweep is built on.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use aegis_core::signal::{SensorSnapshot, SignalSource};
use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Failure while persisting or loading a session.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("session file io: {0}")]
    Io(#[from] std::io::Error),
    #[error("session file format: {0}")]
    Format(#[from] serde_json::Error),
}

/// Metadata stored alongside a snapshot stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionHeader {
    pub session_id: Uuid,
    /// Poll cadence the stream was captured at.
    pub cycle_rate_hz: u32,
    pub description: String,
    /// Ground-truth conflicted onsets, present only for synthetic
    /// sessions; live recordings leave this empty.
    #[serde(default)]
    pub conflict_onsets: Vec<u64>,
}

/// One complete captured session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedSession {
    pub header: SessionHeader,
    pub snapshots: Vec<SensorSnapshot>,
}

impl RecordedSession {
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Persist the session as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), RecordError> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        info!(
            "saved session {} ({} snapshots) to {}",
            self.header.session_id,
            self.snapshots.len(),
            path.display()
        );
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, RecordError> {
        let file = File::open(path)?;
        let session: Self = serde_json::from_reader(BufReader::new(file))?;
        info!(
            "loaded session {} ({} snapshots) from {}",
            session.header.session_id,
            session.snapshots.len(),
            path.display()
        );
        Ok(session)
    }
}

/// Tee that captures every snapshot passing through a live source.
///
/// Wrap any [`SignalSource`], drive the loop from the wrapper, then
/// call [`finish`](Self::finish) to obtain the recording.
#[derive(Debug)]
pub struct RecordingSource<S> {
    inner: S,
    header: SessionHeader,
    snapshots: Vec<SensorSnapshot>,
}

impl<S: SignalSource> RecordingSource<S> {
    pub fn new(inner: S, cycle_rate_hz: u32, description: impl Into<String>) -> Self {
        Self {
            inner,
            header: SessionHeader {
                session_id: Uuid::new_v4(),
                cycle_rate_hz,
                description: description.into(),
                conflict_onsets: Vec::new(),
            },
            snapshots: Vec::new(),
        }
    }

    /// Stop recording and hand back the captured session.
    pub fn finish(self) -> RecordedSession {
        RecordedSession {
            header: self.header,
            snapshots: self.snapshots,
        }
    }
}

impl<S: SignalSource> SignalSource for RecordingSource<S> {
    fn poll(&mut self) -> Option<SensorSnapshot> {
        let snapshot = self.inner.poll()?;
        self.snapshots.push(snapshot.clone());
        Some(snapshot)
    }
}
