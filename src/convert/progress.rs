//! Progress reporting.
//!
//! Two decoupled, fire-and-forget channels: phase-level and file-level.
//! Sink implementations must never block the pipeline; the bundled
//! [`ChannelProgress`] uses unbounded sends and drops messages once the
//! receiver is gone.

use std::path::PathBuf;

use tokio::sync::mpsc;

/// The orchestrator's observable states, named by what they do.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PhaseKind {
    Converting,
    Assembling,
    ComparingDiagnostics,
    Simplifying,
    Emitting,
}

#[derive(Clone, Debug)]
pub struct PhaseProgress {
    pub phase: PhaseKind,
    pub documents: usize,
}

#[derive(Clone, Debug)]
pub struct FileProgress {
    pub path: PathBuf,
    pub succeeded: bool,
}

pub trait ProgressSink: Send + Sync {
    fn phase_started(&self, progress: PhaseProgress) {
        let _ = progress;
    }

    fn file_completed(&self, progress: FileProgress) {
        let _ = progress;
    }
}

/// Discards all progress. The default sink.
pub struct NullProgress;

impl ProgressSink for NullProgress {}

/// Forwards progress over unbounded channels. Sending never blocks; a
/// dropped receiver silently swallows further messages.
pub struct ChannelProgress {
    phase_tx: mpsc::UnboundedSender<PhaseProgress>,
    file_tx: mpsc::UnboundedSender<FileProgress>,
}

impl ChannelProgress {
    pub fn new() -> (
        Self,
        mpsc::UnboundedReceiver<PhaseProgress>,
        mpsc::UnboundedReceiver<FileProgress>,
    ) {
        let (phase_tx, phase_rx) = mpsc::unbounded_channel();
        let (file_tx, file_rx) = mpsc::unbounded_channel();
        (Self { phase_tx, file_tx }, phase_rx, file_rx)
    }
}

impl ProgressSink for ChannelProgress {
    fn phase_started(&self, progress: PhaseProgress) {
        let _ = self.phase_tx.send(progress);
    }

    fn file_completed(&self, progress: FileProgress) {
        let _ = self.file_tx.send(progress);
    }
}
