//! Recording state machine and per-session block accumulation.
//!
//! [`RecordingController`] owns the receive side of the frames channel fed
//! by the input callback and turns it into discrete sessions:
//!
//! ```text
//! Idle ──start()──▶ Recording        (accumulator cleared, stale blocks dropped)
//! Recording ──stop()──▶ Idle         (pending blocks collected into the accumulator)
//!
//! start() while Recording → no-op
//! stop()  while Idle      → 0 blocks
//! ```
//!
//! The capture callback never touches the accumulator.  It only reads the
//! recording flag and pushes blocks into the channel; the controller drains
//! the channel on `stop()`, so the whole session lands in one place, in
//! capture order, owned by the control thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;

use crate::audio::AudioBlock;

// ---------------------------------------------------------------------------
// RecordingState
// ---------------------------------------------------------------------------

/// The two phases of the recording side.
///
/// The monitor path is orthogonal: it relays (or stays muted) in either
/// phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingState {
    /// No session in progress; captured blocks are not retained.
    Idle,

    /// A session is open; every captured block is queued for it.
    Recording,
}

impl RecordingState {
    /// Returns `true` while a session is open.
    ///
    /// ```
    /// use micloop::session::RecordingState;
    ///
    /// assert!(!RecordingState::Idle.is_active());
    /// assert!(RecordingState::Recording.is_active());
    /// ```
    pub fn is_active(&self) -> bool {
        matches!(self, RecordingState::Recording)
    }

    /// A short human-readable label for status output.
    pub fn label(&self) -> &'static str {
        match self {
            RecordingState::Idle => "Idle",
            RecordingState::Recording => "Recording",
        }
    }
}

impl Default for RecordingState {
    fn default() -> Self {
        RecordingState::Idle
    }
}

// ---------------------------------------------------------------------------
// FrameAccumulator
// ---------------------------------------------------------------------------

/// Ordered storage for one recording session's blocks.
///
/// Blocks are appended in capture order and kept until the session is
/// either persisted (then [`RecordingController::discard_session`]) or
/// superseded by the next `start()`.
#[derive(Debug, Default)]
pub struct FrameAccumulator {
    blocks: Vec<AudioBlock>,
}

impl FrameAccumulator {
    pub fn new() -> Self {
        Self { blocks: Vec::new() }
    }

    /// Append one block at the end of the session.
    pub fn append(&mut self, block: AudioBlock) {
        self.blocks.push(block);
    }

    /// The session's blocks in capture order.
    pub fn blocks(&self) -> &[AudioBlock] {
        &self.blocks
    }

    /// Number of accumulated blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Returns `true` when no blocks are held.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Drop all blocks.
    pub fn clear(&mut self) {
        self.blocks.clear();
    }

    /// Total frame count across all blocks.
    pub fn total_frames(&self) -> usize {
        self.blocks.iter().map(AudioBlock::frames).sum()
    }

    /// Session duration in seconds at `sample_rate` Hz.
    pub fn duration_secs(&self, sample_rate: u32) -> f32 {
        if sample_rate == 0 {
            return 0.0;
        }
        self.total_frames() as f32 / sample_rate as f32
    }
}

// ---------------------------------------------------------------------------
// RecordingController
// ---------------------------------------------------------------------------

/// Session bookkeeping around the frames channel.
///
/// Shares exactly one thing with the capture callback: the recording flag
/// (an `AtomicBool` handed out by [`recording_flag`](Self::recording_flag)).
/// Everything else (the receiver, the accumulator) stays on the control
/// thread.
pub struct RecordingController {
    recording: Arc<AtomicBool>,
    frames_rx: mpsc::Receiver<AudioBlock>,
    accumulator: FrameAccumulator,
}

impl RecordingController {
    /// Wrap the receive side of the frames channel.
    pub fn new(frames_rx: mpsc::Receiver<AudioBlock>) -> Self {
        Self {
            recording: Arc::new(AtomicBool::new(false)),
            frames_rx,
            accumulator: FrameAccumulator::new(),
        }
    }

    /// The flag the capture callback reads to decide whether to forward
    /// blocks.  Clone of an `Arc`, cheap to hand to the input stage.
    pub fn recording_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.recording)
    }

    /// Current phase, derived from the same flag the callback reads.
    pub fn state(&self) -> RecordingState {
        if self.is_recording() {
            RecordingState::Recording
        } else {
            RecordingState::Idle
        }
    }

    /// Returns `true` while a session is open.
    pub fn is_recording(&self) -> bool {
        self.recording.load(Ordering::Relaxed)
    }

    /// Open a new session.
    ///
    /// Returns `false` (and changes nothing) when a session is already
    /// open, so a repeated start command cannot split or restart a
    /// recording.  Otherwise any blocks still sitting in the channel from
    /// before this moment are discarded, the accumulator is cleared, and
    /// the capture callback starts forwarding.
    pub fn start(&mut self) -> bool {
        if self.is_recording() {
            return false;
        }

        // A block sent in the window around the previous stop() may still
        // be in flight; it belongs to no session and is dropped here.
        let stale = self.frames_rx.try_iter().count();
        if stale > 0 {
            log::debug!("dropped {stale} stale block(s) left over from a previous session");
        }

        self.accumulator.clear();
        self.recording.store(true, Ordering::Relaxed);
        true
    }

    /// Close the current session and collect its blocks.
    ///
    /// Returns the number of blocks accumulated for the session; `0` from
    /// the idle state (nothing was captured).  The blocks stay in the
    /// accumulator until [`discard_session`](Self::discard_session), so a
    /// failed save can be retried without losing audio.
    pub fn stop(&mut self) -> usize {
        if !self.is_recording() {
            return 0;
        }

        self.recording.store(false, Ordering::Relaxed);
        for block in self.frames_rx.try_iter() {
            self.accumulator.append(block);
        }
        self.accumulator.len()
    }

    /// Read access to the collected session.
    pub fn accumulator(&self) -> &FrameAccumulator {
        &self.accumulator
    }

    /// Drop the collected session after a successful handoff.
    pub fn discard_session(&mut self) {
        self.accumulator.clear();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
