//! Session orchestrator — drives the record / persist / mute control loop.
//!
//! [`SessionOrchestrator`] owns the [`RecordingController`] and responds to
//! [`Command`]s received over a `tokio::sync::mpsc` channel.
//!
//! # Control flow
//!
//! ```text
//! Command::Start
//!   └─▶ controller.start()                      [Idle → Recording]
//!
//! Command::Stop
//!   └─▶ controller.stop() → persister.save(…)   [Recording → Idle]
//!         ├─ 0 blocks → warn, no file written
//!         ├─ Ok(path) → log stats, discard session
//!         └─ Err      → keep session in memory for a retry
//!
//! Command::ToggleMute
//!   └─▶ mute.toggle()  (+ drain the monitor when muting)
//!
//! Command::Quit  /  channel closed
//!   └─▶ finalize: stop and save anything still recording or retained
//! ```
//!
//! The loop is the only place recording state changes, so every transition
//! is serialised: the realtime callbacks observe it through the atomic flag
//! and the mute gate, never the other way around.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::audio::{MonitorQueue, MuteGate};
use crate::keys::Command;
use crate::storage::Persister;

use super::state::RecordingController;

// ---------------------------------------------------------------------------
// SessionOrchestrator
// ---------------------------------------------------------------------------

/// Drives the complete record → accumulate → persist loop.
///
/// Create with [`SessionOrchestrator::new`], then `block_on` (or spawn)
/// [`run`](Self::run) with the command channel's receive side.
///
/// ```rust,no_run
/// use std::sync::{mpsc, Arc};
/// use micloop::audio::{MonitorQueue, MuteGate};
/// use micloop::session::{RecordingController, SessionOrchestrator};
/// use micloop::storage::{Persister, WavPersister};
///
/// # async fn example() {
/// let (_frames_tx, frames_rx) = mpsc::channel();
/// let controller = RecordingController::new(frames_rx);
/// let mute = Arc::new(MuteGate::new());
/// let monitor = Arc::new(MonitorQueue::new());
/// let persister: Arc<dyn Persister> = Arc::new(WavPersister::new("recordings"));
///
/// let (command_tx, command_rx) = tokio::sync::mpsc::channel(16);
/// let orchestrator =
///     SessionOrchestrator::new(controller, mute, monitor, persister, 44_100, 2);
/// orchestrator.run(command_rx).await;
/// # }
/// ```
pub struct SessionOrchestrator {
    controller: RecordingController,
    mute: Arc<MuteGate>,
    monitor: Arc<MonitorQueue>,
    persister: Arc<dyn Persister>,
    sample_rate: u32,
    channels: u16,
}

impl SessionOrchestrator {
    /// Create a new orchestrator.
    ///
    /// # Arguments
    ///
    /// * `controller`  — recording state machine fed by the input callback.
    /// * `mute`        — gate shared with the input callback.
    /// * `monitor`     — queue shared with both callbacks (drained on mute).
    /// * `persister`   — sink for finished sessions (e.g. `WavPersister`).
    /// * `sample_rate` — stream rate in Hz, recorded into saved files.
    /// * `channels`    — interleaved channel count of the captured blocks.
    pub fn new(
        controller: RecordingController,
        mute: Arc<MuteGate>,
        monitor: Arc<MonitorQueue>,
        persister: Arc<dyn Persister>,
        sample_rate: u32,
        channels: u16,
    ) -> Self {
        Self {
            controller,
            mute,
            monitor,
            persister,
            sample_rate,
            channels,
        }
    }

    // -----------------------------------------------------------------------
    // Main async loop
    // -----------------------------------------------------------------------

    /// Run the orchestrator until a [`Command::Quit`] arrives or the channel
    /// is closed.
    ///
    /// Either way an active or retained recording is stopped and saved
    /// before returning, so closing the app mid-recording never loses the
    /// take.
    pub async fn run(mut self, mut command_rx: mpsc::Receiver<Command>) {
        while let Some(command) = command_rx.recv().await {
            match command {
                Command::Start => self.handle_start(),
                Command::Stop => self.handle_stop(),
                Command::ToggleMute => self.handle_toggle_mute(),
                Command::Quit => {
                    log::info!("session: quit requested");
                    break;
                }
            }
        }

        self.finalize();
        log::info!("session: command loop stopped");
    }

    // -----------------------------------------------------------------------
    // Command handlers
    // -----------------------------------------------------------------------

    /// Open a new recording session; a repeat start changes nothing.
    fn handle_start(&mut self) {
        if self.controller.start() {
            log::info!("session: recording started");
        } else {
            log::debug!("session: start ignored, already recording");
        }
    }

    /// Close the session and persist it; from idle, retry a retained
    /// session if one is held, otherwise ignore.
    fn handle_stop(&mut self) {
        if self.controller.is_recording() {
            self.stop_and_persist();
        } else if !self.controller.accumulator().is_empty() {
            log::info!("session: retrying save of the retained recording");
            self.persist_session();
        } else {
            log::debug!("session: stop ignored, not recording");
        }
    }

    /// Flip the monitor path; recording is unaffected either way.
    fn handle_toggle_mute(&mut self) {
        if self.mute.toggle() {
            // Drop anything already queued so playback stops within one
            // block instead of replaying it on unmute.
            self.monitor.drain();
            log::info!("session: monitor muted (recording unaffected)");
        } else {
            log::info!("session: monitor live");
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// Stop the active session and persist it when non-empty.
    fn stop_and_persist(&mut self) {
        let blocks = self.controller.stop();
        if blocks == 0 {
            log::warn!("session: nothing was captured, no file written");
            return;
        }
        self.persist_session();
    }

    /// Hand the accumulated session to the persister.
    ///
    /// On success the session is discarded; on failure it stays in the
    /// accumulator so another stop (or shutdown) can retry.
    fn persist_session(&mut self) {
        let session = self.controller.accumulator();
        let blocks = session.len();
        let duration = session.duration_secs(self.sample_rate);

        match self
            .persister
            .save(session.blocks(), self.sample_rate, self.channels)
        {
            Ok(path) => {
                log::info!(
                    "session: saved {blocks} block(s), {duration:.2} s → {}",
                    path.display()
                );
                self.controller.discard_session();
            }
            Err(e) => {
                log::error!("session: save failed: {e}; recording kept in memory, stop again to retry");
            }
        }
    }

    /// Shutdown path: make sure no audio is silently dropped.
    fn finalize(&mut self) {
        if self.controller.is_recording() {
            log::info!("session: recording still active at shutdown, saving it");
            self.stop_and_persist();
        } else if !self.controller.accumulator().is_empty() {
            log::info!("session: saving retained recording before exit");
            self.persist_session();
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
