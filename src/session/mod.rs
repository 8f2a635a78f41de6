//! Session control for the duplex loop.
//!
//! This module turns the stream of commands from the operator into recording
//! sessions: open on start, accumulate, close and persist on stop, and make
//! sure nothing recorded is lost on the way out.
//!
//! # Architecture
//!
//! ```text
//! Command (mpsc)
//!        │
//!        ▼
//! SessionOrchestrator::run()  ← async control loop
//!        │
//!        ├─ Start      → RecordingController::start()   (flag → callbacks)
//!        ├─ Stop       → RecordingController::stop()
//!        │                 └─ FrameAccumulator ──▶ Persister::save(…)
//!        ├─ ToggleMute → MuteGate::toggle() + MonitorQueue::drain()
//!        └─ Quit       → finalize (save anything still held)
//!
//! input callback ── frames channel ──▶ RecordingController  (drained on stop)
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::{mpsc, Arc};
//! use micloop::audio::{MonitorQueue, MuteGate};
//! use micloop::keys::Command;
//! use micloop::session::{RecordingController, SessionOrchestrator};
//! use micloop::storage::{Persister, WavPersister};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let (frames_tx, frames_rx) = mpsc::channel();
//!     let controller = RecordingController::new(frames_rx);
//!     let mute = Arc::new(MuteGate::new());
//!     let monitor = Arc::new(MonitorQueue::new());
//!     let persister: Arc<dyn Persister> = Arc::new(WavPersister::new("recordings"));
//!
//!     // frames_tx goes to the InputStage; command_tx to the key listener.
//!     let (command_tx, command_rx) = tokio::sync::mpsc::channel::<Command>(16);
//!     # drop(frames_tx);
//!     # drop(command_tx);
//!
//!     let orchestrator =
//!         SessionOrchestrator::new(controller, mute, monitor, persister, 44_100, 2);
//!     orchestrator.run(command_rx).await;
//! }
//! ```

pub mod runner;
pub mod state;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use runner::SessionOrchestrator;
pub use state::{FrameAccumulator, RecordingController, RecordingState};
