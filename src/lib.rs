//! micloop — live microphone monitoring with on-command WAV recording.
//!
//! The pipeline runs the microphone and the speakers as one duplex loop:
//! everything captured is relayed to the output for live monitoring, and on
//! command the same capture is accumulated and persisted as a WAV file.
//! Muting silences only the monitor path; capture and recording continue
//! underneath it.
//!
//! # Architecture
//!
//! ```text
//!              cpal input callback                       control thread
//!             ┌─────────────────────┐              ┌──────────────────────┐
//! microphone ─▶     InputStage      │─ frames ────▶│ RecordingController  │
//!             │  (flag / mute gate) │   channel    │   FrameAccumulator   │
//!             └──────────┬──────────┘              │          │           │
//!                        │ push / drain            │          ▼           │
//!                        ▼                         │   Persister::save    │
//!                  MonitorQueue                    │  (recording_<ts>.wav)│
//!                        │ pop_or_silence          └──────────▲───────────┘
//!             ┌──────────▼──────────┐                         │ Command
//!   speakers ◀─     OutputStage     │              stdin ── KeyListener
//!             └─────────────────────┘
//!              cpal output callback
//! ```
//!
//! Module map:
//!
//! - [`audio`]   — blocks, the lock-free monitor primitives, the per-callback
//!   stages, and the cpal duplex engine.
//! - [`session`] — the recording state machine and the command-driven
//!   orchestrator.
//! - [`storage`] — the [`storage::Persister`] boundary and its WAV
//!   implementation.
//! - [`keys`]    — the stdin command console.
//! - [`config`]  — TOML settings and platform paths.

pub mod audio;
pub mod config;
pub mod keys;
pub mod session;
pub mod storage;
