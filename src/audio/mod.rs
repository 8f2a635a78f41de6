//! Audio pipeline — duplex capture/playback with a lock-free monitor path.
//!
//! # Pipeline
//!
//! ```text
//! Microphone → cpal input callback → InputStage ──┬─▶ frames channel (recording)
//!                                                 └─▶ MonitorQueue ─▶ OutputStage
//!                                                        ▲                │
//!                                                     MuteGate    cpal output callback
//!                                                                         │
//!                                                                     Speakers
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::atomic::AtomicBool;
//! use std::sync::{mpsc, Arc};
//! use micloop::audio::{
//!     AudioDuplexEngine, InputStage, MonitorQueue, MuteGate, OutputStage,
//! };
//!
//! let engine = AudioDuplexEngine::open(44_100, 2, 1024).unwrap();
//!
//! let monitor = Arc::new(MonitorQueue::new());
//! let recording = Arc::new(AtomicBool::new(false));
//! let mute = Arc::new(MuteGate::new());
//! let (frames_tx, frames_rx) = mpsc::channel();
//!
//! let input = InputStage::new(recording, mute, Arc::clone(&monitor), frames_tx, 2);
//! let output = OutputStage::new(monitor, 2);
//! let _handle = engine.start(input, output).unwrap(); // drop handle → stop both streams
//!
//! while let Ok(block) = frames_rx.recv() {
//!     println!("captured {} frames", block.frames());
//! }
//! ```

pub mod block;
pub mod engine;
pub mod monitor;
pub mod stage;

pub use block::{AudioBlock, BlockShape};
pub use engine::{AudioDuplexEngine, DeviceError, DuplexHandle};
pub use monitor::{MonitorQueue, MuteGate};
pub use stage::{InputStage, OutputStage};
