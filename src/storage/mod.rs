//! Persistence of finished recording sessions.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────┐
//! │               Persister (trait)                │
//! │                                                │
//! │   session blocks ──▶ save(blocks, rate, ch)    │
//! │                          │                     │
//! │                          ▼                     │
//! │        ┌────────────────────────────┐          │
//! │        │        WavPersister        │          │
//! │        │  recordings/               │          │
//! │        │    recording_<ts>.wav      │          │
//! │        └────────────────────────────┘          │
//! └────────────────────────────────────────────────┘
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use micloop::audio::AudioBlock;
//! use micloop::storage::{Persister, WavPersister};
//!
//! let persister = WavPersister::new("recordings");
//! let session = vec![AudioBlock::from_interleaved(&[0.0; 2048], 2)];
//! let path = persister.save(&session, 44_100, 2).unwrap();
//! println!("saved {}", path.display());
//! ```

pub mod wav;

// ── Public re-exports ──────────────────────────────────────────────────────

pub use wav::{PersistError, Persister, WavPersister};

// test-only re-export so the session test module can import MockPersister
// without `use micloop::storage::wav::MockPersister`.
#[cfg(test)]
pub use wav::{MockPersister, SaveCall};
