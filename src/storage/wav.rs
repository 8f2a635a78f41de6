//! WAV persistence for finished recording sessions.
//!
//! # Overview
//!
//! [`Persister`] is the boundary the control loop hands a finished session
//! to.  It is object-safe and `Send + Sync` so it can be held behind an
//! `Arc<dyn Persister>`.
//!
//! [`WavPersister`] is the production implementation: it concatenates the
//! session's blocks in order and writes one 32-bit float WAV file with a
//! timestamped name under the configured output directory.
//!
//! `MockPersister` (available under `#[cfg(test)]`) records every call it
//! receives, useful for asserting what the control loop hands over without
//! touching the filesystem.

use std::fs;
use std::io;
use std::path::PathBuf;

use chrono::Local;
use hound::{SampleFormat, WavSpec, WavWriter};
use thiserror::Error;

use crate::audio::AudioBlock;

// ---------------------------------------------------------------------------
// PersistError
// ---------------------------------------------------------------------------

/// Errors raised while writing a session to disk.
///
/// None of these lose audio: the caller keeps the session blocks and may
/// retry the save.
#[derive(Debug, Error)]
pub enum PersistError {
    /// The output directory could not be created.
    #[error("failed to create output directory {dir}: {source}")]
    CreateDir {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The WAV encoder or the underlying file I/O failed.
    #[error("failed to write WAV file: {0}")]
    Wav(#[from] hound::Error),
}

// ---------------------------------------------------------------------------
// Persister trait
// ---------------------------------------------------------------------------

/// Object-safe, thread-safe sink for finished recording sessions.
///
/// # Contract
///
/// - `blocks` are interleaved `f32` in capture order; the persisted file
///   must contain exactly their concatenation.
/// - On success the path of the newly written file is returned.
/// - On failure no partial state is the caller's problem: the caller may
///   simply call `save` again with the same session.
pub trait Persister: Send + Sync {
    /// Write one finished session and return the file it landed in.
    fn save(
        &self,
        blocks: &[AudioBlock],
        sample_rate: u32,
        channels: u16,
    ) -> Result<PathBuf, PersistError>;
}

// Compile-time assertion: Box<dyn Persister> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn Persister>) {}
};

// ---------------------------------------------------------------------------
// WavPersister
// ---------------------------------------------------------------------------

/// Production persister that writes `recording_<timestamp>.wav` files.
///
/// The output directory is created on demand, so a freshly configured (or
/// freshly deleted) target path never fails the first save.  Samples are
/// written as 32-bit float, the same representation they were captured in.
pub struct WavPersister {
    output_dir: PathBuf,
}

impl WavPersister {
    /// Persist into `output_dir` (relative paths resolve against the
    /// working directory).
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// `recording_YYYYmmdd_HHMMSS.wav`, local time.
    fn generate_filename() -> String {
        format!("recording_{}.wav", Local::now().format("%Y%m%d_%H%M%S"))
    }
}

impl Persister for WavPersister {
    fn save(
        &self,
        blocks: &[AudioBlock],
        sample_rate: u32,
        channels: u16,
    ) -> Result<PathBuf, PersistError> {
        fs::create_dir_all(&self.output_dir).map_err(|source| PersistError::CreateDir {
            dir: self.output_dir.clone(),
            source,
        })?;

        let path = self.output_dir.join(Self::generate_filename());
        let spec = WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };

        let mut writer = WavWriter::create(&path, spec)?;
        for block in blocks {
            for &sample in block.samples() {
                writer.write_sample(sample)?;
            }
        }
        writer.finalize()?;

        Ok(path)
    }
}

// ---------------------------------------------------------------------------
// MockPersister  (test-only)
// ---------------------------------------------------------------------------

/// One recorded [`Persister::save`] invocation.
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct SaveCall {
    /// Concatenation of all block samples, in the order they were given.
    pub samples: Vec<f32>,
    /// Number of blocks in the session.
    pub blocks: usize,
    pub sample_rate: u32,
    pub channels: u16,
}

/// A test double that records every save instead of writing files.
///
/// The failing variant still records the call before erroring, so tests can
/// assert both "was called" and "audio was retained afterwards".
#[cfg(test)]
pub struct MockPersister {
    fail: bool,
    calls: std::sync::Mutex<Vec<SaveCall>>,
}

#[cfg(test)]
impl MockPersister {
    /// A mock whose saves always succeed.
    pub fn ok() -> Self {
        Self {
            fail: false,
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// A mock whose saves always fail (after recording the call).
    pub fn failing() -> Self {
        Self {
            fail: true,
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of all recorded calls.
    pub fn calls(&self) -> Vec<SaveCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of times `save` was invoked.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[cfg(test)]
impl Persister for MockPersister {
    fn save(
        &self,
        blocks: &[AudioBlock],
        sample_rate: u32,
        channels: u16,
    ) -> Result<PathBuf, PersistError> {
        let samples = blocks
            .iter()
            .flat_map(|b| b.samples().iter().copied())
            .collect();
        self.calls.lock().unwrap().push(SaveCall {
            samples,
            blocks: blocks.len(),
            sample_rate,
            channels,
        });

        if self.fail {
            Err(PersistError::CreateDir {
                dir: PathBuf::from("mock"),
                source: io::Error::new(io::ErrorKind::Other, "mock persister failure"),
            })
        } else {
            Ok(PathBuf::from("mock.wav"))
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// Stereo block whose samples ramp from `base` so ordering mistakes
    /// show up in the written file.
    fn ramp_block(base: f32, frames: usize) -> AudioBlock {
        let samples: Vec<f32> = (0..frames * 2).map(|i| base + i as f32 * 1e-4).collect();
        AudioBlock::from_interleaved(&samples, 2)
    }

    // ---- WavPersister ---

    #[test]
    fn save_round_trips_through_hound() {
        let dir = tempfile::tempdir().unwrap();
        let persister = WavPersister::new(dir.path());

        let blocks = [ramp_block(0.0, 1024), ramp_block(0.3, 1024), ramp_block(0.6, 1024)];
        let path = persister.save(&blocks, 44_100, 2).unwrap();

        let mut reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 2);
        assert_eq!(spec.sample_rate, 44_100);
        assert_eq!(spec.bits_per_sample, 32);
        assert_eq!(spec.sample_format, SampleFormat::Float);

        let written: Vec<f32> = reader.samples::<f32>().map(|s| s.unwrap()).collect();
        let expected: Vec<f32> = blocks
            .iter()
            .flat_map(|b| b.samples().iter().copied())
            .collect();
        assert_eq!(written.len(), 3 * 1024 * 2);
        assert_eq!(written, expected);
    }

    #[test]
    fn save_creates_missing_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("captures").join("today");
        assert!(!nested.exists());

        let persister = WavPersister::new(&nested);
        let path = persister.save(&[ramp_block(0.0, 8)], 44_100, 2).unwrap();

        assert!(nested.is_dir());
        assert!(path.starts_with(&nested));
    }

    #[test]
    fn filename_is_timestamped() {
        let name = WavPersister::generate_filename();
        assert!(name.starts_with("recording_"));
        assert!(name.ends_with(".wav"));
        // recording_YYYYmmdd_HHMMSS.wav
        assert_eq!(name.len(), "recording_".len() + 15 + ".wav".len());
    }

    // ---- MockPersister ---

    #[test]
    fn mock_records_call_details() {
        let mock = MockPersister::ok();
        let blocks = [ramp_block(0.0, 4), ramp_block(0.5, 4)];

        let path = mock.save(&blocks, 48_000, 2).unwrap();
        assert_eq!(path, PathBuf::from("mock.wav"));

        let calls = mock.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].blocks, 2);
        assert_eq!(calls[0].sample_rate, 48_000);
        assert_eq!(calls[0].channels, 2);
        assert_eq!(calls[0].samples.len(), 16);
    }

    #[test]
    fn failing_mock_records_before_erroring() {
        let mock = MockPersister::failing();
        let result = mock.save(&[ramp_block(0.0, 4)], 44_100, 2);

        assert!(result.is_err());
        assert_eq!(mock.call_count(), 1);
    }

    // ---- Persister object safety ---

    #[test]
    fn box_dyn_persister_compiles() {
        // If this test compiles, the trait is object-safe.
        let persister: Box<dyn Persister> = Box::new(MockPersister::ok());
        let _ = persister.save(&[ramp_block(0.0, 4)], 44_100, 2);
    }
}
