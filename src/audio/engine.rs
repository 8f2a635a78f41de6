//! Duplex device bring-up via `cpal`.
//!
//! [`AudioDuplexEngine::open`] resolves the default input and output
//! devices and validates them against the requested stream parameters;
//! [`AudioDuplexEngine::start`] builds one capture and one playback stream
//! driven by the two [`stage`](crate::audio::stage) callbacks.  The returned
//! [`DuplexHandle`] is a RAII guard — dropping it stops both hardware
//! streams, which is how the pipeline guarantees device shutdown on every
//! exit path (including unwinding).
//!
//! Both streams share one [`cpal::StreamConfig`], so sample rate, channel
//! count and block size agree between the two sides by construction.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, SampleFormat, SampleRate, StreamConfig};
use thiserror::Error;

use crate::audio::block::BlockShape;
use crate::audio::stage::{InputStage, OutputStage};

// ---------------------------------------------------------------------------
// DuplexHandle
// ---------------------------------------------------------------------------

/// RAII guard that keeps both cpal streams alive.
///
/// Dropping this value drops the underlying `cpal::Stream`s, which stops
/// the hardware capture and playback.
pub struct DuplexHandle {
    _input: cpal::Stream,
    _output: cpal::Stream,
}

// ---------------------------------------------------------------------------
// DeviceError
// ---------------------------------------------------------------------------

/// Errors raised while opening or starting the duplex devices.
///
/// All of these are fatal during bring-up: the pipeline refuses to run
/// half-duplex or with a sample format it would have to convert.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("no input device found on the default audio host")]
    NoInputDevice,

    #[error("no output device found on the default audio host")]
    NoOutputDevice,

    #[error("failed to query default {side} config: {source}")]
    DefaultConfig {
        side: &'static str,
        #[source]
        source: cpal::DefaultStreamConfigError,
    },

    #[error("default {side} sample format is {format:?}, only f32 is supported")]
    UnsupportedSampleFormat {
        side: &'static str,
        format: SampleFormat,
    },

    #[error("failed to build {side} stream: {source}")]
    BuildStream {
        side: &'static str,
        #[source]
        source: cpal::BuildStreamError,
    },

    #[error("failed to start {side} stream: {source}")]
    PlayStream {
        side: &'static str,
        #[source]
        source: cpal::PlayStreamError,
    },
}

// ---------------------------------------------------------------------------
// AudioDuplexEngine
// ---------------------------------------------------------------------------

/// Paired capture/playback device wrapper built on top of `cpal`.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::{mpsc, Arc};
/// use std::sync::atomic::AtomicBool;
/// use micloop::audio::{
///     AudioDuplexEngine, InputStage, MonitorQueue, MuteGate, OutputStage,
/// };
///
/// let engine = AudioDuplexEngine::open(44_100, 2, 1024).unwrap();
///
/// let monitor = Arc::new(MonitorQueue::new());
/// let (tx, _rx) = mpsc::channel();
/// let input = InputStage::new(
///     Arc::new(AtomicBool::new(false)),
///     Arc::new(MuteGate::new()),
///     Arc::clone(&monitor),
///     tx,
///     engine.channels(),
/// );
/// let output = OutputStage::new(monitor, engine.channels());
///
/// let _handle = engine.start(input, output).unwrap();
/// // `_handle` keeps both streams alive; drop it to stop them.
/// ```
pub struct AudioDuplexEngine {
    input_device: cpal::Device,
    output_device: cpal::Device,
    /// Shared by both streams so the two sides cannot disagree.
    config: StreamConfig,
    shape: BlockShape,
}

impl AudioDuplexEngine {
    /// Resolve the default duplex pair and validate it for the requested
    /// parameters.
    ///
    /// Validation covers what can be checked before building streams: both
    /// devices must exist and both must default to `f32` samples (the
    /// pipeline does no format conversion).  A device that cannot honour
    /// the rate or block size itself rejects the config in
    /// [`start`](Self::start), still before any audio flows.
    ///
    /// # Errors
    ///
    /// [`DeviceError::NoInputDevice`] / [`DeviceError::NoOutputDevice`]
    /// when a side is missing, [`DeviceError::DefaultConfig`] when a device
    /// cannot report its default configuration, or
    /// [`DeviceError::UnsupportedSampleFormat`] for non-`f32` devices.
    pub fn open(sample_rate: u32, channels: u16, block_frames: u32) -> Result<Self, DeviceError> {
        let host = cpal::default_host();
        let input_device = host
            .default_input_device()
            .ok_or(DeviceError::NoInputDevice)?;
        let output_device = host
            .default_output_device()
            .ok_or(DeviceError::NoOutputDevice)?;

        log::info!(
            "input device: {}",
            input_device.name().unwrap_or_else(|_| "unknown".into())
        );
        log::info!(
            "output device: {}",
            output_device.name().unwrap_or_else(|_| "unknown".into())
        );

        for (side, supported) in [
            ("input", input_device.default_input_config()),
            ("output", output_device.default_output_config()),
        ] {
            let supported =
                supported.map_err(|source| DeviceError::DefaultConfig { side, source })?;
            if supported.sample_format() != SampleFormat::F32 {
                return Err(DeviceError::UnsupportedSampleFormat {
                    side,
                    format: supported.sample_format(),
                });
            }
        }

        let config = StreamConfig {
            channels,
            sample_rate: SampleRate(sample_rate),
            buffer_size: BufferSize::Fixed(block_frames),
        };

        Ok(Self {
            input_device,
            output_device,
            config,
            shape: BlockShape::new(block_frames as usize, channels),
        })
    }

    /// Build and start both streams, wiring `input` and `output` into the
    /// device callbacks.
    ///
    /// Each callback runs on its own device thread.  Stream errors are
    /// logged and otherwise ignored; the monitor path degrades to silence
    /// rather than tearing the session down.  If the second stream fails to
    /// come up the first one is dropped on the way out, so a half-built
    /// duplex never outlives this call.
    ///
    /// # Errors
    ///
    /// [`DeviceError::BuildStream`] when a device rejects the shared
    /// config, [`DeviceError::PlayStream`] when a stream fails to start.
    pub fn start(
        &self,
        input: InputStage,
        output: OutputStage,
    ) -> Result<DuplexHandle, DeviceError> {
        let input_stream = self
            .input_device
            .build_input_stream(
                &self.config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    input.process(data);
                },
                |err: cpal::StreamError| {
                    log::error!("input stream error: {err}");
                },
                None, // no timeout
            )
            .map_err(|source| DeviceError::BuildStream {
                side: "input",
                source,
            })?;

        let output_stream = self
            .output_device
            .build_output_stream(
                &self.config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    output.process(data);
                },
                |err: cpal::StreamError| {
                    log::error!("output stream error: {err}");
                },
                None, // no timeout
            )
            .map_err(|source| DeviceError::BuildStream {
                side: "output",
                source,
            })?;

        input_stream.play().map_err(|source| DeviceError::PlayStream {
            side: "input",
            source,
        })?;
        output_stream
            .play()
            .map_err(|source| DeviceError::PlayStream {
                side: "output",
                source,
            })?;

        Ok(DuplexHandle {
            _input: input_stream,
            _output: output_stream,
        })
    }

    /// Sample rate both streams run at, in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    /// Number of interleaved channels on both streams.
    pub fn channels(&self) -> u16 {
        self.config.channels
    }

    /// Nominal per-callback block shape.
    pub fn block_shape(&self) -> BlockShape {
        self.shape
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // Device-backed paths need hardware; only the error surface is
    // testable here.

    #[test]
    fn missing_device_errors_name_the_side() {
        assert_eq!(
            DeviceError::NoInputDevice.to_string(),
            "no input device found on the default audio host"
        );
        assert_eq!(
            DeviceError::NoOutputDevice.to_string(),
            "no output device found on the default audio host"
        );
    }

    #[test]
    fn unsupported_format_error_names_side_and_format() {
        let err = DeviceError::UnsupportedSampleFormat {
            side: "output",
            format: SampleFormat::I16,
        };
        let msg = err.to_string();
        assert!(msg.contains("output"));
        assert!(msg.contains("I16"));
    }
}
