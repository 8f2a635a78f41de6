//! Fixed-shape blocks of interleaved `f32` samples.
//!
//! Every hop between pipeline stages (callback → monitor queue, callback →
//! recording channel, accumulator → WAV writer) moves whole [`AudioBlock`]s.
//! A block is immutable after construction: stages hand blocks around but
//! never edit samples in place, so a block travelling down both the monitor
//! and the recording path is always bit-identical on each.
//!
//! # Example
//!
//! ```rust
//! use micloop::audio::{AudioBlock, BlockShape};
//!
//! let block = AudioBlock::from_interleaved(&[0.1, 0.2, 0.3, 0.4], 2);
//! assert_eq!(block.frames(), 2);
//! assert_eq!(block.channels(), 2);
//!
//! let quiet = AudioBlock::silence(BlockShape::new(2, 2));
//! assert_eq!(quiet.samples(), &[0.0, 0.0, 0.0, 0.0]);
//! ```

// ---------------------------------------------------------------------------
// BlockShape
// ---------------------------------------------------------------------------

/// Frame/channel geometry of an [`AudioBlock`].
///
/// Interleaved layout: one *frame* holds one sample per channel, so a block
/// of shape `(frames, channels)` stores `frames * channels` samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockShape {
    frames: usize,
    channels: u16,
}

impl BlockShape {
    /// Create a shape of `frames` frames with `channels` interleaved channels.
    ///
    /// # Panics
    ///
    /// Panics if `channels == 0`.
    pub fn new(frames: usize, channels: u16) -> Self {
        assert!(channels > 0, "BlockShape channels must be > 0");
        Self { frames, channels }
    }

    /// Number of frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Number of interleaved channels.
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Total interleaved sample count (`frames * channels`).
    pub fn samples(&self) -> usize {
        self.frames * self.channels as usize
    }
}

// ---------------------------------------------------------------------------
// AudioBlock
// ---------------------------------------------------------------------------

/// An immutable block of interleaved `f32` samples with a known shape.
///
/// Constructed once per device callback (or as synthetic silence for the
/// output side) and then only read.  Cloning copies the sample storage;
/// stages that need to hand the same block to two consumers clone it.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBlock {
    samples: Vec<f32>,
    shape: BlockShape,
}

impl AudioBlock {
    /// Build a block from an interleaved slice as delivered by the device.
    ///
    /// The slice length is rounded *down* to a whole number of frames; a
    /// trailing partial frame (possible when a driver hands over an odd
    /// sample count) is dropped rather than padded.
    ///
    /// # Panics
    ///
    /// Panics if `channels == 0` (via [`BlockShape::new`]).
    pub fn from_interleaved(data: &[f32], channels: u16) -> Self {
        let frames = data.len() / channels as usize;
        let shape = BlockShape::new(frames, channels);
        Self {
            samples: data[..shape.samples()].to_vec(),
            shape,
        }
    }

    /// A block of the given shape filled with zero samples.
    pub fn silence(shape: BlockShape) -> Self {
        Self {
            samples: vec![0.0; shape.samples()],
            shape,
        }
    }

    /// Interleaved samples, `frames * channels` long.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Geometry of this block.
    pub fn shape(&self) -> BlockShape {
        self.shape
    }

    /// Number of frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.shape.frames
    }

    /// Number of interleaved channels.
    pub fn channels(&self) -> u16 {
        self.shape.channels
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // ---- BlockShape --------------------------------------------------------

    #[test]
    fn shape_sample_count() {
        let shape = BlockShape::new(1024, 2);
        assert_eq!(shape.frames(), 1024);
        assert_eq!(shape.channels(), 2);
        assert_eq!(shape.samples(), 2048);
    }

    #[test]
    fn shape_mono() {
        let shape = BlockShape::new(512, 1);
        assert_eq!(shape.samples(), 512);
    }

    #[test]
    #[should_panic(expected = "BlockShape channels must be > 0")]
    fn zero_channels_panics() {
        let _shape = BlockShape::new(1024, 0);
    }

    // ---- from_interleaved --------------------------------------------------

    #[test]
    fn from_interleaved_stereo() {
        let block = AudioBlock::from_interleaved(&[0.1, 0.2, 0.3, 0.4, 0.5, 0.6], 2);
        assert_eq!(block.frames(), 3);
        assert_eq!(block.channels(), 2);
        assert_eq!(block.samples(), &[0.1, 0.2, 0.3, 0.4, 0.5, 0.6]);
    }

    #[test]
    fn from_interleaved_drops_partial_trailing_frame() {
        // 5 samples at 2 channels: only 2 whole frames fit.
        let block = AudioBlock::from_interleaved(&[0.1, 0.2, 0.3, 0.4, 0.5], 2);
        assert_eq!(block.frames(), 2);
        assert_eq!(block.samples(), &[0.1, 0.2, 0.3, 0.4]);
    }

    #[test]
    fn from_interleaved_empty_slice() {
        let block = AudioBlock::from_interleaved(&[], 2);
        assert_eq!(block.frames(), 0);
        assert!(block.samples().is_empty());
    }

    // ---- silence -----------------------------------------------------------

    #[test]
    fn silence_is_all_zeros() {
        let block = AudioBlock::silence(BlockShape::new(4, 2));
        assert_eq!(block.samples(), &[0.0; 8]);
        assert_eq!(block.frames(), 4);
    }

    // ---- Clone / equality --------------------------------------------------

    #[test]
    fn clone_is_bit_identical() {
        let block = AudioBlock::from_interleaved(&[0.25, -0.5, 0.75, -1.0], 2);
        let copy = block.clone();
        assert_eq!(copy, block);
        assert_eq!(copy.samples(), block.samples());
    }

    // ---- Thread-safety marker ----------------------------------------------

    /// Blocks cross thread boundaries (device callback → control thread),
    /// so they must be `Send`.
    #[test]
    fn audio_block_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<AudioBlock>();
    }
}
