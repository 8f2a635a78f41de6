//! Lock-free primitives shared between the two realtime audio callbacks.
//!
//! Exactly two objects cross the input-callback / output-callback boundary:
//!
//! ```text
//!   input callback ──push/drain──▶ MonitorQueue ──pop_or_silence──▶ output callback
//!   control loop  ──toggle──────▶ MuteGate ─────is_muted──────────▶ input callback
//! ```
//!
//! Both sides run on device threads with hard deadlines, so neither
//! primitive ever blocks or allocates behind a lock: [`MonitorQueue`] is a
//! single-slot atomic exchange ("latest wins") and [`MuteGate`] is one
//! atomic flag.  With a slot depth of one, monitor latency stays below a
//! single block period (~23 ms at 1024 frames / 44.1 kHz) and a stalled
//! consumer costs dropped monitor blocks, never a stalled producer.
//!
//! # Example
//!
//! ```rust
//! use micloop::audio::{AudioBlock, BlockShape, MonitorQueue};
//!
//! let queue = MonitorQueue::new();
//! queue.push(AudioBlock::from_interleaved(&[0.5, 0.5], 2));
//!
//! let shape = BlockShape::new(1, 2);
//! assert_eq!(queue.pop_or_silence(shape).samples(), &[0.5, 0.5]);
//! // Empty queue: the output side gets silence, never an error.
//! assert_eq!(queue.pop_or_silence(shape).samples(), &[0.0, 0.0]);
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwapOption;

use crate::audio::block::{AudioBlock, BlockShape};

// ---------------------------------------------------------------------------
// MonitorQueue
// ---------------------------------------------------------------------------

/// Single-slot handoff from the capture callback to the playback callback.
///
/// A `push` replaces whatever the slot held, so when the consumer falls
/// behind the oldest pending block is the one discarded.  `pop_or_silence`
/// takes the slot contents or synthesises silence, which is what keeps the
/// output stream glitch-tolerant during underruns and while muted.
pub struct MonitorQueue {
    /// Lock-free slot; both callbacks touch it without ever blocking.
    slot: ArcSwapOption<AudioBlock>,
}

impl MonitorQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            slot: ArcSwapOption::empty(),
        }
    }

    /// Publish `block` for the output side, replacing any pending block.
    pub fn push(&self, block: AudioBlock) {
        self.slot.store(Some(Arc::new(block)));
    }

    /// Take the pending block, or a silent block of `shape` when none is
    /// pending.
    pub fn pop_or_silence(&self, shape: BlockShape) -> AudioBlock {
        match self.slot.swap(None) {
            Some(block) => Arc::try_unwrap(block).unwrap_or_else(|shared| (*shared).clone()),
            None => AudioBlock::silence(shape),
        }
    }

    /// Discard any pending block, returning how many were dropped (0 or 1).
    ///
    /// Called from the input callback while muted so that no stale audio is
    /// left behind for the moment the monitor comes back.
    pub fn drain(&self) -> usize {
        usize::from(self.slot.swap(None).is_some())
    }

    /// Number of pending blocks (0 or 1).
    pub fn len(&self) -> usize {
        usize::from(self.slot.load().is_some())
    }

    /// Returns `true` when no block is pending.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MonitorQueue {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// MuteGate
// ---------------------------------------------------------------------------

/// Atomic mute flag for the monitor path.
///
/// Muting gates only what reaches [`MonitorQueue`]; capture and recording
/// are untouched.  The control loop toggles, the input callback reads.
pub struct MuteGate {
    muted: AtomicBool,
}

impl MuteGate {
    /// Create an unmuted gate.
    pub fn new() -> Self {
        Self {
            muted: AtomicBool::new(false),
        }
    }

    /// Flip the mute state, returning the *new* state (`true` = muted).
    pub fn toggle(&self) -> bool {
        !self.muted.fetch_xor(true, Ordering::Relaxed)
    }

    /// Current mute state.
    pub fn is_muted(&self) -> bool {
        self.muted.load(Ordering::Relaxed)
    }
}

impl Default for MuteGate {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn block(value: f32) -> AudioBlock {
        AudioBlock::from_interleaved(&[value, value, value, value], 2)
    }

    // ---- Push / pop --------------------------------------------------------

    #[test]
    fn pop_returns_pushed_block() {
        let queue = MonitorQueue::new();
        queue.push(block(0.5));

        let popped = queue.pop_or_silence(BlockShape::new(2, 2));
        assert_eq!(popped.samples(), &[0.5, 0.5, 0.5, 0.5]);
        assert!(queue.is_empty());
    }

    #[test]
    fn pop_empty_returns_silence_of_requested_shape() {
        let queue = MonitorQueue::new();
        let shape = BlockShape::new(3, 2);

        let popped = queue.pop_or_silence(shape);
        assert_eq!(popped.shape(), shape);
        assert_eq!(popped.samples(), &[0.0; 6]);
    }

    #[test]
    fn pop_consumes_the_slot() {
        let queue = MonitorQueue::new();
        queue.push(block(0.5));

        let _ = queue.pop_or_silence(BlockShape::new(2, 2));
        // Second pop sees an empty slot.
        let second = queue.pop_or_silence(BlockShape::new(2, 2));
        assert_eq!(second.samples(), &[0.0; 4]);
    }

    // ---- Latest wins -------------------------------------------------------

    #[test]
    fn push_replaces_pending_block() {
        let queue = MonitorQueue::new();
        queue.push(block(0.1));
        queue.push(block(0.2));
        queue.push(block(0.3));

        assert_eq!(queue.len(), 1);
        let popped = queue.pop_or_silence(BlockShape::new(2, 2));
        assert_eq!(popped.samples(), &[0.3, 0.3, 0.3, 0.3]);
    }

    // ---- Drain -------------------------------------------------------------

    #[test]
    fn drain_discards_pending_block() {
        let queue = MonitorQueue::new();
        queue.push(block(0.5));

        assert_eq!(queue.drain(), 1);
        assert!(queue.is_empty());
        // Idempotent once empty.
        assert_eq!(queue.drain(), 0);
    }

    // ---- Length ------------------------------------------------------------

    #[test]
    fn len_is_zero_or_one() {
        let queue = MonitorQueue::new();
        assert_eq!(queue.len(), 0);
        assert!(queue.is_empty());

        queue.push(block(0.5));
        queue.push(block(0.6));
        assert_eq!(queue.len(), 1);
        assert!(!queue.is_empty());
    }

    // ---- MuteGate ----------------------------------------------------------

    #[test]
    fn gate_starts_unmuted() {
        let gate = MuteGate::new();
        assert!(!gate.is_muted());
    }

    #[test]
    fn toggle_returns_new_state() {
        let gate = MuteGate::new();
        assert!(gate.toggle());
        assert!(gate.is_muted());

        assert!(!gate.toggle());
        assert!(!gate.is_muted());
    }

    // ---- Thread-safety markers ---------------------------------------------

    /// Both primitives are shared between device threads and the control
    /// loop behind `Arc`, so they must be `Send + Sync`.
    #[test]
    fn shared_primitives_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MonitorQueue>();
        assert_send_sync::<MuteGate>();
    }
}
