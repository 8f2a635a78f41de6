//! Per-callback processing stages for the duplex loop.
//!
//! The device threads own one stage each and call `process` once per
//! hardware buffer:
//!
//! ```text
//!                         ┌───────────────┐
//!   capture device ──────▶│  InputStage   │──── frames_tx ───▶ control loop
//!                         │               │──── push/drain ─▶ MonitorQueue
//!                         └───────────────┘
//!                         ┌───────────────┐
//!   MonitorQueue ────────▶│  OutputStage  │──────────────────▶ playback device
//!                         └───────────────┘
//! ```
//!
//! [`InputStage`] fans each captured block out to two independent paths: the
//! recording channel (only while the recording flag is set) and the monitor
//! slot (only while unmuted).  Muting one path never disturbs the other.
//! The recording channel is an unbounded FIFO, so blocks reach the control
//! loop in capture order even when it lags behind the device.
//!
//! Neither `process` blocks: channel sends are non-blocking on an unbounded
//! sender, the monitor slot is a lock-free exchange, and send errors are
//! swallowed so a vanished consumer can never stall a device thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;

use crate::audio::block::{AudioBlock, BlockShape};
use crate::audio::monitor::{MonitorQueue, MuteGate};

// ---------------------------------------------------------------------------
// InputStage
// ---------------------------------------------------------------------------

/// Capture-side stage: runs inside the input stream callback.
pub struct InputStage {
    recording: Arc<AtomicBool>,
    mute: Arc<MuteGate>,
    monitor: Arc<MonitorQueue>,
    frames_tx: mpsc::Sender<AudioBlock>,
    channels: u16,
}

impl InputStage {
    pub fn new(
        recording: Arc<AtomicBool>,
        mute: Arc<MuteGate>,
        monitor: Arc<MonitorQueue>,
        frames_tx: mpsc::Sender<AudioBlock>,
        channels: u16,
    ) -> Self {
        Self {
            recording,
            mute,
            monitor,
            frames_tx,
            channels,
        }
    }

    /// Handle one captured buffer of interleaved samples.
    pub fn process(&self, data: &[f32]) {
        let block = AudioBlock::from_interleaved(data, self.channels);

        if self.recording.load(Ordering::Relaxed) {
            // A send error means the control side is gone; the stream stays
            // up for the monitor path, so the error is not actionable here.
            let _ = self.frames_tx.send(block.clone());
        }

        if self.mute.is_muted() {
            // Clear any block published just before the mute landed so the
            // monitor falls silent within one callback.
            self.monitor.drain();
        } else {
            self.monitor.push(block);
        }
    }
}

// ---------------------------------------------------------------------------
// OutputStage
// ---------------------------------------------------------------------------

/// Playback-side stage: runs inside the output stream callback.
pub struct OutputStage {
    monitor: Arc<MonitorQueue>,
    channels: u16,
}

impl OutputStage {
    pub fn new(monitor: Arc<MonitorQueue>, channels: u16) -> Self {
        Self { monitor, channels }
    }

    /// Fill one playback buffer from the monitor slot.
    ///
    /// The shape request matches the buffer the driver handed over, so the
    /// silence fallback always fits exactly.  A pending block of a different
    /// size (a driver that ignored the requested buffer size) is copied as
    /// far as it goes and the remainder zero-filled, trading a shorter
    /// monitor block for continuity.
    pub fn process(&self, data: &mut [f32]) {
        let frames = data.len() / self.channels as usize;
        let block = self
            .monitor
            .pop_or_silence(BlockShape::new(frames, self.channels));

        let n = block.samples().len().min(data.len());
        data[..n].copy_from_slice(&block.samples()[..n]);
        for sample in &mut data[n..] {
            *sample = 0.0;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// Fresh input stage plus handles to every side channel it talks to.
    fn make_input_stage() -> (
        InputStage,
        Arc<AtomicBool>,
        Arc<MuteGate>,
        Arc<MonitorQueue>,
        mpsc::Receiver<AudioBlock>,
    ) {
        let recording = Arc::new(AtomicBool::new(false));
        let mute = Arc::new(MuteGate::new());
        let monitor = Arc::new(MonitorQueue::new());
        let (tx, rx) = mpsc::channel();

        let stage = InputStage::new(
            Arc::clone(&recording),
            Arc::clone(&mute),
            Arc::clone(&monitor),
            tx,
            2,
        );
        (stage, recording, mute, monitor, rx)
    }

    // ---- Monitor path ------------------------------------------------------

    #[test]
    fn unmuted_input_reaches_monitor() {
        let (stage, _recording, _mute, monitor, _rx) = make_input_stage();

        stage.process(&[0.1, 0.2, 0.3, 0.4]);

        let relayed = monitor.pop_or_silence(BlockShape::new(2, 2));
        assert_eq!(relayed.samples(), &[0.1, 0.2, 0.3, 0.4]);
    }

    #[test]
    fn muted_input_leaves_monitor_empty() {
        let (stage, _recording, mute, monitor, _rx) = make_input_stage();
        mute.toggle();

        stage.process(&[0.1, 0.2, 0.3, 0.4]);

        assert_eq!(monitor.len(), 0);
    }

    #[test]
    fn muted_input_clears_stale_monitor_block() {
        let (stage, _recording, mute, monitor, _rx) = make_input_stage();

        // A block lands just before the mute.
        stage.process(&[0.1, 0.2, 0.3, 0.4]);
        assert_eq!(monitor.len(), 1);

        mute.toggle();
        stage.process(&[0.5, 0.6, 0.7, 0.8]);

        // Both the stale and the new block are gone.
        assert_eq!(monitor.len(), 0);
    }

    // ---- Recording path ----------------------------------------------------

    #[test]
    fn idle_input_sends_no_blocks() {
        let (stage, _recording, _mute, _monitor, rx) = make_input_stage();

        stage.process(&[0.1, 0.2, 0.3, 0.4]);

        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn recording_input_forwards_blocks_in_capture_order() {
        let (stage, recording, _mute, _monitor, rx) = make_input_stage();
        recording.store(true, Ordering::Relaxed);

        stage.process(&[0.1, 0.1]);
        stage.process(&[0.2, 0.2]);
        stage.process(&[0.3, 0.3]);

        let received: Vec<AudioBlock> = rx.try_iter().collect();
        assert_eq!(received.len(), 3);
        assert_eq!(received[0].samples(), &[0.1, 0.1]);
        assert_eq!(received[1].samples(), &[0.2, 0.2]);
        assert_eq!(received[2].samples(), &[0.3, 0.3]);
    }

    #[test]
    fn recording_continues_while_muted() {
        let (stage, recording, mute, monitor, rx) = make_input_stage();
        recording.store(true, Ordering::Relaxed);

        stage.process(&[0.1, 0.1]);
        mute.toggle();
        stage.process(&[0.2, 0.2]);
        mute.toggle();
        stage.process(&[0.3, 0.3]);

        // All three blocks recorded, mute state notwithstanding.
        assert_eq!(rx.try_iter().count(), 3);
        // Only the last (unmuted) block is pending for the monitor.
        let relayed = monitor.pop_or_silence(BlockShape::new(1, 2));
        assert_eq!(relayed.samples(), &[0.3, 0.3]);
    }

    #[test]
    fn muted_idle_input_is_discarded_entirely() {
        let (stage, _recording, mute, monitor, rx) = make_input_stage();
        mute.toggle();

        stage.process(&[0.1, 0.2, 0.3, 0.4]);
        stage.process(&[0.5, 0.6, 0.7, 0.8]);

        assert!(rx.try_recv().is_err());
        assert_eq!(monitor.len(), 0);
    }

    // ---- Output side -------------------------------------------------------

    #[test]
    fn output_copies_pending_block() {
        let monitor = Arc::new(MonitorQueue::new());
        let stage = OutputStage::new(Arc::clone(&monitor), 2);
        monitor.push(AudioBlock::from_interleaved(&[0.1, 0.2, 0.3, 0.4], 2));

        let mut out = [9.0_f32; 4];
        stage.process(&mut out);

        assert_eq!(out, [0.1, 0.2, 0.3, 0.4]);
    }

    #[test]
    fn output_fills_silence_when_queue_empty() {
        let monitor = Arc::new(MonitorQueue::new());
        let stage = OutputStage::new(monitor, 2);

        let mut out = [9.0_f32; 4];
        stage.process(&mut out);

        assert_eq!(out, [0.0; 4]);
    }

    #[test]
    fn output_zero_fills_past_short_block() {
        let monitor = Arc::new(MonitorQueue::new());
        let stage = OutputStage::new(Arc::clone(&monitor), 2);
        monitor.push(AudioBlock::from_interleaved(&[0.5, 0.5], 2));

        let mut out = [9.0_f32; 6];
        stage.process(&mut out);

        assert_eq!(out, [0.5, 0.5, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn output_truncates_oversized_block() {
        let monitor = Arc::new(MonitorQueue::new());
        let stage = OutputStage::new(Arc::clone(&monitor), 2);
        monitor.push(AudioBlock::from_interleaved(&[0.1, 0.2, 0.3, 0.4, 0.5, 0.6], 2));

        let mut out = [9.0_f32; 4];
        stage.process(&mut out);

        assert_eq!(out, [0.1, 0.2, 0.3, 0.4]);
    }

    // ---- Thread-safety markers ---------------------------------------------

    /// Stages move into `'static` device callbacks on their own threads.
    #[test]
    fn stages_are_send() {
        fn assert_send<T: Send>() {}
        assert_send::<InputStage>();
        assert_send::<OutputStage>();
    }
}
