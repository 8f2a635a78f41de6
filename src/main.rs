//! Application entry point — micloop.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Open the duplex audio engine (default input + output devices).
//! 4. Build the shared pipeline primitives (monitor queue, mute gate,
//!    recording controller and its frames channel).
//! 5. Start both audio streams; the returned handle keeps them alive for
//!    the rest of `main`.
//! 6. Spawn the stdin key listener thread and print the operator menu.
//! 7. Run the session orchestrator on a current-thread tokio runtime —
//!    blocks until quit or end of input.

use std::sync::Arc;

use micloop::{
    audio::{AudioDuplexEngine, InputStage, MonitorQueue, MuteGate, OutputStage},
    config::AppConfig,
    keys::{Command, KeyListener},
    session::{RecordingController, SessionOrchestrator},
    storage::{Persister, WavPersister},
};
use tokio::sync::mpsc;

// ---------------------------------------------------------------------------
// Operator menu
// ---------------------------------------------------------------------------

/// The interactive menu goes to stdout; all logs go to stderr via
/// `env_logger`, so piping either stream stays clean.
fn print_banner(config: &AppConfig) {
    println!("=== micloop — live monitor & recorder ===");
    println!(
        "{} Hz, {} ch, {}-frame blocks → {}",
        config.audio.sample_rate,
        config.audio.channels,
        config.audio.block_frames,
        config.storage.output_dir.display()
    );
    println!("Commands (key + Enter):");
    println!("  s  start recording");
    println!("  q  stop recording and save");
    println!("  m  mute / unmute the monitor");
    println!("  x  quit");
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> anyhow::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("micloop starting up");

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    // 3. Duplex engine — refuses to run without both devices.
    let engine = AudioDuplexEngine::open(
        config.audio.sample_rate,
        config.audio.channels,
        config.audio.block_frames,
    )?;

    // 4. Shared pipeline primitives
    let monitor = Arc::new(MonitorQueue::new());
    let mute = Arc::new(MuteGate::new());
    let (frames_tx, frames_rx) = std::sync::mpsc::channel();
    let controller = RecordingController::new(frames_rx);

    let input = InputStage::new(
        controller.recording_flag(),
        Arc::clone(&mute),
        Arc::clone(&monitor),
        frames_tx,
        engine.channels(),
    );
    let output = OutputStage::new(Arc::clone(&monitor), engine.channels());

    // 5. Streams up.  Dropping `_duplex` (any way out of main, including a
    //    panic unwind) stops both hardware streams.
    let _duplex = engine.start(input, output)?;
    log::info!(
        "duplex streams running ({} Hz, {} ch, {} frames/block)",
        engine.sample_rate(),
        engine.channels(),
        engine.block_shape().frames()
    );

    // 6. Stdin command listener + menu
    let (command_tx, command_rx) = mpsc::channel::<Command>(16);
    let _listener = KeyListener::start(command_tx);
    print_banner(&config);

    // 7. Session orchestrator — the only async task, so a current-thread
    //    runtime is enough.
    let persister: Arc<dyn Persister> =
        Arc::new(WavPersister::new(config.storage.output_dir.clone()));
    let orchestrator = SessionOrchestrator::new(
        controller,
        mute,
        monitor,
        persister,
        engine.sample_rate(),
        engine.channels(),
    );

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    rt.block_on(orchestrator.run(command_rx));

    log::info!("micloop shut down cleanly");
    Ok(())
}
