//! Dedicated OS-thread stdin reader.
//!
//! `Stdin::read_line` is a blocking call that must live on its own OS
//! thread.  [`KeyListener`] owns that thread and a stop flag; dropping it
//! sets the flag so further input is silently discarded.
//!
//! # Shutdown caveat
//!
//! A blocked `read_line` cannot be interrupted.  Setting the stop flag
//! prevents commands from being forwarded, but the thread itself stays
//! parked on stdin until the next line (or EOF) arrives or the process
//! exits.  This is safe — the thread holds nothing that needs cleanup.  The
//! quit paths avoid the wait entirely: the thread exits by itself after
//! forwarding [`Command::Quit`] or hitting end-of-file.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use tokio::sync::mpsc;

use super::{parse_command, Command};

// ---------------------------------------------------------------------------
// KeyListener
// ---------------------------------------------------------------------------

/// Handle to a running stdin reader thread.
///
/// Construct one with [`KeyListener::start`].  Drop it to stop forwarding
/// commands.
pub struct KeyListener {
    /// Shared stop flag — set `true` on [`Drop`].
    stop: Arc<AtomicBool>,
    /// The thread handle.  Kept so the thread is not detached prematurely;
    /// never joined, because it may be blocked on stdin indefinitely.
    _thread: std::thread::JoinHandle<()>,
}

impl KeyListener {
    /// Spawn a dedicated OS thread that reads stdin line by line and
    /// forwards parsed [`Command`]s on `tx`.
    ///
    /// Unrecognised lines are dropped (with a debug log).  EOF is forwarded
    /// as [`Command::Quit`], after which the thread exits; it also exits
    /// when the receiving side of `tx` is gone.
    ///
    /// # Panics
    ///
    /// Panics if the OS refuses to create the thread (extremely unlikely).
    pub fn start(tx: mpsc::Sender<Command>) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_clone = Arc::clone(&stop);

        let thread = std::thread::Builder::new()
            .name("key-listener".into())
            .spawn(move || {
                let stdin = std::io::stdin();
                let mut line = String::new();

                loop {
                    line.clear();
                    match stdin.read_line(&mut line) {
                        // EOF — stdin was closed or piped input ran out.
                        Ok(0) => {
                            let _ = tx.blocking_send(Command::Quit);
                            break;
                        }
                        Ok(_) => {
                            // Bail out if the listener has been stopped.
                            if stop_clone.load(Ordering::Relaxed) {
                                break;
                            }

                            let Some(command) = parse_command(&line) else {
                                let input = line.trim();
                                if !input.is_empty() {
                                    log::debug!("key-listener: ignoring input {input:?}");
                                }
                                continue;
                            };

                            // blocking_send is safe to call from non-async threads.
                            if tx.blocking_send(command).is_err() {
                                break; // control loop is gone
                            }
                            if command == Command::Quit {
                                break;
                            }
                        }
                        Err(e) => {
                            log::error!("key-listener: failed to read stdin: {e}");
                            break;
                        }
                    }
                }
            })
            .expect("failed to spawn key-listener thread");

        Self {
            stop,
            _thread: thread,
        }
    }
}

impl Drop for KeyListener {
    /// Set the stop flag so the reader stops forwarding commands.
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        // The thread may stay blocked on stdin until the process exits —
        // see the module-level shutdown caveat.
    }
}
