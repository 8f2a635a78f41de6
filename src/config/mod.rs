//! Configuration module.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for the duplex
//! stream and persistence, `AppPaths` for cross-platform config locations,
//! and TOML persistence via `AppConfig::load` / `AppConfig::save`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{AppConfig, AudioSettings, StorageSettings};
