//! Switch Claude Code between API providers.
//!
//! The library computes and persists the provider-specific part of
//! Claude Code's `settings.json` while leaving every unmanaged key alone.
//! Every mutation is preceded by a timestamped backup.

pub mod backup;
pub mod cli;
pub mod config;
pub mod error;
pub mod lock;
pub mod logging;
pub mod providers;
pub mod settings;
pub mod switcher;
pub mod validate;

pub use error::SwitchError;
