//! Local app configuration and credential handling.

mod credentials;
mod loader;
mod types;

pub use credentials::SecureString;
pub use loader::ConfigError;
pub use types::{AppConfig, Lang, Selection};
