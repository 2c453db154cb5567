//! Claude Code settings documents.
//!
//! - [`store`] reads and writes `settings.json` and the onboarding flag.
//! - [`merge`] computes new documents on apply/unload.
//! - [`detect`] maps a document back to a provider profile.

pub mod detect;
pub mod merge;
pub mod store;

pub use detect::{detect, DetectedConfig};
pub use merge::{apply, unload};
pub use store::{SettingsStore, SwitchPaths};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Env keys written into `settings.json`.
pub mod keys {
    pub const AUTH_TOKEN: &str = "ANTHROPIC_AUTH_TOKEN";
    pub const API_KEY: &str = "ANTHROPIC_API_KEY";
    pub const BASE_URL: &str = "ANTHROPIC_BASE_URL";
    pub const TIMEOUT: &str = "API_TIMEOUT_MS";
    pub const DISABLE_NONESSENTIAL_TRAFFIC: &str = "CLAUDE_CODE_DISABLE_NONESSENTIAL_TRAFFIC";
    pub const MODEL: &str = "ANTHROPIC_MODEL";
    pub const SMALL_FAST_MODEL: &str = "ANTHROPIC_SMALL_FAST_MODEL";
    pub const DEFAULT_OPUS_MODEL: &str = "ANTHROPIC_DEFAULT_OPUS_MODEL";
    pub const DEFAULT_SONNET_MODEL: &str = "ANTHROPIC_DEFAULT_SONNET_MODEL";
    pub const DEFAULT_HAIKU_MODEL: &str = "ANTHROPIC_DEFAULT_HAIKU_MODEL";
    pub const SUBAGENT_MODEL: &str = "CLAUDE_CODE_SUBAGENT_MODEL";

    /// Keys owned by this tool. Apply and unload replace or drop these
    /// wholesale; anything else in `env` is passed through.
    pub const MANAGED: &[&str] = &[
        AUTH_TOKEN,
        API_KEY,
        BASE_URL,
        TIMEOUT,
        DISABLE_NONESSENTIAL_TRAFFIC,
        MODEL,
        SMALL_FAST_MODEL,
        DEFAULT_OPUS_MODEL,
        DEFAULT_SONNET_MODEL,
        DEFAULT_HAIKU_MODEL,
        SUBAGENT_MODEL,
    ];

    pub const DEFAULT_TIMEOUT_MS: &str = "3000000";
    pub const DEFAULT_DISABLE_NONESSENTIAL_TRAFFIC: &str = "1";

    pub fn is_managed(key: &str) -> bool {
        MANAGED.contains(&key)
    }
}

/// Top-level key holding the env map.
pub const ENV: &str = "env";
/// Top-level key holding the default model.
pub const MODEL: &str = "model";

/// An open-ended settings document. Key order is preserved so untouched
/// keys round-trip in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SettingsDocument(Map<String, Value>);

impl SettingsDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse JSON bytes. Anything other than a JSON object is rejected.
    pub fn parse(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Pretty-printed JSON with a trailing newline.
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        let mut out = serde_json::to_string_pretty(&self.0)?;
        out.push('\n');
        Ok(out)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The `env` object. `None` when absent or not an object.
    pub fn env(&self) -> Option<&Map<String, Value>> {
        self.0.get(ENV).and_then(Value::as_object)
    }

    /// A string-valued env entry.
    pub fn env_str(&self, key: &str) -> Option<&str> {
        self.env()?.get(key).and_then(Value::as_str)
    }

    /// The top-level `model` string.
    pub fn model(&self) -> Option<&str> {
        self.0.get(MODEL).and_then(Value::as_str)
    }

    pub fn has_env(&self) -> bool {
        self.0.contains_key(ENV)
    }

    pub fn has_model(&self) -> bool {
        self.0.contains_key(MODEL)
    }
}

impl From<Map<String, Value>> for SettingsDocument {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
