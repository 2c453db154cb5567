use serde::{Deserialize, Serialize};

use super::credentials::SecureString;
use crate::providers::ProviderId;

/// The user's last selections, persisted independently of Claude Code's
/// settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub lang: Lang,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl AppConfig {
    /// Overwrite every selection field with `selection`.
    pub fn update(&mut self, selection: &Selection) {
        self.provider = Some(selection.provider.as_str().to_string());
        self.region = Some(selection.region.clone());
        self.model = Some(selection.model.clone());
        self.api_key = Some(selection.api_key.expose().to_string());
    }

    /// The saved key, if it was saved for `provider`.
    pub fn saved_key_for(&self, provider: ProviderId) -> Option<SecureString> {
        if self.provider.as_deref() != Some(provider.as_str()) {
            return None;
        }
        self.api_key
            .as_ref()
            .filter(|k| !k.is_empty())
            .map(|k| SecureString::new(k.clone()))
    }
}

/// Interface language preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    #[default]
    En,
    Zh,
}

impl Lang {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Zh => "zh",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "en" | "english" => Some(Self::En),
            "zh" | "chinese" | "zh-cn" => Some(Self::Zh),
            _ => None,
        }
    }
}

/// A fully resolved provider choice, ready to apply.
#[derive(Debug, Clone)]
pub struct Selection {
    pub provider: ProviderId,
    pub region: String,
    pub model: String,
    pub api_key: SecureString,
}
