//! Best-effort reverse mapping from a settings document to a profile.

use super::{keys, SettingsDocument};
use crate::config::SecureString;
use crate::providers::{ProviderId, ProviderRegistry};

/// Path suffixes some users (and older versions) append to the base URL.
const KNOWN_PATH_SUFFIXES: &[&str] = &["/v1"];

/// What a settings document says about the active provider.
///
/// All fields are `None` unless both the base URL and the credential are
/// present. `provider` is `None` for unrecognized endpoints.
#[derive(Debug, Clone, Default)]
pub struct DetectedConfig {
    pub provider: Option<ProviderId>,
    pub region_id: Option<String>,
    pub credential: Option<SecureString>,
    pub base_url: Option<String>,
    pub model: Option<String>,
}

impl DetectedConfig {
    /// True when the document carries a provider configuration at all,
    /// recognized or not.
    pub fn is_configured(&self) -> bool {
        self.base_url.is_some()
    }
}

/// Describe `current` without modifying anything.
pub fn detect(registry: &ProviderRegistry, current: &SettingsDocument) -> DetectedConfig {
    let (Some(base_url), Some(credential)) = (
        current.env_str(keys::BASE_URL),
        current.env_str(keys::AUTH_TOKEN),
    ) else {
        return DetectedConfig::default();
    };

    let normalized = normalize_url(base_url);
    let provider = registry.all().iter().find(|p| {
        p.regions
            .iter()
            .any(|r| is_url_prefix(normalized, r.base_url))
    });

    let region_id = provider.and_then(|p| {
        p.regions
            .iter()
            .find(|r| r.base_url == base_url)
            .map(|r| r.id.to_string())
    });

    if provider.is_none() {
        tracing::debug!(base_url, "settings point at an unrecognized endpoint");
    }

    let model = current
        .env_str(keys::MODEL)
        .or_else(|| current.model())
        .map(str::to_string);

    DetectedConfig {
        provider: provider.map(|p| p.id),
        region_id,
        credential: Some(SecureString::new(credential.to_string())),
        base_url: Some(base_url.to_string()),
        model,
    }
}

/// `prefix` matches `url` only up to a path boundary, so
/// `https://api.anthropic.com.evil.example` is not `https://api.anthropic.com`.
fn is_url_prefix(url: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    url.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Strip trailing slashes and one known path suffix.
fn normalize_url(url: &str) -> &str {
    let trimmed = url.trim_end_matches('/');
    KNOWN_PATH_SUFFIXES
        .iter()
        .find_map(|suffix| trimmed.strip_suffix(suffix))
        .map(|s| s.trim_end_matches('/'))
        .unwrap_or(trimmed)
}
