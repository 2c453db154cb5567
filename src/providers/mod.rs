//! Built-in provider profiles.
//!
//! Providers are a closed set. Each [`ProviderId`] variant owns its
//! env-override and validation-URL rules as match arms; the descriptors in
//! [`registry`] carry the static data (regions, models, display text).

mod registry;

pub use registry::ProviderRegistry;

use crate::settings::keys;

/// Unique identifier for each provider.
///
/// The `as_str()` value is persisted in the app config and accepted on the
/// command line. Once published, do not rename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    Anthropic,
    Kimi,
    Glm,
    MiniMax,
    DeepSeek,
}

impl ProviderId {
    /// Stable key for persistence and CLI arguments.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Anthropic => "anthropic",
            Self::Kimi => "kimi",
            Self::Glm => "glm",
            Self::MiniMax => "minimax",
            Self::DeepSeek => "deepseek",
        }
    }

    /// All variants in registry order.
    pub fn all() -> &'static [ProviderId] {
        &[
            Self::Anthropic,
            Self::Kimi,
            Self::Glm,
            Self::MiniMax,
            Self::DeepSeek,
        ]
    }

    /// Parse from a persisted key. Unknown keys return `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "anthropic" => Some(Self::Anthropic),
            "kimi" => Some(Self::Kimi),
            "glm" => Some(Self::Glm),
            "minimax" => Some(Self::MiniMax),
            "deepseek" => Some(Self::DeepSeek),
            _ => None,
        }
    }

    /// Provider-specific env entries for the selected model.
    ///
    /// Every key returned here must be in [`keys::MANAGED`], otherwise
    /// `unload` could not remove it again.
    pub fn env_overrides(&self, model_id: &str) -> Vec<(&'static str, String)> {
        let model = model_id.to_string();
        match self {
            Self::Anthropic => vec![(keys::MODEL, model)],
            Self::Kimi | Self::MiniMax => vec![
                (keys::MODEL, model.clone()),
                (keys::SMALL_FAST_MODEL, model.clone()),
                (keys::DEFAULT_OPUS_MODEL, model.clone()),
                (keys::DEFAULT_SONNET_MODEL, model.clone()),
                (keys::DEFAULT_HAIKU_MODEL, model.clone()),
                (keys::SUBAGENT_MODEL, model),
            ],
            Self::Glm => vec![
                (keys::MODEL, model.clone()),
                (keys::DEFAULT_OPUS_MODEL, model.clone()),
                (keys::DEFAULT_SONNET_MODEL, model),
                (keys::DEFAULT_HAIKU_MODEL, "glm-4.5-air".to_string()),
            ],
            Self::DeepSeek => vec![
                (keys::MODEL, model),
                (keys::SMALL_FAST_MODEL, "deepseek-chat".to_string()),
            ],
        }
    }

    /// Endpoint used to check an API key, if the provider has one.
    pub fn validate_url(&self, region_id: &str) -> Option<String> {
        let url = match (self, region_id) {
            (Self::Anthropic, _) => "https://api.anthropic.com/v1/models",
            (Self::Kimi, "global") => "https://api.moonshot.ai/v1/models",
            (Self::Kimi, "china") => "https://api.moonshot.cn/v1/models",
            (Self::Glm, "global") => "https://api.z.ai/api/paas/v4/models",
            (Self::Glm, "china") => "https://open.bigmodel.cn/api/paas/v4/models",
            (Self::MiniMax, "global") => "https://api.minimax.io/v1/models",
            (Self::MiniMax, "china") => "https://api.minimaxi.com/v1/models",
            (Self::DeepSeek, _) => "https://api.deepseek.com/models",
            _ => return None,
        };
        Some(url.to_string())
    }

    /// Value for the top-level `model` setting.
    ///
    /// The first-party API understands the short tier aliases, so full
    /// model ids are collapsed to `opus`, `sonnet` or `haiku`. Everyone else
    /// gets the raw id.
    pub fn model_alias(&self, model_id: &str) -> String {
        if *self == Self::Anthropic {
            for alias in ["opus", "sonnet", "haiku"] {
                if model_id.contains(alias) {
                    return alias.to_string();
                }
            }
        }
        model_id.to_string()
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An endpoint variant of a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionDescriptor {
    pub id: &'static str,
    pub name: &'static str,
    /// Written to `ANTHROPIC_BASE_URL`; unique within the provider.
    pub base_url: &'static str,
    /// Where the user can create a key for this region.
    pub api_key_url: &'static str,
}

/// A model a provider serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelDescriptor {
    pub id: &'static str,
    pub name: &'static str,
    pub thinking: bool,
    pub default: bool,
}

/// Self-contained definition of a provider profile.
#[derive(Debug, Clone)]
pub struct ProviderDescriptor {
    pub id: ProviderId,
    pub name: &'static str,
    pub description: &'static str,
    pub regions: &'static [RegionDescriptor],
    pub models: &'static [ModelDescriptor],
}

impl ProviderDescriptor {
    pub fn region(&self, region_id: &str) -> Option<&RegionDescriptor> {
        self.regions.iter().find(|r| r.id == region_id)
    }

    pub fn model(&self, model_id: &str) -> Option<&ModelDescriptor> {
        self.models.iter().find(|m| m.id == model_id)
    }

    /// The model flagged `default`, or the first declared one.
    pub fn default_model(&self) -> Option<&ModelDescriptor> {
        self.models
            .iter()
            .find(|m| m.default)
            .or_else(|| self.models.first())
    }

    pub fn default_region(&self) -> Option<&RegionDescriptor> {
        self.regions.first()
    }

    pub fn env_overrides(&self, model_id: &str) -> Vec<(&'static str, String)> {
        self.id.env_overrides(model_id)
    }

    pub fn validate_url(&self, region_id: &str) -> Option<String> {
        self.region(region_id)?;
        self.id.validate_url(region_id)
    }
}
