use super::{ModelDescriptor, ProviderDescriptor, ProviderId, RegionDescriptor};

/// Lookup table over the built-in provider descriptors.
///
/// Constructed explicitly and passed by reference; tests can build one
/// from their own descriptors with [`ProviderRegistry::from_descriptors`].
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    providers: Vec<ProviderDescriptor>,
}

impl ProviderRegistry {
    /// Registry with every built-in provider, in display order.
    pub fn builtin() -> Self {
        Self {
            providers: builtin_registry(),
        }
    }

    pub fn from_descriptors(providers: Vec<ProviderDescriptor>) -> Self {
        Self { providers }
    }

    /// Look up a provider. Returns `None` for unknown ids so callers can
    /// tell "not configured yet" apart from "misconfigured".
    pub fn get(&self, id: ProviderId) -> Option<&ProviderDescriptor> {
        self.providers.iter().find(|p| p.id == id)
    }

    /// Look up by persisted/CLI key.
    pub fn find(&self, key: &str) -> Option<&ProviderDescriptor> {
        ProviderId::parse(key).and_then(|id| self.get(id))
    }

    pub fn all(&self) -> &[ProviderDescriptor] {
        &self.providers
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

const fn region(
    id: &'static str,
    name: &'static str,
    base_url: &'static str,
    api_key_url: &'static str,
) -> RegionDescriptor {
    RegionDescriptor {
        id,
        name,
        base_url,
        api_key_url,
    }
}

const fn model(id: &'static str, name: &'static str, thinking: bool, default: bool) -> ModelDescriptor {
    ModelDescriptor {
        id,
        name,
        thinking,
        default,
    }
}

static ANTHROPIC_REGIONS: [RegionDescriptor; 1] = [region(
    "global",
    "Global",
    "https://api.anthropic.com",
    "https://console.anthropic.com/settings/keys",
)];

static ANTHROPIC_MODELS: [ModelDescriptor; 3] = [
    model("claude-opus-4-1-20250805", "Claude Opus 4.1", true, false),
    model("claude-sonnet-4-5-20250929", "Claude Sonnet 4.5", true, true),
    model("claude-haiku-4-5-20251001", "Claude Haiku 4.5", false, false),
];

static KIMI_REGIONS: [RegionDescriptor; 2] = [
    region(
        "global",
        "Global",
        "https://api.moonshot.ai/anthropic",
        "https://platform.moonshot.ai/console/api-keys",
    ),
    region(
        "china",
        "China",
        "https://api.moonshot.cn/anthropic",
        "https://platform.moonshot.cn/console/api-keys",
    ),
];

static KIMI_MODELS: [ModelDescriptor; 3] = [
    model("kimi-k2.5", "Kimi K2.5", false, true),
    model("kimi-k2-thinking", "Kimi K2 Thinking", true, false),
    model("kimi-k2-turbo-preview", "Kimi K2 Turbo", false, false),
];

static GLM_REGIONS: [RegionDescriptor; 2] = [
    region(
        "global",
        "Global (Z.ai)",
        "https://api.z.ai/api/anthropic",
        "https://z.ai/manage-apikey/apikey-list",
    ),
    region(
        "china",
        "China (BigModel)",
        "https://open.bigmodel.cn/api/anthropic",
        "https://open.bigmodel.cn/usercenter/apikeys",
    ),
];

static GLM_MODELS: [ModelDescriptor; 2] = [
    model("glm-4.7", "GLM-4.7", true, true),
    model("glm-4.5-air", "GLM-4.5 Air", false, false),
];

static MINIMAX_REGIONS: [RegionDescriptor; 2] = [
    region(
        "global",
        "Global",
        "https://api.minimax.io/anthropic",
        "https://platform.minimax.io/user-center/basic-information/interface-key",
    ),
    region(
        "china",
        "China",
        "https://api.minimaxi.com/anthropic",
        "https://platform.minimaxi.com/user-center/basic-information/interface-key",
    ),
];

static MINIMAX_MODELS: [ModelDescriptor; 1] = [model("MiniMax-M2.1", "MiniMax M2.1", true, true)];

static DEEPSEEK_REGIONS: [RegionDescriptor; 1] = [region(
    "global",
    "Global",
    "https://api.deepseek.com/anthropic",
    "https://platform.deepseek.com/api_keys",
)];

static DEEPSEEK_MODELS: [ModelDescriptor; 2] = [
    model("deepseek-chat", "DeepSeek V3.2", false, true),
    model("deepseek-reasoner", "DeepSeek V3.2 Reasoner", true, false),
];

fn builtin_registry() -> Vec<ProviderDescriptor> {
    vec![
        ProviderDescriptor {
            id: ProviderId::Anthropic,
            name: "Anthropic",
            description: "Official Anthropic API",
            regions: &ANTHROPIC_REGIONS,
            models: &ANTHROPIC_MODELS,
        },
        ProviderDescriptor {
            id: ProviderId::Kimi,
            name: "Kimi",
            description: "Moonshot AI Kimi via its Anthropic-compatible endpoint",
            regions: &KIMI_REGIONS,
            models: &KIMI_MODELS,
        },
        ProviderDescriptor {
            id: ProviderId::Glm,
            name: "GLM",
            description: "Zhipu GLM coding plan",
            regions: &GLM_REGIONS,
            models: &GLM_MODELS,
        },
        ProviderDescriptor {
            id: ProviderId::MiniMax,
            name: "MiniMax",
            description: "MiniMax M2 series",
            regions: &MINIMAX_REGIONS,
            models: &MINIMAX_MODELS,
        },
        ProviderDescriptor {
            id: ProviderId::DeepSeek,
            name: "DeepSeek",
            description: "DeepSeek via its Anthropic-compatible endpoint",
            regions: &DEEPSEEK_REGIONS,
            models: &DEEPSEEK_MODELS,
        },
    ]
}
