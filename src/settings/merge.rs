//! Apply/unload of a provider profile on a settings document.
//!
//! Both operations are pure: the caller reads, backs up and persists.

use serde_json::{Map, Value};

use super::{keys, SettingsDocument, ENV, MODEL};
use crate::error::SwitchError;
use crate::providers::ProviderDescriptor;

/// Compute the document that selects `provider` in `region_id` with `model_id`.
///
/// Managed env keys from `current` are always dropped, never merged. Other
/// env keys and every other top-level key keep their value and position.
pub fn apply(
    provider: &ProviderDescriptor,
    region_id: &str,
    model_id: &str,
    credential: &str,
    current: &SettingsDocument,
) -> Result<SettingsDocument, SwitchError> {
    let region = provider
        .region(region_id)
        .ok_or_else(|| SwitchError::UnknownRegion {
            provider: provider.id.to_string(),
            region: region_id.to_string(),
        })?;

    let mut env = kept_env(current);
    env.insert(keys::AUTH_TOKEN.into(), credential.into());
    env.insert(keys::BASE_URL.into(), region.base_url.into());
    env.insert(keys::TIMEOUT.into(), keys::DEFAULT_TIMEOUT_MS.into());
    env.insert(
        keys::DISABLE_NONESSENTIAL_TRAFFIC.into(),
        keys::DEFAULT_DISABLE_NONESSENTIAL_TRAFFIC.into(),
    );
    for (key, value) in provider.env_overrides(model_id) {
        env.insert(key.to_string(), Value::String(value));
    }

    let model = Value::String(provider.id.model_alias(model_id));
    Ok(rebuild(current, Some(Value::Object(env)), Some(model)))
}

/// Compute the document with every managed key removed.
///
/// `env` is dropped entirely when nothing unmanaged is left in it, and
/// `model` is removed so Claude Code falls back to its own default. A
/// non-object `env` holds no managed keys and is passed through unchanged.
/// Returns `None` when there is nothing to remove.
pub fn unload(current: &SettingsDocument) -> Option<SettingsDocument> {
    let env = match current.get(ENV) {
        Some(Value::Object(_)) => {
            let kept = kept_env(current);
            (!kept.is_empty()).then_some(Value::Object(kept))
        }
        Some(_) if !current.has_model() => return None,
        Some(other) => Some(other.clone()),
        None if !current.has_model() => return None,
        None => None,
    };
    Some(rebuild(current, env, None))
}

/// Unmanaged entries of `current.env`, in their original order.
fn kept_env(current: &SettingsDocument) -> Map<String, Value> {
    current
        .env()
        .map(|env| {
            env.iter()
                .filter(|(key, _)| !keys::is_managed(key))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect()
        })
        .unwrap_or_default()
}

/// Copy `current`, replacing `env` and `model` in place (or appending them
/// when absent). A `None` removes the key.
fn rebuild(current: &SettingsDocument, env: Option<Value>, model: Option<Value>) -> SettingsDocument {
    let mut env = env;
    let mut model = model;
    let mut out = Map::new();

    for (key, value) in current.as_map() {
        match key.as_str() {
            ENV => {
                if let Some(env) = env.take() {
                    out.insert(key.clone(), env);
                }
            }
            MODEL => {
                if let Some(model) = model.take() {
                    out.insert(key.clone(), model);
                }
            }
            _ => {
                out.insert(key.clone(), value.clone());
            }
        }
    }
    if let Some(env) = env {
        out.insert(ENV.to_string(), env);
    }
    if let Some(model) = model {
        out.insert(MODEL.to_string(), model);
    }

    out.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{ProviderId, ProviderRegistry};
    use serde_json::json;

    fn doc(value: Value) -> SettingsDocument {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn unknown_region_is_rejected() {
        let registry = ProviderRegistry::builtin();
        let kimi = registry.get(ProviderId::Kimi).unwrap();
        let err = apply(kimi, "mars", "kimi-k2.5", "sk", &SettingsDocument::new()).unwrap_err();
        assert!(matches!(err, SwitchError::UnknownRegion { .. }));
    }

    #[test]
    fn apply_keeps_top_level_key_positions() {
        let registry = ProviderRegistry::builtin();
        let glm = registry.get(ProviderId::Glm).unwrap();
        let current = doc(json!({
            "permissions": { "allow": ["Bash"] },
            "model": "sonnet",
            "env": { "FOO": "bar" },
            "statusLine": { "type": "command" }
        }));

        let next = apply(glm, "china", "glm-4.7", "key", &current).unwrap();
        let order: Vec<_> = next.as_map().keys().cloned().collect();
        assert_eq!(order, vec!["permissions", "model", "env", "statusLine"]);
        assert_eq!(next.model(), Some("glm-4.7"));
        assert_eq!(next.env_str("FOO"), Some("bar"));
        assert_eq!(
            next.env_str(keys::BASE_URL),
            Some("https://open.bigmodel.cn/api/anthropic")
        );
        assert_eq!(next.env_str(keys::DEFAULT_HAIKU_MODEL), Some("glm-4.5-air"));
    }

    #[test]
    fn apply_replaces_non_object_env() {
        let registry = ProviderRegistry::builtin();
        let kimi = registry.get(ProviderId::Kimi).unwrap();
        let next = apply(kimi, "global", "kimi-k2.5", "sk", &doc(json!({ "env": 42 }))).unwrap();
        assert_eq!(next.env_str(keys::AUTH_TOKEN), Some("sk"));
    }

    #[test]
    fn apply_sets_fixed_defaults() {
        let registry = ProviderRegistry::builtin();
        let deepseek = registry.get(ProviderId::DeepSeek).unwrap();
        let next = apply(deepseek, "global", "deepseek-reasoner", "sk", &SettingsDocument::new()).unwrap();
        assert_eq!(next.env_str(keys::TIMEOUT), Some(keys::DEFAULT_TIMEOUT_MS));
        assert_eq!(next.env_str(keys::DISABLE_NONESSENTIAL_TRAFFIC), Some("1"));
        assert_eq!(next.env_str(keys::SMALL_FAST_MODEL), Some("deepseek-chat"));
    }

    #[test]
    fn unload_drops_env_when_only_managed_keys() {
        let current = doc(json!({
            "env": { "ANTHROPIC_BASE_URL": "https://x", "ANTHROPIC_AUTH_TOKEN": "k" },
            "model": "opus",
            "theme": "dark"
        }));
        let next = unload(&current).unwrap();
        assert_eq!(next, doc(json!({ "theme": "dark" })));
    }

    #[test]
    fn unload_keeps_unmanaged_env() {
        let current = doc(json!({
            "env": { "HTTP_PROXY": "http://proxy", "ANTHROPIC_MODEL": "m" }
        }));
        let next = unload(&current).unwrap();
        assert_eq!(next, doc(json!({ "env": { "HTTP_PROXY": "http://proxy" } })));
    }

    #[test]
    fn unload_without_env_or_model_is_noop() {
        assert!(unload(&doc(json!({ "theme": "dark" }))).is_none());
        assert!(unload(&SettingsDocument::new()).is_none());
    }

    #[test]
    fn unload_leaves_non_object_env_alone() {
        let current = doc(json!({ "env": "user-value", "theme": "dark" }));
        assert!(unload(&current).is_none());

        let with_model = doc(json!({ "env": "user-value", "model": "opus", "theme": "dark" }));
        assert_eq!(
            unload(&with_model).unwrap(),
            doc(json!({ "env": "user-value", "theme": "dark" }))
        );
    }
}
