//! Command-line surface over the library.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use crossterm::style::Stylize;

use crate::config::{AppConfig, Lang, SecureString, Selection};
use crate::error::SwitchError;
use crate::providers::{ProviderDescriptor, ProviderRegistry};
use crate::settings::{DetectedConfig, SwitchPaths};
use crate::switcher::Switcher;
use crate::validate::{self, Validation};

/// Env var consulted for the API key when `--key` is not given.
pub const API_KEY_ENV: &str = "CLAUDE_SWITCH_API_KEY";

const DEFAULT_KEEP_BACKUPS: usize = 10;

#[derive(Debug, Parser)]
#[command(name = "claude-switch", version, about = "Switch Claude Code between API providers")]
pub struct Cli {
    /// Keep every file under this directory instead of the user's home.
    #[arg(long, global = true, hide = true)]
    pub root: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the provider currently configured in settings.json.
    Status,
    /// List built-in providers, regions and models.
    Providers,
    /// Apply a provider profile.
    Use(UseArgs),
    /// Remove every managed key from settings.json.
    Unload,
    /// Set the interface language (en, zh).
    Lang { code: String },
    /// Check the current configuration and its API key.
    Check,
    /// Back up settings.json now.
    Backup,
    /// List backups, newest first.
    Backups,
    /// Restore a backup by file name or path.
    Restore { backup: String },
    /// Delete old backups.
    Prune {
        #[arg(long, default_value_t = DEFAULT_KEEP_BACKUPS)]
        keep: usize,
    },
}

#[derive(Debug, Clone, Default, clap::Args)]
pub struct UseArgs {
    /// Provider id (see `providers`).
    pub provider: String,
    /// Region id; defaults to the saved or first region.
    #[arg(long)]
    pub region: Option<String>,
    /// Model id; defaults to the saved or default model.
    #[arg(long)]
    pub model: Option<String>,
    /// API key; falls back to $CLAUDE_SWITCH_API_KEY, then the saved key.
    #[arg(long, env = API_KEY_ENV, hide_env_values = true)]
    pub key: Option<String>,
    /// Do not contact the provider to check the key.
    #[arg(long)]
    pub skip_validation: bool,
}

impl Cli {
    pub fn paths(&self) -> Result<SwitchPaths> {
        match &self.root {
            Some(root) => Ok(SwitchPaths::rooted_at(root)),
            None => SwitchPaths::from_env().context("failed to resolve config locations"),
        }
    }
}

/// Fill in region, model and key from the saved config and defaults.
pub fn resolve_selection(
    registry: &ProviderRegistry,
    saved: &AppConfig,
    args: &UseArgs,
) -> Result<Selection, SwitchError> {
    let provider = registry
        .find(&args.provider)
        .ok_or_else(|| SwitchError::UnknownProvider {
            provider: args.provider.clone(),
        })?;
    let same_provider = saved.provider.as_deref() == Some(provider.id.as_str());

    let region = args
        .region
        .clone()
        .or_else(|| {
            saved
                .region
                .clone()
                .filter(|r| same_provider && provider.region(r).is_some())
        })
        .or_else(|| provider.default_region().map(|r| r.id.to_string()))
        .unwrap_or_default();
    if provider.region(&region).is_none() {
        return Err(SwitchError::UnknownRegion {
            provider: provider.id.to_string(),
            region,
        });
    }

    let model = args
        .model
        .clone()
        .or_else(|| saved.model.clone().filter(|_| same_provider))
        .or_else(|| provider.default_model().map(|m| m.id.to_string()))
        .unwrap_or_default();

    let api_key = args
        .key
        .clone()
        .filter(|k| !k.is_empty())
        .map(SecureString::new)
        .or_else(|| saved.saved_key_for(provider.id))
        .unwrap_or_else(|| SecureString::new(String::new()));

    Ok(Selection {
        provider: provider.id,
        region,
        model,
        api_key,
    })
}

/// Execute a parsed command.
pub async fn run(cli: Cli) -> Result<()> {
    let paths = cli.paths()?;
    let registry = ProviderRegistry::builtin();
    let switcher = Switcher::new(&registry, paths.clone());

    match cli.command {
        Command::Status => {
            let app_config = load_app_config(&paths);
            if let Err(e) = app_config.validate(&registry) {
                println!("{} {}", "!".yellow(), e);
            }
            print_detected(&registry, &switcher.status());
            println!("  language:   {}", app_config.lang.as_str());
            println!("  settings:   {}", paths.settings_file.display());
        }
        Command::Providers => {
            for provider in registry.all() {
                print_provider(provider);
            }
        }
        Command::Use(args) => {
            let mut app_config = load_app_config(&paths);
            let selection = resolve_selection(&registry, &app_config, &args)?;
            if selection.api_key.expose().is_empty() {
                bail!("no API key given; pass --key or set {}", API_KEY_ENV);
            }
            if !args.skip_validation {
                check_key(&registry, &selection).await?;
            }

            let report = switcher.apply(&selection)?;
            app_config.update(&selection);
            app_config
                .save_to(&paths.app_config_file)
                .context("settings applied, but saving the selection failed")?;

            println!(
                "{} {} / {} / {}",
                "Applied".green().bold(),
                report.provider,
                report.region,
                report.model
            );
            println!("  backup: {}", report.backup.display());
            if !report.onboarding_marked {
                println!(
                    "{} could not set the onboarding flag in {}",
                    "!".yellow(),
                    paths.onboarding_file.display()
                );
            }
        }
        Command::Unload => match switcher.unload()? {
            Some(backup) => {
                println!("{} provider configuration", "Removed".green().bold());
                println!("  backup: {}", backup.display());
            }
            None => println!("Nothing to remove."),
        },
        Command::Lang { code } => {
            let Some(lang) = Lang::parse(&code) else {
                bail!("unsupported language '{}' (expected en or zh)", code);
            };
            let mut app_config = load_app_config(&paths);
            app_config.lang = lang;
            app_config.save_to(&paths.app_config_file)?;
            println!("Language set to {}", lang.as_str());
        }
        Command::Check => {
            let detected = switcher.status();
            print_detected(&registry, &detected);
            let (Some(id), Some(region), Some(key)) = (
                detected.provider,
                detected.region_id.as_deref(),
                detected.credential.as_ref(),
            ) else {
                bail!("settings do not point at a known provider region");
            };
            let provider = registry
                .get(id)
                .ok_or_else(|| SwitchError::UnknownProvider {
                    provider: id.to_string(),
                })?;
            match validate::validate_credential(provider, region, key.expose()).await {
                Ok(Validation::Valid) => println!("{} API key accepted", "✓".green()),
                Ok(Validation::Skipped) => println!("- no validation endpoint for {}", id),
                Err(e) if e.is_recoverable() => println!("{} {}", "!".yellow(), e),
                Err(e) => bail!(e),
            }
        }
        Command::Backup => {
            let path = switcher.create_backup()?;
            println!("Backed up to {}", path.display());
        }
        Command::Backups => {
            let backups = switcher.list_backups()?;
            if backups.is_empty() {
                println!("No backups in {}", switcher.backups().dir().display());
            }
            for entry in backups {
                println!(
                    "{}  {}",
                    entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    entry.name
                );
            }
        }
        Command::Restore { backup } => {
            let safety = switcher.restore(&backup)?;
            println!("{} {}", "Restored".green().bold(), backup);
            println!("  previous settings saved to {}", safety.display());
        }
        Command::Prune { keep } => {
            let removed = switcher.prune_backups(keep)?;
            println!("Removed {} backup(s)", removed.len());
        }
    }

    Ok(())
}

/// Saved selections, or defaults if the file is unreadable.
fn load_app_config(paths: &SwitchPaths) -> AppConfig {
    AppConfig::load_from(&paths.app_config_file).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "ignoring unreadable app config");
        AppConfig::default()
    })
}

async fn check_key(registry: &ProviderRegistry, selection: &Selection) -> Result<()> {
    let provider = registry
        .get(selection.provider)
        .ok_or_else(|| SwitchError::UnknownProvider {
            provider: selection.provider.to_string(),
        })?;
    match validate::validate_credential(provider, &selection.region, selection.api_key.expose())
        .await
    {
        Ok(Validation::Valid) => {
            println!("{} API key accepted", "✓".green());
            Ok(())
        }
        Ok(Validation::Skipped) => Ok(()),
        Err(e) if e.is_recoverable() => {
            println!("{} could not verify key ({}); continuing", "!".yellow(), e);
            Ok(())
        }
        Err(e) => {
            let hint = provider
                .region(&selection.region)
                .map(|r| format!(" Get a key at {}", r.api_key_url))
                .unwrap_or_default();
            bail!("{}.{}", e, hint)
        }
    }
}

fn print_detected(registry: &ProviderRegistry, detected: &DetectedConfig) {
    if !detected.is_configured() {
        println!("{}", "No provider configured".yellow());
        return;
    }

    let name = detected
        .provider
        .and_then(|id| registry.get(id))
        .map(|p| p.name.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    println!("{} {}", "Provider:".bold(), name);
    println!(
        "  region:     {}",
        detected.region_id.as_deref().unwrap_or("-")
    );
    println!("  model:      {}", detected.model.as_deref().unwrap_or("-"));
    println!(
        "  base url:   {}",
        detected.base_url.as_deref().unwrap_or("-")
    );
    println!(
        "  api key:    {}",
        detected
            .credential
            .as_ref()
            .map(SecureString::hint)
            .unwrap_or_else(|| "-".to_string())
    );
}

fn print_provider(provider: &ProviderDescriptor) {
    println!(
        "{} ({}) - {}",
        provider.name.bold(),
        provider.id,
        provider.description
    );
    for region in provider.regions {
        println!("  region {:<8} {}", region.id, region.base_url);
    }
    let default = provider.default_model().map(|m| m.id);
    for model in provider.models {
        let marker = if Some(model.id) == default { "*" } else { " " };
        let thinking = if model.thinking { " (thinking)" } else { "" };
        println!("  model {} {}{}", marker, model.id, thinking);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ProviderId;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_use_command() {
        let cli = Cli::try_parse_from([
            "claude-switch",
            "use",
            "kimi",
            "--region",
            "china",
            "--skip-validation",
        ])
        .unwrap();
        match cli.command {
            Command::Use(args) => {
                assert_eq!(args.provider, "kimi");
                assert_eq!(args.region.as_deref(), Some("china"));
                assert!(args.skip_validation);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn defaults_come_from_registry() {
        let registry = ProviderRegistry::builtin();
        let args = UseArgs {
            provider: "glm".into(),
            key: Some("k".into()),
            ..UseArgs::default()
        };
        let selection = resolve_selection(&registry, &AppConfig::default(), &args).unwrap();
        assert_eq!(selection.provider, ProviderId::Glm);
        assert_eq!(selection.region, "global");
        assert_eq!(selection.model, "glm-4.7");
        assert_eq!(selection.api_key.expose(), "k");
    }

    #[test]
    fn saved_values_apply_only_to_same_provider() {
        let registry = ProviderRegistry::builtin();
        let saved = AppConfig {
            provider: Some("kimi".into()),
            region: Some("china".into()),
            model: Some("kimi-k2-thinking".into()),
            api_key: Some("sk-saved".into()),
            ..AppConfig::default()
        };

        let kimi = UseArgs {
            provider: "kimi".into(),
            ..UseArgs::default()
        };
        let selection = resolve_selection(&registry, &saved, &kimi).unwrap();
        assert_eq!(selection.region, "china");
        assert_eq!(selection.model, "kimi-k2-thinking");
        assert_eq!(selection.api_key.expose(), "sk-saved");

        let glm = UseArgs {
            provider: "glm".into(),
            ..UseArgs::default()
        };
        let selection = resolve_selection(&registry, &saved, &glm).unwrap();
        assert_eq!(selection.region, "global");
        assert!(selection.api_key.expose().is_empty());
    }

    #[test]
    fn unknown_region_and_provider_are_errors() {
        let registry = ProviderRegistry::builtin();
        let bad_region = UseArgs {
            provider: "deepseek".into(),
            region: Some("china".into()),
            ..UseArgs::default()
        };
        assert!(matches!(
            resolve_selection(&registry, &AppConfig::default(), &bad_region),
            Err(SwitchError::UnknownRegion { .. })
        ));

        let bad_provider = UseArgs {
            provider: "openai".into(),
            ..UseArgs::default()
        };
        assert!(matches!(
            resolve_selection(&registry, &AppConfig::default(), &bad_provider),
            Err(SwitchError::UnknownProvider { .. })
        ));
    }
}
