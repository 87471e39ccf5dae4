// Configuration loader
// Loads ~/.quill/config.toml (or an explicit path), falling back to environment variables

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::constants::{CONFIG_DIR, CONFIG_FILE};
use super::settings::{Config, ProviderEntry, ProviderKind};

pub const ENV_API_KEY: &str = "QUILL_API_KEY";
pub const ENV_PROVIDER: &str = "QUILL_PROVIDER";
pub const ENV_MODEL: &str = "QUILL_MODEL";
pub const ENV_SUMMARIZER_URL: &str = "RENDER_API_BASE_URL";
pub const ENV_SEARCH_API_KEY: &str = "TAVILY_API_KEY";

/// `~/.quill/config.toml`, if a home directory can be found
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_DIR).join(CONFIG_FILE))
}

/// Load configuration.
///
/// An explicit `path` must exist. Without one, `~/.quill/config.toml` is used
/// when present and the environment otherwise.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    load_config_with(path, default_config_path(), |key| std::env::var(key).ok())
}

fn load_config_with<F>(path: Option<&Path>, fallback: Option<PathBuf>, env: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => read_config_file(path)?,
        None => match fallback.filter(|p| p.exists()) {
            Some(path) => read_config_file(&path)?,
            None => config_from_env(&env)?,
        },
    };

    apply_env_overrides(&mut config, &env);

    config
        .validate()
        .context("Configuration validation failed")?;

    Ok(config)
}

fn read_config_file(path: &Path) -> Result<Config> {
    tracing::debug!("Loading config from {}", path.display());
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    parse_config(&contents).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Parse a TOML config document (no validation)
pub fn parse_config(contents: &str) -> Result<Config> {
    let mut config: Config = toml::from_str(contents).context("Invalid config TOML")?;
    if let Some(run_log) = config.logging.run_log.take() {
        config.logging.run_log = Some(expand_tilde(&run_log));
    }
    Ok(config)
}

/// Build a config with a single default provider from environment variables
fn config_from_env<F>(env: &F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(api_key) = env(ENV_API_KEY).filter(|k| !k.trim().is_empty()) else {
        bail!(
            "No configuration found.\n\n\
             Create ~/.quill/config.toml with a [providers.default] section,\n\
             or set environment variables:\n  \
             export {}=\"...\"\n  \
             export {}=\"openai\"   # openai | mistral | groq | gemini",
            ENV_API_KEY,
            ENV_PROVIDER
        );
    };

    let kind = match env(ENV_PROVIDER) {
        Some(name) => name.parse::<ProviderKind>()?,
        None => ProviderKind::Openai,
    };

    let mut entry = ProviderEntry::new(kind, api_key);
    entry.model = env(ENV_MODEL).filter(|m| !m.trim().is_empty());

    let mut config = Config::default();
    config.providers.default = Some(entry);
    Ok(config)
}

fn apply_env_overrides<F>(config: &mut Config, env: &F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = env(ENV_SUMMARIZER_URL).filter(|u| !u.trim().is_empty()) {
        config.url_summarizer.base_url = url;
    }
    if let Some(key) = env(ENV_SEARCH_API_KEY).filter(|k| !k.trim().is_empty()) {
        config.research.search_api_key = Some(key);
    }
}

fn expand_tilde(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}
