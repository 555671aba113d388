//! Config loader — reads `~/.autoglobal/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.autoglobal/config.json`
//! 3. Environment variables `AUTOGLOBAL_<SECTION>__<FIELD>` (override JSON)
//!
//! Bare `OPENAI_API_KEY` / `ANTHROPIC_API_KEY` are honored as a fallback
//! when no key is configured through either of the above.

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::{Config, LoadBalancing};

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the default path + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be
/// parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);
    load_config_from_path(&config_path)
}

/// Load config from a specific file path.
fn load_config_from_path(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return apply_env_overrides(Config::default());
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return apply_env_overrides(Config::default());
        }
    };

    let config: Config = match serde_json::from_str(&content) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to parse config JSON: {}", e);
            return apply_env_overrides(Config::default());
        }
    };

    apply_env_overrides(config)
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    // Ensure parent directory exists
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Apply environment variable overrides on top of a loaded config.
///
/// Env var format: `AUTOGLOBAL_<SECTION>__<FIELD>` (double underscore as
/// delimiter).
///
/// Supported overrides:
/// - `AUTOGLOBAL_AI__DEFAULT_OPENAI_MODEL` → `ai.default_openai_model`
/// - `AUTOGLOBAL_AI__DEFAULT_ANTHROPIC_MODEL` → `ai.default_anthropic_model`
/// - `AUTOGLOBAL_AI__MAX_TOKENS` → `ai.max_tokens`
/// - `AUTOGLOBAL_AI__TEMPERATURE` → `ai.temperature`
/// - `AUTOGLOBAL_AI__TIMEOUT_SECS` → `ai.timeout_secs`
/// - `AUTOGLOBAL_AI__LOAD_BALANCING` → `ai.load_balancing`
/// - `AUTOGLOBAL_PROVIDERS__<NAME>__API_KEY` → `providers.<name>.api_key`
/// - `AUTOGLOBAL_PROVIDERS__<NAME>__API_BASE` → `providers.<name>.api_base`
fn apply_env_overrides(mut config: Config) -> Config {
    if let Ok(val) = std::env::var("AUTOGLOBAL_AI__DEFAULT_OPENAI_MODEL") {
        config.ai.default_openai_model = val;
    }
    if let Ok(val) = std::env::var("AUTOGLOBAL_AI__DEFAULT_ANTHROPIC_MODEL") {
        config.ai.default_anthropic_model = val;
    }
    if let Ok(val) = std::env::var("AUTOGLOBAL_AI__MAX_TOKENS") {
        if let Ok(n) = val.parse::<u32>() {
            config.ai.max_tokens = n;
        }
    }
    if let Ok(val) = std::env::var("AUTOGLOBAL_AI__TEMPERATURE") {
        if let Ok(t) = val.parse::<f64>() {
            config.ai.temperature = t;
        }
    }
    if let Ok(val) = std::env::var("AUTOGLOBAL_AI__TIMEOUT_SECS") {
        if let Ok(n) = val.parse::<u64>() {
            config.ai.timeout_secs = n;
        }
    }
    if let Ok(val) = std::env::var("AUTOGLOBAL_AI__LOAD_BALANCING") {
        match val.as_str() {
            "roundRobin" => config.ai.load_balancing = LoadBalancing::RoundRobin,
            "openai" => config.ai.load_balancing = LoadBalancing::OpenAi,
            "anthropic" => config.ai.load_balancing = LoadBalancing::Anthropic,
            other => warn!("Unknown load balancing policy '{}', keeping current", other),
        }
    }

    apply_provider_env(&mut config.providers.openai, "OPENAI");
    apply_provider_env(&mut config.providers.anthropic, "ANTHROPIC");

    config
}

/// Apply env var overrides for a single provider.
///
/// The bare `<NAME>_API_KEY` form only fills in a key that is still empty,
/// so an explicit config or `AUTOGLOBAL_` override always wins.
fn apply_provider_env(provider: &mut super::schema::ProviderConfig, name: &str) {
    if let Ok(val) = std::env::var(format!("AUTOGLOBAL_PROVIDERS__{name}__API_KEY")) {
        provider.api_key = val;
    }
    if let Ok(val) = std::env::var(format!("AUTOGLOBAL_PROVIDERS__{name}__API_BASE")) {
        provider.api_base = Some(val);
    }
    if provider.api_key.is_empty() {
        if let Ok(val) = std::env::var(format!("{name}_API_KEY")) {
            provider.api_key = val;
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp_json(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = load_config(Some(Path::new("/nonexistent/config.json")));
        assert_eq!(config.ai.max_tokens, 4096);
    }

    #[test]
    fn test_load_from_file() {
        let file = write_temp_json(
            r#"{
                "ai": { "maxTokens": 1024, "timeoutSecs": 10 },
                "providers": { "anthropic": { "apiKey": "sk-ant-test" } }
            }"#,
        );
        let config = load_config(Some(file.path()));
        assert_eq!(config.ai.max_tokens, 1024);
        assert_eq!(config.ai.timeout_secs, 10);
        assert!(config.providers.anthropic.is_configured());
    }

    #[test]
    fn test_invalid_json_falls_back_to_defaults() {
        let file = write_temp_json("{ this is not json");
        let config = load_config(Some(file.path()));
        assert_eq!(config.ai.max_tokens, 4096);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = Config::default();
        config.ai.max_tokens = 2048;
        config.providers.openai.api_key = "sk-test".to_string();
        save_config(&config, Some(&path)).unwrap();

        let reloaded = load_config(Some(&path));
        assert_eq!(reloaded.ai.max_tokens, 2048);
        assert_eq!(reloaded.providers.openai.api_key, "sk-test");
    }
}
