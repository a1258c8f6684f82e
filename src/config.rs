use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Model provider configuration
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

/// Model provider configuration (OpenRouter-compatible chat completions)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// API key; MAILSIFT_API_KEY in the environment takes precedence
    #[serde(default)]
    pub api_key: Option<String>,
    /// Model to use
    #[serde(default = "default_model")]
    pub model: String,
    /// Chat-completions endpoint URL
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Maximum tokens per completion
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: default_base_url(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl AiConfig {
    /// Resolve the API key from the environment or the config file.
    pub fn resolve_api_key(&self) -> Option<String> {
        std::env::var("MAILSIFT_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .or_else(|| self.api_key.clone())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Database file override (default: <data dir>/mailsift.db)
    #[serde(default)]
    pub path: Option<PathBuf>,
}

fn default_model() -> String {
    "openai/gpt-oss-120b".to_string()
}

fn default_base_url() -> String {
    "https://openrouter.ai/api/v1/chat/completions".to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

impl Config {
    pub fn config_dir() -> Result<PathBuf> {
        let dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("mailsift");
        Ok(dir)
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    pub fn data_dir() -> Result<PathBuf> {
        let dir = dirs::data_local_dir()
            .context("Could not find data directory")?
            .join("mailsift");
        Ok(dir)
    }

    /// Database path, honoring the `[store] path` override.
    pub fn db_path(&self) -> Result<PathBuf> {
        match &self.store.path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::data_dir()?.join("mailsift.db")),
        }
    }

    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            anyhow::bail!(
                "Configuration file not found at {}\n\
                 Run 'mailsift setup' to create one. Example:\n\n\
                 [ai]\n\
                 api_key = \"sk-or-...\"\n\
                 model = \"openai/gpt-oss-120b\"\n\n\
                 [store]\n\
                 # path = \"/tmp/mailsift.db\"",
                path.display()
            );
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        let dir = path.parent().context("Config path has no parent")?;

        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn ensure_dirs(&self) -> Result<()> {
        fs::create_dir_all(Self::config_dir()?)?;
        fs::create_dir_all(Self::data_dir()?)?;
        if let Some(parent) = self.db_path()?.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_config() {
        let toml = r#"
            [ai]
            api_key = "sk-test"
            model = "meta-llama/llama-3.1-8b-instruct"
            max_tokens = 512

            [store]
            path = "/tmp/test.db"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.ai.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.ai.model, "meta-llama/llama-3.1-8b-instruct");
        assert_eq!(config.ai.max_tokens, 512);
        assert_eq!(config.store.path, Some(PathBuf::from("/tmp/test.db")));
        // Unspecified fields fall back to defaults
        assert!(config.ai.base_url.contains("openrouter.ai"));
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.ai.api_key, None);
        assert_eq!(config.ai.model, "openai/gpt-oss-120b");
        assert_eq!(config.ai.max_tokens, 1024);
        assert_eq!(config.store.path, None);
    }
}
