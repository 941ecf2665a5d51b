use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api_url: String,
    pub api_token: String,
    /// `error`, `warn`, `info`, `debug` or `trace`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::config_path() {
            if path.exists() {
                let contents = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config at {}", path.display()))?;
                return Self::from_toml(&contents);
            }
        }

        let api_url = std::env::var("SKOOLWAY_URL")
            .with_context(|| "SKOOLWAY_URL not set. Create a config file or set the env var.")?;
        let api_token = std::env::var("SKOOLWAY_API_TOKEN").with_context(|| {
            "SKOOLWAY_API_TOKEN not set. Create a config file or set the env var."
        })?;

        Ok(Self {
            api_url,
            api_token,
            log_level: std::env::var("SKOOLWAY_LOG").ok(),
        })
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(contents).with_context(|| "Failed to parse config.toml")?;
        if let Ok(level) = std::env::var("SKOOLWAY_LOG") {
            config.log_level = Some(level);
        }
        Ok(config)
    }

    /// Configured log level, `INFO` when unset or unrecognised.
    pub fn tracing_level(&self) -> tracing::Level {
        self.log_level
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or(tracing::Level::INFO)
    }

    pub fn generate_default() -> Result<PathBuf> {
        let path = Self::config_path()
            .with_context(|| "Could not determine config directory")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let default = Config {
            api_url: "https://your-school.skoolway.app".into(),
            api_token: "your-api-token-here".into(),
            log_level: Some("info".into()),
        };

        let toml_str = toml::to_string_pretty(&default)?;
        std::fs::write(&path, toml_str)?;
        Ok(path)
    }

    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("skoolway-tui").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_file() {
        let cfg = Config::from_toml(
            "api_url = \"https://school.example\"\napi_token = \"abc\"\n",
        )
        .unwrap();
        assert_eq!(cfg.api_url, "https://school.example");
        assert_eq!(cfg.api_token, "abc");
    }

    #[test]
    fn unknown_log_level_falls_back_to_info() {
        let mut cfg = Config {
            api_url: "https://school.example".into(),
            api_token: "abc".into(),
            log_level: Some("chatty".into()),
        };
        assert_eq!(cfg.tracing_level(), tracing::Level::INFO);
        cfg.log_level = Some("debug".into());
        assert_eq!(cfg.tracing_level(), tracing::Level::DEBUG);
    }

    #[test]
    fn missing_token_is_an_error() {
        assert!(Config::from_toml("api_url = \"https://school.example\"\n").is_err());
    }
}
