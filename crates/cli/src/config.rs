use anyhow::{anyhow, Context as AnyhowContext, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use textcad_inference::InferenceConfig;

pub const DEFAULT_BIND: &str = "127.0.0.1:5000";
pub const DEFAULT_CORPUS_PATH: &str = "training_data.json";
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024;

pub const CORPUS_ENV: &str = "TEXTCAD_CORPUS";
pub const BIND_ENV: &str = "TEXTCAD_BIND";

/// Process settings.
///
/// Layered as: settings file (JSON or TOML), then `TEXTCAD_*` environment
/// variables, then command-line flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub bind: String,
    pub corpus_path: PathBuf,
    /// Write the corpus back after each retrain
    pub persist: bool,
    pub max_body_bytes: usize,
    pub inference: InferenceConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            corpus_path: PathBuf::from(DEFAULT_CORPUS_PATH),
            persist: true,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            inference: InferenceConfig::default(),
        }
    }
}

impl Settings {
    /// Read the optional settings file and apply the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = match path {
            Some(path) => {
                let bytes = std::fs::read(path)
                    .with_context(|| format!("Failed to read settings from {}", path.display()))?;
                Self::parse(&bytes)
                    .with_context(|| format!("Invalid settings file {}", path.display()))?
            }
            None => Self::default(),
        };
        settings.apply_env(|key| std::env::var(key).ok());
        Ok(settings)
    }

    /// Parse a settings document, JSON first and TOML as a fallback.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let value: serde_json::Value = match serde_json::from_slice(bytes) {
            Ok(value) => value,
            Err(json_err) => {
                let utf8 =
                    std::str::from_utf8(bytes).map_err(|err| anyhow!("{json_err}; {err}"))?;
                let toml_value: toml::Value = toml::from_str(utf8).map_err(|toml_err| {
                    anyhow!(
                        "Settings are not valid JSON or TOML ({json_err}); TOML parse error: {toml_err}"
                    )
                })?;
                serde_json::to_value(toml_value)
                    .map_err(|err| anyhow!("Failed to convert TOML settings to JSON: {err}"))?
            }
        };

        serde_json::from_value(value).map_err(|err| anyhow!("Settings parse error: {err}"))
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(path) = non_empty(CORPUS_ENV) {
            self.corpus_path = PathBuf::from(path);
        }
        if let Some(bind) = non_empty(BIND_ENV) {
            self.bind = bind.trim().to_string();
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.bind.trim().is_empty() {
            anyhow::bail!("bind address must be non-empty");
        }
        if self.corpus_path.as_os_str().is_empty() {
            anyhow::bail!("corpus_path must be non-empty");
        }
        if self.max_body_bytes == 0 {
            anyhow::bail!("max_body_bytes must be > 0");
        }
        self.inference
            .validate()
            .map_err(|err| anyhow!("Invalid [inference] settings: {err}"))
    }
}
