use super::RunnerConfig;
use crate::error::{Result, RunnerError};
use std::path::Path;
use std::sync::{Arc, RwLock};
use tokio::fs;
use tracing::debug;

/// File formats a runner configuration can be written in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Yaml,
    Json,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    pub fn parse(&self, content: &str) -> anyhow::Result<RunnerConfig> {
        let config = match self {
            Self::Toml => toml::from_str(content)?,
            Self::Yaml => serde_yaml::from_str(content)?,
            Self::Json => serde_json::from_str(content)?,
        };
        Ok(config)
    }
}

#[derive(Clone, Default)]
pub struct ConfigLoader {
    config: Arc<RwLock<RunnerConfig>>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `path`, replace the current configuration and apply env overrides
    pub async fn load(&self, path: &Path) -> Result<RunnerConfig> {
        let format = ConfigFormat::from_path(path).ok_or_else(|| RunnerError::ConfigLoad {
            path: path.to_path_buf(),
            reason: "unsupported file extension, expected .toml, .yaml, .yml or .json"
                .to_string(),
            source: None,
        })?;

        let content = fs::read_to_string(path)
            .await
            .map_err(|e| RunnerError::ConfigLoad {
                path: path.to_path_buf(),
                reason: "could not read file".to_string(),
                source: Some(e.into()),
            })?;

        let mut loaded = format.parse(&content).map_err(|e| RunnerError::ConfigLoad {
            path: path.to_path_buf(),
            reason: format!("invalid {format:?} configuration"),
            source: Some(e),
        })?;
        loaded.merge_env_vars();
        // Surface strategy errors at load time rather than at the first run
        loaded.partition.to_strategy()?;

        debug!("Loaded runner configuration from {}", path.display());
        self.replace(loaded.clone());
        Ok(loaded)
    }

    /// Like [`ConfigLoader::load`], keeping the current configuration when
    /// `path` does not exist
    pub async fn load_optional(&self, path: &Path) -> Result<RunnerConfig> {
        if fs::try_exists(path).await.unwrap_or(false) {
            self.load(path).await
        } else {
            debug!("No runner configuration at {}, using current", path.display());
            Ok(self.get_config())
        }
    }

    pub fn get_config(&self) -> RunnerConfig {
        self.config
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn replace(&self, config: RunnerConfig) {
        let mut current = self
            .config
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *current = config;
    }
}
