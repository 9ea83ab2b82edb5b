//! Configuration file loading and parsing.

use crate::types::NovelSpecConfig;
use regex::Regex;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Location of the config file relative to the project root.
pub const CONFIG_FILE: &str = "novelspec/config.yaml";

const ENV_VAR_PATTERN: &str = r"\$\{([^}:]+)(?::-([^}]*))?\}";

/// Config loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to read config: {source}")]
    ReadError {
        #[from]
        source: std::io::Error,
    },

    #[error("invalid YAML at line {}: {message}", line.map(|l| l.to_string()).unwrap_or_else(|| "unknown".to_string()))]
    ParseError { line: Option<usize>, message: String },

    #[error("validation error: {message}")]
    ValidationError { message: String },

    #[error("environment variable not found: {var}")]
    EnvVarNotFound { var: String },
}

/// Configuration loader.
pub struct ConfigLoader {
    project_dir: PathBuf,
}

impl ConfigLoader {
    /// Create a loader for the given project directory.
    pub fn new(project_dir: impl AsRef<Path>) -> Self {
        Self {
            project_dir: project_dir.as_ref().to_path_buf(),
        }
    }

    /// Path of the project's config file.
    pub fn config_path(&self) -> PathBuf {
        self.project_dir.join(CONFIG_FILE)
    }

    /// Load `novelspec/config.yaml`, falling back to defaults when absent.
    pub fn load(&self) -> Result<NovelSpecConfig, ConfigError> {
        let config_path = self.config_path();

        if !config_path.exists() {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            return Ok(NovelSpecConfig::default());
        }

        self.load_file(&config_path)
    }

    /// Load an explicitly named config file. A missing file is an error.
    pub fn load_file(&self, path: &Path) -> Result<NovelSpecConfig, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let contents = std::fs::read_to_string(path)?;
        let config = Self::parse(&contents)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Parse YAML text after environment expansion, then validate.
    pub fn parse(contents: &str) -> Result<NovelSpecConfig, ConfigError> {
        let expanded = expand_env_vars(contents)?;

        // An empty or comment-only file deserializes to null.
        if expanded.lines().all(|line| {
            let line = line.trim();
            line.is_empty() || line.starts_with('#')
        }) {
            return Ok(NovelSpecConfig::default());
        }

        let config: NovelSpecConfig =
            serde_yaml::from_str(&expanded).map_err(|e| ConfigError::ParseError {
                line: e.location().map(|l| l.line()),
                message: e.to_string(),
            })?;

        validate(&config)?;
        Ok(config)
    }

    /// Save configuration to `novelspec/config.yaml`.
    pub fn save(&self, config: &NovelSpecConfig) -> Result<(), ConfigError> {
        validate(config)?;

        let config_path = self.config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(config).map_err(|e| ConfigError::ParseError {
            line: None,
            message: e.to_string(),
        })?;

        std::fs::write(config_path, yaml)?;
        Ok(())
    }
}

/// Expand environment variables in the form `${VAR}` or `${VAR:-default}`.
pub fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
    let re = Regex::new(ENV_VAR_PATTERN).map_err(|e| ConfigError::ValidationError {
        message: e.to_string(),
    })?;

    let mut result = String::with_capacity(content.len());
    let mut last = 0;

    for cap in re.captures_iter(content) {
        let Some(whole) = cap.get(0) else { continue };
        let var_name = &cap[1];
        let default = cap.get(2).map(|m| m.as_str());

        let value = match std::env::var(var_name) {
            Ok(v) => v,
            Err(_) => match default {
                Some(d) => d.to_string(),
                None => {
                    return Err(ConfigError::EnvVarNotFound {
                        var: var_name.to_string(),
                    })
                }
            },
        };

        result.push_str(&content[last..whole.start()]);
        result.push_str(&value);
        last = whole.end();
    }

    result.push_str(&content[last..]);
    Ok(result)
}

/// Validate configuration values.
fn validate(config: &NovelSpecConfig) -> Result<(), ConfigError> {
    if config.spec_label.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            message: "spec_label must not be empty".to_string(),
        });
    }

    if config.spec_label.contains('\n') {
        return Err(ConfigError::ValidationError {
            message: "spec_label must be a single line".to_string(),
        });
    }

    Ok(())
}
