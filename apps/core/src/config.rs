use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

const MAX_DELAY_MS: u64 = 10_000;
const MAX_STAGGER_STEP_MS: u64 = 1_000;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid TOML in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("failed to encode config: {0}")]
    Encode(#[from] toml::ser::Error),
    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassNames {
    pub marker: String,
    pub attention: String,
    pub active_mode: String,
    pub clearing: String,
}

impl Default for ClassNames {
    fn default() -> Self {
        Self {
            marker: "js-search-highlighted".to_string(),
            attention: "first-highlight".to_string(),
            active_mode: "search-active-mode".to_string(),
            clearing: "search-clearing".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub stagger_step_ms: u64,
    pub clear_fade_ms: u64,
    pub reveal_delay_ms: u64,
    pub attention_ms: u64,
    pub hint_hide_delay_ms: u64,
    pub container_class: String,
    pub excluded_tags: Vec<String>,
    pub classes: ClassNames,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            stagger_step_ms: 25,
            clear_fade_ms: 300,
            reveal_delay_ms: 100,
            attention_ms: 2_000,
            hint_hide_delay_ms: 150,
            container_class: "message-content".to_string(),
            excluded_tags: vec!["script".to_string(), "style".to_string()],
            classes: ClassNames::default(),
        }
    }
}

impl HighlightConfig {
    pub fn stagger_step(&self) -> Duration {
        Duration::from_millis(self.stagger_step_ms)
    }

    pub fn clear_fade(&self) -> Duration {
        Duration::from_millis(self.clear_fade_ms)
    }

    pub fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.reveal_delay_ms)
    }

    pub fn attention(&self) -> Duration {
        Duration::from_millis(self.attention_ms)
    }

    pub fn hint_hide_delay(&self) -> Duration {
        Duration::from_millis(self.hint_hide_delay_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_dir: PathBuf,
    pub highlight: HighlightConfig,
    #[serde(skip)]
    pub config_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let base = stable_app_data_dir();
        Self {
            log_dir: base.join("logs"),
            highlight: HighlightConfig::default(),
            config_path: base.join("config.toml"),
        }
    }
}

pub fn stable_app_data_dir() -> PathBuf {
    std::env::temp_dir().join("chatfind")
}

/// Reads the config at `path` (or the default location). A missing file yields defaults.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let config_path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| Config::default().config_path);

    let raw = match std::fs::read_to_string(&config_path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            return Ok(Config {
                config_path,
                ..Config::default()
            });
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: config_path,
                source,
            })
        }
    };

    let mut config: Config = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: config_path.clone(),
        source,
    })?;
    config.config_path = config_path;
    validate(&config)?;
    Ok(config)
}

pub fn save(config: &Config) -> Result<(), ConfigError> {
    validate(config)?;
    let encoded = toml::to_string_pretty(config)?;
    if let Some(parent) = config.config_path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(&config.config_path, encoded).map_err(|source| ConfigError::Write {
        path: config.config_path.clone(),
        source,
    })
}

pub fn validate(cfg: &Config) -> Result<(), ConfigError> {
    validate_highlight(&cfg.highlight)?;

    if cfg.log_dir.as_os_str().is_empty() {
        return Err(ConfigError::Invalid("log_dir is required".into()));
    }

    Ok(())
}

pub fn validate_highlight(cfg: &HighlightConfig) -> Result<(), ConfigError> {
    if cfg.stagger_step_ms > MAX_STAGGER_STEP_MS {
        return Err(ConfigError::Invalid(format!(
            "stagger_step_ms must be at most {MAX_STAGGER_STEP_MS}"
        )));
    }

    let delays = [
        ("clear_fade_ms", cfg.clear_fade_ms),
        ("reveal_delay_ms", cfg.reveal_delay_ms),
        ("attention_ms", cfg.attention_ms),
        ("hint_hide_delay_ms", cfg.hint_hide_delay_ms),
    ];
    for (name, value) in delays {
        if value > MAX_DELAY_MS {
            return Err(ConfigError::Invalid(format!(
                "{name} must be at most {MAX_DELAY_MS}"
            )));
        }
    }

    validate_class_name("container_class", &cfg.container_class)?;
    let classes = [
        ("classes.marker", &cfg.classes.marker),
        ("classes.attention", &cfg.classes.attention),
        ("classes.active_mode", &cfg.classes.active_mode),
        ("classes.clearing", &cfg.classes.clearing),
    ];
    for (name, value) in classes {
        validate_class_name(name, value)?;
    }

    for (index, (name, value)) in classes.iter().enumerate() {
        if let Some((other, _)) = classes[index + 1..].iter().find(|(_, v)| v == value) {
            return Err(ConfigError::Invalid(format!(
                "{name} and {other} must differ"
            )));
        }
    }

    Ok(())
}

fn validate_class_name(name: &str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Invalid(format!("{name} is required")));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(ConfigError::Invalid(format!(
            "{name} must not contain whitespace"
        )));
    }
    Ok(())
}
