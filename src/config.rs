use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use cadencer::scheduler::{CtaEntry, CtaKind};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: Option<String>,
    pub storage: StorageConfig,
    pub scheduling: SchedulingConfig,
    pub calendar: CalendarConfig,
    pub ctas: Vec<CtaEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("cadencer"),
        }
    }
}

impl StorageConfig {
    /// Path of the roster database file.
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("roster.db")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulingConfig {
    /// Throttle between clients in a weekly run
    pub client_delay_ms: u64,
    /// Wall-clock ceiling for a weekly run, 0 means unlimited
    pub run_timeout_ms: u64,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            client_delay_ms: 1000,
            run_timeout_ms: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    /// How many years of publish dates a calendar generation covers
    pub years_ahead: u32,
    /// Cap on new items per location per run, 0 means uncapped
    pub max_per_location: usize,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            years_ahead: 2,
            max_per_location: 0,
        }
    }
}

fn default_ctas() -> Vec<CtaEntry> {
    vec![
        CtaEntry {
            kind: CtaKind::Call,
            text: "Call us today to get started".to_string(),
        },
        CtaEntry {
            kind: CtaKind::Quote,
            text: "Request a free quote".to_string(),
        },
        CtaEntry {
            kind: CtaKind::Book,
            text: "Book an appointment online".to_string(),
        },
        CtaEntry {
            kind: CtaKind::Website,
            text: "Visit our website to learn more".to_string(),
        },
    ]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
            storage: StorageConfig::default(),
            scheduling: SchedulingConfig::default(),
            calendar: CalendarConfig::default(),
            ctas: default_ctas(),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try primary location: ~/.config/<project>/<project>.yml
        if let Some(config_dir) = dirs::config_dir() {
            let project_name = env!("CARGO_PKG_NAME");
            let primary_config = config_dir.join(project_name).join(format!("{}.yml", project_name));
            if primary_config.exists() {
                match Self::load_from_file(&primary_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", primary_config.display(), e);
                    }
                }
            }
        }

        // Try fallback location: ./<project>.yml
        let project_name = env!("CARGO_PKG_NAME");
        let fallback_config = PathBuf::from(format!("{}.yml", project_name));
        if fallback_config.exists() {
            match Self::load_from_file(&fallback_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", fallback_config.display(), e);
                }
            }
        }

        // No config file found, use defaults
        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}
