use crate::constants::*;
use crate::error::{EtlError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Everything a run needs. Replaces the fixed constants of a one-off script.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EtlConfig {
    pub url: String,
    pub table_attribs: Vec<String>,
    pub db_path: PathBuf,
    pub table_name: String,
    pub exchange_rate_path: PathBuf,
    pub output_csv_path: PathBuf,
    pub log_path: PathBuf,
    /// Directory for JSON diagnostic logs; none means console only.
    pub log_dir: Option<PathBuf>,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            table_attribs: default_table_attribs(),
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            table_name: DEFAULT_TABLE_NAME.to_string(),
            exchange_rate_path: PathBuf::from(DEFAULT_EXCHANGE_RATE_PATH),
            output_csv_path: PathBuf::from(DEFAULT_OUTPUT_CSV_PATH),
            log_path: PathBuf::from(DEFAULT_LOG_PATH),
            log_dir: None,
            http: HttpConfig::default(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

impl EtlConfig {
    pub fn load(config_path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(config_path).map_err(|e| {
            EtlError::Config(format!(
                "Failed to read config file '{}': {}",
                config_path.display(),
                e
            ))
        })?;

        let config: EtlConfig = toml::from_str(&config_content)?;
        config.validate()?;
        Ok(config)
    }

    /// Like `load`, but a missing file means defaults.
    pub fn load_or_default(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            Self::load(config_path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(EtlError::Config("url must not be empty".to_string()));
        }
        if self.table_attribs.len() != 2 {
            return Err(EtlError::Config(format!(
                "table_attribs must name exactly 2 columns, got {}",
                self.table_attribs.len()
            )));
        }
        if self.http.timeout_seconds == 0 {
            return Err(EtlError::Config(
                "http.timeout_seconds must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
