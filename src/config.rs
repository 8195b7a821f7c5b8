use crate::catalog::Catalog;
use crate::persistence::{self, PersistenceResult};
use crate::schedule::SearchLimits;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

pub const CONFIG_PATH_ENV: &str = "SECTION_SCHEDULER_CONFIG";
pub const HTTP_ADDR_ENV: &str = "SECTION_SCHEDULER_HTTP_ADDR";
pub const CATALOG_ENV: &str = "SECTION_SCHEDULER_CATALOG";
pub const MAX_RESULTS_ENV: &str = "SECTION_SCHEDULER_MAX_RESULTS";
pub const TIMEOUT_MS_ENV: &str = "SECTION_SCHEDULER_TIMEOUT_MS";

const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: serde_json::Error },
    InvalidValue { key: String, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "cannot read config {}: {source}", path.display())
            }
            ConfigError::Parse { path, source } => {
                write!(f, "invalid config {}: {source}", path.display())
            }
            ConfigError::InvalidValue { key, value } => {
                write!(f, "invalid value '{value}' for {key}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogFormat {
    #[default]
    Json,
    Csv,
    #[cfg(feature = "sqlite")]
    Sqlite,
}

impl CatalogFormat {
    /// Guesses the format from a file extension, defaulting to JSON.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("csv") => CatalogFormat::Csv,
            #[cfg(feature = "sqlite")]
            Some("db" | "sqlite" | "sqlite3") => CatalogFormat::Sqlite,
            _ => CatalogFormat::Json,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub http_addr: String,
    pub catalog_path: Option<PathBuf>,
    pub catalog_format: Option<CatalogFormat>,
    pub limits: SearchLimits,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            http_addr: DEFAULT_HTTP_ADDR.to_string(),
            catalog_path: None,
            catalog_format: None,
            limits: SearchLimits::default(),
        }
    }
}

impl ServiceConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reads the file named by `SECTION_SCHEDULER_CONFIG` (if any), then
    /// applies the individual environment overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(path.trim())?,
            _ => Self::default(),
        };
        base.with_overrides(|key| std::env::var(key).ok())
    }

    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup(HTTP_ADDR_ENV) {
            self.http_addr = addr;
        }
        if let Some(path) = lookup(CATALOG_ENV) {
            self.catalog_path = Some(PathBuf::from(path));
        }
        if let Some(value) = lookup(MAX_RESULTS_ENV) {
            self.limits.max_results = Some(parse_number(MAX_RESULTS_ENV, &value)?);
        }
        if let Some(value) = lookup(TIMEOUT_MS_ENV) {
            self.limits.timeout_ms = Some(parse_number(TIMEOUT_MS_ENV, &value)?);
        }
        Ok(self)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.http_addr
            .parse()
            .map_err(|_| ConfigError::InvalidValue {
                key: "http_addr".into(),
                value: self.http_addr.clone(),
            })
    }

    pub fn resolved_format(&self) -> Option<CatalogFormat> {
        self.catalog_format
            .or_else(|| self.catalog_path.as_deref().map(CatalogFormat::from_path))
    }

    /// Loads the configured catalog; an empty catalog when no path is set.
    pub fn load_catalog(&self) -> PersistenceResult<Catalog> {
        let Some(path) = self.catalog_path.as_deref() else {
            return Ok(Catalog::new());
        };
        load_catalog(path, self.resolved_format().unwrap_or_default())
    }
}

pub fn load_catalog(path: &Path, format: CatalogFormat) -> PersistenceResult<Catalog> {
    match format {
        CatalogFormat::Json => persistence::load_catalog_from_json(path),
        CatalogFormat::Csv => persistence::load_catalog_from_csv(path),
        #[cfg(feature = "sqlite")]
        CatalogFormat::Sqlite => {
            use crate::persistence::CatalogStore;
            persistence::sqlite::SqliteCatalogStore::new(path)?
                .load_catalog()?
                .ok_or(persistence::PersistenceError::NotFound)
        }
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}
