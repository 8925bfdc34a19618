use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{DEFAULT_CONFIG_FILE, DEFAULT_DATA_DIR, DEFAULT_HOST, DEFAULT_PORT};
use crate::error::{ParcelError, Result};
use crate::parcel::{ColumnMap, LookupTables};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub data: DataConfig,
    pub logging: LoggingConfig,
    pub columns: ColumnMap,
    pub zoning: LookupTables,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Directory holding `<county>_parcels.csv` files
    pub dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// When set, JSON logs also go to a daily rolling file in this directory
    pub dir: Option<PathBuf>,
    /// EnvFilter directives used when RUST_LOG is unset
    pub filter: Option<String>,
}

impl Config {
    /// Loads configuration from, in order of preference: `path`, the `PARCEL_CONFIG`
    /// variable, or `parcel_stream.toml` in the working directory. Only the last may be
    /// absent, in which case built-in defaults apply. `PORT` and `DATA_DIR` override the
    /// file either way.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let explicit = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os("PARCEL_CONFIG").map(PathBuf::from));

        let mut config = match explicit {
            Some(path) => Self::from_file(&path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ParcelError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Applies `PORT` and `DATA_DIR` from `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| ParcelError::Config(format!("PORT is not a valid port: {}", port)))?;
        }
        if let Some(dir) = lookup("DATA_DIR").filter(|d| !d.is_empty()) {
            self.data.dir = PathBuf::from(dir);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.columns.parcel_id.is_empty() {
            return Err(ParcelError::Config(
                "columns.parcel_id needs at least one column name".to_string(),
            ));
        }
        self.zoning.validate()
    }
}
