use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParcelError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV decode failed at line {line}: {source}")]
    Decode {
        line: u64,
        #[source]
        source: csv_async::Error,
    },

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Dataset not found: {0}")]
    DatasetNotFound(String),
}

impl ParcelError {
    /// Wraps a csv error, pulling the source line from its position when known.
    pub fn decode(source: csv_async::Error) -> Self {
        let line = source.position().map(|p| p.line()).unwrap_or(0);
        ParcelError::Decode { line, source }
    }
}

pub type Result<T> = std::result::Result<T, ParcelError>;
