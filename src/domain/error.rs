//! Domain error types.

/// Top-level error type for barcross.
#[derive(Debug, thiserror::Error)]
pub enum BarcrossError {
    #[error("no tick data for {instrument} under {path}")]
    DataNotFound { instrument: String, path: String },

    #[error("missing required field `{field}` in {source_name}")]
    Schema { source_name: String, field: String },

    #[error("cannot parse {input:?}: {reason}")]
    Parse { input: String, reason: String },

    #[error("unsupported {kind}: {value}")]
    UnsupportedConfig { kind: String, value: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("invalid bar series for {instrument}: {reason}")]
    InvalidSeries { instrument: String, reason: String },

    #[error("bar cache error: {reason}")]
    Cache { reason: String },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl BarcrossError {
    pub fn unsupported(kind: &str, value: impl Into<String>) -> Self {
        BarcrossError::UnsupportedConfig {
            kind: kind.to_string(),
            value: value.into(),
        }
    }

    pub fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        BarcrossError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&BarcrossError> for std::process::ExitCode {
    fn from(err: &BarcrossError) -> Self {
        let code: u8 = match err {
            BarcrossError::Io(_) | BarcrossError::Csv(_) | BarcrossError::Cache { .. } => 1,
            BarcrossError::ConfigParse { .. }
            | BarcrossError::ConfigMissing { .. }
            | BarcrossError::ConfigInvalid { .. } => 2,
            BarcrossError::UnsupportedConfig { .. } => 3,
            BarcrossError::Parse { .. }
            | BarcrossError::Schema { .. }
            | BarcrossError::InvalidSeries { .. } => 4,
            BarcrossError::DataNotFound { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
