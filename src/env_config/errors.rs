use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("ENV -> {0} is not set")]
    MissingVar(String),
    #[error("ENV -> {name} has invalid value '{value}'")]
    InvalidVar { name: String, value: String },
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}
