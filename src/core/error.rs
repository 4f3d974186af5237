use thiserror::Error;

#[derive(Error, Debug)]
pub enum SinewError {
    #[error("Invalid skeleton: {0}")]
    InvalidSkeleton(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SinewError>;
