use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read road network file {path}: {source}")]
    NetworkFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse road network file: {0}")]
    NetworkFileParse(#[from] serde_yaml::Error),

    #[error("road network validation failed: {0}")]
    Validation(String),
}
