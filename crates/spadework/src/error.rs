/// Result type alias
pub type Result<T> = std::result::Result<T, HostError>;

/// Error types
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Registry error: {0}")]
    Registry(#[from] serde_json::Error),

    #[error("Missing native entry: {0}")]
    MissingNative(String),

    #[error("Invalid native address for entry: {0}")]
    InvalidNativeAddress(String),

    #[error("Watcher error: {0}")]
    Watch(#[from] notify::Error),
}
