use std::path::PathBuf;

/// Why [`ClientConfig`](super::ClientConfig) could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A layer could not be read, or the merged settings do not fit the
    /// config shape (malformed TOML, a non-numeric timeout in the env).
    #[error("could not read support-form settings: {0}")]
    Layer(#[from] config::ConfigError),

    #[error("config file {} does not exist", .0.display())]
    Missing(PathBuf),

    #[error("{field} {problem}")]
    Invalid {
        field: &'static str,
        problem: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;
