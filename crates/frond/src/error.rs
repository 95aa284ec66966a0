//! CLI error types.

use std::path::PathBuf;

use frond_config::ConfigError;
use frond_hooks::HookError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read data file {}: {source}", path.display())]
    DataRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid data: {0}")]
    Data(#[from] serde_json::Error),

    #[error("{0}")]
    Hook(#[from] HookError),
}
