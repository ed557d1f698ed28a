use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while resolving or creating entity files
#[derive(Error, Debug)]
pub enum CreateError {
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    #[error("Failed to read config {path}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid level pattern: {pattern}")]
    InvalidLevelPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("Cannot resolve entity from '{input}'")]
    UnresolvedEntity { input: String },

    #[error("Invalid entity: {reason}")]
    InvalidEntity { reason: String },

    #[error("Failed to read template {path}")]
    TemplateRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No space left on device for {path}")]
    DiskFull { path: PathBuf },

    #[error("Failed to create directory: {path}")]
    CreateDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CreateError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Map a directory creation failure, detecting ENOSPC
    pub fn create_dir(path: &Path, source: std::io::Error) -> Self {
        if is_disk_full(&source) {
            return Self::DiskFull {
                path: path.to_path_buf(),
            };
        }
        Self::CreateDirFailed {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Map a file write failure, detecting ENOSPC
    pub fn write(path: &Path, source: std::io::Error) -> Self {
        if is_disk_full(&source) {
            return Self::DiskFull {
                path: path.to_path_buf(),
            };
        }
        Self::WriteFailed {
            path: path.to_path_buf(),
            source,
        }
    }

    /// True for errors that invalidate the whole invocation
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::Config { .. }
                | Self::ConfigRead { .. }
                | Self::ConfigParse { .. }
                | Self::InvalidLevelPattern { .. }
        )
    }
}

// ENOSPC = 28 on Unix
fn is_disk_full(e: &std::io::Error) -> bool {
    e.raw_os_error() == Some(28)
}

pub type Result<T> = std::result::Result<T, CreateError>;
