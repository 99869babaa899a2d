use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpecdeckError {
    #[error("invalid config at {path}: {reason}")]
    InvalidConfig { path: String, reason: String },

    #[error("invalid glob pattern '{pattern}': {reason}")]
    InvalidGlob { pattern: String, reason: String },

    #[error("file watcher has been disposed")]
    WatcherDisposed,

    #[error("file watcher error: {0}")]
    Watch(#[from] notify::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SpecdeckError>;
