use thiserror::Error;

/// Persisted match cache could not be read or written.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache io error at {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("malformed cache file {path}: {source}")]
    Malformed {
        path: String,
        source: serde_json::Error,
    },

    #[error("failed to serialize cache: {0}")]
    Serialize(#[from] serde_json::Error),
}
