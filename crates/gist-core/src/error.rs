use thiserror::Error;

#[derive(Debug, Error)]
pub enum GistError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("topology error: {0}")]
    Topology(String),
    #[error("allocation failed: {0}")]
    Resource(String),
    #[error("mismatch: {0}")]
    Mismatch(String),
}

pub type GistResult<T> = Result<T, GistError>;
