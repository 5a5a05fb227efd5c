use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("no credential found: {0}")]
    MissingCredential(String),

    #[error("journal I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed cookie file: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
