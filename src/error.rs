use thiserror::Error;

/// Errors reported by keyed accessors that require the key to be present.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("key not found in tree")]
    KeyNotFound,
}

pub type Result<T> = std::result::Result<T, Error>;
