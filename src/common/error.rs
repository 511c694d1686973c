use std::fmt;

/// Crate-wide error type for failures that should interrupt a caller's
/// control flow via `?`. Routine, expected outcomes (page not resident,
/// pool exhausted, duplicate insert) are modeled as `bool`/`Option` return
/// values at their call sites instead of as `Error` variants.
#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Serialization(String),
    Config(String),
    OutOfBounds,
    InvalidInput(String),
    NotImplemented(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "io error: {e}"),
            Error::Serialization(msg) => write!(f, "serialization error: {msg}"),
            Error::Config(msg) => write!(f, "configuration error: {msg}"),
            Error::OutOfBounds => write!(f, "index out of bounds"),
            Error::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            Error::NotImplemented(msg) => write!(f, "not implemented: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<bincode::Error> for Error {
    fn from(e: bincode::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<config::ConfigError> for Error {
    fn from(e: config::ConfigError) -> Self {
        Error::Config(e.to_string())
    }
}
