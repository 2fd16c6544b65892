use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum GazeError {
    #[error("configuration error: {0}")]
    Config(String),
    /// A trace, layout or validation file that could not be read or was rejected.
    #[error("bad input: {0}")]
    Input(String),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing span locator")]
    MissingLocator,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

impl From<BuildError> for GazeError {
    fn from(e: BuildError) -> Self {
        GazeError::Config(e.to_string())
    }
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
