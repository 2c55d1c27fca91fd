//! Errors raised while loading and running simulations

use thiserror::Error;

use pidctl::PidError;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SimError {
    #[error(transparent)]
    Controller(#[from] PidError),

    #[error("Invalid scenario: {0}")]
    InvalidScenario(String),

    #[error("Unable to parse scenario: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}
