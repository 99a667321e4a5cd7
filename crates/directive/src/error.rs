use crate::token::Position;
use thiserror::Error;

/// A malformed directive, tied to where it was written.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} ({position})")]
pub struct Diagnostic {
    pub message: String,
    pub position: Position,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>, position: Position) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

/// Errors raised while setting up a `login` directive occurrence.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Diagnostic(#[from] Diagnostic),

    /// The handler factory rejected the bound configuration.
    #[error(transparent)]
    Handler(#[from] anyhow::Error),
}

/// Errors from parsing a single directive value into its field.
#[derive(Error, Debug)]
pub enum FieldError {
    #[error("invalid boolean {0:?}")]
    Flag(String),

    #[error("invalid integer {value:?}: {source}")]
    Integer {
        value: String,
        source: std::num::ParseIntError,
    },

    #[error("invalid duration {value:?}: {source}")]
    Duration {
        value: String,
        source: humantime::DurationError,
    },

    #[error("provider options have to be in the form 'key1=value1,key2=value2', but were {0:?}")]
    Options(String),
}
