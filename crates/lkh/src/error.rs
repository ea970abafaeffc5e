use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LkhError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(
        "LKH executable '{solver}' cannot be found on PATH; install LKH-3 or pass the full path to the binary"
    )]
    SolverNotFound { solver: String },
    #[error("invalid invocation: {0}")]
    InvalidInvocation(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid data: {0}")]
    InvalidData(String),
    /// `output` is stdout and stderr as one stream, in the order written.
    #[error("{context}.\nOUTPUT:\n{output}")]
    ProcessFailed { context: String, output: String },
    #[error(
        "{} does not contain any tours; LKH probably did not find a solution",
        tour_file.display()
    )]
    NoTours { tour_file: PathBuf },
    #[error("{0}")]
    Other(String),
}

pub type LkhResult<T> = std::result::Result<T, LkhError>;

impl LkhError {
    pub fn invalid_invocation(message: impl Into<String>) -> Self {
        Self::InvalidInvocation(message.into())
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData(message.into())
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }

    /// `true` when the solver exited cleanly but left no usable tour behind.
    pub fn is_no_tours(&self) -> bool {
        matches!(self, Self::NoTours { .. })
    }
}
