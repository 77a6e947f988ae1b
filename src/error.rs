use thiserror::Error;

/// Errors surfaced by the public API.
///
/// Every fallible entry point returns `Result<T, GabaError>`; there are no
/// panics on valid input anywhere in this crate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GabaError {
    #[error("scoring parameters fail the validity constraint for the {model} model: {reason}")]
    InvalidScore { model: &'static str, reason: String },

    #[error("arena allocator could not satisfy a request for {requested} elements")]
    OutOfMemory { requested: usize },

    #[error("traceback fell outside the recorded band at antidiagonal {p}, lane {lane}")]
    PathLostOutOfBand { p: i64, lane: usize },
}

pub type Result<T> = std::result::Result<T, GabaError>;
