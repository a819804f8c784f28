use std::fmt;
use std::io;
use std::path::PathBuf;

/// Unified error type for the run-reading layer.
#[derive(Debug)]
pub enum Error {
    /// IO error from opening or reading a run file.
    Io(io::Error),
    /// The run's byte stream does not parse as a sequence of records.
    /// `offset` is the number of bytes successfully decoded before the
    /// failure, i.e. the position of the first bad byte in the run.
    CorruptRun {
        path: PathBuf,
        offset: u64,
        reason: String,
    },
    /// `next()` was called on a cursor with no record available.
    Exhausted,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "IO error: {e}"),
            Error::CorruptRun {
                path,
                offset,
                reason,
            } => write!(
                f,
                "corrupt run {} at byte {offset}: {reason}",
                path.display()
            ),
            Error::Exhausted => write!(f, "run cursor exhausted"),
        }
    }
}

impl std::error::Error for Error {}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
