use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when taking or persisting measurements.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The operating system could not report the memory usage of the current process.
    ///
    /// No measurement is recorded for a scope whose memory could not be sampled.
    #[error("failed to sample process memory usage: {source}")]
    MemoryProbe {
        /// The underlying operating system error.
        #[source]
        source: io::Error,
    },

    /// The session could not be serialized into its persisted form.
    ///
    /// Nothing has been written to the destination when this error is returned.
    #[error("failed to serialize profiling record: {source}")]
    Serialize {
        /// The underlying serialization error.
        #[source]
        source: serde_json::Error,
    },

    /// The persisted record could not be written to its destination.
    ///
    /// The previous contents of the destination, if any, are left untouched.
    #[error("failed to write profiling record to '{}': {source}", path.display())]
    Persist {
        /// The destination that was being written.
        path: PathBuf,

        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// A specialized `Result` type for profiling operations, returning the crate's
/// [`Error`] type as the error value.
pub(crate) type Result<T> = std::result::Result<T, Error>;
