use std::io;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

/// Represents all possible errors in the entryfs crate.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Hash, Eq)]
pub enum Error {
    /// The operation required an entry that does not exist.
    #[error("No such file or folder: {0}")]
    NotFound(String),

    /// The backend refused to overwrite an existing entry.
    #[error("Entry already exists: {0}")]
    AlreadyExists(String),

    /// No free name could be found within the iteration budget.
    #[error("Cannot generate a unique name for {name} after {attempts} attempts")]
    CannotGenerateUniqueName {
        /// The name collisions were resolved for.
        name: String,
        /// Number of suffixed names that were tried.
        attempts: u32,
    },

    /// Error indicating a failure to read data.
    #[error("Failed to read {what}: {how}")]
    Read {
        /// The item that failed to be read.
        what: String,
        /// The reason for the failure.
        how: String,
    },

    /// Error indicating a failure to write data to a file.
    #[error("Failed to write {what}: {how}")]
    Write {
        /// The item that failed to be written.
        what: String,
        /// The reason for the failure.
        how: String,
    },

    /// Error indicating a failure to create a file or folder.
    #[error("Failed to create {what}: {how}")]
    Create {
        /// The item that failed to be created.
        what: String,
        /// The reason for the failure.
        how: String,
    },

    /// Error indicating a failure to delete a file or folder.
    #[error("Failed to delete {what}: {how}")]
    Delete {
        /// The item that failed to be deleted.
        what: String,
        /// The reason for the failure.
        how: String,
    },

    /// Error indicating a failure to move or rename an entry.
    #[error("Failed to move {what}: {how}")]
    Move {
        /// The item that failed to be moved.
        what: String,
        /// The reason for the failure.
        how: String,
    },

    /// Error indicating a failure to copy an entry.
    #[error("Failed to copy {what}: {how}")]
    Copy {
        /// The item that failed to be copied.
        what: String,
        /// The reason for the failure.
        how: String,
    },

    /// Error indicating an invalid argument was provided.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A name or path that cannot denote an entry.
    #[error("Invalid path: {what}")]
    InvalidPath {
        /// The rejected name and why.
        what: String,
    },

    /// A background task running a blocking call failed.
    #[error("Task {what} failed: {how}")]
    Task {
        /// The task that failed.
        what: String,
        /// The reason for the failure.
        how: String,
    },

    /// The call was cancelled before it reached the backend.
    #[error("Operation cancelled")]
    Cancelled,
}

/// Backend operation an `io::Error` occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Op {
    Read,
    Write,
    Create,
    Delete,
    Move,
    Copy,
}

impl Error {
    /// Maps a platform error raised while performing `op` on `path`.
    ///
    /// `NotFound` and `AlreadyExists` keep their own variants so callers can
    /// tell them apart from genuine backend failures.
    pub(crate) fn from_io(op: Op, path: &str, e: io::Error) -> Self {
        let what = path.to_string();
        let how = e.to_string();
        match e.kind() {
            io::ErrorKind::NotFound => Error::NotFound(what),
            io::ErrorKind::AlreadyExists => Error::AlreadyExists(what),
            _ => match op {
                Op::Read => Error::Read { what, how },
                Op::Write => Error::Write { what, how },
                Op::Create => Error::Create { what, how },
                Op::Delete => Error::Delete { what, how },
                Op::Move => Error::Move { what, how },
                Op::Copy => Error::Copy { what, how },
            },
        }
    }

    /// True for failures raised by the platform (permission denied, disk
    /// full, ...), as opposed to missing entries, collisions or caller
    /// mistakes.
    pub fn is_backend_failure(&self) -> bool {
        matches!(
            self,
            Error::Read { .. }
                | Error::Write { .. }
                | Error::Create { .. }
                | Error::Delete { .. }
                | Error::Move { .. }
                | Error::Copy { .. }
        )
    }

    /// True if the error reports a missing entry.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}
