//! The capability set a storage backend provides to the entry model.
//!
//! Everything above this trait is platform independent. A backend only moves
//! bytes and answers questions about single paths; collision handling, name
//! generation and traversal live in the entry model.

use std::fmt::Display;
use std::io::Read;
use std::io::Seek;
use std::io::Write;

use chrono::DateTime;
use chrono::Utc;
#[cfg(feature = "json_schema")]
use schemars::JsonSchema;
use serde::Deserialize;
use serde::Serialize;

use crate::EntryKind;
use crate::errors::Error;
use crate::utils::format_timestamp;

/// Metadata of a single file or folder as reported by a backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Hash, Eq)]
pub struct Metadata {
    /// Whether the entry is a file or a folder.
    pub kind: EntryKind,
    /// Size in bytes. Zero or implementation-defined for folders.
    pub size: u64,
    /// Creation time.
    pub created: DateTime<Utc>,
    /// Last access time.
    pub last_accessed: DateTime<Utc>,
    /// Last modification time.
    pub last_modified: DateTime<Utc>,
}

impl Display for Metadata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:?}, {} bytes, modified {}",
            self.kind,
            self.size,
            format_timestamp(&self.last_modified)
        )
    }
}

/// An immediate child of a folder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Hash, Eq)]
pub struct Listing {
    /// Final path component, extension included.
    pub name: String,
    /// Whether the child is a file or a folder.
    pub kind: EntryKind,
}

/// How whole-content writes treat existing bytes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Hash, Eq)]
pub enum WriteMode {
    /// Replace the content, creating the file if needed.
    Overwrite,
    /// Append to the content, creating the file if needed.
    Append,
}

/// What a stream may be used for.
#[cfg_attr(feature = "json_schema", derive(JsonSchema))]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Hash, Eq)]
pub enum AccessMode {
    /// Read only.
    Read,
    /// Write only.
    Write,
    /// Read and write.
    ReadWrite,
}

impl AccessMode {
    /// True if reading is allowed.
    pub fn can_read(self) -> bool {
        matches!(self, AccessMode::Read | AccessMode::ReadWrite)
    }

    /// True if writing is allowed.
    pub fn can_write(self) -> bool {
        matches!(self, AccessMode::Write | AccessMode::ReadWrite)
    }
}

/// How `open` treats an existing or missing file.
#[cfg_attr(feature = "json_schema", derive(JsonSchema))]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Hash, Eq)]
pub enum IoMode {
    /// The file must exist.
    OpenExisting,
    /// Open the file, creating it when missing.
    OpenOrCreate,
    /// Create the file, truncating any existing content.
    Create,
    /// Create the file; fail if it exists.
    CreateNew,
    /// Open or create the file and position at its end.
    Append,
}

/// A byte stream opened on a file.
pub trait Stream: Read + Write + Seek + Send {}

impl<T: Read + Write + Seek + Send> Stream for T {}

/// Platform-specific storage consumed by the entry model.
///
/// Paths handed to a backend are normalized with `/` separators. Missing
/// sources and parents are reported as [`Error::NotFound`], occupied
/// destinations as [`Error::AlreadyExists`].
pub trait Backend: Send + Sync {
    /// The single case policy used for every path comparison.
    fn case_sensitive(&self) -> bool;

    /// True when a file and a folder cannot share a name, so an entry of
    /// either kind occupies it.
    fn shared_namespace(&self) -> bool {
        false
    }

    /// Returns the metadata of the entry of `kind` at `path`, or `None` if
    /// there is none.
    fn stat(&self, path: &str, kind: EntryKind) -> Result<Option<Metadata>, Error>;

    /// Lists the immediate children of the folder at `path`.
    fn list(&self, path: &str) -> Result<Vec<Listing>, Error>;

    /// Reads the whole content of the file at `path`.
    fn read(&self, path: &str) -> Result<Vec<u8>, Error>;

    /// Writes `bytes` to the file at `path`.
    fn write(&self, path: &str, bytes: &[u8], mode: WriteMode) -> Result<(), Error>;

    /// Opens a stream on the file at `path`.
    fn open(&self, path: &str, access: AccessMode, mode: IoMode)
    -> Result<Box<dyn Stream>, Error>;

    /// Creates an empty file or a folder at `path`.
    ///
    /// Folders are created with their missing parents; a file requires its
    /// parent folder to exist.
    fn create(&self, path: &str, kind: EntryKind) -> Result<(), Error>;

    /// Deletes the entry of `kind` at `path`; folders are removed with their
    /// content.
    fn delete(&self, path: &str, kind: EntryKind) -> Result<(), Error>;

    /// Moves the entry of `kind` from `from` to `to`.
    fn rename(&self, from: &str, to: &str, kind: EntryKind) -> Result<(), Error>;

    /// Copies the entry of `kind` from `from` to `to`; folders are copied
    /// recursively.
    fn copy(&self, from: &str, to: &str, kind: EntryKind) -> Result<(), Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_display() {
        let t = DateTime::<Utc>::UNIX_EPOCH;
        let m = Metadata {
            kind: EntryKind::File,
            size: 3,
            created: t,
            last_accessed: t,
            last_modified: t,
        };
        assert_eq!(m.to_string(), "File, 3 bytes, modified 1970-01-01T00:00:00.000Z");
    }

    #[test]
    fn access_mode_capabilities() {
        assert!(AccessMode::Read.can_read());
        assert!(!AccessMode::Read.can_write());
        assert!(AccessMode::Write.can_write());
        assert!(!AccessMode::Write.can_read());
        assert!(AccessMode::ReadWrite.can_read() && AccessMode::ReadWrite.can_write());
    }
}
