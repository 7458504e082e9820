use std::hash::Hash;
use std::hash::Hasher;
use std::ops::Deref;
use std::ops::DerefMut;

use chrono::DateTime;
use chrono::Utc;
#[cfg(feature = "json_schema")]
use schemars::JsonSchema;
use serde::Deserialize;
use serde::Serialize;

use crate::CollisionOption;
use crate::Folder;
use crate::Metadata;
use crate::errors::Error;
use crate::file::File;

/// Whether an entry is a file or a folder.
#[cfg_attr(feature = "json_schema", derive(JsonSchema))]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Hash, Eq, PartialOrd, Ord)]
pub enum EntryKind {
    /// A file with content.
    File,
    /// A container of files and folders.
    Folder,
}

/// Which kinds of entry live under one name in one folder.
///
/// Some backends let a file and a folder share a name, so both can be
/// reported at once.
#[cfg_attr(feature = "json_schema", derive(JsonSchema))]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Hash, Eq)]
pub enum ExistenceCheckResult {
    /// Nothing by that name.
    NotFound,
    /// Only a file.
    FileExists,
    /// Only a folder.
    FolderExists,
    /// A file and a folder.
    FileAndFolderExists,
}

impl ExistenceCheckResult {
    /// Combines two independent existence checks.
    pub fn from_flags(file: bool, folder: bool) -> Self {
        match (file, folder) {
            (false, false) => ExistenceCheckResult::NotFound,
            (true, false) => ExistenceCheckResult::FileExists,
            (false, true) => ExistenceCheckResult::FolderExists,
            (true, true) => ExistenceCheckResult::FileAndFolderExists,
        }
    }

    /// True if a file is present.
    pub fn has_file(self) -> bool {
        matches!(
            self,
            ExistenceCheckResult::FileExists | ExistenceCheckResult::FileAndFolderExists
        )
    }

    /// True if a folder is present.
    pub fn has_folder(self) -> bool {
        matches!(
            self,
            ExistenceCheckResult::FolderExists | ExistenceCheckResult::FileAndFolderExists
        )
    }
}

/// Capabilities shared by every file and folder handle, present or absent.
pub trait EntryOps {
    /// Name without extension.
    fn name(&self) -> &str;

    /// Path of the containing folder.
    fn parent_path(&self) -> &str;

    /// The identity of the entry.
    fn full_path(&self) -> String;

    /// File or folder.
    fn kind(&self) -> EntryKind;

    /// Asks the backend whether the entry exists. A missing entry is
    /// `Ok(false)`; only genuine backend failures are errors.
    fn exists(&self) -> Result<bool, Error>;

    /// Backend metadata, `None` if the entry does not exist.
    fn metadata(&self) -> Result<Option<Metadata>, Error>;

    /// Creation time, or [`DateTime::<Utc>::MIN_UTC`] if the entry does not
    /// exist.
    fn created(&self) -> Result<DateTime<Utc>, Error> {
        Ok(self
            .metadata()?
            .map(|m| m.created)
            .unwrap_or(DateTime::<Utc>::MIN_UTC))
    }

    /// Last access time, or [`DateTime::<Utc>::MIN_UTC`] if the entry does
    /// not exist.
    fn last_accessed(&self) -> Result<DateTime<Utc>, Error> {
        Ok(self
            .metadata()?
            .map(|m| m.last_accessed)
            .unwrap_or(DateTime::<Utc>::MIN_UTC))
    }

    /// Last modification time, or [`DateTime::<Utc>::MIN_UTC`] if the entry
    /// does not exist.
    fn last_modified(&self) -> Result<DateTime<Utc>, Error> {
        Ok(self
            .metadata()?
            .map(|m| m.last_modified)
            .unwrap_or(DateTime::<Utc>::MIN_UTC))
    }

    /// Deletes the entry, folders with their content. Returns `false` if
    /// there was nothing to delete.
    fn delete(&mut self) -> Result<bool, Error>;

    /// Renames the entry within its folder and updates the handle.
    ///
    /// Returns `false` when `option` forbids the rename. Fails with
    /// [`Error::NotFound`] if the entry does not exist.
    fn rename(&mut self, new_name: &str, option: CollisionOption) -> Result<bool, Error>;

    /// Moves the entry into `destination` and updates the handle.
    ///
    /// Returns `false` when `option` forbids the move. Fails with
    /// [`Error::NotFound`] if the entry or the destination does not exist.
    fn move_to(&mut self, destination: &Folder, option: CollisionOption) -> Result<bool, Error>;
}

/// Identity key of a path under a backend's case policy.
pub(crate) fn identity_key(full_path: String, case_sensitive: bool) -> String {
    if case_sensitive {
        full_path
    } else {
        full_path.to_lowercase()
    }
}

/// A file or a folder found by a search.
#[derive(Debug, Clone)]
pub enum Entry {
    /// A file.
    File(File),
    /// A folder.
    Folder(Folder),
}

impl Entry {
    /// Returns the file, if this is one.
    pub fn as_file(&self) -> Option<&File> {
        match self {
            Entry::File(f) => Some(f),
            Entry::Folder(_) => None,
        }
    }

    /// Returns the folder, if this is one.
    pub fn as_folder(&self) -> Option<&Folder> {
        match self {
            Entry::Folder(f) => Some(f),
            Entry::File(_) => None,
        }
    }

    /// Consumes the entry, returning the file if this is one.
    pub fn into_file(self) -> Option<File> {
        match self {
            Entry::File(f) => Some(f),
            Entry::Folder(_) => None,
        }
    }

    /// Consumes the entry, returning the folder if this is one.
    pub fn into_folder(self) -> Option<Folder> {
        match self {
            Entry::Folder(f) => Some(f),
            Entry::File(_) => None,
        }
    }

    fn key(&self) -> String {
        match self {
            Entry::File(f) => f.identity(),
            Entry::Folder(f) => f.identity(),
        }
    }
}

impl Deref for Entry {
    type Target = dyn EntryOps;

    fn deref(&self) -> &Self::Target {
        match self {
            Entry::File(f) => f,
            Entry::Folder(f) => f,
        }
    }
}

impl DerefMut for Entry {
    fn deref_mut(&mut self) -> &mut Self::Target {
        match self {
            Entry::File(f) => f,
            Entry::Folder(f) => f,
        }
    }
}

/// Entries are equal when their full paths are, whatever their kind.
impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Entry {}

impl Hash for Entry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}
