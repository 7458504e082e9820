//! Stand-ins for entries that were looked up but not found.
//!
//! A null entry remembers the path that was asked for and answers every
//! query with its "nothing here" value, so callers can chain lookups without
//! checking each step.

use std::hash::Hash;
use std::hash::Hasher;
use std::ops::Deref;
use std::ops::DerefMut;

use encoding_rs::Encoding;

use crate::AccessMode;
use crate::CollisionOption;
use crate::Entry;
use crate::EntryKind;
use crate::EntryOps;
use crate::ExistenceCheckResult;
use crate::File;
use crate::FileOps;
use crate::Folder;
use crate::FolderOps;
use crate::IoMode;
use crate::Metadata;
use crate::SearchOption;
use crate::SearchQuery;
use crate::Stream;
use crate::Traversal;
use crate::errors::Error;
use crate::path::EntryPath;

/// A file that does not exist.
///
/// Its encoding is the default of the file system it was looked up in.
/// Equality and hashing only look at the path.
#[derive(Debug, Clone)]
pub struct NullFile {
    path: EntryPath,
    encoding: &'static Encoding,
}

impl NullFile {
    /// A null file standing in for `path`, reporting UTF-8.
    pub fn new(path: EntryPath) -> Self {
        Self::with_encoding(path, encoding_rs::UTF_8)
    }

    /// A null file standing in for `path`, reporting `encoding`.
    pub fn with_encoding(path: EntryPath, encoding: &'static Encoding) -> Self {
        Self { path, encoding }
    }
}

/// A folder that does not exist.
///
/// Null files found through it inherit its encoding.
#[derive(Debug, Clone)]
pub struct NullFolder {
    path: EntryPath,
    encoding: &'static Encoding,
}

macro_rules! path_identity {
    ($null:ty) => {
        impl PartialEq for $null {
            fn eq(&self, other: &Self) -> bool {
                self.path == other.path
            }
        }

        impl Eq for $null {}

        impl Hash for $null {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.path.hash(state);
            }
        }
    };
}

path_identity!(NullFile);
path_identity!(NullFolder);

impl NullFolder {
    /// A null folder standing in for `path`, reporting UTF-8 for its files.
    pub fn new(path: EntryPath) -> Self {
        Self::with_encoding(path, encoding_rs::UTF_8)
    }

    /// A null folder whose null files report `encoding`.
    pub fn with_encoding(path: EntryPath, encoding: &'static Encoding) -> Self {
        Self { path, encoding }
    }
}

macro_rules! null_entry_ops {
    ($ty:ty, $kind:expr) => {
        impl EntryOps for $ty {
            fn name(&self) -> &str {
                self.path.name()
            }

            fn parent_path(&self) -> &str {
                self.path.parent()
            }

            fn full_path(&self) -> String {
                self.path.full_path()
            }

            fn kind(&self) -> EntryKind {
                $kind
            }

            fn exists(&self) -> Result<bool, Error> {
                Ok(false)
            }

            fn metadata(&self) -> Result<Option<Metadata>, Error> {
                Ok(None)
            }

            fn delete(&mut self) -> Result<bool, Error> {
                Ok(false)
            }

            fn rename(&mut self, _: &str, _: CollisionOption) -> Result<bool, Error> {
                Ok(false)
            }

            fn move_to(&mut self, _: &Folder, _: CollisionOption) -> Result<bool, Error> {
                Ok(false)
            }
        }
    };
}

null_entry_ops!(NullFile, EntryKind::File);
null_entry_ops!(NullFolder, EntryKind::Folder);

impl FileOps for NullFile {
    fn extension(&self) -> Option<&str> {
        self.path.extension()
    }

    fn file_name(&self) -> String {
        self.path.file_name()
    }

    fn size(&self) -> Result<u64, Error> {
        Ok(0)
    }

    fn create(&mut self, _: CollisionOption) -> Result<bool, Error> {
        Ok(false)
    }

    fn read_bytes(&self) -> Result<Vec<u8>, Error> {
        Ok(Vec::new())
    }

    fn read_text(&self) -> Result<String, Error> {
        Ok(String::new())
    }

    fn write_bytes(&mut self, _: &[u8]) -> Result<bool, Error> {
        Ok(false)
    }

    fn write_text(&mut self, _: &str) -> Result<bool, Error> {
        Ok(false)
    }

    fn append_text(&mut self, _: &str) -> Result<bool, Error> {
        Ok(false)
    }

    fn copy_to(&self, destination: &Folder, _: CollisionOption) -> Result<MaybeFile, Error> {
        Ok(MaybeFile::Null(NullFile::with_encoding(
            self.path.with_parent(&destination.full_path()),
            self.encoding,
        )))
    }

    fn open(&mut self, _: AccessMode, _: IoMode) -> Result<bool, Error> {
        Ok(false)
    }

    fn close(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn stream(&mut self) -> Option<&mut Box<dyn Stream>> {
        None
    }

    fn is_open(&self) -> bool {
        false
    }

    fn access_mode(&self) -> Option<AccessMode> {
        None
    }

    fn io_mode(&self) -> Option<IoMode> {
        None
    }

    fn encoding(&self) -> Result<&'static Encoding, Error> {
        Ok(self.encoding)
    }

    fn sha256(&self) -> Result<Option<String>, Error> {
        Ok(None)
    }
}

impl FolderOps for NullFolder {
    fn create(&mut self, _: CollisionOption) -> Result<bool, Error> {
        Ok(false)
    }

    fn create_file(&self, name: &str, _: CollisionOption) -> Result<MaybeFile, Error> {
        Ok(MaybeFile::Null(NullFile::with_encoding(
            EntryPath::file(&self.full_path(), name),
            self.encoding,
        )))
    }

    fn create_folder(&self, name: &str, _: CollisionOption) -> Result<MaybeFolder, Error> {
        Ok(MaybeFolder::Null(NullFolder::with_encoding(
            EntryPath::folder(&self.full_path(), name),
            self.encoding,
        )))
    }

    fn copy_to(&self, destination: &Folder, _: CollisionOption) -> Result<MaybeFolder, Error> {
        Ok(MaybeFolder::Null(NullFolder::with_encoding(
            self.path.with_parent(&destination.full_path()),
            self.encoding,
        )))
    }

    fn enumerate(&self, _: SearchQuery) -> Traversal {
        Traversal::empty()
    }

    fn get_files(&self, _: &str, _: SearchOption) -> Result<Vec<File>, Error> {
        Ok(Vec::new())
    }

    fn get_folders(&self, _: &str, _: SearchOption) -> Result<Vec<Folder>, Error> {
        Ok(Vec::new())
    }

    fn get_entries(&self, _: &str, _: SearchOption) -> Result<Vec<Entry>, Error> {
        Ok(Vec::new())
    }

    fn get_file(&self, name: &str, _: SearchOption) -> Result<MaybeFile, Error> {
        Ok(MaybeFile::Null(NullFile::with_encoding(
            EntryPath::file(&self.full_path(), name),
            self.encoding,
        )))
    }

    fn get_folder(&self, name: &str, _: SearchOption) -> Result<MaybeFolder, Error> {
        Ok(MaybeFolder::Null(NullFolder::with_encoding(
            EntryPath::folder(&self.full_path(), name),
            self.encoding,
        )))
    }

    fn get_entry(&self, _: &str, _: SearchOption, _: bool) -> Result<Option<Entry>, Error> {
        Ok(None)
    }

    fn find_entry(&self, _: &str, _: SearchOption) -> Result<Option<Entry>, Error> {
        Ok(None)
    }

    fn check_exists(&self, _: &str) -> Result<ExistenceCheckResult, Error> {
        Ok(ExistenceCheckResult::NotFound)
    }

    fn parent(&self) -> Option<Folder> {
        None
    }
}

/// A file lookup result: the file, or a null file for the requested path.
#[derive(Debug, Clone)]
pub enum MaybeFile {
    /// The file exists.
    Found(File),
    /// Nothing was found.
    Null(NullFile),
}

impl MaybeFile {
    /// True if a file was found.
    pub fn is_found(&self) -> bool {
        matches!(self, MaybeFile::Found(_))
    }

    /// The found file, if any.
    pub fn found(self) -> Option<File> {
        match self {
            MaybeFile::Found(f) => Some(f),
            MaybeFile::Null(_) => None,
        }
    }
}

impl Deref for MaybeFile {
    type Target = dyn FileOps;

    fn deref(&self) -> &Self::Target {
        match self {
            MaybeFile::Found(f) => f,
            MaybeFile::Null(n) => n,
        }
    }
}

impl DerefMut for MaybeFile {
    fn deref_mut(&mut self) -> &mut Self::Target {
        match self {
            MaybeFile::Found(f) => f,
            MaybeFile::Null(n) => n,
        }
    }
}

/// A folder lookup result: the folder, or a null folder for the requested
/// path.
#[derive(Debug, Clone)]
pub enum MaybeFolder {
    /// The folder exists.
    Found(Folder),
    /// Nothing was found.
    Null(NullFolder),
}

impl MaybeFolder {
    /// True if a folder was found.
    pub fn is_found(&self) -> bool {
        matches!(self, MaybeFolder::Found(_))
    }

    /// The found folder, if any.
    pub fn found(self) -> Option<Folder> {
        match self {
            MaybeFolder::Found(f) => Some(f),
            MaybeFolder::Null(_) => None,
        }
    }
}

impl Deref for MaybeFolder {
    type Target = dyn FolderOps;

    fn deref(&self) -> &Self::Target {
        match self {
            MaybeFolder::Found(f) => f,
            MaybeFolder::Null(n) => n,
        }
    }
}

impl DerefMut for MaybeFolder {
    fn deref_mut(&mut self) -> &mut Self::Target {
        match self {
            MaybeFolder::Found(f) => f,
            MaybeFolder::Null(n) => n,
        }
    }
}
