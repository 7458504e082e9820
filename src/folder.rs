use std::hash::Hash;
use std::hash::Hasher;

use log::debug;
use log::info;

use crate::CollisionOption;
use crate::Entry;
use crate::EntryKind;
use crate::EntryOps;
use crate::ExistenceCheckResult;
use crate::File;
use crate::FileOps;
use crate::FileSystem;
use crate::MaybeFile;
use crate::MaybeFolder;
use crate::Metadata;
use crate::NullFile;
use crate::NullFolder;
use crate::SearchOption;
use crate::SearchQuery;
use crate::Traversal;
use crate::collision::Resolution;
use crate::entry::identity_key;
use crate::errors::Error;
use crate::path::EntryPath;
use crate::path::combine;
use crate::path::validate_name;

/// Capabilities of a folder handle, present or absent.
pub trait FolderOps: EntryOps {
    /// Creates the folder and any missing parents. Returns `false` when
    /// `option` forbids the creation.
    fn create(&mut self, option: CollisionOption) -> Result<bool, Error>;

    /// Creates an empty file called `name` in this folder.
    fn create_file(&self, name: &str, option: CollisionOption) -> Result<MaybeFile, Error>;

    /// Creates a child folder called `name`.
    fn create_folder(&self, name: &str, option: CollisionOption) -> Result<MaybeFolder, Error>;

    /// Copies the folder and its content into `destination`.
    fn copy_to(&self, destination: &Folder, option: CollisionOption)
    -> Result<MaybeFolder, Error>;

    /// Lazily walks the folder.
    fn enumerate(&self, query: SearchQuery) -> Traversal;

    /// Files matching the glob `pattern`.
    fn get_files(&self, pattern: &str, scope: SearchOption) -> Result<Vec<File>, Error>;

    /// Folders matching the glob `pattern`.
    fn get_folders(&self, pattern: &str, scope: SearchOption) -> Result<Vec<Folder>, Error>;

    /// Files and folders matching the glob `pattern`.
    fn get_entries(&self, pattern: &str, scope: SearchOption) -> Result<Vec<Entry>, Error>;

    /// The first file called `name` within `scope`.
    fn get_file(&self, name: &str, scope: SearchOption) -> Result<MaybeFile, Error>;

    /// The first folder called `name` within `scope`.
    fn get_folder(&self, name: &str, scope: SearchOption) -> Result<MaybeFolder, Error>;

    /// The first entry called `name` within `scope`. When a file and a folder
    /// of that name share a parent, `prefer_file_over_folder` picks one.
    fn get_entry(
        &self,
        name: &str,
        scope: SearchOption,
        prefer_file_over_folder: bool,
    ) -> Result<Option<Entry>, Error>;

    /// [`FolderOps::get_entry`] with the configured preference.
    fn find_entry(&self, name: &str, scope: SearchOption) -> Result<Option<Entry>, Error>;

    /// Which kinds of entry called `name` are immediate children.
    fn check_exists(&self, name: &str) -> Result<ExistenceCheckResult, Error>;

    /// The containing folder; `None` at a root.
    fn parent(&self) -> Option<Folder>;
}

/// A handle to a folder, which may or may not exist.
#[derive(Debug, Clone)]
pub struct Folder {
    fs: FileSystem,
    path: EntryPath,
}

impl Folder {
    /// A handle at `path` on `fs`.
    pub fn new(fs: FileSystem, path: EntryPath) -> Self {
        Self { fs, path }
    }

    /// The decomposed location.
    pub fn path(&self) -> &EntryPath {
        &self.path
    }

    /// The file system the handle belongs to.
    pub fn file_system(&self) -> &FileSystem {
        &self.fs
    }

    pub(crate) fn identity(&self) -> String {
        identity_key(self.full_path(), self.fs.case_sensitive())
    }

    /// True if `other` is this folder or lies below it.
    fn contains(&self, other: &Folder) -> bool {
        self.fs.encloses(&self.full_path(), &other.full_path())
    }

    fn require_exists(&self) -> Result<(), Error> {
        if self.exists()? {
            Ok(())
        } else {
            Err(Error::NotFound(self.full_path()))
        }
    }

    fn child_file(&self, name: &str) -> EntryPath {
        EntryPath::file(&self.full_path(), name)
    }

    fn child_folder(&self, name: &str) -> EntryPath {
        EntryPath::folder(&self.full_path(), name)
    }

    fn glob(&self, query: SearchQuery, scope: SearchOption) -> SearchQuery {
        query
            .scope(scope)
            .ignore_case(self.fs.options().ignore_case)
    }

    fn relocate(&mut self, target: EntryPath, option: CollisionOption) -> Result<bool, Error> {
        let from = self.full_path();
        let same_entry = identity_key(target.full_path(), self.fs.case_sensitive()) == self.identity();
        let destination = if same_entry {
            target
        } else {
            self.fs.guard_replace(&target, &from, option)?;
            match self.fs.settle(&target, EntryKind::Folder, option)? {
                Resolution::Proceed { path, .. } => path,
                Resolution::Fail | Resolution::OpenExisting(_) => {
                    debug!("not moving {from}: {target} exists");
                    return Ok(false);
                }
            }
        };
        self.fs
            .backend()
            .rename(&from, &destination.full_path(), EntryKind::Folder)?;
        info!("moved folder {from} to {destination}");
        self.path = destination;
        Ok(true)
    }
}

impl PartialEq for Folder {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for Folder {}

impl Hash for Folder {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

impl EntryOps for Folder {
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
        EntryKind::Folder
    }

    fn exists(&self) -> Result<bool, Error> {
        self.fs.entry_exists(&self.path, EntryKind::Folder)
    }

    fn metadata(&self) -> Result<Option<Metadata>, Error> {
        self.fs.backend().stat(&self.full_path(), EntryKind::Folder)
    }

    fn delete(&mut self) -> Result<bool, Error> {
        match self.fs.backend().delete(&self.full_path(), EntryKind::Folder) {
            Ok(()) => {
                info!("deleted folder {}", self.path);
                Ok(true)
            }
            Err(Error::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn rename(&mut self, new_name: &str, option: CollisionOption) -> Result<bool, Error> {
        validate_name(new_name)?;
        self.require_exists()?;
        let target = self.path.with_name(new_name);
        if target == self.path {
            return Ok(true);
        }
        self.relocate(target, option)
    }

    fn move_to(&mut self, destination: &Folder, option: CollisionOption) -> Result<bool, Error> {
        self.require_exists()?;
        destination.require_exists()?;
        if self.contains(destination) {
            return Err(Error::InvalidArgument(format!(
                "cannot move {} into itself",
                self.path
            )));
        }
        let target = self.path.with_parent(&destination.full_path());
        if target == self.path {
            return Ok(true);
        }
        self.relocate(target, option)
    }
}

impl FolderOps for Folder {
    fn create(&mut self, option: CollisionOption) -> Result<bool, Error> {
        match self.fs.settle(&self.path, EntryKind::Folder, option)? {
            Resolution::Fail => Ok(false),
            Resolution::OpenExisting(_) => Ok(true),
            Resolution::Proceed { path, .. } => {
                self.fs
                    .backend()
                    .create(&path.full_path(), EntryKind::Folder)?;
                info!("created folder {path}");
                self.path = path;
                Ok(true)
            }
        }
    }

    fn create_file(&self, name: &str, option: CollisionOption) -> Result<MaybeFile, Error> {
        validate_name(name)?;
        let mut file = File::new(self.fs.clone(), self.child_file(name));
        if file.create(option)? {
            Ok(MaybeFile::Found(file))
        } else {
            Ok(MaybeFile::Null(NullFile::with_encoding(
                file.path().clone(),
                self.fs.default_encoding(),
            )))
        }
    }

    fn create_folder(&self, name: &str, option: CollisionOption) -> Result<MaybeFolder, Error> {
        validate_name(name)?;
        let mut folder = Folder::new(self.fs.clone(), self.child_folder(name));
        if folder.create(option)? {
            Ok(MaybeFolder::Found(folder))
        } else {
            Ok(MaybeFolder::Null(NullFolder::with_encoding(
                folder.path,
                self.fs.default_encoding(),
            )))
        }
    }

    fn copy_to(
        &self,
        destination: &Folder,
        option: CollisionOption,
    ) -> Result<MaybeFolder, Error> {
        self.require_exists()?;
        destination.require_exists()?;
        if self.contains(destination) {
            return Err(Error::InvalidArgument(format!(
                "cannot copy {} into itself",
                self.path
            )));
        }
        let target = self.path.with_parent(&destination.full_path());
        self.fs.guard_replace(&target, &self.full_path(), option)?;
        match self.fs.settle(&target, EntryKind::Folder, option)? {
            Resolution::Fail => Ok(MaybeFolder::Null(NullFolder::with_encoding(
                target,
                self.fs.default_encoding(),
            ))),
            Resolution::OpenExisting(path) => {
                Ok(MaybeFolder::Found(Folder::new(self.fs.clone(), path)))
            }
            Resolution::Proceed { path, .. } => {
                self.fs
                    .backend()
                    .copy(&self.full_path(), &path.full_path(), EntryKind::Folder)?;
                info!("copied folder {} to {path}", self.path);
                Ok(MaybeFolder::Found(Folder::new(self.fs.clone(), path)))
            }
        }
    }

    fn enumerate(&self, query: SearchQuery) -> Traversal {
        Traversal::new(self.fs.clone(), self.full_path(), query)
    }

    fn get_files(&self, pattern: &str, scope: SearchOption) -> Result<Vec<File>, Error> {
        self.enumerate(self.glob(SearchQuery::files(pattern), scope))
            .filter_map(|e| e.map(Entry::into_file).transpose())
            .collect()
    }

    fn get_folders(&self, pattern: &str, scope: SearchOption) -> Result<Vec<Folder>, Error> {
        self.enumerate(self.glob(SearchQuery::folders(pattern), scope))
            .filter_map(|e| e.map(Entry::into_folder).transpose())
            .collect()
    }

    fn get_entries(&self, pattern: &str, scope: SearchOption) -> Result<Vec<Entry>, Error> {
        self.enumerate(self.glob(SearchQuery::entries(pattern), scope))
            .collect()
    }

    fn get_file(&self, name: &str, scope: SearchOption) -> Result<MaybeFile, Error> {
        for entry in self.enumerate(SearchQuery::named(name).scope(scope)) {
            if let Some(file) = entry?.into_file() {
                return Ok(MaybeFile::Found(file));
            }
        }
        Ok(MaybeFile::Null(NullFile::with_encoding(
            self.child_file(name),
            self.fs.default_encoding(),
        )))
    }

    fn get_folder(&self, name: &str, scope: SearchOption) -> Result<MaybeFolder, Error> {
        for entry in self.enumerate(SearchQuery::named(name).scope(scope)) {
            if let Some(folder) = entry?.into_folder() {
                return Ok(MaybeFolder::Found(folder));
            }
        }
        Ok(MaybeFolder::Null(NullFolder::with_encoding(
            self.child_folder(name),
            self.fs.default_encoding(),
        )))
    }

    fn get_entry(
        &self,
        name: &str,
        scope: SearchOption,
        prefer_file_over_folder: bool,
    ) -> Result<Option<Entry>, Error> {
        let mut matches = self.enumerate(SearchQuery::named(name).scope(scope));
        let Some(first) = matches.next().transpose()? else {
            return Ok(None);
        };
        let preferred = if prefer_file_over_folder {
            EntryKind::File
        } else {
            EntryKind::Folder
        };
        if first.kind() == preferred {
            return Ok(Some(first));
        }
        // A file and a folder sharing a name are listed together.
        match matches.next().transpose()? {
            Some(next) if next.kind() == preferred && next.parent_path() == first.parent_path() => {
                Ok(Some(next))
            }
            _ => Ok(Some(first)),
        }
    }

    fn find_entry(&self, name: &str, scope: SearchOption) -> Result<Option<Entry>, Error> {
        self.get_entry(name, scope, self.fs.options().prefer_file_over_folder)
    }

    fn check_exists(&self, name: &str) -> Result<ExistenceCheckResult, Error> {
        self.fs.check_exists(&combine(&self.full_path(), name))
    }

    fn parent(&self) -> Option<Folder> {
        if self.path.parent().is_empty() {
            return None;
        }
        Some(Folder::new(
            self.fs.clone(),
            EntryPath::parse_folder(self.path.parent()),
        ))
    }
}
