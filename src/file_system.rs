use std::sync::Arc;

use derivative::Derivative;
use encoding_rs::Encoding;
use log::debug;
#[cfg(feature = "json_schema")]
use schemars::JsonSchema;
use serde::Deserialize;
use serde::Serialize;

use crate::Backend;
use crate::CollisionOption;
use crate::Entry;
use crate::EntryKind;
use crate::ExistenceCheckResult;
use crate::File;
use crate::Folder;
use crate::MaybeFile;
use crate::MaybeFolder;
use crate::MemoryBackend;
use crate::NullFile;
use crate::NullFolder;
use crate::collision;
use crate::collision::Resolution;
use crate::encoding;
use crate::entry::identity_key;
use crate::errors::Error;
use crate::path::EntryPath;
use crate::path::SEPARATOR;
use crate::unique_name::DEFAULT_MAX_ITERATIONS;

/// Tunables shared by every handle of a [`FileSystem`].
///
/// Every field has a default, so partial documents deserialize.
#[cfg_attr(feature = "json_schema", derive(JsonSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FsOptions {
    /// Label of the encoding assumed for empty, missing or undetectable
    /// files, e.g. `"utf-8"` or `"windows-1252"`.
    pub default_encoding: String,

    /// How many `"name - (i)"` variants are tried before giving up.
    pub max_unique_name_attempts: u32,

    /// Whether the pattern searches of the `get_*` helpers ignore case.
    pub ignore_case: bool,

    /// Which kind wins when a file and a folder share a name and the
    /// caller did not say.
    pub prefer_file_over_folder: bool,
}

impl Default for FsOptions {
    fn default() -> Self {
        Self {
            default_encoding: "utf-8".to_string(),
            max_unique_name_attempts: DEFAULT_MAX_ITERATIONS,
            ignore_case: false,
            prefer_file_over_folder: true,
        }
    }
}

impl FsOptions {
    /// Checks that the options can be used.
    pub fn validate(&self) -> Result<(), Error> {
        encoding::for_label(&self.default_encoding)?;
        Ok(())
    }
}

/// An explicit backend instance plus its options.
///
/// Every handle carries a clone; cloning only bumps reference counts.
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct FileSystem {
    #[derivative(Debug = "ignore")]
    backend: Arc<dyn Backend>,
    options: Arc<FsOptions>,
    default_encoding: &'static Encoding,
}

impl FileSystem {
    /// Creates a file system over `backend` with default options.
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            options: Arc::new(FsOptions::default()),
            default_encoding: encoding_rs::UTF_8,
        }
    }

    /// Creates a file system over `backend` with the given options.
    pub fn with_options(backend: Arc<dyn Backend>, options: FsOptions) -> Result<Self, Error> {
        let default_encoding = encoding::for_label(&options.default_encoding)?;
        Ok(Self {
            backend,
            options: Arc::new(options),
            default_encoding,
        })
    }

    /// A file system over the host's native file system.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn native() -> Self {
        Self::new(Arc::new(crate::NativeBackend::new()))
    }

    /// A file system over a fresh, empty in-memory tree.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    /// The backend every handle talks to.
    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    /// The options in effect.
    pub fn options(&self) -> &FsOptions {
        &self.options
    }

    /// Encoding assumed for files whose encoding cannot be detected.
    pub fn default_encoding(&self) -> &'static Encoding {
        self.default_encoding
    }

    /// The backend's case policy.
    pub fn case_sensitive(&self) -> bool {
        self.backend.case_sensitive()
    }

    /// Decomposes `path` into parent, name and extension. Pure string work.
    pub fn resolve(&self, path: &str) -> EntryPath {
        EntryPath::parse_file(path)
    }

    /// A file handle at `path`. The file need not exist.
    pub fn file(&self, path: &str) -> File {
        File::new(self.clone(), EntryPath::parse_file(path))
    }

    /// A folder handle at `path`. The folder need not exist.
    pub fn folder(&self, path: &str) -> Folder {
        Folder::new(self.clone(), EntryPath::parse_folder(path))
    }

    /// The file at `path`, or a null file if there is none.
    pub fn get_file(&self, path: &str) -> Result<MaybeFile, Error> {
        let location = EntryPath::parse_file(path);
        if self.entry_exists(&location, EntryKind::File)? {
            Ok(MaybeFile::Found(File::new(self.clone(), location)))
        } else {
            Ok(MaybeFile::Null(NullFile::with_encoding(
                location,
                self.default_encoding(),
            )))
        }
    }

    /// The folder at `path`, or a null folder if there is none.
    pub fn get_folder(&self, path: &str) -> Result<MaybeFolder, Error> {
        let location = EntryPath::parse_folder(path);
        if self.entry_exists(&location, EntryKind::Folder)? {
            Ok(MaybeFolder::Found(Folder::new(self.clone(), location)))
        } else {
            Ok(MaybeFolder::Null(NullFolder::with_encoding(
                location,
                self.default_encoding(),
            )))
        }
    }

    /// The entry at `path`. When both a file and a folder live there,
    /// `prefer_file_over_folder` decides which one is returned.
    pub fn get_entry(
        &self,
        path: &str,
        prefer_file_over_folder: bool,
    ) -> Result<Option<Entry>, Error> {
        let found = self.check_exists(path)?;
        let file = || Entry::File(self.file(path));
        let folder = || Entry::Folder(self.folder(path));
        Ok(match found {
            ExistenceCheckResult::NotFound => None,
            ExistenceCheckResult::FileExists => Some(file()),
            ExistenceCheckResult::FolderExists => Some(folder()),
            ExistenceCheckResult::FileAndFolderExists if prefer_file_over_folder => Some(file()),
            ExistenceCheckResult::FileAndFolderExists => Some(folder()),
        })
    }

    /// Reports which kinds of entry exist at `path`.
    pub fn check_exists(&self, path: &str) -> Result<ExistenceCheckResult, Error> {
        let file = self.entry_exists(&EntryPath::parse_file(path), EntryKind::File)?;
        let folder = self.entry_exists(&EntryPath::parse_folder(path), EntryKind::Folder)?;
        Ok(ExistenceCheckResult::from_flags(file, folder))
    }

    pub(crate) fn entry_exists(&self, location: &EntryPath, kind: EntryKind) -> Result<bool, Error> {
        Ok(self.backend.stat(&location.full_path(), kind)?.is_some())
    }

    /// Kind of the entry holding the name at `location`, checked for `kind`
    /// first. The other kind only counts on a shared-namespace backend.
    pub(crate) fn occupant(
        &self,
        location: &EntryPath,
        kind: EntryKind,
    ) -> Result<Option<EntryKind>, Error> {
        if self.entry_exists(location, kind)? {
            return Ok(Some(kind));
        }
        if self.backend.shared_namespace() {
            let other = match kind {
                EntryKind::File => EntryKind::Folder,
                EntryKind::Folder => EntryKind::File,
            };
            if self.entry_exists(location, other)? {
                return Ok(Some(other));
            }
        }
        Ok(None)
    }

    /// True if `inner` is `outer` or lies below it.
    pub(crate) fn encloses(&self, outer: &str, inner: &str) -> bool {
        let outer = identity_key(outer.to_string(), self.case_sensitive());
        let inner = identity_key(inner.to_string(), self.case_sensitive());
        inner == outer
            || inner
                .strip_prefix(outer.as_str())
                .is_some_and(|rest| rest.starts_with(SEPARATOR) || outer.ends_with(SEPARATOR))
    }

    /// Refuses to replace `candidate` when deleting it would take `source`
    /// along.
    pub(crate) fn guard_replace(
        &self,
        candidate: &EntryPath,
        source: &str,
        option: CollisionOption,
    ) -> Result<(), Error> {
        if option == CollisionOption::ReplaceExisting
            && self.encloses(&candidate.full_path(), source)
        {
            return Err(Error::InvalidArgument(format!(
                "replacing {candidate} would delete {source}"
            )));
        }
        Ok(())
    }

    /// Runs the collision policy for placing an entry of `kind` at
    /// `candidate`. Under `ReplaceExisting` the existing entry is deleted
    /// here, before the caller materializes anything.
    pub(crate) fn settle(
        &self,
        candidate: &EntryPath,
        kind: EntryKind,
        option: CollisionOption,
    ) -> Result<Resolution, Error> {
        let occupant = self.occupant(candidate, kind)?;
        let resolution = collision::resolve(
            option,
            occupant.is_some(),
            candidate,
            kind,
            self.options.max_unique_name_attempts,
            |p| Ok(self.occupant(p, kind)?.is_some()),
        )?;
        let Some(existing) = occupant else {
            return Ok(resolution);
        };
        match &resolution {
            // An entry of the other kind cannot stand in for this one.
            Resolution::OpenExisting(_) if existing != kind => return Ok(Resolution::Fail),
            Resolution::Proceed {
                path,
                replace_existing: true,
            } => {
                debug!("deleting {path} to replace it");
                self.backend.delete(&path.full_path(), existing)?;
            }
            _ => {}
        }
        Ok(resolution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EntryOps;
    use crate::memory_tree;

    #[test]
    fn options_load_from_partial_json() {
        let options: FsOptions =
            serde_json::from_str(r#"{ "max_unique_name_attempts": 5 }"#).unwrap();
        assert_eq!(options.max_unique_name_attempts, 5);
        assert_eq!(options.default_encoding, "utf-8");
        assert!(options.prefer_file_over_folder);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn unknown_encoding_is_rejected() {
        let options = FsOptions {
            default_encoding: "klingon".into(),
            ..Default::default()
        };
        assert!(matches!(
            options.validate(),
            Err(Error::InvalidArgument(_))
        ));
        assert!(FileSystem::with_options(Arc::new(MemoryBackend::new()), options).is_err());
    }

    #[test]
    fn handles_are_pure() {
        let fs = FileSystem::in_memory();
        let f = fs.file(r"\root\docs\report.final.pdf");
        assert_eq!(f.full_path(), "/root/docs/report.final.pdf");
        assert_eq!(f.name(), "report.final");
        assert!(!f.exists().unwrap());
    }

    #[test]
    fn lookups_return_null_for_missing() {
        let fs = memory_tree(&[("/root/a.txt", false)]);
        assert!(fs.get_file("/root/a.txt").unwrap().is_found());
        assert!(!fs.get_file("/root/zz.txt").unwrap().is_found());
        assert!(fs.get_folder("/root").unwrap().is_found());
        assert!(!fs.get_folder("/root/a.txt").unwrap().is_found());
    }

    #[test]
    fn entry_ambiguity_is_decided_by_flag() {
        let fs = memory_tree(&[("/root/data", false), ("/root/data", true)]);
        assert_eq!(
            fs.check_exists("/root/data").unwrap(),
            ExistenceCheckResult::FileAndFolderExists
        );
        let e = fs.get_entry("/root/data", true).unwrap().unwrap();
        assert_eq!(e.kind(), EntryKind::File);
        let e = fs.get_entry("/root/data", false).unwrap().unwrap();
        assert_eq!(e.kind(), EntryKind::Folder);
        assert!(fs.get_entry("/root/none", true).unwrap().is_none());
    }

    #[test]
    fn replace_deletes_before_proceeding() {
        let fs = memory_tree(&[("/root/a.txt", false)]);
        let candidate = EntryPath::parse_file("/root/a.txt");
        let resolution = fs
            .settle(&candidate, EntryKind::File, CollisionOption::ReplaceExisting)
            .unwrap();
        assert!(matches!(
            resolution,
            Resolution::Proceed {
                replace_existing: true,
                ..
            }
        ));
        assert!(!fs.file("/root/a.txt").exists().unwrap());
    }
}
