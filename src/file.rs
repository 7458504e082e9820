use std::cell::OnceCell;
use std::hash::Hash;
use std::hash::Hasher;
use std::io::Write;

use derivative::Derivative;
use encoding_rs::Encoding;
use log::debug;
use log::info;
use log::warn;

use crate::AccessMode;
use crate::CollisionOption;
use crate::EntryKind;
use crate::EntryOps;
use crate::FileSystem;
use crate::Folder;
use crate::IoMode;
use crate::MaybeFile;
use crate::Metadata;
use crate::NullFile;
use crate::Stream;
use crate::WriteMode;
use crate::collision::Resolution;
use crate::encoding;
use crate::entry::identity_key;
use crate::errors::Error;
use crate::hash::Sha256Builder;
use crate::hash::Sha256String;
use crate::path::EntryPath;
use crate::path::validate_name;

/// Capabilities of a file handle, present or absent.
pub trait FileOps: EntryOps {
    /// Extension without the leading dot.
    fn extension(&self) -> Option<&str>;

    /// Name plus `.extension` when present.
    fn file_name(&self) -> String;

    /// Size in bytes, zero if the file does not exist.
    fn size(&self) -> Result<u64, Error>;

    /// Creates an empty file at the handle's location. Under
    /// `GenerateUniqueName` the handle moves to the generated name; under
    /// `OpenIfExists` it refers to the existing file. Returns `false` when
    /// `option` forbids the creation.
    fn create(&mut self, option: CollisionOption) -> Result<bool, Error>;

    /// The whole content.
    fn read_bytes(&self) -> Result<Vec<u8>, Error>;

    /// The whole content decoded with the file's encoding.
    fn read_text(&self) -> Result<String, Error>;

    /// Replaces the content, creating the file if needed.
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<bool, Error>;

    /// Replaces the content with `text` in the file's encoding.
    fn write_text(&mut self, text: &str) -> Result<bool, Error>;

    /// Appends `text` in the file's encoding.
    fn append_text(&mut self, text: &str) -> Result<bool, Error>;

    /// Copies the file into `destination`. A forbidden copy yields a null
    /// file; `OpenIfExists` yields the existing copy untouched.
    fn copy_to(&self, destination: &Folder, option: CollisionOption) -> Result<MaybeFile, Error>;

    /// Opens a stream owned by this handle.
    fn open(&mut self, access: AccessMode, mode: IoMode) -> Result<bool, Error>;

    /// Flushes and releases the stream. Closing a closed handle does
    /// nothing.
    fn close(&mut self) -> Result<(), Error>;

    /// The open stream, if any.
    fn stream(&mut self) -> Option<&mut Box<dyn Stream>>;

    /// True between a successful `open` and `close`.
    fn is_open(&self) -> bool;

    /// Access mode of the open stream.
    fn access_mode(&self) -> Option<AccessMode>;

    /// I/O mode of the open stream.
    fn io_mode(&self) -> Option<IoMode>;

    /// Encoding of the content, detected on first use.
    fn encoding(&self) -> Result<&'static Encoding, Error>;

    /// Hex SHA-256 of the content, `None` if the file does not exist.
    fn sha256(&self) -> Result<Option<String>, Error>;
}

/// A handle to a file, which may or may not exist.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct File {
    fs: FileSystem,
    path: EntryPath,
    encoding: OnceCell<&'static Encoding>,
    #[derivative(Debug = "ignore")]
    stream: Option<Box<dyn Stream>>,
    access_mode: Option<AccessMode>,
    io_mode: Option<IoMode>,
}

impl File {
    /// A handle at `path` on `fs`.
    pub fn new(fs: FileSystem, path: EntryPath) -> Self {
        Self {
            fs,
            path,
            encoding: OnceCell::new(),
            stream: None,
            access_mode: None,
            io_mode: None,
        }
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

    fn require_exists(&self) -> Result<(), Error> {
        if self.exists()? {
            Ok(())
        } else {
            Err(Error::NotFound(self.full_path()))
        }
    }

    /// Encoding of `bytes`, the current content. Only non-empty content is
    /// cached; an empty file takes the default until something is written.
    fn detected_encoding(&self, bytes: &[u8]) -> &'static Encoding {
        if let Some(encoding) = self.encoding.get() {
            return *encoding;
        }
        if bytes.is_empty() {
            return self.fs.default_encoding();
        }
        *self
            .encoding
            .get_or_init(|| encoding::detect(bytes, self.fs.default_encoding()))
    }

    fn reset_encoding(&mut self, encoding: Option<&'static Encoding>) {
        self.encoding = OnceCell::new();
        if let Some(encoding) = encoding {
            let _ = self.encoding.set(encoding);
        }
    }

    /// Moves the file to `target` under `option`. Shared by rename and move.
    fn relocate(&mut self, target: EntryPath, option: CollisionOption) -> Result<bool, Error> {
        self.close()?;
        let from = self.full_path();
        let same_entry = identity_key(target.full_path(), self.fs.case_sensitive()) == self.identity();
        let destination = if same_entry {
            // Only the spelling changes; there is nothing to collide with.
            target
        } else {
            self.fs.guard_replace(&target, &from, option)?;
            match self.fs.settle(&target, EntryKind::File, option)? {
                Resolution::Proceed { path, .. } => path,
                Resolution::Fail | Resolution::OpenExisting(_) => {
                    debug!("not moving {from}: {target} exists");
                    return Ok(false);
                }
            }
        };
        self.fs
            .backend()
            .rename(&from, &destination.full_path(), EntryKind::File)?;
        info!("moved {from} to {destination}");
        self.path = destination;
        Ok(true)
    }
}

impl Clone for File {
    /// The clone is a fresh handle to the same path; the stream stays with
    /// the original.
    fn clone(&self) -> Self {
        let mut file = File::new(self.fs.clone(), self.path.clone());
        file.encoding = self.encoding.clone();
        file
    }
}

impl PartialEq for File {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for File {}

impl Hash for File {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

impl Drop for File {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("closing {} on drop: {e}", self.full_path());
        }
    }
}

impl EntryOps for File {
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
        EntryKind::File
    }

    fn exists(&self) -> Result<bool, Error> {
        self.fs.entry_exists(&self.path, EntryKind::File)
    }

    fn metadata(&self) -> Result<Option<Metadata>, Error> {
        self.fs.backend().stat(&self.full_path(), EntryKind::File)
    }

    fn delete(&mut self) -> Result<bool, Error> {
        self.close()?;
        match self.fs.backend().delete(&self.full_path(), EntryKind::File) {
            Ok(()) => {
                info!("deleted {}", self.path);
                self.reset_encoding(None);
                Ok(true)
            }
            Err(Error::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn rename(&mut self, new_name: &str, option: CollisionOption) -> Result<bool, Error> {
        validate_name(new_name)?;
        self.require_exists()?;
        let target = EntryPath::file(self.path.parent(), new_name);
        if target == self.path {
            return Ok(true);
        }
        self.relocate(target, option)
    }

    fn move_to(&mut self, destination: &Folder, option: CollisionOption) -> Result<bool, Error> {
        self.require_exists()?;
        if !destination.exists()? {
            return Err(Error::NotFound(destination.full_path()));
        }
        let target = self.path.with_parent(&destination.full_path());
        if target == self.path {
            return Ok(true);
        }
        self.relocate(target, option)
    }
}

impl FileOps for File {
    fn extension(&self) -> Option<&str> {
        self.path.extension()
    }

    fn file_name(&self) -> String {
        self.path.file_name()
    }

    fn size(&self) -> Result<u64, Error> {
        Ok(self.metadata()?.map(|m| m.size).unwrap_or(0))
    }

    fn create(&mut self, option: CollisionOption) -> Result<bool, Error> {
        match self.fs.settle(&self.path, EntryKind::File, option)? {
            Resolution::Fail => Ok(false),
            Resolution::OpenExisting(_) => Ok(true),
            Resolution::Proceed { path, .. } => {
                self.fs
                    .backend()
                    .create(&path.full_path(), EntryKind::File)?;
                info!("created file {path}");
                self.path = path;
                self.reset_encoding(None);
                Ok(true)
            }
        }
    }

    fn read_bytes(&self) -> Result<Vec<u8>, Error> {
        self.fs.backend().read(&self.full_path())
    }

    fn read_text(&self) -> Result<String, Error> {
        let bytes = self.read_bytes()?;
        Ok(encoding::decode(&bytes, self.detected_encoding(&bytes)))
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<bool, Error> {
        self.fs
            .backend()
            .write(&self.full_path(), bytes, WriteMode::Overwrite)?;
        debug!("wrote {} bytes to {}", bytes.len(), self.path);
        self.reset_encoding(None);
        Ok(true)
    }

    fn write_text(&mut self, text: &str) -> Result<bool, Error> {
        let encoding = self.encoding()?;
        let bytes = encoding::encode(text, encoding, true);
        self.fs
            .backend()
            .write(&self.full_path(), &bytes, WriteMode::Overwrite)?;
        debug!("wrote {} bytes of {} text to {}", bytes.len(), encoding.name(), self.path);
        self.reset_encoding((!bytes.is_empty()).then_some(encoding));
        Ok(true)
    }

    fn append_text(&mut self, text: &str) -> Result<bool, Error> {
        let encoding = self.encoding()?;
        let empty = self.size()? == 0;
        let bytes = encoding::encode(text, encoding, empty);
        self.fs
            .backend()
            .write(&self.full_path(), &bytes, WriteMode::Append)?;
        debug!("appended {} bytes to {}", bytes.len(), self.path);
        if empty {
            self.reset_encoding((!bytes.is_empty()).then_some(encoding));
        }
        Ok(true)
    }

    fn copy_to(&self, destination: &Folder, option: CollisionOption) -> Result<MaybeFile, Error> {
        self.require_exists()?;
        if !destination.exists()? {
            return Err(Error::NotFound(destination.full_path()));
        }
        let target = self.path.with_parent(&destination.full_path());
        self.fs.guard_replace(&target, &self.full_path(), option)?;
        match self.fs.settle(&target, EntryKind::File, option)? {
            Resolution::Fail => Ok(MaybeFile::Null(NullFile::with_encoding(
                target,
                self.fs.default_encoding(),
            ))),
            Resolution::OpenExisting(path) => {
                Ok(MaybeFile::Found(File::new(self.fs.clone(), path)))
            }
            Resolution::Proceed { path, .. } => {
                self.fs
                    .backend()
                    .copy(&self.full_path(), &path.full_path(), EntryKind::File)?;
                info!("copied {} to {path}", self.path);
                Ok(MaybeFile::Found(File::new(self.fs.clone(), path)))
            }
        }
    }

    fn open(&mut self, access: AccessMode, mode: IoMode) -> Result<bool, Error> {
        if self.stream.is_some() {
            return Err(Error::InvalidArgument(format!(
                "{} is already open",
                self.path
            )));
        }
        if mode != IoMode::OpenExisting && !access.can_write() {
            return Err(Error::InvalidArgument(format!(
                "{mode:?} requires write access"
            )));
        }
        let stream = self.fs.backend().open(&self.full_path(), access, mode)?;
        debug!("opened {} with {access:?}/{mode:?}", self.path);
        self.stream = Some(stream);
        self.access_mode = Some(access);
        self.io_mode = Some(mode);
        Ok(true)
    }

    fn close(&mut self) -> Result<(), Error> {
        self.access_mode = None;
        self.io_mode = None;
        let Some(mut stream) = self.stream.take() else {
            return Ok(());
        };
        debug!("closing {}", self.path);
        self.reset_encoding(None);
        stream.flush().map_err(|e| Error::Write {
            what: self.full_path(),
            how: e.to_string(),
        })
    }

    fn stream(&mut self) -> Option<&mut Box<dyn Stream>> {
        self.stream.as_mut()
    }

    fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    fn access_mode(&self) -> Option<AccessMode> {
        self.access_mode
    }

    fn io_mode(&self) -> Option<IoMode> {
        self.io_mode
    }

    fn encoding(&self) -> Result<&'static Encoding, Error> {
        if let Some(encoding) = self.encoding.get() {
            return Ok(*encoding);
        }
        let bytes = match self.read_bytes() {
            Ok(bytes) => bytes,
            Err(Error::NotFound(_)) => return Ok(self.fs.default_encoding()),
            Err(e) => return Err(e),
        };
        Ok(self.detected_encoding(&bytes))
    }

    fn sha256(&self) -> Result<Option<String>, Error> {
        if !self.exists()? {
            return Ok(None);
        }
        let full_path = self.full_path();
        let mut stream =
            self.fs
                .backend()
                .open(&full_path, AccessMode::Read, IoMode::OpenExisting)?;
        Ok(Some(stream.sha256_build(&full_path)?.sha256_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;
    use std::io::Seek;
    use std::io::SeekFrom;

    use encoding_rs::UTF_16LE;
    use encoding_rs::WINDOWS_1252;

    use super::*;
    use crate::FolderOps;
    use crate::FsOptions;
    use crate::MemoryBackend;
    use crate::memory_tree;

    fn tree() -> FileSystem {
        memory_tree(&[
            ("/root/a.txt", false),
            ("/root/a - (1).txt", false),
            ("/root/sub", true),
            ("/other", true),
        ])
    }

    #[test]
    fn create_fail_if_exists() {
        let fs = tree();
        let mut f = fs.file("/root/a.txt");
        assert!(!f.create(CollisionOption::FailIfExists).unwrap());
        let mut g = fs.file("/root/new.txt");
        assert!(g.create(CollisionOption::FailIfExists).unwrap());
        assert!(g.exists().unwrap());
    }

    #[test]
    fn create_generates_unique_name() {
        let fs = tree();
        let mut f = fs.file("/root/a.txt");
        assert!(f.create(CollisionOption::GenerateUniqueName).unwrap());
        assert_eq!(f.file_name(), "a - (2).txt");
        assert!(f.exists().unwrap());
    }

    #[test]
    fn create_replaces_existing() {
        let fs = tree();
        let mut f = fs.file("/root/a.txt");
        f.write_text("old").unwrap();
        assert!(f.create(CollisionOption::ReplaceExisting).unwrap());
        assert_eq!(f.read_bytes().unwrap(), b"");
    }

    #[test]
    fn create_open_if_exists_keeps_content() {
        let fs = tree();
        let mut f = fs.file("/root/a.txt");
        f.write_text("keep").unwrap();
        assert!(f.create(CollisionOption::OpenIfExists).unwrap());
        assert_eq!(f.read_text().unwrap(), "keep");

        let mut fresh = fs.file("/root/fresh.txt");
        assert!(fresh.create(CollisionOption::OpenIfExists).unwrap());
        assert!(fresh.exists().unwrap());
    }

    #[test]
    fn create_without_parent_is_not_found() {
        let fs = tree();
        let mut f = fs.file("/missing/a.txt");
        assert!(matches!(
            f.create(CollisionOption::FailIfExists),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn deleted_file_reports_absence() {
        let fs = tree();
        let mut f = fs.file("/root/a.txt");
        assert!(f.delete().unwrap());
        assert!(!f.exists().unwrap());
        assert!(!f.delete().unwrap());
        assert_eq!(f.size().unwrap(), 0);
        assert_eq!(f.last_modified().unwrap(), chrono::DateTime::<chrono::Utc>::MIN_UTC);
        assert!(f.metadata().unwrap().is_none());
        assert!(f.sha256().unwrap().is_none());
    }

    #[test]
    fn rename_updates_handle() {
        let fs = tree();
        let mut f = fs.file("/root/a.txt");
        assert!(f.rename("b.md", CollisionOption::FailIfExists).unwrap());
        assert_eq!(f.name(), "b");
        assert_eq!(f.extension(), Some("md"));
        assert_eq!(f.full_path(), "/root/b.md");
        assert!(f.exists().unwrap());
        assert!(!fs.file("/root/a.txt").exists().unwrap());
    }

    #[test]
    fn rename_collisions() {
        let fs = tree();
        let mut f = fs.file("/root/a - (1).txt");
        assert!(!f.rename("a.txt", CollisionOption::FailIfExists).unwrap());
        assert!(!f.rename("a.txt", CollisionOption::OpenIfExists).unwrap());
        assert_eq!(f.file_name(), "a - (1).txt");

        assert!(f.rename("a.txt", CollisionOption::GenerateUniqueName).unwrap());
        // The file's own name is still taken while the new one is chosen.
        assert_eq!(f.file_name(), "a - (2).txt");

        f.write_text("winner").unwrap();
        assert!(f.rename("a.txt", CollisionOption::ReplaceExisting).unwrap());
        assert_eq!(fs.file("/root/a.txt").read_text().unwrap(), "winner");
    }

    #[test]
    fn rename_missing_is_not_found() {
        let fs = tree();
        let mut f = fs.file("/root/ghost.txt");
        assert!(matches!(
            f.rename("x.txt", CollisionOption::FailIfExists),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            f.rename("x/y", CollisionOption::FailIfExists),
            Err(Error::InvalidPath { .. })
        ));
    }

    #[test]
    fn case_only_rename_on_insensitive_backend() {
        let fs = FileSystem::new(std::sync::Arc::new(MemoryBackend::case_insensitive()));
        fs.folder("/root")
            .create(CollisionOption::FailIfExists)
            .unwrap();
        let mut f = fs.file("/root/readme.txt");
        f.create(CollisionOption::FailIfExists).unwrap();
        assert!(f.rename("README.txt", CollisionOption::FailIfExists).unwrap());
        let names: Vec<String> = fs
            .folder("/root")
            .get_files("*", crate::SearchOption::TopDirectoryOnly)
            .unwrap()
            .iter()
            .map(|f| f.file_name())
            .collect();
        assert_eq!(names, vec!["README.txt".to_string()]);
    }

    #[test]
    fn move_and_copy() {
        let fs = tree();
        let sub = fs.folder("/root/sub");
        let mut f = fs.file("/root/a.txt");
        f.write_text("payload").unwrap();

        let copy = f.copy_to(&sub, CollisionOption::FailIfExists).unwrap();
        assert!(copy.is_found());
        assert_eq!(copy.full_path(), "/root/sub/a.txt");
        assert_eq!(copy.read_text().unwrap(), "payload");

        let again = f.copy_to(&sub, CollisionOption::FailIfExists).unwrap();
        assert!(!again.is_found());
        let opened = f.copy_to(&sub, CollisionOption::OpenIfExists).unwrap();
        assert_eq!(opened.full_path(), "/root/sub/a.txt");
        let unique = f.copy_to(&sub, CollisionOption::GenerateUniqueName).unwrap();
        assert_eq!(unique.file_name(), "a - (1).txt");

        assert!(!f.move_to(&sub, CollisionOption::FailIfExists).unwrap());
        assert_eq!(f.parent_path(), "/root");
        assert!(f.move_to(&sub, CollisionOption::ReplaceExisting).unwrap());
        assert_eq!(f.full_path(), "/root/sub/a.txt");
        assert!(!fs.file("/root/a.txt").exists().unwrap());
    }

    #[test]
    fn copy_onto_itself() {
        let fs = tree();
        let root = fs.folder("/root");
        let f = fs.file("/root/a.txt");
        assert!(matches!(
            f.copy_to(&root, CollisionOption::ReplaceExisting),
            Err(Error::InvalidArgument(_))
        ));
        let dup = f.copy_to(&root, CollisionOption::GenerateUniqueName).unwrap();
        assert_eq!(dup.file_name(), "a - (2).txt");
    }

    #[test]
    fn move_to_missing_folder_is_not_found() {
        let fs = tree();
        let mut f = fs.file("/root/a.txt");
        let nowhere = fs.folder("/nowhere");
        assert!(matches!(
            f.move_to(&nowhere, CollisionOption::FailIfExists),
            Err(Error::NotFound(p)) if p == "/nowhere"
        ));
    }

    #[test]
    fn stream_lifecycle() {
        let fs = tree();
        let mut f = fs.file("/root/streamed.bin");
        assert!(!f.is_open());
        assert!(f.open(AccessMode::ReadWrite, IoMode::CreateNew).unwrap());
        assert!(f.is_open());
        assert_eq!(f.access_mode(), Some(AccessMode::ReadWrite));
        assert_eq!(f.io_mode(), Some(IoMode::CreateNew));
        assert!(matches!(
            f.open(AccessMode::Read, IoMode::OpenExisting),
            Err(Error::InvalidArgument(_))
        ));
        {
            let stream = f.stream().unwrap();
            stream.write_all(b"hello world").unwrap();
            stream.seek(SeekFrom::Start(6)).unwrap();
            let mut tail = String::new();
            stream.read_to_string(&mut tail).unwrap();
            assert_eq!(tail, "world");
        }
        f.close().unwrap();
        f.close().unwrap();
        assert!(!f.is_open());
        assert!(f.stream().is_none());
        assert_eq!(f.access_mode(), None);
        assert_eq!(f.read_bytes().unwrap(), b"hello world");
    }

    #[test]
    fn dropping_a_handle_flushes_its_stream() {
        let fs = tree();
        {
            let mut f = fs.file("/root/dropped.txt");
            f.open(AccessMode::Write, IoMode::Create).unwrap();
            f.stream().unwrap().write_all(b"flushed").unwrap();
        }
        assert_eq!(fs.file("/root/dropped.txt").read_text().unwrap(), "flushed");
    }

    #[test]
    fn open_modes() {
        let fs = tree();
        let mut f = fs.file("/root/none.txt");
        assert!(matches!(
            f.open(AccessMode::Read, IoMode::OpenExisting),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            f.open(AccessMode::Read, IoMode::Create),
            Err(Error::InvalidArgument(_))
        ));
        let mut g = fs.file("/root/a.txt");
        g.write_text("abc").unwrap();
        g.open(AccessMode::Write, IoMode::Append).unwrap();
        g.stream().unwrap().write_all(b"def").unwrap();
        g.close().unwrap();
        assert_eq!(g.read_text().unwrap(), "abcdef");
        assert!(matches!(
            g.open(AccessMode::Write, IoMode::CreateNew),
            Err(Error::AlreadyExists(_))
        ));
    }

    #[test]
    fn clone_does_not_share_stream() {
        let fs = tree();
        let mut f = fs.file("/root/a.txt");
        f.open(AccessMode::Read, IoMode::OpenExisting).unwrap();
        let g = f.clone();
        assert!(f.is_open());
        assert!(!g.is_open());
        assert_eq!(f, g);
    }

    #[test]
    fn encoding_is_detected_lazily() {
        let options = FsOptions {
            default_encoding: "windows-1252".into(),
            ..Default::default()
        };
        let fs = FileSystem::with_options(
            std::sync::Arc::new(MemoryBackend::new()),
            options,
        )
        .unwrap();
        let mut f = fs.file("/legacy.txt");
        assert_eq!(f.encoding().unwrap(), WINDOWS_1252);

        f.write_bytes(&[b'c', b'a', b'f', 0xE9]).unwrap();
        assert_eq!(f.read_text().unwrap(), "café");
        assert_eq!(f.encoding().unwrap(), WINDOWS_1252);

        f.write_bytes(&encoding::encode("hi", UTF_16LE, true)).unwrap();
        assert_eq!(f.encoding().unwrap(), UTF_16LE);
        f.append_text(" there").unwrap();
        assert_eq!(f.read_text().unwrap(), "hi there");
    }

    #[test]
    fn empty_content_leaves_encoding_undecided() {
        let fs = tree();
        let f = fs.file("/root/a.txt");
        assert_eq!(f.read_text().unwrap(), "");
        // Written behind the handle's back, so only detection can notice.
        fs.backend()
            .write(
                "/root/a.txt",
                &encoding::encode("hi", UTF_16LE, true),
                WriteMode::Overwrite,
            )
            .unwrap();
        assert_eq!(f.encoding().unwrap(), UTF_16LE);
        assert_eq!(f.read_text().unwrap(), "hi");
    }

    #[test]
    fn text_round_trip_and_digest() {
        let fs = tree();
        let mut f = fs.file("/root/a.txt");
        f.write_text("hello").unwrap();
        f.append_text(" world").unwrap();
        assert_eq!(f.read_text().unwrap(), "hello world");
        assert_eq!(f.size().unwrap(), 11);
        assert_eq!(
            f.sha256().unwrap().unwrap(),
            crate::hash::sha256_hex(b"hello world")
        );
    }

    #[test]
    fn missing_content_is_not_found() {
        let fs = tree();
        let f = fs.file("/root/ghost.txt");
        assert!(matches!(f.read_bytes(), Err(Error::NotFound(_))));
        assert_eq!(f.encoding().unwrap(), encoding_rs::UTF_8);
    }
}
