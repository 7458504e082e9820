use std::fs;
use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path as StdPath;
use std::path::PathBuf;

use log::debug;
use log::info;

use super::metadata::kind_of;
use crate::AccessMode;
use crate::Backend;
use crate::EntryKind;
use crate::IoMode;
use crate::Listing;
use crate::Metadata;
use crate::Stream;
use crate::WriteMode;
use crate::entry::identity_key;
use crate::errors::Error;
use crate::errors::Op;
use crate::path::normalize;

/// The host's file system through `std::fs`.
///
/// Paths are used as given, or resolved below a base folder for a rooted
/// backend.
#[derive(Debug, Clone)]
pub struct NativeBackend {
    base: Option<PathBuf>,
    case_sensitive: bool,
}

impl Default for NativeBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl NativeBackend {
    /// Backend over the whole host file system.
    pub fn new() -> Self {
        Self {
            base: None,
            case_sensitive: !cfg!(any(windows, target_os = "macos")),
        }
    }

    /// Backend that resolves every path below `base`, so `/a.txt` is
    /// `base/a.txt`.
    pub fn rooted<P: AsRef<StdPath>>(base: P) -> Self {
        Self {
            base: Some(base.as_ref().to_path_buf()),
            ..Self::new()
        }
    }

    fn native(&self, path: &str) -> PathBuf {
        match &self.base {
            Some(base) => base.join(path.trim_start_matches('/')),
            None => PathBuf::from(path),
        }
    }

    fn require(&self, path: &str, kind: EntryKind, op: Op) -> Result<PathBuf, Error> {
        let native = self.native(path);
        match kind_at(&native) {
            Ok(Some(found)) if found == kind => Ok(native),
            Ok(_) => Err(Error::NotFound(path.to_string())),
            Err(e) => Err(Error::from_io(op, path, e)),
        }
    }

    fn require_vacant(&self, path: &str, op: Op) -> Result<PathBuf, Error> {
        let native = self.native(path);
        match kind_at(&native) {
            Ok(None) => Ok(native),
            Ok(Some(_)) => Err(Error::AlreadyExists(path.to_string())),
            Err(e) => Err(Error::from_io(op, path, e)),
        }
    }

    fn refuse_root(&self, path: &str) -> Result<(), Error> {
        if normalize(path) == "/" {
            return Err(Error::InvalidArgument(format!(
                "refusing to touch the root folder {path}"
            )));
        }
        Ok(())
    }
}

/// Kind of the entry at `path`, following symlinks. Only a missing entry
/// is `None`; any other platform error is returned.
fn kind_at(path: &StdPath) -> io::Result<Option<EntryKind>> {
    match fs::metadata(path) {
        Ok(m) => Ok(Some(kind_of(&m))),
        Err(e) if is_missing(&e) => Ok(None),
        Err(e) => Err(e),
    }
}

fn is_missing(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    )
}

fn copy_dir_recursive(src: &StdPath, dst: &StdPath) -> io::Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());
        if src_path.is_dir() {
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

fn copy_entry(src: &StdPath, dst: &StdPath, kind: EntryKind) -> io::Result<()> {
    match kind {
        EntryKind::File => fs::copy(src, dst).map(|_| ()),
        EntryKind::Folder => copy_dir_recursive(src, dst),
    }
}

fn remove_entry(path: &StdPath, kind: EntryKind) -> io::Result<()> {
    match kind {
        EntryKind::File => fs::remove_file(path),
        EntryKind::Folder => fs::remove_dir_all(path),
    }
}

impl Backend for NativeBackend {
    fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    fn shared_namespace(&self) -> bool {
        true
    }

    fn stat(&self, path: &str, kind: EntryKind) -> Result<Option<Metadata>, Error> {
        match fs::metadata(self.native(path)) {
            Ok(m) if kind_of(&m) == kind => Ok(Some(Metadata::from_std(kind, &m))),
            Ok(_) => Ok(None),
            Err(e) if is_missing(&e) => Ok(None),
            Err(e) => Err(Error::from_io(Op::Read, path, e)),
        }
    }

    fn list(&self, path: &str) -> Result<Vec<Listing>, Error> {
        let native = self.require(path, EntryKind::Folder, Op::Read)?;
        let entries = fs::read_dir(&native).map_err(|e| Error::from_io(Op::Read, path, e))?;
        let mut listing = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Error::from_io(Op::Read, path, e))?;
            // Follows symlinks; dangling links are skipped.
            let Some(kind) =
                kind_at(&entry.path()).map_err(|e| Error::from_io(Op::Read, path, e))?
            else {
                debug!("skipping dangling entry {}", entry.path().display());
                continue;
            };
            listing.push(Listing {
                name: entry.file_name().to_string_lossy().into_owned(),
                kind,
            });
        }
        listing.sort_by(|a, b| (&a.name, a.kind).cmp(&(&b.name, b.kind)));
        Ok(listing)
    }

    fn read(&self, path: &str) -> Result<Vec<u8>, Error> {
        let native = self.require(path, EntryKind::File, Op::Read)?;
        fs::read(native).map_err(|e| Error::from_io(Op::Read, path, e))
    }

    fn write(&self, path: &str, bytes: &[u8], mode: WriteMode) -> Result<(), Error> {
        let native = self.native(path);
        let result = match mode {
            WriteMode::Overwrite => fs::write(&native, bytes),
            WriteMode::Append => OpenOptions::new()
                .append(true)
                .create(true)
                .open(&native)
                .and_then(|mut f| f.write_all(bytes)),
        };
        result.map_err(|e| Error::from_io(Op::Write, path, e))
    }

    fn open(
        &self,
        path: &str,
        access: AccessMode,
        mode: IoMode,
    ) -> Result<Box<dyn Stream>, Error> {
        if mode != IoMode::OpenExisting && !access.can_write() {
            return Err(Error::InvalidArgument(format!(
                "{mode:?} requires write access"
            )));
        }
        let mut options = OpenOptions::new();
        options.read(access.can_read()).write(access.can_write());
        match mode {
            IoMode::OpenExisting => &mut options,
            IoMode::OpenOrCreate => options.create(true),
            IoMode::Create => options.create(true).truncate(true),
            IoMode::CreateNew => options.create_new(true),
            IoMode::Append => options.append(true).create(true),
        };
        let op = if access.can_write() { Op::Write } else { Op::Read };
        let file = options
            .open(self.native(path))
            .map_err(|e| Error::from_io(op, path, e))?;
        Ok(Box::new(file))
    }

    fn create(&self, path: &str, kind: EntryKind) -> Result<(), Error> {
        let native = self.native(path);
        let result = match kind {
            EntryKind::File => OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&native)
                .map(|_| ()),
            EntryKind::Folder => fs::create_dir_all(&native),
        };
        result.map_err(|e| Error::from_io(Op::Create, path, e))
    }

    fn delete(&self, path: &str, kind: EntryKind) -> Result<(), Error> {
        self.refuse_root(path)?;
        let native = self.require(path, kind, Op::Delete)?;
        remove_entry(&native, kind).map_err(|e| Error::from_io(Op::Delete, path, e))
    }

    fn rename(&self, from: &str, to: &str, kind: EntryKind) -> Result<(), Error> {
        self.refuse_root(from)?;
        let source = self.require(from, kind, Op::Move)?;
        let same_entry = identity_key(normalize(from), self.case_sensitive)
            == identity_key(normalize(to), self.case_sensitive);
        let target = if same_entry {
            self.native(to)
        } else {
            self.require_vacant(to, Op::Move)?
        };
        match fs::rename(&source, &target) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
                info!("cross-device move, copying {from} to {to}");
                copy_entry(&source, &target, kind)
                    .and_then(|_| remove_entry(&source, kind))
                    .map_err(|e| Error::from_io(Op::Move, from, e))
            }
            Err(e) => Err(Error::from_io(Op::Move, from, e)),
        }
    }

    fn copy(&self, from: &str, to: &str, kind: EntryKind) -> Result<(), Error> {
        let source = self.require(from, kind, Op::Copy)?;
        let target = self.require_vacant(to, Op::Copy)?;
        copy_entry(&source, &target, kind).map_err(|e| Error::from_io(Op::Copy, from, e))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;
    use std::io::Seek;
    use std::io::SeekFrom;

    use super::*;
    use crate::CollisionOption;
    use crate::EntryOps;
    use crate::FileOps;
    use crate::FolderOps;
    use crate::SearchOption;
    use crate::TestRoot;

    #[test]
    fn stat_distinguishes_kinds() {
        let t = TestRoot::new().unwrap();
        let b = t.backend();
        let m = b.stat("/a.txt", EntryKind::File).unwrap().unwrap();
        assert_eq!(m.kind, EntryKind::File);
        assert_eq!(m.size, "alpha".len() as u64);
        assert!(b.stat("/a.txt", EntryKind::Folder).unwrap().is_none());
        assert!(b.stat("/sub", EntryKind::Folder).unwrap().is_some());
        assert!(b.stat("/missing", EntryKind::File).unwrap().is_none());
        assert!(b.stat("/a.txt/below", EntryKind::File).unwrap().is_none());
    }

    #[test]
    fn listing_is_sorted() {
        let t = TestRoot::new().unwrap();
        let names: Vec<String> = t
            .backend()
            .list("/")
            .unwrap()
            .into_iter()
            .map(|l| l.name)
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "empty", "readme.md", "sub"]);
        assert!(matches!(
            t.backend().list("/nope"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn create_and_collide() {
        let t = TestRoot::new().unwrap();
        let b = t.backend();
        b.create("/new.txt", EntryKind::File).unwrap();
        assert!(matches!(
            b.create("/new.txt", EntryKind::File),
            Err(Error::AlreadyExists(_))
        ));
        assert!(matches!(
            b.create("/none/new.txt", EntryKind::File),
            Err(Error::NotFound(_))
        ));
        b.create("/x/y/z", EntryKind::Folder).unwrap();
        b.create("/x/y/z", EntryKind::Folder).unwrap();
        assert!(t.root.path().join("x/y/z").is_dir());
    }

    #[test]
    fn write_modes() {
        let t = TestRoot::new().unwrap();
        let b = t.backend();
        b.write("/w.txt", b"one", WriteMode::Overwrite).unwrap();
        b.write("/w.txt", b"two", WriteMode::Append).unwrap();
        assert_eq!(b.read("/w.txt").unwrap(), b"onetwo");
        assert!(matches!(b.read("/sub"), Err(Error::NotFound(_))));
    }

    #[test]
    fn rename_copy_delete() {
        let t = TestRoot::new().unwrap();
        let b = t.backend();
        assert!(matches!(
            b.rename("/a.txt", "/b.txt", EntryKind::File),
            Err(Error::AlreadyExists(_))
        ));
        b.rename("/a.txt", "/c.txt", EntryKind::File).unwrap();
        assert!(!t.root.path().join("a.txt").exists());

        b.copy("/sub", "/copy", EntryKind::Folder).unwrap();
        assert!(t.root.path().join("copy/deep/d.log").is_file());
        assert!(matches!(
            b.copy("/sub", "/copy", EntryKind::Folder),
            Err(Error::AlreadyExists(_))
        ));

        b.delete("/copy", EntryKind::Folder).unwrap();
        assert!(!t.root.path().join("copy").exists());
        assert!(matches!(
            b.delete("/copy", EntryKind::Folder),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            b.delete("/", EntryKind::Folder),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn streams_are_files() {
        let t = TestRoot::new().unwrap();
        let b = t.backend();
        let mut s = b.open("/s.bin", AccessMode::ReadWrite, IoMode::CreateNew).unwrap();
        s.write_all(b"0123456789").unwrap();
        s.seek(SeekFrom::Start(5)).unwrap();
        let mut rest = String::new();
        s.read_to_string(&mut rest).unwrap();
        assert_eq!(rest, "56789");
        drop(s);
        assert!(matches!(
            b.open("/s.bin", AccessMode::Write, IoMode::CreateNew),
            Err(Error::AlreadyExists(_))
        ));
        assert!(matches!(
            b.open("/none.bin", AccessMode::Read, IoMode::OpenExisting),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            b.open("/s.bin", AccessMode::Read, IoMode::Append),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn files_and_folders_share_names() {
        let t = TestRoot::new().unwrap();
        let mut file = t.fs.file("/sub");
        assert!(!file.create(CollisionOption::FailIfExists).unwrap());
        assert!(!file.create(CollisionOption::OpenIfExists).unwrap());
        assert!(file.create(CollisionOption::GenerateUniqueName).unwrap());
        assert_eq!(file.full_path(), "/sub - (1)");
        assert!(t.host_path("/sub - (1)").is_file());

        let mut folder = t.fs.folder("/a.txt");
        assert!(!folder.create(CollisionOption::FailIfExists).unwrap());
        assert!(folder.create(CollisionOption::GenerateUniqueName).unwrap());
        assert_eq!(folder.full_path(), "/a.txt - (1)");
        assert!(t.host_path("/a.txt - (1)").is_dir());

        let mut replaced = t.fs.folder("/b.txt");
        assert!(replaced.create(CollisionOption::ReplaceExisting).unwrap());
        assert!(t.host_path("/b.txt").is_dir());
    }

    #[test]
    fn replacing_the_folder_holding_a_file_is_refused() {
        let t = TestRoot::new().unwrap();
        t.fs.folder("/sub")
            .create_file("sub", CollisionOption::FailIfExists)
            .unwrap();
        let root = t.fs.folder("/");
        let mut nested = t.fs.file("/sub/sub");
        assert!(matches!(
            nested.copy_to(&root, CollisionOption::ReplaceExisting),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            nested.move_to(&root, CollisionOption::ReplaceExisting),
            Err(Error::InvalidArgument(_))
        ));
        assert!(t.host_path("/sub/sub").is_file());
        assert!(t.host_path("/sub/deep/d.log").is_file());
        assert!(nested.move_to(&root, CollisionOption::GenerateUniqueName).unwrap());
        assert_eq!(nested.full_path(), "/sub - (1)");
    }

    #[cfg(unix)]
    #[test]
    fn platform_failures_are_not_missing_entries() {
        let t = TestRoot::new().unwrap();
        let long = format!("/{}", "n".repeat(300));
        let mut file = t.fs.file(&long);
        assert!(file.exists().unwrap_err().is_backend_failure());
        assert!(file.read_bytes().unwrap_err().is_backend_failure());
        assert!(file.delete().unwrap_err().is_backend_failure());
        assert!(t.backend().read(&long).unwrap_err().is_backend_failure());
        assert!(t.backend().list(&long).unwrap_err().is_backend_failure());
    }

    #[test]
    fn entry_model_over_native() {
        let t = TestRoot::new().unwrap();
        let mut a = t.fs.file("/a.txt");
        assert_eq!(a.read_text().unwrap(), "alpha");
        assert!(a.create(CollisionOption::GenerateUniqueName).unwrap());
        assert_eq!(a.file_name(), "a - (1).txt");
        assert!(t.host_path("/a - (1).txt").is_file());

        let logs = t
            .fs
            .folder("/")
            .get_files("*.log", SearchOption::AllDirectories)
            .unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].full_path(), "/sub/deep/d.log");

        let sub = t.fs.folder("/sub");
        let empty = t.fs.folder("/empty");
        let copy = sub.copy_to(&empty, CollisionOption::FailIfExists).unwrap();
        assert_eq!(copy.full_path(), "/empty/sub");
        assert!(t.host_path("/empty/sub/deep/d.log").is_file());
        assert_eq!(
            t.fs.file("/sub/c.txt").sha256().unwrap().unwrap(),
            crate::hash::sha256_hex(b"charlie")
        );
    }
}
