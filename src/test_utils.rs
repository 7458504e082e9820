use std::fs;
use std::path::Path as StdPath;
use std::sync::Arc;

use tempdir::TempDir;

use crate::Backend;
use crate::EntryKind;
use crate::Error;
use crate::FileSystem;
use crate::MemoryBackend;
use crate::NativeBackend;

// Relative paths, contents and whether the entry is a folder.
pub(crate) static TEMP_FILES: &[(&str, &str, bool)] = &[
    ("a.txt", "alpha", false),
    ("b.txt", "bravo", false),
    ("readme.md", "# readme", false),
    ("sub", "", true),
    ("sub/c.txt", "charlie", false),
    ("sub/deep", "", true),
    ("sub/deep/d.log", "delta", false),
    ("empty", "", true),
];

/// A temporary folder populated with a small tree and a file system rooted
/// at it, so `/a.txt` is the `a.txt` inside the folder.
#[derive(Debug)]
pub struct TestRoot {
    /// Root of the temporary test directory.
    pub root: TempDir,
    /// File system over `root`.
    pub fs: FileSystem,

    backend: Arc<NativeBackend>,
}

impl TestRoot {
    /// Creates the temporary folder and its tree.
    pub fn new() -> Result<Self, Error> {
        let root = TempDir::new("entryfs").map_err(|e| Error::Create {
            what: "temporary directory".into(),
            how: e.to_string(),
        })?;
        for (relative_path, contents, is_dir) in TEMP_FILES {
            let path = root.path().join(relative_path);
            let result = if *is_dir {
                fs::create_dir_all(&path)
            } else {
                fs::write(&path, contents)
            };
            result.map_err(|e| Error::Create {
                what: path.display().to_string(),
                how: e.to_string(),
            })?;
        }
        let backend = Arc::new(NativeBackend::rooted(root.path()));
        let fs = FileSystem::new(backend.clone());
        Ok(Self { root, fs, backend })
    }

    /// The backend behind [`TestRoot::fs`].
    pub fn backend(&self) -> &NativeBackend {
        &self.backend
    }

    /// Host path of the entry at `path` within the test root.
    pub fn host_path(&self, path: &str) -> std::path::PathBuf {
        self.root.path().join(StdPath::new(path.trim_start_matches('/')))
    }
}

/// An in-memory file system holding the given `(path, is_folder)` entries.
/// Missing parent folders are created.
pub fn memory_tree(entries: &[(&str, bool)]) -> FileSystem {
    let backend = MemoryBackend::new();
    for (path, is_folder) in entries {
        if *is_folder {
            backend.create(path, EntryKind::Folder).unwrap();
        } else {
            let (parent, _) = crate::path::split(path);
            if !parent.is_empty() {
                backend.create(&parent, EntryKind::Folder).unwrap();
            }
            backend.create(path, EntryKind::File).unwrap();
        }
    }
    FileSystem::new(Arc::new(backend))
}
