//! A backend keeping the whole tree in memory.
//!
//! Files and folders live in separate maps, so a file and a folder may share
//! a path. Keys follow the backend's case policy while nodes remember the
//! spelling they were created with.

use std::collections::BTreeMap;
use std::io;
use std::io::Cursor;
use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;
use std::io::Write;
use std::sync::Arc;
use std::sync::RwLock;
use std::sync::RwLockReadGuard;
use std::sync::RwLockWriteGuard;

use chrono::DateTime;
use chrono::Utc;
use derivative::Derivative;
use log::debug;
use log::warn;

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
use crate::path::SEPARATOR;
use crate::path::combine;
use crate::path::normalize;
use crate::path::split;

#[derive(Debug, Clone)]
struct Node {
    path: String,
    content: Vec<u8>,
    created: DateTime<Utc>,
    accessed: DateTime<Utc>,
    modified: DateTime<Utc>,
}

impl Node {
    fn new(path: &str) -> Self {
        let now = Utc::now();
        Self {
            path: path.to_string(),
            content: Vec::new(),
            created: now,
            accessed: now,
            modified: now,
        }
    }

    fn metadata(&self, kind: EntryKind) -> Metadata {
        Metadata {
            kind,
            size: self.content.len() as u64,
            created: self.created,
            last_accessed: self.accessed,
            last_modified: self.modified,
        }
    }
}

#[derive(Debug)]
struct Tree {
    case_sensitive: bool,
    files: BTreeMap<String, Node>,
    folders: BTreeMap<String, Node>,
}

impl Tree {
    fn new(case_sensitive: bool) -> Self {
        let mut folders = BTreeMap::new();
        folders.insert("/".to_string(), Node::new("/"));
        Self {
            case_sensitive,
            files: BTreeMap::new(),
            folders,
        }
    }

    fn key(&self, path: &str) -> String {
        identity_key(normalize(path), self.case_sensitive)
    }

    fn map(&self, kind: EntryKind) -> &BTreeMap<String, Node> {
        match kind {
            EntryKind::File => &self.files,
            EntryKind::Folder => &self.folders,
        }
    }

    fn map_mut(&mut self, kind: EntryKind) -> &mut BTreeMap<String, Node> {
        match kind {
            EntryKind::File => &mut self.files,
            EntryKind::Folder => &mut self.folders,
        }
    }

    fn get(&self, path: &str, kind: EntryKind) -> Option<&Node> {
        self.map(kind).get(&self.key(path))
    }

    fn contains(&self, path: &str, kind: EntryKind) -> bool {
        self.get(path, kind).is_some()
    }

    fn require(&self, path: &str, kind: EntryKind) -> Result<&Node, Error> {
        self.get(path, kind)
            .ok_or_else(|| Error::NotFound(path.to_string()))
    }

    fn require_parent(&self, path: &str) -> Result<(), Error> {
        let (parent, _) = split(path);
        if parent.is_empty() || self.contains(&parent, EntryKind::Folder) {
            Ok(())
        } else {
            Err(Error::NotFound(parent))
        }
    }

    fn require_vacant(&self, path: &str, kind: EntryKind) -> Result<(), Error> {
        if self.contains(path, kind) {
            Err(Error::AlreadyExists(path.to_string()))
        } else {
            Ok(())
        }
    }

    fn insert(&mut self, path: &str, kind: EntryKind, node: Node) {
        let key = self.key(path);
        self.map_mut(kind).insert(key, node);
    }

    fn create_folders(&mut self, path: &str) {
        let normalized = normalize(path);
        let mut current = if normalized.starts_with(SEPARATOR) {
            "/".to_string()
        } else {
            String::new()
        };
        for component in normalized.split(SEPARATOR).filter(|c| !c.is_empty()) {
            current = combine(&current, component);
            if !self.contains(&current, EntryKind::Folder) {
                let node = Node::new(&current);
                self.insert(&current, EntryKind::Folder, node);
            }
        }
    }

    fn is_below(&self, key: &str, folder_key: &str) -> bool {
        key.strip_prefix(folder_key)
            .is_some_and(|rest| rest.starts_with(SEPARATOR) || folder_key.ends_with(SEPARATOR))
            && key != folder_key
    }

    /// Removes the folder at `path` and everything below it, returning the
    /// removed nodes.
    fn take_subtree(&mut self, path: &str) -> Vec<(EntryKind, Node)> {
        let folder_key = self.key(path);
        let mut taken = Vec::new();
        for kind in [EntryKind::Folder, EntryKind::File] {
            let keys: Vec<String> = self
                .map(kind)
                .keys()
                .filter(|k| *k == &folder_key || self.is_below(k, &folder_key))
                .cloned()
                .collect();
            for key in keys {
                if let Some(node) = self.map_mut(kind).remove(&key) {
                    taken.push((kind, node));
                }
            }
        }
        taken
    }

    /// Clones the folder at `path` and everything below it.
    fn clone_subtree(&self, path: &str) -> Vec<(EntryKind, Node)> {
        let folder_key = self.key(path);
        let mut cloned = Vec::new();
        for kind in [EntryKind::Folder, EntryKind::File] {
            for (key, node) in self.map(kind) {
                if *key == folder_key || self.is_below(key, &folder_key) {
                    cloned.push((kind, node.clone()));
                }
            }
        }
        cloned
    }

    fn place_subtree(&mut self, nodes: Vec<(EntryKind, Node)>, from: &str, to: &str) {
        let depth = components(from).len();
        for (kind, mut node) in nodes {
            let rest = components(&node.path).split_off(depth);
            node.path = rest.iter().fold(to.to_string(), |acc, c| combine(&acc, c));
            let path = node.path.clone();
            self.insert(&path, kind, node);
        }
    }
}

fn components(path: &str) -> Vec<String> {
    path.split(SEPARATOR)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

/// Stores everything in process memory; nothing survives the backend.
///
/// Clones share the same tree.
#[derive(Debug, Clone)]
pub struct MemoryBackend {
    tree: Arc<RwLock<Tree>>,
    case_sensitive: bool,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    /// An empty, case-sensitive tree holding only the root folder `/`.
    pub fn new() -> Self {
        Self::with_case_policy(true)
    }

    /// An empty tree comparing paths without regard to case.
    pub fn case_insensitive() -> Self {
        Self::with_case_policy(false)
    }

    fn with_case_policy(case_sensitive: bool) -> Self {
        Self {
            tree: Arc::new(RwLock::new(Tree::new(case_sensitive))),
            case_sensitive,
        }
    }

    fn read_tree(&self, path: &str) -> Result<RwLockReadGuard<'_, Tree>, Error> {
        self.tree.read().map_err(|e| Error::Read {
            what: path.to_string(),
            how: e.to_string(),
        })
    }

    fn write_tree(&self, path: &str) -> Result<RwLockWriteGuard<'_, Tree>, Error> {
        self.tree.write().map_err(|e| Error::Write {
            what: path.to_string(),
            how: e.to_string(),
        })
    }
}

impl Backend for MemoryBackend {
    fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    fn stat(&self, path: &str, kind: EntryKind) -> Result<Option<Metadata>, Error> {
        let tree = self.read_tree(path)?;
        Ok(tree.get(path, kind).map(|node| node.metadata(kind)))
    }

    fn list(&self, path: &str) -> Result<Vec<Listing>, Error> {
        let tree = self.read_tree(path)?;
        tree.require(path, EntryKind::Folder)?;
        let folder_key = tree.key(path);
        let mut listing = Vec::new();
        for kind in [EntryKind::File, EntryKind::Folder] {
            for node in tree.map(kind).values() {
                let (parent, name) = split(&node.path);
                if !parent.is_empty() && tree.key(&parent) == folder_key {
                    listing.push(Listing { name, kind });
                }
            }
        }
        listing.sort_by(|a, b| (&a.name, a.kind).cmp(&(&b.name, b.kind)));
        Ok(listing)
    }

    fn read(&self, path: &str) -> Result<Vec<u8>, Error> {
        let tree = self.read_tree(path)?;
        Ok(tree.require(path, EntryKind::File)?.content.clone())
    }

    fn write(&self, path: &str, bytes: &[u8], mode: WriteMode) -> Result<(), Error> {
        let mut tree = self.write_tree(path)?;
        tree.require_parent(path)?;
        let mut node = tree
            .get(path, EntryKind::File)
            .cloned()
            .unwrap_or_else(|| Node::new(&normalize(path)));
        match mode {
            WriteMode::Overwrite => node.content = bytes.to_vec(),
            WriteMode::Append => node.content.extend_from_slice(bytes),
        }
        node.modified = Utc::now();
        tree.insert(path, EntryKind::File, node);
        Ok(())
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
        let mut tree = self.write_tree(path)?;
        let existing = tree.get(path, EntryKind::File).map(|n| n.content.clone());
        let content = match (mode, existing) {
            (IoMode::OpenExisting, None) => return Err(Error::NotFound(path.to_string())),
            (IoMode::CreateNew, Some(_)) => return Err(Error::AlreadyExists(path.to_string())),
            (IoMode::OpenExisting | IoMode::OpenOrCreate | IoMode::Append, Some(content)) => {
                content
            }
            (_, existing) => {
                tree.require_parent(path)?;
                let mut node = tree
                    .get(path, EntryKind::File)
                    .cloned()
                    .unwrap_or_else(|| Node::new(&normalize(path)));
                node.content.clear();
                node.modified = Utc::now();
                if existing.is_some() {
                    debug!("truncating {path}");
                }
                tree.insert(path, EntryKind::File, node);
                Vec::new()
            }
        };
        let mut cursor = Cursor::new(content);
        if mode == IoMode::Append {
            cursor.seek(SeekFrom::End(0)).map_err(|e| Error::Read {
                what: path.to_string(),
                how: e.to_string(),
            })?;
        }
        Ok(Box::new(MemoryStream {
            tree: Arc::clone(&self.tree),
            path: normalize(path),
            cursor,
            access,
            append: mode == IoMode::Append,
            dirty: false,
        }))
    }

    fn create(&self, path: &str, kind: EntryKind) -> Result<(), Error> {
        let mut tree = self.write_tree(path)?;
        match kind {
            EntryKind::File => {
                tree.require_parent(path)?;
                tree.require_vacant(path, kind)?;
                tree.insert(path, kind, Node::new(&normalize(path)));
            }
            EntryKind::Folder => tree.create_folders(path),
        }
        Ok(())
    }

    fn delete(&self, path: &str, kind: EntryKind) -> Result<(), Error> {
        let mut tree = self.write_tree(path)?;
        tree.require(path, kind)?;
        match kind {
            EntryKind::File => {
                let key = tree.key(path);
                tree.files.remove(&key);
            }
            EntryKind::Folder => {
                if normalize(path) == "/" {
                    return Err(Error::InvalidArgument(
                        "the root folder cannot be deleted".to_string(),
                    ));
                }
                let removed = tree.take_subtree(path);
                debug!("removed {} nodes below {path}", removed.len());
            }
        }
        Ok(())
    }

    fn rename(&self, from: &str, to: &str, kind: EntryKind) -> Result<(), Error> {
        let mut tree = self.write_tree(from)?;
        tree.require(from, kind)?;
        let (from_key, to_key) = (tree.key(from), tree.key(to));
        if from_key != to_key {
            tree.require_vacant(to, kind)?;
        }
        tree.require_parent(to)?;
        let to = normalize(to);
        match kind {
            EntryKind::File => {
                if let Some(mut node) = tree.files.remove(&from_key) {
                    node.path = to.clone();
                    tree.insert(&to, kind, node);
                }
            }
            EntryKind::Folder => {
                if tree.is_below(&to_key, &from_key) {
                    return Err(Error::InvalidArgument(format!(
                        "cannot move {from} below itself"
                    )));
                }
                let nodes = tree.take_subtree(from);
                tree.place_subtree(nodes, from, &to);
            }
        }
        Ok(())
    }

    fn copy(&self, from: &str, to: &str, kind: EntryKind) -> Result<(), Error> {
        let mut tree = self.write_tree(from)?;
        tree.require(from, kind)?;
        tree.require_vacant(to, kind)?;
        tree.require_parent(to)?;
        let to = normalize(to);
        match kind {
            EntryKind::File => {
                let mut node = tree.require(from, kind)?.clone();
                let now = Utc::now();
                node.path = to.clone();
                node.created = now;
                node.accessed = now;
                node.modified = now;
                tree.insert(&to, kind, node);
            }
            EntryKind::Folder => {
                if tree.is_below(&tree.key(&to), &tree.key(from)) {
                    return Err(Error::InvalidArgument(format!(
                        "cannot copy {from} below itself"
                    )));
                }
                let nodes = tree.clone_subtree(from);
                tree.place_subtree(nodes, from, &to);
            }
        }
        Ok(())
    }
}

/// A stream over a snapshot of a file's content. Writes reach the tree on
/// `flush` and when the stream is dropped.
#[derive(Derivative)]
#[derivative(Debug)]
struct MemoryStream {
    #[derivative(Debug = "ignore")]
    tree: Arc<RwLock<Tree>>,
    path: String,
    cursor: Cursor<Vec<u8>>,
    access: AccessMode,
    append: bool,
    dirty: bool,
}

fn denied(what: &str) -> io::Error {
    io::Error::new(io::ErrorKind::PermissionDenied, what.to_string())
}

impl Read for MemoryStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if !self.access.can_read() {
            return Err(denied("stream is not readable"));
        }
        self.cursor.read(buf)
    }
}

impl Write for MemoryStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.access.can_write() {
            return Err(denied("stream is not writable"));
        }
        if self.append {
            self.cursor.seek(SeekFrom::End(0))?;
        }
        self.dirty = true;
        self.cursor.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.dirty {
            return Ok(());
        }
        let mut tree = self
            .tree
            .write()
            .map_err(|e| io::Error::other(e.to_string()))?;
        let mut node = tree
            .get(&self.path, EntryKind::File)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, self.path.clone()))?;
        node.content = self.cursor.get_ref().clone();
        node.modified = Utc::now();
        tree.insert(&self.path, EntryKind::File, node);
        self.dirty = false;
        Ok(())
    }
}

impl Seek for MemoryStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.cursor.seek(pos)
    }
}

impl Drop for MemoryStream {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            warn!("lost writes to {}: {e}", self.path);
        }
    }
}
