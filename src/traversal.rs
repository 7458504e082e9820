use std::collections::VecDeque;

use derivative::Derivative;
use log::debug;
use log::trace;
#[cfg(feature = "json_schema")]
use schemars::JsonSchema;
use serde::Deserialize;
use serde::Serialize;

use crate::Entry;
use crate::EntryKind;
use crate::File;
use crate::FileSystem;
use crate::Folder;
use crate::Listing;
use crate::errors::Error;
use crate::path::EntryPath;
use crate::pattern::NamePattern;

/// Which part of a folder tree a search covers.
#[cfg_attr(feature = "json_schema", derive(JsonSchema))]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Hash, Eq, Default)]
pub enum SearchOption {
    /// The folder's children and everything below them.
    AllDirectories,
    /// Only the folder's immediate children.
    #[default]
    TopDirectoryOnly,
    /// Everything below the folder's child folders, but not the folder's own
    /// children.
    SubDirectoriesOnly,
}

/// What a traversal yields: a name pattern, the wanted kinds and the scope.
#[cfg_attr(feature = "json_schema", derive(JsonSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchQuery {
    pattern: NamePattern,
    scope: SearchOption,
    want_files: bool,
    want_folders: bool,
}

impl SearchQuery {
    fn new(pattern: NamePattern, want_files: bool, want_folders: bool) -> Self {
        Self {
            pattern,
            scope: SearchOption::default(),
            want_files,
            want_folders,
        }
    }

    /// Files whose name matches the glob `pattern`.
    pub fn files(pattern: &str) -> Self {
        Self::new(NamePattern::glob(pattern), true, false)
    }

    /// Folders whose name matches the glob `pattern`.
    pub fn folders(pattern: &str) -> Self {
        Self::new(NamePattern::glob(pattern), false, true)
    }

    /// Files and folders whose name matches the glob `pattern`.
    pub fn entries(pattern: &str) -> Self {
        Self::new(NamePattern::glob(pattern), true, true)
    }

    /// Files and folders called exactly `name`.
    pub fn named(name: &str) -> Self {
        Self::new(NamePattern::exact(name), true, true)
    }

    /// Sets the scope.
    pub fn scope(mut self, scope: SearchOption) -> Self {
        self.scope = scope;
        self
    }

    /// Makes glob matching ignore case.
    pub fn ignore_case(mut self, ignore: bool) -> Self {
        self.pattern = self.pattern.ignoring_case(ignore);
        self
    }

    /// The scope in effect.
    pub fn search_option(&self) -> SearchOption {
        self.scope
    }

    fn wants(&self, listing: &Listing, case_sensitive: bool) -> bool {
        let kind_ok = match listing.kind {
            EntryKind::File => self.want_files,
            EntryKind::Folder => self.want_folders,
        };
        kind_ok && self.pattern.matches(&listing.name, case_sensitive)
    }
}

/// Lazy depth-first search below a folder.
///
/// Each folder is listed only when the iterator reaches it, and its matches
/// are yielded before anything below it. A missing start folder yields
/// nothing. A backend error is yielded once and ends the traversal.
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct Traversal {
    fs: Option<FileSystem>,
    root: String,
    query: SearchQuery,
    // Folders still to list, with whether their own children may match.
    pending: Vec<(String, bool)>,
    ready: VecDeque<Entry>,
    started: bool,
}

impl Traversal {
    pub(crate) fn new(fs: FileSystem, root: String, query: SearchQuery) -> Self {
        let own_children = query.scope != SearchOption::SubDirectoriesOnly;
        Self {
            fs: Some(fs),
            pending: vec![(root.clone(), own_children)],
            root,
            query,
            ready: VecDeque::new(),
            started: false,
        }
    }

    /// A traversal that yields nothing.
    pub fn empty() -> Self {
        Self {
            fs: None,
            root: String::new(),
            query: SearchQuery::entries("*"),
            pending: Vec::new(),
            ready: VecDeque::new(),
            started: true,
        }
    }

    fn finish(&mut self) {
        self.fs = None;
        self.pending.clear();
    }

    fn expand(&mut self, fs: &FileSystem, folder: &str, own_children: bool) -> Result<(), Error> {
        let listing = match fs.backend().list(folder) {
            Ok(listing) => listing,
            // Removed since its parent was listed.
            Err(Error::NotFound(_)) if folder != self.root => return Ok(()),
            Err(e) => return Err(e),
        };
        trace!("listed {} children of {folder}", listing.len());
        let case_sensitive = fs.case_sensitive();
        let descend = self.query.scope != SearchOption::TopDirectoryOnly;
        let mut subfolders = Vec::new();
        for child in listing {
            if own_children && self.query.wants(&child, case_sensitive) {
                self.ready.push_back(match child.kind {
                    EntryKind::File => {
                        Entry::File(File::new(fs.clone(), EntryPath::file(folder, &child.name)))
                    }
                    EntryKind::Folder => Entry::Folder(Folder::new(
                        fs.clone(),
                        EntryPath::folder(folder, &child.name),
                    )),
                });
            }
            if descend && child.kind == EntryKind::Folder {
                subfolders.push(EntryPath::folder(folder, &child.name).full_path());
            }
        }
        // Reversed so the first listed subfolder is visited first.
        self.pending
            .extend(subfolders.into_iter().rev().map(|path| (path, true)));
        Ok(())
    }
}

impl Iterator for Traversal {
    type Item = Result<Entry, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.ready.pop_front() {
                return Some(Ok(entry));
            }
            let fs = self.fs.clone()?;
            if !self.started {
                self.started = true;
                match fs.backend().stat(&self.root, EntryKind::Folder) {
                    Ok(Some(_)) => {}
                    Ok(None) => {
                        debug!("nothing to traverse, {} does not exist", self.root);
                        self.finish();
                        return None;
                    }
                    Err(e) => {
                        self.finish();
                        return Some(Err(e));
                    }
                }
            }
            let Some((folder, own_children)) = self.pending.pop() else {
                self.finish();
                return None;
            };
            if let Err(e) = self.expand(&fs, &folder, own_children) {
                debug!("traversal of {} stopped at {folder}: {e}", self.root);
                self.finish();
                return Some(Err(e));
            }
        }
    }
}
