//! Path strings and their decomposition into parent, name and extension.

use std::fmt::Display;

#[cfg(feature = "json_schema")]
use schemars::JsonSchema;
use serde::Deserialize;
use serde::Serialize;

use crate::errors::Error;

/// The canonical separator every path is normalized to.
pub const SEPARATOR: char = '/';

const ROOT: &str = "/";

/// Normalizes a path string.
///
/// Both `\` and `/` are accepted as separators and rewritten to `/`.
/// Repeated separators and `.` components collapse, trailing separators are
/// dropped. `..` is kept as is; resolving it is up to the backend.
pub fn normalize(path: &str) -> String {
    let unified = path.replace('\\', "/");
    let absolute = unified.starts_with(SEPARATOR);
    let components: Vec<&str> = unified
        .split(SEPARATOR)
        .filter(|c| !c.is_empty() && *c != ".")
        .collect();
    let joined = components.join(ROOT);
    if absolute {
        format!("{ROOT}{joined}")
    } else {
        joined
    }
}

/// Joins `name` to `parent` with exactly one separator.
pub fn combine(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else if name.is_empty() {
        parent.to_string()
    } else if parent.ends_with(SEPARATOR) {
        format!("{parent}{name}")
    } else {
        format!("{parent}{SEPARATOR}{name}")
    }
}

/// Splits a path into its normalized parent and final component.
///
/// The root `/` has an empty parent and is its own final component.
pub fn split(path: &str) -> (String, String) {
    let normalized = normalize(path);
    if normalized == ROOT {
        return (String::new(), normalized);
    }
    match normalized.rfind(SEPARATOR) {
        Some(0) => (ROOT.to_string(), normalized[1..].to_string()),
        Some(i) => (normalized[..i].to_string(), normalized[i + 1..].to_string()),
        None => (String::new(), normalized),
    }
}

/// Splits a file name at its last `.` into stem and extension.
///
/// A leading dot does not start an extension (`.bashrc`), a trailing dot
/// yields an empty one (`a.` -> `("a", Some(""))`).
pub fn split_extension(file_name: &str) -> (&str, Option<&str>) {
    if file_name.chars().all(|c| c == '.') {
        return (file_name, None);
    }
    match file_name.rfind('.') {
        None | Some(0) => (file_name, None),
        Some(i) => (&file_name[..i], Some(&file_name[i + 1..])),
    }
}

/// Rejects names that cannot be a single path component.
pub(crate) fn validate_name(name: &str) -> Result<(), Error> {
    if name.is_empty() || name == "." || name == ".." {
        return Err(Error::InvalidPath {
            what: format!("{name:?} is not an entry name"),
        });
    }
    if name.contains('/') || name.contains('\\') {
        return Err(Error::InvalidPath {
            what: format!("{name} contains a separator"),
        });
    }
    Ok(())
}

/// The decomposed location of an entry: parent folder, name and, for files,
/// the extension.
///
/// `EntryPath` never touches a backend; it is pure string bookkeeping.
#[cfg_attr(feature = "json_schema", derive(JsonSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Hash, Eq)]
pub struct EntryPath {
    parent: String,
    name: String,
    extension: Option<String>,
}

impl Display for EntryPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.full_path())
    }
}

impl EntryPath {
    /// Decomposes `path` as a file: the last component is split into stem
    /// and extension.
    pub fn parse_file(path: &str) -> Self {
        let (parent, file_name) = split(path);
        Self::file(&parent, &file_name)
    }

    /// Decomposes `path` as a folder: the last component is kept whole.
    pub fn parse_folder(path: &str) -> Self {
        let (parent, name) = split(path);
        Self {
            parent,
            name,
            extension: None,
        }
    }

    /// Builds a file location from a parent folder path and a file name.
    pub fn file(parent: &str, file_name: &str) -> Self {
        let (stem, extension) = split_extension(file_name);
        Self {
            parent: normalize(parent),
            name: stem.to_string(),
            extension: extension.map(str::to_string),
        }
    }

    /// Builds a folder location from a parent folder path and a name.
    pub fn folder(parent: &str, name: &str) -> Self {
        Self {
            parent: normalize(parent),
            name: name.to_string(),
            extension: None,
        }
    }

    /// Path of the containing folder.
    pub fn parent(&self) -> &str {
        &self.parent
    }

    /// Name without extension.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Extension without the leading dot, if any.
    pub fn extension(&self) -> Option<&str> {
        self.extension.as_deref()
    }

    /// Final component: name plus `.extension` when present.
    pub fn file_name(&self) -> String {
        match &self.extension {
            Some(ext) => format!("{}.{}", self.name, ext),
            None => self.name.clone(),
        }
    }

    /// The identity of the entry.
    pub fn full_path(&self) -> String {
        combine(&self.parent, &self.file_name())
    }

    /// Same parent and extension, different name.
    pub fn with_name(&self, name: &str) -> Self {
        Self {
            parent: self.parent.clone(),
            name: name.to_string(),
            extension: self.extension.clone(),
        }
    }

    /// Same name and extension, different parent.
    pub fn with_parent(&self, parent: &str) -> Self {
        Self {
            parent: normalize(parent),
            name: self.name.clone(),
            extension: self.extension.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_round_trips() {
        for p in [
            "/root/a.txt",
            "/root/sub/archive.tar.gz",
            "/a",
            "relative/name",
            "/root/.bashrc",
            "/root/trailing.",
            "/",
            "C:/Users/me/notes.md",
        ] {
            assert_eq!(EntryPath::parse_file(p).full_path(), p, "{p}");
        }
    }

    #[test]
    fn folder_round_trips() {
        for p in ["/root/v1.2", "/root", "dir/sub", "/"] {
            assert_eq!(EntryPath::parse_folder(p).full_path(), p, "{p}");
        }
    }

    #[test]
    fn round_trip_is_under_normalization() {
        assert_eq!(
            EntryPath::parse_file(r"C:\Users\me\\notes.md").full_path(),
            "C:/Users/me/notes.md"
        );
        assert_eq!(
            EntryPath::parse_folder("/root/./sub/").full_path(),
            "/root/sub"
        );
    }

    #[test]
    fn decomposes_file() {
        let p = EntryPath::parse_file("/root/sub/archive.tar.gz");
        assert_eq!(p.parent(), "/root/sub");
        assert_eq!(p.name(), "archive.tar");
        assert_eq!(p.extension(), Some("gz"));
        assert_eq!(p.file_name(), "archive.tar.gz");
    }

    #[test]
    fn top_level_parent_is_root() {
        let p = EntryPath::parse_folder("/root");
        assert_eq!(p.parent(), "/");
        assert_eq!(p.name(), "root");
    }

    #[test]
    fn extension_edge_cases() {
        assert_eq!(split_extension("noext"), ("noext", None));
        assert_eq!(split_extension(".bashrc"), (".bashrc", None));
        assert_eq!(split_extension("a."), ("a", Some("")));
        assert_eq!(split_extension(".."), ("..", None));
    }

    #[test]
    fn combine_inserts_single_separator() {
        assert_eq!(combine("/", "a"), "/a");
        assert_eq!(combine("/root", "a"), "/root/a");
        assert_eq!(combine("", "a"), "a");
        assert_eq!(combine("/root", ""), "/root");
    }

    #[test]
    fn rejects_bad_names() {
        assert!(validate_name("ok.txt").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("..").is_err());
        assert!(matches!(
            validate_name("a/b"),
            Err(Error::InvalidPath { .. })
        ));
        assert!(validate_name(r"a\b").is_err());
    }
}
