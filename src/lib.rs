//! A cross-platform virtual file system of files, folders and entries.
//!
//! Handles are cheap values holding a path and the [`FileSystem`] they
//! belong to; nothing touches storage until an operation asks for it. Every
//! create, copy, move and rename goes through one collision policy,
//! [`CollisionOption`], and searches are lazy [`Traversal`]s.
//!
//! ```rust
//! use entryfs::CollisionOption;
//! use entryfs::EntryOps;
//! use entryfs::FileOps;
//! use entryfs::FileSystem;
//! use entryfs::FolderOps;
//! use entryfs::SearchOption;
//!
//! let fs = FileSystem::in_memory();
//! let mut docs = fs.folder("/docs");
//! docs.create(CollisionOption::FailIfExists).unwrap();
//!
//! let mut report = docs
//!     .create_file("report.txt", CollisionOption::FailIfExists)
//!     .unwrap();
//! report.write_text("draft").unwrap();
//!
//! // The name is taken, so a numbered variant is picked.
//! let copy = docs
//!     .create_file("report.txt", CollisionOption::GenerateUniqueName)
//!     .unwrap();
//! assert_eq!(copy.file_name(), "report - (1).txt");
//!
//! let names: Vec<String> = docs
//!     .get_files("*.txt", SearchOption::TopDirectoryOnly)
//!     .unwrap()
//!     .iter()
//!     .map(|f| f.file_name())
//!     .collect();
//! assert_eq!(names, ["report - (1).txt", "report.txt"]);
//!
//! // Lookups of missing entries return inert stand-ins instead of errors.
//! let missing = fs.get_folder("/nowhere").unwrap();
//! assert!(!missing.exists().unwrap());
//! assert!(missing.get_files("*", SearchOption::AllDirectories).unwrap().is_empty());
//! ```

mod backend;
mod collision;
pub mod encoding;
mod entry;
mod errors;
#[cfg(not(target_arch = "wasm32"))]
pub mod facade;
mod file;
mod file_system;
mod folder;
pub mod hash;
mod memory;
#[cfg(not(target_arch = "wasm32"))]
mod native;
mod null;
pub mod path;
mod pattern;
mod traversal;
pub mod unique_name;
pub mod utils;

pub use backend::AccessMode;
pub use backend::Backend;
pub use backend::IoMode;
pub use backend::Listing;
pub use backend::Metadata;
pub use backend::Stream;
pub use backend::WriteMode;
pub use collision::CollisionOption;
pub use collision::Resolution;
pub use collision::resolve;
pub use entry::Entry;
pub use entry::EntryKind;
pub use entry::EntryOps;
pub use entry::ExistenceCheckResult;
pub use errors::Error;
#[cfg(not(target_arch = "wasm32"))]
pub use facade::CancellationToken;
pub use file::File;
pub use file::FileOps;
pub use file_system::FileSystem;
pub use file_system::FsOptions;
pub use folder::Folder;
pub use folder::FolderOps;
pub use memory::MemoryBackend;
#[cfg(not(target_arch = "wasm32"))]
pub use native::NativeBackend;
pub use null::MaybeFile;
pub use null::MaybeFolder;
pub use null::NullFile;
pub use null::NullFolder;
pub use path::EntryPath;
pub use pattern::NamePattern;
pub use traversal::SearchOption;
pub use traversal::SearchQuery;
pub use traversal::Traversal;

#[cfg(feature = "test_utils")]
pub(crate) mod test_utils;
#[cfg(feature = "test_utils")]
pub use test_utils::TestRoot;
#[cfg(feature = "test_utils")]
pub use test_utils::memory_tree;
