use std::fs;

use crate::EntryKind;
use crate::Metadata;
use crate::utils::to_utc;

impl Metadata {
    /// Converts platform metadata. Timestamps the platform cannot report
    /// become the Unix epoch.
    pub(crate) fn from_std(kind: EntryKind, metadata: &fs::Metadata) -> Self {
        Self {
            kind,
            size: match kind {
                EntryKind::File => metadata.len(),
                EntryKind::Folder => 0,
            },
            created: to_utc(metadata.created()),
            last_accessed: to_utc(metadata.accessed()),
            last_modified: to_utc(metadata.modified()),
        }
    }
}

pub(super) fn kind_of(metadata: &fs::Metadata) -> EntryKind {
    if metadata.is_dir() {
        EntryKind::Folder
    } else {
        EntryKind::File
    }
}
