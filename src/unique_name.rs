//! Collision-free names of the form `"name - (i).ext"`.

use log::debug;

use crate::EntryKind;
use crate::errors::Error;
use crate::path::EntryPath;

/// Default number of suffixed names tried before giving up.
pub const DEFAULT_MAX_ITERATIONS: u32 = 99;

/// Returns the first location, starting with `candidate` itself, for which
/// `exists` reports `false`.
///
/// Iteration `i` (for `i` in `1..=max_iterations`) tries `"{name} - ({i})"`,
/// keeping the extension of files (`"a - (2).txt"`). A file without an
/// extension, or with an empty one, gets no trailing dot. The lowest free
/// suffix always wins.
///
/// `exists` is the only way this function learns about the backend, so any
/// error it returns is passed through unchanged.
pub fn generate<F>(
    candidate: &EntryPath,
    kind: EntryKind,
    max_iterations: u32,
    mut exists: F,
) -> Result<EntryPath, Error>
where
    F: FnMut(&EntryPath) -> Result<bool, Error>,
{
    if !exists(candidate)? {
        return Ok(candidate.clone());
    }
    for i in 1..=max_iterations {
        let attempt = suffixed(candidate, kind, i);
        if !exists(&attempt)? {
            debug!("unique name for {candidate}: {attempt}");
            return Ok(attempt);
        }
    }
    Err(Error::CannotGenerateUniqueName {
        name: candidate.file_name(),
        attempts: max_iterations,
    })
}

fn suffixed(candidate: &EntryPath, kind: EntryKind, i: u32) -> EntryPath {
    let name = format!("{} - ({})", candidate.name(), i);
    match (kind, candidate.extension()) {
        (EntryKind::File, Some(ext)) if !ext.is_empty() => {
            EntryPath::file(candidate.parent(), &format!("{name}.{ext}"))
        }
        (EntryKind::File, _) => {
            // Built directly so an extension-less name is not re-split.
            EntryPath::folder(candidate.parent(), &name)
        }
        (EntryKind::Folder, _) => EntryPath::folder(candidate.parent(), &name),
    }
}
