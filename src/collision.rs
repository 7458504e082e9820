use log::debug;
#[cfg(feature = "json_schema")]
use schemars::JsonSchema;
use serde::Deserialize;
use serde::Serialize;

use crate::EntryKind;
use crate::errors::Error;
use crate::path::EntryPath;
use crate::unique_name;

/// What to do when the target of a create, copy, move or rename already
/// exists.
#[cfg_attr(feature = "json_schema", derive(JsonSchema))]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Hash, Eq)]
pub enum CollisionOption {
    /// Pick the lowest free `"name - (i)"` variant.
    GenerateUniqueName,
    /// Delete the existing entry first.
    ReplaceExisting,
    /// Report failure and leave everything untouched.
    FailIfExists,
    /// Use the existing entry instead of making a new one.
    OpenIfExists,
}

/// The decision for a single collision check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Materialize the entry at `path`. When `replace_existing` is set the
    /// entry currently at `path` must be deleted first.
    Proceed {
        /// Where the entry goes.
        path: EntryPath,
        /// Delete what is at `path` before proceeding.
        replace_existing: bool,
    },
    /// The operation must not happen.
    Fail,
    /// Nothing is created; the existing entry at the path is the result.
    OpenExisting(EntryPath),
}

/// Applies the collision policy table.
///
/// | option             | absent  | present                      |
/// |--------------------|---------|------------------------------|
/// | FailIfExists       | Proceed | Fail                         |
/// | ReplaceExisting    | Proceed | Proceed, replacing           |
/// | GenerateUniqueName | Proceed | Proceed at a generated name  |
/// | OpenIfExists       | Proceed | OpenExisting                 |
///
/// `exists` is only consulted to generate unique names.
pub fn resolve<F>(
    option: CollisionOption,
    already_exists: bool,
    candidate: &EntryPath,
    kind: EntryKind,
    max_iterations: u32,
    exists: F,
) -> Result<Resolution, Error>
where
    F: FnMut(&EntryPath) -> Result<bool, Error>,
{
    let proceed = |path: EntryPath, replace_existing| Resolution::Proceed {
        path,
        replace_existing,
    };
    if !already_exists {
        return Ok(proceed(candidate.clone(), false));
    }
    let resolution = match option {
        CollisionOption::FailIfExists => Resolution::Fail,
        CollisionOption::ReplaceExisting => proceed(candidate.clone(), true),
        CollisionOption::GenerateUniqueName => proceed(
            unique_name::generate(candidate, kind, max_iterations, exists)?,
            false,
        ),
        CollisionOption::OpenIfExists => Resolution::OpenExisting(candidate.clone()),
    };
    debug!("collision at {candidate} with {option:?}: {resolution:?}");
    Ok(resolution)
}
