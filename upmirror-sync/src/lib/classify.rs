//! Existence checks of local entries in a remote snapshot.
//!
//! Office documents are converted on upload and renamed to their stem,
//! so they are looked up by stem and native content type.
//! Any other file is looked up by its full name, whatever its content type.
//! Folders are looked up by name only.

use upmirror::{name, translate::TranslationTable, RemoteEntry};

use crate::Snapshot;

/// Result of the lookup of a local entry in a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match<'a> {
    /// Content type to upload with. `None` keeps the original content.
    pub target: Option<&'a str>,
    /// First matching remote entry, in listing order
    pub existing: Option<&'a RemoteEntry>,
    /// Number of matching remote entries
    pub candidates: usize,
}

impl Match<'_> {
    pub fn is_match(&self) -> bool {
        self.existing.is_some()
    }

    pub fn is_ambiguous(&self) -> bool {
        self.candidates > 1
    }
}

/// Lookup of the local file `name` in `snapshot`.
pub fn classify_file<'a>(
    name: &str,
    snapshot: &'a Snapshot,
    table: &'a TranslationTable,
) -> Match<'a> {
    let (stem, extension) = name::split(name);
    match table.get(extension) {
        Some(target) => {
            let found = lookup(snapshot, |e| e.name == stem && e.mime_type == target);
            Match {
                target: Some(target),
                ..found
            }
        }
        None => lookup(snapshot, |e| e.name == name),
    }
}

/// Lookup of the local directory `name` in `snapshot`.
///
/// Content types are not compared: a remote file named like the
/// directory is returned as well.
pub fn find_folder<'a>(name: &str, snapshot: &'a Snapshot) -> Match<'a> {
    lookup(snapshot, |e| e.name == name)
}

fn lookup<'a, F>(snapshot: &'a Snapshot, pred: F) -> Match<'a>
where
    F: Fn(&RemoteEntry) -> bool,
{
    let mut matches = snapshot.iter().filter(|e| pred(e));
    let existing = matches.next();
    let candidates = existing.map_or(0, |_| 1 + matches.count());
    Match {
        target: None,
        existing,
        candidates,
    }
}
