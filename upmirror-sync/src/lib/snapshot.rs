use futures::TryStreamExt;
use upmirror::{Id, RemoteEntry};

use crate::storage::ListChildren;

/// Listing of the direct children of one remote folder.
///
/// Names are not unique. Lookups return the first entry in listing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    entries: Vec<RemoteEntry>,
}

impl Snapshot {
    pub fn new(entries: Vec<RemoteEntry>) -> Self {
        Self { entries }
    }

    /// Fetch the children of `parent_id`
    pub async fn fetch<R>(remote: &R, parent_id: &Id) -> upmirror::Result<Self>
    where
        R: ListChildren + ?Sized,
    {
        let entries: Vec<RemoteEntry> = remote.list_children(parent_id).try_collect().await?;
        log::trace!("folder {parent_id} has {} entries", entries.len());
        Ok(Self::new(entries))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RemoteEntry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a RemoteEntry;
    type IntoIter = std::slice::Iter<'a, RemoteEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<RemoteEntry> for Snapshot {
    fn from_iter<T: IntoIterator<Item = RemoteEntry>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
