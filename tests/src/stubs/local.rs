use std::{collections::HashMap, io::Cursor};

use futures::{stream, Stream};
use tokio::io;
use upmirror::{
    path::{FsPath, FsPathBuf},
    LocalEntry,
};
use upmirror_sync::storage::{Local, LocalEntries, ReadFile};

use crate::dataset::Entry;

/// In-memory local tree.
/// Listings keep the order of the dataset.
/// File content is `size` times the byte `b'x'`.
#[derive(Debug, Clone, Default)]
pub struct Stub {
    dirs: HashMap<FsPathBuf, Vec<LocalEntry>>,
}

impl Stub {
    pub fn new(root: &FsPath, entries: &[Entry]) -> Self {
        let mut stub = Self::default();
        stub.add_dir(root.to_owned(), entries);
        stub
    }

    fn add_dir(&mut self, path: FsPathBuf, entries: &[Entry]) {
        let mut listing = Vec::with_capacity(entries.len());
        for entry in entries {
            match *entry {
                Entry::Dir { name, entries } => {
                    let dir = path.join(name);
                    listing.push(LocalEntry::Directory { path: dir.clone() });
                    self.add_dir(dir, entries);
                }
                Entry::File { name, size } => listing.push(LocalEntry::Regular {
                    path: path.join(name),
                    size,
                }),
            }
        }
        self.dirs.insert(path, listing);
    }

    fn content(&self, path: &FsPath) -> upmirror::Result<Vec<u8>> {
        let size = path
            .parent()
            .and_then(|parent| self.dirs.get(parent))
            .and_then(|listing| listing.iter().find(|e| e.path() == path))
            .and_then(LocalEntry::size)
            .ok_or_else(|| upmirror::io_error!("No such file: {path}"))?;
        Ok(vec![b'x'; size as usize])
    }
}

impl LocalEntries for Stub {
    fn local_entries(
        &self,
        path: &FsPath,
    ) -> impl Stream<Item = upmirror::Result<LocalEntry>> + Send {
        let entries: Vec<upmirror::Result<LocalEntry>> = match self.dirs.get(path) {
            Some(listing) => listing.iter().cloned().map(Ok).collect(),
            None => vec![Err(upmirror::io_error!("No such directory: {path}"))],
        };
        stream::iter(entries)
    }
}

impl ReadFile for Stub {
    async fn read_file(&self, path: &FsPath) -> upmirror::Result<Vec<u8>> {
        self.content(path)
    }

    async fn open_file(&self, path: &FsPath) -> upmirror::Result<impl io::AsyncRead + Send> {
        Ok(Cursor::new(self.content(path)?))
    }
}

impl Local for Stub {}
