use async_stream::try_stream;
use futures::Stream;
use tokio::{
    fs::{self, DirEntry},
    io,
};
use upmirror::{
    path::{FsPath, FsPathBuf},
    LocalEntry,
};

/// Local file system.
///
/// Symlinks are followed. Entries that are neither files nor directories
/// (sockets, fifos...) are left out of the listing.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSystem;

impl FileSystem {
    pub fn new() -> Self {
        FileSystem
    }
}

impl super::LocalEntries for FileSystem {
    fn local_entries(
        &self,
        path: &FsPath,
    ) -> impl Stream<Item = upmirror::Result<LocalEntry>> + Send {
        log::trace!("listing entries of {path}");
        try_stream! {
            let mut read_dir = fs::read_dir(path).await?;
            while let Some(direntry) = read_dir.next_entry().await? {
                if let Some(entry) = map_direntry(&direntry).await? {
                    yield entry;
                }
            }
        }
    }
}

impl super::ReadFile for FileSystem {
    async fn read_file(&self, path: &FsPath) -> upmirror::Result<Vec<u8>> {
        log::trace!("reading {path}");
        Ok(fs::read(path).await?)
    }

    async fn open_file(&self, path: &FsPath) -> upmirror::Result<impl io::AsyncRead + Send> {
        log::trace!("opening {path}");
        Ok(fs::File::open(path).await?)
    }
}

impl super::Local for FileSystem {}

async fn map_direntry(direntry: &DirEntry) -> upmirror::Result<Option<LocalEntry>> {
    let path = FsPathBuf::try_from(direntry.path())?;
    let metadata = fs::metadata(&path).await?;
    let entry = if metadata.is_dir() {
        LocalEntry::Directory { path }
    } else if metadata.is_file() {
        LocalEntry::Regular {
            path,
            size: metadata.len(),
        }
    } else {
        log::warn!("{path} is not a regular file nor a directory, ignoring");
        return Ok(None);
    };
    Ok(Some(entry))
}
