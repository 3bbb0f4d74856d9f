//! Capabilities required by the replication.
//!
//! The remote side is addressed by ids, the local side by paths.
//! Implementations are injected into the [`Replicator`](crate::Replicator).

use futures::{Future, Stream};
use tokio::io;
use upmirror::{path::FsPath, Id, IdBuf, LocalEntry, RemoteEntry};

pub mod fs;
pub mod gdrive;

pub trait ListChildren {
    /// Direct children of the folder `parent_id`, in listing order.
    fn list_children(
        &self,
        parent_id: &Id,
    ) -> impl Stream<Item = upmirror::Result<RemoteEntry>> + Send;
}

pub trait CreateFolder {
    fn create_folder(
        &self,
        name: &str,
        parent_id: &Id,
    ) -> impl Future<Output = upmirror::Result<IdBuf>> + Send;
}

pub trait UploadSmall {
    /// Single-shot upload of `data`.
    /// If `mime_type` is specified, the created file gets this content type.
    fn upload_small(
        &self,
        data: Vec<u8>,
        name: &str,
        parent_id: &Id,
        mime_type: Option<&str>,
    ) -> impl Future<Output = upmirror::Result<IdBuf>> + Send;
}

/// Events of a chunked upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadEvent {
    /// A chunk was sent. Integer percentage of the transfer, rounded down.
    Progress(u8),
    /// The file was created
    Done(IdBuf),
}

pub trait UploadResumable {
    /// Chunked upload of `size` bytes read from `data`.
    ///
    /// The stream yields a `Progress` event after each chunk and ends with
    /// a single `Done` event. It can't be restarted.
    fn upload_resumable<'a, D>(
        &'a self,
        data: D,
        size: u64,
        name: &'a str,
        parent_id: &'a Id,
        mime_type: Option<&'a str>,
        chunk_size: u64,
    ) -> impl Stream<Item = upmirror::Result<UploadEvent>> + Send + 'a
    where
        D: io::AsyncRead + Send + 'a;
}

pub trait Rename {
    /// Metadata only update of the name
    fn rename(&self, id: &Id, new_name: &str) -> impl Future<Output = upmirror::Result<()>> + Send;
}

/// The remote storage receiving the mirror
pub trait Remote:
    ListChildren + CreateFolder + UploadSmall + UploadResumable + Rename + Send + Sync + 'static
{
}

pub trait LocalEntries {
    /// Entries of the local directory at `path`.
    /// The order is unspecified but stable for a given call.
    fn local_entries(&self, path: &FsPath)
        -> impl Stream<Item = upmirror::Result<LocalEntry>> + Send;
}

pub trait ReadFile {
    fn read_file(&self, path: &FsPath) -> impl Future<Output = upmirror::Result<Vec<u8>>> + Send;

    fn open_file(
        &self,
        path: &FsPath,
    ) -> impl Future<Output = upmirror::Result<impl io::AsyncRead + Send>> + Send;
}

/// The local tree being mirrored
pub trait Local: LocalEntries + ReadFile + Send + Sync + 'static {}
