use byte_unit::{Byte, UnitType};
use futures::StreamExt;
use upmirror::{config::UploadConfig, name, path::FsPath, Id, IdBuf};

use crate::{
    storage::{Local, Remote, UploadEvent},
    Event, Observer,
};

/// Transfer of single files to the remote storage.
///
/// Files bigger than the configured threshold are sent in chunks,
/// others in a single request.
/// Files uploaded with a native content type are renamed to their stem
/// once transferred.
#[derive(Debug)]
pub struct Uploader<'a, L, R, O> {
    pub local: &'a L,
    pub remote: &'a R,
    pub observer: &'a O,
    pub config: &'a UploadConfig,
}

impl<L, R, O> Uploader<'_, L, R, O>
where
    L: Local,
    R: Remote,
    O: Observer,
{
    pub async fn upload(
        &self,
        path: &FsPath,
        size: u64,
        parent_id: &Id,
        mime_type: Option<&str>,
        level: usize,
    ) -> upmirror::Result<IdBuf> {
        let name = path
            .file_name()
            .ok_or_else(|| upmirror::io_error!("{path} has no file name"))?;
        let chunked = self.config.is_chunked(size);

        log::info!(
            "uploading {path} ({:#.2}){}{}",
            Byte::from_u64(size).get_appropriate_unit(UnitType::Binary),
            if chunked { " in chunks" } else { "" },
            mime_type
                .map(|mt| format!(" as {mt}"))
                .unwrap_or_default(),
        );
        self.observer.notify(&Event::Upload {
            name,
            level,
            size,
            chunked,
        });

        let id = if chunked {
            self.upload_chunked(path, name, size, parent_id, mime_type, level)
                .await?
        } else {
            let data = self.local.read_file(path).await?;
            self.remote
                .upload_small(data, name, parent_id, mime_type)
                .await?
        };

        if mime_type.is_some() {
            let stem = name::stem(name);
            log::info!("renaming converted {name} to {stem}");
            self.remote.rename(&id, stem).await?;
        }

        self.observer.notify(&Event::Uploaded { name, level });
        Ok(id)
    }

    async fn upload_chunked(
        &self,
        path: &FsPath,
        name: &str,
        size: u64,
        parent_id: &Id,
        mime_type: Option<&str>,
        level: usize,
    ) -> upmirror::Result<IdBuf> {
        let data = self.local.open_file(path).await?;
        let events = self.remote.upload_resumable(
            data,
            size,
            name,
            parent_id,
            mime_type,
            self.config.chunk_size,
        );
        tokio::pin!(events);

        let mut id = None;
        while let Some(event) = events.next().await {
            match event? {
                UploadEvent::Progress(percent) => {
                    log::trace!("{path}: {percent}%");
                    self.observer.notify(&Event::Progress {
                        name,
                        level,
                        percent,
                    });
                }
                UploadEvent::Done(done) => id = Some(done),
            }
        }
        id.ok_or_else(|| upmirror::api_error!("upload of {path} ended without file id"))
    }
}
