use std::sync::{Arc, Mutex, MutexGuard};

use async_stream::try_stream;
use futures::{stream, Stream};
use tokio::io;
use upmirror::{name, progress, Id, IdBuf, RemoteEntry, FOLDER_MIMETYPE};
use upmirror_sync::storage::{
    CreateFolder, ListChildren, Remote, Rename, UploadEvent, UploadResumable, UploadSmall,
};

/// Id of the mirrored remote folder
pub const ROOT: &str = "root";

/// Calls received by the stub
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    List {
        parent: IdBuf,
    },
    CreateFolder {
        name: String,
        parent: IdBuf,
    },
    Upload {
        name: String,
        parent: IdBuf,
        mime_type: Option<String>,
        chunked: bool,
    },
    Rename {
        id: IdBuf,
        name: String,
    },
}

impl Op {
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Op::List { .. })
    }
}

#[derive(Debug, Default)]
struct State {
    entries: Vec<(RemoteEntry, u64)>,
    next_id: usize,
    ops: Vec<Op>,
    fail_on: Option<String>,
}

impl State {
    fn insert(&mut self, name: &str, parent: &Id, mime_type: &str, size: u64) -> IdBuf {
        self.next_id += 1;
        let id = IdBuf::from(format!("id{}", self.next_id));
        let entry = RemoteEntry {
            id: id.clone(),
            name: name.to_string(),
            mime_type: mime_type.to_string(),
            parents: vec![parent.to_id_buf()],
        };
        self.entries.push((entry, size));
        id
    }

    fn check_failure(&self, name: &str) -> upmirror::Result<()> {
        if self.fail_on.as_deref() == Some(name) {
            upmirror::api_bail!("POST /files returned 503 Service Unavailable for {name}");
        }
        Ok(())
    }
}

fn guess_mime_type(name: &str) -> &'static str {
    match name::extension(name) {
        "txt" => "text/plain",
        "pdf" => "application/pdf",
        "mp4" => "video/mp4",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}

/// In-memory remote storage recording every call.
/// Entries are listed in creation order.
#[derive(Debug, Clone, Default)]
pub struct Stub {
    state: Arc<Mutex<State>>,
}

impl Stub {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn add_folder(&self, parent: &str, name: &str) -> IdBuf {
        self.lock().insert(name, Id::new(parent), FOLDER_MIMETYPE, 0)
    }

    pub fn add_file(&self, parent: &str, name: &str, mime_type: &str) -> IdBuf {
        self.lock().insert(name, Id::new(parent), mime_type, 0)
    }

    pub fn children(&self, parent: &str) -> Vec<RemoteEntry> {
        self.lock()
            .entries
            .iter()
            .filter(|(e, _)| e.parents.iter().any(|p| p.as_str() == parent))
            .map(|(e, _)| e.clone())
            .collect()
    }

    pub fn names(&self, parent: &str) -> Vec<String> {
        self.children(parent).into_iter().map(|e| e.name).collect()
    }

    /// Lookup by slash separated names from the root, first match at each level
    pub fn find(&self, path: &str) -> Option<RemoteEntry> {
        let mut parent = IdBuf::from(ROOT);
        let mut found = None;
        for comp in path.split('/') {
            let entry = self
                .children(parent.as_str())
                .into_iter()
                .find(|e| e.name == comp)?;
            parent = entry.id.clone();
            found = Some(entry);
        }
        found
    }

    pub fn size_of(&self, id: &Id) -> Option<u64> {
        self.lock()
            .entries
            .iter()
            .find(|(e, _)| *e.id == *id)
            .map(|(_, size)| *size)
    }

    pub fn ops(&self) -> Vec<Op> {
        self.lock().ops.clone()
    }

    pub fn clear_ops(&self) {
        self.lock().ops.clear();
    }

    pub fn mutations(&self) -> Vec<Op> {
        self.ops().into_iter().filter(Op::is_mutation).collect()
    }

    pub fn listings(&self) -> usize {
        self.ops().iter().filter(|op| !op.is_mutation()).count()
    }

    /// Makes the creation of entries named `name` fail
    pub fn fail_on(&self, name: Option<&str>) {
        self.lock().fail_on = name.map(str::to_string);
    }
}

impl ListChildren for Stub {
    fn list_children(
        &self,
        parent_id: &Id,
    ) -> impl Stream<Item = upmirror::Result<RemoteEntry>> + Send {
        self.lock().ops.push(Op::List {
            parent: parent_id.to_id_buf(),
        });
        let children = self.children(parent_id.as_str());
        stream::iter(children.into_iter().map(Ok))
    }
}

impl CreateFolder for Stub {
    async fn create_folder(&self, name: &str, parent_id: &Id) -> upmirror::Result<IdBuf> {
        let mut state = self.lock();
        state.check_failure(name)?;
        state.ops.push(Op::CreateFolder {
            name: name.to_string(),
            parent: parent_id.to_id_buf(),
        });
        Ok(state.insert(name, parent_id, FOLDER_MIMETYPE, 0))
    }
}

impl UploadSmall for Stub {
    async fn upload_small(
        &self,
        data: Vec<u8>,
        name: &str,
        parent_id: &Id,
        mime_type: Option<&str>,
    ) -> upmirror::Result<IdBuf> {
        let mut state = self.lock();
        state.check_failure(name)?;
        state.ops.push(Op::Upload {
            name: name.to_string(),
            parent: parent_id.to_id_buf(),
            mime_type: mime_type.map(str::to_string),
            chunked: false,
        });
        let mime_type = mime_type.unwrap_or_else(|| guess_mime_type(name));
        Ok(state.insert(name, parent_id, mime_type, data.len() as u64))
    }
}

impl UploadResumable for Stub {
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
        D: io::AsyncRead + Send + 'a,
    {
        use io::AsyncReadExt;

        try_stream! {
            let checked = self.lock().check_failure(name);
            checked?;

            tokio::pin!(data);
            let mut sent = 0u64;
            loop {
                let mut buf = Vec::new();
                let sz = data.as_mut().take(chunk_size).read_to_end(&mut buf).await? as u64;
                sent += sz;
                yield UploadEvent::Progress(progress::percent(sent, size));
                if sz == 0 || sent >= size {
                    break;
                }
            }

            let id = {
                let mut state = self.lock();
                state.ops.push(Op::Upload {
                    name: name.to_string(),
                    parent: parent_id.to_id_buf(),
                    mime_type: mime_type.map(str::to_string),
                    chunked: true,
                });
                let mime_type = mime_type.unwrap_or_else(|| guess_mime_type(name));
                state.insert(name, parent_id, mime_type, sent)
            };
            yield UploadEvent::Done(id);
        }
    }
}

impl Rename for Stub {
    async fn rename(&self, id: &Id, new_name: &str) -> upmirror::Result<()> {
        let mut state = self.lock();
        state.ops.push(Op::Rename {
            id: id.to_id_buf(),
            name: new_name.to_string(),
        });
        let entry = state
            .entries
            .iter_mut()
            .find(|(e, _)| *e.id == *id)
            .ok_or_else(|| upmirror::api_error!("PATCH /files/{id} returned 404 Not Found"))?;
        entry.0.name = new_name.to_string();
        Ok(())
    }
}

impl Remote for Stub {}
