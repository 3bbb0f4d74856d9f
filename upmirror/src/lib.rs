use serde::{Deserialize, Serialize};

pub mod config;
pub mod error;
pub mod id;
pub mod loc;
pub mod name;
pub mod oauth;
pub mod progress;
pub mod translate;

pub use crate::config::Config;
pub use crate::error::{Error, Result};
pub use crate::id::{Id, IdBuf};

/// File system paths. `upmirror` only deals with UTF-8 paths.
pub mod path {
    pub use camino::{Utf8Path as FsPath, Utf8PathBuf as FsPathBuf};
}

use crate::path::{FsPath, FsPathBuf};

/// Content type of remote folders
pub const FOLDER_MIMETYPE: &str = "application/vnd.google-apps.folder";

/// An entry of the local file system, as read at traversal time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalEntry {
    Directory { path: FsPathBuf },
    Regular { path: FsPathBuf, size: u64 },
}

impl LocalEntry {
    pub fn path(&self) -> &FsPath {
        match self {
            Self::Directory { path } => path,
            Self::Regular { path, .. } => path,
        }
    }

    pub fn name(&self) -> &str {
        self.path().file_name().unwrap_or("")
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, Self::Directory { .. })
    }

    pub fn size(&self) -> Option<u64> {
        match self {
            Self::Regular { size, .. } => Some(*size),
            Self::Directory { .. } => None,
        }
    }
}

/// An entry of the remote storage, as returned by a folder listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteEntry {
    pub id: IdBuf,
    pub name: String,
    pub mime_type: String,
    #[serde(default)]
    pub parents: Vec<IdBuf>,
}

impl RemoteEntry {
    pub fn is_folder(&self) -> bool {
        self.mime_type == FOLDER_MIMETYPE
    }
}
