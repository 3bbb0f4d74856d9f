use std::sync::Arc;

/// What the replication does, reported as it happens.
/// `level` is the depth of the entry below the mirrored root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event<'a> {
    /// Entering a local directory, mapped to a reused or created remote folder
    Folder {
        name: &'a str,
        level: usize,
        created: bool,
    },
    /// A file already exists remotely
    Skip { name: &'a str, level: usize },
    Upload {
        name: &'a str,
        level: usize,
        size: u64,
        chunked: bool,
    },
    Progress {
        name: &'a str,
        level: usize,
        percent: u8,
    },
    /// Upload completed, including the rename of converted documents
    Uploaded { name: &'a str, level: usize },
    /// An excluded name stopped the processing of its directory
    Stop { name: &'a str, level: usize },
}

impl Event<'_> {
    pub fn name(&self) -> &str {
        match self {
            Self::Folder { name, .. }
            | Self::Skip { name, .. }
            | Self::Upload { name, .. }
            | Self::Progress { name, .. }
            | Self::Uploaded { name, .. }
            | Self::Stop { name, .. } => name,
        }
    }

    pub fn level(&self) -> usize {
        match self {
            Self::Folder { level, .. }
            | Self::Skip { level, .. }
            | Self::Upload { level, .. }
            | Self::Progress { level, .. }
            | Self::Uploaded { level, .. }
            | Self::Stop { level, .. } => *level,
        }
    }
}

/// Sink of replication events. Events are informative only.
pub trait Observer: Send + Sync {
    fn notify(&self, event: &Event<'_>);
}

impl Observer for () {
    fn notify(&self, _event: &Event<'_>) {}
}

impl<O> Observer for Arc<O>
where
    O: Observer + ?Sized,
{
    fn notify(&self, event: &Event<'_>) {
        (**self).notify(event)
    }
}
