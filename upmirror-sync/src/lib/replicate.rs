//! Mirroring of a local tree into a remote folder.
//!
//! The local tree is walked depth first, in pre-order. Each local
//! directory is paired with a remote folder whose children are listed
//! once, when the directory is entered. Only missing folders and files
//! are created, so running the replication again after a failure
//! resumes where it stopped.
//!
//! A single writer per remote root is assumed: nothing guards against
//! concurrent modifications of the remote tree.

use futures::{future::BoxFuture, TryStreamExt};
use upmirror::{
    config::{ForbiddenSet, UploadConfig},
    path::{FsPath, FsPathBuf},
    translate::TranslationTable,
    Config, Id, IdBuf, LocalEntry,
};

use crate::{
    classify,
    storage::{Local, Remote},
    upload::Uploader,
    Event, Observer, Snapshot,
};

/// Static rules of the replication
#[derive(Debug, Clone, Default)]
pub struct Policy {
    pub forbidden: ForbiddenSet,
    pub translations: TranslationTable,
    pub upload: UploadConfig,
}

impl From<&Config> for Policy {
    fn from(config: &Config) -> Self {
        Self {
            forbidden: config.forbidden.clone(),
            translations: config.translations.clone(),
            upload: config.upload,
        }
    }
}

/// What a replication run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub folders_created: usize,
    pub folders_reused: usize,
    pub files_uploaded: usize,
    /// Uploaded files converted to a native format (counted in `files_uploaded` too)
    pub files_converted: usize,
    pub files_skipped: usize,
    /// Excluded entries that stopped the processing of their directory
    pub stopped_at: Vec<FsPathBuf>,
}

impl Summary {
    /// Number of remote creations and renames
    pub fn remote_mutations(&self) -> usize {
        self.folders_created + self.files_uploaded + self.files_converted
    }
}

/// Outcome of the processing of one local entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Continue,
    /// Stop processing the current directory.
    /// Not an error: the siblings are deliberately left out.
    AbortSiblings,
}

pub struct Replicator<L, R, O = ()> {
    local: L,
    remote: R,
    observer: O,
    policy: Policy,
}

impl<L, R> Replicator<L, R, ()> {
    pub fn new(local: L, remote: R, policy: Policy) -> Self {
        Self {
            local,
            remote,
            observer: (),
            policy,
        }
    }
}

impl<L, R, O> Replicator<L, R, O> {
    pub fn with_observer<O2>(self, observer: O2) -> Replicator<L, R, O2> {
        Replicator {
            local: self.local,
            remote: self.remote,
            observer,
            policy: self.policy,
        }
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }
}

impl<L, R, O> Replicator<L, R, O>
where
    L: Local,
    R: Remote,
    O: Observer,
{
    /// Mirror the content of `local_root` into the remote folder `remote_root`.
    ///
    /// The first error aborts the run and is returned as is.
    pub async fn run(&self, local_root: &FsPath, remote_root: &Id) -> upmirror::Result<Summary> {
        log::info!("mirroring {local_root} into folder {remote_root}");
        let snapshot = Snapshot::fetch(&self.remote, remote_root).await?;
        let mut summary = Summary::default();
        self.replicate_dir(snapshot, local_root, remote_root, 0, &mut summary)
            .await?;
        log::info!(
            "mirrored {local_root}: {} folder(s) created, {} file(s) uploaded, {} file(s) skipped",
            summary.folders_created,
            summary.files_uploaded,
            summary.files_skipped
        );
        Ok(summary)
    }

    fn replicate_dir<'a>(
        &'a self,
        snapshot: Snapshot,
        path: &'a FsPath,
        parent_id: &'a Id,
        level: usize,
        summary: &'a mut Summary,
    ) -> BoxFuture<'a, upmirror::Result<()>> {
        Box::pin(async move {
            let entries: Vec<LocalEntry> = self.local.local_entries(path).try_collect().await?;
            for entry in entries.iter() {
                let step = self
                    .replicate_entry(&snapshot, entry, parent_id, level, summary)
                    .await?;
                if step == Step::AbortSiblings {
                    break;
                }
            }
            Ok(())
        })
    }

    async fn replicate_entry(
        &self,
        snapshot: &Snapshot,
        entry: &LocalEntry,
        parent_id: &Id,
        level: usize,
        summary: &mut Summary,
    ) -> upmirror::Result<Step> {
        let name = entry.name();

        if self.policy.forbidden.contains(name) {
            log::warn!(
                "reached excluded {}: remaining entries of its directory are not mirrored",
                entry.path()
            );
            self.observer.notify(&Event::Stop { name, level });
            summary.stopped_at.push(entry.path().to_owned());
            return Ok(Step::AbortSiblings);
        }

        match entry {
            LocalEntry::Directory { path } => {
                let found = classify::find_folder(name, snapshot);
                if found.is_ambiguous() {
                    log::warn!(
                        "{} entries named {name} in folder {parent_id}, using the first one",
                        found.candidates
                    );
                }
                let (id, created) = match found.existing {
                    Some(existing) => (existing.id.clone(), false),
                    None => (self.create_folder(name, parent_id).await?, true),
                };
                if created {
                    summary.folders_created += 1;
                } else {
                    summary.folders_reused += 1;
                }
                self.observer.notify(&Event::Folder {
                    name,
                    level,
                    created,
                });

                let snapshot = Snapshot::fetch(&self.remote, &id).await?;
                self.replicate_dir(snapshot, path, &id, level + 1, summary)
                    .await?;
            }
            LocalEntry::Regular { path, size } => {
                let found = classify::classify_file(name, snapshot, &self.policy.translations);
                if found.is_ambiguous() {
                    log::warn!(
                        "{} entries match {name} in folder {parent_id}",
                        found.candidates
                    );
                }
                if found.is_match() {
                    log::debug!("{path} already exists");
                    self.observer.notify(&Event::Skip { name, level });
                    summary.files_skipped += 1;
                } else {
                    let uploader = Uploader {
                        local: &self.local,
                        remote: &self.remote,
                        observer: &self.observer,
                        config: &self.policy.upload,
                    };
                    uploader
                        .upload(path, *size, parent_id, found.target, level)
                        .await?;
                    summary.files_uploaded += 1;
                    if found.target.is_some() {
                        summary.files_converted += 1;
                    }
                }
            }
        }

        Ok(Step::Continue)
    }

    async fn create_folder(&self, name: &str, parent_id: &Id) -> upmirror::Result<IdBuf> {
        log::info!("creating folder {name} in {parent_id}");
        self.remote.create_folder(name, parent_id).await
    }
}
