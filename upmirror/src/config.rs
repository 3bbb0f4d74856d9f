use std::collections::BTreeSet;

use anyhow::Context;
use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    path::{FsPath, FsPathBuf},
    progress,
    translate::TranslationTable,
    IdBuf,
};

/// Names of local directories that are never mirrored.
///
/// Meeting one of these names stops the processing of the directory
/// containing it, including the siblings listed after it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ForbiddenSet(BTreeSet<String>);

impl ForbiddenSet {
    pub fn new<I>(names: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }
}

impl Default for ForbiddenSet {
    fn default() -> Self {
        Self::new(["Solutions", "Term Work"])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UploadConfig {
    /// Files strictly bigger than this are uploaded in chunks
    pub chunked_threshold: u64,
    pub chunk_size: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            chunked_threshold: progress::CHUNKED_THRESHOLD,
            chunk_size: progress::CHUNK_SIZE,
        }
    }
}

impl UploadConfig {
    pub fn is_chunked(&self, size: u64) -> bool {
        size > self.chunked_threshold
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Root of the local tree to mirror
    pub local_dir: FsPathBuf,
    /// Id of the remote folder receiving the mirror
    pub remote_root: IdBuf,
    /// Path to the Google client secret file.
    /// Defaults to the instance `credentials.json`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_file: Option<FsPathBuf>,
    #[serde(default)]
    pub forbidden: ForbiddenSet,
    /// Entries added to the default table, or overriding some of its entries
    #[serde(default, deserialize_with = "over_default_translations")]
    pub translations: TranslationTable,
    #[serde(default)]
    pub upload: UploadConfig,
}

fn over_default_translations<'de, D>(deserializer: D) -> Result<TranslationTable, D::Error>
where
    D: Deserializer<'de>,
{
    let overlay = TranslationTable::deserialize(deserializer)?;
    let mut table = TranslationTable::default();
    table.extend(overlay);
    Ok(table)
}

impl Config {
    pub fn new(local_dir: FsPathBuf, remote_root: IdBuf) -> Self {
        Self {
            local_dir,
            remote_root,
            secret_file: None,
            forbidden: ForbiddenSet::default(),
            translations: TranslationTable::default(),
            upload: UploadConfig::default(),
        }
    }

    pub async fn load_from_file(path: &FsPath) -> anyhow::Result<Self> {
        let config_json = tokio::fs::read(&path)
            .await
            .with_context(|| format!("Failed to read config from {path}"))?;
        let config_json = std::str::from_utf8(&config_json)?;
        let config: Config = serde_json::from_str(config_json)
            .with_context(|| format!("Failed to parse config from {path}"))?;
        Ok(config)
    }

    pub fn validate(&self) -> crate::Result<()> {
        if self.remote_root.as_str().is_empty() {
            crate::config_bail!("remote root id is empty");
        }
        if self.local_dir.as_str().is_empty() {
            crate::config_bail!("local directory is empty");
        }
        let chunk_size = self.upload.chunk_size;
        if chunk_size == 0 || chunk_size % progress::CHUNK_GRANULARITY != 0 {
            crate::config_bail!(
                "chunk size {chunk_size} is not a positive multiple of {}",
                progress::CHUNK_GRANULARITY
            );
        }
        Ok(())
    }
}
