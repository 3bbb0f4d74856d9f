//! Files kept by a mirror instance on the user's machine

use std::path::PathBuf;

use crate::path::{FsPath, FsPathBuf};

const APP_DIR: &str = "upmirror";

/// Locations of a named mirror instance.
///
/// Configuration is read from `<user config>/upmirror/<name>/` and the
/// OAuth2 token is cached in `<user cache>/upmirror/<name>/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    config_dir: FsPathBuf,
    cache_dir: FsPathBuf,
}

impl Instance {
    pub fn new(name: &str) -> anyhow::Result<Self> {
        let config_root = user_dir(dirs::config_dir(), "config")?;
        let cache_root = user_dir(dirs::cache_dir(), "cache")?;
        Self::with_roots(&config_root, &cache_root, name)
    }

    pub fn with_roots(
        config_root: &FsPath,
        cache_root: &FsPath,
        name: &str,
    ) -> anyhow::Result<Self> {
        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
            anyhow::bail!("Invalid instance name: {name:?}");
        }
        Ok(Self {
            config_dir: config_root.join(APP_DIR).join(name),
            cache_dir: cache_root.join(APP_DIR).join(name),
        })
    }

    pub fn config_file(&self) -> FsPathBuf {
        self.config_dir.join("config.json")
    }

    /// The Google client secret, as downloaded from the cloud console
    pub fn secret_file(&self) -> FsPathBuf {
        self.config_dir.join("credentials.json")
    }

    pub fn token_cache_file(&self) -> FsPathBuf {
        self.cache_dir.join("token_cache.json")
    }
}

fn user_dir(dir: Option<PathBuf>, what: &str) -> anyhow::Result<FsPathBuf> {
    let dir = dir.ok_or_else(|| anyhow::anyhow!("Can't get the user {what} directory"))?;
    Ok(FsPathBuf::try_from(dir)?)
}
