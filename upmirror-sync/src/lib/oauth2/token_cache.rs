use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use oauth2::{AccessToken, RefreshToken, TokenResponse, TokenType};
use serde::{Deserialize, Serialize};
use upmirror::path::FsPathBuf;

/// Access tokens expiring within this many seconds are not handed out
const EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CachedToken {
    access_token: AccessToken,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh_token: Option<RefreshToken>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expiration: Option<DateTime<Utc>>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        match self.expiration {
            Some(expiration) => expiration - Duration::seconds(EXPIRY_MARGIN_SECS) > now,
            None => true,
        }
    }
}

/// The Drive token, loaded from and saved to a JSON file
#[derive(Debug)]
pub struct TokenCache {
    path: FsPathBuf,
    token: Option<CachedToken>,
    modified: bool,
}

impl TokenCache {
    /// Load the cache at `path`.
    /// A missing or unreadable file gives an empty cache.
    pub async fn load(path: FsPathBuf) -> anyhow::Result<Self> {
        let token = match tokio::fs::read_to_string(&path).await {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(token) => {
                    log::info!("read cached token from {path}");
                    Some(token)
                }
                Err(err) => {
                    log::warn!("ignoring token cache {path}: {err}");
                    None
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
            Err(err) => {
                return Err(err).with_context(|| format!("Failed to read token cache {path}"))
            }
        };
        Ok(Self {
            path,
            token,
            modified: false,
        })
    }

    pub fn access_token(&self) -> Option<AccessToken> {
        let token = self.token.as_ref()?;
        let fresh = token.is_fresh(Utc::now());
        log::trace!("cached access token is {}", if fresh { "fresh" } else { "stale" });
        fresh.then(|| token.access_token.clone())
    }

    pub fn refresh_token(&self) -> Option<RefreshToken> {
        self.token.as_ref()?.refresh_token.clone()
    }

    /// Store the token of `resp`.
    /// Refresh responses usually carry no refresh token, the previous one is kept then.
    pub fn put<T, TT>(&mut self, resp: &T)
    where
        T: TokenResponse<TT>,
        TT: TokenType,
    {
        let expiration = resp
            .expires_in()
            .and_then(|exp| Duration::from_std(exp).ok())
            .map(|exp| Utc::now() + exp);
        log::trace!("caching access token expiring at {expiration:?}");
        self.token = Some(CachedToken {
            access_token: resp.access_token().clone(),
            refresh_token: resp.refresh_token().cloned().or_else(|| self.refresh_token()),
            expiration,
        });
        self.modified = true;
    }

    /// Write the token to disk if it changed since it was loaded
    pub async fn save(&mut self) -> anyhow::Result<()> {
        let Some(token) = self.token.as_ref().filter(|_| self.modified) else {
            return Ok(());
        };
        let path = &self.path;
        log::info!("caching token to {path}");
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("Failed to create {dir}"))?;
        }
        let json = serde_json::to_string_pretty(token)?;
        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("Failed to write {path}"))?;
        self.modified = false;
        Ok(())
    }
}
