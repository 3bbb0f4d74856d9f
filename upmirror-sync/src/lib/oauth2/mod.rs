//! OAuth2 authorization of the mirror against Google Drive.
//!
//! One token granting the full `drive` scope is used. It is obtained
//! with the PKCE flow on the first run, saved in the instance cache and
//! refreshed when it expires.

use futures::Future;
pub use oauth2::AccessToken;
use oauth2::{
    basic::{BasicClient, BasicTokenResponse},
    HttpRequest, HttpResponse, RefreshToken, Scope, TokenResponse,
};
use tokio::sync::Mutex;
use upmirror::path::FsPathBuf;

mod pkce;
pub(crate) mod server;
mod token_cache;

pub use self::token_cache::TokenCache;
use crate::PersistCache;

/// Read and write access to every file of the user's Drive
pub const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive";

/// Source of bearer tokens for the Drive API
pub trait GetToken: Send + Sync + 'static {
    fn get_token(&self) -> impl Future<Output = anyhow::Result<AccessToken>> + Send;
}

#[derive(Debug)]
pub struct Client {
    oauth2: BasicClient,
    http: reqwest::Client,
    // locked for the whole acquisition, so that one browser flow runs at most
    cache: Mutex<TokenCache>,
}

impl Client {
    /// Client authorizing with `secret`, caching its token in `cache_file`
    pub async fn new(
        secret: upmirror::oauth::Secret,
        cache_file: FsPathBuf,
        http: reqwest::Client,
    ) -> anyhow::Result<Self> {
        let cache = TokenCache::load(cache_file).await?;
        let oauth2 = BasicClient::new(
            secret.client_id,
            Some(secret.client_secret),
            secret.auth_url,
            Some(secret.token_url),
        );
        Ok(Self {
            oauth2,
            http,
            cache: Mutex::new(cache),
        })
    }

    async fn refresh(&self, refresh_token: &RefreshToken) -> anyhow::Result<BasicTokenResponse> {
        log::debug!("refreshing access token");
        let resp = self
            .oauth2
            .exchange_refresh_token(refresh_token)
            .add_scope(drive_scope())
            .request_async(|req| send(&self.http, req))
            .await?;
        Ok(resp)
    }
}

fn drive_scope() -> Scope {
    Scope::new(DRIVE_SCOPE.to_string())
}

/// Carries the token endpoint requests of the `oauth2` crate over `reqwest`
async fn send(http: &reqwest::Client, req: HttpRequest) -> reqwest::Result<HttpResponse> {
    let resp = http
        .request(req.method, req.url)
        .headers(req.headers)
        .body(req.body)
        .send()
        .await?;

    let status_code = resp.status();
    let headers = resp.headers().clone();
    let body = resp.bytes().await?.to_vec();
    if !status_code.is_success() {
        log::error!(
            "token endpoint answered {status_code}: {}",
            String::from_utf8_lossy(&body)
        );
    }

    Ok(HttpResponse {
        status_code,
        headers,
        body,
    })
}

impl GetToken for Client {
    async fn get_token(&self) -> anyhow::Result<AccessToken> {
        let mut cache = self.cache.lock().await;
        if let Some(access_token) = cache.access_token() {
            return Ok(access_token);
        }

        let resp = match cache.refresh_token() {
            Some(refresh_token) => match self.refresh(&refresh_token).await {
                Ok(resp) => resp,
                Err(err) => {
                    log::warn!("could not refresh the access token: {err:#}");
                    self.fetch_token_pkce().await?
                }
            },
            None => self.fetch_token_pkce().await?,
        };
        cache.put(&resp);
        Ok(resp.access_token().clone())
    }
}

impl PersistCache for Client {
    async fn persist_cache(&self) -> anyhow::Result<()> {
        self.cache.lock().await.save().await
    }
}
