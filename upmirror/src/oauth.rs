use oauth2::{AuthUrl, ClientId, ClientSecret, TokenUrl};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::path::FsPath;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Secret {
    pub client_id: ClientId,
    pub client_secret: ClientSecret,
    pub auth_url: AuthUrl,
    pub token_url: TokenUrl,
}

/// Load the `credentials.json` file downloaded from the Google Cloud console.
/// Only secrets of desktop applications ("installed") are accepted.
pub async fn load_google_secret(path: &FsPath) -> anyhow::Result<Secret> {
    use anyhow::Context;

    let json = fs::read(path)
        .await
        .with_context(|| format!("Failed to read client secret from {path}"))?;
    parse_google_secret(&json)
}

fn parse_google_secret(json: &[u8]) -> anyhow::Result<Secret> {
    let goog: GoogleAppSecret = serde_json::from_slice(json)?;
    match goog {
        GoogleAppSecret::Installed(secret) => Ok(Secret {
            client_id: ClientId::new(secret.client_id),
            client_secret: ClientSecret::new(secret.client_secret),
            auth_url: AuthUrl::new(secret.auth_uri)?,
            token_url: TokenUrl::new(secret.token_uri)?,
        }),
        GoogleAppSecret::Web(_) => anyhow::bail!(
            "Wrong kind of secret file. Please get a secret file with an \"installed\" field"
        ),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GoogleSecret {
    client_id: String,
    client_secret: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    redirect_uris: Vec<String>,
    auth_uri: String,
    token_uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    auth_provider_x509_cert_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum GoogleAppSecret {
    Installed(GoogleSecret),
    Web(GoogleSecret),
}
