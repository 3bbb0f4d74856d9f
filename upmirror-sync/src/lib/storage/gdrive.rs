//! Google Drive v3 remote storage

use std::sync::Arc;

use async_stream::try_stream;
use futures::Stream;
use tokio::io;
use upmirror::{progress, Id, IdBuf, RemoteEntry, FOLDER_MIMETYPE};

use super::UploadEvent;
use crate::{error, oauth2::GetToken, PersistCache};

const API_URL: &str = "https://www.googleapis.com/drive/v3";
const UPLOAD_URL: &str = "https://www.googleapis.com/upload/drive/v3";

#[derive(Clone)]
pub struct GoogleDrive<A> {
    client: reqwest::Client,
    auth: Arc<A>,
    base_url: String,
    upload_base_url: String,
    user_agent: String,
}

impl<A> GoogleDrive<A>
where
    A: GetToken,
{
    /// Connect to the Drive of the user authorized by `auth`
    pub async fn new(auth: A, client: reqwest::Client) -> upmirror::Result<Self> {
        let drive = Self::with_endpoints(auth, client, API_URL.into(), UPLOAD_URL.into());

        let about = drive.about_get().await?;
        log::info!(
            "Access granted to Drive of {}{}",
            about.user.display_name,
            about
                .user
                .email_address
                .as_ref()
                .map(|em| format!(" <{em}>"))
                .unwrap_or_default(),
        );
        let as_bytes = |num: Option<i64>| num.and_then(|n| u64::try_from(n).ok());
        let quota = &about.storage_quota;
        if let (Some(usage), Some(limit)) = (as_bytes(quota.usage), as_bytes(quota.limit)) {
            use byte_unit::{Byte, UnitType};
            let usage = Byte::from_u64(usage).get_appropriate_unit(UnitType::Binary);
            let limit = Byte::from_u64(limit).get_appropriate_unit(UnitType::Binary);
            log::info!("Usage {usage:#.2} / {limit:#.3}");
        }

        Ok(drive)
    }

    fn with_endpoints(
        auth: A,
        client: reqwest::Client,
        base_url: String,
        upload_base_url: String,
    ) -> Self {
        Self {
            client,
            auth: Arc::new(auth),
            base_url,
            upload_base_url,
            user_agent: format!("upmirror/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl<A> super::ListChildren for GoogleDrive<A>
where
    A: GetToken,
{
    fn list_children(
        &self,
        parent_id: &Id,
    ) -> impl Stream<Item = upmirror::Result<RemoteEntry>> + Send {
        log::trace!("listing children of {parent_id}");
        let q = format!("'{parent_id}' in parents and trashed=false");

        try_stream! {
            let mut page_token = None;
            loop {
                let file_list = self.files_list(&q, page_token.take()).await?;
                for f in file_list.files.unwrap_or_default() {
                    yield map_file(f)?;
                }
                page_token = file_list.next_page_token;
                if page_token.is_none() {
                    break;
                }
            }
        }
    }
}

impl<A> super::CreateFolder for GoogleDrive<A>
where
    A: GetToken,
{
    async fn create_folder(&self, name: &str, parent_id: &Id) -> upmirror::Result<IdBuf> {
        let file = new_file(name, parent_id, Some(FOLDER_MIMETYPE));
        let res = self.files_create(&file).await?;
        file_id(res)
    }
}

impl<A> super::UploadSmall for GoogleDrive<A>
where
    A: GetToken,
{
    async fn upload_small(
        &self,
        data: Vec<u8>,
        name: &str,
        parent_id: &Id,
        mime_type: Option<&str>,
    ) -> upmirror::Result<IdBuf> {
        let file = new_file(name, parent_id, mime_type);
        let size = data.len() as u64;
        let upload_url = self.upload_request(&file, size).await?;
        let res = self.upload_range(upload_url, data, 0, size).await?;
        let res = utils::check_response("PUT", "/upload/files", res).await?;
        let file: api::File = res.json().await.map_err(error::api)?;
        file_id(file)
    }
}

impl<A> super::UploadResumable for GoogleDrive<A>
where
    A: GetToken,
{
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
            let file = new_file(name, parent_id, mime_type);
            let upload_url = self.upload_request(&file, size).await?;

            tokio::pin!(data);

            let mut sent = 0u64;
            loop {
                // bytes appended to the file since it was listed are left out
                let want = chunk_size.min(size - sent);
                let mut buf: Vec<u8> = Vec::with_capacity(want as _);
                let sz = data
                    .as_mut()
                    .take(want)
                    .read_to_end(&mut buf)
                    .await? as u64;
                if sz == 0 && sent < size {
                    Err::<(), _>(upmirror::io_error!(
                        "{name} ended after {sent} bytes, {size} were expected"
                    ))?;
                }
                log::trace!("uploading {sz} bytes of {name}");
                let res = self
                    .upload_range(upload_url.clone(), buf, sent, size)
                    .await?;
                sent += sz;

                let status = res.status();
                if status.is_success() {
                    let file: api::File = res.json().await.map_err(error::api)?;
                    yield UploadEvent::Progress(progress::percent(sent, size));
                    yield UploadEvent::Done(file_id(file)?);
                    break;
                } else if status.as_u16() == RESUME_INCOMPLETE && sent < size {
                    yield UploadEvent::Progress(progress::percent(sent, size));
                } else {
                    Err::<(), _>(utils::response_error("PUT", "/upload/files", res).await)?;
                }
            }
        }
    }
}

impl<A> super::Rename for GoogleDrive<A>
where
    A: GetToken,
{
    async fn rename(&self, id: &Id, new_name: &str) -> upmirror::Result<()> {
        let file = api::File {
            name: Some(new_name.to_string()),
            ..Default::default()
        };
        self.files_update(id, &file).await?;
        Ok(())
    }
}

impl<A> PersistCache for GoogleDrive<A>
where
    A: PersistCache + Send + Sync,
{
    async fn persist_cache(&self) -> anyhow::Result<()> {
        self.auth.persist_cache().await
    }
}

impl<A> super::Remote for GoogleDrive<A> where A: GetToken {}

/// Status of a partial upload of a resumable session
const RESUME_INCOMPLETE: u16 = 308;

fn new_file(name: &str, parent_id: &Id, mime_type: Option<&str>) -> api::File {
    api::File {
        id: None,
        name: Some(name.to_string()),
        mime_type: mime_type.map(str::to_string),
        parents: Some(vec![parent_id.to_owned()]),
    }
}

fn file_id(f: api::File) -> upmirror::Result<IdBuf> {
    f.id.ok_or_else(|| upmirror::api_error!("Expected to receive an id from Google"))
}

fn map_file(f: api::File) -> upmirror::Result<RemoteEntry> {
    let id = f
        .id
        .ok_or_else(|| upmirror::api_error!("Expected to receive id from Google"))?;
    let name = f
        .name
        .ok_or_else(|| upmirror::api_error!("Expected to receive name from Google for {id}"))?;
    let mime_type = f.mime_type.ok_or_else(|| {
        upmirror::api_error!("Expected to receive mimeType from Google for {name}")
    })?;
    Ok(RemoteEntry {
        id,
        name,
        mime_type,
        parents: f.parents.unwrap_or_default(),
    })
}

mod api {
    use serde::{Deserialize, Serialize};
    use upmirror::{Id, IdBuf};

    use super::utils::{check_response, num_from_str};
    use crate::{error, oauth2::GetToken};

    #[derive(Default, Clone, Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct User {
        pub display_name: String,
        pub email_address: Option<String>,
    }

    #[derive(Default, Clone, Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Quota {
        #[serde(default, deserialize_with = "num_from_str")]
        pub limit: Option<i64>,
        #[serde(default, deserialize_with = "num_from_str")]
        pub usage: Option<i64>,
    }

    const ABOUT_FIELDS: &str = "kind,storageQuota,user";

    #[derive(Default, Clone, Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct About {
        pub kind: String,
        pub storage_quota: Quota,
        pub user: User,
    }

    pub const FILE_FIELDS: &str = "id,name,mimeType,parents";

    #[derive(Default, Clone, Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct File {
        #[serde(skip_serializing_if = "Option::is_none")]
        pub id: Option<IdBuf>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub name: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub mime_type: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub parents: Option<Vec<IdBuf>>,
    }

    #[derive(Default, Clone, Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct FileList {
        pub files: Option<Vec<File>>,
        pub next_page_token: Option<String>,
    }

    impl<A> super::GoogleDrive<A>
    where
        A: GetToken,
    {
        pub async fn about_get(&self) -> upmirror::Result<About> {
            let path = "/about";
            let query_params = [("fields", ABOUT_FIELDS)];

            let res = self.get_query(path, query_params).await?;
            let res = check_response("GET", path, res).await?;
            let about: About = res.json().await.map_err(error::api)?;
            if about.kind != "drive#about" {
                upmirror::api_bail!("/about returned wrong kind!");
            }
            Ok(about)
        }

        pub async fn files_list(
            &self,
            q: &str,
            page_token: Option<String>,
        ) -> upmirror::Result<FileList> {
            let path = "/files";

            let mut query_params = vec![
                ("q", q.to_string()),
                ("fields", format!("nextPageToken,files({FILE_FIELDS})")),
                ("pageSize", "1000".to_string()),
            ];
            if let Some(page_token) = page_token {
                query_params.push(("pageToken", page_token));
            }

            let res = self.get_query(path, query_params).await?;
            let res = check_response("GET", path, res).await?;
            res.json().await.map_err(error::api)
        }

        pub async fn files_create(&self, file: &File) -> upmirror::Result<File> {
            let path = "/files";
            let query_params = [("fields", FILE_FIELDS)];
            let res = self
                .send_json(reqwest::Method::POST, path, query_params, file)
                .await?;
            let res = check_response("POST", path, res).await?;
            res.json().await.map_err(error::api)
        }

        pub async fn files_update(&self, file_id: &Id, file: &File) -> upmirror::Result<File> {
            let path = format!("/files/{file_id}");
            let query_params = [("fields", FILE_FIELDS)];
            let res = self
                .send_json(reqwest::Method::PATCH, &path, query_params, file)
                .await?;
            let res = check_response("PATCH", &path, res).await?;
            res.json().await.map_err(error::api)
        }
    }
}

mod utils {
    use std::borrow::Borrow;

    use oauth2::AccessToken;
    use reqwest::{header, Response, StatusCode};
    use url::Url;
    use serde::{Deserialize, Deserializer, Serialize};

    use super::api;
    use crate::{error, oauth2::GetToken};

    pub fn num_from_str<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        use std::str::FromStr;

        let s = String::deserialize(deserializer)?;
        Ok(Some(i64::from_str(&s).map_err(serde::de::Error::custom)?))
    }

    pub fn status_error(method: &str, path: &str, status: StatusCode, body: &str) -> upmirror::Error {
        let msg = format!("{method} {path} returned {status}\n{body}");
        match status {
            StatusCode::CONFLICT | StatusCode::PRECONDITION_FAILED => upmirror::Error::Conflict(msg),
            StatusCode::UNAUTHORIZED => upmirror::Error::Auth(msg),
            _ => upmirror::Error::Api(msg),
        }
    }

    pub async fn response_error(method: &str, path: &str, res: Response) -> upmirror::Error {
        let status = res.status();
        match res.text().await {
            Ok(body) => status_error(method, path, status, &body),
            Err(err) => status_error(method, path, status, &err.to_string()),
        }
    }

    pub async fn check_response(
        method: &str,
        path: &str,
        res: Response,
    ) -> upmirror::Result<Response> {
        if !res.status().is_success() {
            return Err(response_error(method, path, res).await);
        }
        Ok(res)
    }

    impl<A> super::GoogleDrive<A>
    where
        A: GetToken,
    {
        pub async fn fetch_token(&self) -> upmirror::Result<AccessToken> {
            self.auth.get_token().await.map_err(error::auth)
        }

        pub async fn get_query<Q, K, V>(&self, path: &str, query_params: Q) -> upmirror::Result<Response>
        where
            Q: IntoIterator,
            Q::Item: Borrow<(K, V)>,
            K: AsRef<str>,
            V: AsRef<str>,
        {
            let token = self.fetch_token().await?;
            let url = url_with_query(&self.base_url, path, query_params)?;

            self.client
                .get(url)
                .header(header::USER_AGENT, &self.user_agent)
                .bearer_auth(token.secret())
                .send()
                .await
                .map_err(error::api)
        }

        pub async fn send_json<T, Q, K, V>(
            &self,
            method: reqwest::Method,
            path: &str,
            query_params: Q,
            body: &T,
        ) -> upmirror::Result<Response>
        where
            T: Serialize,
            Q: IntoIterator,
            Q::Item: Borrow<(K, V)>,
            K: AsRef<str>,
            V: AsRef<str>,
        {
            let token = self.fetch_token().await?;
            let url = url_with_query(&self.base_url, path, query_params)?;
            self.client
                .request(method, url)
                .bearer_auth(token.secret())
                .header(header::USER_AGENT, &self.user_agent)
                .json(body)
                .send()
                .await
                .map_err(error::api)
        }

        /// Starts a resumable upload session and returns its URL
        pub async fn upload_request(&self, file: &api::File, size: u64) -> upmirror::Result<Url> {
            let token = self.fetch_token().await?;

            let query_params = [("uploadType", "resumable"), ("fields", api::FILE_FIELDS)];
            let url = url_with_query(&self.upload_base_url, "/files", query_params)?;
            let res = self
                .client
                .post(url)
                .bearer_auth(token.secret())
                .header(header::USER_AGENT, &self.user_agent)
                .header("X-Upload-Content-Length", size)
                .json(file)
                .send()
                .await
                .map_err(error::api)?;
            let res = check_response("POST", "/upload/files", res).await?;

            let location = res
                .headers()
                .get(header::LOCATION)
                .ok_or_else(|| upmirror::api_error!("No location for upload session"))?;
            let location = location.to_str().map_err(error::api)?;
            Url::parse(location).map_err(error::api)
        }

        pub async fn upload_range(
            &self,
            url: Url,
            data: Vec<u8>,
            range_start: u64,
            range_len: u64,
        ) -> upmirror::Result<Response> {
            let token = self.fetch_token().await?;

            let data_len = data.len() as u64;
            debug_assert!(range_len >= range_start + data_len);

            let mut req = self
                .client
                .put(url)
                .bearer_auth(token.secret())
                .header(header::USER_AGENT, &self.user_agent)
                .header(header::CONTENT_LENGTH, data_len);
            if data_len > 0 && (range_start > 0 || data_len < range_len) {
                req = req.header(
                    header::CONTENT_RANGE,
                    format!(
                        "bytes {range_start}-{}/{range_len}",
                        range_start + data_len - 1
                    ),
                );
            }
            req.body(data).send().await.map_err(error::api)
        }
    }

    pub fn url_with_query<B, P, Q, K, V>(
        base_url: B,
        path: P,
        query_params: Q,
    ) -> upmirror::Result<Url>
    where
        B: AsRef<str>,
        P: AsRef<str>,
        Q: IntoIterator,
        Q::Item: Borrow<(K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let base = format!("{}{}", base_url.as_ref(), path.as_ref());
        Url::parse_with_params(&base, query_params).map_err(error::api)
    }
}
