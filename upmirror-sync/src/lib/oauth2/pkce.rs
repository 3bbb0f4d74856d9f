use std::{borrow::Cow, net::SocketAddr};

use chrono::Utc;
use oauth2::{
    basic::BasicTokenResponse, AuthorizationCode, CsrfToken, PkceCodeChallenge, RedirectUrl,
};
use tokio::{io, net};

use super::{drive_scope, send, server, Client};
use crate::{error, uri};

impl Client {
    /// Authorization through the user's browser, redirected to a loopback server
    pub(super) async fn fetch_token_pkce(&self) -> upmirror::Result<BasicTokenResponse> {
        log::info!("Starting PKCE flow for {}", super::DRIVE_SCOPE);

        let addr: SocketAddr = ([127, 0, 0, 1], 0).into();
        let listener = net::TcpListener::bind(&addr).await?;
        let redirect_addr = listener.local_addr()?;

        let redirect_url =
            RedirectUrl::new(format!("http://{redirect_addr}")).map_err(error::auth)?;
        let redirect_url = Cow::Borrowed(&redirect_url);

        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        let (auth_url, csrf_state) = self
            .oauth2
            .authorize_url(CsrfToken::new_random)
            .set_redirect_uri(redirect_url.clone())
            .add_scope(drive_scope())
            .set_pkce_challenge(pkce_challenge)
            .url();

        log::info!("Opening browser to {auth_url}");
        eprintln!("If the browser does not open, visit this URL:\n{auth_url}");
        tokio::task::spawn_blocking(move || webbrowser::open(auth_url.as_str()));

        log::trace!("starting local server on {redirect_addr}");
        let (socket, addr) = listener.accept().await?;

        log::trace!("incoming request from {addr}");
        let (reader, writer) = io::split(socket);
        let reader = io::BufReader::new(reader);
        let writer = io::BufWriter::new(writer);
        let req = server::parse_request(reader).await?;
        let query = uri::QueryMap::parse(req.uri().query());

        if let Some(err) = query.get("error") {
            server::write_response(page(400, "Authorization was denied"), writer).await?;
            upmirror::auth_bail!("Authorization failed: {err}");
        }

        let code = query
            .get("code")
            .map(str::to_string)
            .map(AuthorizationCode::new)
            .ok_or_else(|| {
                upmirror::auth_error!(
                    "'code' was not returned by {}",
                    self.oauth2.auth_url().as_str()
                )
            })?;
        let state = query
            .get("state")
            .map(str::to_string)
            .map(CsrfToken::new)
            .ok_or_else(|| {
                upmirror::auth_error!(
                    "'state' was not returned by {}",
                    self.oauth2.auth_url().as_str()
                )
            })?;

        if state.secret() != csrf_state.secret() {
            log::error!("Failed PKCE challenge");
            server::write_response(page(401, "Could not verify the CSRF token :-("), writer)
                .await?;
            upmirror::auth_bail!("Could not verify the CSRF token");
        }

        log::trace!("exchanging code for token");

        let token_response = self
            .oauth2
            .exchange_code(code)
            .set_pkce_verifier(pkce_verifier)
            .set_redirect_uri(redirect_url)
            .request_async(|req| send(&self.http, req))
            .await
            .map_err(error::auth)?;

        server::write_response(page(200, "All good, you can close this window ;-)"), writer)
            .await?;

        Ok(token_response)
    }
}

fn page(status: u16, body: &'static str) -> http::Response<&'static str> {
    let mut resp = http::Response::new(body);
    *resp.status_mut() = http::StatusCode::from_u16(status).unwrap_or(http::StatusCode::OK);
    let headers = resp.headers_mut();
    headers.insert(http::header::SERVER, http::HeaderValue::from_static("upmirror"));
    headers.insert(
        http::header::CONNECTION,
        http::HeaderValue::from_static("close"),
    );
    if let Ok(date) = http::HeaderValue::from_str(&Utc::now().to_rfc2822()) {
        headers.insert(http::header::DATE, date);
    }
    resp
}
