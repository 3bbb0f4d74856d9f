//! Minimal HTTP/1.1 handling for the single redirect request of the PKCE flow

use std::str;

use anyhow::Context;
use chrono::Utc;
use http::{HeaderValue, Method, Request, Uri};
use tokio::io;

const CRLF: &[u8] = b"\r\n";

pub async fn parse_request<R>(reader: R) -> anyhow::Result<Request<Vec<u8>>>
where
    R: io::AsyncBufRead,
{
    use io::AsyncReadExt;

    tokio::pin!(reader);

    let mut buf = Vec::new();
    read_line(&mut reader, &mut buf).await?;
    if buf.is_empty() {
        anyhow::bail!("Empty HTTP request");
    }
    let (method, uri) = parse_command(&buf)?;

    let mut req = Request::builder().method(method).uri(uri);

    let mut content_length: Option<usize> = None;
    loop {
        buf.clear();
        read_line(&mut reader, &mut buf).await?;
        if buf.len() <= CRLF.len() {
            break;
        }
        let (name, value) = parse_header(&buf)?;
        if name.eq_ignore_ascii_case("transfer-encoding") {
            anyhow::bail!("Unsupported header: Transfer-Encoding")
        }
        if name.eq_ignore_ascii_case("content-length") {
            content_length = Some(value.parse()?);
        }
        req = req.header(name, value.parse::<HeaderValue>()?);
    }

    let mut body = vec![0; content_length.unwrap_or(0)];
    reader.read_exact(&mut body).await?;
    Ok(req.body(body)?)
}

fn parse_command(line: &[u8]) -> anyhow::Result<(Method, Uri)> {
    let line = str::from_utf8(line)?;
    let mut parts = line.trim_end().split(' ');

    let method = parts
        .next()
        .filter(|m| !m.is_empty())
        .with_context(|| format!("no method in HTTP header {line}"))?;
    let method = Method::from_bytes(method.as_bytes())
        .with_context(|| format!("Unrecognized method: {method}"))?;

    let uri = parts
        .next()
        .with_context(|| format!("no path in HTTP header {line}"))?;
    let uri: Uri = uri.parse()?;

    let protocol = parts
        .next()
        .with_context(|| format!("no protocol in HTTP header {line}"))?;
    if protocol != "HTTP/1.1" {
        anyhow::bail!("unsupported HTTP protocol in header {line}");
    }
    Ok((method, uri))
}

fn parse_header(line: &[u8]) -> anyhow::Result<(&str, &str)> {
    let line = str::from_utf8(line)?;
    let (name, value) = line
        .split_once(':')
        .with_context(|| format!("Invalid header: {line}"))?;
    Ok((name.trim(), value.trim()))
}

pub async fn write_response<W, B>(resp: http::Response<B>, writer: W) -> anyhow::Result<()>
where
    W: io::AsyncWrite,
    B: AsRef<[u8]>,
{
    use io::AsyncWriteExt;

    let (parts, body) = resp.into_parts();
    let body = body.as_ref();

    let mut head = format!("{:?} {}\r\n", parts.version, parts.status);
    if !parts.headers.contains_key(http::header::DATE) {
        head.push_str(&format!("Date: {}\r\n", Utc::now().to_rfc2822()));
    }
    if !parts.headers.contains_key(http::header::CONTENT_LENGTH) {
        head.push_str(&format!("Content-Length: {}\r\n", body.len()));
    }

    tokio::pin!(writer);
    writer.write_all(head.as_bytes()).await?;
    for (name, value) in parts.headers.iter() {
        writer.write_all(name.as_str().as_bytes()).await?;
        writer.write_all(b": ").await?;
        writer.write_all(value.as_bytes()).await?;
        writer.write_all(CRLF).await?;
    }
    writer.write_all(CRLF).await?;
    writer.write_all(body).await?;
    writer.flush().await?;
    Ok(())
}

/// Read a line terminated by CRLF, or whatever is left before EOF.
/// The terminator is included in the buffer.
async fn read_line<R>(reader: R, buf: &mut Vec<u8>) -> anyhow::Result<usize>
where
    R: io::AsyncBufRead,
{
    use io::AsyncBufReadExt;

    tokio::pin!(reader);
    let mut len = 0;
    loop {
        let sz = reader.read_until(b'\n', buf).await?;
        len += sz;
        if sz == 0 || buf.ends_with(CRLF) {
            break;
        }
    }
    Ok(len)
}
