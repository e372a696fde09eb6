// src/page/fetch.rs
// =============================================================================
// Downloads pages over HTTP, but only the ones worth parsing.
//
// A response is accepted when:
// - the status is 2xx
// - the declared Content-Length (missing = 0) is under the size limit
// - the Content-Type is text/html, or there is no Content-Type at all
// - the first 1024 bytes of the body contain an "<html" tag
//
// Anything else (timeouts, DNS errors, PDFs, huge files...) is logged to
// stderr and turned into "no content". A failed fetch is never an error
// for the crawler, just a page that produced nothing.
//
// Rust concepts:
// - thiserror: derive Display/Error for our own error enum
// - Streams: reading the body chunk by chunk instead of all at once
// =============================================================================

use super::PageSource;
use futures::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use thiserror::Error;

/// Bodies this big (or bigger) are not downloaded
pub const DEFAULT_MAX_DOWNLOAD_SIZE: usize = 500_000;
/// Per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);
/// The "<html" tag must show up within this many leading bytes
const SNIFF_WINDOW: usize = 1024;

// Why a page was refused
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP {0}")]
    Status(StatusCode),
    #[error("body too large ({0} bytes)")]
    TooLarge(usize),
    #[error("not an HTML content type: {0}")]
    ContentType(String),
    #[error("no <html tag near the start of the body")]
    NotHtml,
    #[error("empty body")]
    Empty,
}

// Settings for the HTTP source
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub timeout: Duration,
    pub max_download_size: usize,
}

// The real, network-backed page source
//
// Client is reference counted inside, so cloning HttpSource is cheap and
// every worker shares one connection pool.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    max_download_size: usize,
}

impl HttpSource {
    pub fn new(config: FetchConfig) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            max_download_size: config.max_download_size,
        })
    }

    async fn try_fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "text/html")
            .send()
            .await?;

        admit(&response, self.max_download_size)?;
        read_body(response, self.max_download_size).await
    }
}

impl PageSource for HttpSource {
    async fn fetch(&self, url: &str) -> Option<Vec<u8>> {
        match self.try_fetch(url).await {
            Ok(body) => Some(body),
            Err(FetchError::Transport(e)) => {
                log::warn!("{url}: {e}");
                None
            }
            Err(e) => {
                log::debug!("skipping {url}: {e}");
                None
            }
        }
    }
}

// Checks status and headers before we read any of the body
fn admit(response: &Response, max_size: usize) -> Result<(), FetchError> {
    let headers = response.headers();
    let content_length = headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<usize>().ok());
    let content_type = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok());

    check_headers(response.status(), content_length, content_type, max_size)
}

// The header part of the admission gate, split out so it can be tested
// without a server.
fn check_headers(
    status: StatusCode,
    content_length: Option<usize>,
    content_type: Option<&str>,
    max_size: usize,
) -> Result<(), FetchError> {
    if !status.is_success() {
        return Err(FetchError::Status(status));
    }

    let declared = content_length.unwrap_or(0);
    if declared >= max_size {
        return Err(FetchError::TooLarge(declared));
    }

    if let Some(content_type) = content_type {
        if !is_html_media_type(content_type) {
            return Err(FetchError::ContentType(content_type.to_string()));
        }
    }

    Ok(())
}

// "text/html; charset=utf-8" -> true, "application/pdf" -> false
fn is_html_media_type(content_type: &str) -> bool {
    let media_type = content_type.split(';').next().unwrap_or("").trim();
    media_type.eq_ignore_ascii_case("text/html")
}

// Cheap sniff for servers that lie about their Content-Type
fn looks_like_html(first_chunk: &[u8]) -> bool {
    const MARKER: &[u8] = b"<html";
    first_chunk
        .windows(MARKER.len())
        .any(|window| window.eq_ignore_ascii_case(MARKER))
}

async fn read_body(response: Response, max_size: usize) -> Result<Vec<u8>, FetchError> {
    let mut stream = response.bytes_stream();
    let mut body = Vec::new();
    let mut sniffed = false;

    while let Some(chunk) = stream.next().await {
        body.extend_from_slice(&chunk?);
        // Content-Length can be missing, so keep counting ourselves
        if body.len() >= max_size {
            return Err(FetchError::TooLarge(body.len()));
        }
        // Servers may flush the doctype on its own, so sniff a fixed window
        // rather than whatever the first network read returned
        if !sniffed && body.len() >= SNIFF_WINDOW {
            if !looks_like_html(&body[..SNIFF_WINDOW]) {
                return Err(FetchError::NotHtml);
            }
            sniffed = true;
        }
    }

    if body.is_empty() {
        return Err(FetchError::Empty);
    }
    if !sniffed && !looks_like_html(&body) {
        return Err(FetchError::NotHtml);
    }

    Ok(body)
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why not response.text()?
//    - text() downloads the whole body before we can look at it
//    - Streaming lets us give up after the first 1KB if it is not HTML,
//      and stop early if the body grows past the size limit
//
// 2. Why Vec<u8> and not String?
//    - We don't know the charset yet. html.rs decodes the bytes later.
//
// 3. Why are most failures logged at debug but transport errors at warn?
//    - "this link was a PDF" is normal crawling noise
//    - "the connection timed out" is worth seeing by default
// -----------------------------------------------------------------------------
