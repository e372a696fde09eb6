// src/page/mod.rs
// =============================================================================
// Everything that happens to a single page: downloading it and reading it.
//
// Submodules:
// - fetch: HTTP download with the "is this worth parsing?" checks
// - html: decoding, parsing, links, title and keyword search
//
// PageSource is the seam between the crawler and the network. The crawler
// only ever asks "give me the bytes for this URL, or nothing", which lets
// the tests swap in a fake web that lives in memory.
// =============================================================================

mod fetch;
mod html;

use std::future::Future;

pub use fetch::{FetchConfig, HttpSource, DEFAULT_MAX_DOWNLOAD_SIZE, DEFAULT_TIMEOUT};
pub use html::Document;

// Something that can turn a URL into page bytes
//
// Returning None means "no usable content": the page failed to download,
// was not HTML, was too big... Implementations log the reason themselves.
pub trait PageSource: Send + Sync + 'static {
    fn fetch(&self, url: &str) -> impl Future<Output = Option<Vec<u8>>> + Send;
}
