// src/page/html.rs
// =============================================================================
// Turns downloaded bytes into a document we can ask questions about:
// - which links does it contain (as absolute URLs)?
// - what is its <title>?
// - does its text contain the keyword?
//
// We use:
// - auto_encoder to decode bytes in whatever charset the server used
// - scraper (html5ever) to build the DOM and run CSS selectors
// - url to resolve relative hrefs against the page URL
//
// Note: scraper::Html is not Send, so a Document must be used up before
// the worker awaits anything again.
// =============================================================================

use scraper::{Html, Selector};
use url::Url;

pub struct Document {
    html: Html,
    base: Url,
}

impl Document {
    /// Decodes and parses a page
    ///
    /// Returns None when the page can't be used: the base URL is not an
    /// absolute URL (so links can't be resolved) or the decoded text is blank.
    pub fn parse(content: &[u8], base_url: &str) -> Option<Self> {
        let base = match Url::parse(base_url) {
            Ok(url) => url,
            Err(e) => {
                log::warn!("cannot parse page URL {base_url}: {e}");
                return None;
            }
        };

        let text = auto_encoder::auto_encode_bytes(content);
        if text.trim().is_empty() {
            log::debug!("{base_url}: page decoded to nothing");
            return None;
        }

        Some(Self {
            html: Html::parse_document(&text),
            base,
        })
    }

    /// Every <a href> on the page, made absolute
    ///
    /// No filtering happens here: duplicates, mailto: links and hrefs that
    /// don't resolve are all returned. The fetch step weeds them out later.
    pub fn links(&self) -> Vec<String> {
        self.html
            .select(&selector("a[href]"))
            .filter_map(|a| a.value().attr("href"))
            .map(|href| resolve(&self.base, href))
            .collect()
    }

    /// The text node(s) inside <title>
    pub fn title(&self) -> Vec<String> {
        self.html
            .select(&selector("title"))
            .flat_map(|title| title.text())
            .map(str::to_string)
            .collect()
    }

    /// All text in the document, nested elements included
    pub fn text(&self) -> String {
        self.html.root_element().text().collect()
    }

    /// True if `keyword` appears in the page text
    ///
    /// An empty keyword never matches (keyword search is off).
    pub fn contains_keyword(&self, keyword: &str) -> bool {
        !keyword.is_empty() && self.text().contains(keyword)
    }
}

// Our selectors are constants, so parsing them can only fail if we typo one.
fn selector(css: &'static str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid built-in selector {css:?}: {e:?}"))
}

// Relative hrefs are joined onto the page URL. If that fails the raw href
// is kept as-is.
fn resolve(base: &Url, href: &str) -> String {
    let href = href.trim();
    match base.join(href) {
        Ok(url) => url.to_string(),
        Err(_) => href.to_string(),
    }
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why keep hrefs we can't resolve?
//    - The link list is meant to be a faithful copy of what the page links
//      to. Filtering is not this module's job.
//
// 2. What does .text() return?
//    - An iterator over every text node below an element, in order
//    - Collecting it into a String gives the "rendered" page text
//    - Script and style contents are text nodes too, so they are included
// -----------------------------------------------------------------------------
