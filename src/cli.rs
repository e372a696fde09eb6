// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// link-spider is normally started by a parent process, which passes four
// positional arguments in a fixed order:
//
//   link-spider <start_url> <max_levels> <keyword> <search_type>
//
// The optional flags only tune the crawl (pool size, delays, limits) and
// all have defaults, so the parent never has to know about them.
// =============================================================================

use crate::crawl::{CrawlSettings, TraversalMode, DEFAULT_MAX_DELAY, DEFAULT_WORKERS};
use crate::page::{FetchConfig, DEFAULT_MAX_DOWNLOAD_SIZE, DEFAULT_TIMEOUT};
use clap::Parser;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "link-spider",
    version,
    about = "Crawl the web from one URL and stream every page found as JSON lines",
    long_about = "link-spider follows links breadth-first or depth-first from a start URL, \
                  down to a maximum number of levels. Every page it manages to parse is \
                  printed to stdout as one JSON object per line: \
                  {url, parent_url, level, keyword, title}. Diagnostics go to stderr."
)]
pub struct Cli {
    /// URL the crawl starts from (e.g., https://example.com)
    pub start_url: String,

    /// How many links deep to follow
    ///
    /// 0 = just the start page, 1 = start page + the pages it links to, etc.
    pub max_levels: u32,

    /// Text to look for on every page
    ///
    /// Pass "" to turn keyword search off.
    pub keyword: String,

    /// 0 = depth-first, 1 = breadth-first, 2 = single path (one worker,
    /// depth-first, stops at the first page at max level)
    pub search_type: TraversalMode,

    /// Number of concurrent workers (ignored for search type 2)
    #[arg(long, default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// Longest random pause a worker takes after each page, in milliseconds
    #[arg(long, default_value_t = DEFAULT_MAX_DELAY.as_millis() as u64)]
    pub max_delay_ms: u64,

    /// Timeout for each HTTP request, in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_secs())]
    pub timeout_secs: u64,

    /// Pages this many bytes or larger are skipped
    #[arg(long, default_value_t = DEFAULT_MAX_DOWNLOAD_SIZE)]
    pub max_download_size: usize,

    /// Seed for link shuffling and delays, for reproducible runs
    #[arg(long)]
    pub rng_seed: Option<u64>,

    /// Log progress to stderr (same as RUST_LOG=info)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn crawl_settings(&self) -> CrawlSettings {
        let mut settings = CrawlSettings::new(
            self.start_url.clone(),
            self.max_levels,
            self.keyword.clone(),
            self.search_type,
        );
        settings.workers = self.workers;
        settings.max_delay = Duration::from_millis(self.max_delay_ms);
        settings.rng_seed = self.rng_seed;
        settings
    }

    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig {
            timeout: Duration::from_secs(self.timeout_secs),
            max_download_size: self.max_download_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_arguments() {
        let cli = Cli::try_parse_from(["link-spider", "https://a.test", "3", "rust", "1"]).unwrap();
        assert_eq!(cli.start_url, "https://a.test");
        assert_eq!(cli.max_levels, 3);
        assert_eq!(cli.keyword, "rust");
        assert_eq!(cli.search_type, TraversalMode::BreadthFirst);
        assert_eq!(cli.workers, DEFAULT_WORKERS);
        assert_eq!(cli.rng_seed, None);
    }

    #[test]
    fn test_flag_defaults() {
        let cli = Cli::try_parse_from(["link-spider", "https://a.test", "1", "", "0"]).unwrap();

        let settings = cli.crawl_settings();
        assert_eq!(settings.workers, DEFAULT_WORKERS);
        assert_eq!(settings.max_delay, DEFAULT_MAX_DELAY);

        let fetch = cli.fetch_config();
        assert_eq!(fetch.timeout, DEFAULT_TIMEOUT);
        assert_eq!(fetch.max_download_size, DEFAULT_MAX_DOWNLOAD_SIZE);
    }

    #[test]
    fn test_empty_keyword_is_allowed() {
        let cli = Cli::try_parse_from(["link-spider", "https://a.test", "0", "", "2"]).unwrap();
        assert_eq!(cli.keyword, "");
        assert_eq!(cli.search_type, TraversalMode::SinglePath);
    }

    #[test]
    fn test_rejects_unknown_search_type() {
        assert!(Cli::try_parse_from(["link-spider", "https://a.test", "1", "", "7"]).is_err());
    }

    #[test]
    fn test_rejects_non_numeric_levels() {
        assert!(Cli::try_parse_from(["link-spider", "https://a.test", "x", "", "0"]).is_err());
    }

    #[test]
    fn test_settings_from_flags() {
        let cli = Cli::try_parse_from([
            "link-spider",
            "https://a.test",
            "2",
            "kw",
            "0",
            "--workers",
            "8",
            "--max-delay-ms",
            "0",
            "--timeout-secs",
            "5",
            "--rng-seed",
            "11",
        ])
        .unwrap();

        let settings = cli.crawl_settings();
        assert_eq!(settings.workers, 8);
        assert_eq!(settings.max_delay, Duration::ZERO);
        assert_eq!(settings.rng_seed, Some(11));
        assert_eq!(settings.mode, TraversalMode::DepthFirst);

        let fetch = cli.fetch_config();
        assert_eq!(fetch.timeout, Duration::from_secs(5));
        assert_eq!(fetch.max_download_size, DEFAULT_MAX_DOWNLOAD_SIZE);
    }
}
