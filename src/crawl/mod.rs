// src/crawl/mod.rs
// =============================================================================
// This module runs the crawl itself.
//
// Features:
// - Breadth-first, depth-first, or "single path" depth-first traversal
// - A pool of workers sharing one frontier and one visited set
// - Depth limit (max levels below the start page)
// - Polite crawling with a random delay after every page
//
// crawl() is the supervisor: it seeds the frontier with the start URL,
// starts the workers, and waits until every queued link has been handled.
// Each crawled page is sent down a channel as a LinkRecord; the caller
// decides what to do with them (main.rs prints them as JSON lines).
//
// Rust concepts:
// - Arc: shared ownership of the state all workers use
// - JoinSet: a group of spawned tasks we can shut down together
// - mpsc channel: workers send records, one reader receives them
// =============================================================================

mod queue;
mod record;
mod visited;
mod worker;

pub use record::{LinkRecord, TraversalMode};

use crate::page::PageSource;
use queue::Frontier;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinSet;
use visited::VisitedSet;

/// Worker pool size for the multi-worker modes
pub const DEFAULT_WORKERS: usize = 50;
/// Upper bound for the random pause after each page
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(2);

// Everything the supervisor needs to know about one run
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    pub start_url: String,
    pub max_levels: u32,
    pub keyword: String,
    pub mode: TraversalMode,
    pub workers: usize,
    pub max_delay: Duration,
    /// Seeds every worker's RNG (worker i gets seed + i)
    pub rng_seed: Option<u64>,
}

impl CrawlSettings {
    pub fn new(
        start_url: impl Into<String>,
        max_levels: u32,
        keyword: impl Into<String>,
        mode: TraversalMode,
    ) -> Self {
        Self {
            start_url: start_url.into(),
            max_levels,
            keyword: keyword.into(),
            mode,
            workers: DEFAULT_WORKERS,
            max_delay: DEFAULT_MAX_DELAY,
            rng_seed: None,
        }
    }
}

// What happened during a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlSummary {
    /// URLs some worker claimed (fetched or not)
    pub claimed: usize,
    /// Records sent to the output
    pub emitted: usize,
    /// Records still queued when the run ended
    pub abandoned: usize,
    /// The run was ended by a worker (single path) rather than running dry
    pub stopped_early: bool,
}

// State shared by every worker of one run
pub(crate) struct Shared<S> {
    frontier: Frontier,
    visited: VisitedSet,
    source: S,
    keyword: String,
    max_levels: u32,
    single_path: bool,
    max_delay: Duration,
    records: UnboundedSender<LinkRecord>,
    emitted: AtomicUsize,
}

impl<S> Shared<S> {
    fn emit(&self, record: LinkRecord) {
        if self.records.send(record).is_ok() {
            self.emitted.fetch_add(1, Ordering::Relaxed);
        } else {
            log::debug!("record receiver is gone, dropping output");
        }
    }
}

// Crawls starting from settings.start_url
//
// Parameters:
//   settings: start URL, depth limit, keyword, traversal mode and pool knobs
//   source: where page bytes come from (HttpSource in production)
//   records: every successfully parsed page is sent here, enriched
//
// Returns once the frontier is exhausted (or a single path run has reached
// its last level).
pub async fn crawl<S: PageSource>(
    settings: CrawlSettings,
    source: S,
    records: UnboundedSender<LinkRecord>,
) -> CrawlSummary {
    let mode = settings.mode;
    let worker_count = mode.worker_count(settings.workers);

    let shared = Arc::new(Shared {
        frontier: Frontier::new(mode.discipline()),
        visited: VisitedSet::new(),
        source,
        keyword: settings.keyword,
        max_levels: settings.max_levels,
        single_path: mode.is_single_path(),
        max_delay: settings.max_delay,
        records,
        emitted: AtomicUsize::new(0),
    });

    log::info!(
        "crawling {} ({mode}, {:?} frontier, {worker_count} worker(s), max level {})",
        settings.start_url,
        shared.frontier.discipline(),
        shared.max_levels,
    );

    shared.frontier.put(LinkRecord::seed(settings.start_url));

    let mut workers = JoinSet::new();
    for id in 0..worker_count {
        let rng = worker_rng(settings.rng_seed, id);
        workers.spawn(worker::run(Arc::clone(&shared), id, rng));
    }

    shared.frontier.join().await;
    let stopped_early = shared.frontier.is_closed();

    // Idle workers are parked in get(); closing wakes them up with None.
    // Anyone still sleeping off a politeness delay is simply cancelled.
    shared.frontier.close();
    workers.shutdown().await;

    let summary = CrawlSummary {
        claimed: shared.visited.len(),
        emitted: shared.emitted.load(Ordering::Relaxed),
        abandoned: shared.frontier.len(),
        stopped_early,
    };
    log::info!(
        "crawl {}: {} claimed, {} emitted, {} left in frontier",
        if summary.stopped_early { "stopped early" } else { "finished" },
        summary.claimed,
        summary.emitted,
        summary.abandoned
    );
    summary
}

fn worker_rng(seed: Option<u64>, id: usize) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(id as u64)),
        None => StdRng::from_os_rng(),
    }
}
