// src/crawl/worker.rs
// =============================================================================
// One crawl worker. Many of these run at the same time, all pulling from
// the same frontier.
//
// Each turn of the loop:
// 1. Claim: take records from the frontier until one has a URL nobody
//    has claimed yet
// 2. Fetch: download it (no content = drop the record)
// 3. Parse: build the document (no document = drop the record)
// 4. Match: check for the keyword, read the title
// 5. Emit the record, then queue its links if we are not at max level yet
// 6. Mark the record done and sleep a random bit
//
// In single path mode the worker stops for good after emitting the first
// page that sits exactly at max level, and closes the frontier so the
// whole crawl ends.
// =============================================================================

use super::queue::Frontier;
use super::record::LinkRecord;
use super::Shared;
use crate::page::{Document, PageSource};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

// What the loop does after a record has been handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Continue,
    Stop,
}

pub(super) async fn run<S: PageSource>(shared: Arc<Shared<S>>, id: usize, mut rng: StdRng) {
    log::debug!("worker {id} started");

    while let Some(record) = claim_next(&shared).await {
        let step = visit(&shared, record, &mut rng).await;
        shared.frontier.mark_done();

        if step == Step::Stop {
            log::info!("worker {id}: single path reached level {}, stopping", shared.max_levels);
            shared.frontier.close();
            break;
        }

        let delay = politeness_delay(&mut rng, shared.max_delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    log::debug!("worker {id} finished");
}

// Takes records until one can be claimed
//
// A record whose URL is already in the visited set is a leftover duplicate.
// It still counts as a unit of work for the frontier, so it gets its own
// mark_done right away.
async fn claim_next<S: PageSource>(shared: &Shared<S>) -> Option<LinkRecord> {
    loop {
        let candidate = shared.frontier.get().await?;
        if shared.visited.claim(&candidate.url) {
            return Some(candidate);
        }
        shared.frontier.mark_done();
    }
}

async fn visit<S: PageSource>(shared: &Shared<S>, mut record: LinkRecord, rng: &mut StdRng) -> Step {
    let Some(content) = shared.source.fetch(&record.url).await else {
        return Step::Continue;
    };

    let expanding = record.level < shared.max_levels;
    let Some(links) = enrich(&mut record, &content, &shared.keyword, expanding) else {
        return Step::Continue;
    };

    shared.emit(record.clone());

    if expanding {
        expand(&shared.frontier, links, &record, rng);
        Step::Continue
    } else if shared.single_path && record.level == shared.max_levels {
        Step::Stop
    } else {
        Step::Continue
    }
}

// Parses the page, fills in keyword and title, and returns the page's
// links (only collected when `want_links` is set).
//
// Kept synchronous: the Document must be gone before the next .await.
fn enrich(
    record: &mut LinkRecord,
    content: &[u8],
    keyword: &str,
    want_links: bool,
) -> Option<Vec<String>> {
    let document = Document::parse(content, &record.url)?;

    record.keyword = Some(document.contains_keyword(keyword));
    record.title = Some(document.title());

    if want_links {
        Some(document.links())
    } else {
        Some(Vec::new())
    }
}

/// Queues every link as a child of `parent`
///
/// The batch is shuffled first so we don't hit a server in the exact order
/// its page lists links, and it goes in under one lock.
pub(super) fn expand<R: Rng + ?Sized>(
    frontier: &Frontier,
    links: Vec<String>,
    parent: &LinkRecord,
    rng: &mut R,
) {
    let mut children: Vec<LinkRecord> = links.into_iter().map(|url| parent.child(url)).collect();
    children.shuffle(rng);
    frontier.put_all(children);
}

// Uniform between zero and `max`
fn politeness_delay<R: Rng + ?Sized>(rng: &mut R, max: Duration) -> Duration {
    let max_ms = u64::try_from(max.as_millis()).unwrap_or(u64::MAX);
    Duration::from_millis(rng.random_range(0..=max_ms))
}
