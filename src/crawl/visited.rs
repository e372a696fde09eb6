// src/crawl/visited.rs
// =============================================================================
// The set of URLs some worker has already claimed.
//
// A worker claims a URL right after taking it out of the frontier and
// before touching the network. Only the first claim for a URL succeeds,
// which is what keeps every page from being crawled twice.
//
// Nothing is ever removed: a URL whose fetch failed stays claimed, so it
// is never retried even if another page links to it again.
// =============================================================================

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

#[derive(Debug, Default)]
pub struct VisitedSet {
    urls: Mutex<HashSet<String>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks and inserts in one step
    ///
    /// Returns true if this call claimed the URL, false if it was already taken.
    pub fn claim(&self, url: &str) -> bool {
        let mut urls = self.urls.lock().unwrap_or_else(PoisonError::into_inner);
        if urls.contains(url) {
            return false;
        }
        urls.insert(url.to_string())
    }

    pub fn len(&self) -> usize {
        self.urls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_claim_only_once() {
        let visited = VisitedSet::new();
        assert!(visited.claim("https://a.test"));
        assert!(!visited.claim("https://a.test"));
        assert!(visited.claim("https://a.test/other"));
        assert_eq!(visited.len(), 2);
    }

    #[test]
    fn test_concurrent_claims_have_one_winner() {
        let visited = Arc::new(VisitedSet::new());

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let visited = Arc::clone(&visited);
                std::thread::spawn(move || visited.claim("https://race.test"))
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();

        assert_eq!(winners, 1);
        assert!(!visited.claim("https://race.test"));
        assert_eq!(visited.len(), 1);
    }
}
