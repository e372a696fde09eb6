// src/crawl/queue.rs
// =============================================================================
// The frontier: the shared queue of links that still need crawling.
//
// How it works:
// 1. put()/put_all() add records and bump an "unfinished" counter
// 2. get() waits until a record is available and hands it to one worker
// 3. mark_done() is called once per record a worker took out
// 4. join() waits until every put has been matched by a mark_done
//
// The same queue serves breadth-first (take from the front) and depth-first
// (take from the back) crawls. Which one is decided when it is created.
//
// close() ends the run early: waiting workers get None and join() returns.
//
// Rust concepts:
// - Mutex: only one task touches the VecDeque at a time
// - Notify: lets async tasks sleep until something changes
// =============================================================================

use super::record::{Discipline, LinkRecord};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;

#[derive(Debug, Default)]
struct State {
    items: VecDeque<LinkRecord>,
    // records put but not yet marked done (queued + in flight)
    unfinished: usize,
    closed: bool,
}

#[derive(Debug)]
pub struct Frontier {
    discipline: Discipline,
    state: Mutex<State>,
    available: Notify,
    drained: Notify,
}

impl Frontier {
    pub fn new(discipline: Discipline) -> Self {
        Self {
            discipline,
            state: Mutex::new(State::default()),
            available: Notify::new(),
            drained: Notify::new(),
        }
    }

    pub fn discipline(&self) -> Discipline {
        self.discipline
    }

    // A panicking worker must not wedge the whole crawl, so a poisoned
    // lock is simply taken over.
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds one record without blocking
    pub fn put(&self, record: LinkRecord) {
        self.put_all(std::iter::once(record));
    }

    /// Adds a batch of records under a single lock acquisition, so no other
    /// worker can interleave its own links in the middle of the batch.
    pub fn put_all<I>(&self, records: I)
    where
        I: IntoIterator<Item = LinkRecord>,
    {
        let added = {
            let mut state = self.lock();
            if state.closed {
                return;
            }
            let before = state.items.len();
            state.items.extend(records);
            let added = state.items.len() - before;
            state.unfinished += added;
            added
        };

        for _ in 0..added {
            self.available.notify_one();
        }
    }

    fn try_take(&self) -> Taken {
        let mut state = self.lock();
        if state.closed {
            return Taken::Closed;
        }
        let next = match self.discipline {
            Discipline::Fifo => state.items.pop_front(),
            Discipline::Lifo => state.items.pop_back(),
        };
        match next {
            Some(record) => Taken::Record(record),
            None => Taken::Empty,
        }
    }

    /// Waits for the next record
    ///
    /// Returns None once the frontier has been closed.
    pub async fn get(&self) -> Option<LinkRecord> {
        loop {
            // Register interest before looking, so a put() that lands between
            // the check and the await still wakes us.
            let notified = self.available.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            match self.try_take() {
                Taken::Record(record) => return Some(record),
                Taken::Closed => return None,
                Taken::Empty => notified.await,
            }
        }
    }

    /// Marks one record taken by get() as finished
    pub fn mark_done(&self) {
        let finished = {
            let mut state = self.lock();
            match state.unfinished.checked_sub(1) {
                Some(left) => state.unfinished = left,
                None => log::debug!("mark_done called more times than records were put"),
            }
            state.unfinished == 0
        };

        if finished {
            self.drained.notify_waiters();
        }
    }

    /// Waits until every record put has been marked done (or the frontier is closed)
    pub async fn join(&self) {
        loop {
            let notified = self.drained.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let state = self.lock();
                if state.closed || state.unfinished == 0 {
                    return;
                }
            }
            notified.await;
        }
    }

    /// Stops the frontier: waiting and future get() calls return None,
    /// join() returns, and later puts are ignored.
    pub fn close(&self) {
        self.lock().closed = true;
        self.available.notify_waiters();
        self.drained.notify_waiters();
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Records currently waiting in the queue (not counting in-flight ones)
    pub fn len(&self) -> usize {
        self.lock().items.len()
    }
}

enum Taken {
    Record(LinkRecord),
    Empty,
    Closed,
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why is the dedup check not in here?
//    - put() never looks at the visited set, so the same URL can sit in the
//      queue more than once. Workers throw the extra copies away when they
//      try to claim them (see visited.rs).
//
// 2. Why an "unfinished" counter instead of just items.len()?
//    - A record that a worker is still fetching is no longer in the queue,
//      but its page may still add more links. The crawl is only over when
//      nothing is queued AND nothing is in flight.
//
// 3. Why std::sync::Mutex in async code?
//    - The lock is never held across an .await, so the cheaper blocking
//      mutex is fine and put() can stay a plain (non-async) function.
// -----------------------------------------------------------------------------
