//! # Render Work Queue
//!
//! Bounded-concurrency queue for rendering-adjacent work, with
//! caller-supplied priority so visible content processes first. There is no
//! cancellation token: a request is superseded by re-submitting under the
//! same id, and the stale entry is detected by an identity check at
//! execution time and discarded.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Default worker cap
pub const DEFAULT_CONCURRENCY: usize = 50;

type Job = Box<dyn FnOnce() + Send>;

struct Pending {
    id: String,
    priority: i32,
    seq: u64,
    job: Job,
}

#[derive(Default)]
struct QueueInner {
    pending: Vec<Pending>,
    /// id -> sequence number of the newest submission
    latest: HashMap<String, u64>,
    in_flight: usize,
    next_seq: u64,
}

/// Outcome of one pump step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueStep {
    /// A job ran
    Executed,
    /// Nothing pending
    Empty,
    /// The worker cap is reached; try again after a completion
    Saturated,
}

pub struct WorkQueue {
    inner: Arc<Mutex<QueueInner>>,
    max_concurrency: usize,
}

impl WorkQueue {
    pub fn new(max_concurrency: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(QueueInner::default())),
            max_concurrency,
        }
    }

    /// Queue a job under a request id. A later submission with the same id
    /// supersedes this one.
    pub fn submit(&self, id: impl Into<String>, priority: i32, job: impl FnOnce() + Send + 'static) {
        let id = id.into();
        let mut inner = self.inner.lock().unwrap();

        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.latest.insert(id.clone(), seq);
        inner.pending.push(Pending {
            id,
            priority,
            seq,
            job: Box::new(job),
        });
    }

    pub fn pending_len(&self) -> usize {
        self.inner.lock().unwrap().pending.len()
    }

    pub fn in_flight(&self) -> usize {
        self.inner.lock().unwrap().in_flight
    }

    /// Run the highest-priority current job, if the cap allows.
    ///
    /// Stale entries (a newer submission exists for their id) are dropped
    /// here, at execution time, without running.
    pub fn run_next(&self) -> QueueStep {
        let claimed = {
            let mut inner = self.inner.lock().unwrap();

            if inner.in_flight >= self.max_concurrency {
                return QueueStep::Saturated;
            }

            loop {
                // highest priority first, FIFO within equal priority
                let best = inner
                    .pending
                    .iter()
                    .enumerate()
                    .max_by(|(_, a), (_, b)| {
                        a.priority.cmp(&b.priority).then(b.seq.cmp(&a.seq))
                    })
                    .map(|(index, _)| index);

                let Some(index) = best else {
                    return QueueStep::Empty;
                };

                let entry = inner.pending.remove(index);
                let current = inner.latest.get(&entry.id).copied();
                if current != Some(entry.seq) {
                    debug!(id = %entry.id, "discarding superseded work item");
                    continue;
                }

                inner.in_flight += 1;
                break entry;
            }
        };

        (claimed.job)();

        let mut inner = self.inner.lock().unwrap();
        inner.in_flight -= 1;
        if inner.latest.get(&claimed.id).copied() == Some(claimed.seq) {
            inner.latest.remove(&claimed.id);
        }

        QueueStep::Executed
    }

    /// Pump until nothing executable remains
    pub fn drain(&self) {
        while self.run_next() == QueueStep::Executed {}
    }
}

impl Default for WorkQueue {
    fn default() -> Self {
        Self::new(DEFAULT_CONCURRENCY)
    }
}
