//! Queue metrics for observability

use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Counters for one job queue
#[derive(Debug, Default)]
pub struct QueueMetrics {
    /// Jobs waiting in the channel
    queue_len: AtomicUsize,
    /// Jobs accepted by the queue
    enqueued: AtomicU64,
    /// Jobs finished with a 2xx
    completed: AtomicU64,
    /// Jobs stopped by a non-retryable error
    failed: AtomicU64,
    /// Retry attempts scheduled
    retried: AtomicU64,
    /// Jobs that used up every attempt
    dead: AtomicU64,
}

impl QueueMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_len(&self) -> usize {
        self.queue_len.load(Ordering::Relaxed)
    }

    pub fn set_queue_len(&self, len: usize) {
        self.queue_len.store(len, Ordering::Relaxed);
    }

    pub fn enqueued(&self) -> u64 {
        self.enqueued.load(Ordering::Relaxed)
    }

    pub fn inc_enqueued(&self) {
        self.enqueued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }

    pub fn inc_completed(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    pub fn inc_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn retried(&self) -> u64 {
        self.retried.load(Ordering::Relaxed)
    }

    pub fn inc_retried(&self) {
        self.retried.fetch_add(1, Ordering::Relaxed);
    }

    pub fn dead(&self) -> u64 {
        self.dead.load(Ordering::Relaxed)
    }

    pub fn inc_dead(&self) {
        self.dead.fetch_add(1, Ordering::Relaxed);
    }

    /// Jobs that reached a terminal state
    pub fn finished(&self) -> u64 {
        self.completed() + self.failed() + self.dead()
    }

    pub fn snapshot(&self) -> QueueSnapshot {
        QueueSnapshot {
            queue_len: self.queue_len(),
            enqueued: self.enqueued(),
            completed: self.completed(),
            failed: self.failed(),
            retried: self.retried(),
            dead: self.dead(),
        }
    }
}

/// Point-in-time copy of [`QueueMetrics`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueSnapshot {
    pub queue_len: usize,
    pub enqueued: u64,
    pub completed: u64,
    pub failed: u64,
    pub retried: u64,
    pub dead: u64,
}

impl fmt::Display for QueueSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "queued={} enqueued={} completed={} failed={} retried={} dead={}",
            self.queue_len, self.enqueued, self.completed, self.failed, self.retried, self.dead
        )
    }
}
