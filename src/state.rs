//! Published state shared between the pipeline and its observers.
//!
//! Each slot holds one sequence that is replaced wholesale on publish.
//! Requests take a [`Ticket`] when they start; a completion only becomes
//! visible if no newer ticket was issued for the same slot in the meantime.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// A read-only view of a published sequence
pub type Snapshot<T> = Arc<Vec<T>>;

/// Marks one in-flight request against a [`PublishedSlot`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
}

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What happened to a completed request's result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The result replaced the published state
    Published(T),
    /// A newer request was issued first; the result was discarded
    Stale(T),
}

impl<T> Outcome<T> {
    pub fn is_published(&self) -> bool {
        matches!(self, Outcome::Published(_))
    }

    pub fn into_inner(self) -> T {
        match self {
            Outcome::Published(value) | Outcome::Stale(value) => value,
        }
    }
}

/// A single-writer, copy-on-publish container for one result sequence
#[derive(Debug)]
pub struct PublishedSlot<T> {
    issued: AtomicU64,
    sender: watch::Sender<Snapshot<T>>,
}

impl<T> Default for PublishedSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PublishedSlot<T> {
    /// Create an empty slot
    pub fn new() -> Self {
        let (sender, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            issued: AtomicU64::new(0),
            sender,
        }
    }

    /// Start a request; any ticket issued earlier becomes stale
    pub fn begin(&self) -> Ticket {
        let generation = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        Ticket { generation }
    }

    /// Whether `ticket` is still the newest request for this slot
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.issued.load(Ordering::SeqCst) == ticket.generation
    }

    /// The currently published sequence
    pub fn snapshot(&self) -> Snapshot<T> {
        self.sender.borrow().clone()
    }

    /// Get notified whenever a new sequence is published
    pub fn subscribe(&self) -> watch::Receiver<Snapshot<T>> {
        self.sender.subscribe()
    }
}

impl<T: Clone> PublishedSlot<T> {
    /// Replace the published sequence if `ticket` is still current
    ///
    /// The staleness check runs under the channel lock, so a result can
    /// never overwrite one from a newer ticket.
    pub fn publish(&self, ticket: Ticket, items: Vec<T>) -> Outcome<Vec<T>> {
        let published = self.sender.send_if_modified(|current| {
            if !self.is_current(ticket) {
                return false;
            }
            *current = Arc::new(items.clone());
            true
        });

        if published {
            Outcome::Published(items)
        } else {
            Outcome::Stale(items)
        }
    }
}
