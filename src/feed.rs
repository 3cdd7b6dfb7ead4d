use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::RwLock;
use tracing::debug;

use crate::article::Article;

/// Handle for one in-flight feed load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedTicket {
    pub generation: u64,
    pub city: String,
}

#[derive(Debug, Clone, Default)]
pub struct FeedSnapshot {
    pub generation: u64,
    pub city: Option<String>,
    pub articles: Vec<Article>,
}

/// Keeps only the result of the most recently issued feed load, so a slow
/// response for an earlier city never replaces a newer one.
#[derive(Default)]
pub struct FeedTracker {
    issued: AtomicU64,
    current: RwLock<FeedSnapshot>,
}

impl FeedTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self, city: &str) -> FeedTicket {
        let generation = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        FeedTicket {
            generation,
            city: city.to_string(),
        }
    }

    pub fn is_latest(&self, ticket: &FeedTicket) -> bool {
        self.issued.load(Ordering::SeqCst) == ticket.generation
    }

    /// Store `articles` if `ticket` is still the latest. Returns whether
    /// the result was kept.
    pub async fn complete(&self, ticket: FeedTicket, articles: Vec<Article>) -> bool {
        let mut current = self.current.write().await;
        // Checked under the lock so two completions cannot interleave
        if !self.is_latest(&ticket) {
            debug!(
                "Discarding stale feed for '{}' (generation {})",
                ticket.city, ticket.generation
            );
            return false;
        }

        *current = FeedSnapshot {
            generation: ticket.generation,
            city: Some(ticket.city),
            articles,
        };
        true
    }

    pub async fn snapshot(&self) -> FeedSnapshot {
        self.current.read().await.clone()
    }
}
