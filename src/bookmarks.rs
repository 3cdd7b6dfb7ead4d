use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::article::Article;
use crate::db::{KeyValueStore, BOOKMARKS_KEY};
use crate::error::StoreError;

/// Saved articles, newest first, unique by url.
///
/// The whole collection is one JSON blob under [`BOOKMARKS_KEY`]; every
/// mutation rewrites it in full. Clones share state, and mutations are
/// serialized so concurrent callers cannot lose each other's updates.
#[derive(Clone)]
pub struct BookmarkStore {
    store: Arc<dyn KeyValueStore>,
    write_lock: Arc<Mutex<()>>,
}

impl BookmarkStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// The persisted collection. A missing blob is an empty collection;
    /// an unreadable or corrupt one is an error.
    pub async fn load(&self) -> Result<Vec<Article>, StoreError> {
        match self.store.get_item(BOOKMARKS_KEY).await? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }

    pub async fn list(&self) -> Vec<Article> {
        match self.load().await {
            Ok(bookmarks) => bookmarks,
            Err(e) => {
                error!("Error loading bookmarks: {}", e);
                Vec::new()
            }
        }
    }

    /// Prepend `article` unless its url is already saved.
    pub async fn add(&self, article: Article) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;

        let mut bookmarks = self.load_for_update().await.map_err(|e| {
            error!("Error adding bookmark: {}", e);
            e
        })?;
        if bookmarks.iter().any(|b| b.url == article.url) {
            return Ok(());
        }

        info!("Bookmarking {}", article.url);
        bookmarks.insert(0, article);
        self.save(&bookmarks).await.map_err(|e| {
            error!("Error adding bookmark: {}", e);
            e
        })
    }

    /// Drop every entry with this url. Always rewrites the collection, even
    /// when nothing matched.
    pub async fn remove(&self, url: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;

        let mut bookmarks = self.load_for_update().await.map_err(|e| {
            error!("Error removing bookmark: {}", e);
            e
        })?;
        let before = bookmarks.len();
        bookmarks.retain(|b| b.url != url);
        if bookmarks.len() == before {
            warn!("Removing bookmark that is not saved: {}", url);
        }

        self.save(&bookmarks).await.map_err(|e| {
            error!("Error removing bookmark: {}", e);
            e
        })
    }

    pub async fn contains(&self, url: &str) -> Result<bool, StoreError> {
        Ok(self.load().await?.iter().any(|b| b.url == url))
    }

    /// Whether `url` is saved. Read failures count as not saved.
    pub async fn is_bookmarked(&self, url: &str) -> bool {
        match self.contains(url).await {
            Ok(found) => found,
            Err(e) => {
                error!("Error checking bookmark: {}", e);
                false
            }
        }
    }

    /// Like [`load`](Self::load), but a corrupt blob is replaced rather
    /// than blocking every later write.
    async fn load_for_update(&self) -> Result<Vec<Article>, StoreError> {
        match self.load().await {
            Err(StoreError::Serialization(e)) => {
                warn!("Discarding unreadable bookmarks: {}", e);
                Ok(Vec::new())
            }
            other => other,
        }
    }

    async fn save(&self, bookmarks: &[Article]) -> Result<(), StoreError> {
        let json = serde_json::to_string(bookmarks)?;
        self.store.set_item(BOOKMARKS_KEY, &json).await
    }
}
