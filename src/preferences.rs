use std::sync::Arc;

use tracing::error;

use crate::db::{KeyValueStore, SELECTED_CITY_KEY};
use crate::error::StoreError;

/// The last city the user picked. Stored verbatim.
#[derive(Clone)]
pub struct CityPreference {
    store: Arc<dyn KeyValueStore>,
}

impl CityPreference {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn load(&self) -> Result<Option<String>, StoreError> {
        self.store.get_item(SELECTED_CITY_KEY).await
    }

    /// `None` until a city is set, or when the store cannot be read.
    pub async fn get(&self) -> Option<String> {
        match self.load().await {
            Ok(city) => city,
            Err(e) => {
                error!("Error loading city: {}", e);
                None
            }
        }
    }

    pub async fn set(&self, city: &str) -> Result<(), StoreError> {
        self.store
            .set_item(SELECTED_CITY_KEY, city)
            .await
            .map_err(|e| {
                error!("Error saving city: {}", e);
                e
            })
    }

    /// Stored city, or `default` when none has been chosen. A blank
    /// stored value also falls back.
    pub async fn get_or(&self, default: &str) -> String {
        self.get()
            .await
            .filter(|city| !city.trim().is_empty())
            .unwrap_or_else(|| default.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    fn create_test_preference() -> (CityPreference, Arc<MemoryStore>) {
        let memory = Arc::new(MemoryStore::new());
        (CityPreference::new(memory.clone()), memory)
    }

    #[tokio::test]
    async fn test_absent_before_first_set() {
        let (preference, _) = create_test_preference();
        assert_eq!(preference.get().await, None);
        assert_eq!(preference.get_or("New York").await, "New York");
    }

    #[tokio::test]
    async fn test_round_trip_is_verbatim() {
        let (preference, _) = create_test_preference();
        preference.set("  São Paulo ").await.unwrap();
        assert_eq!(preference.get().await.as_deref(), Some("  São Paulo "));

        preference.set("Tokyo").await.unwrap();
        assert_eq!(preference.get().await.as_deref(), Some("Tokyo"));
        assert_eq!(preference.get_or("New York").await, "Tokyo");
    }

    #[tokio::test]
    async fn test_empty_string_is_kept() {
        let (preference, _) = create_test_preference();
        preference.set("").await.unwrap();
        assert_eq!(preference.get().await.as_deref(), Some(""));
        assert_eq!(preference.get_or("New York").await, "New York");
    }

    #[tokio::test]
    async fn test_failures() {
        let (preference, memory) = create_test_preference();
        preference.set("Tokyo").await.unwrap();
        memory.close();

        assert_eq!(preference.get().await, None);
        assert!(preference.load().await.is_err());
        assert!(preference.set("Delhi").await.is_err());
    }
}
