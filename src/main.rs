use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use city_pulse::bookmarks::BookmarkStore;
use city_pulse::config::Config;
use city_pulse::db::{Database, KeyValueStore, MemoryStore};
use city_pulse::feed::FeedTracker;
use city_pulse::fetcher::NewsClient;
use city_pulse::preferences::CityPreference;
use city_pulse::routes::{self, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "city_pulse=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config_path =
        std::env::var("CITY_PULSE_CONFIG").unwrap_or_else(|_| "city_pulse.toml".to_string());
    let mut config = Config::load(&config_path)?;
    config.apply_env();
    info!(
        "Loaded configuration from {} ({} cities)",
        config_path,
        config.cities.len()
    );

    // Initialize storage
    let store: Arc<dyn KeyValueStore> = if config.database_url == "memory" {
        info!("Using in-memory storage; bookmarks will not survive a restart");
        Arc::new(MemoryStore::new())
    } else {
        let db = Database::new(&config.database_url).await?;
        db.initialize().await?;
        info!("Database initialized");
        Arc::new(db)
    };

    let state = Arc::new(AppState {
        news: NewsClient::new(&config.news)?,
        bookmarks: BookmarkStore::new(store.clone()),
        preference: CityPreference::new(store),
        feed: FeedTracker::new(),
        config: Arc::new(config),
    });

    let listen_addr = state.config.listen_addr.clone();
    let app = routes::router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    info!("Server starting on http://{}", listen_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
