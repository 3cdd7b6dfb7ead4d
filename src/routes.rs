use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

use crate::article::Article;
use crate::bookmarks::BookmarkStore;
use crate::config::{CityConfig, Config};
use crate::feed::FeedTracker;
use crate::fetcher::NewsClient;
use crate::preferences::CityPreference;

pub struct AppState {
    pub config: Arc<Config>,
    pub news: NewsClient,
    pub bookmarks: BookmarkStore,
    pub preference: CityPreference,
    pub feed: FeedTracker,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/cities", get(cities))
        .route("/news", get(news))
        .route("/news/top", get(top_headlines))
        .route("/feed", get(feed))
        .route(
            "/bookmarks",
            get(list_bookmarks).post(add_bookmark).delete(remove_bookmark),
        )
        .route("/bookmarks/status", get(bookmark_status))
        .route("/city", get(get_city).put(set_city))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// Custom error type
pub struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Error: {}", self.0),
        )
            .into_response()
    }
}

impl<E: Into<anyhow::Error>> From<E> for AppError {
    fn from(err: E) -> Self {
        AppError(err.into())
    }
}

#[derive(Deserialize)]
pub struct NewsQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Deserialize)]
pub struct FeedQuery {
    pub city: Option<String>,
}

#[derive(Deserialize)]
pub struct UrlQuery {
    pub url: String,
}

#[derive(Serialize)]
pub struct FeedEntry {
    #[serde(flatten)]
    pub article: Article,
    pub bookmarked: bool,
}

#[derive(Serialize)]
pub struct FeedResponse {
    pub generation: u64,
    pub city: Option<String>,
    pub articles: Vec<FeedEntry>,
}

#[derive(Serialize, Deserialize)]
pub struct BookmarkStatus {
    pub url: String,
    pub bookmarked: bool,
}

#[derive(Serialize, Deserialize)]
pub struct CityBody {
    pub city: Option<String>,
}

#[derive(Deserialize)]
pub struct SetCityBody {
    pub city: String,
}

// Route handlers
pub async fn health() -> impl IntoResponse {
    Html("OK")
}

pub async fn cities(State(state): State<Arc<AppState>>) -> Json<Vec<CityConfig>> {
    Json(state.config.cities.clone())
}

pub async fn news(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NewsQuery>,
) -> Json<Vec<Article>> {
    Json(state.news.fetch_articles_for_query(&query.q).await)
}

pub async fn top_headlines(State(state): State<Arc<AppState>>) -> Json<Vec<Article>> {
    Json(state.news.fetch_top_headlines().await)
}

/// Load the feed for the requested city, the stored city, or the default,
/// in that order. Responds with the latest accepted load, which may belong
/// to a newer request than this one.
pub async fn feed(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FeedQuery>,
) -> Json<FeedResponse> {
    let city = match query.city.filter(|c| !c.trim().is_empty()) {
        Some(city) => city,
        None => state.preference.get_or(&state.config.default_city).await,
    };

    let ticket = state.feed.begin(&city);
    let articles = state
        .news
        .fetch_articles_for_query(&state.config.query_for(&city))
        .await;
    state.feed.complete(ticket, articles).await;

    let snapshot = state.feed.snapshot().await;
    let saved: HashSet<String> = state
        .bookmarks
        .list()
        .await
        .into_iter()
        .map(|b| b.url)
        .collect();

    Json(FeedResponse {
        generation: snapshot.generation,
        city: snapshot.city,
        articles: snapshot
            .articles
            .into_iter()
            .map(|article| FeedEntry {
                bookmarked: saved.contains(&article.url),
                article,
            })
            .collect(),
    })
}

pub async fn list_bookmarks(State(state): State<Arc<AppState>>) -> Json<Vec<Article>> {
    Json(state.bookmarks.list().await)
}

pub async fn add_bookmark(
    State(state): State<Arc<AppState>>,
    Json(article): Json<Article>,
) -> Result<Response, AppError> {
    // url is the identity key
    if article.url.trim().is_empty() {
        return Ok((StatusCode::BAD_REQUEST, "Article url is required").into_response());
    }

    state.bookmarks.add(article).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

pub async fn remove_bookmark(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UrlQuery>,
) -> Result<StatusCode, AppError> {
    state.bookmarks.remove(&query.url).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn bookmark_status(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UrlQuery>,
) -> Json<BookmarkStatus> {
    let bookmarked = state.bookmarks.is_bookmarked(&query.url).await;
    Json(BookmarkStatus {
        url: query.url,
        bookmarked,
    })
}

pub async fn get_city(State(state): State<Arc<AppState>>) -> Json<CityBody> {
    Json(CityBody {
        city: state.preference.get().await,
    })
}

pub async fn set_city(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SetCityBody>,
) -> Result<StatusCode, AppError> {
    state.preference.set(&body.city).await?;
    Ok(StatusCode::NO_CONTENT)
}
