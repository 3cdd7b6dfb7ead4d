//! City Pulse - location-scoped news with offline bookmarks
//!
//! This crate fetches news for a city from a news search API, normalizes
//! the results, and keeps a durable, deduplicated list of bookmarked
//! articles alongside the user's selected city.

pub mod article;
pub mod bookmarks;
pub mod config;
pub mod db;
pub mod error;
pub mod feed;
pub mod fetcher;
pub mod preferences;
pub mod routes;
