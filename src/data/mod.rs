//! Data layer module
//!
//! Handles all data persistence:
//! - SQLite database operations (CRUD, toggles, stats)
//! - Feed aggregation queries (joins, projection, pagination)

mod database;
mod feed;
mod models;
mod pagination;

pub use database::Database;
pub use feed::{
    CommentFeedItem, FeedOwner, HistoryFeedItem, HistorySortKey, HistoryVideo, SubscriptionEntry,
    VideoFeedFilter, VideoFeedItem, VideoSortKey,
};
pub use models::*;
pub use pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, Page, PageRequest, SortDirection};

#[cfg(test)]
mod database_test;
