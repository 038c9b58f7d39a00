//! Data models
//!
//! Rust structs representing database entities.
//! All models use ULID for IDs and chrono for timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// ID Types
// =============================================================================

/// Entity ID wrapper (ULID format, 26 characters)
///
/// Example: "01ARZ3NDEKTSV4RRFFQ69G5FAV"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    /// Generate a new ULID
    pub fn new() -> Self {
        Self(ulid::Ulid::new().to_string())
    }

    /// Create from existing string
    pub fn from_string(s: String) -> Self {
        Self(s)
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tags
// =============================================================================

/// The closed set of video tags.
pub const ALLOWED_TAGS: [&str; 6] = ["Music", "Sports", "Gaming", "Movies", "News", "Live"];

/// Whether a tag belongs to the closed tag set.
pub fn is_allowed_tag(tag: &str) -> bool {
    ALLOWED_TAGS.contains(&tag)
}

/// Keep only tags from the closed set, preserving order, dropping repeats.
pub fn filter_tags<I: IntoIterator<Item = String>>(tags: I) -> Vec<String> {
    let mut kept: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.trim().to_string();
        if is_allowed_tag(&tag) && !kept.contains(&tag) {
            kept.push(tag);
        }
    }
    kept
}

// =============================================================================
// User
// =============================================================================

/// A registered user (channel)
///
/// `password_hash` and `refresh_token` never leave the data layer;
/// responses use [`UserPublic`].
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
    /// Media-host URL for the avatar image
    pub avatar_url: String,
    /// Media-host URL for the cover image
    pub cover_url: Option<String>,
    /// Argon2id PHC string
    pub password_hash: String,
    /// Currently valid refresh token, if logged in
    pub refresh_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public view of a user, safe to serialize into responses
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPublic {
    pub id: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub avatar_url: String,
    pub cover_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserPublic {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            avatar_url: user.avatar_url,
            cover_url: user.cover_url,
            created_at: user.created_at,
        }
    }
}

// =============================================================================
// Video
// =============================================================================

/// A published (or drafted) video
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Video {
    pub id: String,
    pub owner_id: String,
    /// Media-host URL for the video file
    pub video_url: String,
    /// Media-host URL for the thumbnail
    pub thumbnail_url: String,
    pub title: String,
    pub description: String,
    /// Duration in seconds, as reported by the media host
    pub duration: f64,
    pub views: i64,
    pub is_published: bool,
    /// JSON array of tag names from the closed tag set
    pub tags: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Video {
    /// Decode the stored tags JSON; malformed data reads as no tags.
    pub fn tag_list(&self) -> Vec<String> {
        serde_json::from_str(&self.tags).unwrap_or_default()
    }
}

// =============================================================================
// Comment
// =============================================================================

/// A comment on a video
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Comment {
    pub id: String,
    pub video_id: String,
    pub owner_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Tweet
// =============================================================================

/// A short text post on a user's channel
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Tweet {
    pub id: String,
    pub owner_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Junction entities
// =============================================================================

/// Target of a like: exactly one of the three entity kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeTarget<'a> {
    Video(&'a str),
    Comment(&'a str),
    Tweet(&'a str),
}

impl LikeTarget<'_> {
    /// Column name holding this target's id in the likes table.
    pub fn column(&self) -> &'static str {
        match self {
            Self::Video(_) => "video_id",
            Self::Comment(_) => "comment_id",
            Self::Tweet(_) => "tweet_id",
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Video(id) | Self::Comment(id) | Self::Tweet(id) => id,
        }
    }
}

/// Like junction row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Like {
    pub id: String,
    pub liked_by: String,
    pub video_id: Option<String>,
    pub comment_id: Option<String>,
    pub tweet_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Subscription junction row: subscriber follows channel
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Subscription {
    pub id: String,
    pub subscriber_id: String,
    pub channel_id: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Playlist
// =============================================================================

/// A named, ordered collection of videos
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Playlist {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Watch history
// =============================================================================

/// One watch-history entry: user watched video at watched_at.
///
/// The table holds at most one row per (user, video); re-watching
/// moves the entry to the front by updating watched_at.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WatchHistoryEntry {
    pub user_id: String,
    pub video_id: String,
    pub watched_at: DateTime<Utc>,
}

// =============================================================================
// Channel aggregates
// =============================================================================

/// Aggregated statistics for a channel (dashboard view)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStats {
    pub total_videos: i64,
    pub total_subscribers: i64,
    pub total_likes: i64,
    pub total_views: i64,
}
