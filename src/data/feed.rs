//! Feed aggregation queries
//!
//! The join-shaped read side of the store: video listings with owner and
//! viewer-relative like state, comment pages, watch-history pages, liked
//! videos, and subscription rosters.
//!
//! Every listing is built from the same fixed stage order (match, owner
//! join, like join, projection, sort, paginate) expressed as one SQL
//! statement per page plus a COUNT over the identical match stage. A
//! dangling owner or video reference yields a null sub-object instead of
//! dropping the row. The row id is always the final sort key, so ordering
//! is stable within a single execution even when the sort field ties.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{QueryBuilder, Sqlite};

use super::database::Database;
use super::models::Video;
use super::pagination::{Page, PageRequest, SortDirection};
use crate::error::AppError;

// =============================================================================
// Filters and sort keys
// =============================================================================

/// Match-stage filters for the video feed
#[derive(Debug, Clone, Default)]
pub struct VideoFeedFilter {
    /// Case-insensitive substring over title and description
    pub search: Option<String>,
    /// Restrict to these owner ids (pre-resolved from username/fullname
    /// filters); an empty list matches nothing
    pub owner_ids: Option<Vec<String>>,
    /// Exact membership in the video's tag list
    pub tag: Option<String>,
}

/// Whitelisted sort fields for video listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoSortKey {
    #[default]
    CreatedAt,
    Views,
    Duration,
    Title,
}

impl VideoSortKey {
    /// Parse a caller-supplied sort field; unknown fields fall back to
    /// creation time.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("views") => Self::Views,
            Some("duration") => Self::Duration,
            Some("title") => Self::Title,
            Some("createdAt") | Some("created_at") => Self::CreatedAt,
            _ => Self::CreatedAt,
        }
    }

    fn as_column(&self) -> &'static str {
        match self {
            Self::CreatedAt => "v.created_at",
            Self::Views => "v.views",
            Self::Duration => "v.duration",
            Self::Title => "v.title",
        }
    }
}

/// Whitelisted sort fields for watch-history listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistorySortKey {
    #[default]
    WatchedAt,
    Title,
    Views,
}

impl HistorySortKey {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("title") => Self::Title,
            Some("views") => Self::Views,
            Some("watchedAt") | Some("watched_at") => Self::WatchedAt,
            _ => Self::WatchedAt,
        }
    }

    fn as_column(&self) -> &'static str {
        match self {
            Self::WatchedAt => "w.watched_at",
            Self::Title => "v.title",
            Self::Views => "v.views",
        }
    }
}

/// Escape LIKE metacharacters and wrap the term in wildcards.
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

// =============================================================================
// Projected row shapes
// =============================================================================

/// Owner sub-object attached to feed rows
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedOwner {
    pub id: String,
    pub username: String,
    pub full_name: String,
    pub avatar_url: String,
}

/// One video row of a feed listing
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoFeedItem {
    pub id: String,
    pub video_url: String,
    pub thumbnail_url: String,
    pub title: String,
    pub description: String,
    pub duration: f64,
    pub views: i64,
    pub is_published: bool,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub owner: Option<FeedOwner>,
    pub is_liked_by_viewer: bool,
}

#[derive(Debug, sqlx::FromRow)]
struct VideoFeedSqlRow {
    id: String,
    video_url: String,
    thumbnail_url: String,
    title: String,
    description: String,
    duration: f64,
    views: i64,
    is_published: bool,
    tags: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    owner_id: String,
    owner_username: Option<String>,
    owner_full_name: Option<String>,
    owner_avatar_url: Option<String>,
    liked_by_viewer: bool,
}

impl From<VideoFeedSqlRow> for VideoFeedItem {
    fn from(row: VideoFeedSqlRow) -> Self {
        let owner = match (row.owner_username, row.owner_full_name, row.owner_avatar_url) {
            (Some(username), Some(full_name), Some(avatar_url)) => Some(FeedOwner {
                id: row.owner_id,
                username,
                full_name,
                avatar_url,
            }),
            _ => None,
        };

        Self {
            id: row.id,
            video_url: row.video_url,
            thumbnail_url: row.thumbnail_url,
            title: row.title,
            description: row.description,
            duration: row.duration,
            views: row.views,
            is_published: row.is_published,
            tags: serde_json::from_str(&row.tags).unwrap_or_default(),
            created_at: row.created_at,
            updated_at: row.updated_at,
            owner,
            is_liked_by_viewer: row.liked_by_viewer,
        }
    }
}

/// One comment row of a video's comment page
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentFeedItem {
    pub id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub owner: Option<FeedOwner>,
}

#[derive(Debug, sqlx::FromRow)]
struct CommentFeedSqlRow {
    id: String,
    content: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    owner_id: String,
    owner_username: Option<String>,
    owner_full_name: Option<String>,
    owner_avatar_url: Option<String>,
}

/// One watch-history row: when it was watched plus the video (null if
/// the reference dangles)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryFeedItem {
    pub watched_at: DateTime<Utc>,
    pub video: Option<HistoryVideo>,
}

/// Video projection inside a history row
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryVideo {
    pub id: String,
    pub title: String,
    pub description: String,
    pub duration: f64,
    pub views: i64,
    pub video_url: String,
    pub thumbnail_url: String,
    pub created_at: DateTime<Utc>,
    pub owner: Option<FeedOwner>,
}

#[derive(Debug, sqlx::FromRow)]
struct HistoryFeedSqlRow {
    watched_at: DateTime<Utc>,
    video_id: Option<String>,
    title: Option<String>,
    description: Option<String>,
    duration: Option<f64>,
    views: Option<i64>,
    video_url: Option<String>,
    thumbnail_url: Option<String>,
    video_created_at: Option<DateTime<Utc>>,
    owner_id: Option<String>,
    owner_username: Option<String>,
    owner_full_name: Option<String>,
    owner_avatar_url: Option<String>,
}

impl From<HistoryFeedSqlRow> for HistoryFeedItem {
    fn from(row: HistoryFeedSqlRow) -> Self {
        let owner = match (
            row.owner_id,
            row.owner_username,
            row.owner_full_name,
            row.owner_avatar_url,
        ) {
            (Some(id), Some(username), Some(full_name), Some(avatar_url)) => Some(FeedOwner {
                id,
                username,
                full_name,
                avatar_url,
            }),
            _ => None,
        };

        let video = match (
            row.video_id,
            row.title,
            row.description,
            row.duration,
            row.views,
            row.video_url,
            row.thumbnail_url,
            row.video_created_at,
        ) {
            (
                Some(id),
                Some(title),
                Some(description),
                Some(duration),
                Some(views),
                Some(video_url),
                Some(thumbnail_url),
                Some(created_at),
            ) => Some(HistoryVideo {
                id,
                title,
                description,
                duration,
                views,
                video_url,
                thumbnail_url,
                created_at,
                owner,
            }),
            _ => None,
        };

        Self {
            watched_at: row.watched_at,
            video,
        }
    }
}

/// A subscription roster entry: the counterpart user plus when the
/// subscription was created
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionEntry {
    pub id: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub avatar_url: String,
    pub subscribed_at: DateTime<Utc>,
}

// =============================================================================
// Queries
// =============================================================================

impl Database {
    /// Paginated video feed: match, owner join, viewer like join,
    /// projection, sort, paginate.
    pub async fn video_feed(
        &self,
        filter: &VideoFeedFilter,
        sort: VideoSortKey,
        direction: SortDirection,
        request: PageRequest,
        viewer_id: Option<&str>,
    ) -> Result<Page<VideoFeedItem>, AppError> {
        // Count over the identical match stage
        let mut count_query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM videos v");
        push_video_match(&mut count_query, filter);
        let total_results: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut query = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT v.id, v.video_url, v.thumbnail_url, v.title, v.description,
                   v.duration, v.views, v.is_published, v.tags, v.created_at,
                   v.updated_at, v.owner_id,
                   u.username AS owner_username,
                   u.full_name AS owner_full_name,
                   u.avatar_url AS owner_avatar_url,
            "#,
        );
        push_viewer_like_join(&mut query, viewer_id);
        query.push(" FROM videos v LEFT JOIN users u ON u.id = v.owner_id");
        push_video_match(&mut query, filter);
        query
            .push(" ORDER BY ")
            .push(sort.as_column())
            .push(" ")
            .push(direction.as_sql())
            .push(", v.id DESC LIMIT ")
            .push_bind(request.limit as i64)
            .push(" OFFSET ")
            .push_bind(request.offset());

        let rows: Vec<VideoFeedSqlRow> =
            query.build_query_as().fetch_all(&self.pool).await?;

        Ok(Page::new(
            rows.into_iter().map(VideoFeedItem::from).collect(),
            total_results,
            request,
        ))
    }

    /// Single video with owner and viewer-relative like state.
    pub async fn video_detail(
        &self,
        video_id: &str,
        viewer_id: Option<&str>,
    ) -> Result<Option<VideoFeedItem>, AppError> {
        let mut query = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT v.id, v.video_url, v.thumbnail_url, v.title, v.description,
                   v.duration, v.views, v.is_published, v.tags, v.created_at,
                   v.updated_at, v.owner_id,
                   u.username AS owner_username,
                   u.full_name AS owner_full_name,
                   u.avatar_url AS owner_avatar_url,
            "#,
        );
        push_viewer_like_join(&mut query, viewer_id);
        query
            .push(" FROM videos v LEFT JOIN users u ON u.id = v.owner_id WHERE v.id = ")
            .push_bind(video_id);

        let row: Option<VideoFeedSqlRow> =
            query.build_query_as().fetch_optional(&self.pool).await?;

        Ok(row.map(VideoFeedItem::from))
    }

    /// Paginated comments of a video, newest first, with owner info.
    pub async fn comment_feed(
        &self,
        video_id: &str,
        request: PageRequest,
    ) -> Result<Page<CommentFeedItem>, AppError> {
        let total_results: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE video_id = ?")
                .bind(video_id)
                .fetch_one(&self.pool)
                .await?;

        let rows = sqlx::query_as::<_, CommentFeedSqlRow>(
            r#"
            SELECT c.id, c.content, c.created_at, c.updated_at, c.owner_id,
                   u.username AS owner_username,
                   u.full_name AS owner_full_name,
                   u.avatar_url AS owner_avatar_url
            FROM comments c
            LEFT JOIN users u ON u.id = c.owner_id
            WHERE c.video_id = ?
            ORDER BY c.created_at DESC, c.id DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(video_id)
        .bind(request.limit as i64)
        .bind(request.offset())
        .fetch_all(&self.pool)
        .await?;

        let items = rows
            .into_iter()
            .map(|row| {
                let owner =
                    match (row.owner_username, row.owner_full_name, row.owner_avatar_url) {
                        (Some(username), Some(full_name), Some(avatar_url)) => Some(FeedOwner {
                            id: row.owner_id,
                            username,
                            full_name,
                            avatar_url,
                        }),
                        _ => None,
                    };
                CommentFeedItem {
                    id: row.id,
                    content: row.content,
                    created_at: row.created_at,
                    updated_at: row.updated_at,
                    owner,
                }
            })
            .collect();

        Ok(Page::new(items, total_results, request))
    }

    /// Paginated watch history of a user: history rows joined to videos
    /// joined to their owners.
    pub async fn history_feed(
        &self,
        user_id: &str,
        search: Option<&str>,
        owner_ids: Option<&[String]>,
        sort: HistorySortKey,
        direction: SortDirection,
        request: PageRequest,
    ) -> Result<Page<HistoryFeedItem>, AppError> {
        let mut count_query = QueryBuilder::<Sqlite>::new(
            "SELECT COUNT(*) FROM watch_history w LEFT JOIN videos v ON v.id = w.video_id",
        );
        push_history_match(&mut count_query, user_id, search, owner_ids);
        let total_results: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut query = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT w.watched_at,
                   v.id AS video_id, v.title, v.description, v.duration, v.views,
                   v.video_url, v.thumbnail_url, v.created_at AS video_created_at,
                   v.owner_id,
                   u.username AS owner_username,
                   u.full_name AS owner_full_name,
                   u.avatar_url AS owner_avatar_url
            FROM watch_history w
            LEFT JOIN videos v ON v.id = w.video_id
            LEFT JOIN users u ON u.id = v.owner_id
            "#,
        );
        push_history_match(&mut query, user_id, search, owner_ids);
        query
            .push(" ORDER BY ")
            .push(sort.as_column())
            .push(" ")
            .push(direction.as_sql())
            .push(", w.video_id DESC LIMIT ")
            .push_bind(request.limit as i64)
            .push(" OFFSET ")
            .push_bind(request.offset());

        let rows: Vec<HistoryFeedSqlRow> =
            query.build_query_as().fetch_all(&self.pool).await?;

        Ok(Page::new(
            rows.into_iter().map(HistoryFeedItem::from).collect(),
            total_results,
            request,
        ))
    }

    /// All videos the user has liked, most recently liked first.
    ///
    /// Likes whose video has been deleted are dropped, not nulled: the
    /// listing is about videos, unlike the history feed where the entry
    /// itself carries the timestamp of interest.
    pub async fn liked_videos(&self, user_id: &str) -> Result<Vec<VideoFeedItem>, AppError> {
        let rows = sqlx::query_as::<_, VideoFeedSqlRow>(
            r#"
            SELECT v.id, v.video_url, v.thumbnail_url, v.title, v.description,
                   v.duration, v.views, v.is_published, v.tags, v.created_at,
                   v.updated_at, v.owner_id,
                   u.username AS owner_username,
                   u.full_name AS owner_full_name,
                   u.avatar_url AS owner_avatar_url,
                   1 AS liked_by_viewer
            FROM likes l
            JOIN videos v ON v.id = l.video_id
            LEFT JOIN users u ON u.id = v.owner_id
            WHERE l.liked_by = ? AND l.video_id IS NOT NULL
            ORDER BY l.created_at DESC, l.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(VideoFeedItem::from).collect())
    }

    /// Users subscribed to a channel, newest subscription first.
    pub async fn channel_subscribers(
        &self,
        channel_id: &str,
    ) -> Result<Vec<SubscriptionEntry>, AppError> {
        let entries = sqlx::query_as::<_, SubscriptionEntrySqlRow>(
            r#"
            SELECT u.id, u.username, u.email, u.full_name, u.avatar_url,
                   s.created_at AS subscribed_at
            FROM subscriptions s
            JOIN users u ON u.id = s.subscriber_id
            WHERE s.channel_id = ?
            ORDER BY s.created_at DESC, s.id DESC
            "#,
        )
        .bind(channel_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries.into_iter().map(SubscriptionEntry::from).collect())
    }

    /// Channels a user subscribes to, newest subscription first.
    pub async fn subscribed_channels(
        &self,
        subscriber_id: &str,
    ) -> Result<Vec<SubscriptionEntry>, AppError> {
        let entries = sqlx::query_as::<_, SubscriptionEntrySqlRow>(
            r#"
            SELECT u.id, u.username, u.email, u.full_name, u.avatar_url,
                   s.created_at AS subscribed_at
            FROM subscriptions s
            JOIN users u ON u.id = s.channel_id
            WHERE s.subscriber_id = ?
            ORDER BY s.created_at DESC, s.id DESC
            "#,
        )
        .bind(subscriber_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries.into_iter().map(SubscriptionEntry::from).collect())
    }

    /// Feed items for a raw list of videos (playlist contents), without
    /// pagination.
    pub async fn videos_with_owner(
        &self,
        videos: Vec<Video>,
        viewer_id: Option<&str>,
    ) -> Result<Vec<VideoFeedItem>, AppError> {
        let mut items = Vec::with_capacity(videos.len());
        for video in videos {
            // Detail lookups are one indexed query each; playlist sizes
            // stay small enough that batching is not worth the shape.
            if let Some(item) = self.video_detail(&video.id, viewer_id).await? {
                items.push(item);
            }
        }
        Ok(items)
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SubscriptionEntrySqlRow {
    id: String,
    username: String,
    email: String,
    full_name: String,
    avatar_url: String,
    subscribed_at: DateTime<Utc>,
}

impl From<SubscriptionEntrySqlRow> for SubscriptionEntry {
    fn from(row: SubscriptionEntrySqlRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            email: row.email,
            full_name: row.full_name,
            avatar_url: row.avatar_url,
            subscribed_at: row.subscribed_at,
        }
    }
}

/// Append the match stage shared by the history page query and its count.
fn push_history_match(
    query: &mut QueryBuilder<'_, Sqlite>,
    user_id: &str,
    search: Option<&str>,
    owner_ids: Option<&[String]>,
) {
    query
        .push(" WHERE w.user_id = ")
        .push_bind(user_id.to_string());

    if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
        let pattern = like_pattern(term);
        query
            .push(" AND (v.title LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR v.description LIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
    }

    if let Some(ids) = owner_ids {
        if ids.is_empty() {
            query.push(" AND 0");
        } else {
            query.push(" AND v.owner_id IN (");
            let mut separated = query.separated(", ");
            for id in ids {
                separated.push_bind(id.clone());
            }
            query.push(")");
        }
    }
}

/// Append the match stage shared by the feed page query and its count.
fn push_video_match(query: &mut QueryBuilder<'_, Sqlite>, filter: &VideoFeedFilter) {
    query.push(" WHERE 1 = 1");

    if let Some(term) = filter.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        let pattern = like_pattern(term);
        query
            .push(" AND (v.title LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR v.description LIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
    }

    if let Some(ids) = &filter.owner_ids {
        if ids.is_empty() {
            // Uploader filter resolved to no users: match nothing
            query.push(" AND 0");
        } else {
            query.push(" AND v.owner_id IN (");
            let mut separated = query.separated(", ");
            for id in ids {
                separated.push_bind(id.clone());
            }
            query.push(")");
        }
    }

    if let Some(tag) = filter.tag.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        query
            .push(" AND EXISTS (SELECT 1 FROM json_each(v.tags) WHERE json_each.value = ")
            .push_bind(tag.to_string())
            .push(")");
    }
}

/// Append the viewer-relative like column: an EXISTS probe for an
/// authenticated viewer, constant false otherwise.
fn push_viewer_like_join(query: &mut QueryBuilder<'_, Sqlite>, viewer_id: Option<&str>) {
    match viewer_id {
        Some(viewer) => {
            query
                .push(
                    "EXISTS(SELECT 1 FROM likes l WHERE l.video_id = v.id AND l.liked_by = ",
                )
                .push_bind(viewer.to_string())
                .push(") AS liked_by_viewer");
        }
        None => {
            query.push("0 AS liked_by_viewer");
        }
    }
}
