//! SQLite database operations
//!
//! All database access goes through this module (plus the feed queries
//! in `feed.rs`, which share the same pool). Junction invariants (one
//! like per (user, target), one subscription per (subscriber, channel),
//! one playlist entry per (playlist, video), one history row per
//! (user, video)) are enforced by unique constraints in the schema, so
//! toggles stay correct under concurrent requests.

use chrono::{DateTime, Utc};
use sqlx::{Pool, Sqlite, SqlitePool};
use std::path::Path;

use super::models::*;
use crate::error::AppError;

/// Database connection pool wrapper.
pub struct Database {
    pub(super) pool: Pool<Sqlite>,
}

/// Translate a unique-constraint violation into a 409, leaving other
/// database errors untouched.
fn map_unique_violation(error: sqlx::Error, conflict_message: &str) -> AppError {
    if let sqlx::Error::Database(db_error) = &error {
        if db_error.kind() == sqlx::error::ErrorKind::UniqueViolation {
            return AppError::Conflict(conflict_message.to_string());
        }
    }
    AppError::Database(error)
}

impl Database {
    // =========================================================================
    // Connection
    // =========================================================================

    /// Connect to SQLite database
    ///
    /// Creates the database file if it doesn't exist.
    /// Runs pending migrations automatically.
    ///
    /// # Arguments
    /// * `path` - Path to SQLite database file
    ///
    /// # Errors
    /// Returns error if connection or migration fails
    pub async fn connect(path: &Path) -> Result<Self, AppError> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AppError::Database(sqlx::Error::Io(e)))?;
        }

        let connection_string = format!("sqlite:{}?mode=rwc", path.display());
        let pool = SqlitePool::connect(&connection_string).await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| {
                tracing::error!("Migration failed: {}", e);
                AppError::Internal(anyhow::anyhow!("Migration failed: {}", e))
            })?;

        tracing::info!("Database connected and migrated successfully");

        Ok(Self { pool })
    }

    /// Close the pool, waiting for in-flight connections.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Insert a new user.
    ///
    /// A duplicate username or email surfaces as a conflict.
    pub async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO users (
                id, username, email, full_name, avatar_url, cover_url,
                password_hash, refresh_token, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(&user.avatar_url)
        .bind(&user.cover_url)
        .bind(&user.password_hash)
        .bind(&user.refresh_token)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "username or email already exists"))?;

        Ok(())
    }

    /// Get user by ID
    pub async fn get_user(&self, id: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Get user by username (case-insensitive)
    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Get user by username or email, whichever matches first
    pub async fn get_user_by_username_or_email(
        &self,
        identifier: &str,
    ) -> Result<Option<User>, AppError> {
        let user =
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ? OR email = ?")
                .bind(identifier)
                .bind(identifier)
                .fetch_optional(&self.pool)
                .await?;

        Ok(user)
    }

    /// Whether a user with this username or email already exists
    pub async fn username_or_email_exists(
        &self,
        username: &str,
        email: &str,
    ) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, i64>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = ? OR email = ?)",
        )
        .bind(username)
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists != 0)
    }

    /// Store (or clear) the user's current refresh token.
    pub async fn set_refresh_token(
        &self,
        user_id: &str,
        refresh_token: Option<&str>,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET refresh_token = ?, updated_at = ? WHERE id = ?")
            .bind(refresh_token)
            .bind(Utc::now())
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Replace the user's password hash.
    pub async fn set_password_hash(
        &self,
        user_id: &str,
        password_hash: &str,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?")
            .bind(password_hash)
            .bind(Utc::now())
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Patch profile fields; `None` leaves a field unchanged.
    ///
    /// # Returns
    /// `true` if a matching user row was updated.
    pub async fn update_user_profile(
        &self,
        user_id: &str,
        full_name: Option<&str>,
        email: Option<&str>,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET full_name = COALESCE(?, full_name),
                email = COALESCE(?, email),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(full_name)
        .bind(email)
        .bind(Utc::now())
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "email already exists"))?;

        Ok(result.rows_affected() == 1)
    }

    /// Replace the user's avatar URL.
    pub async fn set_avatar_url(&self, user_id: &str, avatar_url: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET avatar_url = ?, updated_at = ? WHERE id = ?")
            .bind(avatar_url)
            .bind(Utc::now())
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Replace the user's cover URL.
    pub async fn set_cover_url(&self, user_id: &str, cover_url: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET cover_url = ?, updated_at = ? WHERE id = ?")
            .bind(cover_url)
            .bind(Utc::now())
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Resolve uploader filters to user ids.
    ///
    /// Both filters are case-insensitive substring matches; when both are
    /// given a user must match both.
    pub async fn find_user_ids_matching(
        &self,
        username: Option<&str>,
        full_name: Option<&str>,
    ) -> Result<Vec<String>, AppError> {
        let ids = sqlx::query_scalar::<_, String>(
            r#"
            SELECT id FROM users
            WHERE (?1 IS NULL OR username LIKE '%' || ?1 || '%')
              AND (?2 IS NULL OR full_name LIKE '%' || ?2 || '%' COLLATE NOCASE)
            "#,
        )
        .bind(username)
        .bind(full_name)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    // =========================================================================
    // Videos
    // =========================================================================

    /// Insert a new video
    pub async fn insert_video(&self, video: &Video) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO videos (
                id, owner_id, video_url, thumbnail_url, title, description,
                duration, views, is_published, tags, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&video.id)
        .bind(&video.owner_id)
        .bind(&video.video_url)
        .bind(&video.thumbnail_url)
        .bind(&video.title)
        .bind(&video.description)
        .bind(video.duration)
        .bind(video.views)
        .bind(video.is_published)
        .bind(&video.tags)
        .bind(video.created_at)
        .bind(video.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Get video by ID
    pub async fn get_video(&self, id: &str) -> Result<Option<Video>, AppError> {
        let video = sqlx::query_as::<_, Video>("SELECT * FROM videos WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(video)
    }

    /// Get all videos owned by a channel, newest first
    pub async fn get_videos_by_owner(&self, owner_id: &str) -> Result<Vec<Video>, AppError> {
        let videos = sqlx::query_as::<_, Video>(
            "SELECT * FROM videos WHERE owner_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(videos)
    }

    /// Patch title/description/thumbnail; `None` leaves a field unchanged.
    ///
    /// # Returns
    /// `true` if a matching video row was updated.
    pub async fn update_video_details(
        &self,
        video_id: &str,
        title: Option<&str>,
        description: Option<&str>,
        thumbnail_url: Option<&str>,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE videos
            SET title = COALESCE(?, title),
                description = COALESCE(?, description),
                thumbnail_url = COALESCE(?, thumbnail_url),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(title)
        .bind(description)
        .bind(thumbnail_url)
        .bind(Utc::now())
        .bind(video_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Delete a video record.
    ///
    /// Playlist entries and history rows pointing at it are removed too;
    /// likes and comments keep their rows and read as dangling targets.
    pub async fn delete_video(&self, video_id: &str) -> Result<bool, AppError> {
        sqlx::query("DELETE FROM playlist_videos WHERE video_id = ?")
            .bind(video_id)
            .execute(&self.pool)
            .await?;
        sqlx::query("DELETE FROM watch_history WHERE video_id = ?")
            .bind(video_id)
            .execute(&self.pool)
            .await?;

        let result = sqlx::query("DELETE FROM videos WHERE id = ?")
            .bind(video_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Flip the publish flag.
    ///
    /// # Returns
    /// The new flag value, or None if the video does not exist.
    pub async fn toggle_publish(&self, video_id: &str) -> Result<Option<bool>, AppError> {
        let is_published = sqlx::query_scalar::<_, bool>(
            r#"
            UPDATE videos
            SET is_published = NOT is_published, updated_at = ?
            WHERE id = ?
            RETURNING is_published
            "#,
        )
        .bind(Utc::now())
        .bind(video_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(is_published)
    }

    /// Monotonic +1 on the view counter.
    ///
    /// # Returns
    /// The new view count, or None if the video does not exist.
    pub async fn increment_views(&self, video_id: &str) -> Result<Option<i64>, AppError> {
        let views = sqlx::query_scalar::<_, i64>(
            "UPDATE videos SET views = views + 1 WHERE id = ? RETURNING views",
        )
        .bind(video_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(views)
    }

    // =========================================================================
    // Comments
    // =========================================================================

    /// Insert a new comment
    pub async fn insert_comment(&self, comment: &Comment) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO comments (id, video_id, owner_id, content, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&comment.id)
        .bind(&comment.video_id)
        .bind(&comment.owner_id)
        .bind(&comment.content)
        .bind(comment.created_at)
        .bind(comment.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Get comment by ID
    pub async fn get_comment(&self, id: &str) -> Result<Option<Comment>, AppError> {
        let comment = sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(comment)
    }

    /// Replace a comment's text.
    pub async fn update_comment_content(
        &self,
        comment_id: &str,
        content: &str,
    ) -> Result<bool, AppError> {
        let result =
            sqlx::query("UPDATE comments SET content = ?, updated_at = ? WHERE id = ?")
                .bind(content)
                .bind(Utc::now())
                .bind(comment_id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Delete a comment.
    pub async fn delete_comment(&self, comment_id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(comment_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    // =========================================================================
    // Tweets
    // =========================================================================

    /// Insert a new tweet
    pub async fn insert_tweet(&self, tweet: &Tweet) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO tweets (id, owner_id, content, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&tweet.id)
        .bind(&tweet.owner_id)
        .bind(&tweet.content)
        .bind(tweet.created_at)
        .bind(tweet.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Get tweet by ID
    pub async fn get_tweet(&self, id: &str) -> Result<Option<Tweet>, AppError> {
        let tweet = sqlx::query_as::<_, Tweet>("SELECT * FROM tweets WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(tweet)
    }

    /// All tweets by a user, newest first
    pub async fn get_tweets_by_owner(&self, owner_id: &str) -> Result<Vec<Tweet>, AppError> {
        let tweets = sqlx::query_as::<_, Tweet>(
            "SELECT * FROM tweets WHERE owner_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tweets)
    }

    /// Replace a tweet's text.
    pub async fn update_tweet_content(
        &self,
        tweet_id: &str,
        content: &str,
    ) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE tweets SET content = ?, updated_at = ? WHERE id = ?")
            .bind(content)
            .bind(Utc::now())
            .bind(tweet_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Delete a tweet.
    pub async fn delete_tweet(&self, tweet_id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tweets WHERE id = ?")
            .bind(tweet_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    // =========================================================================
    // Likes
    // =========================================================================

    /// Toggle a like for (user, target).
    ///
    /// Delete-if-exists first; only when nothing was deleted, insert. The
    /// partial unique indexes make the insert a no-op if a concurrent
    /// request won the race, so the pair never holds two rows.
    ///
    /// # Returns
    /// `true` if the target is liked after the call.
    pub async fn toggle_like(
        &self,
        user_id: &str,
        target: LikeTarget<'_>,
    ) -> Result<bool, AppError> {
        let deleted = sqlx::query(&format!(
            "DELETE FROM likes WHERE liked_by = ? AND {} = ?",
            target.column()
        ))
        .bind(user_id)
        .bind(target.id())
        .execute(&self.pool)
        .await?;

        if deleted.rows_affected() > 0 {
            return Ok(false);
        }

        sqlx::query(&format!(
            r#"
            INSERT INTO likes (id, liked_by, {}, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT DO NOTHING
            "#,
            target.column()
        ))
        .bind(EntityId::new().0)
        .bind(user_id)
        .bind(target.id())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(true)
    }

    /// Whether (user, target) is currently liked
    pub async fn like_exists(
        &self,
        user_id: &str,
        target: LikeTarget<'_>,
    ) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT EXISTS(SELECT 1 FROM likes WHERE liked_by = ? AND {} = ?)",
            target.column()
        ))
        .bind(user_id)
        .bind(target.id())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists != 0)
    }

    /// Number of like rows for (user, target); 0 or 1 by construction
    pub async fn like_count_for_pair(
        &self,
        user_id: &str,
        target: LikeTarget<'_>,
    ) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM likes WHERE liked_by = ? AND {} = ?",
            target.column()
        ))
        .bind(user_id)
        .bind(target.id())
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    // =========================================================================
    // Subscriptions
    // =========================================================================

    /// Toggle a subscription for (subscriber, channel).
    ///
    /// Same delete-then-insert shape as [`Self::toggle_like`], backed by
    /// the UNIQUE(subscriber_id, channel_id) constraint.
    ///
    /// # Returns
    /// `true` if subscribed after the call.
    pub async fn toggle_subscription(
        &self,
        subscriber_id: &str,
        channel_id: &str,
    ) -> Result<bool, AppError> {
        let deleted =
            sqlx::query("DELETE FROM subscriptions WHERE subscriber_id = ? AND channel_id = ?")
                .bind(subscriber_id)
                .bind(channel_id)
                .execute(&self.pool)
                .await?;

        if deleted.rows_affected() > 0 {
            return Ok(false);
        }

        sqlx::query(
            r#"
            INSERT INTO subscriptions (id, subscriber_id, channel_id, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(EntityId::new().0)
        .bind(subscriber_id)
        .bind(channel_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(true)
    }

    /// Whether subscriber currently follows channel
    pub async fn subscription_exists(
        &self,
        subscriber_id: &str,
        channel_id: &str,
    ) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, i64>(
            "SELECT EXISTS(SELECT 1 FROM subscriptions WHERE subscriber_id = ? AND channel_id = ?)",
        )
        .bind(subscriber_id)
        .bind(channel_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists != 0)
    }

    // =========================================================================
    // Playlists
    // =========================================================================

    /// Insert a new playlist
    pub async fn insert_playlist(&self, playlist: &Playlist) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO playlists (id, owner_id, name, description, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&playlist.id)
        .bind(&playlist.owner_id)
        .bind(&playlist.name)
        .bind(&playlist.description)
        .bind(playlist.created_at)
        .bind(playlist.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Get playlist by ID
    pub async fn get_playlist(&self, id: &str) -> Result<Option<Playlist>, AppError> {
        let playlist = sqlx::query_as::<_, Playlist>("SELECT * FROM playlists WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(playlist)
    }

    /// All playlists owned by a user, newest first
    pub async fn get_playlists_by_owner(
        &self,
        owner_id: &str,
    ) -> Result<Vec<Playlist>, AppError> {
        let playlists = sqlx::query_as::<_, Playlist>(
            "SELECT * FROM playlists WHERE owner_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(playlists)
    }

    /// Rename/redescribe a playlist.
    pub async fn update_playlist(
        &self,
        playlist_id: &str,
        name: &str,
        description: &str,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE playlists SET name = ?, description = ?, updated_at = ? WHERE id = ?",
        )
        .bind(name)
        .bind(description)
        .bind(Utc::now())
        .bind(playlist_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Delete a playlist and its membership rows.
    pub async fn delete_playlist(&self, playlist_id: &str) -> Result<bool, AppError> {
        sqlx::query("DELETE FROM playlist_videos WHERE playlist_id = ?")
            .bind(playlist_id)
            .execute(&self.pool)
            .await?;

        let result = sqlx::query("DELETE FROM playlists WHERE id = ?")
            .bind(playlist_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Append a video to a playlist.
    ///
    /// # Returns
    /// `false` if the video was already present (unique pair constraint).
    pub async fn add_video_to_playlist(
        &self,
        playlist_id: &str,
        video_id: &str,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO playlist_videos (playlist_id, video_id, position)
            SELECT ?1, ?2, COALESCE(MAX(position) + 1, 0)
            FROM playlist_videos WHERE playlist_id = ?1
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(playlist_id)
        .bind(video_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Remove a video from a playlist.
    ///
    /// # Returns
    /// `true` if an entry was removed.
    pub async fn remove_video_from_playlist(
        &self,
        playlist_id: &str,
        video_id: &str,
    ) -> Result<bool, AppError> {
        let result =
            sqlx::query("DELETE FROM playlist_videos WHERE playlist_id = ? AND video_id = ?")
                .bind(playlist_id)
                .bind(video_id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Videos of a playlist in insertion order
    pub async fn get_playlist_videos(&self, playlist_id: &str) -> Result<Vec<Video>, AppError> {
        let videos = sqlx::query_as::<_, Video>(
            r#"
            SELECT v.* FROM playlist_videos pv
            JOIN videos v ON v.id = pv.video_id
            WHERE pv.playlist_id = ?
            ORDER BY pv.position
            "#,
        )
        .bind(playlist_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(videos)
    }

    // =========================================================================
    // Watch history
    // =========================================================================

    /// Record that user watched video now.
    ///
    /// One row per (user, video): a re-watch updates watched_at in place,
    /// which moves the entry to the front of the recency ordering.
    pub async fn record_watch(
        &self,
        user_id: &str,
        video_id: &str,
        watched_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO watch_history (user_id, video_id, watched_at)
            VALUES (?, ?, ?)
            ON CONFLICT(user_id, video_id) DO UPDATE SET watched_at = excluded.watched_at
            "#,
        )
        .bind(user_id)
        .bind(video_id)
        .bind(watched_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// The history entry for (user, video), if any
    pub async fn get_watch_entry(
        &self,
        user_id: &str,
        video_id: &str,
    ) -> Result<Option<WatchHistoryEntry>, AppError> {
        let entry = sqlx::query_as::<_, WatchHistoryEntry>(
            "SELECT * FROM watch_history WHERE user_id = ? AND video_id = ?",
        )
        .bind(user_id)
        .bind(video_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }

    // =========================================================================
    // Channel statistics
    // =========================================================================

    /// Aggregate channel totals for the dashboard.
    pub async fn get_channel_stats(&self, channel_id: &str) -> Result<ChannelStats, AppError> {
        let (total_videos, total_subscribers, total_likes, total_views) =
            sqlx::query_as::<_, (i64, i64, i64, i64)>(
                r#"
                SELECT
                    (SELECT COUNT(*) FROM videos WHERE owner_id = ?1),
                    (SELECT COUNT(*) FROM subscriptions WHERE channel_id = ?1),
                    (SELECT COUNT(*) FROM likes l
                        JOIN videos v ON v.id = l.video_id
                        WHERE v.owner_id = ?1),
                    (SELECT COALESCE(SUM(views), 0) FROM videos WHERE owner_id = ?1)
                "#,
            )
            .bind(channel_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(ChannelStats {
            total_videos,
            total_subscribers,
            total_likes,
            total_views,
        })
    }

    /// Subscriber/subscribed counts for a channel profile.
    pub async fn get_channel_counts(&self, user_id: &str) -> Result<(i64, i64), AppError> {
        let counts = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM subscriptions WHERE channel_id = ?1),
                (SELECT COUNT(*) FROM subscriptions WHERE subscriber_id = ?1)
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(counts)
    }
}
