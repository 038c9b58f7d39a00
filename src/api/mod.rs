//! API layer
//!
//! HTTP handlers for the REST API plus the Prometheus metrics endpoint.
//! Authentication is enforced per-handler through the `CurrentUser`
//! extractor; public listings take `MaybeUser` for viewer-relative
//! fields.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post},
};

use crate::AppState;
use crate::storage::asset_id_from_url;

mod comments;
mod dashboard;
mod dto;
mod form;
mod history;
mod likes;
pub mod metrics;
mod playlists;
mod subscriptions;
mod tweets;
mod users;
mod videos;

pub use dto::*;
pub use metrics::metrics_router;

/// Request body ceiling; video uploads dominate
const MAX_REQUEST_BODY_BYTES: usize = 256 * 1024 * 1024;

/// Fire-and-forget deletion of a replaced or orphaned remote asset.
///
/// Asset cleanup is a side-effect of the primary operation; its failure
/// is observed in logs and metrics but never propagated to the caller.
pub(crate) fn spawn_best_effort_delete(state: &AppState, asset_url: &str, context: &'static str) {
    let Some(asset_id) = asset_id_from_url(asset_url) else {
        return;
    };
    let media = state.media.clone();

    tokio::spawn(async move {
        if let Err(error) = media.delete(&asset_id).await {
            tracing::warn!(%error, asset_id = %asset_id, context, "Best-effort asset deletion failed");
        }
    });
}

/// Create the REST API router (mounted under `/api/v1`)
pub fn api_router() -> Router<AppState> {
    Router::new()
        // Users & auth
        .route("/users/register", post(users::register))
        .route("/users/login", post(users::login))
        .route("/users/refresh-token", post(users::refresh_token))
        .route("/users/logout", post(users::logout))
        .route("/users/change-password", post(users::change_password))
        .route("/users/me", get(users::current_user))
        .route("/users/me", patch(users::update_profile))
        .route("/users/me/avatar", patch(users::update_avatar))
        .route("/users/me/cover", patch(users::update_cover))
        .route("/users/channel/:username", get(users::channel_profile))
        // Videos
        .route("/videos", get(videos::list_videos))
        .route("/videos", post(videos::publish_video))
        .route("/videos/tag/:tag", get(videos::list_videos_by_tag))
        .route("/videos/:id", get(videos::get_video))
        .route("/videos/:id", patch(videos::update_video))
        .route("/videos/:id", delete(videos::delete_video))
        .route("/videos/:id/toggle-publish", patch(videos::toggle_publish))
        .route("/videos/:id/views", post(videos::increment_views))
        // Comments
        .route("/videos/:id/comments", get(comments::list_comments))
        .route("/videos/:id/comments", post(comments::add_comment))
        .route("/comments/:id", patch(comments::update_comment))
        .route("/comments/:id", delete(comments::delete_comment))
        // Likes
        .route("/likes/video/:id", post(likes::toggle_video_like))
        .route("/likes/comment/:id", post(likes::toggle_comment_like))
        .route("/likes/tweet/:id", post(likes::toggle_tweet_like))
        .route("/likes/videos", get(likes::liked_videos))
        // Subscriptions
        .route(
            "/subscriptions/channel/:id",
            post(subscriptions::toggle_subscription),
        )
        .route(
            "/subscriptions/channel/:id/subscribers",
            get(subscriptions::channel_subscribers),
        )
        .route(
            "/subscriptions/user/:id/channels",
            get(subscriptions::subscribed_channels),
        )
        // Playlists
        .route("/playlists", post(playlists::create_playlist))
        .route("/playlists/user/:userId", get(playlists::user_playlists))
        .route("/playlists/:id", get(playlists::get_playlist))
        .route("/playlists/:id", patch(playlists::update_playlist))
        .route("/playlists/:id", delete(playlists::delete_playlist))
        .route(
            "/playlists/:id/videos/:videoId",
            post(playlists::add_video),
        )
        .route(
            "/playlists/:id/videos/:videoId",
            delete(playlists::remove_video),
        )
        // Tweets
        .route("/tweets", post(tweets::create_tweet))
        .route("/tweets/user/:userId", get(tweets::user_tweets))
        .route("/tweets/:id", patch(tweets::update_tweet))
        .route("/tweets/:id", delete(tweets::delete_tweet))
        // Watch history
        .route("/history/:videoId", post(history::add_to_history))
        .route("/history", get(history::get_history))
        // Dashboard
        .route("/dashboard/stats", get(dashboard::channel_stats))
        .route("/dashboard/videos", get(dashboard::channel_videos))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
}
