//! Like toggle endpoints
//!
//! A like is a junction row; toggling twice returns to the original
//! state. The storage layer enforces at most one row per (user, target).

use axum::{
    Json,
    extract::{Path, State},
};

use super::dto::ApiResponse;
use crate::AppState;
use crate::auth::CurrentUser;
use crate::data::{LikeTarget, VideoFeedItem};
use crate::error::AppError;

fn toggle_response(
    liked: bool,
    noun: &str,
) -> Json<ApiResponse<serde_json::Value>> {
    let message = if liked {
        format!("{} liked successfully", noun)
    } else {
        format!("{} unliked successfully", noun)
    };
    ApiResponse::ok(serde_json::json!({ "liked": liked }), message)
}

/// POST /api/v1/likes/video/:id
pub async fn toggle_video_like(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(video_id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    if state.db.get_video(&video_id).await?.is_none() {
        return Err(AppError::NotFound);
    }

    let liked = state
        .db
        .toggle_like(&user.id, LikeTarget::Video(&video_id))
        .await?;
    Ok(toggle_response(liked, "video"))
}

/// POST /api/v1/likes/comment/:id
pub async fn toggle_comment_like(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(comment_id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    if state.db.get_comment(&comment_id).await?.is_none() {
        return Err(AppError::NotFound);
    }

    let liked = state
        .db
        .toggle_like(&user.id, LikeTarget::Comment(&comment_id))
        .await?;
    Ok(toggle_response(liked, "comment"))
}

/// POST /api/v1/likes/tweet/:id
pub async fn toggle_tweet_like(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(tweet_id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    if state.db.get_tweet(&tweet_id).await?.is_none() {
        return Err(AppError::NotFound);
    }

    let liked = state
        .db
        .toggle_like(&user.id, LikeTarget::Tweet(&tweet_id))
        .await?;
    Ok(toggle_response(liked, "tweet"))
}

/// GET /api/v1/likes/videos
///
/// Videos the requesting user has liked, most recent like first. No
/// liked videos is an empty list, not an error.
pub async fn liked_videos(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<ApiResponse<Vec<VideoFeedItem>>>, AppError> {
    let videos = state.db.liked_videos(&user.id).await?;
    Ok(ApiResponse::ok(videos, "liked videos fetched successfully"))
}
