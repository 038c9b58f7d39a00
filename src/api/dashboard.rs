//! Channel dashboard endpoints
//!
//! Aggregated statistics and the full upload list for the
//! authenticated channel.

use axum::{Json, extract::State};

use super::dto::{ApiResponse, VideoResponse};
use crate::AppState;
use crate::auth::CurrentUser;
use crate::data::ChannelStats;
use crate::error::AppError;

/// GET /api/v1/dashboard/stats
pub async fn channel_stats(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<ApiResponse<ChannelStats>>, AppError> {
    let stats = state.db.get_channel_stats(&user.id).await?;
    Ok(ApiResponse::ok(stats, "channel stats fetched successfully"))
}

/// GET /api/v1/dashboard/videos
pub async fn channel_videos(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<ApiResponse<Vec<VideoResponse>>>, AppError> {
    let videos = state.db.get_videos_by_owner(&user.id).await?;
    Ok(ApiResponse::ok(
        videos.into_iter().map(VideoResponse::from).collect(),
        "channel videos fetched successfully",
    ))
}
