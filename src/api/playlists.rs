//! Playlist endpoints

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::dto::ApiResponse;
use crate::AppState;
use crate::auth::{CurrentUser, MaybeUser};
use crate::data::{EntityId, Playlist, VideoFeedItem};
use crate::error::AppError;

/// Playlist response shape
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistResponse {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Playlist> for PlaylistResponse {
    fn from(playlist: Playlist) -> Self {
        Self {
            id: playlist.id,
            owner_id: playlist.owner_id,
            name: playlist.name,
            description: playlist.description,
            created_at: playlist.created_at,
            updated_at: playlist.updated_at,
        }
    }
}

/// Playlist detail: metadata plus its videos in insertion order
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistDetailResponse {
    #[serde(flatten)]
    pub playlist: PlaylistResponse,
    pub videos: Vec<VideoFeedItem>,
}

#[derive(Debug, Deserialize)]
pub struct PlaylistBody {
    pub name: String,
    pub description: String,
}

/// POST /api/v1/playlists
pub async fn create_playlist(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<PlaylistBody>,
) -> Result<(StatusCode, Json<ApiResponse<PlaylistResponse>>), AppError> {
    let name = body.name.trim();
    let description = body.description.trim();
    if name.is_empty() || description.is_empty() {
        return Err(AppError::Validation(
            "name and description are required".to_string(),
        ));
    }

    let now = Utc::now();
    let playlist = Playlist {
        id: EntityId::new().0,
        owner_id: user.id,
        name: name.to_string(),
        description: description.to_string(),
        created_at: now,
        updated_at: now,
    };
    state.db.insert_playlist(&playlist).await?;

    Ok(ApiResponse::created(
        PlaylistResponse::from(playlist),
        "playlist created successfully",
    ))
}

/// GET /api/v1/playlists/user/:userId
///
/// A user without playlists yields an empty list.
pub async fn user_playlists(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<PlaylistResponse>>>, AppError> {
    if state.db.get_user(&user_id).await?.is_none() {
        return Err(AppError::NotFound);
    }

    let playlists = state.db.get_playlists_by_owner(&user_id).await?;
    Ok(ApiResponse::ok(
        playlists.into_iter().map(PlaylistResponse::from).collect(),
        "playlists fetched successfully",
    ))
}

/// GET /api/v1/playlists/:id
pub async fn get_playlist(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Path(playlist_id): Path<String>,
) -> Result<Json<ApiResponse<PlaylistDetailResponse>>, AppError> {
    let playlist = state
        .db
        .get_playlist(&playlist_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let videos = state.db.get_playlist_videos(&playlist_id).await?;
    let videos = state
        .db
        .videos_with_owner(videos, viewer.as_ref().map(|user| user.id.as_str()))
        .await?;

    Ok(ApiResponse::ok(
        PlaylistDetailResponse {
            playlist: PlaylistResponse::from(playlist),
            videos,
        },
        "playlist fetched successfully",
    ))
}

/// PATCH /api/v1/playlists/:id
pub async fn update_playlist(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(playlist_id): Path<String>,
    Json(body): Json<PlaylistBody>,
) -> Result<Json<ApiResponse<PlaylistResponse>>, AppError> {
    let name = body.name.trim();
    let description = body.description.trim();
    if name.is_empty() || description.is_empty() {
        return Err(AppError::Validation(
            "name and description are required".to_string(),
        ));
    }

    let playlist = state
        .db
        .get_playlist(&playlist_id)
        .await?
        .ok_or(AppError::NotFound)?;
    if playlist.owner_id != user.id {
        return Err(AppError::Forbidden);
    }

    if !state
        .db
        .update_playlist(&playlist_id, name, description)
        .await?
    {
        return Err(AppError::NotFound);
    }

    let updated = state
        .db
        .get_playlist(&playlist_id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::ok(
        PlaylistResponse::from(updated),
        "playlist updated successfully",
    ))
}

/// DELETE /api/v1/playlists/:id
pub async fn delete_playlist(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(playlist_id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let playlist = state
        .db
        .get_playlist(&playlist_id)
        .await?
        .ok_or(AppError::NotFound)?;
    if playlist.owner_id != user.id {
        return Err(AppError::Forbidden);
    }

    if !state.db.delete_playlist(&playlist_id).await? {
        return Err(AppError::NotFound);
    }

    Ok(ApiResponse::ok(
        serde_json::json!({}),
        "playlist deleted successfully",
    ))
}

/// POST /api/v1/playlists/:id/videos/:videoId
///
/// A video appears at most once per playlist; a duplicate add is a
/// conflict.
pub async fn add_video(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((playlist_id, video_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let playlist = state
        .db
        .get_playlist(&playlist_id)
        .await?
        .ok_or(AppError::NotFound)?;
    if playlist.owner_id != user.id {
        return Err(AppError::Forbidden);
    }
    if state.db.get_video(&video_id).await?.is_none() {
        return Err(AppError::NotFound);
    }

    if !state.db.add_video_to_playlist(&playlist_id, &video_id).await? {
        return Err(AppError::Conflict(
            "video already exists in playlist".to_string(),
        ));
    }

    Ok(ApiResponse::ok(
        serde_json::json!({}),
        "video added successfully to playlist",
    ))
}

/// DELETE /api/v1/playlists/:id/videos/:videoId
pub async fn remove_video(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((playlist_id, video_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let playlist = state
        .db
        .get_playlist(&playlist_id)
        .await?
        .ok_or(AppError::NotFound)?;
    if playlist.owner_id != user.id {
        return Err(AppError::Forbidden);
    }

    if !state
        .db
        .remove_video_from_playlist(&playlist_id, &video_id)
        .await?
    {
        return Err(AppError::NotFound);
    }

    Ok(ApiResponse::ok(
        serde_json::json!({}),
        "video removed successfully from playlist",
    ))
}
