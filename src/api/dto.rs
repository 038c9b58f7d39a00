//! API response DTOs and shared query shapes
//!
//! Every success response is wrapped in the `{statusCode, data, message}`
//! envelope; errors use the `{statusCode, message}` envelope produced by
//! `AppError::into_response`.

use axum::Json;
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::data::{UserPublic, Video};

/// Uniform success envelope
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub status_code: u16,
    pub data: T,
    pub message: String,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 envelope
    pub fn ok(data: T, message: impl Into<String>) -> Json<Self> {
        Json(Self {
            status_code: StatusCode::OK.as_u16(),
            data,
            message: message.into(),
        })
    }

    /// 201 envelope
    pub fn created(data: T, message: impl Into<String>) -> (StatusCode, Json<Self>) {
        (
            StatusCode::CREATED,
            Json(Self {
                status_code: StatusCode::CREATED.as_u16(),
                data,
                message: message.into(),
            }),
        )
    }
}

/// Shared pagination/list query parameters
///
/// `page` is 1-based; `limit` defaults to 10. Endpoint-specific filters
/// (`username`, `fullname`, `tag`, `userId`) are ignored where they make
/// no sense.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub query: Option<String>,
    pub sort_by: Option<String>,
    pub sort_type: Option<String>,
    pub username: Option<String>,
    pub fullname: Option<String>,
    pub user_id: Option<String>,
}

/// Video response shape for non-feed endpoints (publish, dashboard)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoResponse {
    pub id: String,
    pub owner_id: String,
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
}

impl From<Video> for VideoResponse {
    fn from(video: Video) -> Self {
        let tags = video.tag_list();
        Self {
            id: video.id,
            owner_id: video.owner_id,
            video_url: video.video_url,
            thumbnail_url: video.thumbnail_url,
            title: video.title,
            description: video.description,
            duration: video.duration,
            views: video.views,
            is_published: video.is_published,
            tags,
            created_at: video.created_at,
            updated_at: video.updated_at,
        }
    }
}

/// Login/refresh response: profile plus both tokens
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: UserPublic,
    pub access_token: String,
    pub refresh_token: String,
}

/// Channel profile: public user plus subscription aggregates
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelProfileResponse {
    #[serde(flatten)]
    pub user: UserPublic,
    pub subscribers_count: i64,
    pub subscribed_to_count: i64,
    pub is_subscribed: bool,
}
