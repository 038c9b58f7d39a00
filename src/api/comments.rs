//! Comment endpoints

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::dto::{ApiResponse, ListQuery};
use crate::AppState;
use crate::auth::CurrentUser;
use crate::data::{Comment, CommentFeedItem, EntityId, Page, PageRequest};
use crate::error::AppError;

/// Comment response shape
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: String,
    pub video_id: String,
    pub owner_id: String,
    pub content: String,
    pub created_at: chrono::DateTime<Utc>,
    pub updated_at: chrono::DateTime<Utc>,
}

impl From<Comment> for CommentResponse {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            video_id: comment.video_id,
            owner_id: comment.owner_id,
            content: comment.content,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CommentBody {
    pub content: String,
}

/// GET /api/v1/videos/:id/comments
///
/// Paginated, newest first, each row carrying its author's public info.
pub async fn list_comments(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Page<CommentFeedItem>>>, AppError> {
    let page = state
        .db
        .comment_feed(&video_id, PageRequest::new(query.page, query.limit))
        .await?;

    Ok(ApiResponse::ok(page, "comments fetched successfully"))
}

/// POST /api/v1/videos/:id/comments
pub async fn add_comment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(video_id): Path<String>,
    Json(body): Json<CommentBody>,
) -> Result<(StatusCode, Json<ApiResponse<CommentResponse>>), AppError> {
    let content = body.content.trim();
    if content.is_empty() {
        return Err(AppError::Validation("content is required".to_string()));
    }

    if state.db.get_video(&video_id).await?.is_none() {
        return Err(AppError::NotFound);
    }

    let now = Utc::now();
    let comment = Comment {
        id: EntityId::new().0,
        video_id,
        owner_id: user.id,
        content: content.to_string(),
        created_at: now,
        updated_at: now,
    };
    state.db.insert_comment(&comment).await?;

    Ok(ApiResponse::created(
        CommentResponse::from(comment),
        "comment added successfully",
    ))
}

/// PATCH /api/v1/comments/:id
pub async fn update_comment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(comment_id): Path<String>,
    Json(body): Json<CommentBody>,
) -> Result<Json<ApiResponse<CommentResponse>>, AppError> {
    let content = body.content.trim();
    if content.is_empty() {
        return Err(AppError::Validation("content is required".to_string()));
    }

    let comment = state
        .db
        .get_comment(&comment_id)
        .await?
        .ok_or(AppError::NotFound)?;
    if comment.owner_id != user.id {
        return Err(AppError::Forbidden);
    }

    if !state.db.update_comment_content(&comment_id, content).await? {
        return Err(AppError::NotFound);
    }

    let updated = state
        .db
        .get_comment(&comment_id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::ok(
        CommentResponse::from(updated),
        "comment edited successfully",
    ))
}

/// DELETE /api/v1/comments/:id
pub async fn delete_comment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(comment_id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let comment = state
        .db
        .get_comment(&comment_id)
        .await?
        .ok_or(AppError::NotFound)?;
    if comment.owner_id != user.id {
        return Err(AppError::Forbidden);
    }

    if !state.db.delete_comment(&comment_id).await? {
        return Err(AppError::NotFound);
    }

    Ok(ApiResponse::ok(
        serde_json::json!({}),
        "comment deleted successfully",
    ))
}
