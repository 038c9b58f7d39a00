//! Video lifecycle and feed endpoints

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;

use super::dto::{ApiResponse, ListQuery, VideoResponse};
use super::form::FormData;
use super::spawn_best_effort_delete;
use crate::AppState;
use crate::auth::{CurrentUser, MaybeUser};
use crate::data::{
    EntityId, Page, PageRequest, SortDirection, Video, VideoFeedFilter, VideoFeedItem,
    VideoSortKey, filter_tags,
};
use crate::error::AppError;
use crate::metrics::{
    DB_QUERIES_TOTAL, HTTP_REQUEST_DURATION_SECONDS, HTTP_REQUESTS_TOTAL, VIDEOS_PUBLISHED_TOTAL,
};
use crate::storage::{AssetKind, asset_id_from_url};

/// Resolve the uploader filters of a list query to owner ids.
///
/// `userId` wins when present; otherwise username/fullname substrings
/// are resolved against the users table. Returns None when no uploader
/// filter was requested.
async fn resolve_owner_filter(
    state: &AppState,
    query: &ListQuery,
) -> Result<Option<Vec<String>>, AppError> {
    if let Some(user_id) = query.user_id.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        return Ok(Some(vec![user_id.to_string()]));
    }

    let username = query.username.as_deref().map(str::trim).filter(|v| !v.is_empty());
    let fullname = query.fullname.as_deref().map(str::trim).filter(|v| !v.is_empty());
    if username.is_none() && fullname.is_none() {
        return Ok(None);
    }

    let ids = state.db.find_user_ids_matching(username, fullname).await?;
    Ok(Some(ids))
}

/// GET /api/v1/videos
///
/// Paginated feed with free-text search, uploader filters, and
/// viewer-relative like state. Zero matches is an empty page, not an
/// error.
pub async fn list_videos(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Page<VideoFeedItem>>>, AppError> {
    // Start timing the request
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["GET", "/api/v1/videos"])
        .start_timer();

    let filter = VideoFeedFilter {
        search: query.query.clone(),
        owner_ids: resolve_owner_filter(&state, &query).await?,
        tag: None,
    };

    let page = state
        .db
        .video_feed(
            &filter,
            VideoSortKey::parse(query.sort_by.as_deref()),
            SortDirection::parse_or(query.sort_type.as_deref(), SortDirection::Desc),
            PageRequest::new(query.page, query.limit),
            viewer.as_ref().map(|user| user.id.as_str()),
        )
        .await?;
    DB_QUERIES_TOTAL
        .with_label_values(&["SELECT", "videos"])
        .inc();

    HTTP_REQUESTS_TOTAL
        .with_label_values(&["GET", "/api/v1/videos", "200"])
        .inc();

    Ok(ApiResponse::ok(page, "videos fetched successfully"))
}

/// GET /api/v1/videos/tag/:tag
pub async fn list_videos_by_tag(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Path(tag): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Page<VideoFeedItem>>>, AppError> {
    let filter = VideoFeedFilter {
        search: None,
        owner_ids: None,
        tag: Some(tag),
    };

    let page = state
        .db
        .video_feed(
            &filter,
            VideoSortKey::parse(query.sort_by.as_deref()),
            SortDirection::parse_or(query.sort_type.as_deref(), SortDirection::Desc),
            PageRequest::new(query.page, query.limit),
            viewer.as_ref().map(|user| user.id.as_str()),
        )
        .await?;

    Ok(ApiResponse::ok(page, "videos fetched successfully"))
}

/// POST /api/v1/videos
///
/// Multipart form: title, description, optional comma-separated tags,
/// videoFile, thumbnail. All required inputs are validated before any
/// remote upload; both assets then upload concurrently.
pub async fn publish_video(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<VideoResponse>>), AppError> {
    let mut form = FormData::read(multipart).await?;

    let title = form.require_text("title")?.to_string();
    let description = form.require_text("description")?.to_string();
    let tags = filter_tags(
        form.text("tags")
            .map(|raw| raw.split(',').map(str::to_string).collect::<Vec<_>>())
            .unwrap_or_default(),
    );
    let video_file = form.require_file("videoFile")?;
    let thumbnail_file = form.require_file("thumbnail")?;

    if !video_file.content_type.starts_with("video/") {
        return Err(AppError::Validation(
            "videoFile must be a video asset".to_string(),
        ));
    }

    let (uploaded_video, uploaded_thumbnail) = futures::future::try_join(
        state.media.upload(
            video_file.file,
            &video_file.file_name,
            &video_file.content_type,
            AssetKind::Video,
        ),
        state.media.upload(
            thumbnail_file.file,
            &thumbnail_file.file_name,
            &thumbnail_file.content_type,
            AssetKind::Image,
        ),
    )
    .await?;

    let now = Utc::now();
    let video = Video {
        id: EntityId::new().0,
        owner_id: user.id,
        video_url: uploaded_video.url,
        thumbnail_url: uploaded_thumbnail.url,
        title,
        description,
        duration: uploaded_video.duration.unwrap_or(0.0),
        views: 0,
        is_published: true,
        tags: serde_json::to_string(&tags)
            .map_err(|e| AppError::Internal(e.into()))?,
        created_at: now,
        updated_at: now,
    };
    state.db.insert_video(&video).await?;

    VIDEOS_PUBLISHED_TOTAL.inc();
    tracing::info!(video_id = %video.id, "Video published");

    Ok(ApiResponse::created(
        VideoResponse::from(video),
        "video uploaded successfully",
    ))
}

/// GET /api/v1/videos/:id
pub async fn get_video(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Path(video_id): Path<String>,
) -> Result<Json<ApiResponse<VideoFeedItem>>, AppError> {
    let video = state
        .db
        .video_detail(&video_id, viewer.as_ref().map(|user| user.id.as_str()))
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(ApiResponse::ok(video, "video fetched successfully"))
}

/// PATCH /api/v1/videos/:id
///
/// Owner-only; title, description, and thumbnail replace independently.
/// On thumbnail replacement the old remote asset is deleted best-effort
/// only after the new upload succeeded.
pub async fn update_video(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(video_id): Path<String>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<VideoResponse>>, AppError> {
    let video = state
        .db
        .get_video(&video_id)
        .await?
        .ok_or(AppError::NotFound)?;
    if video.owner_id != user.id {
        return Err(AppError::Forbidden);
    }

    let mut form = FormData::read(multipart).await?;
    let title = form.text("title").map(str::to_string);
    let description = form.text("description").map(str::to_string);

    let thumbnail_url = match form.take_file("thumbnail") {
        Some(thumbnail) => {
            let uploaded = state
                .media
                .upload(
                    thumbnail.file,
                    &thumbnail.file_name,
                    &thumbnail.content_type,
                    AssetKind::Image,
                )
                .await?;
            spawn_best_effort_delete(&state, &video.thumbnail_url, "old thumbnail");
            Some(uploaded.url)
        }
        None => None,
    };

    if !state
        .db
        .update_video_details(
            &video_id,
            title.as_deref(),
            description.as_deref(),
            thumbnail_url.as_deref(),
        )
        .await?
    {
        return Err(AppError::NotFound);
    }

    let updated = state
        .db
        .get_video(&video_id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::ok(
        VideoResponse::from(updated),
        "video updated successfully",
    ))
}

/// DELETE /api/v1/videos/:id
///
/// Owner-only. Remote assets are deleted first; the record is removed
/// regardless, but a remote cleanup failure is reported distinctly
/// instead of pretending the whole operation succeeded.
pub async fn delete_video(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(video_id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let video = state
        .db
        .get_video(&video_id)
        .await?
        .ok_or(AppError::NotFound)?;
    if video.owner_id != user.id {
        return Err(AppError::Forbidden);
    }

    let mut cleanup_failed = false;
    for (url, label) in [
        (&video.video_url, "video asset"),
        (&video.thumbnail_url, "thumbnail asset"),
    ] {
        let Some(asset_id) = asset_id_from_url(url) else {
            continue;
        };
        if let Err(error) = state.media.delete(&asset_id).await {
            tracing::error!(%error, video_id = %video.id, asset = label, "Remote asset deletion failed");
            cleanup_failed = true;
        }
    }

    if !state.db.delete_video(&video_id).await? {
        return Err(AppError::NotFound);
    }

    if cleanup_failed {
        return Err(AppError::MediaHost(
            "video record deleted, but remote asset cleanup failed".to_string(),
        ));
    }

    Ok(ApiResponse::ok(
        serde_json::json!({}),
        "video deleted successfully",
    ))
}

/// PATCH /api/v1/videos/:id/toggle-publish
///
/// Owner-only, like every other video mutation.
pub async fn toggle_publish(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(video_id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let video = state
        .db
        .get_video(&video_id)
        .await?
        .ok_or(AppError::NotFound)?;
    if video.owner_id != user.id {
        return Err(AppError::Forbidden);
    }

    let is_published = state
        .db
        .toggle_publish(&video_id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(ApiResponse::ok(
        serde_json::json!({ "isPublished": is_published }),
        "video publish status toggled successfully",
    ))
}

/// POST /api/v1/videos/:id/views
///
/// Monotonic +1 per call; abuse control is the external rate limiter's
/// concern.
pub async fn increment_views(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let views = state
        .db
        .increment_views(&video_id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(ApiResponse::ok(
        serde_json::json!({ "views": views }),
        "view count incremented",
    ))
}
