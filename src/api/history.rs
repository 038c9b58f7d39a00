//! Watch history endpoints

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::Utc;

use super::dto::{ApiResponse, ListQuery};
use crate::AppState;
use crate::auth::CurrentUser;
use crate::data::{HistoryFeedItem, HistorySortKey, Page, PageRequest, SortDirection};
use crate::error::AppError;
use crate::metrics::{DB_QUERIES_TOTAL, HTTP_REQUEST_DURATION_SECONDS, HTTP_REQUESTS_TOTAL};

/// POST /api/v1/history/:videoId
///
/// Records a watch. Re-watching removes the prior entry and reinserts
/// it at the front: the history holds one entry per video, ordered by
/// most recent watch.
pub async fn add_to_history(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(video_id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    if state.db.get_video(&video_id).await?.is_none() {
        return Err(AppError::NotFound);
    }

    let watched_at = Utc::now();
    state.db.record_watch(&user.id, &video_id, watched_at).await?;

    Ok(ApiResponse::ok(
        serde_json::json!({ "videoId": video_id, "watchedAt": watched_at }),
        "video added to watch history",
    ))
}

/// GET /api/v1/history
///
/// Paginated watch history: history rows joined to their videos and
/// video owners, filterable by free text and uploader.
pub async fn get_history(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Page<HistoryFeedItem>>>, AppError> {
    // Start timing the request
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["GET", "/api/v1/history"])
        .start_timer();

    let username = query.username.as_deref().map(str::trim).filter(|v| !v.is_empty());
    let fullname = query.fullname.as_deref().map(str::trim).filter(|v| !v.is_empty());
    let owner_ids = if username.is_some() || fullname.is_some() {
        Some(state.db.find_user_ids_matching(username, fullname).await?)
    } else {
        None
    };

    let page = state
        .db
        .history_feed(
            &user.id,
            query.query.as_deref(),
            owner_ids.as_deref(),
            HistorySortKey::parse(query.sort_by.as_deref()),
            SortDirection::parse_or(query.sort_type.as_deref(), SortDirection::Desc),
            PageRequest::new(query.page, query.limit),
        )
        .await?;
    DB_QUERIES_TOTAL
        .with_label_values(&["SELECT", "watch_history"])
        .inc();

    HTTP_REQUESTS_TOTAL
        .with_label_values(&["GET", "/api/v1/history", "200"])
        .inc();

    Ok(ApiResponse::ok(page, "watch history fetched successfully"))
}
