//! Subscription endpoints

use axum::{
    Json,
    extract::{Path, State},
};

use super::dto::ApiResponse;
use crate::AppState;
use crate::auth::CurrentUser;
use crate::data::SubscriptionEntry;
use crate::error::AppError;

/// POST /api/v1/subscriptions/channel/:id
///
/// Toggle the (subscriber, channel) junction row.
pub async fn toggle_subscription(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(channel_id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    if state.db.get_user(&channel_id).await?.is_none() {
        return Err(AppError::NotFound);
    }

    let subscribed = state.db.toggle_subscription(&user.id, &channel_id).await?;
    let message = if subscribed {
        "subscribed successfully"
    } else {
        "unsubscribed successfully"
    };

    Ok(ApiResponse::ok(
        serde_json::json!({ "subscribed": subscribed }),
        message,
    ))
}

/// GET /api/v1/subscriptions/channel/:id/subscribers
///
/// A channel with no subscribers yields an empty list.
pub async fn channel_subscribers(
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<SubscriptionEntry>>>, AppError> {
    if state.db.get_user(&channel_id).await?.is_none() {
        return Err(AppError::NotFound);
    }

    let subscribers = state.db.channel_subscribers(&channel_id).await?;
    Ok(ApiResponse::ok(
        subscribers,
        "subscribers fetched successfully",
    ))
}

/// GET /api/v1/subscriptions/user/:id/channels
pub async fn subscribed_channels(
    State(state): State<AppState>,
    Path(subscriber_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<SubscriptionEntry>>>, AppError> {
    if state.db.get_user(&subscriber_id).await?.is_none() {
        return Err(AppError::NotFound);
    }

    let channels = state.db.subscribed_channels(&subscriber_id).await?;
    Ok(ApiResponse::ok(
        channels,
        "subscribed channels fetched successfully",
    ))
}
