//! Tweet endpoints

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::dto::ApiResponse;
use crate::AppState;
use crate::auth::CurrentUser;
use crate::data::{EntityId, Tweet};
use crate::error::AppError;

/// Tweet response shape
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TweetResponse {
    pub id: String,
    pub owner_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Tweet> for TweetResponse {
    fn from(tweet: Tweet) -> Self {
        Self {
            id: tweet.id,
            owner_id: tweet.owner_id,
            content: tweet.content,
            created_at: tweet.created_at,
            updated_at: tweet.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TweetBody {
    pub content: String,
}

/// POST /api/v1/tweets
pub async fn create_tweet(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<TweetBody>,
) -> Result<(StatusCode, Json<ApiResponse<TweetResponse>>), AppError> {
    let content = body.content.trim();
    if content.is_empty() {
        return Err(AppError::Validation("content is required".to_string()));
    }

    let now = Utc::now();
    let tweet = Tweet {
        id: EntityId::new().0,
        owner_id: user.id,
        content: content.to_string(),
        created_at: now,
        updated_at: now,
    };
    state.db.insert_tweet(&tweet).await?;

    Ok(ApiResponse::created(
        TweetResponse::from(tweet),
        "tweet saved successfully",
    ))
}

/// GET /api/v1/tweets/user/:userId
///
/// A user without tweets yields an empty list.
pub async fn user_tweets(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<TweetResponse>>>, AppError> {
    if state.db.get_user(&user_id).await?.is_none() {
        return Err(AppError::NotFound);
    }

    let tweets = state.db.get_tweets_by_owner(&user_id).await?;
    Ok(ApiResponse::ok(
        tweets.into_iter().map(TweetResponse::from).collect(),
        "tweets fetched successfully",
    ))
}

/// PATCH /api/v1/tweets/:id
pub async fn update_tweet(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(tweet_id): Path<String>,
    Json(body): Json<TweetBody>,
) -> Result<Json<ApiResponse<TweetResponse>>, AppError> {
    let content = body.content.trim();
    if content.is_empty() {
        return Err(AppError::Validation("content is required".to_string()));
    }

    let tweet = state
        .db
        .get_tweet(&tweet_id)
        .await?
        .ok_or(AppError::NotFound)?;
    if tweet.owner_id != user.id {
        return Err(AppError::Forbidden);
    }

    if !state.db.update_tweet_content(&tweet_id, content).await? {
        return Err(AppError::NotFound);
    }

    let updated = state
        .db
        .get_tweet(&tweet_id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::ok(
        TweetResponse::from(updated),
        "tweet updated successfully",
    ))
}

/// DELETE /api/v1/tweets/:id
pub async fn delete_tweet(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(tweet_id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let tweet = state
        .db
        .get_tweet(&tweet_id)
        .await?
        .ok_or(AppError::NotFound)?;
    if tweet.owner_id != user.id {
        return Err(AppError::Forbidden);
    }

    if !state.db.delete_tweet(&tweet_id).await? {
        return Err(AppError::NotFound);
    }

    Ok(ApiResponse::ok(
        serde_json::json!({}),
        "tweet deleted successfully",
    ))
}
