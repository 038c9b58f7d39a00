//! User account and authentication endpoints

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use serde::Deserialize;

use super::dto::{ApiResponse, AuthResponse, ChannelProfileResponse};
use super::form::FormData;
use super::spawn_best_effort_delete;
use crate::AppState;
use crate::auth::{
    ACCESS_TOKEN_COOKIE, CurrentUser, MaybeUser, REFRESH_TOKEN_COOKIE, TokenPair, hash_password,
    issue_token_pair, verify_password, verify_refresh_token,
};
use crate::data::{EntityId, User, UserPublic};
use crate::error::AppError;
use crate::metrics::USERS_REGISTERED_TOTAL;
use crate::storage::AssetKind;

/// Build the auth cookie pair for a freshly issued token pair.
fn auth_cookies(jar: CookieJar, pair: &TokenPair, secure: bool) -> CookieJar {
    let build = |name: &'static str, value: String| {
        let mut cookie = Cookie::new(name, value);
        cookie.set_http_only(true);
        cookie.set_secure(secure);
        cookie.set_same_site(SameSite::Lax);
        cookie.set_path("/");
        cookie
    };

    jar.add(build(ACCESS_TOKEN_COOKIE, pair.access_token.clone()))
        .add(build(REFRESH_TOKEN_COOKIE, pair.refresh_token.clone()))
}

/// Remove both auth cookies.
fn clear_auth_cookies(jar: CookieJar) -> CookieJar {
    let removal = |name: &'static str| {
        let mut cookie = Cookie::new(name, "");
        cookie.set_path("/");
        cookie
    };

    jar.remove(removal(ACCESS_TOKEN_COOKIE))
        .remove(removal(REFRESH_TOKEN_COOKIE))
}

/// POST /api/v1/users/register
///
/// Multipart form: username, email, fullname, password, avatar file,
/// optional coverImage file. Field validation happens before any remote
/// upload, so a rejected request leaves no orphaned asset.
pub async fn register(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<UserPublic>>), AppError> {
    let mut form = FormData::read(multipart).await?;

    let username = form.require_text("username")?.to_lowercase();
    let email = form.require_text("email")?.to_lowercase();
    let full_name = form.require_text("fullname")?.to_string();
    let password = form.require_text("password")?.to_string();
    let avatar = form.require_file("avatar")?;

    if state.db.username_or_email_exists(&username, &email).await? {
        return Err(AppError::Conflict("username or email already exists".to_string()));
    }

    let uploaded_avatar = state
        .media
        .upload(avatar.file, &avatar.file_name, &avatar.content_type, AssetKind::Image)
        .await?;

    let cover_url = match form.take_file("coverImage") {
        Some(cover) => Some(
            state
                .media
                .upload(cover.file, &cover.file_name, &cover.content_type, AssetKind::Image)
                .await?
                .url,
        ),
        None => None,
    };

    let now = Utc::now();
    let user = User {
        id: EntityId::new().0,
        username,
        email,
        full_name,
        avatar_url: uploaded_avatar.url,
        cover_url,
        password_hash: hash_password(&password)?,
        refresh_token: None,
        created_at: now,
        updated_at: now,
    };
    state.db.insert_user(&user).await?;

    USERS_REGISTERED_TOTAL.inc();
    tracing::info!(username = %user.username, "User registered");

    Ok(ApiResponse::created(
        UserPublic::from(user),
        "user created successfully",
    ))
}

/// Login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: String,
}

/// POST /api/v1/users/login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<(CookieJar, Json<ApiResponse<AuthResponse>>), AppError> {
    let identifier = request
        .username
        .as_deref()
        .or(request.email.as_deref())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::Validation("username or email is required".to_string()))?;

    let user = state
        .db
        .get_user_by_username_or_email(identifier)
        .await?
        .ok_or(AppError::NotFound)?;

    if !verify_password(&request.password, &user.password_hash)? {
        return Err(AppError::Unauthorized);
    }

    let pair = issue_token_pair(&user, &state.config.auth)?;
    state
        .db
        .set_refresh_token(&user.id, Some(&pair.refresh_token))
        .await?;

    let jar = auth_cookies(jar, &pair, state.config.should_use_secure_cookies());
    let response = AuthResponse {
        user: UserPublic::from(user),
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
    };

    Ok((jar, ApiResponse::ok(response, "logged in successfully")))
}

/// Refresh request body (token may come from the cookie instead)
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

/// POST /api/v1/users/refresh-token
///
/// Rotates both tokens. A presented token that no longer matches the
/// stored value is treated as reuse and rejected.
pub async fn refresh_token(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Option<Json<RefreshRequest>>,
) -> Result<(CookieJar, Json<ApiResponse<AuthResponse>>), AppError> {
    let presented = jar
        .get(REFRESH_TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .or_else(|| body.and_then(|Json(request)| request.refresh_token))
        .ok_or(AppError::Unauthorized)?;

    let claims = verify_refresh_token(&presented, &state.config.auth)?;
    let user = state
        .db
        .get_user(&claims.sub)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if user.refresh_token.as_deref() != Some(presented.as_str()) {
        tracing::warn!(user_id = %user.id, "Refresh token mismatch; possible reuse");
        return Err(AppError::Unauthorized);
    }

    let pair = issue_token_pair(&user, &state.config.auth)?;
    state
        .db
        .set_refresh_token(&user.id, Some(&pair.refresh_token))
        .await?;

    let jar = auth_cookies(jar, &pair, state.config.should_use_secure_cookies());
    let response = AuthResponse {
        user: UserPublic::from(user),
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
    };

    Ok((jar, ApiResponse::ok(response, "tokens refreshed successfully")))
}

/// POST /api/v1/users/logout
pub async fn logout(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
) -> Result<(CookieJar, Json<ApiResponse<serde_json::Value>>), AppError> {
    state.db.set_refresh_token(&user.id, None).await?;

    Ok((
        clear_auth_cookies(jar),
        ApiResponse::ok(serde_json::json!({}), "logged out successfully"),
    ))
}

/// Change password request body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

/// POST /api/v1/users/change-password
pub async fn change_password(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    if request.new_password.trim().is_empty() {
        return Err(AppError::Validation("new password is required".to_string()));
    }

    if !verify_password(&request.old_password, &user.password_hash)? {
        return Err(AppError::Unauthorized);
    }

    let new_hash = hash_password(&request.new_password)?;
    state.db.set_password_hash(&user.id, &new_hash).await?;

    Ok(ApiResponse::ok(
        serde_json::json!({}),
        "password changed successfully",
    ))
}

/// GET /api/v1/users/me
pub async fn current_user(
    CurrentUser(user): CurrentUser,
) -> Json<ApiResponse<UserPublic>> {
    ApiResponse::ok(UserPublic::from(user), "user fetched successfully")
}

/// Profile update request body
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub fullname: Option<String>,
    pub email: Option<String>,
}

/// PATCH /api/v1/users/me
pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<UserPublic>>, AppError> {
    let full_name = request
        .fullname
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty());
    let email = request
        .email
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_lowercase);

    if full_name.is_none() && email.is_none() {
        return Err(AppError::Validation(
            "fullname or email is required".to_string(),
        ));
    }

    if !state
        .db
        .update_user_profile(&user.id, full_name, email.as_deref())
        .await?
    {
        return Err(AppError::NotFound);
    }

    let updated = state.db.get_user(&user.id).await?.ok_or(AppError::NotFound)?;
    Ok(ApiResponse::ok(
        UserPublic::from(updated),
        "profile updated successfully",
    ))
}

/// PATCH /api/v1/users/me/avatar
///
/// The previous remote avatar is deleted best-effort only after the new
/// upload is confirmed.
pub async fn update_avatar(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    multipart: Multipart,
) -> Result<Json<ApiResponse<UserPublic>>, AppError> {
    let mut form = FormData::read(multipart).await?;
    let avatar = form.require_file("avatar")?;

    let uploaded = state
        .media
        .upload(avatar.file, &avatar.file_name, &avatar.content_type, AssetKind::Image)
        .await?;
    state.db.set_avatar_url(&user.id, &uploaded.url).await?;

    spawn_best_effort_delete(&state, &user.avatar_url, "old avatar");

    let updated = state.db.get_user(&user.id).await?.ok_or(AppError::NotFound)?;
    Ok(ApiResponse::ok(
        UserPublic::from(updated),
        "avatar updated successfully",
    ))
}

/// PATCH /api/v1/users/me/cover
pub async fn update_cover(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    multipart: Multipart,
) -> Result<Json<ApiResponse<UserPublic>>, AppError> {
    let mut form = FormData::read(multipart).await?;
    let cover = form.require_file("coverImage")?;

    let uploaded = state
        .media
        .upload(cover.file, &cover.file_name, &cover.content_type, AssetKind::Image)
        .await?;
    state.db.set_cover_url(&user.id, &uploaded.url).await?;

    if let Some(old_cover) = &user.cover_url {
        spawn_best_effort_delete(&state, old_cover, "old cover");
    }

    let updated = state.db.get_user(&user.id).await?.ok_or(AppError::NotFound)?;
    Ok(ApiResponse::ok(
        UserPublic::from(updated),
        "cover image updated successfully",
    ))
}

/// GET /api/v1/users/channel/:username
///
/// Public channel profile with subscription aggregates; `isSubscribed`
/// reflects the requesting viewer when authenticated.
pub async fn channel_profile(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Path(username): Path<String>,
) -> Result<Json<ApiResponse<ChannelProfileResponse>>, AppError> {
    let user = state
        .db
        .get_user_by_username(&username)
        .await?
        .ok_or(AppError::NotFound)?;

    let (subscribers_count, subscribed_to_count) =
        state.db.get_channel_counts(&user.id).await?;

    let is_subscribed = match &viewer {
        Some(viewer) => state.db.subscription_exists(&viewer.id, &user.id).await?,
        None => false,
    };

    Ok(ApiResponse::ok(
        ChannelProfileResponse {
            user: UserPublic::from(user),
            subscribers_count,
            subscribed_to_count,
            is_subscribed,
        },
        "channel profile fetched successfully",
    ))
}
