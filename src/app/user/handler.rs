//! 用户处理器

use axum::{extract::State, http::StatusCode, response::Json, Extension};
use validator::Validate;

use super::model::{LoginRequest, LoginResponse, ReferralEntry, RegisterRequest, User};
use super::service;
use crate::core::auth::CurrentUser;
use crate::core::error::Result;
use crate::core::response::ApiResponse;
use crate::AppState;

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<User>>)> {
    payload.validate()?;
    let user = service::register(&state.db, &payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(user))))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>> {
    payload.validate()?;
    let response = service::login(&state.db, &state.config.auth, &payload).await?;
    Ok(Json(ApiResponse::success(response)))
}

pub async fn me(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<User>>> {
    let user = service::get_profile(&state.db, current.id).await?;
    Ok(Json(ApiResponse::success(user)))
}

pub async fn my_referrals(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<Vec<ReferralEntry>>>> {
    let referrals = service::list_referrals(&state.db, current.id).await?;
    Ok(Json(ApiResponse::success(referrals)))
}
