//! 提现处理器

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use super::model::{CreateWithdrawalRequest, Withdrawal};
use super::service;
use crate::core::auth::CurrentUser;
use crate::core::error::Result;
use crate::core::response::ApiResponse;
use crate::AppState;

pub async fn request_withdrawal(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<CreateWithdrawalRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Withdrawal>>)> {
    payload.validate()?;

    let withdrawal = service::request_withdrawal(
        &state.db,
        &state.config.commission,
        current.id,
        &payload,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(withdrawal))))
}

pub async fn list_withdrawals(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<Vec<Withdrawal>>>> {
    let withdrawals = service::list_withdrawals(&state.db, current.id).await?;
    Ok(Json(ApiResponse::success(withdrawals)))
}

pub async fn list_requested(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<Vec<Withdrawal>>>> {
    current.ensure_admin()?;

    let withdrawals = service::list_requested(&state.db).await?;
    Ok(Json(ApiResponse::success(withdrawals)))
}

pub async fn approve(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Withdrawal>>> {
    current.ensure_admin()?;

    let withdrawal = service::approve(&state.db, id).await?;
    Ok(Json(ApiResponse::success(withdrawal)))
}

pub async fn reject(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Withdrawal>>> {
    current.ensure_admin()?;

    let withdrawal = service::reject(&state.db, id).await?;
    Ok(Json(ApiResponse::success(withdrawal)))
}

pub async fn mark_paid(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Withdrawal>>> {
    current.ensure_admin()?;

    let withdrawal = service::mark_paid(&state.db, id).await?;
    Ok(Json(ApiResponse::success(withdrawal)))
}
