//! 购物车处理器

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use uuid::Uuid;

use super::model::{AddCartRequest, CartView};
use super::service;
use crate::core::auth::CurrentUser;
use crate::core::error::Result;
use crate::core::response::ApiResponse;
use crate::AppState;

pub async fn get_cart(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<CartView>>> {
    let cart = service::get_cart(&state.db, current.id).await?;
    Ok(Json(ApiResponse::success(cart)))
}

pub async fn add_item(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<AddCartRequest>,
) -> Result<Json<ApiResponse<CartView>>> {
    let cart = service::add_item(&state.db, current.id, payload.video_id).await?;
    Ok(Json(ApiResponse::success(cart)))
}

pub async fn remove_item(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(video_id): Path<Uuid>,
) -> Result<Json<ApiResponse<CartView>>> {
    let cart = service::remove_item(&state.db, current.id, video_id).await?;
    Ok(Json(ApiResponse::success(cart)))
}

pub async fn clear_cart(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<StatusCode> {
    service::clear_cart(&state.db, current.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
