//! 课程视频处理器

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::Json,
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use super::model::{CreateVideoRequest, ListVideosQuery, UpdateVideoRequest, Video};
use super::service;
use crate::core::auth::CurrentUser;
use crate::core::error::Result;
use crate::core::middleware::try_current_user;
use crate::core::response::{ApiResponse, PaginatedResponse};
use crate::AppState;

pub async fn list_videos(
    State(state): State<AppState>,
    Query(query): Query<ListVideosQuery>,
) -> Result<Json<PaginatedResponse<Video>>> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(10).clamp(1, 100);

    let (videos, total) =
        service::list_on_shelf(&state.db, page, limit, query.search.as_deref()).await?;

    Ok(Json(PaginatedResponse::new(videos, page, limit, total)))
}

/// 公开详情端点；携带管理员令牌时可见未上架视频
pub async fn get_video(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<Video>>> {
    let is_admin = try_current_user(&headers, &state.config.auth.token_secret)
        .map(|u| u.role == "admin")
        .unwrap_or(false);

    let video = service::get_video(&state.db, id, is_admin).await?;
    Ok(Json(ApiResponse::success(video)))
}

pub async fn create_video(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<CreateVideoRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Video>>)> {
    current.ensure_admin()?;
    payload.validate()?;

    let video = service::create_video(&state.db, &payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(video))))
}

pub async fn update_video(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateVideoRequest>,
) -> Result<Json<ApiResponse<Video>>> {
    current.ensure_admin()?;
    payload.validate()?;

    let video = service::update_video(&state.db, id, &payload).await?;
    Ok(Json(ApiResponse::success(video)))
}

pub async fn delete_video(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    current.ensure_admin()?;

    service::take_down_video(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
