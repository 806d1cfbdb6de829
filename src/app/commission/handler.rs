//! 分佣处理器

use axum::{
    extract::{Path, Query, State},
    response::Json,
    Extension,
};
use uuid::Uuid;

use super::model::{Commission, CommissionSummary, ListCommissionsQuery};
use super::service;
use crate::core::auth::CurrentUser;
use crate::core::error::Result;
use crate::core::response::ApiResponse;
use crate::AppState;

pub async fn list_commissions(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(query): Query<ListCommissionsQuery>,
) -> Result<Json<ApiResponse<Vec<Commission>>>> {
    let commissions =
        service::list_commissions(&state.db, current.id, query.status.as_deref()).await?;
    Ok(Json(ApiResponse::success(commissions)))
}

pub async fn commission_summary(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<CommissionSummary>>> {
    let summary = service::summary(&state.db, current.id).await?;
    Ok(Json(ApiResponse::success(summary)))
}

pub async fn confirm_commission(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Commission>>> {
    current.ensure_admin()?;

    let commission = service::confirm_commission(&state.db, id).await?;
    Ok(Json(ApiResponse::success(commission)))
}
