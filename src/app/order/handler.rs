//! 订单处理器

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use uuid::Uuid;

use super::model::{CreateOrderRequest, Order, OrderView, PayOrderRequest, STATUS_PENDING};
use super::service;
use crate::app::payment::provider::PaymentIntent;
use crate::app::payment::service as payment_service;
use crate::core::auth::CurrentUser;
use crate::core::error::{AppError, Result};
use crate::core::response::ApiResponse;
use crate::AppState;

pub async fn create_order(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<OrderView>>)> {
    let order = service::create_order(&state.db, current.id, &payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(order))))
}

pub async fn list_orders(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<Vec<Order>>>> {
    let orders = service::list_orders(&state.db, current.id).await?;
    Ok(Json(ApiResponse::success(orders)))
}

pub async fn get_order(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<OrderView>>> {
    let order = service::get_order(&state.db, id).await?;

    // 订单仅本人或管理员可见
    if order.order.user_id != current.id && current.role != "admin" {
        return Err(AppError::Forbidden);
    }

    Ok(Json(ApiResponse::success(order)))
}

/// 发起支付：按请求的渠道生成支付意向
pub async fn pay_order(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PayOrderRequest>,
) -> Result<Json<ApiResponse<PaymentIntent>>> {
    let order = service::get_order(&state.db, id).await?;

    if order.order.user_id != current.id {
        return Err(AppError::Forbidden);
    }
    if order.order.status != STATUS_PENDING {
        return Err(AppError::Conflict(format!(
            "订单 {} 已结算，不能重复支付",
            order.order.id
        )));
    }

    let intent = payment_service::create_intent(
        &state.config.payment,
        &payload.payment_method,
        &order.order,
    )?;

    Ok(Json(ApiResponse::success(intent)))
}
