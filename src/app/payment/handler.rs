//! 支付回调处理器

use axum::{extract::State, http::HeaderMap, response::Json};

use super::model::PaymentNotification;
use super::service as payment_service;
use crate::app::order::model::{Order, SettlementOutcome};
use crate::app::order::service as order_service;
use crate::core::error::{AppError, Result};
use crate::core::response::ApiResponse;
use crate::AppState;

/// 回调签名头
const SIGNATURE_HEADER: &str = "X-Pay-Signature";

/// 支付渠道回调入口，与具体渠道无关
///
/// 先校验签名再改任何状态；签名校验需要原始请求体，
/// 因此这里手动接收 body 字符串再做反序列化。
pub async fn notify(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<ApiResponse<Order>>> {
    let notification: PaymentNotification = serde_json::from_str(&body)
        .map_err(|e| AppError::BadRequest(format!("回调报文无效: {}", e)))?;

    let outcome = SettlementOutcome::parse(&notification.status).ok_or_else(|| {
        AppError::BadRequest(format!("无效的回调状态: {}", notification.status))
    })?;

    let provider =
        payment_service::resolve_provider(&state.config.payment, &notification.payment_method)?;

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    if !payment_service::verify_signature(body.as_bytes(), signature, provider.webhook_secret())? {
        return Err(AppError::Unauthorized);
    }

    let order = order_service::settle_order(
        &state.db,
        &state.config.commission,
        notification.order_id,
        outcome,
        &notification.payment_method,
        &notification.transaction_id,
    )
    .await?;

    Ok(Json(ApiResponse::success(order)))
}
