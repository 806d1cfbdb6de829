//! 核心中间件模块

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::info;

use crate::core::auth::{self, CurrentUser};
use crate::core::error::{AppError, Result};
use crate::AppState;

/// 请求日志中间件
pub async fn request_logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();
    let user_agent = req
        .headers()
        .get("user-agent")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string());

    let response = next.run(req).await;
    let status = response.status();
    let duration = start.elapsed();

    info!(
        "{} {} - {} - {}ms - User-Agent: {:?}",
        method,
        uri,
        status,
        duration.as_millis(),
        user_agent
    );

    response
}

/// 认证中间件
///
/// 从 Authorization 头提取 Bearer 令牌并校验，
/// 校验通过后将当前用户写入请求扩展。
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response> {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(AppError::Unauthorized)?;

    let claims = auth::verify_token(&state.config.auth.token_secret, token)?;

    req.extensions_mut().insert(CurrentUser {
        id: claims.sub,
        email: claims.email,
        role: claims.role,
    });

    Ok(next.run(req).await)
}

/// 从请求头尝试解析当前用户，用于公开端点上的可选认证
pub fn try_current_user(
    headers: &axum::http::HeaderMap,
    token_secret: &str,
) -> Option<CurrentUser> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))?;

    auth::verify_token(token_secret, token)
        .ok()
        .map(|claims| CurrentUser {
            id: claims.sub,
            email: claims.email,
            role: claims.role,
        })
}
