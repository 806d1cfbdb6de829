//! # 视频课程商城后端
//!
//! 模块化分层架构：
//! - 应用层 (app)：用户、视频、购物车、订单、支付、分佣、提现
//! - 核心层 (core)：错误处理、响应结构、认证与中间件
//! - 基础设施层 (infrastructure)：数据库连接与日志

pub mod app;
pub mod config;
pub mod core;
pub mod infrastructure;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    middleware,
    response::Json,
    routing::{delete, get, post, put},
    Router,
};
use sqlx::PgPool;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::app::{cart, commission, order, payment, user, video, withdrawal};
use crate::config::Config;
use crate::core::error::Result;
use crate::core::middleware::{auth_middleware, request_logging_middleware};

pub use crate::core::error::AppError;

/// 应用状态
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
}

/// 组装路由
pub fn build_router(state: AppState) -> Router {
    // 公开端点：注册、登录、目录浏览、支付回调
    let public = Router::new()
        .route("/health", get(health_check))
        .route("/api/auth/register", post(user::handler::register))
        .route("/api/auth/login", post(user::handler::login))
        .route("/api/videos", get(video::handler::list_videos))
        .route("/api/videos/:id", get(video::handler::get_video))
        .route("/api/payments/notify", post(payment::handler::notify));

    // 登录后端点
    let protected = Router::new()
        .route("/api/users/me", get(user::handler::me))
        .route("/api/users/me/referrals", get(user::handler::my_referrals))
        .route("/api/videos", post(video::handler::create_video))
        .route(
            "/api/videos/:id",
            put(video::handler::update_video).delete(video::handler::delete_video),
        )
        .route(
            "/api/cart",
            get(cart::handler::get_cart)
                .post(cart::handler::add_item)
                .delete(cart::handler::clear_cart),
        )
        .route("/api/cart/:video_id", delete(cart::handler::remove_item))
        .route(
            "/api/orders",
            get(order::handler::list_orders).post(order::handler::create_order),
        )
        .route("/api/orders/:id", get(order::handler::get_order))
        .route("/api/orders/:id/pay", post(order::handler::pay_order))
        .route("/api/commissions", get(commission::handler::list_commissions))
        .route(
            "/api/commissions/summary",
            get(commission::handler::commission_summary),
        )
        .route(
            "/api/commissions/:id/confirm",
            post(commission::handler::confirm_commission),
        )
        .route(
            "/api/withdrawals",
            get(withdrawal::handler::list_withdrawals).post(withdrawal::handler::request_withdrawal),
        )
        .route(
            "/api/withdrawals/pending",
            get(withdrawal::handler::list_requested),
        )
        .route("/api/withdrawals/:id/approve", post(withdrawal::handler::approve))
        .route("/api/withdrawals/:id/reject", post(withdrawal::handler::reject))
        .route("/api/withdrawals/:id/paid", post(withdrawal::handler::mark_paid))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(middleware::from_fn(request_logging_middleware))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            state.config.server.timeout_seconds,
        )))
        .with_state(state)
}

/// 健康检查
async fn health_check(State(state): State<AppState>) -> Result<Json<serde_json::Value>> {
    sqlx::query("SELECT 1").execute(&state.db).await?;

    Ok(Json(serde_json::json!({
        "status": "healthy",
        "database": "connected",
        "timestamp": chrono::Utc::now()
    })))
}
