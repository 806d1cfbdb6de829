//! 购物车数据模型
//!
//! 购物车按用户落库，不依赖任何进程内全局状态。

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 购物车表记录
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CartItem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub video_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// 购物车条目（含视频快照字段）
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct CartEntry {
    pub video_id: Uuid,
    pub title: String,
    pub cover_url: String,
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
}

/// 购物车视图
#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Vec<CartEntry>,
    pub total: Decimal,
}

/// 加入购物车请求
#[derive(Debug, Deserialize)]
pub struct AddCartRequest {
    pub video_id: Uuid,
}
