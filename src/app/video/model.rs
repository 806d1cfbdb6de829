//! 课程视频数据模型

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// 视频表记录
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Video {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub cover_url: String,
    pub price: Decimal,
    pub duration_seconds: i32,
    pub on_shelf: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 创建视频请求
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVideoRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub cover_url: String,

    /// 价格，单位元
    pub price: Decimal,

    #[validate(range(min = 0, message = "Duration must not be negative"))]
    #[serde(default)]
    pub duration_seconds: i32,
}

/// 更新视频请求
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateVideoRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub cover_url: Option<String>,
    pub price: Option<Decimal>,
    #[validate(range(min = 0, message = "Duration must not be negative"))]
    pub duration_seconds: Option<i32>,
    pub on_shelf: Option<bool>,
}

/// 列表查询参数
#[derive(Debug, Deserialize)]
pub struct ListVideosQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
}
