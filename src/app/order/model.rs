//! 订单数据模型

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 订单状态：PENDING 创建后等待支付，结算后进入终态
pub const STATUS_PENDING: &str = "PENDING";
pub const STATUS_COMPLETED: &str = "COMPLETED";
pub const STATUS_FAILED: &str = "FAILED";

/// 订单表记录
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub total_amount: Decimal,
    pub status: String,
    pub payment_method: Option<String>,
    pub transaction_id: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// 订单行项目（下单时的标题与价格快照）
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub video_id: Uuid,
    pub title: String,
    pub price: Decimal,
}

/// 购买记录：用户对视频的永久访问授权，仅由订单结算创建
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Purchase {
    pub id: Uuid,
    pub user_id: Uuid,
    pub video_id: Uuid,
    pub order_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// 订单视图：订单与行项目
#[derive(Debug, Serialize)]
pub struct OrderView {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// 创建订单请求；video_ids 为空时结算整个购物车
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub video_ids: Vec<Uuid>,
}

/// 发起支付请求
#[derive(Debug, Deserialize)]
pub struct PayOrderRequest {
    pub payment_method: String,
}

/// 结算结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementOutcome {
    Completed,
    Failed,
}

impl SettlementOutcome {
    /// 解析回调通知中的终态
    pub fn parse(status: &str) -> Option<Self> {
        match status {
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}
