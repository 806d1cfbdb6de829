//! 分佣数据模型

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 分佣状态
pub const STATUS_PENDING: &str = "PENDING";
pub const STATUS_CONFIRMED: &str = "CONFIRMED";

/// 分佣表记录
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Commission {
    pub id: Uuid,
    /// 受益用户
    pub user_id: Uuid,
    /// 产生佣金的下单用户
    pub from_user_id: Uuid,
    pub order_id: Uuid,
    pub amount: Decimal,
    /// 分佣层级（1 为直接推荐人，2 为推荐人的推荐人）
    pub level: i16,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
}

/// 分佣计算结果中的一条分成
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommissionShare {
    pub user_id: Uuid,
    pub amount: Decimal,
    pub level: i16,
}

/// 佣金汇总
#[derive(Debug, Serialize)]
pub struct CommissionSummary {
    /// 待确认佣金合计
    pub pending: Decimal,
    /// 已确认佣金合计
    pub confirmed: Decimal,
    /// 已占用额度（提现中或已提现）
    pub withdrawn: Decimal,
    /// 可提现余额
    pub available: Decimal,
}

/// 列表查询参数
#[derive(Debug, Deserialize)]
pub struct ListCommissionsQuery {
    pub status: Option<String>,
}
