//! 提现数据模型

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// 提现状态机：REQUESTED -> APPROVED | REJECTED，APPROVED -> PAID
pub const STATUS_REQUESTED: &str = "REQUESTED";
pub const STATUS_APPROVED: &str = "APPROVED";
pub const STATUS_REJECTED: &str = "REJECTED";
pub const STATUS_PAID: &str = "PAID";

/// 提现表记录
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Withdrawal {
    pub id: Uuid,
    pub user_id: Uuid,
    /// 申请金额（含手续费）
    pub amount: Decimal,
    /// 手续费
    pub fee: Decimal,
    pub status: String,
    /// 收款账户
    pub account: String,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

/// 提现申请请求
#[derive(Debug, Deserialize, Validate)]
pub struct CreateWithdrawalRequest {
    pub amount: Decimal,

    #[validate(length(min = 1, max = 200, message = "Account must be between 1 and 200 characters"))]
    pub account: String,
}
