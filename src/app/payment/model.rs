//! 支付数据模型

use serde::Deserialize;

/// 支付渠道回调通知（渠道适配层已归一化的终态信号）
///
/// 字段名与外部回调约定保持 camelCase。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentNotification {
    pub order_id: uuid::Uuid,
    /// completed / failed
    pub status: String,
    pub payment_method: String,
    pub transaction_id: String,
}
