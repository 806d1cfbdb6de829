//! 提现业务服务
//!
//! 可提现余额 = 已确认佣金合计 - 未被驳回的提现合计。
//! 申请提现时先锁定用户行再在同一事务内重算余额，
//! 并发申请不会重复占用同一笔已确认佣金。

use rust_decimal::{Decimal, RoundingStrategy};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::model::{
    CreateWithdrawalRequest, Withdrawal, STATUS_APPROVED, STATUS_PAID, STATUS_REJECTED,
    STATUS_REQUESTED,
};
use crate::config::CommissionConfig;
use crate::core::error::{AppError, Result};

/// 申请提现
pub async fn request_withdrawal(
    pool: &PgPool,
    config: &CommissionConfig,
    user_id: Uuid,
    req: &CreateWithdrawalRequest,
) -> Result<Withdrawal> {
    if req.amount < config.min_withdrawal {
        return Err(AppError::BadRequest(format!(
            "提现金额不能低于 {}",
            config.min_withdrawal
        )));
    }

    let mut tx = pool.begin().await?;

    // 锁定用户行，串行化同一用户的提现申请
    sqlx::query("SELECT id FROM users WHERE id = $1 FOR UPDATE")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    let (confirmed,): (Decimal,) = sqlx::query_as(
        "SELECT COALESCE(SUM(amount), 0) FROM commissions WHERE user_id = $1 AND status = 'CONFIRMED'",
    )
    .bind(user_id)
    .fetch_one(&mut *tx)
    .await?;

    let (occupied,): (Decimal,) = sqlx::query_as(
        "SELECT COALESCE(SUM(amount), 0) FROM withdrawals WHERE user_id = $1 AND status != 'REJECTED'",
    )
    .bind(user_id)
    .fetch_one(&mut *tx)
    .await?;

    let available = confirmed - occupied;
    if req.amount > available {
        return Err(AppError::Conflict(format!(
            "可提现余额不足，当前可提现 {}",
            available
        )));
    }

    let fee = (req.amount * config.withdrawal_fee_rate)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);

    let withdrawal = sqlx::query_as::<_, Withdrawal>(
        r#"
        INSERT INTO withdrawals (user_id, amount, fee, account)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(req.amount)
    .bind(fee)
    .bind(req.account.trim())
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    info!(
        "Withdrawal requested: {} (user {}, amount {}, fee {})",
        withdrawal.id, user_id, withdrawal.amount, withdrawal.fee
    );

    Ok(withdrawal)
}

/// 查询用户提现记录
pub async fn list_withdrawals(pool: &PgPool, user_id: Uuid) -> Result<Vec<Withdrawal>> {
    let withdrawals = sqlx::query_as::<_, Withdrawal>(
        "SELECT * FROM withdrawals WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(withdrawals)
}

/// 查询待审核提现（管理端）
pub async fn list_requested(pool: &PgPool) -> Result<Vec<Withdrawal>> {
    let withdrawals = sqlx::query_as::<_, Withdrawal>(
        "SELECT * FROM withdrawals WHERE status = 'REQUESTED' ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    Ok(withdrawals)
}

/// 状态迁移公用实现：带条件更新，未命中时区分不存在与状态冲突
async fn transition(
    pool: &PgPool,
    id: Uuid,
    from: &str,
    to: &str,
    set_processed: bool,
) -> Result<Withdrawal> {
    let sql = if set_processed {
        "UPDATE withdrawals SET status = $3, processed_at = NOW() WHERE id = $1 AND status = $2 RETURNING *"
    } else {
        "UPDATE withdrawals SET status = $3 WHERE id = $1 AND status = $2 RETURNING *"
    };

    let withdrawal = sqlx::query_as::<_, Withdrawal>(sql)
        .bind(id)
        .bind(from)
        .bind(to)
        .fetch_optional(pool)
        .await?;

    match withdrawal {
        Some(withdrawal) => {
            info!("Withdrawal {} -> {}", withdrawal.id, to);
            Ok(withdrawal)
        }
        None => {
            let status: Option<(String,)> =
                sqlx::query_as("SELECT status FROM withdrawals WHERE id = $1")
                    .bind(id)
                    .fetch_optional(pool)
                    .await?;
            match status {
                None => Err(AppError::NotFound(format!("提现申请 {} 不存在", id))),
                Some((current,)) => Err(AppError::Conflict(format!(
                    "提现申请 {} 当前状态 {}，不能迁移到 {}",
                    id, current, to
                ))),
            }
        }
    }
}

/// 审核通过（REQUESTED -> APPROVED）
pub async fn approve(pool: &PgPool, id: Uuid) -> Result<Withdrawal> {
    transition(pool, id, STATUS_REQUESTED, STATUS_APPROVED, false).await
}

/// 驳回（REQUESTED -> REJECTED），占用的余额随之释放
pub async fn reject(pool: &PgPool, id: Uuid) -> Result<Withdrawal> {
    transition(pool, id, STATUS_REQUESTED, STATUS_REJECTED, true).await
}

/// 外部转账完成（APPROVED -> PAID）
pub async fn mark_paid(pool: &PgPool, id: Uuid) -> Result<Withdrawal> {
    transition(pool, id, STATUS_APPROVED, STATUS_PAID, true).await
}
