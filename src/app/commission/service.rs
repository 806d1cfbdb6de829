//! 分佣业务服务
//!
//! 佣金计算是纯函数；链路查询是有界的两跳父指针遍历。

use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use tracing::info;
use uuid::Uuid;

use super::model::{
    Commission, CommissionShare, CommissionSummary, STATUS_CONFIRMED, STATUS_PENDING,
};
use crate::core::error::{AppError, Result};

/// 推荐链路：一级推荐人与二级推荐人
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReferrerChain {
    pub level1: Option<Uuid>,
    pub level2: Option<Uuid>,
}

/// 计算订单分佣
///
/// 按订单总额计算，一级与二级比例固定；超过两级的链路不参与分成。
/// 金额不在此处做舍入，由调用方在落库前处理。
pub fn calculate_commissions(
    total: Decimal,
    purchaser_id: Uuid,
    chain: ReferrerChain,
    level1_rate: Decimal,
    level2_rate: Decimal,
) -> Vec<CommissionShare> {
    let mut shares = Vec::with_capacity(2);

    let Some(level1) = chain.level1 else {
        return shares;
    };
    // 推荐关系理论上无环，这里仍然拒绝把佣金付回下单人自己
    if level1 == purchaser_id {
        return shares;
    }

    shares.push(CommissionShare {
        user_id: level1,
        amount: total * level1_rate,
        level: 1,
    });

    if let Some(level2) = chain.level2 {
        if level2 != purchaser_id && level2 != level1 {
            shares.push(CommissionShare {
                user_id: level2,
                amount: total * level2_rate,
                level: 2,
            });
        }
    }

    shares
}

/// 查询下单用户的推荐链路，最多向上两跳
pub async fn lookup_referrer_chain(
    conn: &mut PgConnection,
    purchaser_id: Uuid,
) -> Result<ReferrerChain> {
    let level1: Option<(Option<Uuid>,)> =
        sqlx::query_as("SELECT referrer_id FROM users WHERE id = $1")
            .bind(purchaser_id)
            .fetch_optional(&mut *conn)
            .await?;

    let Some((Some(level1),)) = level1 else {
        return Ok(ReferrerChain::default());
    };

    let level2: Option<(Option<Uuid>,)> =
        sqlx::query_as("SELECT referrer_id FROM users WHERE id = $1")
            .bind(level1)
            .fetch_optional(&mut *conn)
            .await?;

    Ok(ReferrerChain {
        level1: Some(level1),
        level2: level2.and_then(|(id,)| id),
    })
}

/// 查询用户佣金，可按状态过滤
pub async fn list_commissions(
    pool: &PgPool,
    user_id: Uuid,
    status: Option<&str>,
) -> Result<Vec<Commission>> {
    let commissions = if let Some(status) = status {
        if status != STATUS_PENDING && status != STATUS_CONFIRMED {
            return Err(AppError::BadRequest(format!("无效的佣金状态: {}", status)));
        }
        sqlx::query_as::<_, Commission>(
            "SELECT * FROM commissions WHERE user_id = $1 AND status = $2 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .bind(status)
        .fetch_all(pool)
        .await?
    } else {
        sqlx::query_as::<_, Commission>(
            "SELECT * FROM commissions WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?
    };

    Ok(commissions)
}

/// 佣金汇总：待确认、已确认、已占用与可提现余额
pub async fn summary(pool: &PgPool, user_id: Uuid) -> Result<CommissionSummary> {
    let (pending,): (Decimal,) = sqlx::query_as(
        "SELECT COALESCE(SUM(amount), 0) FROM commissions WHERE user_id = $1 AND status = 'PENDING'",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    let (confirmed,): (Decimal,) = sqlx::query_as(
        "SELECT COALESCE(SUM(amount), 0) FROM commissions WHERE user_id = $1 AND status = 'CONFIRMED'",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    let (withdrawn,): (Decimal,) = sqlx::query_as(
        "SELECT COALESCE(SUM(amount), 0) FROM withdrawals WHERE user_id = $1 AND status != 'REJECTED'",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(CommissionSummary {
        pending,
        confirmed,
        withdrawn,
        available: confirmed - withdrawn,
    })
}

/// 确认佣金（PENDING -> CONFIRMED），重复确认报冲突
pub async fn confirm_commission(pool: &PgPool, id: Uuid) -> Result<Commission> {
    let commission = sqlx::query_as::<_, Commission>(
        r#"
        UPDATE commissions SET status = 'CONFIRMED', confirmed_at = NOW()
        WHERE id = $1 AND status = 'PENDING'
        RETURNING *
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    match commission {
        Some(commission) => {
            info!("Confirmed commission: {} ({})", commission.id, commission.amount);
            Ok(commission)
        }
        None => {
            let exists = sqlx::query("SELECT id FROM commissions WHERE id = $1")
                .bind(id)
                .fetch_optional(pool)
                .await?;
            if exists.is_some() {
                Err(AppError::Conflict("佣金已确认，不能重复确认".to_string()))
            } else {
                Err(AppError::NotFound(format!("佣金 {} 不存在", id)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn rates() -> (Decimal, Decimal) {
        (Decimal::new(15, 2), Decimal::new(5, 2))
    }

    #[test]
    fn test_two_level_chain() {
        let purchaser = Uuid::new_v4();
        let u1 = Uuid::new_v4();
        let u2 = Uuid::new_v4();
        let (l1, l2) = rates();

        let shares = calculate_commissions(
            Decimal::from_str("100.00").unwrap(),
            purchaser,
            ReferrerChain {
                level1: Some(u1),
                level2: Some(u2),
            },
            l1,
            l2,
        );

        assert_eq!(shares.len(), 2);
        assert_eq!(shares[0].user_id, u1);
        assert_eq!(shares[0].amount, Decimal::from_str("15.0000").unwrap());
        assert_eq!(shares[0].level, 1);
        assert_eq!(shares[1].user_id, u2);
        assert_eq!(shares[1].amount, Decimal::from_str("5.0000").unwrap());
        assert_eq!(shares[1].level, 2);
    }

    #[test]
    fn test_single_level_chain() {
        let purchaser = Uuid::new_v4();
        let u1 = Uuid::new_v4();
        let (l1, l2) = rates();

        let shares = calculate_commissions(
            Decimal::from_str("200.00").unwrap(),
            purchaser,
            ReferrerChain {
                level1: Some(u1),
                level2: None,
            },
            l1,
            l2,
        );

        assert_eq!(shares.len(), 1);
        assert_eq!(shares[0].user_id, u1);
        assert_eq!(shares[0].amount, Decimal::from_str("30.0000").unwrap());
        assert_eq!(shares[0].level, 1);
    }

    #[test]
    fn test_no_referrer() {
        let purchaser = Uuid::new_v4();
        let (l1, l2) = rates();

        let shares = calculate_commissions(
            Decimal::from_str("200.00").unwrap(),
            purchaser,
            ReferrerChain::default(),
            l1,
            l2,
        );

        assert!(shares.is_empty());
    }

    #[test]
    fn test_cycle_back_to_purchaser_not_paid() {
        let purchaser = Uuid::new_v4();
        let u1 = Uuid::new_v4();
        let (l1, l2) = rates();

        // 数据异常：二级推荐人指回下单人自己，不应产生二级分成
        let shares = calculate_commissions(
            Decimal::from_str("100.00").unwrap(),
            purchaser,
            ReferrerChain {
                level1: Some(u1),
                level2: Some(purchaser),
            },
            l1,
            l2,
        );

        assert_eq!(shares.len(), 1);
        assert_eq!(shares[0].level, 1);
    }

    #[test]
    fn test_self_referral_not_paid() {
        let purchaser = Uuid::new_v4();
        let (l1, l2) = rates();

        let shares = calculate_commissions(
            Decimal::from_str("100.00").unwrap(),
            purchaser,
            ReferrerChain {
                level1: Some(purchaser),
                level2: None,
            },
            l1,
            l2,
        );

        assert!(shares.is_empty());
    }

    #[test]
    fn test_amounts_are_exact_decimals() {
        // 0.1 + 0.2 类浮点误差不应出现在佣金金额里
        let purchaser = Uuid::new_v4();
        let u1 = Uuid::new_v4();
        let (l1, l2) = rates();

        let shares = calculate_commissions(
            Decimal::from_str("0.30").unwrap(),
            purchaser,
            ReferrerChain {
                level1: Some(u1),
                level2: None,
            },
            l1,
            l2,
        );

        assert_eq!(shares[0].amount, Decimal::from_str("0.0450").unwrap());
    }
}
