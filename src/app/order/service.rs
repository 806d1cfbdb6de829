//! 订单业务服务
//!
//! 订单结算是全系统唯一创建购买记录与佣金记录的路径：
//! 状态翻转、购买记录、佣金记录在同一个数据库事务中完成，
//! 任何一步失败整体回滚，订单保持 PENDING 等待回调重投。

use rust_decimal::{Decimal, RoundingStrategy};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::model::{
    CreateOrderRequest, Order, OrderItem, OrderView, SettlementOutcome, STATUS_COMPLETED,
    STATUS_FAILED, STATUS_PENDING,
};
use crate::app::commission::service as commission_service;
use crate::config::CommissionConfig;
use crate::core::error::{AppError, Result};

/// 结算金额落库前统一舍入到分
fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
}

/// 创建订单
///
/// 请求未指定视频时结算整个购物车；下单的视频从购物车中移除。
pub async fn create_order(
    pool: &PgPool,
    user_id: Uuid,
    req: &CreateOrderRequest,
) -> Result<OrderView> {
    let video_ids = if req.video_ids.is_empty() {
        let rows: Vec<(Uuid,)> =
            sqlx::query_as("SELECT video_id FROM cart_items WHERE user_id = $1")
                .bind(user_id)
                .fetch_all(pool)
                .await?;
        rows.into_iter().map(|(id,)| id).collect()
    } else {
        let mut ids = req.video_ids.clone();
        ids.sort_unstable();
        ids.dedup();
        ids
    };

    if video_ids.is_empty() {
        return Err(AppError::BadRequest("订单不能为空".to_string()));
    }

    // 校验视频都在售，且没有重复购买
    let videos: Vec<(Uuid, String, Decimal, bool)> = sqlx::query_as(
        "SELECT id, title, price, on_shelf FROM videos WHERE id = ANY($1)",
    )
    .bind(&video_ids)
    .fetch_all(pool)
    .await?;

    if videos.len() != video_ids.len() {
        return Err(AppError::NotFound("部分视频不存在".to_string()));
    }
    if let Some((id, _, _, _)) = videos.iter().find(|(_, _, _, on_shelf)| !on_shelf) {
        return Err(AppError::BadRequest(format!("视频 {} 已下架", id)));
    }

    let purchased: Vec<(Uuid,)> = sqlx::query_as(
        "SELECT video_id FROM purchases WHERE user_id = $1 AND video_id = ANY($2)",
    )
    .bind(user_id)
    .bind(&video_ids)
    .fetch_all(pool)
    .await?;
    if let Some((id,)) = purchased.first() {
        return Err(AppError::Conflict(format!("课程 {} 已购买", id)));
    }

    let total: Decimal = videos.iter().map(|(_, _, price, _)| *price).sum();

    let mut tx = pool.begin().await?;

    let order = sqlx::query_as::<_, Order>(
        "INSERT INTO orders (user_id, total_amount) VALUES ($1, $2) RETURNING *",
    )
    .bind(user_id)
    .bind(total)
    .fetch_one(&mut *tx)
    .await?;

    let mut items = Vec::with_capacity(videos.len());
    for (video_id, title, price, _) in &videos {
        let item = sqlx::query_as::<_, OrderItem>(
            r#"
            INSERT INTO order_items (order_id, video_id, title, price)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(order.id)
        .bind(video_id)
        .bind(title)
        .bind(price)
        .fetch_one(&mut *tx)
        .await?;
        items.push(item);
    }

    sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND video_id = ANY($2)")
        .bind(user_id)
        .bind(&video_ids)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    info!(
        "Created order: {} ({} items, total {})",
        order.id,
        items.len(),
        order.total_amount
    );

    Ok(OrderView { order, items })
}

/// 查询用户订单列表
pub async fn list_orders(pool: &PgPool, user_id: Uuid) -> Result<Vec<Order>> {
    let orders = sqlx::query_as::<_, Order>(
        "SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(orders)
}

/// 查询订单详情
pub async fn get_order(pool: &PgPool, order_id: Uuid) -> Result<OrderView> {
    let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
        .bind(order_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("订单 {} 不存在", order_id)))?;

    let items = sqlx::query_as::<_, OrderItem>("SELECT * FROM order_items WHERE order_id = $1")
        .bind(order_id)
        .fetch_all(pool)
        .await?;

    Ok(OrderView { order, items })
}

/// 订单结算
///
/// 成功通知：在单个事务内翻转订单状态、生成购买记录、计算并写入佣金。
/// 失败通知：订单进入 FAILED 终态，不产生任何购买与佣金。
/// 状态翻转带 `WHERE status = 'PENDING'` 条件，回调重投时不会重复入账，
/// 第二次调用得到冲突错误。
pub async fn settle_order(
    pool: &PgPool,
    commission_config: &CommissionConfig,
    order_id: Uuid,
    outcome: SettlementOutcome,
    payment_method: &str,
    transaction_id: &str,
) -> Result<Order> {
    let mut tx = pool.begin().await?;

    let order = sqlx::query_as::<_, Order>(
        r#"
        UPDATE orders
        SET status = $2, payment_method = $3, transaction_id = $4,
            paid_at = CASE WHEN $2 = 'COMPLETED' THEN NOW() ELSE paid_at END
        WHERE id = $1 AND status = 'PENDING'
        RETURNING *
        "#,
    )
    .bind(order_id)
    .bind(match outcome {
        SettlementOutcome::Completed => STATUS_COMPLETED,
        SettlementOutcome::Failed => STATUS_FAILED,
    })
    .bind(payment_method)
    .bind(transaction_id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(order) = order else {
        // 状态翻转没有命中：订单不存在，或已经离开 PENDING
        drop(tx);
        return Err(classify_settlement_miss(pool, order_id).await?);
    };

    if outcome == SettlementOutcome::Failed {
        tx.commit().await?;
        info!("Order {} marked FAILED (tx {})", order.id, transaction_id);
        return Ok(order);
    }

    // 每个行项目生成一条购买记录
    let items = sqlx::query_as::<_, OrderItem>("SELECT * FROM order_items WHERE order_id = $1")
        .bind(order_id)
        .fetch_all(&mut *tx)
        .await?;

    for item in &items {
        sqlx::query("INSERT INTO purchases (user_id, video_id, order_id) VALUES ($1, $2, $3)")
            .bind(order.user_id)
            .bind(item.video_id)
            .bind(order.id)
            .execute(&mut *tx)
            .await?;
    }

    // 佣金按订单总额计算，最多两级
    let chain = commission_service::lookup_referrer_chain(&mut *tx, order.user_id).await?;
    let shares = commission_service::calculate_commissions(
        order.total_amount,
        order.user_id,
        chain,
        commission_config.level1_rate,
        commission_config.level2_rate,
    );

    for share in &shares {
        sqlx::query(
            r#"
            INSERT INTO commissions (user_id, from_user_id, order_id, amount, level)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(share.user_id)
        .bind(order.user_id)
        .bind(order.id)
        .bind(round_money(share.amount))
        .bind(share.level)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    info!(
        "Settled order: {} ({} purchases, {} commissions, tx {})",
        order.id,
        items.len(),
        shares.len(),
        transaction_id
    );

    Ok(order)
}

/// 区分结算未命中的原因：订单不存在还是状态已经终结
async fn classify_settlement_miss(pool: &PgPool, order_id: Uuid) -> Result<AppError> {
    let status: Option<(String,)> = sqlx::query_as("SELECT status FROM orders WHERE id = $1")
        .bind(order_id)
        .fetch_optional(pool)
        .await?;

    Ok(match status {
        None => AppError::NotFound(format!("订单 {} 不存在", order_id)),
        Some((status,)) if status == STATUS_PENDING => {
            // 并发结算恰好抢先提交，对重投方来说同样是冲突
            AppError::Conflict(format!("订单 {} 正在结算", order_id))
        }
        Some((status,)) => AppError::Conflict(format!("订单 {} 已结算，当前状态 {}", order_id, status)),
    })
}
