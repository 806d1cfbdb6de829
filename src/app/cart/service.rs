//! 购物车业务服务

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use super::model::{CartEntry, CartView};
use crate::core::error::{AppError, Result};

/// 查询购物车内容与合计金额
pub async fn get_cart(pool: &PgPool, user_id: Uuid) -> Result<CartView> {
    let items = sqlx::query_as::<_, CartEntry>(
        r#"
        SELECT c.video_id, v.title, v.cover_url, v.price, c.created_at
        FROM cart_items c
        JOIN videos v ON v.id = c.video_id
        WHERE c.user_id = $1
        ORDER BY c.created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let total: Decimal = items.iter().map(|item| item.price).sum();

    Ok(CartView { items, total })
}

/// 加入购物车；重复加入不报错
pub async fn add_item(pool: &PgPool, user_id: Uuid, video_id: Uuid) -> Result<CartView> {
    let on_shelf: Option<(bool,)> = sqlx::query_as("SELECT on_shelf FROM videos WHERE id = $1")
        .bind(video_id)
        .fetch_optional(pool)
        .await?;
    match on_shelf {
        None => return Err(AppError::NotFound(format!("视频 {} 不存在", video_id))),
        Some((false,)) => return Err(AppError::BadRequest("视频已下架".to_string())),
        Some((true,)) => {}
    }

    let purchased = sqlx::query("SELECT id FROM purchases WHERE user_id = $1 AND video_id = $2")
        .bind(user_id)
        .bind(video_id)
        .fetch_optional(pool)
        .await?;
    if purchased.is_some() {
        return Err(AppError::Conflict("课程已购买，无需重复购买".to_string()));
    }

    sqlx::query(
        r#"
        INSERT INTO cart_items (user_id, video_id)
        VALUES ($1, $2)
        ON CONFLICT (user_id, video_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(video_id)
    .execute(pool)
    .await?;

    get_cart(pool, user_id).await
}

/// 从购物车移除单个视频
pub async fn remove_item(pool: &PgPool, user_id: Uuid, video_id: Uuid) -> Result<CartView> {
    let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND video_id = $2")
        .bind(user_id)
        .bind(video_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("购物车中没有该视频".to_string()));
    }

    get_cart(pool, user_id).await
}

/// 清空购物车
pub async fn clear_cart(pool: &PgPool, user_id: Uuid) -> Result<()> {
    sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(())
}
