//! 课程视频业务服务

use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::model::{CreateVideoRequest, UpdateVideoRequest, Video};
use crate::core::error::{AppError, Result};

/// 分页查询已上架视频，支持标题搜索
pub async fn list_on_shelf(
    pool: &PgPool,
    page: u32,
    limit: u32,
    search: Option<&str>,
) -> Result<(Vec<Video>, i64)> {
    let offset = (page - 1) * limit;

    let (videos, total) = if let Some(search) = search {
        let search_pattern = format!("%{}%", search);

        let videos = sqlx::query_as::<_, Video>(
            "SELECT * FROM videos WHERE on_shelf AND title ILIKE $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(&search_pattern)
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(pool)
        .await?;

        let total: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM videos WHERE on_shelf AND title ILIKE $1")
                .bind(&search_pattern)
                .fetch_one(pool)
                .await?;

        (videos, total.0)
    } else {
        let videos = sqlx::query_as::<_, Video>(
            "SELECT * FROM videos WHERE on_shelf ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(pool)
        .await?;

        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM videos WHERE on_shelf")
            .fetch_one(pool)
            .await?;

        (videos, total.0)
    };

    Ok((videos, total))
}

/// 查询视频详情；未上架视频仅管理员可见
pub async fn get_video(pool: &PgPool, id: Uuid, include_off_shelf: bool) -> Result<Video> {
    let video = sqlx::query_as::<_, Video>("SELECT * FROM videos WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("视频 {} 不存在", id)))?;

    if !video.on_shelf && !include_off_shelf {
        return Err(AppError::NotFound(format!("视频 {} 不存在", id)));
    }

    Ok(video)
}

/// 创建视频
pub async fn create_video(pool: &PgPool, req: &CreateVideoRequest) -> Result<Video> {
    if req.price < Decimal::ZERO {
        return Err(AppError::BadRequest("价格不能为负数".to_string()));
    }

    let video = sqlx::query_as::<_, Video>(
        r#"
        INSERT INTO videos (title, description, cover_url, price, duration_seconds)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(req.title.trim())
    .bind(&req.description)
    .bind(&req.cover_url)
    .bind(req.price)
    .bind(req.duration_seconds)
    .fetch_one(pool)
    .await?;

    info!("Created video: {} ({})", video.title, video.id);
    Ok(video)
}

/// 更新视频，仅覆盖请求中出现的字段
pub async fn update_video(pool: &PgPool, id: Uuid, req: &UpdateVideoRequest) -> Result<Video> {
    if let Some(price) = req.price {
        if price < Decimal::ZERO {
            return Err(AppError::BadRequest("价格不能为负数".to_string()));
        }
    }

    let video = sqlx::query_as::<_, Video>(
        r#"
        UPDATE videos SET
            title = COALESCE($2, title),
            description = COALESCE($3, description),
            cover_url = COALESCE($4, cover_url),
            price = COALESCE($5, price),
            duration_seconds = COALESCE($6, duration_seconds),
            on_shelf = COALESCE($7, on_shelf),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(req.title.as_deref().map(str::trim))
    .bind(req.description.as_deref())
    .bind(req.cover_url.as_deref())
    .bind(req.price)
    .bind(req.duration_seconds)
    .bind(req.on_shelf)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("视频 {} 不存在", id)))?;

    info!("Updated video: {} ({})", video.title, video.id);
    Ok(video)
}

/// 下架视频（订单与购买记录保留，不做物理删除）
pub async fn take_down_video(pool: &PgPool, id: Uuid) -> Result<()> {
    let result = sqlx::query("UPDATE videos SET on_shelf = FALSE, updated_at = NOW() WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("视频 {} 不存在", id)));
    }

    info!("Took down video: {}", id);
    Ok(())
}
