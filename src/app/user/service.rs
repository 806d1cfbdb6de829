//! 用户业务服务

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::model::{LoginRequest, LoginResponse, ReferralEntry, RegisterRequest, User};
use crate::config::AuthConfig;
use crate::core::auth;
use crate::core::error::{AppError, Result};

/// 注册用户，可选绑定推荐人
pub async fn register(pool: &PgPool, req: &RegisterRequest) -> Result<User> {
    let email = req.email.trim().to_lowercase();

    let existing = sqlx::query("SELECT id FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(pool)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict("邮箱地址已存在".to_string()));
    }

    // 推荐人必须真实存在，注册后不可变更
    if let Some(referrer_id) = req.referrer_id {
        let referrer = sqlx::query("SELECT id FROM users WHERE id = $1")
            .bind(referrer_id)
            .fetch_optional(pool)
            .await?;
        if referrer.is_none() {
            return Err(AppError::BadRequest("推荐人不存在".to_string()));
        }
    }

    let salt = auth::generate_salt();
    let password_hash = auth::hash_password(&req.password, &salt);

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (username, email, password_hash, password_salt, referrer_id)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(req.username.trim())
    .bind(&email)
    .bind(&password_hash)
    .bind(&salt)
    .bind(req.referrer_id)
    .fetch_one(pool)
    .await?;

    info!("Registered user: {} ({})", user.username, user.id);
    Ok(user)
}

/// 登录并签发会话令牌
pub async fn login(pool: &PgPool, auth_config: &AuthConfig, req: &LoginRequest) -> Result<LoginResponse> {
    let email = req.email.trim().to_lowercase();

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !auth::verify_password(&req.password, &user.password_salt, &user.password_hash) {
        return Err(AppError::Unauthorized);
    }

    let token = auth::issue_token(
        &auth_config.token_secret,
        user.id,
        &user.email,
        &user.role,
        auth_config.token_ttl_seconds,
    )?;

    Ok(LoginResponse { token, user })
}

/// 查询用户资料
pub async fn get_profile(pool: &PgPool, user_id: Uuid) -> Result<User> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("用户 {} 不存在", user_id)))
}

/// 查询直接推荐的用户
pub async fn list_referrals(pool: &PgPool, user_id: Uuid) -> Result<Vec<ReferralEntry>> {
    let referrals = sqlx::query_as::<_, ReferralEntry>(
        "SELECT id, username, created_at FROM users WHERE referrer_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(referrals)
}
