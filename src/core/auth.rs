//! 会话令牌与口令摘要
//!
//! 会话令牌为 HS256 签名的 JWT，负载携带 {user_id, email, role}；
//! 口令以加盐 SHA-256 摘要存储。

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::core::error::{AppError, Result};

/// 会话令牌负载
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// 用户 ID
    pub sub: Uuid,
    /// 用户邮箱
    pub email: String,
    /// 用户角色 (user / admin)
    pub role: String,
    /// 签发时间戳
    pub iat: u64,
    /// 过期时间戳
    pub exp: u64,
}

/// 当前登录用户，由认证中间件写入请求扩展
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub role: String,
}

impl CurrentUser {
    /// 要求管理员角色
    pub fn ensure_admin(&self) -> Result<()> {
        if self.role == "admin" {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// 签发会话令牌
pub fn issue_token(
    secret: &str,
    user_id: Uuid,
    email: &str,
    role: &str,
    ttl_seconds: u64,
) -> Result<String> {
    let now = unix_now();
    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        role: role.to_string(),
        iat: now,
        exp: now + ttl_seconds,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("令牌签发失败: {}", e)))
}

/// 校验会话令牌，失败统一视为未认证
pub fn verify_token(secret: &str, token: &str) -> Result<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Unauthorized)
}

/// 生成口令盐值
pub fn generate_salt() -> String {
    Uuid::new_v4().simple().to_string()
}

/// 计算加盐口令摘要
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// 校验口令
pub fn verify_password(password: &str, salt: &str, expected_hash: &str) -> bool {
    hash_password(password, salt) == expected_hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_round_trip() {
        let user_id = Uuid::new_v4();
        let token = issue_token("test-secret", user_id, "a@b.com", "user", 3600).unwrap();

        // JWT 应由三段组成
        let parts: Vec<&str> = token.split('.').collect();
        assert_eq!(parts.len(), 3);

        let claims = verify_token("test-secret", &token).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "a@b.com");
        assert_eq!(claims.role, "user");
    }

    #[test]
    fn test_token_wrong_secret_rejected() {
        let token = issue_token("secret-a", Uuid::new_v4(), "a@b.com", "user", 3600).unwrap();
        assert!(verify_token("secret-b", &token).is_err());
    }

    #[test]
    fn test_token_tampered_rejected() {
        let token = issue_token("test-secret", Uuid::new_v4(), "a@b.com", "user", 3600).unwrap();
        let mut tampered = token.clone();
        tampered.push('x');
        assert!(verify_token("test-secret", &tampered).is_err());
    }

    #[test]
    fn test_password_hash_and_verify() {
        let salt = generate_salt();
        let hash = hash_password("p@ssw0rd", &salt);

        assert!(verify_password("p@ssw0rd", &salt, &hash));
        assert!(!verify_password("wrong", &salt, &hash));

        // 不同盐值产生不同摘要
        let other_salt = generate_salt();
        assert_ne!(hash, hash_password("p@ssw0rd", &other_salt));
    }
}
