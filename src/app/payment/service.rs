//! 支付业务服务：渠道选择与回调签名校验

use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::provider::{
    AlipayProvider, PaymentIntent, PaymentProvider, StripeProvider, WechatProvider,
};
use crate::app::order::model::Order;
use crate::config::PaymentConfig;
use crate::core::error::{AppError, Result};

type HmacSha256 = Hmac<Sha256>;

/// 回调时间戳容忍窗口（秒），超窗的重放直接拒绝
const SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// 按支付方式选择已启用的渠道
pub fn resolve_provider(
    config: &PaymentConfig,
    method: &str,
) -> Result<Box<dyn PaymentProvider>> {
    let (enabled, provider): (bool, Box<dyn PaymentProvider>) = match method {
        "stripe" => (
            config.stripe.enabled,
            Box::new(StripeProvider::new(config.stripe.clone())),
        ),
        "wechat" => (
            config.wechat.enabled,
            Box::new(WechatProvider::new(config.wechat.clone())),
        ),
        "alipay" => (
            config.alipay.enabled,
            Box::new(AlipayProvider::new(config.alipay.clone())),
        ),
        _ => return Err(AppError::BadRequest(format!("不支持的支付方式: {}", method))),
    };

    if !enabled {
        return Err(AppError::BadRequest(format!("支付方式 {} 未启用", method)));
    }

    Ok(provider)
}

/// 生成支付意向
pub fn create_intent(
    config: &PaymentConfig,
    method: &str,
    order: &Order,
) -> Result<PaymentIntent> {
    resolve_provider(config, method)?.create_intent(order)
}

/// 校验回调签名
///
/// 签名头格式 `t=<unix>,v1=<hex>`，签名串为 `{t}.{原始请求体}` 的
/// HMAC-SHA256。时间戳超出容忍窗口按重放处理。
pub fn verify_signature(payload: &[u8], signature_header: &str, secret: &str) -> Result<bool> {
    let mut timestamp: Option<&str> = None;
    let mut signature: Option<&str> = None;

    for part in signature_header.split(',') {
        match part.split_once('=') {
            Some(("t", value)) => timestamp = Some(value),
            Some(("v1", value)) => signature = Some(value),
            _ => {}
        }
    }

    let timestamp = timestamp
        .ok_or_else(|| AppError::BadRequest("签名头缺少时间戳".to_string()))?;
    let signature = signature
        .ok_or_else(|| AppError::BadRequest("签名头缺少签名".to_string()))?;

    let timestamp: i64 = timestamp
        .parse()
        .map_err(|_| AppError::BadRequest("签名头时间戳无效".to_string()))?;

    let now = chrono::Utc::now().timestamp();
    if (now - timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
        return Ok(false);
    }

    let signed_payload = format!("{}.{}", timestamp, String::from_utf8_lossy(payload));
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::Internal(format!("签名密钥无效: {}", e)))?;
    mac.update(signed_payload.as_bytes());
    let expected = hex::encode(mac.finalize().into_bytes());

    Ok(expected == signature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderConfig;

    fn current_timestamp() -> String {
        chrono::Utc::now().timestamp().to_string()
    }

    fn compute_signature(payload: &[u8], secret: &str, timestamp: &str) -> String {
        let signed_payload = format!("{}.{}", timestamp, String::from_utf8_lossy(payload));
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(signed_payload.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn test_valid_signature() {
        let payload = b"{\"orderId\":\"x\",\"status\":\"completed\"}";
        let timestamp = current_timestamp();
        let signature = compute_signature(payload, "whsec_test", &timestamp);
        let header = format!("t={},v1={}", timestamp, signature);

        assert!(verify_signature(payload, &header, "whsec_test").unwrap());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let payload = b"{\"status\":\"completed\"}";
        let timestamp = current_timestamp();
        let signature = compute_signature(payload, "wrong_secret", &timestamp);
        let header = format!("t={},v1={}", timestamp, signature);

        assert!(!verify_signature(payload, &header, "whsec_test").unwrap());
    }

    #[test]
    fn test_modified_payload_rejected() {
        let payload = b"{\"status\":\"completed\"}";
        let timestamp = current_timestamp();
        let signature = compute_signature(payload, "whsec_test", &timestamp);
        let header = format!("t={},v1={}", timestamp, signature);

        let modified = b"{\"status\":\"completed\",\"hacked\":true}";
        assert!(!verify_signature(modified, &header, "whsec_test").unwrap());
    }

    #[test]
    fn test_old_timestamp_rejected() {
        let payload = b"{\"status\":\"completed\"}";
        // 10 分钟前，超出 5 分钟容忍窗口
        let timestamp = (chrono::Utc::now().timestamp() - 600).to_string();
        let signature = compute_signature(payload, "whsec_test", &timestamp);
        let header = format!("t={},v1={}", timestamp, signature);

        assert!(!verify_signature(payload, &header, "whsec_test").unwrap());
    }

    #[test]
    fn test_malformed_header_errors() {
        let payload = b"{}";
        assert!(verify_signature(payload, "garbage", "whsec_test").is_err());
        assert!(verify_signature(payload, "t=123", "whsec_test").is_err());
        assert!(verify_signature(payload, "v1=abc", "whsec_test").is_err());
        assert!(verify_signature(payload, "", "whsec_test").is_err());
    }

    fn test_payment_config() -> PaymentConfig {
        PaymentConfig {
            stripe: ProviderConfig {
                enabled: true,
                app_id: "acct_test".to_string(),
                secret_key: "sk_test".to_string(),
                webhook_secret: "whsec_stripe".to_string(),
            },
            wechat: ProviderConfig {
                enabled: false,
                ..ProviderConfig::default()
            },
            alipay: ProviderConfig {
                enabled: true,
                app_id: "2021000000000000".to_string(),
                secret_key: "alipay_secret".to_string(),
                webhook_secret: "whsec_alipay".to_string(),
            },
        }
    }

    #[test]
    fn test_resolve_enabled_provider() {
        let config = test_payment_config();

        let provider = resolve_provider(&config, "stripe").unwrap();
        assert_eq!(provider.method(), "stripe");
        assert_eq!(provider.webhook_secret(), "whsec_stripe");

        let provider = resolve_provider(&config, "alipay").unwrap();
        assert_eq!(provider.method(), "alipay");
    }

    #[test]
    fn test_resolve_disabled_provider_rejected() {
        let config = test_payment_config();
        assert!(resolve_provider(&config, "wechat").is_err());
    }

    #[test]
    fn test_resolve_unknown_provider_rejected() {
        let config = test_payment_config();
        assert!(resolve_provider(&config, "paypal").is_err());
    }
}
