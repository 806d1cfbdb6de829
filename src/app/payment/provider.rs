//! 支付渠道策略
//!
//! 每个渠道一个实现，对外统一返回支付意向；
//! 回调处理与具体渠道无关，只消费归一化的终态信号。

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::app::order::model::Order;
use crate::config::ProviderConfig;
use crate::core::error::{AppError, Result};

/// 支付意向有效期
const INTENT_TTL_MINUTES: i64 = 30;

/// 统一的支付意向结果
#[derive(Debug, Serialize)]
pub struct PaymentIntent {
    pub order_id: Uuid,
    pub provider: String,
    pub amount: Decimal,
    /// 跳转或扫码地址，由具体渠道生成
    pub pay_url: String,
    pub expires_at: DateTime<Utc>,
}

/// 支付渠道策略接口
pub trait PaymentProvider: Send + Sync {
    /// 渠道标识，同时作为订单上的支付方式
    fn method(&self) -> &'static str;

    /// 回调签名密钥
    fn webhook_secret(&self) -> &str;

    /// 生成支付意向
    fn create_intent(&self, order: &Order) -> Result<PaymentIntent>;
}

fn intent_expiry() -> DateTime<Utc> {
    Utc::now() + Duration::minutes(INTENT_TTL_MINUTES)
}

/// Stripe 渠道
pub struct StripeProvider {
    config: ProviderConfig,
}

impl StripeProvider {
    pub fn new(config: ProviderConfig) -> Self {
        Self { config }
    }
}

impl PaymentProvider for StripeProvider {
    fn method(&self) -> &'static str {
        "stripe"
    }

    fn webhook_secret(&self) -> &str {
        &self.config.webhook_secret
    }

    fn create_intent(&self, order: &Order) -> Result<PaymentIntent> {
        if self.config.secret_key.is_empty() {
            return Err(AppError::Internal("Stripe 渠道未配置密钥".to_string()));
        }

        Ok(PaymentIntent {
            order_id: order.id,
            provider: self.method().to_string(),
            amount: order.total_amount,
            pay_url: format!(
                "https://checkout.stripe.com/pay/{}?client={}",
                order.id, self.config.app_id
            ),
            expires_at: intent_expiry(),
        })
    }
}

/// 微信支付渠道
pub struct WechatProvider {
    config: ProviderConfig,
}

impl WechatProvider {
    pub fn new(config: ProviderConfig) -> Self {
        Self { config }
    }
}

impl PaymentProvider for WechatProvider {
    fn method(&self) -> &'static str {
        "wechat"
    }

    fn webhook_secret(&self) -> &str {
        &self.config.webhook_secret
    }

    fn create_intent(&self, order: &Order) -> Result<PaymentIntent> {
        if self.config.app_id.is_empty() {
            return Err(AppError::Internal("微信支付渠道未配置应用标识".to_string()));
        }

        // Native 支付：返回二维码链接，前端生成二维码供扫码
        Ok(PaymentIntent {
            order_id: order.id,
            provider: self.method().to_string(),
            amount: order.total_amount,
            pay_url: format!(
                "weixin://wxpay/bizpayurl?appid={}&out_trade_no={}",
                self.config.app_id, order.id
            ),
            expires_at: intent_expiry(),
        })
    }
}

/// 支付宝渠道
pub struct AlipayProvider {
    config: ProviderConfig,
}

impl AlipayProvider {
    pub fn new(config: ProviderConfig) -> Self {
        Self { config }
    }
}

impl PaymentProvider for AlipayProvider {
    fn method(&self) -> &'static str {
        "alipay"
    }

    fn webhook_secret(&self) -> &str {
        &self.config.webhook_secret
    }

    fn create_intent(&self, order: &Order) -> Result<PaymentIntent> {
        if self.config.app_id.is_empty() {
            return Err(AppError::Internal("支付宝渠道未配置应用标识".to_string()));
        }

        Ok(PaymentIntent {
            order_id: order.id,
            provider: self.method().to_string(),
            amount: order.total_amount,
            pay_url: format!(
                "https://openapi.alipay.com/gateway.do?app_id={}&out_trade_no={}",
                self.config.app_id, order.id
            ),
            expires_at: intent_expiry(),
        })
    }
}
