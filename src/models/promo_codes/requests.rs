use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::entities::DiscountType;
use crate::models::{EntityStatus, double_option};

// 创建优惠码请求
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatePromoCodeRequest {
    pub code: String,
    pub description: Option<String>,
    #[serde(default)]
    pub discount_type: DiscountType,
    pub discount_value: f64,
    pub usage_limit: Option<i64>,
    pub start_date: Option<DateTime<Utc>>,
    pub expiry_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: EntityStatus,
}

// 更新优惠码请求
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePromoCodeRequest {
    pub code: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub discount_type: Option<DiscountType>,
    pub discount_value: Option<f64>,
    #[serde(default, deserialize_with = "double_option")]
    pub usage_limit: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub start_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "double_option")]
    pub expiry_date: Option<Option<DateTime<Utc>>>,
    pub status: Option<EntityStatus>,
}

// 使用优惠码请求
#[derive(Debug, Clone, Deserialize)]
pub struct RedeemPromoCodeRequest {
    pub code: String,
    pub class_id: Option<i64>,
}
