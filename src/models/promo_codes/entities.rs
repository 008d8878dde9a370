use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::EntityStatus;

// 折扣类型
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    Percent, // 百分比，取值 0-100
    #[default]
    Fixed, // 固定金额
}

impl DiscountType {
    pub const PERCENT: &'static str = "percent";
    pub const FIXED: &'static str = "fixed";
}

impl<'de> Deserialize<'de> for DiscountType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<DiscountType>().map_err(|_| {
            serde::de::Error::custom(format!(
                "无效的折扣类型: '{s}'. 支持的类型: percent, fixed"
            ))
        })
    }
}

impl std::fmt::Display for DiscountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiscountType::Percent => write!(f, "{}", DiscountType::PERCENT),
            DiscountType::Fixed => write!(f, "{}", DiscountType::FIXED),
        }
    }
}

impl std::str::FromStr for DiscountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            DiscountType::PERCENT => Ok(DiscountType::Percent),
            DiscountType::FIXED => Ok(DiscountType::Fixed),
            _ => Err(format!("Invalid discount type: {s}")),
        }
    }
}

/// 优惠码的班级适用范围
///
/// `Restricted(vec![])` 表示不适用于任何班级，与 `Unrestricted` 语义不同。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "class_ids", rename_all = "snake_case")]
pub enum ClassRestriction {
    Unrestricted,
    Restricted(Vec<i64>),
}

impl ClassRestriction {
    pub fn allows(&self, class_id: Option<i64>) -> bool {
        match self {
            ClassRestriction::Unrestricted => true,
            ClassRestriction::Restricted(ids) => class_id.is_some_and(|id| ids.contains(&id)),
        }
    }
}

// 优惠码实体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromoCode {
    pub id: i64,
    pub code: String, // 保留原始大小写，唯一性按小写比较
    pub description: Option<String>,
    pub discount_type: DiscountType,
    pub discount_value: f64,
    pub usage_limit: Option<i64>, // None 表示不限次数
    pub usage_count: i64,
    pub start_date: Option<DateTime<Utc>>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub applies_to_all_classes: bool,
    pub status: EntityStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PromoCode {
    /// 计算折后价格，结果不低于 0
    pub fn apply_discount(&self, price: f64) -> f64 {
        let discounted = match self.discount_type {
            DiscountType::Percent => price * (1.0 - self.discount_value / 100.0),
            DiscountType::Fixed => price - self.discount_value,
        };
        discounted.max(0.0)
    }

    pub fn remaining_uses(&self) -> Option<i64> {
        self.usage_limit
            .map(|limit| (limit - self.usage_count).max(0))
    }

    /// 在给定时刻是否处于有效期内
    pub fn is_within_window(&self, now: DateTime<Utc>) -> bool {
        self.start_date.is_none_or(|start| start <= now)
            && self.expiry_date.is_none_or(|expiry| now <= expiry)
    }
}
