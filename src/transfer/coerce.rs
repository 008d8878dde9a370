//! 导入单元格的类型转换
//!
//! CSV 中的值都是文本，这里按列语义转换为领域类型。除 id 和 teacher_id 外，
//! 转换都是宽松的：无法识别的值回落到默认值，而不是报错。

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::errors::{Result, SchoolError};
use crate::models::EntityStatus;
use crate::models::promo_codes::entities::DiscountType;

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", "%d.%m.%Y", "%m/%d/%Y", "%d %B %Y", "%d %b %Y",
    "%B %d, %Y", "%b %d, %Y", "%B %d %Y",
];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"];

/// 1 / yes / true / active 视为启用，其余为停用
pub fn parse_status(value: &str) -> EntityStatus {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "yes" | "true" | "active" => EntityStatus::Active,
        _ => EntityStatus::Inactive,
    }
}

/// percent / percentage 为百分比，其余为固定金额
pub fn parse_discount_type(value: &str) -> DiscountType {
    match value.trim().to_ascii_lowercase().as_str() {
        "percent" | "percentage" => DiscountType::Percent,
        _ => DiscountType::Fixed,
    }
}

/// 数值列，无法解析时为 0
pub fn parse_number(value: &str) -> f64 {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// 使用次数上限，空值表示不限
pub fn parse_usage_limit(value: &str) -> Option<i64> {
    if value.trim().is_empty() {
        return None;
    }
    Some(parse_number(value).trunc() as i64)
}

/// 容量，无法解析时不设置
pub fn parse_capacity(value: &str) -> Option<i32> {
    let value = value.trim();
    value.parse::<i32>().ok().or_else(|| {
        value
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v >= i32::MIN as f64 && *v <= i32::MAX as f64)
            .map(|v| v.trunc() as i32)
    })
}

/// 整数 ID 列，非整数是行错误
pub fn parse_id(field: &str, value: &str) -> Result<i64> {
    value
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| {
            SchoolError::validation(field, format!("must be a positive integer, got '{value}'"))
        })
}

/// 日期列转为当天 23:59:59 (UTC)；空值或无法识别时为 None
pub fn parse_end_of_day(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    let date = DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc).date_naive())
        .ok()
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        })?;

    let end_of_day = NaiveTime::from_hms_opt(23, 59, 59)?;
    Some(date.and_time(end_of_day).and_utc())
}
