//! 学年到期时间计算
//!
//! 教师、学生和班级在创建时统一设置到期时间：创建时刻之后（含）最近的 6 月 30 日 23:59:59 UTC。

use chrono::{DateTime, Datelike, NaiveDate, Utc};

/// 计算创建时刻对应的学年到期时间
pub fn next_expiry(created_at: DateTime<Utc>) -> DateTime<Utc> {
    let this_year = end_of_school_year(created_at.year());
    match this_year {
        Some(expiry) if created_at <= expiry => expiry,
        _ => end_of_school_year(created_at.year() + 1).unwrap_or(created_at),
    }
}

fn end_of_school_year(year: i32) -> Option<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(year, 6, 30)
        .and_then(|date| date.and_hms_opt(23, 59, 59))
        .map(|naive| naive.and_utc())
}
