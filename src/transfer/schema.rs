//! 各实体的 CSV 列定义

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 支持导入导出的实体类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Teachers,
    Students,
    Classes,
    PromoCodes,
}

/// 单列定义：导入时按 key 或 label 匹配表头，导出时使用 label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub required: bool,
}

const fn col(key: &'static str, label: &'static str, required: bool) -> ColumnSpec {
    ColumnSpec {
        key,
        label,
        required,
    }
}

pub const ID: &str = "id";
pub const CREATED_AT: &str = "created_at";

const TEACHER_COLUMNS: &[ColumnSpec] = &[
    col(ID, "ID", false),
    col("first_name", "First Name", false),
    col("last_name", "Last Name", false),
    col("email", "Email", true),
    col("mobile", "Mobile", true),
    col("status", "Status", false),
    col(CREATED_AT, "Date Created", false),
];

const STUDENT_COLUMNS: &[ColumnSpec] = &[
    col(ID, "ID", false),
    col("first_name", "First Name", true),
    col("last_name", "Last Name", true),
    col("email", "Email", false),
    col("mobile", "Mobile", true),
    col("promo_code", "Promo Code", false),
    col("status", "Status", false),
    col(CREATED_AT, "Date Created", false),
];

const CLASS_COLUMNS: &[ColumnSpec] = &[
    col(ID, "ID", false),
    col("name", "Class Name", true),
    col("description", "Description", false),
    col("teacher_id", "Teacher ID", false),
    col("capacity", "Capacity", false),
    col("status", "Status", false),
    col(CREATED_AT, "Date Created", false),
];

const PROMO_CODE_COLUMNS: &[ColumnSpec] = &[
    col(ID, "ID", false),
    col("code", "Code", true),
    col("description", "Description", false),
    col("discount_type", "Discount Type", false),
    col("amount", "Amount", true),
    col("usage_limit", "Usage Limit", false),
    col("expiry_date", "Expiry Date", false),
    col("status", "Status", false),
    col(CREATED_AT, "Date Created", false),
];

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Teachers,
        EntityKind::Students,
        EntityKind::Classes,
        EntityKind::PromoCodes,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Teachers => "teachers",
            EntityKind::Students => "students",
            EntityKind::Classes => "classes",
            EntityKind::PromoCodes => "promo_codes",
        }
    }

    /// 有序列定义
    pub fn columns(&self) -> &'static [ColumnSpec] {
        match self {
            EntityKind::Teachers => TEACHER_COLUMNS,
            EntityKind::Students => STUDENT_COLUMNS,
            EntityKind::Classes => CLASS_COLUMNS,
            EntityKind::PromoCodes => PROMO_CODE_COLUMNS,
        }
    }

    pub fn required_keys(&self) -> impl Iterator<Item = &'static str> {
        self.columns().iter().filter(|c| c.required).map(|c| c.key)
    }

    /// 表头单元格匹配列（key 或 label，忽略大小写和首尾空白）
    pub fn match_header(&self, header: &str) -> Option<&'static ColumnSpec> {
        let header = header.trim();
        self.columns().iter().find(|c| {
            c.key.eq_ignore_ascii_case(header) || c.label.eq_ignore_ascii_case(header)
        })
    }

    pub fn export_file_name(&self) -> String {
        format!("{}.csv", self.as_str())
    }

    pub fn template_file_name(&self) -> String {
        format!("{}_import_template.csv", self.as_str())
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "teachers" => Ok(EntityKind::Teachers),
            "students" => Ok(EntityKind::Students),
            "classes" => Ok(EntityKind::Classes),
            // 路由中使用连字符
            "promo_codes" | "promo-codes" => Ok(EntityKind::PromoCodes),
            _ => Err(format!("Invalid entity kind: {s}")),
        }
    }
}

impl<'de> Deserialize<'de> for EntityKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<EntityKind>().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_header_by_key_or_label() {
        let kind = EntityKind::Students;
        assert_eq!(kind.match_header("first_name").map(|c| c.key), Some("first_name"));
        assert_eq!(kind.match_header(" First Name ").map(|c| c.key), Some("first_name"));
        assert_eq!(kind.match_header("MOBILE").map(|c| c.key), Some("mobile"));
        assert_eq!(kind.match_header("date created").map(|c| c.key), Some(CREATED_AT));
        assert!(kind.match_header("nickname").is_none());
    }

    #[test]
    fn test_required_keys() {
        let required: Vec<_> = EntityKind::PromoCodes.required_keys().collect();
        assert_eq!(required, vec!["code", "amount"]);
        let required: Vec<_> = EntityKind::Teachers.required_keys().collect();
        assert_eq!(required, vec!["email", "mobile"]);
    }

    #[test]
    fn test_every_schema_starts_with_id_and_ends_with_created_at() {
        for kind in EntityKind::ALL {
            let columns = kind.columns();
            assert_eq!(columns.first().map(|c| c.key), Some(ID));
            assert_eq!(columns.last().map(|c| c.key), Some(CREATED_AT));
        }
    }

    #[test]
    fn test_parse_kind() {
        assert_eq!("promo-codes".parse::<EntityKind>(), Ok(EntityKind::PromoCodes));
        assert!("grades".parse::<EntityKind>().is_err());
    }
}
