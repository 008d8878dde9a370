use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::EntityStatus;

pub const DEFAULT_CLASS_CAPACITY: i32 = 20;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Class {
    // 班级ID
    pub id: i64,
    // 班级名称
    pub name: String,
    // 班级描述
    pub description: Option<String>,
    // 主讲教师ID，教师删除后置空
    pub teacher_id: Option<i64>,
    // 容量
    pub capacity: i32,
    pub status: EntityStatus,
    pub expiry_date: Option<DateTime<Utc>>,
    // 创建时间
    pub created_at: DateTime<Utc>,
    // 更新时间
    pub updated_at: DateTime<Utc>,
}
