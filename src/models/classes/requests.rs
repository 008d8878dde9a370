use serde::Deserialize;

use crate::models::{EntityStatus, double_option};

// 创建班级请求
//
// # 字段说明
// - teacher_id：可选，指定时必须是已存在的教师
// - capacity：可选，默认 20，必须 >= 1
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateClassRequest {
    pub name: String,
    pub description: Option<String>,
    pub teacher_id: Option<i64>,
    pub capacity: Option<i32>,
    #[serde(default)]
    pub status: EntityStatus,
}

// 更新班级请求
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateClassRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub teacher_id: Option<Option<i64>>,
    pub capacity: Option<i32>,
    pub status: Option<EntityStatus>,
}
