use serde::Deserialize;

use crate::models::{EntityStatus, double_option};

// 创建教师请求
//
// password 为空时自动生成随机密码
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateTeacherRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: String,
    pub mobile: String,
    pub password: Option<String>,
    #[serde(default)]
    pub status: EntityStatus,
}

// 更新教师请求
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTeacherRequest {
    #[serde(default, deserialize_with = "double_option")]
    pub first_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub last_name: Option<Option<String>>,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub password: Option<String>,
    pub status: Option<EntityStatus>,
}
