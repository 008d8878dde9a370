use serde::Deserialize;

use crate::models::{EntityStatus, double_option};

// 创建学生请求
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateStudentRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub mobile: String,
    pub password: Option<String>,
    pub promo_code: Option<String>,
    #[serde(default)]
    pub status: EntityStatus,
}

// 更新学生请求
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateStudentRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub email: Option<Option<String>>,
    pub mobile: Option<String>,
    pub password: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub promo_code: Option<Option<String>>,
    pub status: Option<EntityStatus>,
}
