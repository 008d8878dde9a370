use serde::Deserialize;

// 整体替换班级名单
#[derive(Debug, Clone, Deserialize)]
pub struct SetStudentIdsRequest {
    pub student_ids: Vec<i64>,
}

// 整体替换关联班级（学生选课、教师分配）
#[derive(Debug, Clone, Deserialize)]
pub struct SetClassIdsRequest {
    pub class_ids: Vec<i64>,
}

// 批量更新状态
#[derive(Debug, Clone, Deserialize)]
pub struct SetStatusRequest {
    pub ids: Vec<i64>,
    pub status: crate::models::EntityStatus,
}
