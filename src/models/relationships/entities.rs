use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::EntityStatus;

// 选课记录（班级 <-> 学生）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: i64,
    pub class_id: i64,
    pub student_id: i64,
    pub status: EntityStatus,
    pub enrolled_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// 班级协同教师分配（主讲教师之外）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassTeacherAssignment {
    pub id: i64,
    pub class_id: i64,
    pub teacher_id: i64,
    pub assigned_at: DateTime<Utc>,
}
