//! 集成测试公共工具

#![allow(dead_code)]

use school_manager::config::Argon2Config;
use school_manager::models::classes::entities::Class;
use school_manager::models::classes::requests::CreateClassRequest;
use school_manager::models::students::entities::Student;
use school_manager::models::students::requests::CreateStudentRequest;
use school_manager::models::teachers::entities::Teacher;
use school_manager::models::teachers::requests::CreateTeacherRequest;
use school_manager::storage::SeaOrmStorage;

/// 测试用的低成本 argon2 参数
pub fn test_argon2() -> Argon2Config {
    Argon2Config {
        memory_cost: 8,
        time_cost: 1,
        parallelism: 1,
    }
}

/// 创建已执行迁移的内存数据库
pub async fn setup() -> SeaOrmStorage {
    SeaOrmStorage::in_memory(test_argon2())
        .await
        .expect("failed to create in-memory storage")
}

pub async fn create_teacher(storage: &SeaOrmStorage, n: usize) -> Teacher {
    storage
        .teachers()
        .create(CreateTeacherRequest {
            first_name: Some(format!("Teacher{n}")),
            last_name: Some("Test".to_string()),
            email: format!("teacher{n}@school.test"),
            mobile: format!("052{n:07}"),
            ..Default::default()
        })
        .await
        .expect("failed to create teacher")
}

pub async fn create_student(storage: &SeaOrmStorage, n: usize) -> Student {
    storage
        .students()
        .create(CreateStudentRequest {
            first_name: format!("Student{n}"),
            last_name: "Test".to_string(),
            mobile: format!("050{n:07}"),
            ..Default::default()
        })
        .await
        .expect("failed to create student")
}

pub async fn create_class(
    storage: &SeaOrmStorage,
    name: &str,
    teacher_id: Option<i64>,
    capacity: i32,
) -> Class {
    storage
        .classes()
        .create(CreateClassRequest {
            name: name.to_string(),
            teacher_id,
            capacity: Some(capacity),
            ..Default::default()
        })
        .await
        .expect("failed to create class")
}
