use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{error_response, storage_from_request};
use crate::models::students::requests::{CreateStudentRequest, UpdateStudentRequest};
use crate::models::{ApiResponse, EntityStatus, ListQuery};
use crate::storage::{SeaOrmStorage, StudentRepository};

pub struct StudentService {
    storage: Option<SeaOrmStorage>,
}

impl StudentService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> SeaOrmStorage {
        match &self.storage {
            Some(storage) => storage.clone(),
            None => storage_from_request(request),
        }
    }

    fn repository(&self, request: &HttpRequest) -> StudentRepository {
        self.get_storage(request).students()
    }

    // 学生列表
    pub async fn list_students(
        &self,
        request: &HttpRequest,
        query: ListQuery,
    ) -> ActixResult<HttpResponse> {
        match self.repository(request).list(&query).await {
            Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                page,
                "Students retrieved successfully",
            ))),
            Err(e) => Ok(error_response(&e)),
        }
    }

    pub async fn create_student(
        &self,
        request: &HttpRequest,
        student_data: CreateStudentRequest,
    ) -> ActixResult<HttpResponse> {
        match self.repository(request).create(student_data).await {
            Ok(student) => Ok(HttpResponse::Created()
                .json(ApiResponse::success(student, "Student created successfully"))),
            Err(e) => Ok(error_response(&e)),
        }
    }

    pub async fn get_student(
        &self,
        request: &HttpRequest,
        student_id: i64,
    ) -> ActixResult<HttpResponse> {
        match self.repository(request).get(student_id).await {
            Ok(student) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                student,
                "Student retrieved successfully",
            ))),
            Err(e) => Ok(error_response(&e)),
        }
    }

    pub async fn update_student(
        &self,
        request: &HttpRequest,
        student_id: i64,
        update_data: UpdateStudentRequest,
    ) -> ActixResult<HttpResponse> {
        match self.repository(request).update(student_id, update_data).await {
            Ok(student) => Ok(HttpResponse::Ok()
                .json(ApiResponse::success(student, "Student updated successfully"))),
            Err(e) => Ok(error_response(&e)),
        }
    }

    // 删除教师，其主讲班级的 student_id 置空
    pub async fn delete_student(
        &self,
        request: &HttpRequest,
        student_id: i64,
    ) -> ActixResult<HttpResponse> {
        match self.repository(request).delete(student_id).await {
            Ok(()) => {
                info!("Student {} deleted via admin api", student_id);
                Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
                    "Student deleted successfully",
                )))
            }
            Err(e) => Ok(error_response(&e)),
        }
    }

    pub async fn set_status(
        &self,
        request: &HttpRequest,
        ids: Vec<i64>,
        status: EntityStatus,
    ) -> ActixResult<HttpResponse> {
        match self.repository(request).set_status(&ids, status).await {
            Ok(updated) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                serde_json::json!({ "updated": updated }),
                "Student status updated successfully",
            ))),
            Err(e) => Ok(error_response(&e)),
        }
    }
}
