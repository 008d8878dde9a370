use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{error_response, storage_from_request};
use crate::models::teachers::requests::{CreateTeacherRequest, UpdateTeacherRequest};
use crate::models::{ApiResponse, EntityStatus, ListQuery};
use crate::storage::{SeaOrmStorage, TeacherRepository};

pub struct TeacherService {
    storage: Option<SeaOrmStorage>,
}

impl TeacherService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> SeaOrmStorage {
        match &self.storage {
            Some(storage) => storage.clone(),
            None => storage_from_request(request),
        }
    }

    fn repository(&self, request: &HttpRequest) -> TeacherRepository {
        self.get_storage(request).teachers()
    }

    // 教师列表
    pub async fn list_teachers(
        &self,
        request: &HttpRequest,
        query: ListQuery,
    ) -> ActixResult<HttpResponse> {
        match self.repository(request).list(&query).await {
            Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                page,
                "Teachers retrieved successfully",
            ))),
            Err(e) => Ok(error_response(&e)),
        }
    }

    pub async fn create_teacher(
        &self,
        request: &HttpRequest,
        teacher_data: CreateTeacherRequest,
    ) -> ActixResult<HttpResponse> {
        match self.repository(request).create(teacher_data).await {
            Ok(teacher) => Ok(HttpResponse::Created()
                .json(ApiResponse::success(teacher, "Teacher created successfully"))),
            Err(e) => Ok(error_response(&e)),
        }
    }

    pub async fn get_teacher(
        &self,
        request: &HttpRequest,
        teacher_id: i64,
    ) -> ActixResult<HttpResponse> {
        match self.repository(request).get(teacher_id).await {
            Ok(teacher) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                teacher,
                "Teacher retrieved successfully",
            ))),
            Err(e) => Ok(error_response(&e)),
        }
    }

    pub async fn update_teacher(
        &self,
        request: &HttpRequest,
        teacher_id: i64,
        update_data: UpdateTeacherRequest,
    ) -> ActixResult<HttpResponse> {
        match self.repository(request).update(teacher_id, update_data).await {
            Ok(teacher) => Ok(HttpResponse::Ok()
                .json(ApiResponse::success(teacher, "Teacher updated successfully"))),
            Err(e) => Ok(error_response(&e)),
        }
    }

    // 删除教师，其主讲班级的 teacher_id 置空
    pub async fn delete_teacher(
        &self,
        request: &HttpRequest,
        teacher_id: i64,
    ) -> ActixResult<HttpResponse> {
        match self.repository(request).delete(teacher_id).await {
            Ok(()) => {
                info!("Teacher {} deleted via admin api", teacher_id);
                Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
                    "Teacher deleted successfully",
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
                "Teacher status updated successfully",
            ))),
            Err(e) => Ok(error_response(&e)),
        }
    }
}
