use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{error_response, storage_from_request};
use crate::models::classes::requests::{CreateClassRequest, UpdateClassRequest};
use crate::models::{ApiResponse, EntityStatus, ListQuery};
use crate::storage::{SeaOrmStorage, ClassRepository};

pub struct ClassService {
    storage: Option<SeaOrmStorage>,
}

impl ClassService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> SeaOrmStorage {
        match &self.storage {
            Some(storage) => storage.clone(),
            None => storage_from_request(request),
        }
    }

    fn repository(&self, request: &HttpRequest) -> ClassRepository {
        self.get_storage(request).classes()
    }

    // 班级列表
    pub async fn list_classes(
        &self,
        request: &HttpRequest,
        query: ListQuery,
    ) -> ActixResult<HttpResponse> {
        match self.repository(request).list(&query).await {
            Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                page,
                "Classes retrieved successfully",
            ))),
            Err(e) => Ok(error_response(&e)),
        }
    }

    pub async fn create_class(
        &self,
        request: &HttpRequest,
        class_data: CreateClassRequest,
    ) -> ActixResult<HttpResponse> {
        match self.repository(request).create(class_data).await {
            Ok(class) => Ok(HttpResponse::Created()
                .json(ApiResponse::success(class, "Class created successfully"))),
            Err(e) => Ok(error_response(&e)),
        }
    }

    pub async fn get_class(
        &self,
        request: &HttpRequest,
        class_id: i64,
    ) -> ActixResult<HttpResponse> {
        match self.repository(request).get(class_id).await {
            Ok(class) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                class,
                "Class retrieved successfully",
            ))),
            Err(e) => Ok(error_response(&e)),
        }
    }

    pub async fn update_class(
        &self,
        request: &HttpRequest,
        class_id: i64,
        update_data: UpdateClassRequest,
    ) -> ActixResult<HttpResponse> {
        match self.repository(request).update(class_id, update_data).await {
            Ok(class) => Ok(HttpResponse::Ok()
                .json(ApiResponse::success(class, "Class updated successfully"))),
            Err(e) => Ok(error_response(&e)),
        }
    }

    // 删除教师，其主讲班级的 class_id 置空
    pub async fn delete_class(
        &self,
        request: &HttpRequest,
        class_id: i64,
    ) -> ActixResult<HttpResponse> {
        match self.repository(request).delete(class_id).await {
            Ok(()) => {
                info!("Class {} deleted via admin api", class_id);
                Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
                    "Class deleted successfully",
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
                "Class status updated successfully",
            ))),
            Err(e) => Ok(error_response(&e)),
        }
    }
}
