use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use serde::Serialize;

use super::{error_response, storage_from_request};
use crate::errors::Result;
use crate::models::ApiResponse;
use crate::models::promo_codes::entities::ClassRestriction;
use crate::storage::{RelationshipManager, SeaOrmStorage};

// 班级名单
#[derive(Debug, Serialize)]
struct ClassRoster {
    class_id: i64,
    student_ids: Vec<i64>,
}

// 学生或教师关联的班级
#[derive(Debug, Serialize)]
struct LinkedClasses {
    owner_id: i64,
    class_ids: Vec<i64>,
}

fn respond<T: Serialize>(result: Result<T>, message: &str) -> HttpResponse {
    match result {
        Ok(data) => HttpResponse::Ok().json(ApiResponse::success(data, message)),
        Err(e) => error_response(&e),
    }
}

pub struct RelationshipService {
    storage: Option<SeaOrmStorage>,
}

impl RelationshipService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> SeaOrmStorage {
        match &self.storage {
            Some(storage) => storage.clone(),
            None => storage_from_request(request),
        }
    }

    fn manager(&self, request: &HttpRequest) -> RelationshipManager {
        self.get_storage(request).relationships()
    }

    pub async fn get_class_roster(
        &self,
        request: &HttpRequest,
        class_id: i64,
    ) -> ActixResult<HttpResponse> {
        let result = self
            .manager(request)
            .class_roster(class_id)
            .await
            .map(|student_ids| ClassRoster {
                class_id,
                student_ids,
            });
        Ok(respond(result, "Class roster retrieved successfully"))
    }

    // 整体替换班级名单，超出容量时拒绝
    pub async fn set_class_roster(
        &self,
        request: &HttpRequest,
        class_id: i64,
        student_ids: Vec<i64>,
    ) -> ActixResult<HttpResponse> {
        let result = self
            .manager(request)
            .set_class_roster(class_id, &student_ids)
            .await
            .map(|student_ids| ClassRoster {
                class_id,
                student_ids,
            });
        Ok(respond(result, "Class roster updated successfully"))
    }

    pub async fn get_class_enrollments(
        &self,
        request: &HttpRequest,
        class_id: i64,
    ) -> ActixResult<HttpResponse> {
        let result = self.manager(request).class_enrollments(class_id).await;
        Ok(respond(result, "Enrollments retrieved successfully"))
    }

    pub async fn get_student_classes(
        &self,
        request: &HttpRequest,
        student_id: i64,
    ) -> ActixResult<HttpResponse> {
        let result = self
            .manager(request)
            .student_classes(student_id)
            .await
            .map(|class_ids| LinkedClasses {
                owner_id: student_id,
                class_ids,
            });
        Ok(respond(result, "Student classes retrieved successfully"))
    }

    pub async fn set_student_classes(
        &self,
        request: &HttpRequest,
        student_id: i64,
        class_ids: Vec<i64>,
    ) -> ActixResult<HttpResponse> {
        let result = self
            .manager(request)
            .set_student_classes(student_id, &class_ids)
            .await
            .map(|class_ids| LinkedClasses {
                owner_id: student_id,
                class_ids,
            });
        Ok(respond(result, "Student classes updated successfully"))
    }

    pub async fn get_teacher_classes(
        &self,
        request: &HttpRequest,
        teacher_id: i64,
    ) -> ActixResult<HttpResponse> {
        let result = self.manager(request).teacher_assignments(teacher_id).await;
        Ok(respond(result, "Teacher assignments retrieved successfully"))
    }

    pub async fn set_teacher_classes(
        &self,
        request: &HttpRequest,
        teacher_id: i64,
        class_ids: Vec<i64>,
    ) -> ActixResult<HttpResponse> {
        let result = self
            .manager(request)
            .set_teacher_classes(teacher_id, &class_ids)
            .await
            .map(|class_ids| LinkedClasses {
                owner_id: teacher_id,
                class_ids,
            });
        Ok(respond(result, "Teacher assignments updated successfully"))
    }

    pub async fn get_promo_code_classes(
        &self,
        request: &HttpRequest,
        promo_id: i64,
    ) -> ActixResult<HttpResponse> {
        let result = self.manager(request).promo_code_classes(promo_id).await;
        Ok(respond(result, "Promo code classes retrieved successfully"))
    }

    pub async fn set_promo_code_classes(
        &self,
        request: &HttpRequest,
        promo_id: i64,
        restriction: ClassRestriction,
    ) -> ActixResult<HttpResponse> {
        let result = self
            .manager(request)
            .set_promo_code_classes(promo_id, restriction)
            .await;
        Ok(respond(result, "Promo code classes updated successfully"))
    }
}
