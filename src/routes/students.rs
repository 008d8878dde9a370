use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;
use std::collections::HashMap;

use super::list_query;
use crate::models::relationships::requests::SetStatusRequest;
use crate::models::students::requests::{CreateStudentRequest, UpdateStudentRequest};
use crate::services::{StudentService, error_response};

// 懒加载的全局 STUDENT_SERVICE 实例
static STUDENT_SERVICE: Lazy<StudentService> = Lazy::new(StudentService::new_lazy);

// HTTP处理程序
pub async fn list_students(
    req: HttpRequest,
    query: web::Query<HashMap<String, String>>,
) -> ActixResult<HttpResponse> {
    match list_query(query) {
        Ok(query) => STUDENT_SERVICE.list_students(&req, query).await,
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn create_student(
    req: HttpRequest,
    student_data: web::Json<CreateStudentRequest>,
) -> ActixResult<HttpResponse> {
    STUDENT_SERVICE
        .create_student(&req, student_data.into_inner())
        .await
}

pub async fn get_student(req: HttpRequest, student_id: web::Path<i64>) -> ActixResult<HttpResponse> {
    STUDENT_SERVICE
        .get_student(&req, student_id.into_inner())
        .await
}

pub async fn update_student(
    req: HttpRequest,
    student_id: web::Path<i64>,
    update_data: web::Json<UpdateStudentRequest>,
) -> ActixResult<HttpResponse> {
    STUDENT_SERVICE
        .update_student(&req, student_id.into_inner(), update_data.into_inner())
        .await
}

pub async fn delete_student(
    req: HttpRequest,
    student_id: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    STUDENT_SERVICE
        .delete_student(&req, student_id.into_inner())
        .await
}

pub async fn set_student_status(
    req: HttpRequest,
    body: web::Json<SetStatusRequest>,
) -> ActixResult<HttpResponse> {
    let body = body.into_inner();
    STUDENT_SERVICE.set_status(&req, body.ids, body.status).await
}

// 配置路由
pub fn configure_students_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/students")
            .service(
                web::resource("")
                    .route(web::get().to(list_students))
                    .route(web::post().to(create_student)),
            )
            // 批量启用/停用，需在 /{student_id} 之前注册
            .service(web::resource("/status").route(web::post().to(set_student_status)))
            .service(
                web::resource("/{student_id}")
                    .route(web::get().to(get_student))
                    .route(web::put().to(update_student))
                    .route(web::delete().to(delete_student)),
            ),
    );
}
