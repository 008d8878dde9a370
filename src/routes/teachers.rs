use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;
use std::collections::HashMap;

use super::list_query;
use crate::models::relationships::requests::SetStatusRequest;
use crate::models::teachers::requests::{CreateTeacherRequest, UpdateTeacherRequest};
use crate::services::{TeacherService, error_response};

// 懒加载的全局 TEACHER_SERVICE 实例
static TEACHER_SERVICE: Lazy<TeacherService> = Lazy::new(TeacherService::new_lazy);

// HTTP处理程序
pub async fn list_teachers(
    req: HttpRequest,
    query: web::Query<HashMap<String, String>>,
) -> ActixResult<HttpResponse> {
    match list_query(query) {
        Ok(query) => TEACHER_SERVICE.list_teachers(&req, query).await,
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn create_teacher(
    req: HttpRequest,
    teacher_data: web::Json<CreateTeacherRequest>,
) -> ActixResult<HttpResponse> {
    TEACHER_SERVICE
        .create_teacher(&req, teacher_data.into_inner())
        .await
}

pub async fn get_teacher(req: HttpRequest, teacher_id: web::Path<i64>) -> ActixResult<HttpResponse> {
    TEACHER_SERVICE
        .get_teacher(&req, teacher_id.into_inner())
        .await
}

pub async fn update_teacher(
    req: HttpRequest,
    teacher_id: web::Path<i64>,
    update_data: web::Json<UpdateTeacherRequest>,
) -> ActixResult<HttpResponse> {
    TEACHER_SERVICE
        .update_teacher(&req, teacher_id.into_inner(), update_data.into_inner())
        .await
}

pub async fn delete_teacher(
    req: HttpRequest,
    teacher_id: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    TEACHER_SERVICE
        .delete_teacher(&req, teacher_id.into_inner())
        .await
}

pub async fn set_teacher_status(
    req: HttpRequest,
    body: web::Json<SetStatusRequest>,
) -> ActixResult<HttpResponse> {
    let body = body.into_inner();
    TEACHER_SERVICE.set_status(&req, body.ids, body.status).await
}

// 配置路由
pub fn configure_teachers_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/teachers")
            .service(
                web::resource("")
                    .route(web::get().to(list_teachers))
                    .route(web::post().to(create_teacher)),
            )
            // 批量启用/停用，需在 /{teacher_id} 之前注册
            .service(web::resource("/status").route(web::post().to(set_teacher_status)))
            .service(
                web::resource("/{teacher_id}")
                    .route(web::get().to(get_teacher))
                    .route(web::put().to(update_teacher))
                    .route(web::delete().to(delete_teacher)),
            ),
    );
}
