use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;
use std::collections::HashMap;

use super::list_query;
use crate::models::relationships::requests::SetStatusRequest;
use crate::models::classes::requests::{CreateClassRequest, UpdateClassRequest};
use crate::services::{ClassService, error_response};

// 懒加载的全局 CLASS_SERVICE 实例
static CLASS_SERVICE: Lazy<ClassService> = Lazy::new(ClassService::new_lazy);

// HTTP处理程序
pub async fn list_classes(
    req: HttpRequest,
    query: web::Query<HashMap<String, String>>,
) -> ActixResult<HttpResponse> {
    match list_query(query) {
        Ok(query) => CLASS_SERVICE.list_classes(&req, query).await,
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn create_class(
    req: HttpRequest,
    class_data: web::Json<CreateClassRequest>,
) -> ActixResult<HttpResponse> {
    CLASS_SERVICE
        .create_class(&req, class_data.into_inner())
        .await
}

pub async fn get_class(req: HttpRequest, class_id: web::Path<i64>) -> ActixResult<HttpResponse> {
    CLASS_SERVICE
        .get_class(&req, class_id.into_inner())
        .await
}

pub async fn update_class(
    req: HttpRequest,
    class_id: web::Path<i64>,
    update_data: web::Json<UpdateClassRequest>,
) -> ActixResult<HttpResponse> {
    CLASS_SERVICE
        .update_class(&req, class_id.into_inner(), update_data.into_inner())
        .await
}

pub async fn delete_class(
    req: HttpRequest,
    class_id: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    CLASS_SERVICE
        .delete_class(&req, class_id.into_inner())
        .await
}

pub async fn set_class_status(
    req: HttpRequest,
    body: web::Json<SetStatusRequest>,
) -> ActixResult<HttpResponse> {
    let body = body.into_inner();
    CLASS_SERVICE.set_status(&req, body.ids, body.status).await
}

// 配置路由
pub fn configure_classes_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/classes")
            .service(
                web::resource("")
                    .route(web::get().to(list_classes))
                    .route(web::post().to(create_class)),
            )
            // 批量启用/停用，需在 /{class_id} 之前注册
            .service(web::resource("/status").route(web::post().to(set_class_status)))
            .service(
                web::resource("/{class_id}")
                    .route(web::get().to(get_class))
                    .route(web::put().to(update_class))
                    .route(web::delete().to(delete_class)),
            ),
    );
}
