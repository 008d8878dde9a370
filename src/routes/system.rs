use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::services::SystemService;

// 懒加载的全局 SystemService 实例
static SYSTEM_SERVICE: Lazy<SystemService> = Lazy::new(SystemService::new_lazy);

pub async fn get_schema_status(request: HttpRequest) -> ActixResult<HttpResponse> {
    SYSTEM_SERVICE.get_schema_status(&request).await
}

pub async fn get_counts(request: HttpRequest) -> ActixResult<HttpResponse> {
    SYSTEM_SERVICE.get_counts(&request).await
}

// 配置路由
pub fn configure_system_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/system")
            .route("/schema", web::get().to(get_schema_status))
            .route("/counts", web::get().to(get_counts)),
    );
}
