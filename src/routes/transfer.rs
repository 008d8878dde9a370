use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::services::TransferService;
use crate::transfer::ExportFilter;

// 懒加载的全局 TRANSFER_SERVICE 实例
static TRANSFER_SERVICE: Lazy<TransferService> = Lazy::new(TransferService::new_lazy);

pub async fn import_entities(
    req: HttpRequest,
    entity: web::Path<String>,
    payload: Multipart,
) -> ActixResult<HttpResponse> {
    TRANSFER_SERVICE
        .import(&req, entity.into_inner(), payload)
        .await
}

pub async fn export_entities(
    req: HttpRequest,
    entity: web::Path<String>,
    filter: web::Query<ExportFilter>,
) -> ActixResult<HttpResponse> {
    TRANSFER_SERVICE
        .export(&req, entity.into_inner(), filter.into_inner())
        .await
}

pub async fn download_template(entity: web::Path<String>) -> ActixResult<HttpResponse> {
    TRANSFER_SERVICE.template(entity.into_inner()).await
}

// 配置路由，{entity} 为 teachers、students、classes 或 promo-codes
pub fn configure_transfer_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/{entity}/import").route(web::post().to(import_entities)))
        .service(web::resource("/{entity}/export").route(web::get().to(export_entities)))
        .service(web::resource("/{entity}/template").route(web::get().to(download_template)));
}
