use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;
use std::collections::HashMap;

use super::list_query;
use crate::models::promo_codes::requests::{
    CreatePromoCodeRequest, RedeemPromoCodeRequest, UpdatePromoCodeRequest,
};
use crate::models::relationships::requests::SetStatusRequest;
use crate::services::{PromoCodeService, error_response};

// 懒加载的全局 PROMO_CODE_SERVICE 实例
static PROMO_CODE_SERVICE: Lazy<PromoCodeService> = Lazy::new(PromoCodeService::new_lazy);

pub async fn list_promo_codes(
    req: HttpRequest,
    query: web::Query<HashMap<String, String>>,
) -> ActixResult<HttpResponse> {
    match list_query(query) {
        Ok(query) => PROMO_CODE_SERVICE.list_promo_codes(&req, query).await,
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn create_promo_code(
    req: HttpRequest,
    promo_data: web::Json<CreatePromoCodeRequest>,
) -> ActixResult<HttpResponse> {
    PROMO_CODE_SERVICE
        .create_promo_code(&req, promo_data.into_inner())
        .await
}

pub async fn get_promo_code(req: HttpRequest, promo_id: web::Path<i64>) -> ActixResult<HttpResponse> {
    PROMO_CODE_SERVICE
        .get_promo_code(&req, promo_id.into_inner())
        .await
}

pub async fn update_promo_code(
    req: HttpRequest,
    promo_id: web::Path<i64>,
    update_data: web::Json<UpdatePromoCodeRequest>,
) -> ActixResult<HttpResponse> {
    PROMO_CODE_SERVICE
        .update_promo_code(&req, promo_id.into_inner(), update_data.into_inner())
        .await
}

pub async fn delete_promo_code(
    req: HttpRequest,
    promo_id: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    PROMO_CODE_SERVICE
        .delete_promo_code(&req, promo_id.into_inner())
        .await
}

pub async fn set_promo_code_status(
    req: HttpRequest,
    body: web::Json<SetStatusRequest>,
) -> ActixResult<HttpResponse> {
    let body = body.into_inner();
    PROMO_CODE_SERVICE.set_status(&req, body.ids, body.status).await
}

pub async fn redeem_promo_code(
    req: HttpRequest,
    redeem: web::Json<RedeemPromoCodeRequest>,
) -> ActixResult<HttpResponse> {
    PROMO_CODE_SERVICE
        .redeem_promo_code(&req, redeem.into_inner())
        .await
}

// 配置路由
pub fn configure_promo_codes_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/promo-codes")
            .service(
                web::resource("")
                    .route(web::get().to(list_promo_codes))
                    .route(web::post().to(create_promo_code)),
            )
            .service(web::resource("/status").route(web::post().to(set_promo_code_status)))
            .service(web::resource("/redeem").route(web::post().to(redeem_promo_code)))
            .service(
                web::resource("/{promo_id}")
                    .route(web::get().to(get_promo_code))
                    .route(web::put().to(update_promo_code))
                    .route(web::delete().to(delete_promo_code)),
            ),
    );
}
