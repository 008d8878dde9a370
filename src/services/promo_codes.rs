use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{error_response, storage_from_request};
use crate::models::promo_codes::requests::{CreatePromoCodeRequest, RedeemPromoCodeRequest, UpdatePromoCodeRequest};
use crate::models::{ApiResponse, EntityStatus, ListQuery};
use crate::storage::{SeaOrmStorage, PromoCodeRepository};

pub struct PromoCodeService {
    storage: Option<SeaOrmStorage>,
}

impl PromoCodeService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> SeaOrmStorage {
        match &self.storage {
            Some(storage) => storage.clone(),
            None => storage_from_request(request),
        }
    }

    fn repository(&self, request: &HttpRequest) -> PromoCodeRepository {
        self.get_storage(request).promo_codes()
    }

    // 优惠码列表
    pub async fn list_promo_codes(
        &self,
        request: &HttpRequest,
        query: ListQuery,
    ) -> ActixResult<HttpResponse> {
        match self.repository(request).list(&query).await {
            Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                page,
                "Promo codes retrieved successfully",
            ))),
            Err(e) => Ok(error_response(&e)),
        }
    }

    pub async fn create_promo_code(
        &self,
        request: &HttpRequest,
        promo_data: CreatePromoCodeRequest,
    ) -> ActixResult<HttpResponse> {
        match self.repository(request).create(promo_data).await {
            Ok(promo) => Ok(HttpResponse::Created()
                .json(ApiResponse::success(promo, "Promo code created successfully"))),
            Err(e) => Ok(error_response(&e)),
        }
    }

    pub async fn get_promo_code(
        &self,
        request: &HttpRequest,
        promo_id: i64,
    ) -> ActixResult<HttpResponse> {
        match self.repository(request).get(promo_id).await {
            Ok(promo) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                promo,
                "Promo code retrieved successfully",
            ))),
            Err(e) => Ok(error_response(&e)),
        }
    }

    pub async fn update_promo_code(
        &self,
        request: &HttpRequest,
        promo_id: i64,
        update_data: UpdatePromoCodeRequest,
    ) -> ActixResult<HttpResponse> {
        match self.repository(request).update(promo_id, update_data).await {
            Ok(promo) => Ok(HttpResponse::Ok()
                .json(ApiResponse::success(promo, "Promo code updated successfully"))),
            Err(e) => Ok(error_response(&e)),
        }
    }

    // 删除教师，其主讲班级的 promo_id 置空
    pub async fn delete_promo_code(
        &self,
        request: &HttpRequest,
        promo_id: i64,
    ) -> ActixResult<HttpResponse> {
        match self.repository(request).delete(promo_id).await {
            Ok(()) => {
                info!("Promo code {} deleted via admin api", promo_id);
                Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
                    "Promo code deleted successfully",
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
                "Promo code status updated successfully",
            ))),
            Err(e) => Ok(error_response(&e)),
        }
    }

    // 使用一次优惠码，成功时返回更新后的使用次数
    pub async fn redeem_promo_code(
        &self,
        request: &HttpRequest,
        redeem: RedeemPromoCodeRequest,
    ) -> ActixResult<HttpResponse> {
        let now = chrono::Utc::now();
        match self
            .repository(request)
            .redeem(&redeem.code, redeem.class_id, now)
            .await
        {
            Ok(promo) => {
                info!(
                    "Promo code {} redeemed ({} used)",
                    promo.code, promo.usage_count
                );
                Ok(HttpResponse::Ok()
                    .json(ApiResponse::success(promo, "Promo code redeemed successfully")))
            }
            Err(e) => Ok(error_response(&e)),
        }
    }
}
