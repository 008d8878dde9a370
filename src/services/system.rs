use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use serde::Serialize;

use super::{error_response, storage_from_request};
use crate::errors::Result;
use crate::models::ApiResponse;
use crate::storage::SeaOrmStorage;

// 数据库结构状态
#[derive(Debug, Serialize)]
pub struct SchemaStatus {
    pub schema_version: &'static str,
    pub pending_migrations: Vec<String>,
    pub up_to_date: bool,
}

// 各实体记录数
#[derive(Debug, Serialize)]
pub struct EntityCounts {
    pub teachers: u64,
    pub students: u64,
    pub classes: u64,
    pub promo_codes: u64,
}

pub struct SystemService {
    storage: Option<SeaOrmStorage>,
}

impl SystemService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> SeaOrmStorage {
        match &self.storage {
            Some(storage) => storage.clone(),
            None => storage_from_request(request),
        }
    }

    pub async fn get_schema_status(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let schema = self.get_storage(request).schema();
        match schema.pending_migrations().await {
            Ok(pending_migrations) => {
                let status = SchemaStatus {
                    schema_version: schema.schema_version(),
                    up_to_date: pending_migrations.is_empty(),
                    pending_migrations,
                };
                Ok(HttpResponse::Ok().json(ApiResponse::success(
                    status,
                    "Schema status retrieved successfully",
                )))
            }
            Err(e) => Ok(error_response(&e)),
        }
    }

    pub async fn get_counts(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        match entity_counts(&self.get_storage(request)).await {
            Ok(counts) => Ok(HttpResponse::Ok()
                .json(ApiResponse::success(counts, "Counts retrieved successfully"))),
            Err(e) => Ok(error_response(&e)),
        }
    }
}

pub(crate) async fn entity_counts(storage: &SeaOrmStorage) -> Result<EntityCounts> {
    Ok(EntityCounts {
        teachers: storage.teachers().count().await?,
        students: storage.students().count().await?,
        classes: storage.classes().count().await?,
        promo_codes: storage.promo_codes().count().await?,
    })
}
