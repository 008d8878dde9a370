//! CSV 导入导出服务

pub mod export;
pub mod import;

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};

use super::storage_from_request;
use crate::config::AppConfig;
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::SeaOrmStorage;
use crate::transfer::{CsvOptions, EntityKind, ExportFilter};

/// 导入导出参数，由启动流程从配置构建后放入 app data
#[derive(Debug, Clone, Copy)]
pub struct TransferSettings {
    pub csv: CsvOptions,
    pub export_batch_size: u64,
    pub max_upload_bytes: usize, // 单个导入文件最大字节数
}

const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

impl Default for TransferSettings {
    fn default() -> Self {
        Self {
            csv: CsvOptions::default(),
            export_batch_size: 200,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl From<&AppConfig> for TransferSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            csv: CsvOptions::from(&config.import),
            export_batch_size: config.export.batch_size,
            max_upload_bytes: config.server.limits.max_payload_size,
        }
    }
}

pub struct TransferService {
    storage: Option<SeaOrmStorage>,
    settings: Option<TransferSettings>,
}

impl TransferService {
    pub fn new_lazy() -> Self {
        Self {
            storage: None,
            settings: None,
        }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> SeaOrmStorage {
        match &self.storage {
            Some(storage) => storage.clone(),
            None => storage_from_request(request),
        }
    }

    pub(crate) fn get_settings(&self, request: &HttpRequest) -> TransferSettings {
        self.settings
            .or_else(|| {
                request
                    .app_data::<web::Data<TransferSettings>>()
                    .map(|data| *data.get_ref())
            })
            .unwrap_or_default()
    }

    // 上传 CSV 文件并导入
    pub async fn import(
        &self,
        request: &HttpRequest,
        entity: String,
        payload: Multipart,
    ) -> ActixResult<HttpResponse> {
        match parse_kind(&entity) {
            Ok(kind) => import::import_entities(self, request, kind, payload).await,
            Err(resp) => Ok(resp),
        }
    }

    // 按筛选条件导出 CSV
    pub async fn export(
        &self,
        request: &HttpRequest,
        entity: String,
        filter: ExportFilter,
    ) -> ActixResult<HttpResponse> {
        match parse_kind(&entity) {
            Ok(kind) => export::export_entities(self, request, kind, filter).await,
            Err(resp) => Ok(resp),
        }
    }

    // 下载导入模板
    pub async fn template(&self, entity: String) -> ActixResult<HttpResponse> {
        match parse_kind(&entity) {
            Ok(kind) => export::download_template(kind).await,
            Err(resp) => Ok(resp),
        }
    }
}

fn parse_kind(entity: &str) -> Result<EntityKind, HttpResponse> {
    entity.parse::<EntityKind>().map_err(|e| {
        HttpResponse::NotFound().json(ApiResponse::error_empty(ErrorCode::NotFound, e))
    })
}

/// CSV 下载响应
fn csv_attachment(body: Vec<u8>, file_name: &str) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{file_name}\""),
        ))
        .body(body)
}
