//! 导出服务

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info};

use super::{TransferService, csv_attachment};
use crate::models::{ApiResponse, ErrorCode};
use crate::transfer::{CsvExporter, EntityKind, ExportFilter, write_template};

/// 导出实体列表
pub async fn export_entities(
    service: &TransferService,
    request: &HttpRequest,
    kind: EntityKind,
    filter: ExportFilter,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let settings = service.get_settings(request);
    let exporter = CsvExporter::new(storage, settings.export_batch_size);

    let mut body = Vec::new();
    match exporter.export(kind, &filter, &mut body).await {
        Ok(rows) => {
            info!("Exported {} {} rows", rows, kind);
            Ok(csv_attachment(body, &kind.export_file_name()))
        }
        Err(e) if e.is_client_error() => Ok(crate::services::error_response(&e)),
        Err(e) => {
            error!("导出{}失败: {}", kind, e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::ExportFailed,
                    format!("导出失败: {}", e.message()),
                )),
            )
        }
    }
}

/// 下载导入模板
pub async fn download_template(kind: EntityKind) -> ActixResult<HttpResponse> {
    let mut body = Vec::new();
    write_template(kind, &mut body).map_err(|e| {
        error!("CSV 写入失败: {}", e);
        actix_web::error::ErrorInternalServerError(format!("CSV 写入失败: {e}"))
    })?;

    Ok(csv_attachment(body, &kind.template_file_name()))
}
