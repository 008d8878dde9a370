//! 导入服务

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use futures_util::StreamExt;
use tracing::{info, warn};

use super::TransferService;
use crate::errors::SchoolError;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::error_response;
use crate::transfer::{CsvImporter, EntityKind};

/// 导入实体
pub async fn import_entities(
    service: &TransferService,
    request: &HttpRequest,
    kind: EntityKind,
    mut payload: Multipart,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let settings = service.get_settings(request);

    // 读取文件内容
    let (file_bytes, file_name) =
        match read_file_from_multipart(&mut payload, settings.max_upload_bytes).await {
            Ok(result) => result,
            Err(UploadError::TooLarge(limit)) => {
                warn!("Import upload rejected: larger than {} bytes", limit);
                return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                    ErrorCode::FileSizeExceeded,
                    format!("File size exceeds the limit of {limit} bytes"),
                )));
            }
            Err(UploadError::Read(e)) => {
                return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                    ErrorCode::FileUploadFailed,
                    format!("文件读取失败: {e}"),
                )));
            }
        };

    if !file_name.to_ascii_lowercase().ends_with(".csv") {
        warn!("Import file {} does not have a .csv extension", file_name);
    }

    let importer = CsvImporter::new(storage, settings.csv);
    match importer.import(kind, &file_bytes).await {
        Ok(result) => {
            info!(
                "Imported {} from {}: {} inserted, {} updated, {} skipped",
                kind, file_name, result.inserted, result.updated, result.skipped
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(result, "Import completed")))
        }
        // 文件级错误：行数超限
        Err(SchoolError::Validation { field, reason }) if field == "file" => Ok(
            HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::ImportFileDataInvalid, reason)),
        ),
        Err(e) => Ok(error_response(&e)),
    }
}

enum UploadError {
    TooLarge(usize),
    Read(String),
}

/// 读取 file 字段，累计超过 `max_bytes` 时立即停止
async fn read_file_from_multipart(
    payload: &mut Multipart,
    max_bytes: usize,
) -> Result<(Vec<u8>, String), UploadError> {
    let mut file_bytes = Vec::new();
    let mut file_name = String::new();

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| UploadError::Read(format!("读取字段失败: {e}")))?;

        if field.name().map(|n| n == "file").unwrap_or(false) {
            if let Some(content_disposition) = field.content_disposition() {
                file_name = content_disposition
                    .get_filename()
                    .unwrap_or("upload.csv")
                    .to_string();
            }

            while let Some(chunk) = field.next().await {
                let data = chunk.map_err(|e| UploadError::Read(format!("读取数据失败: {e}")))?;
                if file_bytes.len() + data.len() > max_bytes {
                    return Err(UploadError::TooLarge(max_bytes));
                }
                file_bytes.extend_from_slice(&data);
            }
        }
    }

    if file_bytes.is_empty() {
        return Err(UploadError::Read("未找到文件字段".to_string()));
    }

    Ok((file_bytes, file_name))
}
