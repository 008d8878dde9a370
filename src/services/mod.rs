pub mod classes;
pub mod promo_codes;
pub mod relationships;
pub mod students;
pub mod system;
pub mod teachers;
pub mod transfer;

pub use classes::ClassService;
pub use promo_codes::PromoCodeService;
pub use relationships::RelationshipService;
pub use students::StudentService;
pub use system::SystemService;
pub use teachers::TeacherService;
pub use transfer::{TransferService, TransferSettings};

use actix_web::{HttpRequest, HttpResponse, http::StatusCode, web};
use serde_json::json;
use tracing::error;

use crate::errors::SchoolError;
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::SeaOrmStorage;

/// 从 app data 中取出存储实例
pub(crate) fn storage_from_request(request: &HttpRequest) -> SeaOrmStorage {
    request
        .app_data::<web::Data<SeaOrmStorage>>()
        .expect("Storage not found in app data")
        .get_ref()
        .clone()
}

/// 错误对应的 HTTP 状态码
pub(crate) fn status_for(err: &SchoolError) -> StatusCode {
    match err {
        SchoolError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        SchoolError::NotFound { .. } => StatusCode::NOT_FOUND,
        SchoolError::Conflict { .. } => StatusCode::CONFLICT,
        SchoolError::MissingColumns { .. } | SchoolError::FileOperation { .. } => {
            StatusCode::BAD_REQUEST
        }
        SchoolError::Authorization { .. } => StatusCode::FORBIDDEN,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// 将领域错误转换为统一的错误响应
///
/// 基础设施错误只记录日志，不把细节返回给调用方。
pub(crate) fn error_response(err: &SchoolError) -> HttpResponse {
    let status = status_for(err);
    let message = if err.is_client_error() || status == StatusCode::BAD_REQUEST {
        err.message()
    } else {
        error!("{}", err.format_simple());
        "Internal server error".to_string()
    };

    let code = ErrorCode::from(err);
    let mut builder = HttpResponse::build(status);
    match error_details(err) {
        Some(details) => builder.json(ApiResponse::error(code, details, message)),
        None => builder.json(ApiResponse::error_empty(code, message)),
    }
}

/// 客户端可据此定位出错的字段或列
fn error_details(err: &SchoolError) -> Option<serde_json::Value> {
    match err {
        SchoolError::Validation { field, .. } => Some(json!({ "field": field })),
        SchoolError::Conflict { field, value } => Some(json!({ "field": field, "value": value })),
        SchoolError::MissingColumns { columns } => Some(json!({ "missing_columns": columns })),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&SchoolError::validation("email", "bad")),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_for(&SchoolError::not_found("class", 1)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&SchoolError::conflict("mobile", "0501")),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for(&SchoolError::missing_columns(vec!["code".to_string()])),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&SchoolError::persistence("disk full")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_errors_are_masked() {
        let resp = error_response(&SchoolError::persistence("near \"SELEC\": syntax error"));
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
